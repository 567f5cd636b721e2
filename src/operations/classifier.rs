// Ship state classification
use std::fmt;

use crate::models::{Position, Ship, ShipState};

/// Lifecycle condition the scheduler dispatches on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipCondition {
    /// Idle at the home station
    Docked,
    /// Idle away from the station
    Idle,
    InFlight,
    Mining,
    Unknown(String),
}

impl ShipCondition {
    pub fn is_busy(&self) -> bool {
        matches!(self, ShipCondition::InFlight | ShipCondition::Mining)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            ShipCondition::Docked => "⚓",
            ShipCondition::Idle => "💤",
            ShipCondition::InFlight => "🚀",
            ShipCondition::Mining => "⛏️",
            ShipCondition::Unknown(_) => "❓",
        }
    }
}

impl fmt::Display for ShipCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShipCondition::Docked => f.write_str("Docked"),
            ShipCondition::Idle => f.write_str("Idle"),
            ShipCondition::InFlight => f.write_str("InFlight"),
            ShipCondition::Mining => f.write_str("Mining"),
            ShipCondition::Unknown(label) => write!(f, "Unknown({})", label),
        }
    }
}

pub fn classify(ship: &Ship, home: &Position) -> ShipCondition {
    match &ship.state {
        ShipState::Idle if ship.is_at(home) => ShipCondition::Docked,
        ShipState::Idle => ShipCondition::Idle,
        ShipState::InFlight => ShipCondition::InFlight,
        ShipState::Mining => ShipCondition::Mining,
        ShipState::Unknown(label) => ShipCondition::Unknown(label.clone()),
    }
}
