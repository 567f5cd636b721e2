// Nearest admissible mining target
use std::fmt;

use crate::models::{ModuleKind, Planet, Position, Ship};

/// Which planet classes a ship can already extract from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MiningCapability {
    pub miner: bool,
    pub gas_sucker: bool,
}

impl MiningCapability {
    pub fn of(ship: &Ship) -> Self {
        Self {
            miner: ship.has_module(&ModuleKind::Miner),
            gas_sucker: ship.has_module(&ModuleKind::GasSucker),
        }
    }

    pub fn is_unequipped(&self) -> bool {
        !self.miner && !self.gas_sucker
    }

    /// A ship with a single module type is restricted to that planet class.
    /// No module or both modules leave every planet open.
    pub fn admits(&self, planet: &Planet) -> bool {
        match (self.miner, self.gas_sucker) {
            (true, false) => planet.solid,
            (false, true) => !planet.solid,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiningTarget {
    pub planet: Planet,
    /// Distance from the home station
    pub distance: f64,
    pub module: ModuleKind,
    /// The ship must buy `module` before it can extract here
    pub needs_module: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TargetError {
    /// No scanned planet matches the ship's modules
    NoCandidates { scanned: usize },
}

impl fmt::Display for TargetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetError::NoCandidates { scanned } => {
                write!(f, "no compatible planet among {} scanned", scanned)
            }
        }
    }
}

impl std::error::Error for TargetError {}

/// Closest planet to `origin`; the earliest one wins a tie
pub fn nearest<'p, I>(origin: &Position, planets: I) -> Option<(&'p Planet, f64)>
where
    I: IntoIterator<Item = &'p Planet>,
{
    planets
        .into_iter()
        .map(|planet| (planet, origin.distance_to(&planet.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

pub fn select_target(ship: &Ship, home: &Position, planets: &[Planet]) -> Result<MiningTarget, TargetError> {
    let capability = MiningCapability::of(ship);
    let candidates = planets.iter().filter(|planet| capability.admits(planet));

    let (planet, distance) = nearest(home, candidates).ok_or(TargetError::NoCandidates {
        scanned: planets.len(),
    })?;

    let module = planet.required_module();
    Ok(MiningTarget {
        planet: planet.clone(),
        distance,
        needs_module: capability.is_unequipped(),
        module,
    })
}
