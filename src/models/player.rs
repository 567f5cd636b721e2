use serde::Deserialize;
use serde_json::{Map, Value};

use super::ship::Ship;

/// Account snapshot returned by `/player/{id}`
#[derive(Debug, Deserialize, Clone)]
pub struct PlayerStatus {
    pub money: f64,
    /// Operating cost per second
    pub costs: f64,
    #[serde(default)]
    pub stations: Map<String, Value>,
    #[serde(default)]
    pub ships: Vec<Ship>,
}

impl PlayerStatus {
    /// First station listed by the server is the home station
    pub fn home_station_id(&self) -> Option<&str> {
        self.stations.keys().next().map(|id| id.as_str())
    }

    /// Seconds until bankruptcy at the current burn rate, `None` when nothing burns
    pub fn runway_seconds(&self) -> Option<f64> {
        if self.costs > 0.0 {
            Some(self.money / self.costs)
        } else {
            None
        }
    }

    pub fn has_lost(&self) -> bool {
        self.money <= 0.0
    }

    pub fn ship_ids(&self) -> Vec<u64> {
        self.ships.iter().map(|ship| ship.id).collect()
    }
}
