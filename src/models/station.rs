use serde::Deserialize;
use std::collections::BTreeMap;

use super::ship::{CrewMember, CrewRole, ModuleKind};
use super::space::Position;

pub const HULL_PLATE: &str = "HullPlate";
pub const FUEL: &str = "Fuel";

#[derive(Debug, Deserialize, Clone)]
pub struct Station {
    pub position: Position,
    #[serde(default)]
    pub crew: BTreeMap<String, CrewMember>,
    #[serde(default)]
    pub cargo: StationCargo,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StationCargo {
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
}

impl Station {
    /// Quantity of a resource in the station hold; absent means zero
    pub fn stock(&self, resource: &str) -> f64 {
        self.cargo.resources.get(resource).copied().unwrap_or(0.0)
    }

    pub fn has_crew(&self, role: &CrewRole) -> bool {
        self.crew.values().any(|member| &member.member_type == role)
    }
}

/// A minable body found by a station scan
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Planet {
    pub position: Position,
    pub solid: bool,
}

impl Planet {
    pub fn required_module(&self) -> ModuleKind {
        ModuleKind::for_planet(self.solid)
    }
}
