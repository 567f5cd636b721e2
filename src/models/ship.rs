use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

use super::space::Position;

/// Lifecycle state reported by the server, normalized at decode time.
///
/// The wire value is either a plain label (`"Idle"`) or a single-key mapping
/// whose key is the label and whose value carries transient detail
/// (`{"InFlight": {...}}`). Only the label survives decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShipState {
    Idle,
    InFlight,
    Mining,
    Unknown(String),
}

impl ShipState {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Idle" => ShipState::Idle,
            "InFlight" => ShipState::InFlight,
            "Mining" | "Extracting" => ShipState::Mining,
            other => ShipState::Unknown(other.to_string()),
        }
    }

    /// Outer label of a raw state value: the string itself, or the sole key of
    /// a mapping. Anything else has no canonical label.
    pub fn canonical_label(raw: &Value) -> Option<&str> {
        match raw {
            Value::String(label) => Some(label.as_str()),
            Value::Object(map) if map.len() == 1 => map.keys().next().map(|key| key.as_str()),
            _ => None,
        }
    }

    pub fn from_value(raw: &Value) -> Self {
        match Self::canonical_label(raw) {
            Some(label) => Self::from_label(label),
            None => ShipState::Unknown(raw.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ShipState::Idle => "Idle",
            ShipState::InFlight => "InFlight",
            ShipState::Mining => "Mining",
            ShipState::Unknown(label) => label,
        }
    }

    /// Ship is executing a server-side action and must not be commanded
    pub fn is_busy(&self) -> bool {
        matches!(self, ShipState::InFlight | ShipState::Mining)
    }
}

impl<'de> Deserialize<'de> for ShipState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(ShipState::from_value(&raw))
    }
}

impl fmt::Display for ShipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Installed module type. Only the two mining modules matter to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum ModuleKind {
    Miner,
    GasSucker,
    Other(String),
}

impl From<String> for ModuleKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Miner" => ModuleKind::Miner,
            "GasSucker" => ModuleKind::GasSucker,
            _ => ModuleKind::Other(raw),
        }
    }
}

impl ModuleKind {
    pub fn as_str(&self) -> &str {
        match self {
            ModuleKind::Miner => "Miner",
            ModuleKind::GasSucker => "GasSucker",
            ModuleKind::Other(name) => name,
        }
    }

    /// Module able to extract from a planet of the given composition
    pub fn for_planet(solid: bool) -> Self {
        if solid { ModuleKind::Miner } else { ModuleKind::GasSucker }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum CrewRole {
    Pilot,
    Operator,
    Trader,
    Other(String),
}

impl From<String> for CrewRole {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Pilot" => CrewRole::Pilot,
            "Operator" => CrewRole::Operator,
            "Trader" => CrewRole::Trader,
            _ => CrewRole::Other(raw),
        }
    }
}

impl CrewRole {
    pub fn as_str(&self) -> &str {
        match self {
            CrewRole::Pilot => "Pilot",
            CrewRole::Operator => "Operator",
            CrewRole::Trader => "Trader",
            CrewRole::Other(name) => name,
        }
    }

    /// Lowercase form used by the hiring endpoint
    pub fn path_segment(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl fmt::Display for CrewRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CrewMember {
    pub member_type: CrewRole,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShipModule {
    pub modtype: ModuleKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShipCargo {
    pub capacity: f64,
    pub usage: f64,
    #[serde(default)]
    pub resources: BTreeMap<String, f64>,
}

impl ShipCargo {
    pub fn is_full(&self) -> bool {
        self.usage >= self.capacity
    }

    /// Resources actually on board, skipping empty entries
    pub fn loaded_resources(&self) -> impl Iterator<Item = (&String, f64)> {
        self.resources
            .iter()
            .filter(|(_, amount)| **amount != 0.0)
            .map(|(name, amount)| (name, *amount))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Ship {
    pub id: u64,
    pub position: Position,
    pub state: ShipState,
    pub cargo: ShipCargo,
    #[serde(default)]
    pub modules: BTreeMap<String, ShipModule>,
    #[serde(default)]
    pub crew: BTreeMap<String, CrewMember>,
    #[serde(default)]
    pub hull_decay: f64,
    #[serde(default)]
    pub fuel_tank: f64,
    #[serde(default)]
    pub fuel_tank_capacity: f64,
}

impl Ship {
    pub fn has_module(&self, kind: &ModuleKind) -> bool {
        self.modules.values().any(|module| &module.modtype == kind)
    }

    pub fn has_crew(&self, role: &CrewRole) -> bool {
        self.crew.values().any(|member| &member.member_type == role)
    }

    pub fn is_at(&self, position: &Position) -> bool {
        self.position == *position
    }
}
