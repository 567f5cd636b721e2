// Simeis Autonomous Agent Library
// Mining and trading agent for the Simeis space simulation server

pub mod models;
pub mod client;
pub mod operations;
pub mod admiral;
pub mod storage;
pub mod config;
pub mod verbosity;
pub mod output_broker;
pub mod shutdown;

// Re-export commonly used types
pub use models::{
    ship::{Ship, ShipCargo, ShipState, ModuleKind, CrewRole},
    station::{Station, Planet},
    space::Position,
    player::PlayerStatus,
};

pub use client::{GameApi, GameRemote, RemoteError, SimeisClient};
pub use admiral::Admiral;
pub use config::{SimeisConfig, ConfigManager};
