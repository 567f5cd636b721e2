// Storage module for persistent data
pub mod session_store;

pub use session_store::*;
