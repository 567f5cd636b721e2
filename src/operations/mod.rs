// Operations module - ship cycles and the policies that drive them

pub mod session;
pub mod classifier;
pub mod targeting;
pub mod provisioning;
pub mod navigation;
pub mod mining;
pub mod trading;
pub mod upgrades;
pub mod market_watch;
pub mod errors;

pub use session::*;
pub use classifier::*;
pub use targeting::*;
pub use provisioning::*;
pub use navigation::*;
pub use mining::*;
pub use trading::*;
pub use upgrades::*;
pub use market_watch::*;
pub use errors::*;
