// Client module - Simeis server access
pub mod api;
pub mod game_api;
pub mod remote;

pub use api::SimeisClient;
pub use game_api::GameApi;
pub use remote::{GameRemote, RemoteError};
