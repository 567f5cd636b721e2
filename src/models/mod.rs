// Models module - server entities decoded into typed views

pub mod space;
pub mod ship;
pub mod station;
pub mod player;
pub mod market;
pub mod responses;

pub use space::*;
pub use ship::*;
pub use station::*;
pub use player::*;
pub use market::*;
pub use responses::*;
