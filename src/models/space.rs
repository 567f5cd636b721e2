use serde::{Deserialize, Serialize};
use std::fmt;

/// A point in the 3D game sector, as the server encodes it: `[x, y, z]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position(pub [f64; 3]);

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Position([x, y, z])
    }

    pub fn x(&self) -> f64 {
        self.0[0]
    }

    pub fn y(&self) -> f64 {
        self.0[1]
    }

    pub fn z(&self) -> f64 {
        self.0[2]
    }

    /// Euclidean distance in 3D
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = other.x() - self.x();
        let dy = other.y() - self.y();
        let dz = other.z() - self.z();
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x(), self.y(), self.z())
    }
}
