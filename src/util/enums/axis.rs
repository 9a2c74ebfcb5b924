use serde::{Deserialize, Serialize};

#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, Serialize, Deserialize)]
pub enum Axis {
    /// Azimuth
    Primary,
    /// Elevation
    Secondary,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::Primary, Axis::Secondary];
}
