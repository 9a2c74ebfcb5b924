use serde::{Deserialize, Serialize};

pub use abort_result::*;
pub use enums::*;
pub use result::*;
pub use tasks::*;

pub use crate::astro_math::{Degrees, Radians};

mod abort_result;
mod tasks {
    pub use abortable_task::*;
    pub use waitable_task::*;

    mod abortable_task;
    mod waitable_task;
}

mod enums;
mod result;

/// A point on the sky in degrees.
/// `primary` is azimuth or right ascension (cyclic), `secondary` is altitude or declination.
#[derive(Debug, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub struct AngularPosition {
    pub primary: Degrees,
    pub secondary: Degrees,
}

impl AngularPosition {
    pub const fn new(primary: Degrees, secondary: Degrees) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, axis: Axis) -> Degrees {
        match axis {
            Axis::Primary => self.primary,
            Axis::Secondary => self.secondary,
        }
    }
}

/// Raw motor encoder counts per axis
#[derive(Debug, Eq, PartialEq, Copy, Clone, Default, Serialize, Deserialize)]
pub struct EncoderPosition {
    pub primary: i64,
    pub secondary: i64,
}

impl EncoderPosition {
    pub const fn new(primary: i64, secondary: i64) -> Self {
        Self { primary, secondary }
    }

    pub fn get(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Primary => self.primary,
            Axis::Secondary => self.secondary,
        }
    }
}
