//! Scan path generators.
//!
//! Every generator is a pure function of its parameters: the same input always
//! yields the same points in the same order, so a path can be regenerated at
//! any time without reference to the mount.

use serde::{Deserialize, Serialize};

use crate::astro_math::great_circle;
use crate::util::*;

pub use raster::*;
pub use spiral::*;

mod raster;
mod spiral;

/// Coordinate system a path is expressed in
#[derive(Debug, Eq, PartialEq, Copy, Clone, Serialize, Deserialize)]
pub enum Frame {
    /// azimuth, altitude
    Horizontal,
    /// right ascension, declination (both in degrees)
    Equatorial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanPath {
    pub frame: Frame,
    pub points: Vec<AngularPosition>,
}

impl ScanPath {
    pub fn horizontal(points: Vec<AngularPosition>) -> Self {
        Self {
            frame: Frame::Horizontal,
            points,
        }
    }

    pub fn equatorial(points: Vec<AngularPosition>) -> Self {
        Self {
            frame: Frame::Equatorial,
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self {
            frame: self.frame,
            points,
        }
    }

    /// Inserts great circle waypoints so no two consecutive points are more than `step` apart.
    /// Used to draw previews that follow the sky rather than straight chart lines.
    pub fn densified(&self, step: Degrees) -> Self {
        let mut points: Vec<AngularPosition> = Vec::with_capacity(self.points.len());
        for pair in self.points.windows(2) {
            let segment = great_circle::interpolate(pair[0], pair[1], step);
            let skip = usize::from(!points.is_empty());
            points.extend(segment.into_iter().skip(skip));
        }
        if points.is_empty() {
            points.extend(self.points.iter().copied());
        }
        Self {
            frame: self.frame,
            points,
        }
    }

    pub(crate) fn validate(&self) -> MountResult<()> {
        if self.points.is_empty() {
            return Err(MountError::InvalidValue("Scan path has no points".to_string()));
        }
        for p in &self.points {
            match self.frame {
                Frame::Horizontal => {
                    check_az(p.primary)?;
                    check_alt(p.secondary)?;
                }
                Frame::Equatorial => {
                    check_ra(p.primary)?;
                    check_dec(p.secondary)?;
                }
            }
        }
        Ok(())
    }
}

pub(crate) fn check_turns(num_turns: u32) -> MountResult<()> {
    if num_turns == 0 {
        Err(MountError::InvalidValue(
            "Number of turns must be at least 1".to_string(),
        ))
    } else {
        Ok(())
    }
}

pub(crate) fn check_size(size: Degrees) -> MountResult<()> {
    if size.is_finite() && 0. < size && size <= 180. {
        Ok(())
    } else {
        Err(MountError::InvalidValue(format!(
            "Scan size of {} is not valid",
            size
        )))
    }
}

pub(crate) fn check_point(p: AngularPosition) -> MountResult<()> {
    check_az(p.primary)?;
    check_alt(p.secondary)
}
