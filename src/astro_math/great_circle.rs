//! Great circle math on the unit sphere.
//!
//! Points are `AngularPosition`s: the primary coordinate is longitude-like
//! (azimuth, right ascension) and the secondary is latitude-like (altitude,
//! declination). Everything is in degrees.

use super::{deg_to_rad, modulo, rad_to_deg, Degrees};
use crate::util::AngularPosition;

/// Angular distance between two points
pub fn distance(pt1: AngularPosition, pt2: AngularPosition) -> Degrees {
    let b1 = deg_to_rad(pt1.secondary);
    let b2 = deg_to_rad(pt2.secondary);
    let da = deg_to_rad(pt2.primary - pt1.primary);

    // rounding can push identical points just past 1
    let cos_theta = (b1.sin() * b2.sin() + b1.cos() * b2.cos() * da.cos()).clamp(-1., 1.);
    rad_to_deg(cos_theta.acos())
}

/// Initial direction to go from `pt1` to reach `pt2`, degrees east of north in (-180, 180]
pub fn bearing(pt1: AngularPosition, pt2: AngularPosition) -> Degrees {
    let b1 = deg_to_rad(pt1.secondary);
    let b2 = deg_to_rad(pt2.secondary);
    let da = deg_to_rad(pt2.primary - pt1.primary);

    rad_to_deg(f64::atan2(
        b2.cos() * da.sin(),
        b1.cos() * b2.sin() - b1.sin() * b2.cos() * da.cos(),
    ))
}

/// The point `delta` degrees along the great circle leaving `pt1` at `bearing`.
/// The primary coordinate of the result is normalized into [0, 360).
pub fn waypoint(pt1: AngularPosition, bearing: Degrees, delta: Degrees) -> AngularPosition {
    if delta == 0. {
        return pt1;
    }

    let b1 = deg_to_rad(pt1.secondary);
    let dist = deg_to_rad(delta);
    let brg = deg_to_rad(bearing);

    let sin_b2 = (b1.sin() * dist.cos() + b1.cos() * dist.sin() * brg.cos()).clamp(-1., 1.);

    // At a pole cos(b1) vanishes and the direction is carried entirely by the
    // bearing; keep the x term away from zero so atan2 stays well conditioned.
    let mut x = b1.cos() * dist.cos() - b1.sin() * dist.sin() * brg.cos();
    let y = dist.sin() * brg.sin();
    if x.abs() < f64::EPSILON && y.abs() < f64::EPSILON {
        x = f64::EPSILON;
    }

    AngularPosition::new(
        modulo(pt1.primary + rad_to_deg(f64::atan2(y, x)), 360.),
        rad_to_deg(sin_b2.asin()),
    )
}

/// Discretizes the great circle from `pt1` to `pt2` into segments of at most `step` degrees.
/// Both end points are included exactly.
pub fn interpolate(pt1: AngularPosition, pt2: AngularPosition, step: Degrees) -> Vec<AngularPosition> {
    let total = distance(pt1, pt2);
    let segments = (total / step.max(0.01)).ceil().max(1.) as usize;
    let heading = bearing(pt1, pt2);

    let mut points = Vec::with_capacity(segments + 1);
    points.push(pt1);
    for i in 1..segments {
        points.push(waypoint(pt1, heading, total * i as f64 / segments as f64));
    }
    points.push(pt2);
    points
}
