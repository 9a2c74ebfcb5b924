use super::*;
use crate::astro_math::{deg_to_rad, modulo};

/// Azimuth spacing of the intermediate points on graticule rows
const GRATICULE_AZ_STEP: Degrees = 10.;

/// Minimum cos(elevation) used when widening rows near the zenith
const MIN_COS_ELEVATION: f64 = 0.01;

/// A great circle edge between two corners, sampled by fraction of its length
struct Edge {
    start: AngularPosition,
    heading: Degrees,
    length: Degrees,
}

impl Edge {
    fn new(start: AngularPosition, end: AngularPosition) -> Self {
        Self {
            start,
            heading: great_circle::bearing(start, end),
            length: great_circle::distance(start, end),
        }
    }

    fn at(&self, fraction: f64) -> AngularPosition {
        great_circle::waypoint(self.start, self.heading, fraction * self.length)
    }
}

/// Half the azimuth width needed to cover `size` degrees of sky at `elevation`
fn half_width(size: Degrees, elevation: Degrees) -> Degrees {
    0.5 * size / deg_to_rad(elevation).cos().max(MIN_COS_ELEVATION)
}

/// Back and forth passes between the pt1-pt4 edge and the pt2-pt3 edge,
/// stepping half a row before each return pass.
/// One turn is two switchbacks; the last row runs exactly from pt4 to pt3.
pub fn serpentine(
    pt1: AngularPosition,
    pt2: AngularPosition,
    pt3: AngularPosition,
    pt4: AngularPosition,
    num_turns: u32,
) -> MountResult<Vec<AngularPosition>> {
    check_turns(num_turns)?;
    for p in [pt1, pt2, pt3, pt4] {
        check_point(p)?;
    }

    let edge14 = Edge::new(pt1, pt4);
    let edge23 = Edge::new(pt2, pt3);
    let n = num_turns as f64;

    let mut points = Vec::with_capacity(4 * num_turns as usize + 2);
    for i in 0..num_turns {
        let out = i as f64 / n;
        points.push(edge14.at(out));
        points.push(edge23.at(out));

        let back = (i as f64 + 0.5) / n;
        points.push(edge23.at(back));
        points.push(edge14.at(back));
    }
    points.push(pt4);
    points.push(pt3);

    Ok(points)
}

/// Straight cross strokes from the pt1-pt4 edge to the pt2-pt3 edge, `num_turns + 1` of them
pub fn zigzag(
    pt1: AngularPosition,
    pt2: AngularPosition,
    pt3: AngularPosition,
    pt4: AngularPosition,
    num_turns: u32,
) -> MountResult<Vec<AngularPosition>> {
    check_turns(num_turns)?;
    for p in [pt1, pt2, pt3, pt4] {
        check_point(p)?;
    }

    let edge14 = Edge::new(pt1, pt4);
    let edge23 = Edge::new(pt2, pt3);
    let n = num_turns as f64;

    let mut points = Vec::with_capacity(2 * num_turns as usize + 2);
    for i in 0..num_turns {
        let level = i as f64 / n;
        points.push(edge14.at(level));
        points.push(edge23.at(level));
    }
    points.push(pt4);
    points.push(pt3);

    Ok(points)
}

/// Azimuth/elevation raster of `size` degrees centred on `center`.
/// Rows are widened in azimuth by 1/cos(elevation) so each covers `size` degrees of sky,
/// and elevation is capped at the zenith. Produces `4 * num_turns + 2` points.
pub fn rectangular(
    center: AngularPosition,
    size: Degrees,
    num_turns: u32,
) -> MountResult<Vec<AngularPosition>> {
    check_turns(num_turns)?;
    check_size(size)?;
    check_point(center)?;

    let low = center.secondary - 0.5 * size;
    let n = num_turns as f64;
    let row = |fraction: f64| (low + fraction * size).min(90.);

    let mut points = Vec::with_capacity(4 * num_turns as usize + 2);
    for i in 0..num_turns {
        let el = row(i as f64 / n);
        let w = half_width(size, el);
        points.push(AngularPosition::new(center.primary - w, el));
        points.push(AngularPosition::new(center.primary + w, el));

        let el = row((i as f64 + 0.5) / n);
        let w = half_width(size, el);
        points.push(AngularPosition::new(center.primary + w, el));
        points.push(AngularPosition::new(center.primary - w, el));
    }
    let el = row(1.);
    let w = half_width(size, el);
    points.push(AngularPosition::new(center.primary - w, el));
    points.push(AngularPosition::new(center.primary + w, el));

    Ok(points)
}

/// A single azimuth sweep of `size` degrees of sky through `center`
pub fn linear(center: AngularPosition, size: Degrees) -> MountResult<Vec<AngularPosition>> {
    check_size(size)?;
    check_point(center)?;

    let w = half_width(size, center.secondary);
    Ok(vec![
        AngularPosition::new(center.primary - w, center.secondary),
        AngularPosition::new(center.primary + w, center.secondary),
    ])
}

/// Fixed horizontal raster from (`left_az`, `low_el`) to (`right_az`, `high_el`).
/// The scan always moves towards increasing azimuth from `left_az` to reach `right_az`,
/// with intermediate points on each row so no single move crosses the wrong way round.
pub fn graticule(
    left_az: Degrees,
    right_az: Degrees,
    low_el: Degrees,
    high_el: Degrees,
    num_turns: u32,
) -> MountResult<Vec<AngularPosition>> {
    check_turns(num_turns)?;
    check_az(left_az)?;
    check_az(right_az)?;
    check_alt(low_el)?;
    check_alt(high_el)?;

    let mut left_az = modulo(left_az, 360.);
    let right_az = modulo(right_az, 360.);
    if left_az > right_az {
        left_az -= 360.;
    }

    let n = num_turns as f64;
    let row = |fraction: f64| (1. - fraction) * low_el + fraction * high_el;

    let mut points = Vec::new();
    for i in 0..num_turns {
        sweep(&mut points, left_az, right_az, row(i as f64 / n));
        sweep(&mut points, right_az, left_az, row((i as f64 + 0.5) / n));
    }
    sweep(&mut points, left_az, right_az, high_el);

    Ok(points)
}

/// Appends a constant elevation row from `from` to `to`, both ends included
fn sweep(points: &mut Vec<AngularPosition>, from: Degrees, to: Degrees, el: Degrees) {
    let span = to - from;
    let steps = (span.abs() / GRATICULE_AZ_STEP).ceil().max(1.) as usize;
    points.push(AngularPosition::new(from, el));
    for j in 1..steps {
        points.push(AngularPosition::new(
            from + span * j as f64 / steps as f64,
            el,
        ));
    }
    points.push(AngularPosition::new(to, el));
}
