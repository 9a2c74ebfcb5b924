use super::*;

/// Increments smaller than this produce a flat circle
const FLAT_INCREMENT: Degrees = 1E-6;

/// Upper bound on generated spiral points
const MAX_SPIRAL_POINTS: usize = 200_000;

/// Spiral up towards the zenith from `start`.
///
/// Each point moves 1 degree in azimuth and raises elevation by `increment / 360`,
/// so every full turn climbs `increment` degrees. A positive increment winds towards
/// increasing azimuth, negative towards decreasing. An increment of zero gives a circle.
pub fn spiral(start: AngularPosition, increment: Degrees) -> MountResult<Vec<AngularPosition>> {
    check_point(start)?;
    if !increment.is_finite() {
        return Err(MountError::InvalidValue(format!(
            "Spiral increment of {} is not valid",
            increment
        )));
    }
    if increment.abs() < FLAT_INCREMENT {
        return circle(start);
    }

    let direction = increment.signum();
    let climb = increment.abs() / 360.;
    let steps = ((90. - start.secondary) / climb - 1E-9).ceil().max(0.) as usize;
    if steps >= MAX_SPIRAL_POINTS {
        return Err(MountError::InvalidValue(format!(
            "Spiral increment of {} needs too many points",
            increment
        )));
    }

    Ok((0..=steps)
        .map(|k| {
            let k = k as f64;
            AngularPosition::new(
                start.primary + direction * k,
                (start.secondary + k * climb).min(90.),
            )
        })
        .collect())
}

/// One full turn of azimuth at the starting elevation, in 1 degree steps
pub fn circle(start: AngularPosition) -> MountResult<Vec<AngularPosition>> {
    check_point(start)?;
    Ok((0..=360)
        .map(|k| AngularPosition::new(start.primary + k as f64, start.secondary))
        .collect())
}
