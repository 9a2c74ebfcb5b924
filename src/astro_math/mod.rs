//! Angle helpers and the sidereal time and horizon rotations used to turn
//! right ascension and declination into azimuth and altitude.
//! Everything on the sky is in degrees; hours only appear in display strings.

use chrono::{DateTime, Utc};
use polynomials::poly;
use std::f64::consts::PI;

pub mod great_circle;
pub mod solar_system;

pub type Degrees = f64;
pub type Radians = f64;

const J2000: f64 = 2_451_545.0;
const UNIX_EPOCH_JD: f64 = 2_440_587.5;
/// TT - UTC, current since 2017
const TT_MINUS_UTC_SECS: f64 = 37. + 32.184;

pub fn deg_to_rad(degrees: Degrees) -> Radians {
    PI * degrees / 180.
}

pub fn rad_to_deg(rad: Radians) -> Degrees {
    180. * rad / PI
}

pub fn modulo(val: f64, base: f64) -> f64 {
    ((val % base) + base) % base
}

/// Picks the representation of `target` closest to `reference` among
/// `target`, `target - 360` and `target + 360` (after bringing `target` onto the
/// same turn as `reference`). Exact half-turn ties go to the larger azimuth.
pub fn nearest_azimuth(reference: Degrees, target: Degrees) -> Degrees {
    let base = target + 360. * ((reference - target) / 360.).round();
    let mut best = base;
    for candidate in [base - 360., base + 360.] {
        let diff = (candidate - reference).abs();
        let best_diff = (best - reference).abs();
        if diff < best_diff || (diff == best_diff && best < candidate) {
            best = candidate;
        }
    }
    best
}

/// Formats hours (or degrees) as `HH:MM:SS.ss`
pub fn format_sexagesimal(value: f64) -> String {
    let sign = if value < 0. { "-" } else { "" };
    let total = value.abs();
    let whole = total.trunc();
    let minutes = (total - whole) * 60.;
    let seconds = (minutes - minutes.trunc()) * 60.;
    format!(
        "{}{:02}:{:02}:{:05.2}",
        sign, whole as u32, minutes as u32, seconds
    )
}

/// Julian Date of a UTC instant, leap seconds ignored
pub fn julian_date(time: DateTime<Utc>) -> f64 {
    let seconds = time.timestamp() as f64 + time.timestamp_subsec_nanos() as f64 * 1E-9;
    seconds / 86_400. + UNIX_EPOCH_JD
}

/// Julian centuries of terrestrial time since J2000
pub fn julian_centuries_tt(time: DateTime<Utc>) -> f64 {
    (julian_date(time) + TT_MINUS_UTC_SECS / 86_400. - J2000) / 36_525.
}

/// Greenwich mean sidereal time as an angle: the earth rotation angle plus
/// the accumulated precession in right ascension.
/// see https://thecynster.home.blog/2019/11/04/calculating-sidereal-time/
pub fn greenwich_sidereal_time(time: DateTime<Utc>) -> Degrees {
    let jd_utc = julian_date(time);
    let rotation = 360. * (0.779_057_273_264 + 1.002_737_811_911_354_5 * (jd_utc - J2000));

    let centuries = julian_centuries_tt(time);
    let precession_arcsec = poly![
        0.014506,
        4612.156534,
        1.3915817,
        -0.00000044,
        -0.000029956,
        -0.0000000368,
    ]
    .eval(centuries)
    .unwrap_or(0.);

    modulo(rotation + precession_arcsec / 3600., 360.)
}

/// East longitude in degrees
pub fn local_sidereal_time(time: DateTime<Utc>, longitude: Degrees) -> Degrees {
    modulo(greenwich_sidereal_time(time) + longitude, 360.)
}

/// Hour angle of `ra` in [0, 360)
pub fn hour_angle(time: DateTime<Utc>, longitude: Degrees, ra: Degrees) -> Degrees {
    modulo(local_sidereal_time(time, longitude) - ra, 360.)
}

/// Rotates (hour angle, declination) onto the horizon at latitude `lat`.
/// Returns (azimuth east of north in [0, 360), altitude).
pub fn horizontal_from_hour_angle(ha: Degrees, dec: Degrees, lat: Degrees) -> (Degrees, Degrees) {
    let (ha, dec, lat) = (deg_to_rad(ha), deg_to_rad(dec), deg_to_rad(lat));

    let sin_alt = (dec.sin() * lat.sin() + dec.cos() * lat.cos() * ha.cos()).clamp(-1., 1.);
    let az = f64::atan2(
        -ha.sin() * dec.cos(),
        dec.sin() * lat.cos() - dec.cos() * lat.sin() * ha.cos(),
    );

    (modulo(rad_to_deg(az), 360.), rad_to_deg(sin_alt.asin()))
}

/// Inverse of [`horizontal_from_hour_angle`]: returns (hour angle in [0, 360), declination)
pub fn hour_angle_from_horizontal(az: Degrees, alt: Degrees, lat: Degrees) -> (Degrees, Degrees) {
    let (az, alt, lat) = (deg_to_rad(az), deg_to_rad(alt), deg_to_rad(lat));

    // the rotation is its own inverse with the roles of the angles swapped
    let sin_dec = (lat.sin() * alt.sin() + lat.cos() * alt.cos() * az.cos()).clamp(-1., 1.);
    let ha = f64::atan2(
        -az.sin() * alt.cos(),
        alt.sin() * lat.cos() - alt.cos() * lat.sin() * az.cos(),
    );

    (modulo(rad_to_deg(ha), 360.), rad_to_deg(sin_dec.asin()))
}
