//! Positions of the Sun, Moon and major planets.
//!
//! The Sun comes from the NOAA solar model and lands within a few tenths of a
//! degree. Planets follow mean orbital elements with secular rates (fitted for
//! 1800 to 2050) and the Moon a Keplerian orbit with its largest perturbations;
//! both are good to a few hundredths of a degree. Right ascension and declination
//! are referred to the mean equinox of date, the same frame sidereal time uses.

use std::ops::RangeInclusive;

use astronav::coords::noaa_sun::NOAASun;
use chrono::{DateTime, Datelike, Timelike, Utc};

use super::{
    deg_to_rad, greenwich_sidereal_time, julian_centuries_tt, julian_date,
    local_sidereal_time, modulo, rad_to_deg, Degrees, Radians,
};
use crate::config::ObservingLocation;
use crate::util::AngularPosition;

/// Years the orbital elements are fitted for
pub const VALID_YEARS: RangeInclusive<i32> = 1800..=2050;

const EARTH_RADIUS_M: f64 = 6_378_140.;
/// Polar over equatorial radius
const EARTH_AXIS_RATIO: f64 = 0.996_647_19;
/// General precession in ecliptic longitude
const PRECESSION_PER_CENTURY: Degrees = 1.396_971_3;
const KEPLER_MAX_ITERATIONS: usize = 30;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Body {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    pub const ALL: [Body; 9] = [
        Body::Sun,
        Body::Moon,
        Body::Mercury,
        Body::Venus,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Moon => "Moon",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
        }
    }

    /// Case insensitive
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|body| body.name().eq_ignore_ascii_case(name))
    }

    /// (ra, dec) as seen from `location`. Only the Moon is close enough for the
    /// observer's place on the earth to matter.
    pub fn position(&self, location: &ObservingLocation, time: DateTime<Utc>) -> AngularPosition {
        let orbit = match self {
            Body::Sun => return sun_position(time),
            Body::Moon => {
                let (geocentric, distance) = moon_geocentric(time);
                return topocentric(geocentric, distance, location, time);
            }
            Body::Mercury => &MERCURY,
            Body::Venus => &VENUS,
            Body::Mars => &MARS,
            Body::Jupiter => &JUPITER,
            Body::Saturn => &SATURN,
            Body::Uranus => &URANUS,
            Body::Neptune => &NEPTUNE,
        };
        planet_position(orbit, time)
    }
}

/* Vectors */

type Vector = [f64; 3];

fn norm(v: Vector) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// (longitude in [0, 360), latitude)
fn to_spherical(v: Vector) -> (Degrees, Degrees) {
    let lon = rad_to_deg(f64::atan2(v[1], v[0]));
    let lat = rad_to_deg(f64::atan2(v[2], v[0].hypot(v[1])));
    (modulo(lon, 360.), lat)
}

fn from_spherical(lon: Degrees, lat: Degrees, r: f64) -> Vector {
    let (lon, lat) = (deg_to_rad(lon), deg_to_rad(lat));
    [
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    ]
}

/// Tilts ecliptic coordinates of date onto the equator
fn ecliptic_to_equatorial(lon: Degrees, lat: Degrees, centuries: f64) -> AngularPosition {
    let obliquity = deg_to_rad(23.439_291 - 0.013_004_2 * centuries);
    let (sin_e, cos_e) = obliquity.sin_cos();
    let [x, y, z] = from_spherical(lon, lat, 1.);
    let (ra, dec) = to_spherical([x, y * cos_e - z * sin_e, y * sin_e + z * cos_e]);
    AngularPosition::new(ra, dec)
}

/* Orbits */

/// Eccentric anomaly for a mean anomaly, both in radians
fn solve_kepler(mean_anomaly: Radians, eccentricity: f64) -> Radians {
    let mut anomaly = mean_anomaly + eccentricity * mean_anomaly.sin();
    for _ in 0..KEPLER_MAX_ITERATIONS {
        let step = (anomaly - eccentricity * anomaly.sin() - mean_anomaly)
            / (1. - eccentricity * anomaly.cos());
        anomaly -= step;
        if step.abs() < 1E-12 {
            break;
        }
    }
    anomaly
}

/// Position on an orbit, from in-plane coordinates (x towards perihelion) to the
/// reference plane. Angles in radians.
fn orbit_to_reference_plane(
    x: f64,
    y: f64,
    arg_perihelion: Radians,
    node: Radians,
    inclination: Radians,
) -> Vector {
    let (sin_w, cos_w) = arg_perihelion.sin_cos();
    let (sin_n, cos_n) = node.sin_cos();
    let (sin_i, cos_i) = inclination.sin_cos();
    [
        (cos_w * cos_n - sin_w * sin_n * cos_i) * x + (-sin_w * cos_n - cos_w * sin_n * cos_i) * y,
        (cos_w * sin_n + sin_w * cos_n * cos_i) * x + (-sin_w * sin_n + cos_w * cos_n * cos_i) * y,
        sin_w * sin_i * x + cos_w * sin_i * y,
    ]
}

/// Mean elements on the J2000 ecliptic and their rates per Julian century:
/// semi-major axis (au), eccentricity, inclination, mean longitude,
/// longitude of perihelion, longitude of the ascending node
struct Orbit {
    at_epoch: [f64; 6],
    per_century: [f64; 6],
}

// Standish, "Keplerian Elements for Approximate Positions of the Major Planets"
const MERCURY: Orbit = Orbit {
    at_epoch: [0.387_099_27, 0.205_635_93, 7.004_979_02, 252.250_323_5, 77.457_796_28, 48.330_765_93],
    per_century: [0.000_000_37, 0.000_019_06, -0.005_947_49, 149_472.674_111_75, 0.160_476_89, -0.125_340_81],
};
const VENUS: Orbit = Orbit {
    at_epoch: [0.723_335_66, 0.006_776_72, 3.394_676_05, 181.979_099_5, 131.602_467_18, 76.679_842_55],
    per_century: [0.000_003_9, -0.000_041_07, -0.000_788_9, 58_517.815_387_29, 0.002_683_29, -0.277_694_18],
};
/// The earth-moon barycentre
const EARTH: Orbit = Orbit {
    at_epoch: [1.000_002_61, 0.016_711_23, -0.000_015_31, 100.464_571_66, 102.937_681_93, 0.],
    per_century: [0.000_005_62, -0.000_043_92, -0.012_946_68, 35_999.372_449_81, 0.323_273_64, 0.],
};
const MARS: Orbit = Orbit {
    at_epoch: [1.523_710_34, 0.093_394_1, 1.849_691_42, -4.553_432_05, -23.943_629_59, 49.559_538_91],
    per_century: [0.000_018_47, 0.000_078_82, -0.008_131_31, 19_140.302_684_99, 0.444_410_88, -0.292_573_43],
};
const JUPITER: Orbit = Orbit {
    at_epoch: [5.202_887, 0.048_386_24, 1.304_396_95, 34.396_440_51, 14.728_479_83, 100.473_909_09],
    per_century: [-0.000_116_07, -0.000_132_53, -0.001_837_14, 3_034.746_127_75, 0.212_526_68, 0.204_691_06],
};
const SATURN: Orbit = Orbit {
    at_epoch: [9.536_675_94, 0.053_861_79, 2.485_991_87, 49.954_244_23, 92.598_878_31, 113.662_424_48],
    per_century: [-0.001_250_6, -0.000_509_91, 0.001_936_09, 1_222.493_622_01, -0.418_972_16, -0.288_677_94],
};
const URANUS: Orbit = Orbit {
    at_epoch: [19.189_164_64, 0.047_257_44, 0.772_637_83, 313.238_104_51, 170.954_276_3, 74.016_925_03],
    per_century: [-0.001_961_76, -0.000_043_97, -0.002_429_39, 428.482_027_85, 0.408_052_81, 0.042_405_89],
};
const NEPTUNE: Orbit = Orbit {
    at_epoch: [30.069_922_76, 0.008_590_48, 1.770_043_47, -55.120_029_69, 44.964_762_27, 131.784_225_74],
    per_century: [0.000_262_91, 0.000_051_05, 0.000_353_72, 218.459_453_25, -0.322_414_64, -0.005_086_64],
};

/// Heliocentric position on the J2000 ecliptic in au
fn heliocentric(orbit: &Orbit, centuries: f64) -> Vector {
    let [a, e, inclination, mean_longitude, perihelion, node]: [f64; 6] =
        std::array::from_fn(|i| orbit.at_epoch[i] + orbit.per_century[i] * centuries);

    let mean_anomaly = deg_to_rad(modulo(mean_longitude - perihelion, 360.));
    let anomaly = solve_kepler(mean_anomaly, e);
    orbit_to_reference_plane(
        a * (anomaly.cos() - e),
        a * (1. - e * e).sqrt() * anomaly.sin(),
        deg_to_rad(perihelion - node),
        deg_to_rad(node),
        deg_to_rad(inclination),
    )
}

fn planet_position(orbit: &Orbit, time: DateTime<Utc>) -> AngularPosition {
    let centuries = julian_centuries_tt(time);
    let planet = heliocentric(orbit, centuries);
    let earth = heliocentric(&EARTH, centuries);

    let (lon, lat) = to_spherical(std::array::from_fn(|i| planet[i] - earth[i]));
    // from the J2000 equinox to the equinox of date
    ecliptic_to_equatorial(lon + PRECESSION_PER_CENTURY * centuries, lat, centuries)
}

/* Sun */

/// The NOAA solar model: declination and the equation of time, with the hour angle
/// taken against our own sidereal clock
pub fn sun_position(time: DateTime<Utc>) -> AngularPosition {
    let sun = NOAASun {
        year: time.year() as u16,
        doy: time.ordinal() as u16,
        long: 0.,
        lat: 0.,
        timezone: 0.,
        hour: time.hour() as u8,
        min: time.minute() as u8,
        sec: time.second() as u8,
    };

    let hours = time.num_seconds_from_midnight() as f64 / 3600.;
    let greenwich_hour_angle = 15. * hours - 180. + sun.true_eot_in_mins() / 4.;
    AngularPosition::new(
        modulo(greenwich_sidereal_time(time) - greenwich_hour_angle, 360.),
        sun.alt_true_declination() as f64,
    )
}

/* Moon */

const MOON_ECCENTRICITY: f64 = 0.054_900;
/// Earth radii
const MOON_SEMI_MAJOR_AXIS: f64 = 60.2666;
const MOON_INCLINATION: Degrees = 5.1454;

/// Geocentric (ra, dec) of the Moon and its distance in earth radii
fn moon_geocentric(time: DateTime<Utc>) -> (AngularPosition, f64) {
    // days from 2000 January 0.0
    let d = julian_date(time) - 2_451_543.5;
    let node = 125.1228 - 0.052_953_808_3 * d;
    let arg_perigee = 318.0634 + 0.164_357_322_3 * d;
    let mean_anomaly = 115.3654 + 13.064_992_950_9 * d;
    let sun_mean_anomaly = 356.0470 + 0.985_600_258_5 * d;
    let sun_mean_longitude = sun_mean_anomaly + 282.9404 + 4.709_35E-5 * d;

    let e = MOON_ECCENTRICITY;
    let anomaly = solve_kepler(deg_to_rad(modulo(mean_anomaly, 360.)), e);
    let position = orbit_to_reference_plane(
        MOON_SEMI_MAJOR_AXIS * (anomaly.cos() - e),
        MOON_SEMI_MAJOR_AXIS * (1. - e * e).sqrt() * anomaly.sin(),
        deg_to_rad(arg_perigee),
        deg_to_rad(node),
        deg_to_rad(MOON_INCLINATION),
    );
    let (lon, lat) = to_spherical(position);

    let mean_longitude = node + arg_perigee + mean_anomaly;
    let elong = deg_to_rad(mean_longitude - sun_mean_longitude);
    let from_node = deg_to_rad(mean_longitude - node);
    let mm = deg_to_rad(mean_anomaly);
    let ms = deg_to_rad(sun_mean_anomaly);

    let lon = lon - 1.274 * (mm - 2. * elong).sin() + 0.658 * (2. * elong).sin()
        - 0.186 * ms.sin()
        - 0.059 * (2. * mm - 2. * elong).sin()
        - 0.057 * (mm - 2. * elong + ms).sin()
        + 0.053 * (mm + 2. * elong).sin()
        + 0.046 * (2. * elong - ms).sin()
        + 0.041 * (mm - ms).sin()
        - 0.035 * elong.sin()
        - 0.031 * (mm + ms).sin()
        - 0.015 * (2. * from_node - 2. * elong).sin()
        + 0.011 * (mm - 4. * elong).sin();
    let lat = lat - 0.173 * (from_node - 2. * elong).sin()
        - 0.055 * (mm - from_node - 2. * elong).sin()
        - 0.046 * (mm + from_node - 2. * elong).sin()
        + 0.033 * (from_node + 2. * elong).sin()
        + 0.017 * (2. * mm + from_node).sin();
    let distance =
        norm(position) - 0.58 * (mm - 2. * elong).cos() - 0.46 * (2. * elong).cos();

    (
        ecliptic_to_equatorial(lon, lat, julian_centuries_tt(time)),
        distance,
    )
}

/// Moves a geocentric position `distance` earth radii away to where it appears
/// from `location` (elevation in metres)
pub fn topocentric(
    geocentric: AngularPosition,
    distance: f64,
    location: &ObservingLocation,
    time: DateTime<Utc>,
) -> AngularPosition {
    let lat = deg_to_rad(location.latitude);
    let reduced_lat = (EARTH_AXIS_RATIO * lat.tan()).atan();
    let height = location.elevation / EARTH_RADIUS_M;
    let rho_sin = EARTH_AXIS_RATIO * reduced_lat.sin() + height * lat.sin();
    let rho_cos = reduced_lat.cos() + height * lat.cos();
    let lst = deg_to_rad(local_sidereal_time(time, location.longitude));

    let [x, y, z] = from_spherical(geocentric.primary, geocentric.secondary, distance);
    let (ra, dec) = to_spherical([
        x - rho_cos * lst.cos(),
        y - rho_cos * lst.sin(),
        z - rho_sin,
    ]);
    AngularPosition::new(ra, dec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro_math::great_circle::distance;
    use crate::astro_math::{horizontal_from_hour_angle, hour_angle};
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn geocentre() -> ObservingLocation {
        ObservingLocation {
            latitude: 0.,
            longitude: 0.,
            elevation: 0.,
            pressure: 0.,
        }
    }

    #[test]
    fn test_body_names() {
        assert_eq!(Body::from_name("jupiter"), Some(Body::Jupiter));
        assert_eq!(Body::from_name(" MOON "), Some(Body::Moon));
        assert_eq!(Body::from_name("Pluto"), None);
        for body in Body::ALL {
            assert_eq!(Body::from_name(body.name()), Some(body));
        }
    }

    #[test]
    fn test_kepler() {
        let anomaly = solve_kepler(deg_to_rad(5.), 0.1);
        assert_float_absolute_eq!(rad_to_deg(anomaly), 5.554_589, 1E-5);
        assert_eq!(solve_kepler(0., 0.9), 0.);
    }

    #[test]
    fn test_sun_at_equinoxes_and_solstices() {
        // (time, ra, dec)
        let cases = [
            (at(2023, 3, 20, 21, 24), 0., 0.),
            (at(2023, 6, 21, 14, 57), 90., 23.44),
            (at(2023, 12, 22, 3, 27), 270., -23.44),
        ];
        for (time, ra, dec) in cases {
            let sun = sun_position(time);
            let ra_error = modulo(sun.primary - ra + 180., 360.) - 180.;
            assert_float_absolute_eq!(ra_error, 0., 0.3);
            assert_float_absolute_eq!(sun.secondary, dec, 0.3);
        }
    }

    #[test]
    fn test_venus() {
        // Meeus, Astronomical Algorithms, example 33.a
        let venus = Body::Venus.position(&geocentre(), at(1992, 12, 20, 0, 0));
        assert_float_absolute_eq!(venus.primary, 316.172_73, 0.02);
        assert_float_absolute_eq!(venus.secondary, -18.888_01, 0.02);
    }

    #[test]
    fn test_moon_geocentric() {
        // Meeus, Astronomical Algorithms, example 47.a
        let (moon, distance) = moon_geocentric(at(1992, 4, 12, 0, 0));
        assert_float_absolute_eq!(moon.primary, 134.688_47, 0.05);
        assert_float_absolute_eq!(moon.secondary, 13.768_37, 0.05);
        assert_float_absolute_eq!(distance, 368_409.7 / 6_378.14, 0.1);
    }

    #[test]
    fn test_moon_parallax() {
        let time = at(1992, 4, 12, 0, 0);
        let (moon, earth_radii) = moon_geocentric(time);
        let gst = greenwich_sidereal_time(time);

        // straight overhead the observer sits on the line to the Moon
        let below = ObservingLocation {
            latitude: moon.secondary,
            longitude: moon.primary - gst,
            ..geocentre()
        };
        let seen = Body::Moon.position(&below, time);
        assert!(distance(seen, moon) < 0.01);

        // setting in the west it drops by the horizontal parallax
        let setting = ObservingLocation {
            longitude: moon.primary + 90. - gst,
            ..geocentre()
        };
        let seen = Body::Moon.position(&setting, time);
        let ha = hour_angle(time, setting.longitude, seen.primary);
        let (_, alt) = horizontal_from_hour_angle(ha, seen.secondary, setting.latitude);
        assert_float_absolute_eq!(alt, -rad_to_deg((1. / earth_radii).asin()), 0.03);
    }

    #[test]
    fn test_great_conjunction() {
        // Jupiter passed six arcminutes from Saturn
        let time = at(2020, 12, 21, 18, 0);
        let jupiter = Body::Jupiter.position(&geocentre(), time);
        let saturn = Body::Saturn.position(&geocentre(), time);
        assert!(distance(jupiter, saturn) < 0.2);
        assert_float_absolute_eq!(jupiter.primary, 302.8, 0.5);
        assert_float_absolute_eq!(jupiter.secondary, -20.5, 0.5);
    }

    #[test]
    fn test_jupiter_meets_neptune() {
        let time = at(2022, 4, 12, 18, 0);
        let jupiter = Body::Jupiter.position(&geocentre(), time);
        let neptune = Body::Neptune.position(&geocentre(), time);
        assert!(distance(jupiter, neptune) < 0.25);
    }

    #[test]
    fn test_mercury_transit() {
        let time = at(2019, 11, 11, 15, 20);
        let mercury = Body::Mercury.position(&geocentre(), time);
        assert!(distance(mercury, sun_position(time)) < 0.35);
    }

    #[test]
    fn test_mars_opposition() {
        let time = at(2020, 10, 13, 23, 20);
        let mars = Body::Mars.position(&geocentre(), time);
        let ra_gap = modulo(mars.primary - sun_position(time).primary, 360.);
        assert_float_absolute_eq!(ra_gap, 180., 2.);
    }

    #[test]
    fn test_eclipse_and_uranus_occultation() {
        // total lunar eclipse, with the Moon passing over Uranus at opposition
        let time = at(2022, 11, 8, 11, 0);
        let sun = sun_position(time);
        let (moon, _) = moon_geocentric(time);
        let uranus = Body::Uranus.position(&geocentre(), time);
        assert!(distance(moon, sun) > 179.4);
        assert!(distance(uranus, sun) > 178.5);
        assert!(distance(moon, uranus) < 1.5);
    }
}
