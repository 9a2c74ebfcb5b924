use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Datelike, Utc};

use crate::astro_math::solar_system::{self, Body};
use crate::config::ObservingLocation;
use crate::util::*;

/// Looks up where a named object is on the sky
pub trait CelestialSource: Send + Sync {
    /// (ra, dec) in degrees
    fn position_of(
        &self,
        object_id: &str,
        location: &ObservingLocation,
        time: DateTime<Utc>,
    ) -> MountResult<AngularPosition>;
}

fn unknown(object_id: &str) -> MountError {
    MountError::InvalidValue(format!("Unknown object {}", object_id))
}

/// Tries the first source, then the second
impl<A: CelestialSource, B: CelestialSource> CelestialSource for (A, B) {
    fn position_of(
        &self,
        object_id: &str,
        location: &ObservingLocation,
        time: DateTime<Utc>,
    ) -> MountResult<AngularPosition> {
        self.0
            .position_of(object_id, location, time)
            .or_else(|_| self.1.position_of(object_id, location, time))
    }
}

/* Catalog */

/// Objects fixed on the sky, looked up by name ignoring case
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, AngularPosition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, name: &str, ra: Degrees, dec: Degrees) -> Self {
        self.insert(name, ra, dec);
        self
    }

    pub fn insert(&mut self, name: &str, ra: Degrees, dec: Degrees) {
        self.entries
            .insert(name.trim().to_lowercase(), AngularPosition::new(ra, dec));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<AngularPosition> {
        self.entries.get(&name.trim().to_lowercase()).copied()
    }

    /// Reads the ';' delimited NGC/IC export: `_RAJ2000;_DEJ2000;Cat;NGC/IC`.
    /// Everything up to the line starting with `--` is header. Objects are named
    /// `IC n` when `Cat` is `I` and `NGC n` otherwise.
    pub fn parse_ngc_ic(text: &str) -> MountResult<Self> {
        let mut catalog = Catalog::new();
        let mut started = false;

        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            if !started {
                started = line.starts_with("--");
                continue;
            }

            let bad_line = || {
                MountError::InvalidValue(format!("Bad catalog line {}: {}", number + 1, line))
            };
            let fields: Vec<&str> = line.split(';').map(str::trim).collect();
            if fields.len() < 4 {
                return Err(bad_line());
            }
            let ra: Degrees = fields[0].parse().map_err(|_| bad_line())?;
            let dec: Degrees = fields[1].parse().map_err(|_| bad_line())?;
            let id: u32 = fields[3].parse().map_err(|_| bad_line())?;
            check_dec(dec).map_err(|_| bad_line())?;

            let prefix = if fields[2] == "I" { "IC" } else { "NGC" };
            catalog.insert(&format!("{} {}", prefix, id), ra, dec);
        }

        Ok(catalog)
    }

    pub fn load_ngc_ic(path: impl AsRef<Path>) -> MountResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            MountError::Configuration(format!("Could not read catalog {}: {}", path.display(), e))
        })?;
        Self::parse_ngc_ic(&text)
    }
}

impl CelestialSource for Catalog {
    fn position_of(
        &self,
        object_id: &str,
        _location: &ObservingLocation,
        _time: DateTime<Utc>,
    ) -> MountResult<AngularPosition> {
        self.get(object_id).ok_or_else(|| unknown(object_id))
    }
}

/* Solar system */

/// The Sun, Moon and planets, by name ignoring case.
/// The Moon is placed as seen from the observing location, not the earth's centre.
#[derive(Debug, Copy, Clone, Default)]
pub struct SolarSystem;

impl CelestialSource for SolarSystem {
    fn position_of(
        &self,
        object_id: &str,
        location: &ObservingLocation,
        time: DateTime<Utc>,
    ) -> MountResult<AngularPosition> {
        let body = Body::from_name(object_id).ok_or_else(|| unknown(object_id))?;
        if !solar_system::VALID_YEARS.contains(&time.year()) {
            return Err(MountError::InvalidValue(format!(
                "No ephemeris for {} in {}",
                body.name(),
                time.year()
            )));
        }
        Ok(body.position(location, time))
    }
}
