use crate::astro_math::Degrees;
use crate::util::{MountError, MountResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/* Config */
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub observation_location: ObservingLocation,
    pub encoders: EncoderSettings,
    pub slew: SlewSettings,
    pub control: ControlSettings,
    pub simulator: SimulatorSettings,
}

impl Config {
    /// Rejects anything that would otherwise surface as a division by zero mid-slew
    pub fn validate(&self) -> MountResult<()> {
        fn positive(name: &str, value: f64) -> MountResult<()> {
            if value.is_finite() && 0. < value {
                Ok(())
            } else {
                Err(MountError::Configuration(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )))
            }
        }

        let location = &self.observation_location;
        if !(-90. ..=90.).contains(&location.latitude) {
            return Err(MountError::Configuration(format!(
                "latitude of {} is not valid",
                location.latitude
            )));
        }
        if !location.longitude.is_finite() {
            return Err(MountError::Configuration(format!(
                "longitude of {} is not valid",
                location.longitude
            )));
        }

        positive(
            "encoders.azimuth_counts_per_revolution",
            self.encoders.azimuth_counts_per_revolution,
        )?;
        positive(
            "encoders.elevation_counts_per_revolution",
            self.encoders.elevation_counts_per_revolution,
        )?;
        positive("slew.speed", self.slew.speed)?;
        positive("slew.accel", self.slew.accel)?;
        positive(
            "control.poll_interval_millis",
            self.control.poll_interval_millis as f64,
        )?;
        positive(
            "control.track_period_millis",
            self.control.track_period_millis as f64,
        )?;
        positive("control.lead_time_tolerance_secs", self.control.lead_time_tolerance_secs)?;
        positive("control.read_tries", self.control.read_tries as f64)?;
        positive(
            "control.max_lead_time_iterations",
            self.control.max_lead_time_iterations as f64,
        )?;
        if !(self.control.lead_time_secs.is_finite() && 0. <= self.control.lead_time_secs) {
            return Err(MountError::Configuration(format!(
                "control.lead_time_secs of {} is not valid",
                self.control.lead_time_secs
            )));
        }
        positive("simulator.default_speed", self.simulator.default_speed)?;
        if !(0. ..=1.).contains(&self.simulator.read_glitch_rate) {
            return Err(MountError::Configuration(format!(
                "simulator.read_glitch_rate of {} is not a probability",
                self.simulator.read_glitch_rate
            )));
        }
        Ok(())
    }
}

/* Location */
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservingLocation {
    pub latitude: Degrees,
    /// East positive
    pub longitude: Degrees,
    pub elevation: f64,
    /// mbar. Kept for the observer record, no refraction is applied
    pub pressure: f64,
}

impl Default for ObservingLocation {
    fn default() -> Self {
        Self {
            latitude: 51.47,
            longitude: 0.0,
            elevation: 15.0,
            pressure: 0.0,
        }
    }
}

/* Encoder scale */
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    pub azimuth_counts_per_revolution: f64,
    pub elevation_counts_per_revolution: f64,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            azimuth_counts_per_revolution: 1_024_000.,
            elevation_counts_per_revolution: 1_024_000.,
        }
    }
}

/* Nominal slew profile */
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlewSettings {
    /// deg/sec
    pub speed: f64,
    /// deg/sec^2
    pub accel: f64,
}

impl Default for SlewSettings {
    fn default() -> Self {
        Self {
            speed: 5.0,
            accel: 10.0,
        }
    }
}

/* Control loop timing */
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSettings {
    pub poll_interval_millis: u64,
    pub track_period_millis: u64,
    /// Move on to the next point once this close (in seconds) to arriving
    pub lead_time_secs: f64,
    pub lead_time_tolerance_secs: f64,
    pub max_lead_time_iterations: usize,
    pub read_tries: u64,
}

impl ControlSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_millis)
    }

    pub fn track_period(&self) -> Duration {
        Duration::from_millis(self.track_period_millis)
    }
}

impl Default for ControlSettings {
    fn default() -> Self {
        Self {
            poll_interval_millis: 10,
            track_period_millis: 500,
            lead_time_secs: 0.1,
            lead_time_tolerance_secs: 0.01,
            max_lead_time_iterations: 50,
            read_tries: 3,
        }
    }
}

/* Simulated motor controller */
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorSettings {
    /// Chance that a position read comes back garbled
    pub read_glitch_rate: f64,
    /// Speed used when a move is started without one, deg/sec
    pub default_speed: f64,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            read_glitch_rate: 0.0,
            default_speed: 2.0,
        }
    }
}
