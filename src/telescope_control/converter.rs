use chrono::{DateTime, Local, Utc};

use crate::astro_math::{self, modulo};
use crate::config::{Config, EncoderSettings, ObservingLocation};
use crate::util::*;

/// Angle/encoder and horizontal/equatorial conversions for one mount configuration
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CoordinateConverter {
    location: ObservingLocation,
    encoders: EncoderSettings,
}

impl CoordinateConverter {
    pub fn new(config: &Config) -> Self {
        CoordinateConverter {
            location: config.observation_location,
            encoders: config.encoders,
        }
    }

    pub fn location(&self) -> &ObservingLocation {
        &self.location
    }

    pub fn counts_per_revolution(&self, axis: Axis) -> f64 {
        match axis {
            Axis::Primary => self.encoders.azimuth_counts_per_revolution,
            Axis::Secondary => self.encoders.elevation_counts_per_revolution,
        }
    }

    /* Encoder */

    /// Rounds half away from zero
    pub fn angle_to_encoder(&self, axis: Axis, degrees: Degrees) -> i64 {
        (self.counts_per_revolution(axis) / 360. * degrees).round() as i64
    }

    /// Azimuth is brought into [0, 360), elevation is returned as is
    pub fn encoder_to_angle(&self, axis: Axis, counts: i64) -> Degrees {
        let raw = self.encoder_to_raw_angle(axis, counts);
        match axis {
            Axis::Primary => modulo(raw, 360.),
            Axis::Secondary => raw,
        }
    }

    /// Like `encoder_to_angle` but keeps whole turns of azimuth
    pub fn encoder_to_raw_angle(&self, axis: Axis, counts: i64) -> Degrees {
        counts as f64 * 360. / self.counts_per_revolution(axis)
    }

    pub fn position_to_encoder(&self, pos: AngularPosition) -> EncoderPosition {
        EncoderPosition::new(
            self.angle_to_encoder(Axis::Primary, pos.primary),
            self.angle_to_encoder(Axis::Secondary, pos.secondary),
        )
    }

    pub fn encoder_to_position(&self, counts: EncoderPosition) -> AngularPosition {
        AngularPosition::new(
            self.encoder_to_angle(Axis::Primary, counts.primary),
            self.encoder_to_angle(Axis::Secondary, counts.secondary),
        )
    }

    pub fn encoder_to_raw_position(&self, counts: EncoderPosition) -> AngularPosition {
        AngularPosition::new(
            self.encoder_to_raw_angle(Axis::Primary, counts.primary),
            self.encoder_to_raw_angle(Axis::Secondary, counts.secondary),
        )
    }

    /* Sky */

    /// (ra, dec) in degrees to (az, alt) at `time`
    pub fn equatorial_to_horizontal(
        &self,
        equatorial: AngularPosition,
        time: DateTime<Utc>,
    ) -> AngularPosition {
        let ha = astro_math::hour_angle(time, self.location.longitude, equatorial.primary);
        let (az, alt) = astro_math::horizontal_from_hour_angle(
            ha,
            equatorial.secondary,
            self.location.latitude,
        );
        AngularPosition::new(az, alt)
    }

    /// (az, alt) to (ra, dec) in degrees at `time`
    pub fn horizontal_to_equatorial(
        &self,
        horizontal: AngularPosition,
        time: DateTime<Utc>,
    ) -> AngularPosition {
        let (ha, dec) = astro_math::hour_angle_from_horizontal(
            horizontal.primary,
            horizontal.secondary,
            self.location.latitude,
        );
        let lst = astro_math::local_sidereal_time(time, self.location.longitude);
        AngularPosition::new(modulo(lst - ha, 360.), dec)
    }

    /// Where an equatorial position will appear `offset_secs` from now
    pub fn equatorial_to_horizontal_in(
        &self,
        equatorial: AngularPosition,
        offset_secs: f64,
    ) -> AngularPosition {
        self.equatorial_to_horizontal(equatorial, time_in(offset_secs))
    }

    /* Display */

    pub fn local_sidereal_time(&self) -> String {
        let lst = astro_math::local_sidereal_time(Utc::now(), self.location.longitude);
        astro_math::format_sexagesimal(lst / 15.)
    }

    pub fn local_time(&self) -> String {
        format_clock(Local::now())
    }

    pub fn utc_time(&self) -> String {
        format_clock(Utc::now())
    }
}

pub(in crate::telescope_control) fn time_in(offset_secs: f64) -> DateTime<Utc> {
    Utc::now() + chrono::Duration::microseconds((offset_secs * 1E6) as i64)
}

fn format_clock<Tz: chrono::TimeZone>(time: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}.{:02}",
        time.format("%H:%M:%S"),
        time.timestamp_subsec_millis() / 10
    )
}
