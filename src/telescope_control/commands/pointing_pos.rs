use chrono::Utc;

use crate::telescope_control::Mount;
use crate::util::*;

impl Mount {
    /// Azimuth in [0, 360) and elevation, read from the encoders.
    /// Safe to call while a job is running.
    pub async fn current_position(&self) -> MountResult<AngularPosition> {
        let counts = self.link().await.position_counts()?;
        Ok(self.converter().await.encoder_to_position(counts))
    }

    /// Right ascension and declination (degrees) the mount is pointing at now
    pub async fn current_equatorial_position(&self) -> MountResult<AngularPosition> {
        let horizontal = self.current_position().await?;
        Ok(self
            .converter()
            .await
            .horizontal_to_equatorial(horizontal, Utc::now()))
    }

    /// Raw encoder angles, azimuth not wrapped
    pub(in crate::telescope_control) async fn raw_position(&self) -> MountResult<AngularPosition> {
        let counts = self.link().await.position_counts()?;
        Ok(self.converter().await.encoder_to_raw_position(counts))
    }
}
