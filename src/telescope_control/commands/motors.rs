use tracing::info;

use crate::telescope_control::job;
use crate::telescope_control::Mount;
use crate::util::*;

impl Mount {
    pub async fn is_motor_powered(&self, axis: Axis) -> MountResult<bool> {
        self.link().await.is_motor_powered(axis)
    }

    /// Switches an axis motor on or off. Switching off is refused while a job is running.
    pub async fn set_motor_power(&self, axis: Axis, on: bool) -> MountResult<()> {
        let slot = self.job.lock().await;
        if !on && job::is_busy(&slot) {
            return Err(MountError::InvalidOperation(
                "Can't power down a motor while the mount is moving".to_string(),
            ));
        }
        self.link().await.set_motor_power(axis, on)?;
        info!("{:?} motor {}", axis, if on { "on" } else { "off" });
        Ok(())
    }
}
