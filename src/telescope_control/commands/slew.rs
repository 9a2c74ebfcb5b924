use tracing::debug;

use crate::telescope_control::connection::consts::MIN_SPEED_COUNTS;
use crate::telescope_control::job::{self, JobHandle};
use crate::telescope_control::{Mount, MotionWorker};
use crate::util::*;

impl Mount {
    /// Slews to a horizontal position and finishes once the mount is at rest there
    pub async fn goto(&self, target: AngularPosition) -> MountResult<JobHandle> {
        check_az(target.primary)?;
        check_alt(target.secondary)?;

        self.run_job("goto", MotionState::Slewing, move |mut worker| async move {
            worker.slew_and_stall(target).await?;
            worker.settle().await
        })
        .await
    }

    /// Slews to where an equatorial position will be when the mount gets there
    pub async fn goto_equatorial(&self, target: AngularPosition) -> MountResult<JobHandle> {
        check_ra(target.primary)?;
        check_dec(target.secondary)?;

        self.run_job("goto", MotionState::Slewing, move |mut worker| async move {
            let lead = worker.lead_target(target)?;
            worker.slew_and_stall(lead.position).await?;
            worker.settle().await
        })
        .await
    }

    /// Seconds a slew from the current position to `target` should take
    pub async fn estimate_slew(&self, target: AngularPosition) -> MountResult<f64> {
        let from = self.raw_position().await?;
        let settings = self.config.read().await.slew;
        Ok(MotionWorker::estimate_slew(&settings, from, target))
    }

    /// Moves one axis by `degrees` at the nominal slew speed, stopping any job first
    pub async fn jog(&self, axis: Axis, degrees: Degrees) -> MountResult<()> {
        if !degrees.is_finite() {
            return Err(MountError::InvalidValue(format!(
                "Jog of {} is not valid",
                degrees
            )));
        }

        let mut slot = self.job.lock().await;
        self.cancel_active(&mut slot).await;

        let converter = self.converter().await;
        let speed = self.config.read().await.slew.speed;
        let link = self.link().await;
        let delta = converter.angle_to_encoder(axis, degrees);
        debug!("Jogging {:?} by {} counts", axis, delta);

        link.set_speed(
            axis,
            converter.angle_to_encoder(axis, speed).max(MIN_SPEED_COUNTS),
        )?;
        link.move_relative(axis, delta)?;
        link.begin_motion()
    }

    /// Stops a single axis. Use `stop` while a job is running.
    pub async fn stop_axis(&self, axis: Axis) -> MountResult<()> {
        let slot = self.job.lock().await;
        if job::is_busy(&slot) {
            return Err(MountError::InvalidOperation(
                "Can't stop a single axis while a job is running".to_string(),
            ));
        }
        self.link().await.stop_axis(axis)
    }
}
