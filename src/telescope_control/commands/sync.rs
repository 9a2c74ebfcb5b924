use tracing::{error, info};

use crate::telescope_control::job;
use crate::telescope_control::Mount;
use crate::util::*;

impl Mount {
    /// Declares that the mount is pointing at `position` (azimuth, altitude) right now,
    /// redefining both encoder readings to match
    pub async fn sync(&self, position: AngularPosition) -> MountResult<()> {
        check_az(position.primary)?;
        check_alt(position.secondary)?;

        // held so no job can start while the encoders are redefined
        let slot = self.job.lock().await;
        if job::is_busy(&slot) {
            error!(
                "Sync to ({}, {}) refused while a job is running",
                position.primary, position.secondary
            );
            return Err(MountError::InvalidOperation(
                "Can't sync while the mount is moving".to_string(),
            ));
        }

        let converter = self.converter().await;
        let counts = converter.position_to_encoder(position);
        let link = self.link().await;
        for axis in Axis::BOTH {
            link.define_position(axis, counts.get(axis))?;
        }
        info!(
            "Synced to ({}, {}) at counts ({}, {})",
            position.primary, position.secondary, counts.primary, counts.secondary
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::super::test_util;
    use crate::telescope_control::SimCommand;
    use crate::util::*;

    #[tokio::test]
    async fn test_sync_redefines_position() {
        let (mount, sim) = test_util::create_mount(None);
        mount.sync(AngularPosition::new(123.25, 45.5)).await.unwrap();

        assert_eq!(
            sim.commands(),
            vec![
                SimCommand::DefinePosition(Axis::Primary, 123_250),
                SimCommand::DefinePosition(Axis::Secondary, 45_500),
            ]
        );
        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 123.25, 1E-9);
        assert_float_absolute_eq!(pos.secondary, 45.5, 1E-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sync_refused_while_moving() {
        let (mount, sim) = test_util::create_mount(None);
        let job = mount.goto(AngularPosition::new(60., 20.)).await.unwrap();

        assert!(matches!(
            mount.sync(AngularPosition::new(0., 0.)).await,
            Err(MountError::InvalidOperation(_))
        ));
        assert_eq!(
            sim.count_commands(|c| matches!(c, SimCommand::DefinePosition(..))),
            0
        );
        // the job carries on untouched
        assert_eq!(job.await, AbortResult::Completed(Ok(())));
    }

    #[tokio::test]
    async fn test_sync_rejects_bad_angles() {
        let (mount, sim) = test_util::create_mount(None);
        assert!(mount.sync(AngularPosition::new(0., -91.)).await.is_err());
        assert!(sim.commands().is_empty());
    }
}
