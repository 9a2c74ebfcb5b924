use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::astro_math::{deg_to_rad, great_circle, nearest_azimuth};
use crate::telescope_control::connection::consts::MIN_SPEED_COUNTS;
use crate::telescope_control::converter::time_in;
use crate::telescope_control::job::JobHandle;
use crate::telescope_control::waiters::MIN_COS_ELEVATION;
use crate::telescope_control::worker::StepResult;
use crate::telescope_control::{Mount, MotionWorker};
use crate::util::*;

/// What to follow across the sky
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrackTarget {
    /// Right ascension and declination in degrees
    Fixed(AngularPosition),
    /// Name understood by the mount's celestial source
    Object(String),
}

impl Mount {
    /// Follows `target` until stopped. The returned job only finishes early on error.
    pub async fn track(&self, target: TrackTarget) -> MountResult<JobHandle> {
        match &target {
            TrackTarget::Fixed(p) => {
                check_ra(p.primary)?;
                check_dec(p.secondary)?;
            }
            TrackTarget::Object(id) => {
                let source = self.source.as_ref().ok_or_else(|| {
                    MountError::InvalidOperation("No celestial source to look up objects".to_string())
                })?;
                let location = self.config.read().await.observation_location;
                source.position_of(id, &location, Utc::now())?;
            }
        }

        self.run_job("tracking", MotionState::Slewing, move |mut worker| async move {
            worker.track(&target).await
        })
        .await
    }
}

impl MotionWorker {
    fn target_horizontal(
        &self,
        target: &TrackTarget,
        time: DateTime<Utc>,
    ) -> MountResult<AngularPosition> {
        let equatorial = match target {
            TrackTarget::Fixed(p) => *p,
            TrackTarget::Object(id) => match &self.source {
                Some(source) => source.position_of(id, self.converter.location(), time)?,
                None => {
                    return Err(MountError::InvalidOperation(
                        "No celestial source to look up objects".to_string(),
                    ))
                }
            },
        };
        Ok(self.converter.equatorial_to_horizontal(equatorial, time))
    }

    pub(in crate::telescope_control) async fn track(&mut self, target: &TrackTarget) -> StepResult<()> {
        let start = self.target_horizontal(target, Utc::now())?;
        self.slew_and_stall(start).await?;
        self.set_state(MotionState::Tracking).await;

        let period = self.config.control.track_period();
        let secs = period.as_secs_f64();
        loop {
            self.check_cancelled()?;
            let next = self.target_horizontal(target, time_in(secs))?;
            self.follow(next, secs)?;
            self.pause(period).await?;
        }
    }

    /// Heads for `next` at the per axis speeds that get there in `secs`
    fn follow(&mut self, next: AngularPosition, secs: f64) -> StepResult<()> {
        let from = self.commanded.unwrap_or(next);
        let speed = great_circle::distance(from, next) / secs;
        let bearing = deg_to_rad(great_circle::bearing(from, next));

        let speed_az =
            (speed * bearing.sin()).abs() / deg_to_rad(next.secondary).cos().max(MIN_COS_ELEVATION);
        let speed_el = (speed * bearing.cos()).abs();
        let target = AngularPosition::new(nearest_azimuth(from.primary, next.primary), next.secondary);
        debug!(
            "Tracking to ({:.4}, {:.4}) at ({:.5}, {:.5}) deg/s",
            target.primary, target.secondary, speed_az, speed_el
        );

        for (axis, axis_speed) in [(Axis::Primary, speed_az), (Axis::Secondary, speed_el)] {
            let counts = self
                .converter
                .angle_to_encoder(axis, axis_speed)
                .max(MIN_SPEED_COUNTS);
            self.link.set_speed(axis, counts)?;
            self.link
                .move_absolute(axis, self.converter.angle_to_encoder(axis, target.get(axis)))?;
        }
        self.link.begin_motion()?;
        self.commanded = Some(target);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::super::super::test_util;
    use super::*;
    use crate::telescope_control::{Catalog, CoordinateConverter, SimCommand, SolarSystem};

    /// A star just up from the parked position
    fn nearby_star(converter: &CoordinateConverter) -> AngularPosition {
        converter.horizontal_to_equatorial(AngularPosition::new(0.5, 1.), Utc::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_during_track_sends_one_stop() {
        let (mount, sim) = test_util::create_mount(None);
        let target = nearby_star(&mount.converter().await);
        let job = mount.track(TrackTarget::Fixed(target)).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        let before = tokio::time::Instant::now();
        mount.stop().await.unwrap();
        assert!(tokio::time::Instant::now() - before <= Duration::from_millis(500));

        assert!(job.await.is_aborted());
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert_eq!(mount.motion_state().await, MotionState::Idle);

        // nothing more arrives from the stopped worker
        let sent = sim.commands().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(sim.commands().len(), sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_keeps_updating() {
        let (mount, sim) = test_util::create_mount(None);
        let target = nearby_star(&mount.converter().await);
        let job = mount.track(TrackTarget::Fixed(target)).await.unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(mount.motion_state().await, MotionState::Tracking);
        let begins = sim.count_commands(|c| *c == SimCommand::BeginMotion);
        // the initial slew plus one per track period
        assert!(begins >= 5, "{}", begins);
        assert!(!job.is_ready());

        mount.stop().await.unwrap();
        assert!(job.await.is_aborted());
    }

    #[tokio::test]
    async fn test_track_object_needs_source() {
        let (mount, _sim) = test_util::create_mount(None);
        assert!(matches!(
            mount.track(TrackTarget::Object("Vega".to_string())).await,
            Err(MountError::InvalidOperation(_))
        ));

        let mount = mount.with_celestial_source(Arc::new(
            Catalog::new().with_entry("Vega", 279.2347, 38.7837),
        ));
        assert!(matches!(
            mount.track(TrackTarget::Object("Deneb".to_string())).await,
            Err(MountError::InvalidValue(_))
        ));
        let job = mount
            .track(TrackTarget::Object("Vega".to_string()))
            .await
            .unwrap();
        mount.stop().await.unwrap();
        assert!(job.await.is_aborted());
    }

    #[tokio::test]
    async fn test_track_solar_system_bodies() {
        let (mount, _sim) = test_util::create_mount(None);
        let mount = mount.with_celestial_source(Arc::new((Catalog::new(), SolarSystem)));

        for name in ["Moon", "jupiter", "NEPTUNE"] {
            let job = mount
                .track(TrackTarget::Object(name.to_string()))
                .await
                .unwrap();
            mount.stop().await.unwrap();
            assert!(job.await.is_aborted(), "{}", name);
        }
        assert!(matches!(
            mount.track(TrackTarget::Object("Vulcan".to_string())).await,
            Err(MountError::InvalidValue(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_track_failure_stops_mount() {
        let (mount, sim) = test_util::create_mount(None);
        let target = nearby_star(&mount.converter().await);
        let job = mount.track(TrackTarget::Fixed(target)).await.unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;

        sim.set_rejecting(true);
        let result = job.await;
        assert!(matches!(
            result,
            AbortResult::Completed(Err(MountError::LinkCommand(_)))
        ));
        assert_eq!(mount.motion_state().await, MotionState::Idle);
    }
}
