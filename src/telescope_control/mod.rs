//! Mount control.
//!
//! [`Mount`] is the entry point: it owns the motor link and runs at most one
//! motion job (goto, track or scan) at a time. Starting a job cancels the
//! running one and waits for its worker to exit before any new command is sent.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

pub use celestial::*;
pub use commands::tracking::TrackTarget;
pub use connection::{Link, LinkError, LinkResult, MotorLink, SimCommand, SimulatedLink};
pub use converter::CoordinateConverter;
pub use job::JobHandle;
pub use worker::{solve_lead_time, AxisProfile, LeadTime, MotionWorker, SlewPlan};

use crate::config::Config;
use crate::util::*;
use job::ActiveJob;

mod celestial;
mod connection;
mod converter;
mod job;
#[cfg(test)]
mod test_util;
mod waiters;
mod worker;
mod commands {
    pub mod motors;
    pub mod pointing_pos;
    pub mod scan;
    pub mod slew;
    pub mod sync;
    pub mod tracking;
}

#[derive(Clone)]
pub struct Mount {
    pub(in crate::telescope_control) config: Arc<RwLock<Config>>,
    pub(in crate::telescope_control) motor: Arc<dyn MotorLink>,
    pub(in crate::telescope_control) source: Option<Arc<dyn CelestialSource>>,
    pub(in crate::telescope_control) job: Arc<Mutex<Option<ActiveJob>>>,
    pub(in crate::telescope_control) state: Arc<RwLock<MotionState>>,
}

impl Mount {
    pub fn new(config: &Config, motor: Arc<dyn MotorLink>) -> MountResult<Self> {
        config.validate()?;
        Ok(Mount {
            config: Arc::new(RwLock::new(config.clone())),
            motor,
            source: None,
            job: Arc::new(Mutex::new(None)),
            state: Arc::new(RwLock::new(MotionState::Idle)),
        })
    }

    /// Lets tracking follow named objects
    pub fn with_celestial_source(mut self, source: Arc<dyn CelestialSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub async fn motion_state(&self) -> MotionState {
        *self.state.read().await
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Converter for the current configuration, for previews and readouts
    pub async fn converter(&self) -> CoordinateConverter {
        CoordinateConverter::new(&*self.config.read().await)
    }

    pub(in crate::telescope_control) async fn link(&self) -> Link {
        let read_tries = self.config.read().await.control.read_tries;
        Link::new(self.motor.clone(), read_tries)
    }

    /// Swaps in a new configuration. Only allowed between jobs.
    pub async fn reconfigure(&self, config: Config) -> MountResult<()> {
        config.validate()?;
        let slot = self.job.lock().await;
        if job::is_busy(&slot) {
            return Err(MountError::InvalidOperation(
                "Can't reconfigure while the mount is moving".to_string(),
            ));
        }
        *self.config.write().await = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::worker::StepResult;
    use super::*;
    use crate::scans::ScanPath;

    #[test]
    fn test_bad_config_is_rejected() {
        let mut config = test_util::test_config();
        config.encoders.azimuth_counts_per_revolution = 0.;
        let sim = Arc::new(SimulatedLink::new(&test_util::test_config()));
        assert!(matches!(
            Mount::new(&config, sim),
            Err(MountError::Configuration(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reconfigure_only_between_jobs() {
        let (mount, _sim) = test_util::create_mount(None);
        let mut config = mount.config().await;
        config.slew.speed = 2.;

        let job = mount.goto(AngularPosition::new(90., 45.)).await.unwrap();
        assert!(mount.reconfigure(config.clone()).await.is_err());
        job.await;

        mount.reconfigure(config).await.unwrap();
        assert_float_absolute_eq!(mount.config().await.slew.speed, 2., 1E-12);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_job_cancels_old_one() {
        let (mount, sim) = test_util::create_mount(None);
        let first = mount.goto(AngularPosition::new(90., 0.)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        let second = mount.goto(AngularPosition::new(0., 20.)).await.unwrap();
        // the first worker is gone before the second is handed out
        assert!(first.is_ready());
        assert!(first.await.is_aborted());
        assert_eq!(second.await, AbortResult::Completed(Ok(())));

        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        let stop_at = sim
            .commands()
            .iter()
            .position(|c| *c == SimCommand::StopAll)
            .unwrap();
        // nothing from the first job after its stop
        let begins_after = sim.commands()[stop_at..]
            .iter()
            .filter(|c| **c == SimCommand::BeginMotion)
            .count();
        assert_eq!(begins_after, 1);

        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 0., 1E-3);
        assert_float_absolute_eq!(pos.secondary, 20., 1E-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_link_failure_aborts_job() {
        let (mount, sim) = test_util::create_mount(None);
        let job = mount.goto(AngularPosition::new(90., 0.)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        sim.fail_next_reads(100);
        let result = job.await;
        assert!(matches!(
            result,
            AbortResult::Completed(Err(MountError::LinkRead { tries: 3, .. }))
        ));
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert_eq!(mount.motion_state().await, MotionState::Idle);
        assert!(!mount.is_busy().await);
    }

    fn far_equatorial_point(mount_config: &Config) -> AngularPosition {
        CoordinateConverter::new(mount_config)
            .horizontal_to_equatorial(AngularPosition::new(180., 45.), chrono::Utc::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsettled_lead_time_fails_goto() {
        let mut config = test_util::test_config();
        config.control.max_lead_time_iterations = 1;
        let (mount, sim) = test_util::create_mount(Some(config.clone()));

        let job = mount
            .goto_equatorial(far_equatorial_point(&config))
            .await
            .unwrap();
        assert_eq!(
            job.await,
            AbortResult::Completed(Err(MountError::Convergence(1)))
        );
        assert_eq!(sim.count_commands(|c| *c == SimCommand::BeginMotion), 0);
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert!(!mount.is_busy().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsettled_lead_time_fails_scan() {
        let mut config = test_util::test_config();
        config.control.max_lead_time_iterations = 1;
        let (mount, sim) = test_util::create_mount(Some(config.clone()));

        let start = far_equatorial_point(&config);
        let path = ScanPath::equatorial(vec![
            start,
            AngularPosition::new(start.primary, start.secondary + 2.),
        ]);
        let job = mount.scan(path, Repeat::cycles(3)).await.unwrap();
        assert_eq!(
            job.await,
            AbortResult::Completed(Err(MountError::Convergence(1)))
        );
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert_eq!(mount.motion_state().await, MotionState::Idle);
    }

    async fn doomed_job(_worker: MotionWorker) -> StepResult<()> {
        panic!("worker fell over")
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_panic_still_finishes_job() {
        let (mount, sim) = test_util::create_mount(None);
        let job = mount
            .run_job("doomed", MotionState::Slewing, doomed_job)
            .await
            .unwrap();

        assert!(matches!(
            job.await,
            AbortResult::Completed(Err(MountError::WorkerLost(_)))
        ));
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert_eq!(mount.motion_state().await, MotionState::Idle);
        assert!(!mount.is_busy().await);

        // the slot is free for the next job and stop does not hang
        mount.stop().await.unwrap();
        let next = mount.goto(AngularPosition::new(10., 10.)).await.unwrap();
        assert_eq!(next.await, AbortResult::Completed(Ok(())));
    }

    #[tokio::test]
    async fn test_stop_when_idle_stops_motors() {
        let (mount, sim) = test_util::create_mount(None);
        mount.stop().await.unwrap();
        assert_eq!(sim.commands(), vec![SimCommand::StopAll]);
    }
}
