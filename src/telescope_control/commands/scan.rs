use tracing::debug;

use crate::scans::{Frame, ScanPath};
use crate::telescope_control::job::JobHandle;
use crate::telescope_control::worker::StepResult;
use crate::telescope_control::{Mount, MotionWorker};
use crate::util::*;

impl Mount {
    /// Runs the mount along `path`, reversing direction between passes as `repeat` asks.
    /// Every point is checked before anything moves.
    pub async fn scan(&self, path: ScanPath, repeat: Repeat) -> MountResult<JobHandle> {
        path.validate()?;
        repeat.validate()?;

        self.run_job("scan", MotionState::Slewing, move |mut worker| async move {
            worker.scan(&path, repeat).await
        })
        .await
    }
}

impl MotionWorker {
    async fn run_points(&mut self, frame: Frame, points: &[AngularPosition]) -> StepResult<()> {
        match frame {
            Frame::Horizontal => self.process_horizontal_path(points).await,
            Frame::Equatorial => self.process_equatorial_path(points).await,
        }
    }

    pub(in crate::telescope_control) async fn scan(
        &mut self,
        path: &ScanPath,
        repeat: Repeat,
    ) -> StepResult<()> {
        let forward = &path.points;
        let reverse = path.reversed().points;

        // getting to the start is a slew, the rest is the scan proper
        self.run_points(path.frame, &forward[..1]).await?;
        self.set_state(MotionState::Scanning).await;
        self.run_points(path.frame, &forward[1..]).await?;

        match repeat {
            Repeat::Once => {}
            Repeat::Count {
                cycles,
                trailing_forward,
            } => {
                self.run_points(path.frame, &reverse).await?;
                for cycle in 1..cycles {
                    debug!("Scan cycle {} of {}", cycle + 1, cycles);
                    self.run_points(path.frame, forward).await?;
                    self.run_points(path.frame, &reverse).await?;
                }
                if trailing_forward {
                    debug!("Final forward pass");
                    self.run_points(path.frame, forward).await?;
                }
            }
            Repeat::Indefinite => loop {
                self.run_points(path.frame, &reverse).await?;
                self.run_points(path.frame, forward).await?;
            },
        }

        self.settle().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::super::super::test_util;
    use crate::scans::{self, ScanPath};
    use crate::telescope_control::SimCommand;
    use crate::util::*;

    fn square() -> ScanPath {
        ScanPath::horizontal(vec![
            AngularPosition::new(0., 10.),
            AngularPosition::new(2., 10.),
            AngularPosition::new(2., 12.),
            AngularPosition::new(0., 12.),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeat_runs_back_and_forth() {
        let (mount, sim) = test_util::create_mount(None);
        let job = mount.scan(square(), Repeat::cycles(2)).await.unwrap();

        assert_eq!(job.await, AbortResult::Completed(Ok(())));
        assert_eq!(sim.count_commands(|c| *c == SimCommand::BeginMotion), 16);
        assert_eq!(mount.motion_state().await, MotionState::Idle);

        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 0., 1E-3);
        assert_float_absolute_eq!(pos.secondary, 10., 1E-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_half_cycle_ends_going_forward() {
        let (mount, sim) = test_util::create_mount(None);
        let repeat = Repeat::from_cycles(1.5).unwrap();
        let job = mount.scan(square(), repeat).await.unwrap();

        assert_eq!(job.await, AbortResult::Completed(Ok(())));
        // forward, back, forward
        assert_eq!(sim.count_commands(|c| *c == SimCommand::BeginMotion), 12);
        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 0., 1E-3);
        assert_float_absolute_eq!(pos.secondary, 12., 1E-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_once_is_one_direction() {
        let (mount, sim) = test_util::create_mount(None);
        let job = mount.scan(square(), Repeat::Once).await.unwrap();

        assert_eq!(job.await, AbortResult::Completed(Ok(())));
        assert_eq!(sim.count_commands(|c| *c == SimCommand::BeginMotion), 4);
        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 0., 1E-3);
        assert_float_absolute_eq!(pos.secondary, 12., 1E-3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_pass() {
        let (mount, sim) = test_util::create_mount(None);
        let path = scans::serpentine(
            AngularPosition::new(0., 10.),
            AngularPosition::new(40., 10.),
            AngularPosition::new(40., 50.),
            AngularPosition::new(0., 50.),
            8,
        )
        .unwrap();
        let job = mount
            .scan(ScanPath::horizontal(path), Repeat::Indefinite)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert_eq!(mount.motion_state().await, MotionState::Scanning);

        let before = tokio::time::Instant::now();
        mount.stop().await.unwrap();
        assert!(tokio::time::Instant::now() - before <= Duration::from_millis(100));
        assert!(job.await.is_aborted());
        assert_eq!(sim.count_commands(|c| *c == SimCommand::StopAll), 1);
        assert_eq!(mount.motion_state().await, MotionState::Idle);
    }

    #[tokio::test]
    async fn test_bad_scans_are_rejected_up_front() {
        let (mount, sim) = test_util::create_mount(None);
        assert!(mount
            .scan(ScanPath::horizontal(vec![]), Repeat::Once)
            .await
            .is_err());
        assert!(mount.scan(square(), Repeat::cycles(0)).await.is_err());

        let mut bad = square();
        bad.points.push(AngularPosition::new(0., 91.));
        assert!(mount.scan(bad, Repeat::Once).await.is_err());
        assert!(sim.commands().is_empty());
        assert!(!mount.is_busy().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_equatorial_scan() {
        let (mount, sim) = test_util::create_mount(None);
        let converter = mount.converter().await;
        let points = [(100., 40.), (104., 40.), (104., 44.)]
            .iter()
            .map(|&(az, el)| {
                converter.horizontal_to_equatorial(AngularPosition::new(az, el), Utc::now())
            })
            .collect();

        let job = mount
            .scan(ScanPath::equatorial(points), Repeat::Once)
            .await
            .unwrap();
        assert_eq!(job.await, AbortResult::Completed(Ok(())));
        assert_eq!(sim.count_commands(|c| *c == SimCommand::BeginMotion), 3);

        let pos = mount.current_position().await.unwrap();
        assert_float_absolute_eq!(pos.primary, 104., 0.5);
        assert_float_absolute_eq!(pos.secondary, 44., 0.5);
    }
}
