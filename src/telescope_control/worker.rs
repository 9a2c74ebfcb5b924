use std::sync::Arc;
use std::time::Duration;

use tokio::select;
use tokio::sync::RwLock;
use tracing::debug;

use super::celestial::CelestialSource;
use super::connection::consts::MIN_SPEED_COUNTS;
use super::connection::Link;
use super::converter::CoordinateConverter;
use super::waiters::*;
use crate::astro_math::{deg_to_rad, great_circle, nearest_azimuth};
use crate::config::{Config, SlewSettings};
use crate::util::*;

/// Why a job stopped before finishing its work
#[derive(Debug, Clone, PartialEq)]
pub(in crate::telescope_control) enum Halt {
    Cancelled,
    Failed(MountError),
}

impl From<MountError> for Halt {
    fn from(e: MountError) -> Self {
        Halt::Failed(e)
    }
}

pub(in crate::telescope_control) type StepResult<T> = Result<T, Halt>;

/// Motion of one axis during a slew, in degrees
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AxisProfile {
    pub distance: Degrees,
    pub speed: Degrees,
    pub accel: Degrees,
}

impl AxisProfile {
    /// Trapezoidal profile time: accelerate, cruise, decelerate.
    /// Moves too short to reach full speed take the triangular profile.
    pub fn duration(&self) -> f64 {
        if self.distance == 0. || self.speed == 0. || self.accel == 0. {
            return 0.;
        }
        let ramp_distance = self.speed * self.speed / self.accel;
        if self.distance < ramp_distance {
            2. * (self.distance / self.accel).sqrt()
        } else {
            self.distance / self.speed + self.speed / self.accel
        }
    }
}

/// Everything needed to command a single slew
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SlewPlan {
    /// Destination with azimuth on the turn nearest the start
    pub target: AngularPosition,
    pub azimuth: AxisProfile,
    pub elevation: AxisProfile,
}

impl SlewPlan {
    /// Splits the nominal speed and acceleration between the axes so both
    /// arrive together on a straight line across the sky
    pub fn new(settings: &SlewSettings, from: AngularPosition, to: AngularPosition) -> Self {
        let target_az = nearest_azimuth(from.primary, to.primary);
        let alt_av = deg_to_rad(0.5 * (to.secondary + from.secondary));
        let d_az = target_az - from.primary;
        let d_el = to.secondary - from.secondary;
        let delta = ((d_az * alt_av.cos()).powi(2) + d_el.powi(2)).sqrt();
        let delta = if delta == 0. { MIN_DISTANCE } else { delta };
        let az_scale = d_az.abs() / delta / alt_av.cos().max(MIN_COS_ELEVATION);
        let el_scale = d_el.abs() / delta;

        SlewPlan {
            target: AngularPosition::new(target_az, to.secondary),
            azimuth: AxisProfile {
                distance: d_az.abs(),
                speed: az_scale * settings.speed,
                accel: az_scale * settings.accel,
            },
            elevation: AxisProfile {
                distance: d_el.abs(),
                speed: el_scale * settings.speed,
                accel: el_scale * settings.accel,
            },
        }
    }

    pub fn axis(&self, axis: Axis) -> &AxisProfile {
        match axis {
            Axis::Primary => &self.azimuth,
            Axis::Secondary => &self.elevation,
        }
    }

    /// Seconds, advisory only
    pub fn duration(&self) -> f64 {
        self.azimuth.duration().max(self.elevation.duration())
    }
}

/// Result of the lead time iteration for a moving target
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LeadTime {
    /// Seconds ahead of now the target was projected
    pub dt: f64,
    pub iterations: usize,
    /// Horizontal position of the target at `dt`
    pub position: AngularPosition,
}

/// Fixed point iteration on the time needed to reach a moving target from `from`.
/// `project` gives the target's horizontal position `dt` seconds from now.
pub fn solve_lead_time<F>(
    from: AngularPosition,
    project: F,
    speed: f64,
    tolerance: f64,
    max_iterations: usize,
) -> MountResult<LeadTime>
where
    F: Fn(f64) -> AngularPosition,
{
    let mut dt = 0.;
    for iteration in 1..=max_iterations {
        let position = project(dt);
        let next = great_circle::distance(from, position) / speed;
        if (next - dt).abs() < tolerance {
            return Ok(LeadTime {
                dt,
                iterations: iteration,
                position,
            });
        }
        dt = next;
    }
    Err(MountError::Convergence(max_iterations))
}

/// Runs the motion of a single job.
///
/// Holds a snapshot of the configuration taken when the job started, and the
/// job's cancellation token. Every wait races the token, and every step checks it
/// before commanding the link.
pub struct MotionWorker {
    pub(in crate::telescope_control) link: Link,
    pub(in crate::telescope_control) converter: CoordinateConverter,
    pub(in crate::telescope_control) config: Config,
    pub(in crate::telescope_control) source: Option<Arc<dyn CelestialSource>>,
    state: Arc<RwLock<MotionState>>,
    abort: WaitableTask<()>,
    /// Last position commanded, azimuth unwrapped
    pub(in crate::telescope_control) commanded: Option<AngularPosition>,
}

impl MotionWorker {
    pub(in crate::telescope_control) fn new(
        link: Link,
        config: Config,
        source: Option<Arc<dyn CelestialSource>>,
        state: Arc<RwLock<MotionState>>,
        abort: WaitableTask<()>,
    ) -> Self {
        MotionWorker {
            link,
            converter: CoordinateConverter::new(&config),
            config,
            source,
            state,
            abort,
            commanded: None,
        }
    }

    /// Slew time estimate without commanding anything
    pub fn estimate_slew(settings: &SlewSettings, from: AngularPosition, to: AngularPosition) -> f64 {
        SlewPlan::new(settings, from, to).duration()
    }

    pub(in crate::telescope_control) fn check_cancelled(&self) -> StepResult<()> {
        if self.abort.is_ready() {
            Err(Halt::Cancelled)
        } else {
            Ok(())
        }
    }

    pub(in crate::telescope_control) async fn pause(&self, duration: Duration) -> StepResult<()> {
        select! {
            _ = tokio::time::sleep(duration) => self.check_cancelled(),
            _ = self.abort.clone() => Err(Halt::Cancelled),
        }
    }

    pub(in crate::telescope_control) async fn set_state(&self, state: MotionState) {
        let mut lock = self.state.write().await;
        // a stop request owns the state from here on
        if !self.abort.is_ready() {
            *lock = state;
        }
    }

    /// Current position with azimuth in [0, 360)
    pub(in crate::telescope_control) fn current_position(&self) -> MountResult<AngularPosition> {
        Ok(self
            .converter
            .encoder_to_position(self.link.position_counts()?))
    }

    /// Where motion should be planned from: the last commanded point, or the encoders
    fn reference_position(&self) -> MountResult<AngularPosition> {
        match self.commanded {
            Some(p) => Ok(p),
            None => Ok(self
                .converter
                .encoder_to_raw_position(self.link.position_counts()?)),
        }
    }

    /// Commands a straight move to `target` and returns the estimated duration
    pub(in crate::telescope_control) fn slew(
        &mut self,
        target: AngularPosition,
        from: Option<AngularPosition>,
    ) -> StepResult<f64> {
        self.check_cancelled()?;
        let from = match from {
            Some(p) => p,
            None => self.reference_position()?,
        };
        let plan = SlewPlan::new(&self.config.slew, from, target);
        debug!(
            "Slewing from ({:.4}, {:.4}) to ({:.4}, {:.4})",
            from.primary, from.secondary, plan.target.primary, plan.target.secondary
        );

        for axis in Axis::BOTH {
            let start = self.converter.angle_to_encoder(axis, from.get(axis));
            let end = self.converter.angle_to_encoder(axis, plan.target.get(axis));
            if start == end {
                continue;
            }
            let profile = plan.axis(axis);
            let speed = self
                .converter
                .angle_to_encoder(axis, profile.speed)
                .max(MIN_SPEED_COUNTS);
            let accel = self
                .converter
                .angle_to_encoder(axis, profile.accel)
                .max(MIN_SPEED_COUNTS);
            self.link.set_speed(axis, speed)?;
            self.link.set_accel(axis, accel)?;
            self.link.move_absolute(axis, end)?;
        }
        self.link.begin_motion()?;
        self.commanded = Some(plan.target);

        Ok(plan.duration())
    }

    /// Blocks until within the configured lead time of `target`
    pub(in crate::telescope_control) async fn stall(&self, target: AngularPosition) -> StepResult<()> {
        ArrivalWaiter::new(&self.config, target)
            .wait(&self.link, &self.abort)
            .await
    }

    /// Blocks until both axes have stopped
    pub(in crate::telescope_control) async fn settle(&self) -> StepResult<()> {
        StopWaiter::new(&self.config)
            .wait(&self.link, &self.abort)
            .await
    }

    pub(in crate::telescope_control) async fn slew_and_stall(
        &mut self,
        target: AngularPosition,
    ) -> StepResult<()> {
        self.slew(target, None)?;
        let commanded = self.commanded.unwrap_or(target);
        self.stall(commanded).await
    }

    pub(in crate::telescope_control) async fn process_horizontal_path(
        &mut self,
        points: &[AngularPosition],
    ) -> StepResult<()> {
        for &point in points {
            self.check_cancelled()?;
            self.slew_and_stall(point).await?;
        }
        Ok(())
    }

    /// Where to aim for an equatorial point so the mount meets it on arrival
    pub(in crate::telescope_control) fn lead_target(
        &self,
        equatorial: AngularPosition,
    ) -> StepResult<LeadTime> {
        let from = self.reference_position()?;
        let control = &self.config.control;
        let lead = solve_lead_time(
            from,
            |dt| self.converter.equatorial_to_horizontal_in(equatorial, dt),
            self.config.slew.speed,
            control.lead_time_tolerance_secs,
            control.max_lead_time_iterations,
        )?;
        debug!(
            "Lead time {:.3}s after {} iterations",
            lead.dt, lead.iterations
        );
        Ok(lead)
    }

    pub(in crate::telescope_control) async fn process_equatorial_path(
        &mut self,
        points: &[AngularPosition],
    ) -> StepResult<()> {
        for &point in points {
            self.check_cancelled()?;
            let lead = self.lead_target(point)?;
            self.slew_and_stall(lead.position).await?;
        }
        Ok(())
    }
}
