use std::time::Duration;

use async_trait::async_trait;
use tokio::select;
use tokio::time::{self, Interval, MissedTickBehavior};
use tracing::warn;

use super::connection::consts::SETTLE_POLLS;
use super::connection::Link;
use super::converter::CoordinateConverter;
use super::worker::{Halt, StepResult};
use crate::astro_math::{deg_to_rad, modulo};
use crate::config::Config;
use crate::util::*;

/// Below this cos(elevation) the azimuth axis is treated as if at this value
pub(in crate::telescope_control) const MIN_COS_ELEVATION: f64 = 0.01;

/// Stand-in distance for zero length moves
pub(in crate::telescope_control) const MIN_DISTANCE: Degrees = 0.01;

#[async_trait]
pub(in crate::telescope_control) trait Waiter {
    fn get_check_interval(&self) -> Interval;
    async fn check(&mut self, link: &Link) -> MountResult<bool>;

    /// Polls `check` until it passes, giving up as soon as `abort` is ready
    async fn wait(&mut self, link: &Link, abort: &WaitableTask<()>) -> StepResult<()> {
        let mut check_interval = self.get_check_interval();

        loop {
            select! {
                _ = check_interval.tick() => {}
                _ = abort.clone() => return Err(Halt::Cancelled),
            }
            if abort.is_ready() {
                return Err(Halt::Cancelled);
            }
            if self.check(link).await? {
                return Ok(());
            }
        }
    }
}

fn interval(period: Duration) -> Interval {
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Remaining (azimuth, elevation) distance in degrees, taking the short way round in azimuth
pub(in crate::telescope_control) fn remaining(
    from: AngularPosition,
    to: AngularPosition,
) -> (Degrees, Degrees) {
    let d_az = modulo(to.primary - from.primary, 360.);
    let d_az = d_az.min(360. - d_az);
    (d_az, (to.secondary - from.secondary).abs())
}

/// Waits until the mount is within `lead_time` seconds of `target`.
///
/// Time to arrival is estimated per axis with the same speed split the slew uses.
/// Also gives up waiting once both axes have reported stationary for a few polls
/// in a row, since a mount that stopped short is never going to arrive.
pub struct ArrivalWaiter {
    converter: CoordinateConverter,
    target: AngularPosition,
    speed: f64,
    lead_time: f64,
    poll_interval: Duration,
    stationary_polls: u32,
}

impl ArrivalWaiter {
    pub fn new(config: &Config, target: AngularPosition) -> Self {
        ArrivalWaiter {
            converter: CoordinateConverter::new(config),
            target,
            speed: config.slew.speed,
            lead_time: config.control.lead_time_secs,
            poll_interval: config.control.poll_interval(),
            stationary_polls: 0,
        }
    }

    /// Seconds until arrival on each axis at nominal speed
    pub fn time_to_arrival(&self, current: AngularPosition) -> (f64, f64) {
        let alt_av = deg_to_rad(0.5 * (current.secondary + self.target.secondary));
        let (d_az, d_el) = remaining(current, self.target);
        let delta = ((d_az * alt_av.cos()).powi(2) + d_el.powi(2)).sqrt();
        let delta = if delta == 0. { MIN_DISTANCE } else { delta };

        let speed_az = d_az / delta * self.speed / alt_av.cos().max(MIN_COS_ELEVATION);
        let speed_el = d_el / delta * self.speed;

        let t_az = if d_az == 0. { 0. } else { d_az / speed_az };
        let t_el = if d_el == 0. { 0. } else { d_el / speed_el };
        (t_az, t_el)
    }

    fn is_stationary(link: &Link) -> MountResult<bool> {
        for axis in Axis::BOTH {
            if link.is_in_motion(axis)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl Waiter for ArrivalWaiter {
    fn get_check_interval(&self) -> Interval {
        interval(self.poll_interval)
    }

    async fn check(&mut self, link: &Link) -> MountResult<bool> {
        let current = self.converter.encoder_to_position(link.position_counts()?);
        let (t_az, t_el) = self.time_to_arrival(current);
        if t_az < self.lead_time && t_el < self.lead_time {
            return Ok(true);
        }

        if Self::is_stationary(link)? {
            self.stationary_polls += 1;
            if SETTLE_POLLS <= self.stationary_polls {
                let (d_az, d_el) = remaining(current, self.target);
                warn!(
                    "Mount settled {:.3} deg az, {:.3} deg el short of ({:.3}, {:.3})",
                    d_az, d_el, self.target.primary, self.target.secondary
                );
                return Ok(true);
            }
        } else {
            self.stationary_polls = 0;
        }
        Ok(false)
    }
}

/// Waits until neither axis is moving
pub struct StopWaiter {
    poll_interval: Duration,
}

impl StopWaiter {
    pub fn new(config: &Config) -> Self {
        StopWaiter {
            poll_interval: config.control.poll_interval(),
        }
    }
}

#[async_trait]
impl Waiter for StopWaiter {
    fn get_check_interval(&self) -> Interval {
        interval(self.poll_interval)
    }

    async fn check(&mut self, link: &Link) -> MountResult<bool> {
        ArrivalWaiter::is_stationary(link)
    }
}
