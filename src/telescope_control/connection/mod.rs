use std::sync::Arc;

use tracing::warn;

pub use link::*;
pub use result::*;
pub use simulator::*;

use crate::util::*;
use consts::RETRY_MILLIS;

pub mod consts;
mod link;
mod result;
mod simulator;

/// The mount's handle on its motor link.
/// Queries are retried a bounded number of times, commands are sent once.
#[derive(Clone)]
pub struct Link {
    motor: Arc<dyn MotorLink>,
    read_tries: u64,
}

impl Link {
    pub fn new(motor: Arc<dyn MotorLink>, read_tries: u64) -> Self {
        Link {
            motor,
            read_tries: read_tries.max(1),
        }
    }

    /// Run a query on the link.
    /// On failure, the query will be retried up to `read_tries` tries in total.
    /// As such, `f` must not change the controller's state.
    fn read_with_retries<F, T>(&self, f: F) -> MountResult<T>
    where
        F: Fn() -> LinkResult<T>,
    {
        let tries = self.read_tries;
        let result = retry::retry_with_index(
            retry::delay::Fixed::from_millis(RETRY_MILLIS).take((tries - 1) as usize),
            |try_no| {
                let r = f();

                if let Err(e) = &r {
                    if try_no < tries {
                        warn!("Error reading from motor link: {} -- Retrying", e);
                    }
                }
                r
            },
        );

        result.map_err(|e| match e {
            retry::Error::Operation { error, tries, .. } => MountError::LinkRead {
                tries,
                message: error.to_string(),
            },
            retry::Error::Internal(message) => MountError::LinkRead { tries, message },
        })
    }

    fn command(result: LinkResult<()>) -> MountResult<()> {
        result.map_err(|e| MountError::LinkCommand(e.to_string()))
    }

    /* Queries */

    pub fn position_counts(&self) -> MountResult<EncoderPosition> {
        self.read_with_retries(|| self.motor.position_counts())
    }

    pub fn is_in_motion(&self, axis: Axis) -> MountResult<bool> {
        self.read_with_retries(|| self.motor.is_in_motion(axis))
    }

    pub fn is_motor_powered(&self, axis: Axis) -> MountResult<bool> {
        self.read_with_retries(|| self.motor.is_motor_powered(axis))
    }

    /* Commands */

    pub fn move_absolute(&self, axis: Axis, counts: i64) -> MountResult<()> {
        Self::command(self.motor.move_absolute(axis, counts))
    }

    pub fn move_relative(&self, axis: Axis, delta_counts: i64) -> MountResult<()> {
        Self::command(self.motor.move_relative(axis, delta_counts))
    }

    pub fn set_speed(&self, axis: Axis, counts_per_sec: i64) -> MountResult<()> {
        Self::command(self.motor.set_speed(axis, counts_per_sec))
    }

    pub fn set_accel(&self, axis: Axis, counts_per_sec2: i64) -> MountResult<()> {
        Self::command(self.motor.set_accel(axis, counts_per_sec2))
    }

    pub fn begin_motion(&self) -> MountResult<()> {
        Self::command(self.motor.begin_motion())
    }

    pub fn stop_all(&self) -> MountResult<()> {
        Self::command(self.motor.stop_all())
    }

    pub fn stop_axis(&self, axis: Axis) -> MountResult<()> {
        Self::command(self.motor.stop_axis(axis))
    }

    pub fn define_position(&self, axis: Axis, counts: i64) -> MountResult<()> {
        Self::command(self.motor.define_position(axis, counts))
    }

    pub fn set_motor_power(&self, axis: Axis, on: bool) -> MountResult<()> {
        Self::command(self.motor.set_motor_power(axis, on))
    }
}
