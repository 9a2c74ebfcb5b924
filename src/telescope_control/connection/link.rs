use super::LinkResult;
use crate::util::*;

/// A two axis motor controller.
///
/// Everything except the queries is fire and forget: a command returning `Ok`
/// only means the controller accepted it. Position commands take effect on the
/// next `begin_motion`. Implementations must allow concurrent queries.
pub trait MotorLink: Send + Sync {
    fn move_absolute(&self, axis: Axis, counts: i64) -> LinkResult<()>;
    fn move_relative(&self, axis: Axis, delta_counts: i64) -> LinkResult<()>;
    /// counts/sec
    fn set_speed(&self, axis: Axis, counts_per_sec: i64) -> LinkResult<()>;
    /// counts/sec^2, used for both acceleration and deceleration
    fn set_accel(&self, axis: Axis, counts_per_sec2: i64) -> LinkResult<()>;
    fn begin_motion(&self) -> LinkResult<()>;
    fn stop_all(&self) -> LinkResult<()>;
    fn stop_axis(&self, axis: Axis) -> LinkResult<()>;
    /// Redefines the current encoder reading of `axis` as `counts`
    fn define_position(&self, axis: Axis, counts: i64) -> LinkResult<()>;

    fn position_counts(&self) -> LinkResult<EncoderPosition>;
    fn is_in_motion(&self, axis: Axis) -> LinkResult<bool>;
    fn is_motor_powered(&self, axis: Axis) -> LinkResult<bool>;
    fn set_motor_power(&self, axis: Axis, on: bool) -> LinkResult<()>;
}
