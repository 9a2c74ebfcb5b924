use std::sync::Mutex;

use rand::Rng;
use tokio::time::Instant;

use super::*;
use crate::config::Config;

/// Every command accepted by a [`SimulatedLink`], in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimCommand {
    MoveAbsolute(Axis, i64),
    MoveRelative(Axis, i64),
    SetSpeed(Axis, i64),
    SetAccel(Axis, i64),
    BeginMotion,
    StopAll,
    StopAxis(Axis),
    DefinePosition(Axis, i64),
    SetMotorPower(Axis, bool),
}

struct SimAxis {
    /// Position at `since`
    origin: f64,
    since: Instant,
    /// Where the axis is heading, if it is moving
    target: Option<i64>,
    /// Target waiting for the next begin
    pending: Option<i64>,
    /// counts/sec
    speed: f64,
    powered: bool,
}

impl SimAxis {
    fn new(speed: f64, now: Instant) -> Self {
        SimAxis {
            origin: 0.,
            since: now,
            target: None,
            pending: None,
            speed,
            powered: true,
        }
    }

    fn position(&self, now: Instant) -> f64 {
        match self.target {
            None => self.origin,
            Some(target) => {
                let travelled = self.speed * now.saturating_duration_since(self.since).as_secs_f64();
                let remaining = target as f64 - self.origin;
                if remaining.abs() <= travelled {
                    target as f64
                } else {
                    self.origin + remaining.signum() * travelled
                }
            }
        }
    }

    fn is_moving(&self, now: Instant) -> bool {
        match self.target {
            None => false,
            Some(target) => self.position(now) != target as f64,
        }
    }

    /// Re-bases the motion model at `now` without changing where the axis is
    fn freeze(&mut self, now: Instant) {
        self.origin = self.position(now);
        self.since = now;
        if !self.is_moving(now) {
            self.target = None;
        }
    }

    fn halt(&mut self, now: Instant) {
        self.freeze(now);
        self.target = None;
        self.pending = None;
    }

    /// Where a relative move is measured from
    fn reference(&self, now: Instant) -> i64 {
        self.pending
            .or(self.target)
            .unwrap_or_else(|| self.position(now).round() as i64)
    }
}

struct SimState {
    axes: [SimAxis; 2],
    log: Vec<SimCommand>,
    failing_reads: u32,
    rejecting: bool,
    connected: bool,
}

/// In-process motor controller.
///
/// Axes move at their commanded speed straight to their target, so arrival times are
/// exact. Time comes from tokio, so a paused test clock drives the simulation.
pub struct SimulatedLink {
    state: Mutex<SimState>,
    read_glitch_rate: f64,
    default_speed: [f64; 2],
}

fn index(axis: Axis) -> usize {
    match axis {
        Axis::Primary => 0,
        Axis::Secondary => 1,
    }
}

impl SimulatedLink {
    pub fn new(config: &Config) -> Self {
        let now = Instant::now();
        let speed = config.simulator.default_speed;
        let default_speed = [
            config.encoders.azimuth_counts_per_revolution / 360. * speed,
            config.encoders.elevation_counts_per_revolution / 360. * speed,
        ];

        SimulatedLink {
            state: Mutex::new(SimState {
                axes: [
                    SimAxis::new(default_speed[0], now),
                    SimAxis::new(default_speed[1], now),
                ],
                log: Vec::new(),
                failing_reads: 0,
                rejecting: false,
                connected: true,
            }),
            read_glitch_rate: config.simulator.read_glitch_rate,
            default_speed,
        }
    }

    /// Commands accepted so far
    pub fn commands(&self) -> Vec<SimCommand> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn count_commands(&self, pred: impl Fn(&SimCommand) -> bool) -> usize {
        self.state.lock().unwrap().log.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_commands(&self) {
        self.state.lock().unwrap().log.clear();
    }

    /// The next `n` queries return garbage
    pub fn fail_next_reads(&self, n: u32) {
        self.state.lock().unwrap().failing_reads = n;
    }

    /// While set, every command is refused
    pub fn set_rejecting(&self, rejecting: bool) {
        self.state.lock().unwrap().rejecting = rejecting;
    }

    pub fn set_connected(&self, connected: bool) {
        self.state.lock().unwrap().connected = connected;
    }

    fn command<F>(&self, record: SimCommand, f: F) -> LinkResult<()>
    where
        F: FnOnce(&mut SimState, Instant),
    {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(LinkError::Disconnected);
        }
        if state.rejecting {
            return Err(LinkError::Rejected(format!("{:?}", record)));
        }
        f(&mut state, Instant::now());
        state.log.push(record);
        Ok(())
    }

    fn query<F, T>(&self, f: F) -> LinkResult<T>
    where
        F: FnOnce(&SimState, Instant) -> T,
    {
        let mut state = self.state.lock().unwrap();
        if !state.connected {
            return Err(LinkError::Disconnected);
        }
        if 0 < state.failing_reads {
            state.failing_reads -= 1;
            return Err("empty reply".into());
        }
        if 0. < self.read_glitch_rate && rand::thread_rng().gen_bool(self.read_glitch_rate) {
            return Err("garbled reply".into());
        }
        Ok(f(&state, Instant::now()))
    }
}

impl MotorLink for SimulatedLink {
    fn move_absolute(&self, axis: Axis, counts: i64) -> LinkResult<()> {
        self.command(SimCommand::MoveAbsolute(axis, counts), |s, _| {
            s.axes[index(axis)].pending = Some(counts);
        })
    }

    fn move_relative(&self, axis: Axis, delta_counts: i64) -> LinkResult<()> {
        self.command(SimCommand::MoveRelative(axis, delta_counts), |s, now| {
            let a = &mut s.axes[index(axis)];
            a.pending = Some(a.reference(now) + delta_counts);
        })
    }

    fn set_speed(&self, axis: Axis, counts_per_sec: i64) -> LinkResult<()> {
        if counts_per_sec < 0 {
            return Err(LinkError::Rejected(format!(
                "negative speed {}",
                counts_per_sec
            )));
        }
        let default_speed = self.default_speed[index(axis)];
        self.command(SimCommand::SetSpeed(axis, counts_per_sec), |s, now| {
            let a = &mut s.axes[index(axis)];
            a.freeze(now);
            a.speed = if counts_per_sec == 0 {
                default_speed
            } else {
                counts_per_sec as f64
            };
        })
    }

    fn set_accel(&self, axis: Axis, counts_per_sec2: i64) -> LinkResult<()> {
        if counts_per_sec2 < 0 {
            return Err(LinkError::Rejected(format!(
                "negative acceleration {}",
                counts_per_sec2
            )));
        }
        // motion is modelled at constant speed
        self.command(SimCommand::SetAccel(axis, counts_per_sec2), |_, _| {})
    }

    fn begin_motion(&self) -> LinkResult<()> {
        self.command(SimCommand::BeginMotion, |s, now| {
            for a in s.axes.iter_mut() {
                if let Some(target) = a.pending.take() {
                    a.freeze(now);
                    if a.powered {
                        a.target = Some(target);
                    }
                }
            }
        })
    }

    fn stop_all(&self) -> LinkResult<()> {
        self.command(SimCommand::StopAll, |s, now| {
            s.axes.iter_mut().for_each(|a| a.halt(now));
        })
    }

    fn stop_axis(&self, axis: Axis) -> LinkResult<()> {
        self.command(SimCommand::StopAxis(axis), |s, now| {
            s.axes[index(axis)].halt(now);
        })
    }

    fn define_position(&self, axis: Axis, counts: i64) -> LinkResult<()> {
        self.command(SimCommand::DefinePosition(axis, counts), |s, now| {
            let a = &mut s.axes[index(axis)];
            a.halt(now);
            a.origin = counts as f64;
        })
    }

    fn position_counts(&self) -> LinkResult<EncoderPosition> {
        self.query(|s, now| {
            EncoderPosition::new(
                s.axes[0].position(now).round() as i64,
                s.axes[1].position(now).round() as i64,
            )
        })
    }

    fn is_in_motion(&self, axis: Axis) -> LinkResult<bool> {
        self.query(|s, now| s.axes[index(axis)].is_moving(now))
    }

    fn is_motor_powered(&self, axis: Axis) -> LinkResult<bool> {
        self.query(|s, _| s.axes[index(axis)].powered)
    }

    fn set_motor_power(&self, axis: Axis, on: bool) -> LinkResult<()> {
        self.command(SimCommand::SetMotorPower(axis, on), |s, now| {
            let a = &mut s.axes[index(axis)];
            if !on {
                a.halt(now);
            }
            a.powered = on;
        })
    }
}
