//! Axis motion subsystem.
//!
//! Owns per-axis queued-move execution, operating mode, stall-guard
//! detection, and driver fault flags. Commands are imperative and
//! non-blocking; `step()` advances every axis once per tick.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Motion                                                      │
//! │  ┌─────────┬──────────┬─────────┬──────────┬──────────────┐  │
//! │  │ Axis    │ position │ target  │ queue    │ stall/fault  │  │
//! │  ├─────────┼──────────┼─────────┼──────────┼──────────────┤  │
//! │  │ Idler   │ i32      │ i32     │ Deque<4> │ sg + flags   │  │
//! │  │ Selector│ i32      │ i32     │ Deque<4> │ sg + flags   │  │
//! │  │ Pulley  │ i32      │ i32     │ Deque<4> │ sg + flags   │  │
//! │  └─────────┴──────────┴─────────┴──────────┴──────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Travel is modelled physically: the idler and selector clamp at the
//! ends of their range, and a clamped step while the stall guard is armed
//! latches a stall event — exactly how homing finds the end-stop. The
//! pulley (filament axis) has no meaningful absolute range and never
//! clamps.
//!
//! Each axis is owned by exactly one automaton at a time; the subsystem
//! does not arbitrate and callers must not interleave commands.

pub mod idler;
pub mod movable;
pub mod pulley;
pub mod selector;

use heapless::Deque;
use log::{debug, warn};

use crate::config::MmuConfig;
use crate::error::{DriverErrorFlags, MotionError};

// ---------------------------------------------------------------------------
// Axis identity
// ---------------------------------------------------------------------------

/// The unit's physical axes. Fixed set, never allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Axis {
    Idler = 0,
    Selector = 1,
    Pulley = 2,
}

impl Axis {
    /// Total number of axes — used to size the state array.
    pub const COUNT: usize = 3;

    pub const fn name(self) -> &'static str {
        match self {
            Self::Idler => "idler",
            Self::Selector => "selector",
            Self::Pulley => "pulley",
        }
    }
}

/// Stepper operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Full torque, audible chopper.
    Normal,
    /// Low-noise mode; trades torque for quietness. Never used while homing.
    Stealth,
}

// ---------------------------------------------------------------------------
// Moves and per-axis state
// ---------------------------------------------------------------------------

/// One planned move: signed step budget plus steps consumed per tick.
#[derive(Debug, Clone, Copy)]
struct Move {
    remaining: i32,
    rate: u32,
}

/// Queue depth per axis.
const MOVE_QUEUE_CAP: usize = 4;

/// Simulated driver front-end: fault flags plus an init-fail switch.
/// On hardware this is the register-level TMC driver owned by the board
/// support layer; the contract consumed here is only `error_flags()`.
#[derive(Debug, Default)]
pub struct AxisDriver {
    flags: DriverErrorFlags,
    init_fail: bool,
}

impl AxisDriver {
    /// Non-blocking snapshot of the driver fault state.
    pub fn error_flags(&self) -> DriverErrorFlags {
        self.flags
    }
}

struct AxisState {
    pos: i32,
    target_pos: i32,
    /// Travel limit; `None` for the unbounded pulley axis.
    range: Option<i32>,
    enabled: bool,
    mode: Mode,
    queue: Deque<Move, MOVE_QUEUE_CAP>,
    sg_armed: bool,
    sg_triggered: bool,
    sg_suppressed: bool,
    driver: AxisDriver,
}

impl AxisState {
    fn new(range: Option<i32>) -> Self {
        Self {
            pos: 0,
            target_pos: 0,
            range,
            enabled: false,
            mode: Mode::Normal,
            queue: Deque::new(),
            sg_armed: false,
            sg_triggered: false,
            sg_suppressed: false,
            driver: AxisDriver::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Motion subsystem
// ---------------------------------------------------------------------------

pub struct Motion {
    axes: [AxisState; Axis::COUNT],
}

impl Motion {
    pub fn new(config: &MmuConfig) -> Self {
        Self {
            axes: [
                AxisState::new(Some(config.idler_range)),
                AxisState::new(Some(config.selector_range)),
                AxisState::new(None),
            ],
        }
    }

    /// Arm the axis driver for motion. Returns false if the driver is
    /// absent or already faulted; no side effects on failure.
    pub fn init_axis(&mut self, axis: Axis) -> bool {
        let st = &self.axes[axis as usize];
        if st.driver.init_fail || !st.driver.flags.good() {
            warn!("motion: {} init refused", axis.name());
            return false;
        }
        self.axes[axis as usize].enabled = true;
        true
    }

    /// Release the axis driver (coils de-energised).
    pub fn disable_axis(&mut self, axis: Axis) {
        self.axes[axis as usize].enabled = false;
    }

    pub fn enabled(&self, axis: Axis) -> bool {
        self.axes[axis as usize].enabled
    }

    /// Switch operating mode. Takes effect on the next issued move; a move
    /// in progress keeps stepping.
    pub fn set_mode(&mut self, axis: Axis, mode: Mode) {
        self.axes[axis as usize].mode = mode;
    }

    pub fn mode(&self, axis: Axis) -> Mode {
        self.axes[axis as usize].mode
    }

    /// Arm the stall detector and clear any previous event.
    pub fn stall_guard_reset(&mut self, axis: Axis) {
        let st = &mut self.axes[axis as usize];
        st.sg_armed = true;
        st.sg_triggered = false;
    }

    /// True once a stall event has been latched since the last reset.
    pub fn stall_guard(&self, axis: Axis) -> bool {
        self.axes[axis as usize].sg_triggered
    }

    /// Enqueue a relative move. A homing caller passes a delta at least as
    /// long as the full axis travel so the end-stop is reached from any
    /// starting position.
    pub fn plan_move(&mut self, axis: Axis, delta: i32, rate: u32) -> Result<(), MotionError> {
        let st = &mut self.axes[axis as usize];
        if delta == 0 {
            return Ok(());
        }
        st.queue
            .push_back(Move {
                remaining: delta,
                rate: rate.max(1),
            })
            .map_err(|_| MotionError::QueueFull)?;
        st.target_pos += delta;
        debug!("motion: {} move {delta:+} @ {rate}", axis.name());
        Ok(())
    }

    /// Enqueue a move to an absolute target position.
    pub fn plan_move_to(&mut self, axis: Axis, target: i32, rate: u32) -> Result<(), MotionError> {
        let delta = target - self.axes[axis as usize].target_pos;
        self.plan_move(axis, delta, rate)
    }

    /// True once all enqueued moves have been executed.
    pub fn queue_empty(&self, axis: Axis) -> bool {
        self.axes[axis as usize].queue.is_empty()
    }

    pub fn position(&self, axis: Axis) -> i32 {
        self.axes[axis as usize].pos
    }

    /// Where the queued moves will leave the axis.
    pub fn target_pos(&self, axis: Axis) -> i32 {
        self.axes[axis as usize].target_pos
    }

    pub fn driver_for(&self, axis: Axis) -> &AxisDriver {
        &self.axes[axis as usize].driver
    }

    /// Advance every axis by one tick's worth of the move at the front of
    /// its queue. Steps that would cross a travel end are lost mechanically
    /// (the motor skips); crossing while the stall guard is armed latches a
    /// stall, re-references the axis, and drops the rest of the queue.
    pub fn step(&mut self) {
        for (i, st) in self.axes.iter_mut().enumerate() {
            if !st.enabled {
                continue;
            }
            let Some(mv) = st.queue.front_mut() else {
                continue;
            };

            let dir = if mv.remaining > 0 { 1 } else { -1 };
            let budget = mv.remaining.unsigned_abs().min(mv.rate) as i32;
            mv.remaining -= dir * budget;
            let done = mv.remaining == 0;

            let wanted = st.pos + dir * budget;
            let clamped = match st.range {
                Some(range) => wanted.clamp(0, range),
                None => wanted,
            };
            let blocked = clamped != wanted;
            st.pos = clamped;

            if done {
                st.queue.pop_front();
            }

            if blocked && st.sg_armed && !st.sg_suppressed && !st.sg_triggered {
                // End-stop hit: this position is the new reference.
                st.sg_triggered = true;
                st.queue.clear();
                st.target_pos = st.pos;
                debug!("motion: axis {i} stall guard event at {}", st.pos);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Simulation hooks (tests and bench bring-up)
    // -----------------------------------------------------------------------

    /// Latch fault bits into the axis driver, as a real driver would on a
    /// thermal or short event.
    pub fn sim_set_driver_fault(&mut self, axis: Axis, flags: DriverErrorFlags) {
        self.axes[axis as usize].driver.flags = flags;
    }

    pub fn sim_clear_driver_fault(&mut self, axis: Axis) {
        self.axes[axis as usize].driver.flags = DriverErrorFlags::NONE;
    }

    /// Make `init_axis` report the driver as absent.
    pub fn sim_fail_init(&mut self, axis: Axis, fail: bool) {
        self.axes[axis as usize].driver.init_fail = fail;
    }

    /// Suppress stall-guard latching, simulating an end-stop the detector
    /// cannot see (wrong sensitivity, slipping coupler).
    pub fn sim_suppress_stall_guard(&mut self, axis: Axis, suppress: bool) {
        self.axes[axis as usize].sg_suppressed = suppress;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DriverFault;

    fn motion() -> Motion {
        Motion::new(&MmuConfig::default())
    }

    #[test]
    fn init_enables_axis() {
        let mut m = motion();
        assert!(!m.enabled(Axis::Idler));
        assert!(m.init_axis(Axis::Idler));
        assert!(m.enabled(Axis::Idler));
    }

    #[test]
    fn init_refused_when_driver_absent() {
        let mut m = motion();
        m.sim_fail_init(Axis::Selector, true);
        assert!(!m.init_axis(Axis::Selector));
        assert!(!m.enabled(Axis::Selector));
    }

    #[test]
    fn init_refused_when_driver_faulted() {
        let mut m = motion();
        m.sim_set_driver_fault(
            Axis::Pulley,
            DriverErrorFlags::NONE.with(DriverFault::OverTemperature),
        );
        assert!(!m.init_axis(Axis::Pulley));
    }

    #[test]
    fn move_executes_at_rate_and_drains() {
        let mut m = motion();
        m.init_axis(Axis::Selector);
        m.plan_move(Axis::Selector, 25, 10).unwrap();
        assert!(!m.queue_empty(Axis::Selector));

        m.step();
        assert_eq!(m.position(Axis::Selector), 10);
        m.step();
        assert_eq!(m.position(Axis::Selector), 20);
        m.step();
        assert_eq!(m.position(Axis::Selector), 25);
        assert!(m.queue_empty(Axis::Selector));
        assert_eq!(m.target_pos(Axis::Selector), 25);
    }

    #[test]
    fn disabled_axis_does_not_step() {
        let mut m = motion();
        m.init_axis(Axis::Idler);
        m.plan_move(Axis::Idler, 100, 10).unwrap();
        m.disable_axis(Axis::Idler);
        m.step();
        assert_eq!(m.position(Axis::Idler), 0);
    }

    #[test]
    fn queue_has_finite_capacity() {
        let mut m = motion();
        m.init_axis(Axis::Pulley);
        for _ in 0..4 {
            m.plan_move(Axis::Pulley, 10, 1).unwrap();
        }
        assert_eq!(
            m.plan_move(Axis::Pulley, 10, 1),
            Err(MotionError::QueueFull)
        );
    }

    #[test]
    fn zero_delta_is_a_no_op() {
        let mut m = motion();
        m.init_axis(Axis::Idler);
        m.plan_move_to(Axis::Idler, 0, 5).unwrap();
        assert!(m.queue_empty(Axis::Idler));
    }

    #[test]
    fn stall_latches_at_travel_end() {
        let mut m = motion();
        let range = MmuConfig::default().idler_range;
        m.init_axis(Axis::Idler);
        m.stall_guard_reset(Axis::Idler);
        m.plan_move(Axis::Idler, -(range + 64), 200).unwrap();

        while !m.stall_guard(Axis::Idler) && !m.queue_empty(Axis::Idler) {
            m.step();
        }
        assert!(m.stall_guard(Axis::Idler));
        assert_eq!(m.position(Axis::Idler), 0);
        // Stall drops the rest of the plan and re-references the target.
        assert!(m.queue_empty(Axis::Idler));
        assert_eq!(m.target_pos(Axis::Idler), 0);
    }

    #[test]
    fn suppressed_stall_drains_queue_without_event() {
        let mut m = motion();
        let range = MmuConfig::default().idler_range;
        m.init_axis(Axis::Idler);
        m.stall_guard_reset(Axis::Idler);
        m.sim_suppress_stall_guard(Axis::Idler, true);
        m.plan_move(Axis::Idler, -(range + 64), 200).unwrap();

        for _ in 0..((range as u32 + 64) / 200 + 2) {
            m.step();
        }
        assert!(!m.stall_guard(Axis::Idler));
        assert!(m.queue_empty(Axis::Idler));
    }

    #[test]
    fn pulley_travels_unbounded_in_both_directions() {
        let mut m = motion();
        m.init_axis(Axis::Pulley);
        m.stall_guard_reset(Axis::Pulley);
        m.plan_move(Axis::Pulley, -500, 100).unwrap();
        for _ in 0..6 {
            m.step();
        }
        assert_eq!(m.position(Axis::Pulley), -500);
        assert!(!m.stall_guard(Axis::Pulley));
    }
}
