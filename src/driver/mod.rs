//! Playback driver
//!
//! Calls the scheduler once per controller sample and applies the result
//! to a [`Controller`]. Owns the start/pause/stop/loop lifecycle.
//!
//! Pausing only stops consumption: a precompile worker keeps filling the
//! buffer while the driver is paused.

mod controller;

pub use controller::{Controller, NullController, TraceController};

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::backend::ScriptBackend;
use crate::input::{FrameInput, Stick};
use crate::scheduler::FrameScheduler;

/// Lifecycle state of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Not playing
    Idle,
    Running,
    Paused,
    /// Stop requested; the next tick delivers once more and cleans up
    Stopping,
}

/// Outcome of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickStatus {
    /// Inputs were delivered and playback continues
    Continue,
    /// Driver is paused; all inputs were released
    Paused,
    /// Playback ended (stopped or script finished)
    Stopped,
}

/// Counters reported when a run ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    /// Ticks that delivered a scheduler value
    pub ticks: u64,
    /// Ticks that delivered inputs (not "no input")
    pub input_ticks: u64,
    /// Times playback restarted from the first frame
    pub loops: u64,
}

/// Drives a [`FrameScheduler`] into a [`Controller`].
pub struct PlaybackDriver<B: ScriptBackend + 'static, C: Controller> {
    scheduler: FrameScheduler<B>,
    controller: C,
    state: DriverState,
    loop_playback: bool,
    summary: PlaybackSummary,
}

impl<B: ScriptBackend + 'static, C: Controller> PlaybackDriver<B, C> {
    pub fn new(scheduler: FrameScheduler<B>, controller: C) -> Self {
        Self {
            scheduler,
            controller,
            state: DriverState::Idle,
            loop_playback: false,
            summary: PlaybackSummary::default(),
        }
    }

    /// Restart from the first frame whenever the script finishes.
    pub fn with_looping(mut self, loop_playback: bool) -> Self {
        self.loop_playback = loop_playback;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn summary(&self) -> PlaybackSummary {
        self.summary
    }

    pub fn scheduler(&self) -> &FrameScheduler<B> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut FrameScheduler<B> {
        &mut self.scheduler
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn into_parts(self) -> (FrameScheduler<B>, C) {
        (self.scheduler, self.controller)
    }

    /// Start playback, or resume it when paused.
    ///
    /// A fresh start rewinds the scheduler to the first frame.
    pub fn start(&mut self) {
        match self.state {
            DriverState::Paused => {
                info!("Resuming playback");
                self.state = DriverState::Running;
            }
            DriverState::Idle => {
                self.scheduler.reset();
                info!(mode = %self.scheduler.mode(), "Starting playback");
                self.state = DriverState::Running;
            }
            DriverState::Running | DriverState::Stopping => {
                warn!("Playback already in progress");
            }
        }
    }

    /// Pause a running playback. Inputs are released while paused.
    pub fn pause(&mut self) {
        if self.state == DriverState::Running {
            info!(frame = self.scheduler.cursor_frame(), "Pausing playback");
            self.state = DriverState::Paused;
        }
    }

    /// Request a stop; takes effect on the next tick.
    pub fn stop(&mut self) {
        if self.state == DriverState::Running {
            info!("Stopping playback");
            self.state = DriverState::Stopping;
        }
    }

    /// Process one controller sample.
    pub fn tick(&mut self) -> TickStatus {
        match self.state {
            DriverState::Idle => return TickStatus::Stopped,
            DriverState::Paused => {
                self.controller.clear_all();
                self.controller.end_tick();
                return TickStatus::Paused;
            }
            DriverState::Running | DriverState::Stopping => {}
        }

        let value = self.scheduler.next_frame();
        self.apply(&value);
        self.summary.ticks += 1;
        if value.is_input() {
            self.summary.input_ticks += 1;
        }

        let finished = self.scheduler.done() && self.scheduler.frame_complete();
        if self.state == DriverState::Running && finished && self.loop_playback {
            debug!("Looping back to the first frame");
            self.scheduler.reset();
            self.summary.loops += 1;
            return TickStatus::Continue;
        }

        if self.state == DriverState::Stopping || finished {
            if finished {
                self.scheduler.release_played_frames();
            }
            self.controller.clear_all();
            self.state = DriverState::Idle;
            info!(
                ticks = self.summary.ticks,
                frame = self.scheduler.cursor_frame(),
                "Playback stopped or finished"
            );
            return TickStatus::Stopped;
        }
        TickStatus::Continue
    }

    fn apply(&mut self, value: &FrameInput) {
        self.controller.clear_all();
        if let FrameInput::Input(state) = value {
            for &button in &state.buttons {
                self.controller.set_button(button, true);
            }
            self.controller.set_stick(Stick::Left, state.left_stick);
            self.controller.set_stick(Stick::Right, state.right_stick);
        }
        self.controller.end_tick();
    }

    /// Tick until playback stops.
    ///
    /// `interval` paces the ticks (`None` runs unthrottled). Setting
    /// `interrupt` requests a stop; `max_ticks` bounds the number of
    /// delivered ticks.
    pub fn run(
        &mut self,
        interval: Option<Duration>,
        interrupt: &AtomicBool,
        max_ticks: Option<u64>,
    ) -> PlaybackSummary {
        let mut next_deadline = Instant::now();
        loop {
            if interrupt.load(Ordering::Relaxed) || max_ticks.is_some_and(|m| self.summary.ticks >= m)
            {
                self.stop();
            }
            if self.tick() == TickStatus::Stopped {
                break;
            }
            if let Some(interval) = interval {
                next_deadline += interval;
                let now = Instant::now();
                if next_deadline > now {
                    thread::sleep(next_deadline - now);
                } else {
                    next_deadline = now;
                }
            }
        }
        self.summary
    }
}

/// Time between controller samples for a given video frame rate.
///
/// The controller is sampled twice per video frame.
pub fn sample_interval(frame_rate: u32) -> Option<Duration> {
    if frame_rate == 0 {
        return None;
    }
    Some(Duration::from_secs_f64(1.0 / (f64::from(frame_rate) * 2.0)))
}
