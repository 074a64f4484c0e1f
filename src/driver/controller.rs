//! Controller adapters.
//!
//! The driver maps every tick's inputs onto a [`Controller`]. Real
//! hardware adapters live outside this crate; the ones here trace or
//! discard the signals.

use std::io::Write;

use crate::input::{Button, Stick, StickState};

/// Sink for controller signals.
pub trait Controller {
    /// Release every button and center both sticks.
    fn clear_all(&mut self);

    fn set_button(&mut self, button: Button, pressed: bool);

    fn set_stick(&mut self, stick: Stick, state: StickState);

    /// Called once after all signals of a tick have been applied.
    fn end_tick(&mut self) {}
}

/// Controller that ignores all signals.
#[derive(Debug, Default)]
pub struct NullController;

impl Controller for NullController {
    fn clear_all(&mut self) {}
    fn set_button(&mut self, _button: Button, _pressed: bool) {}
    fn set_stick(&mut self, _stick: Stick, _state: StickState) {}
}

/// Controller that writes the held state as one line per tick.
///
/// Line format: `<tick> <buttons|-> L <power>@<angle> R <power>@<angle>`.
pub struct TraceController<W: Write> {
    out: W,
    tick: u64,
    buttons: Vec<Button>,
    left: StickState,
    right: StickState,
}

impl<W: Write> TraceController<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            tick: 0,
            buttons: Vec::new(),
            left: StickState::default(),
            right: StickState::default(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Controller for TraceController<W> {
    fn clear_all(&mut self) {
        self.buttons.clear();
        self.left = StickState::default();
        self.right = StickState::default();
    }

    fn set_button(&mut self, button: Button, pressed: bool) {
        self.buttons.retain(|b| *b != button);
        if pressed {
            self.buttons.push(button);
        }
    }

    fn set_stick(&mut self, stick: Stick, state: StickState) {
        match stick {
            Stick::Left => self.left = state,
            Stick::Right => self.right = state,
        }
    }

    fn end_tick(&mut self) {
        let buttons = if self.buttons.is_empty() {
            "-".to_string()
        } else {
            self.buttons
                .iter()
                .map(|b| b.label())
                .collect::<Vec<_>>()
                .join("+")
        };
        // Trace output is best effort; a closed pipe must not stop playback
        let _ = writeln!(
            self.out,
            "{} {} L {}@{} R {}@{}",
            self.tick, buttons, self.left.power, self.left.angle, self.right.power, self.right.angle
        );
        self.tick += 1;
    }
}
