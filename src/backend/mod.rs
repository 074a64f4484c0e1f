//! Script backends.
//!
//! A backend turns script source into per-frame input states. The
//! scheduler only talks to the [`ScriptBackend`] trait, so the script
//! format is interchangeable.

mod error;
pub mod nx_script;

pub use error::ScriptError;
pub use nx_script::NxScriptParser;

use crate::input::{FrameIndex, InputState};

/// A parser that produces controller inputs one frame at a time.
///
/// Implementations keep an internal consumption cursor: frames are
/// requested in increasing order and [`reset`](Self::reset) rewinds to
/// the start of the script.
pub trait ScriptBackend: Send {
    /// Load new script source. Does not rewind the cursor.
    fn set_script(&mut self, source: &str);

    /// Produce the inputs for `index`.
    ///
    /// Returns `true` and populates [`inputs_this_frame`](Self::inputs_this_frame)
    /// when the script has inputs for that frame, `false` otherwise.
    fn get_frame(&mut self, index: FrameIndex) -> bool;

    /// Inputs produced by the last successful [`get_frame`](Self::get_frame).
    ///
    /// The storage is reused by the next call; callers must clone what
    /// they keep.
    fn inputs_this_frame(&self) -> &InputState;

    /// Whether every frame of the script has been consumed.
    fn is_done(&self) -> bool;

    /// Rewind the consumption cursor to the start of the script.
    fn reset(&mut self);
}
