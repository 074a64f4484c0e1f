//! tasplay - frame-exact replay of scripted controller inputs
//!
//! Replays a script of button and stick inputs to a console controller,
//! one video frame at a time. The controller samples twice per frame, so
//! every frame's inputs are delivered on two consecutive ticks.
//!
//! # Modules
//!
//! - `input`: controller input types
//! - `backend`: script parsers behind the `ScriptBackend` trait
//! - `codec`: integer list compression for buffered frames
//! - `buffer`: producer/consumer queue of precompiled frames
//! - `scheduler`: per-tick frame selection across parsing modes
//! - `driver`: playback lifecycle and controller adapters
//! - `config`: configuration file
//! - `cli`: command-line definition

pub mod backend;
pub mod buffer;
pub mod cli;
pub mod codec;
pub mod config;
pub mod driver;
pub mod input;
pub mod scheduler;

pub use backend::{NxScriptParser, ScriptBackend};
pub use config::Config;
pub use driver::{PlaybackDriver, PlaybackSummary};
pub use input::{Button, FrameIndex, FrameInput, InputState, StickState};
pub use scheduler::{FrameScheduler, ParsingMode};
