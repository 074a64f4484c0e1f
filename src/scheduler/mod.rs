//! Frame scheduler
//!
//! Decides, on every playback tick, which inputs are delivered to the
//! controller. The controller channel samples twice per video frame, so
//! each logical frame is returned on two consecutive ticks and the frame
//! cursor only advances after the second one.
//!
//! # Parsing modes
//!
//! - `Sync`: the backend parses the due frame on the tick itself.
//! - `Precompile`: a worker thread parses ahead into a [`FrameBuffer`];
//!   ticks take frames from its head.
//! - `PrecompileCompressed`: as `Precompile`, but buffered frames are
//!   stored compressed.
//!
//! In the precompile modes a tick blocks while the buffer is empty and
//! production is still running. There is no timeout.

mod mode;
mod production;

pub use mode::ParsingMode;

use std::io;
use std::mem;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::backend::ScriptBackend;
use crate::buffer::{FrameBuffer, Take};
use crate::input::{FrameIndex, FrameInput};
use production::{production_loop, FrameStorage, ProductionControl};

/// Second delivery of the current frame.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingDuplicate {
    /// No frame has been computed for the cursor yet
    NotComputed,
    /// The first delivery happened; this value is repeated next tick
    Held(FrameInput),
}

/// Per-session frame scheduler.
///
/// The parsing mode is fixed at construction; build a new scheduler to
/// switch modes.
pub struct FrameScheduler<B: ScriptBackend + 'static> {
    mode: ParsingMode,
    backend: Arc<Mutex<B>>,
    buffer: Arc<FrameBuffer>,
    control: Arc<ProductionControl>,
    worker: Option<JoinHandle<()>>,
    cursor_frame: FrameIndex,
    pending: PendingDuplicate,
    finished: bool,
}

impl<B: ScriptBackend + 'static> FrameScheduler<B> {
    pub fn new(backend: B, mode: ParsingMode) -> Self {
        Self {
            mode,
            backend: Arc::new(Mutex::new(backend)),
            buffer: Arc::new(FrameBuffer::new()),
            control: Arc::new(ProductionControl::default()),
            worker: None,
            cursor_frame: 0,
            pending: PendingDuplicate::NotComputed,
            finished: false,
        }
    }

    fn backend(&self) -> MutexGuard<'_, B> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mode(&self) -> ParsingMode {
        self.mode
    }

    /// Whether frames are produced in the background.
    pub fn is_async(&self) -> bool {
        self.mode.is_async()
    }

    /// Whether the script has been exhausted. Cleared only by [`reset`](Self::reset).
    pub fn done(&self) -> bool {
        self.finished
    }

    /// Whether both deliveries of the current frame have happened.
    pub fn frame_complete(&self) -> bool {
        self.pending == PendingDuplicate::NotComputed
    }

    /// Frame whose inputs are being delivered.
    pub fn cursor_frame(&self) -> FrameIndex {
        self.cursor_frame
    }

    /// Next frame the production worker will request.
    pub fn production_index(&self) -> FrameIndex {
        self.control.index.load(Ordering::Acquire)
    }

    pub fn cancel_requested(&self) -> bool {
        self.control.cancel_requested.load(Ordering::Acquire)
    }

    /// Whether a production worker is currently running.
    pub fn is_compiling(&self) -> bool {
        self.worker.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Frames waiting in the buffer.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Approximate memory held by the buffer.
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.size_bytes()
    }

    /// Run `f` with shared access to the backend.
    pub fn with_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.backend())
    }

    /// Produce the inputs for the current tick.
    ///
    /// The first call for a frame computes its value; the second returns
    /// the same value and advances the cursor. Never fails: parse errors,
    /// stale buffer entries and an exhausted script all yield
    /// [`FrameInput::NoInput`].
    pub fn next_frame(&mut self) -> FrameInput {
        if let PendingDuplicate::Held(value) =
            mem::replace(&mut self.pending, PendingDuplicate::NotComputed)
        {
            self.cursor_frame += 1;
            return value;
        }

        if self.finished {
            return FrameInput::NoInput;
        }

        let value = if self.mode.is_async() {
            match self.next_buffered() {
                Some(value) => value,
                None => return FrameInput::NoInput,
            }
        } else {
            self.next_sync()
        };

        self.pending = PendingDuplicate::Held(value.clone());
        value
    }

    fn next_sync(&mut self) -> FrameInput {
        let frame = self.cursor_frame;
        let mut backend = self.backend();

        let value = if backend.get_frame(frame) {
            // The backend reuses its storage; keep our own copy
            FrameInput::Input(backend.inputs_this_frame().clone())
        } else {
            FrameInput::NoInput
        };

        if backend.is_done() {
            drop(backend);
            self.finished = true;
            info!(frame, "Script finished");
        }
        value
    }

    /// Take the current frame from the buffer, or `None` once the
    /// buffer is drained and production has completed.
    fn next_buffered(&mut self) -> Option<FrameInput> {
        let frame = self.cursor_frame;
        match self.buffer.take(frame) {
            Take::Matched(input) => Some(FrameInput::Input(input)),
            Take::Ahead { .. } => Some(FrameInput::NoInput),
            Take::Stale { frame: tag } => {
                debug!(frame, tag, "Discarding stale buffered frame");
                Some(FrameInput::NoInput)
            }
            Take::Corrupt(reason) => {
                warn!(frame, %reason, "Discarding undecodable buffered frame");
                Some(FrameInput::NoInput)
            }
            Take::Exhausted => {
                self.finished = true;
                info!(frame, "Precompiled script finished");
                None
            }
        }
    }

    /// Start precompiling the script on a background worker.
    ///
    /// Does nothing in `Sync` mode or while a worker is already running.
    /// Production keeps running while playback is paused.
    pub fn start_compiling(&mut self) -> io::Result<()> {
        let storage = match self.mode {
            ParsingMode::Sync => {
                debug!("Sync mode, nothing to precompile");
                return Ok(());
            }
            ParsingMode::Precompile => FrameStorage::Raw,
            ParsingMode::PrecompileCompressed => FrameStorage::Compressed,
        };

        if self.is_compiling() {
            warn!("Compilation already running");
            return Ok(());
        }
        self.wait_for_compilation();

        // A stop requested after the last worker exited must not end this one
        if self.control.cancel_requested.swap(false, Ordering::AcqRel) {
            debug!("Clearing stale stop request");
        }

        self.buffer.begin_production();
        let backend = Arc::clone(&self.backend);
        let buffer = Arc::clone(&self.buffer);
        let control = Arc::clone(&self.control);

        let spawned = thread::Builder::new()
            .name("tasplay-compile".to_string())
            .spawn(move || production_loop(&backend, &buffer, &control, storage));

        match spawned {
            Ok(handle) => {
                info!(mode = %self.mode, "Compilation started");
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.buffer.finish_production();
                Err(e)
            }
        }
    }

    /// Block until the production worker (if any) has exited.
    pub fn wait_for_compilation(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("Compilation worker panicked");
                self.buffer.finish_production();
            }
        }
    }

    /// Ask the production worker to stop after its current iteration.
    pub fn hard_stop(&self) {
        self.control.cancel_requested.store(true, Ordering::Release);
    }

    /// Rewind playback to the first frame.
    ///
    /// Frames already taken from the buffer become available again, so a
    /// looped replay does not recompile. Production is left running.
    pub fn reset(&mut self) {
        self.backend().reset();
        self.buffer.rewind();
        self.cursor_frame = 0;
        self.pending = PendingDuplicate::NotComputed;
        self.finished = false;
    }

    /// Drop buffered frames that have already been played.
    ///
    /// A later [`reset`](Self::reset) can no longer replay them; start a
    /// new compilation instead.
    pub fn release_played_frames(&self) {
        let released = self.buffer.release_delivered();
        if released > 0 {
            debug!(released, "Released played frames");
        }
    }

    /// Load new script source into the backend.
    ///
    /// Cursors and buffered frames are kept; call [`reset`](Self::reset)
    /// when switching scripts, then [`start_compiling`](Self::start_compiling)
    /// in the precompile modes to replace the buffered frames.
    pub fn set_script(&mut self, source: &str) {
        self.backend().set_script(source);
    }
}

impl<B: ScriptBackend + 'static> Drop for FrameScheduler<B> {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.hard_stop();
            self.wait_for_compilation();
        }
    }
}
