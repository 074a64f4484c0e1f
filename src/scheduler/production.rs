//! Background frame production.
//!
//! Runs on a dedicated thread while playback consumes from the buffer.
//! Each iteration parses one frame, appends it to the buffer tail and
//! yields; cancellation is only observed between iterations.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::{debug, info};

use crate::backend::ScriptBackend;
use crate::buffer::{BufferedFrame, FrameBuffer};
use crate::input::FrameIndex;

/// Shared flags between the scheduler and the production worker.
#[derive(Debug, Default)]
pub(crate) struct ProductionControl {
    pub(crate) cancel_requested: AtomicBool,
    pub(crate) index: AtomicU32,
}

/// How produced frames are stored in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameStorage {
    Raw,
    Compressed,
}

/// Worker loop that precompiles frames until the script is exhausted
/// or cancellation is requested.
///
/// On exit the backend cursor is rewound, the cancellation flag is
/// cleared and the production index returns to 0, so the next
/// `start_compiling` begins from a clean state.
pub(crate) fn production_loop<B: ScriptBackend>(
    backend: &Mutex<B>,
    buffer: &FrameBuffer,
    control: &ProductionControl,
    storage: FrameStorage,
) {
    let mut produced = 0usize;
    loop {
        let index: FrameIndex = control.index.load(Ordering::Acquire);

        let (entry, script_done) = {
            let mut backend = backend.lock().unwrap_or_else(PoisonError::into_inner);
            let entry = if backend.get_frame(index) {
                let inputs = backend.inputs_this_frame();
                Some(match storage {
                    FrameStorage::Raw => BufferedFrame::raw(index, inputs.clone()),
                    FrameStorage::Compressed => BufferedFrame::encoded(index, inputs),
                })
            } else {
                None
            };
            (entry, backend.is_done())
        };

        if let Some(entry) = entry {
            buffer.push(entry);
            produced += 1;
        }

        let cancelled = control.cancel_requested.load(Ordering::Acquire);
        if cancelled || script_done {
            backend
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .reset();
            control.cancel_requested.store(false, Ordering::Release);
            control.index.store(0, Ordering::Release);
            buffer.finish_production();

            if cancelled {
                info!(last_frame = index, produced, "Compilation cancelled");
            } else {
                info!(last_frame = index, produced, "Compilation finished");
            }
            return;
        }

        control.index.store(index + 1, Ordering::Release);
        if index % 1024 == 0 {
            debug!(frame = index, buffered = buffer.len(), "Compiling");
        }
        thread::yield_now();
    }
}
