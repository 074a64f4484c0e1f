//! Buffer of precompiled frames.
//!
//! A single producer (the compile worker) appends at the tail and a
//! single consumer (playback) takes from the head. Each operation holds
//! the lock only for one append, take or rewind, and the consumer parks
//! on a condition variable while the buffer is empty and production is
//! still running.
//!
//! Frames handed to playback are kept in delivery order so that
//! [`FrameBuffer::rewind`] can replay them after a loop restart without
//! compiling the script again. They are dropped when a new production
//! run begins or when playback releases them.

use std::collections::VecDeque;
use std::mem;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::codec::{self, CodecError};
use crate::input::{FrameIndex, InputState};

/// One precompiled frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferedFrame {
    /// Owned copy of the parsed inputs
    Raw { frame: FrameIndex, input: InputState },
    /// Compressed input list; the frame index is its first value
    Encoded(Vec<u8>),
}

impl BufferedFrame {
    pub fn raw(frame: FrameIndex, input: InputState) -> Self {
        Self::Raw { frame, input }
    }

    pub fn encoded(frame: FrameIndex, input: &InputState) -> Self {
        Self::Encoded(codec::compress_frame(frame, input))
    }

    /// Frame index and inputs, decompressing if needed.
    pub fn decode(&self) -> Result<(FrameIndex, InputState), CodecError> {
        match self {
            Self::Raw { frame, input } => Ok((*frame, input.clone())),
            Self::Encoded(token) => codec::uncompress_frame(token),
        }
    }

    /// Approximate memory held by this entry.
    pub fn size_bytes(&self) -> usize {
        let payload = match self {
            Self::Raw { input, .. } => mem::size_of_val(input.buttons.as_slice()),
            Self::Encoded(token) => token.len(),
        };
        mem::size_of::<Self>() + payload
    }
}

/// Result of asking the buffer for the entry of one frame.
#[derive(Debug, PartialEq, Eq)]
pub enum Take {
    /// Head entry was for the requested frame and has been consumed
    Matched(InputState),
    /// Head entry was for an earlier frame and has been discarded
    Stale { frame: FrameIndex },
    /// Head entry is for a later frame; it stays queued
    Ahead { frame: FrameIndex },
    /// Head entry could not be decoded and has been discarded
    Corrupt(String),
    /// Buffer is empty and nothing more will be produced
    Exhausted,
}

#[derive(Debug, Default)]
struct BufferState {
    pending: VecDeque<BufferedFrame>,
    delivered: Vec<BufferedFrame>,
    producing: bool,
}

/// Single-producer/single-consumer frame queue.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    state: Mutex<BufferState>,
    available: Condvar,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BufferState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an entry at the tail and wake a waiting consumer.
    pub fn push(&self, entry: BufferedFrame) {
        self.lock().pending.push_back(entry);
        self.available.notify_all();
    }

    /// Start a new production run; consumers will wait for entries.
    ///
    /// Entries left over from an earlier run are dropped, since the new
    /// run produces the script again from frame 0.
    pub fn begin_production(&self) {
        let mut state = self.lock();
        state.pending.clear();
        state.delivered.clear();
        state.producing = true;
    }

    /// Mark production as complete and wake a waiting consumer.
    pub fn finish_production(&self) {
        self.lock().producing = false;
        self.available.notify_all();
    }

    pub fn is_producing(&self) -> bool {
        self.lock().producing
    }

    /// Entries waiting to be consumed.
    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Entries already delivered and kept for [`rewind`](Self::rewind).
    pub fn delivered_len(&self) -> usize {
        self.lock().delivered.len()
    }

    /// Approximate memory held by pending and delivered entries.
    pub fn size_bytes(&self) -> usize {
        let state = self.lock();
        state
            .pending
            .iter()
            .chain(state.delivered.iter())
            .map(BufferedFrame::size_bytes)
            .sum()
    }

    /// Take the head entry for `frame`.
    ///
    /// Blocks without timeout while the buffer is empty and production
    /// is running. A head entry for an earlier frame is discarded; one
    /// for a later frame is left in place.
    pub fn take(&self, frame: FrameIndex) -> Take {
        let guard = self.lock();
        let mut state = self
            .available
            .wait_while(guard, |s| s.pending.is_empty() && s.producing)
            .unwrap_or_else(PoisonError::into_inner);

        let Some(head) = state.pending.front() else {
            return Take::Exhausted;
        };
        match head.decode() {
            Ok((tag, input)) if tag == frame => {
                if let Some(entry) = state.pending.pop_front() {
                    state.delivered.push(entry);
                }
                Take::Matched(input)
            }
            Ok((tag, _)) if tag < frame => {
                state.pending.pop_front();
                Take::Stale { frame: tag }
            }
            Ok((tag, _)) => Take::Ahead { frame: tag },
            Err(e) => {
                state.pending.pop_front();
                Take::Corrupt(e.to_string())
            }
        }
    }

    /// Drop the entries kept for [`rewind`](Self::rewind).
    pub fn release_delivered(&self) -> usize {
        let mut state = self.lock();
        let released = state.delivered.len();
        state.delivered = Vec::new();
        released
    }

    /// Move every delivered entry back in front of the pending ones.
    pub fn rewind(&self) {
        let mut state = self.lock();
        if state.delivered.is_empty() {
            return;
        }
        let mut replay: VecDeque<BufferedFrame> = mem::take(&mut state.delivered).into();
        replay.append(&mut state.pending);
        state.pending = replay;
    }
}
