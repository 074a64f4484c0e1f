//! Integer list compression for precompiled frames.
//!
//! Frames buffered in `PrecompileCompressed` mode are stored as a
//! variable-length integer encoding of their input list (see
//! [`InputState::to_words`]). Small values such as button ids and
//! frame counts take a single byte each.

use bincode::Options;

use crate::input::{FrameIndex, InputState};

/// Errors produced when decoding a compressed token.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Malformed compressed token: {0}")]
    Malformed(#[from] bincode::Error),

    #[error("Compressed token does not describe a valid frame ({len} values)")]
    InvalidLayout { len: usize },
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_varint_encoding()
        .reject_trailing_bytes()
}

/// Encode an integer list into a compact token.
pub fn compress(values: &[u32]) -> Vec<u8> {
    // Serializing a slice of integers into a Vec cannot fail
    options().serialize(values).unwrap_or_default()
}

/// Decode a token produced by [`compress`].
pub fn uncompress(token: &[u8]) -> Result<Vec<u32>, CodecError> {
    Ok(options().deserialize(token)?)
}

/// Compress one frame's inputs, embedding the frame index as the first value.
pub fn compress_frame(frame: FrameIndex, state: &InputState) -> Vec<u8> {
    compress(&state.to_words(frame))
}

/// Inverse of [`compress_frame`].
pub fn uncompress_frame(token: &[u8]) -> Result<(FrameIndex, InputState), CodecError> {
    let words = uncompress(token)?;
    InputState::from_words(&words).ok_or(CodecError::InvalidLayout { len: words.len() })
}
