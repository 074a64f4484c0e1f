//! Parsing mode selection.

use std::fmt;

use serde::{Deserialize, Serialize};

/// How script frames are turned into inputs during playback.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ParsingMode {
    /// Parse each frame when it is due; playback waits for the parser
    #[default]
    Sync,
    /// Parse every frame ahead of time on a background worker
    Precompile,
    /// Precompile and store frames compressed to save memory
    #[serde(rename = "compressed")]
    #[value(name = "compressed")]
    PrecompileCompressed,
}

impl ParsingMode {
    /// Whether frames come from the background buffer.
    pub fn is_async(self) -> bool {
        !matches!(self, Self::Sync)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sync => "sync",
            Self::Precompile => "precompile",
            Self::PrecompileCompressed => "compressed",
        }
    }
}

impl fmt::Display for ParsingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
