//! Subcommand handlers

pub mod compile;
pub mod config;
pub mod play;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Read a script file into memory.
pub fn read_script(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read script {}", path.display()))
}
