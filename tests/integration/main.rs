//! Integration tests for tasplay

mod cli_test;
mod helpers;
mod playback_test;
