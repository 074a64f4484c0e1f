//! Command-line interface definition.
//!
//! Lives in the library so `xtask` can generate man pages from it.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::scheduler::ParsingMode;

/// Version string, including the git commit for development builds.
pub fn version() -> &'static str {
    #[cfg(not(feature = "release"))]
    {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (",
            env!("VERGEN_GIT_SHA"),
            " ",
            env!("VERGEN_GIT_COMMIT_DATE"),
            ")"
        )
    }
    #[cfg(feature = "release")]
    {
        env!("CARGO_PKG_VERSION")
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tasplay",
    version = version(),
    about = "Replay scripted controller inputs frame by frame"
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Play a script, delivering each frame's inputs twice per frame
    Play(PlayArgs),

    /// Precompile a script and report buffer usage
    Compile(CompileArgs),

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Args)]
pub struct PlayArgs {
    /// Script file to play
    pub script: PathBuf,

    /// Parsing mode (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ParsingMode>,

    /// Restart from the first frame when the script ends
    #[arg(short, long = "loop")]
    pub loop_playback: bool,

    /// Video frame rate (defaults to the configured rate)
    #[arg(long)]
    pub fps: Option<u32>,

    /// Tick as fast as possible instead of pacing to the frame rate
    #[arg(long)]
    pub unthrottled: bool,

    /// Print the controller state of every tick to stdout
    #[arg(long)]
    pub trace: bool,

    /// Stop after this many ticks
    #[arg(long, value_name = "N")]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Script file to compile
    pub script: PathBuf,

    /// Store frames compressed
    #[arg(short, long)]
    pub compressed: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn play_accepts_mode_names() {
        let cli = Cli::try_parse_from(["tasplay", "play", "run.txt", "--mode", "compressed"])
            .unwrap();
        match cli.command {
            Commands::Play(args) => {
                assert_eq!(args.mode, Some(ParsingMode::PrecompileCompressed));
                assert!(!args.loop_playback);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn play_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["tasplay", "play", "run.txt", "--mode", "turbo"]).is_err());
    }
}
