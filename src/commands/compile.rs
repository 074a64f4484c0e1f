//! `tasplay compile` handler

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;

use tasplay::cli::CompileArgs;
use tasplay::{FrameScheduler, NxScriptParser, ParsingMode};

/// Result of precompiling a script.
#[derive(Debug, Serialize)]
struct CompileReport {
    script: String,
    mode: ParsingMode,
    script_lines: usize,
    frames: usize,
    buffered_bytes: usize,
    elapsed_ms: f64,
}

/// Precompile a script the way playback would and report buffer usage.
pub fn handle(args: CompileArgs) -> Result<()> {
    let source = super::read_script(&args.script)?;
    let mode = if args.compressed {
        ParsingMode::PrecompileCompressed
    } else {
        ParsingMode::Precompile
    };

    let report = compile(&args.script, &source, mode)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Script:   {}", report.script);
        println!("Mode:     {}", report.mode);
        println!("Frames:   {} of {} lines", report.frames, report.script_lines);
        println!("Buffered: {} bytes", report.buffered_bytes);
        println!("Time:     {:.1} ms", report.elapsed_ms);
    }

    if report.frames < report.script_lines {
        eprintln!(
            "{} script line(s) could not be compiled",
            report.script_lines - report.frames
        );
    }
    Ok(())
}

fn compile(path: &Path, source: &str, mode: ParsingMode) -> Result<CompileReport> {
    let parser = NxScriptParser::with_script(source);
    let script_lines = parser.frame_line_count();
    let mut scheduler = FrameScheduler::new(parser, mode);

    let started = Instant::now();
    scheduler
        .start_compiling()
        .context("Failed to start compilation worker")?;
    scheduler.wait_for_compilation();

    Ok(CompileReport {
        script: path.display().to_string(),
        mode,
        script_lines,
        frames: scheduler.buffered_len(),
        buffered_bytes: scheduler.buffered_bytes(),
        elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
    })
}
