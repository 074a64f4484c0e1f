//! `tasplay play` handler

use std::io::{self, BufWriter, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use tasplay::cli::PlayArgs;
use tasplay::driver::{sample_interval, Controller, NullController, TraceController};
use tasplay::{Config, FrameScheduler, NxScriptParser, PlaybackDriver, PlaybackSummary};

/// Play a script until it ends, `--max-ticks` is reached or Ctrl-C.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: PlayArgs) -> Result<()> {
    let config = Config::load()?;
    let source = super::read_script(&args.script)?;

    let mode = args.mode.unwrap_or(config.playback.parsing_mode);
    let frame_rate = args.fps.unwrap_or(config.playback.frame_rate);
    let loop_playback = args.loop_playback || config.playback.loop_playback;
    let interval = if args.unthrottled {
        None
    } else {
        sample_interval(frame_rate)
    };

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = Arc::clone(&interrupt);
        ctrlc::set_handler(move || interrupt.store(true, Ordering::Relaxed))
            .context("Failed to install Ctrl-C handler")?;
    }

    let mut scheduler = FrameScheduler::new(NxScriptParser::with_script(&source), mode);
    scheduler
        .start_compiling()
        .context("Failed to start compilation worker")?;

    let session = Session {
        loop_playback,
        interval,
        interrupt: &interrupt,
        max_ticks: args.max_ticks,
    };
    let summary = if args.trace {
        let mut out = BufWriter::new(io::stdout().lock());
        let summary = session.run(scheduler, TraceController::new(&mut out));
        out.flush().context("Failed to write trace")?;
        summary
    } else {
        session.run(scheduler, NullController)
    };

    eprintln!(
        "Played {} ticks in {} mode ({} with input, {} loops)",
        summary.ticks, mode, summary.input_ticks, summary.loops
    );
    Ok(())
}

struct Session<'a> {
    loop_playback: bool,
    interval: Option<Duration>,
    interrupt: &'a AtomicBool,
    max_ticks: Option<u64>,
}

impl Session<'_> {
    fn run<C: Controller>(
        &self,
        scheduler: FrameScheduler<NxScriptParser>,
        controller: C,
    ) -> PlaybackSummary {
        let mut driver = PlaybackDriver::new(scheduler, controller).with_looping(self.loop_playback);
        driver.start();
        driver.run(self.interval, self.interrupt, self.max_ticks)
    }
}
