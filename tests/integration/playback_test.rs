//! Scheduler scenarios driven through the public API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tasplay::codec::{compress, uncompress};
use tasplay::{
    Button, FrameIndex, FrameInput, FrameScheduler, InputState, NxScriptParser, ParsingMode,
    ScriptBackend,
};

use crate::helpers::load_fixture;

fn a_press() -> FrameInput {
    FrameInput::Input(InputState::with_buttons(&[Button::A]))
}

fn play<B: ScriptBackend + 'static>(scheduler: &mut FrameScheduler<B>, ticks: usize) -> Vec<FrameInput> {
    (0..ticks).map(|_| scheduler.next_frame()).collect()
}

/// Parser wrapper counting how often frames are requested.
struct CountingParser {
    inner: NxScriptParser,
    requests: Arc<AtomicUsize>,
}

impl ScriptBackend for CountingParser {
    fn set_script(&mut self, source: &str) {
        self.inner.set_script(source);
    }
    fn get_frame(&mut self, index: FrameIndex) -> bool {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.inner.get_frame(index)
    }
    fn inputs_this_frame(&self) -> &InputState {
        self.inner.inputs_this_frame()
    }
    fn is_done(&self) -> bool {
        self.inner.is_done()
    }
    fn reset(&mut self) {
        self.inner.reset();
    }
}

#[test]
fn sync_three_frame_script() {
    let parser = NxScriptParser::with_script(&load_fixture("three_a.txt"));
    let mut scheduler = FrameScheduler::new(parser, ParsingMode::Sync);

    assert_eq!(play(&mut scheduler, 6), vec![a_press(); 6]);
    assert_eq!(scheduler.cursor_frame(), 3);
    assert!(scheduler.done());
    assert_eq!(scheduler.next_frame(), FrameInput::NoInput);
}

#[test]
fn precompiled_three_frame_script_matches_sync() {
    let parser = NxScriptParser::with_script(&load_fixture("three_a.txt"));
    let mut scheduler = FrameScheduler::new(parser, ParsingMode::Precompile);
    assert!(scheduler.is_async());

    scheduler.start_compiling().unwrap();
    scheduler.wait_for_compilation();
    assert_eq!(scheduler.buffered_len(), 3);

    assert_eq!(play(&mut scheduler, 6), vec![a_press(); 6]);
    assert_eq!(scheduler.cursor_frame(), 3);
}

#[test]
fn every_frame_is_delivered_as_identical_pair() {
    let source = load_fixture("mixed.txt");
    for mode in [
        ParsingMode::Sync,
        ParsingMode::Precompile,
        ParsingMode::PrecompileCompressed,
    ] {
        let mut scheduler = FrameScheduler::new(NxScriptParser::with_script(&source), mode);
        scheduler.start_compiling().unwrap();

        for frame in 0..4 {
            assert_eq!(scheduler.cursor_frame(), frame);
            let first = scheduler.next_frame();
            assert_eq!(scheduler.cursor_frame(), frame, "mode {}", mode);
            let second = scheduler.next_frame();
            assert_eq!(first, second, "frame {} in mode {}", frame, mode);
        }
        assert_eq!(scheduler.cursor_frame(), 4);
    }
}

#[test]
fn reset_mid_playback_reuses_buffered_frame_zero() {
    let requests = Arc::new(AtomicUsize::new(0));
    let parser = CountingParser {
        inner: NxScriptParser::with_script(&load_fixture("three_a.txt")),
        requests: Arc::clone(&requests),
    };
    let mut scheduler = FrameScheduler::new(parser, ParsingMode::Precompile);
    scheduler.start_compiling().unwrap();
    scheduler.wait_for_compilation();
    let compiled_requests = requests.load(Ordering::SeqCst);

    play(&mut scheduler, 4);
    assert_eq!(scheduler.cursor_frame(), 2);
    assert!(scheduler.buffered_len() > 0);

    scheduler.reset();
    assert_eq!(scheduler.cursor_frame(), 0);
    assert_eq!(scheduler.next_frame(), a_press());
    assert_eq!(requests.load(Ordering::SeqCst), compiled_requests);
}

#[test]
fn hard_stop_rewinds_backend_for_next_compile() {
    let long_script: String = (0..50_000)
        .map(|f| format!("{} KEY_A 0;0 0;0\n", f))
        .collect();
    let mut scheduler = FrameScheduler::new(
        NxScriptParser::with_script(&long_script),
        ParsingMode::PrecompileCompressed,
    );
    scheduler.start_compiling().unwrap();
    scheduler.hard_stop();
    scheduler.wait_for_compilation();

    assert!(!scheduler.cancel_requested());
    assert_eq!(scheduler.production_index(), 0);
    scheduler.with_backend(|parser| assert!(!parser.is_done()));
    assert!(scheduler.buffered_len() >= 1);
}

#[test]
fn set_script_then_reset_plays_new_script() {
    let mut scheduler = FrameScheduler::new(
        NxScriptParser::with_script(&load_fixture("three_a.txt")),
        ParsingMode::Sync,
    );
    play(&mut scheduler, 6);
    assert!(scheduler.done());

    scheduler.set_script("0 KEY_PLUS 0;0 0;0\n");
    assert!(scheduler.done());
    scheduler.reset();

    let plus = FrameInput::Input(InputState::with_buttons(&[Button::Plus]));
    assert_eq!(play(&mut scheduler, 2), vec![plus.clone(), plus]);
    assert!(scheduler.done());
}

#[test]
fn precompiled_script_switch_plays_new_script() {
    for mode in [ParsingMode::Precompile, ParsingMode::PrecompileCompressed] {
        let mut scheduler =
            FrameScheduler::new(NxScriptParser::with_script(&load_fixture("three_a.txt")), mode);
        scheduler.start_compiling().unwrap();
        scheduler.wait_for_compilation();
        play(&mut scheduler, 7);
        assert!(scheduler.done());

        scheduler.set_script("0 KEY_PLUS 0;0 0;0\n");
        scheduler.reset();
        scheduler.start_compiling().unwrap();
        scheduler.wait_for_compilation();

        let plus = FrameInput::Input(InputState::with_buttons(&[Button::Plus]));
        assert_eq!(play(&mut scheduler, 2), vec![plus.clone(), plus]);
        assert_eq!(scheduler.next_frame(), FrameInput::NoInput);
        assert!(scheduler.done());
    }
}

#[test]
fn compression_round_trips_frame_lists() {
    let source = load_fixture("mixed.txt");
    let mut parser = NxScriptParser::with_script(&source);
    for frame in 0..4 {
        if parser.get_frame(frame) {
            let words = parser.inputs_this_frame().to_words(frame);
            assert_eq!(uncompress(&compress(&words)).unwrap(), words);
        }
    }
}
