//! Main loop and audio engine driven step by step on one thread.

#![allow(clippy::unwrap_used)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::float_cmp)]

mod common;

use common::{block, shared, wav16, Board, TestApp, ECHO, FAULT, FRAMES, GAIN, METER, SAMPLER};
use platform::mocks::{MockClock, MockDisplay, MockStorage, MockUart};
use platform::absent::{NoDisplay, NoUart};
use platform::{AudioConfig, Capabilities, RuntimeConfig};
use runtime::{GateState, LoadError, MainLoop, Peripherals, RuntimeError};
use ui::{Mode, ScopeSource};
use wav::WavError;

/// Let one UI period pass and run the main loop once.
fn ui_tick(board: &Board, main: &mut MainLoop<'_, TestApp, MockStorage, MockUart, MockDisplay, MockClock>) {
    board.clock.advance_ms(20);
    main.tick();
}

fn ui_tick_bare(board: &Board, main: &mut MainLoop<'_, TestApp, MockStorage, NoUart, NoDisplay, MockClock>) {
    board.clock.advance_ms(20);
    main.tick();
}

#[test]
fn start_loads_first_app_and_reports_usage() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN, ECHO]);

    assert_eq!(shared.gate_state(), GateState::Parked);
    main.start().unwrap();

    assert_eq!(shared.gate_state(), GateState::Running);
    assert!(main.console().contains("loaded gain"));
    assert!(main.console().contains("0/4K+0/0M"));
    assert_eq!(main.params().len(), 1);
    assert_eq!(shared.params().get(0), 1.0);
    assert_eq!(main.machine().mode(), Mode::Scope);
}

#[test]
fn empty_app_table_is_rejected() {
    let board = Board::new();
    let shared = shared();
    let result = MainLoop::new(
        &shared,
        &[],
        Peripherals {
            storage: Some(board.storage.clone()),
            uart: Some(board.uart.clone()),
            display: Some(board.display.clone()),
        },
        board.clock.clone(),
        Capabilities::FIELD,
        AudioConfig::default(),
        RuntimeConfig::default(),
    );
    assert!(matches!(result, Err(RuntimeError::NoApps)));
}

#[test]
fn parked_audio_is_silent_until_start() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);

    let [left, right] = block(&mut engine, 0.5);
    assert!(left.iter().chain(&right).all(|s| *s == 0.0));

    main.start().unwrap();
    let [left, right] = block(&mut engine, 0.5);
    assert!(left.iter().chain(&right).all(|s| *s == 0.5));
}

#[test]
fn published_parameter_applies_on_next_block() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    shared.params().publish(0, 2.0);
    let [left, _] = block(&mut engine, 0.25);
    assert_eq!(left[0], 0.5);
    assert_eq!(shared.params().take_dirty(), 0);
}

#[test]
fn encoder_tweak_moves_parameter_by_one_percent_per_detent() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    // hold to select, turn to Params, release, release again to tweak
    board.controls.hold(300);
    block(&mut engine, 0.0);
    ui_tick(&board, &mut main);
    assert!(main.machine().selecting());

    board.controls.turn(1);
    block(&mut engine, 0.0);
    ui_tick(&board, &mut main);
    assert_eq!(main.machine().mode(), Mode::Params);

    board.controls.release();
    block(&mut engine, 0.0);
    ui_tick(&board, &mut main);
    assert!(!main.machine().selecting());

    board.controls.release();
    block(&mut engine, 0.0);
    ui_tick(&board, &mut main);
    assert!(main.machine().tweaking());

    board.controls.turn(5);
    block(&mut engine, 0.0);
    ui_tick(&board, &mut main);
    assert!((shared.params().get(0) - 1.1).abs() < 1e-6);

    let [left, _] = block(&mut engine, 1.0);
    assert!((left[0] - 1.1).abs() < 1e-6);
}

#[test]
fn midi_control_change_drives_bound_parameter() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    board.uart.feed(&[0xB0, 7, 127]);
    main.tick();
    assert_eq!(shared.midi().inbound_len(), 3);

    let [left, _] = block(&mut engine, 0.5);
    assert_eq!(left[0], 1.0);
    // the parameter view follows the controller without re-applying it
    assert_eq!(shared.params().get(0), 2.0);
    assert_eq!(shared.params().take_dirty(), 0);
}

#[test]
fn app_midi_reaches_uart_once() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[ECHO]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    block(&mut engine, 0.0);
    block(&mut engine, 0.0);
    main.tick();
    assert_eq!(board.uart.transmitted(), vec![0x90, 60, 100]);

    board.uart.feed(&[0x80, 64, 0]);
    main.tick();
    block(&mut engine, 0.0);
    main.tick();
    assert_eq!(board.uart.transmitted(), vec![0x90, 60, 100, 0x80, 64, 0]);
}

#[test]
fn transmit_failure_is_logged_and_retried() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[ECHO]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    board.uart.fail_next(-5);
    block(&mut engine, 0.0);
    main.tick();
    assert!(main.console().contains("midi tx err -5"));
    assert!(board.uart.transmitted().is_empty());

    main.tick();
    assert_eq!(board.uart.transmitted(), vec![0x90, 60, 100]);
}

#[test]
fn inbound_overflow_is_reported() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    main.start().unwrap();

    board.uart.feed(&[0xF8; 100]);
    main.tick();
    assert!(main.console().contains("midi in full"));
    assert_eq!(shared.midi().inbound_len(), 63);
}

#[test]
fn dsp_fault_silences_block_and_reaches_console() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[FAULT]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    let [left, right] = block(&mut engine, 0.5);
    assert!(left.iter().chain(&right).all(|s| *s == 0.0));
    assert_eq!(shared.fault_count(), 1);

    main.tick();
    assert!(main.console().contains("dsp fault 3"));
}

#[test]
fn missing_input_buffers_are_a_null_buffer_fault() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    let mut out = vec![1.0f32; FRAMES];
    engine.process(&[], &mut [out.as_mut_slice()]);
    assert!(out.iter().all(|s| *s == 0.0));
    main.tick();
    assert!(main.console().contains("dsp fault -1"));
}

#[test]
fn persistent_fault_is_reported_once() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[FAULT]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    for _ in 0..10 {
        block(&mut engine, 0.5);
        main.tick();
    }

    let faults = main.console().lines().filter(|l| l.starts_with("dsp fault")).count();
    assert_eq!(faults, 1);
    assert!(main.console().contains("loaded fault"));
    assert_eq!(shared.fault_count(), 10);
    assert_eq!(shared.fault_runs(), 1);
}

#[test]
fn fault_after_clean_block_is_reported_again() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    let mut out = vec![1.0f32; FRAMES];
    engine.process(&[], &mut [out.as_mut_slice()]);
    main.tick();
    block(&mut engine, 0.5);
    main.tick();
    engine.process(&[], &mut [out.as_mut_slice()]);
    main.tick();

    let faults = main.console().lines().filter(|l| *l == "dsp fault -1").count();
    assert_eq!(faults, 2);
    assert_eq!(shared.fault_runs(), 2);
}

#[test]
fn tick_hook_runs_once_per_tick_with_elapsed_time() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[METER, GAIN]);
    main.start().unwrap();
    assert!(!main.console().contains("dt "));

    board.clock.advance_ms(7);
    main.tick();
    board.clock.advance_ms(5);
    main.tick();
    main.tick();

    let lines: Vec<&str> = main.console().lines().filter(|l| l.starts_with("dt ")).collect();
    assert_eq!(lines, ["dt 7 gain 1", "dt 5 gain 1", "dt 0 gain 1"]);
    assert!(main.console().contains("loaded meter"));
}

#[test]
fn tick_hook_stops_when_app_is_swapped_out() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[METER, GAIN]);
    main.start().unwrap();
    main.tick();
    main.load_app(1).unwrap();
    main.tick();
    main.tick();

    let lines = main.console().lines().filter(|l| l.starts_with("dt ")).count();
    assert_eq!(lines, 1);
}

#[test]
fn scope_traces_outputs_only_in_scope_mode() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    block(&mut engine, 0.5);
    assert_eq!(shared.scope().cursor(), 0);

    ui_tick(&board, &mut main);
    assert_eq!(main.machine().scope_settings().source, ScopeSource::Outputs);
    block(&mut engine, 0.5);
    // 48 frames at the default 6 samples per column
    assert_eq!(shared.scope().cursor(), FRAMES / 6);
    assert_eq!(shared.scope().column(0, 0), (0.5, 0.5));
}

#[test]
fn ui_tick_draws_and_flushes() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[GAIN]);
    main.start().unwrap();

    main.tick();
    assert_eq!(board.display.flush_count(), 0);
    ui_tick(&board, &mut main);
    assert_eq!(board.display.flush_count(), 1);
    assert!(board.display.lit_pixels() > 0);
}

#[test]
fn sampler_streams_wav_into_arena() {
    let board = Board::new();
    board.storage.insert("kick.wav", wav16(&[16_384, -16_384, 0, 8_192]));
    let shared = shared();
    let mut main = board.main_loop(&shared, &[SAMPLER]);
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    assert_eq!(board.storage.open_handles(), 0);
    let [left, right] = block(&mut engine, 0.0);
    assert_eq!(&left[..5], &[0.5, -0.5, 0.0, 0.25, 0.5]);
    assert_eq!(left, right);
}

#[test]
fn missing_wav_fails_load_and_stays_parked() {
    let board = Board::new();
    let shared = shared();
    let mut main = board.main_loop(&shared, &[SAMPLER]);

    let err = main.start().unwrap_err();
    assert_eq!(err, RuntimeError::Load(LoadError::Wav(WavError::Open)));
    assert!(main.console().contains("bad kick.wav"));
    assert!(main.console().contains("load failed sampler"));
    assert_eq!(shared.gate_state(), GateState::Parked);
}

#[test]
fn truncated_wav_loads_with_warning() {
    let board = Board::new();
    let mut bytes = wav16(&[1_000; 8]);
    bytes.truncate(bytes.len() - 8);
    board.storage.insert("kick.wav", bytes);
    let shared = shared();
    let mut main = board.main_loop(&shared, &[SAMPLER]);

    main.start().unwrap();
    assert!(main.console().contains("short kick.wav"));
    assert_eq!(shared.gate_state(), GateState::Running);
}

#[test]
fn storage_is_hidden_on_boards_without_it() {
    let board = Board::new();
    board.storage.insert("kick.wav", wav16(&[0; 4]));
    let shared = shared();
    let mut main: MainLoop<'_, _, MockStorage, _, _, _> = MainLoop::new(
        &shared,
        &[SAMPLER],
        Peripherals {
            storage: Some(board.storage.clone()),
            uart: Some(board.uart.clone()),
            display: Some(board.display.clone()),
        },
        board.clock.clone(),
        Capabilities::POD,
        AudioConfig::default(),
        RuntimeConfig::default(),
    )
    .unwrap();

    assert_eq!(main.start(), Err(RuntimeError::Load(LoadError::NoStorage)));
    assert!(main.console().contains("no storage"));
}

#[test]
fn bare_board_runs_without_peripherals() {
    let board = Board::new();
    let shared = shared();
    let mut main = MainLoop::new(
        &shared,
        &[GAIN],
        Peripherals::<MockStorage, NoUart, NoDisplay> {
            storage: None,
            uart: None,
            display: None,
        },
        board.clock.clone(),
        Capabilities::SEED,
        AudioConfig::default(),
        RuntimeConfig::default(),
    )
    .unwrap();
    let mut engine = board.engine(&shared);
    main.start().unwrap();

    let [left, _] = block(&mut engine, 0.5);
    assert_eq!(left[0], 0.5);
    ui_tick_bare(&board, &mut main);
    assert_eq!(main.machine().mode(), Mode::Scope);
    assert!(main.machine().modes().contains(Mode::Console));
    assert!(!main.machine().modes().contains(Mode::Menu));
}

#[test]
fn corrupted_wav_is_reported_by_name() {
    let board = Board::new();
    let mut bytes = wav16(&[0; 16]);
    bytes[0] = b'X';
    board.storage.insert("kick.wav", bytes);
    let shared = shared();
    let mut main = board.main_loop(&shared, &[SAMPLER, GAIN]);

    let err = main.start().unwrap_err();
    assert!(matches!(err, RuntimeError::Load(LoadError::Wav(WavError::BadFormat(_)))));
    assert!(main.console().contains("bad kick.wav"));
    assert_eq!(board.storage.open_handles(), 0);

    // the next app still loads
    main.load_app(1).unwrap();
    assert_eq!(shared.gate_state(), GateState::Running);
}
