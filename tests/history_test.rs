// Integration tests for snapshot history navigation

use vipere::engine::constants::DEFAULT_SNAPSHOT_LIMIT;
use vipere::engine::{Engine, Fault, HistoryError};
use vipere::memory::Value;
use vipere::program::fixture::{credentials_program, FLAG};
use vipere::program::CodePath;

fn fixture_engine() -> Engine {
    let program = credentials_program().expect("fixture should decode");
    let mut engine = Engine::new(program, DEFAULT_SNAPSHOT_LIMIT);
    engine.run().expect("fixture should run");
    engine
}

#[test]
fn test_snapshot_count() {
    let engine = fixture_engine();
    // Initial state, 67 top-level instructions, and three loop iterations of
    // one key binding plus seven body instructions each
    assert_eq!(engine.total_snapshots(), 1 + 67 + 3 * 8);
    assert_eq!(engine.history_position(), engine.total_snapshots() - 1);
}

#[test]
fn test_walk_through_history() {
    let mut engine = fixture_engine();
    engine.rewind_to_start().expect("history should not be empty");

    let start = engine.current_snapshot().expect("first snapshot");
    assert!(start.executed.is_none());
    assert!(start.trace.is_empty());
    assert!(start.slots.iter().all(|(_, value)| value.is_none()));

    // LOAD_CONST 72, STORE_VAR f
    engine.step_forward().expect("step 1");
    let loaded = engine.current_snapshot().expect("after load");
    assert_eq!(loaded.stack.values(), &[Value::Int(72)]);

    engine.step_forward().expect("step 2");
    let stored = engine.current_snapshot().expect("after store");
    assert!(stored.stack.is_empty());
    assert_eq!(stored.executed, Some(CodePath::root(1)));
    assert_eq!(stored.trace.get_output(), vec!["f = 72"]);

    engine.step_backward().expect("step back");
    assert_eq!(engine.history_position(), 1);
    assert!(engine
        .current_snapshot()
        .expect("after load")
        .trace
        .is_empty());
}

#[test]
fn test_loop_snapshots_carry_nested_paths() {
    let mut engine = fixture_engine();
    engine.rewind_to_start().expect("history should not be empty");

    // Snapshot 65 is the first key binding, right after LOAD_VAR d at #63
    for _ in 0..65 {
        engine.step_forward().expect("step into the loop");
    }
    let bound = engine.current_snapshot().expect("key binding snapshot");
    assert_eq!(bound.executed, Some(CodePath::root(64)));
    assert_eq!(bound.trace.get_output().last(), Some(&"x = 'o'"));

    engine.step_forward().expect("first body instruction");
    let body = engine.current_snapshot().expect("loop body snapshot");
    assert_eq!(body.executed, Some(CodePath::new(vec![64, 0])));
}

#[test]
fn test_end_of_history_holds_result() {
    let mut engine = fixture_engine();
    engine.jump_to_end().expect("history should not be empty");
    assert_eq!(engine.step_forward(), Err(HistoryError::AtEnd));

    let last = engine.current_snapshot().expect("final snapshot");
    assert_eq!(last.result.as_deref(), Some(FLAG));
    assert!(last.stack.is_empty());
    assert_eq!(
        last.trace.get_output().last().copied(),
        Some("FLAG: HTB{cr0iss4nts_ch0c0_hmmmm}")
    );

    engine.rewind_to_start().expect("rewind");
    assert_eq!(engine.step_backward(), Err(HistoryError::AtStart));
}

#[test]
fn test_small_snapshot_limit_aborts() {
    let program = credentials_program().expect("fixture should decode");
    let mut engine = Engine::new(program, 4 * 1024);

    let err = engine.run().expect_err("4 KiB cannot hold the whole history");
    assert!(matches!(err.fault(), Fault::SnapshotLimitExceeded { .. }));
    assert!(engine.result().is_none());
    // Everything up to the failing snapshot stays navigable
    assert!(engine.total_snapshots() > 0);
    assert!(engine.rewind_to_start().is_ok());
}
