//! Integration tests for surviving process restarts.
//!
//! Each "process" opens the same SQLite file, builds a fresh engine and
//! ledger, and goes through the lifecycle calls a host would make.

use std::path::Path;
use std::rc::Rc;

use flexcounter_core::{
    dispatch, Database, KvStore, Ledger, LifecycleSignal, ManualClock, TimerEngine, TimerEvent,
    TimerStatus,
};

struct Process {
    engine: TimerEngine<Rc<Database>, ManualClock>,
    ledger: Ledger<Rc<Database>>,
}

fn boot(path: &Path, clock: &ManualClock) -> Process {
    let db = Rc::new(Database::open_at(path).unwrap());
    let mut engine = TimerEngine::new(Rc::clone(&db), clock.clone());
    dispatch(&mut engine, LifecycleSignal::Load).unwrap();
    let ledger = Ledger::load(db).unwrap();
    Process { engine, ledger }
}

#[test]
fn running_timer_catches_up_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    {
        let mut p = boot(&path, &clock);
        p.engine.start(60).unwrap();
        for _ in 0..10 {
            clock.advance(1);
            p.engine.tick();
        }
        dispatch(&mut p.engine, LifecycleSignal::Unload).unwrap();
    }

    clock.advance(20);
    let p = boot(&path, &clock);
    assert_eq!(p.engine.status(), TimerStatus::Running);
    assert_eq!(p.engine.remaining_secs(), 30);
    assert_eq!(p.engine.target_secs(), 60);
    assert!(p.engine.tick_handle().is_some());
}

#[test]
fn crash_without_suspend_uses_start_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    {
        let mut p = boot(&path, &clock);
        p.engine.start(300).unwrap();
        // No suspend: the process is killed.
    }

    clock.advance(120);
    let p = boot(&path, &clock);
    assert_eq!(p.engine.remaining_secs(), 180);
}

#[test]
fn overtime_continues_across_reload_and_saves() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    {
        let mut p = boot(&path, &clock);
        p.engine.start(10).unwrap();
        dispatch(&mut p.engine, LifecycleSignal::Hidden).unwrap();
    }

    clock.advance(15);
    let mut p = boot(&path, &clock);
    assert_eq!(p.engine.remaining_secs(), -5);
    assert!(p.engine.is_expired());

    let entry = p.ledger.save(&mut p.engine, "long call").unwrap();
    assert_eq!(entry.seconds_over_under, -5);
    dispatch(&mut p.engine, LifecycleSignal::Unload).unwrap();
    drop(p);

    let p = boot(&path, &clock);
    assert_eq!(p.engine.status(), TimerStatus::Idle);
    assert_eq!(p.engine.remaining_secs(), 0);
    assert_eq!(p.ledger.balance(), -5);
    assert_eq!(p.ledger.entries()[0].label, "long call");
}

#[test]
fn paused_timer_survives_reload_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    {
        let mut p = boot(&path, &clock);
        p.engine.start(90).unwrap();
        for _ in 0..15 {
            p.engine.tick();
        }
        p.engine.pause().unwrap();
        dispatch(&mut p.engine, LifecycleSignal::Blur).unwrap();
    }

    clock.advance(3600);
    let mut p = boot(&path, &clock);
    assert_eq!(p.engine.status(), TimerStatus::Paused);
    assert_eq!(p.engine.remaining_secs(), 75);
    assert!(p.engine.tick_handle().is_none());

    p.engine.resume().unwrap();
    assert_eq!(p.engine.remaining_secs(), 75);
}

#[test]
fn fresh_database_reconciles_to_idle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    let mut p = boot(&path, &clock);
    assert_eq!(p.engine.status(), TimerStatus::Idle);
    assert!(dispatch(&mut p.engine, LifecycleSignal::Focus).unwrap().is_none());
}

#[test]
fn corrupt_snapshot_in_database_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    {
        let db = Database::open_at(&path).unwrap();
        db.set("timer.remainingSeconds", "forty").unwrap();
        db.set("timer.suspendedAt", "1704067200").unwrap();
    }

    let clock = ManualClock::default();
    let p = boot(&path, &clock);
    assert_eq!(p.engine.status(), TimerStatus::Idle);
    assert_eq!(p.engine.remaining_secs(), 0);
    assert!(p.engine.store().get("timer.remainingSeconds").unwrap().is_none());
}

#[test]
fn reload_reports_expiry_when_zero_passed_in_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flexcounter.db");
    let clock = ManualClock::default();

    {
        let mut p = boot(&path, &clock);
        p.engine.start(5).unwrap();
        p.engine.suspend().unwrap();
    }

    clock.advance(9);
    let db = Rc::new(Database::open_at(&path).unwrap());
    let mut engine = TimerEngine::new(db, clock.clone());
    let event = engine.reconcile().unwrap().unwrap();
    assert!(matches!(
        event,
        TimerEvent::TimerReconciled {
            expired: true,
            remaining_secs: -4,
            elapsed_secs: 9,
            ..
        }
    ));
}
