//! Application lifecycle: entry point validation, phase ordering, logging
//! and fatal-error routing

mod fixtures;

use fixtures::{config_fixture, Capture};
use futures::channel::oneshot;
use launchpad::{App, AppError, ConfigStore, Outcome, Phase, PhaseError, Stage};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

type Events = Arc<Mutex<Vec<String>>>;

fn push(events: &Events, event: impl Into<String>) {
    events.lock().unwrap().push(event.into());
}

fn snapshot(events: &Events) -> Vec<String> {
    events.lock().unwrap().clone()
}

#[test]
fn test_no_entry_point_fails_construction() {
    let err = App::builder()
        .before(Phase::plain(|_| Ok(())))
        .after(Phase::plain(|_| Ok(())))
        .start()
        .unwrap_err();

    assert!(matches!(err, AppError::MissingEntryPoint));
    assert!(err.to_string().to_lowercase().contains("no run function"));
}

#[test]
fn test_plain_entry_point_runs() {
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);

    let handle = App::builder()
        .run(Phase::plain(move |_| {
            *flag.lock().unwrap() = true;
            Ok(())
        }))
        .start()
        .unwrap();

    assert!(*ran.lock().unwrap());
    assert_eq!(handle.join(), Outcome::Completed);
}

#[test]
fn test_suspending_entry_point_runs() {
    let ran = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran);

    let outcome = App::builder()
        .run(Phase::suspending(move |_| async move {
            futures::future::ready(()).await;
            *flag.lock().unwrap() = true;
            Ok::<(), PhaseError>(())
        }))
        .start()
        .unwrap()
        .join();

    assert_eq!(outcome, Outcome::Completed);
    assert!(*ran.lock().unwrap());
}

#[test]
fn test_mixed_phases_observe_strict_order() {
    let events = Events::default();
    let (release_before, before_gate) = oneshot::channel::<()>();
    let (release_after, after_gate) = oneshot::channel::<()>();

    let before_events = Arc::clone(&events);
    let run_events = Arc::clone(&events);
    let after_events = Arc::clone(&events);

    let handle = App::builder()
        .before(Phase::suspending(move |_| async move {
            push(&before_events, "before:start");
            before_gate.await?;
            push(&before_events, "before:end");
            Ok::<(), PhaseError>(())
        }))
        .run(Phase::plain(move |_| {
            push(&run_events, "run");
            Ok(())
        }))
        .after(Phase::suspending(move |_| async move {
            push(&after_events, "after:start");
            after_gate.await?;
            push(&after_events, "after:end");
            Ok::<(), PhaseError>(())
        }))
        .start()
        .unwrap();

    assert_eq!(snapshot(&events), vec!["before:start"]);

    release_before.send(()).unwrap();
    release_after.send(()).unwrap();
    assert_eq!(handle.join(), Outcome::Completed);

    assert_eq!(
        snapshot(&events),
        vec!["before:start", "before:end", "run", "after:start", "after:end"]
    );
}

#[test]
fn test_failed_phase_goes_to_die_and_stops_sequence() {
    let events = Events::default();
    let die_events = Arc::clone(&events);
    let after_events = Arc::clone(&events);

    let outcome = App::builder()
        .run(Phase::plain(|_| Err("config missing".into())))
        .after(Phase::plain(move |_| {
            push(&after_events, "after");
            Ok(())
        }))
        .on_die(move |_, values| {
            push(&die_events, format!("die {}", values.len()));
            if let Some(Value::String(message)) = values.first() {
                push(&die_events, message.clone());
            }
        })
        .start()
        .unwrap()
        .join();

    assert_eq!(outcome, Outcome::Failed(Stage::Run));
    assert_eq!(snapshot(&events), vec!["die 1", "run phase failed: config missing"]);
}

#[test]
fn test_log_lines_are_timestamped() {
    let capture = Capture::default();

    App::builder()
        .output(capture.clone())
        .run(Phase::plain(|ctx| {
            launchpad::log!(ctx, "hello world");
            launchpad::log!(ctx, "count", 3, json!({"a": {"b": {"c": {"d": 1}}}}));
            Ok(())
        }))
        .start()
        .unwrap()
        .join();

    let lines = capture.lines();
    assert!(lines[0].starts_with('['));
    assert_eq!(&lines[0][9..], "] hello world");
    assert!(lines[1].ends_with("] count 3 {"));
    assert!(lines.iter().any(|l| l.trim() == "\"d\": 1"));
}

#[test]
fn test_debug_output_follows_option() {
    for debugging in [false, true] {
        let capture = Capture::default();
        App::builder()
            .options(json!({"isDebugging": debugging}))
            .output(capture.clone())
            .run(Phase::plain(|ctx| {
                launchpad::debug!(ctx, "tick");
                Ok(())
            }))
            .start()
            .unwrap()
            .join();

        let lines = capture.lines();
        if debugging {
            assert_eq!(lines.len(), 1);
            assert!(lines[0].ends_with("] [DEBUG] tick"));
        } else {
            assert!(lines.is_empty());
        }
    }
}

#[test]
fn test_config_store_handed_to_app() {
    let store = ConfigStore::open(config_fixture("goodConfig.json")).unwrap();
    let greeting = Arc::new(Mutex::new(None));
    let seen = Arc::clone(&greeting);

    App::builder()
        .options(json!({"config": store.to_value()}))
        .run(Phase::plain(move |ctx| {
            let hello = ctx
                .option("config")
                .and_then(|c| c.get("hello"))
                .and_then(Value::as_str)
                .map(str::to_string);
            *seen.lock().unwrap() = hello;
            Ok(())
        }))
        .start()
        .unwrap()
        .join();

    assert_eq!(greeting.lock().unwrap().as_deref(), Some("world"));
}
