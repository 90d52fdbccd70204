use std::sync::{Arc, Mutex};
use std::time::Duration;

use form_spec::HookError;
use greentic_form::{DebouncedEffectRunner, EngineError};
use tokio::time::sleep;

type Calls = Arc<Mutex<Vec<String>>>;

fn record(
    runner: &DebouncedEffectRunner,
    calls: &Calls,
    key: &str,
    value: &str,
    delay_ms: u64,
) {
    let calls = Arc::clone(calls);
    let value = value.to_string();
    runner
        .schedule(key, Duration::from_millis(delay_ms), move || async move {
            calls.lock().unwrap().push(value);
            Ok::<(), HookError>(())
        })
        .expect("schedule");
}

#[tokio::test(start_paused = true)]
async fn burst_runs_once_with_last_value() {
    let runner = DebouncedEffectRunner::new();
    let calls = Calls::default();

    for value in ["a", "ab", "abc"] {
        record(&runner, &calls, "name", value, 500);
        sleep(Duration::from_millis(100)).await;
    }
    assert!(runner.is_pending("name"));
    assert!(runner.is_loading("name"));
    assert!(calls.lock().unwrap().is_empty());

    sleep(Duration::from_millis(600)).await;
    assert_eq!(*calls.lock().unwrap(), vec!["abc".to_string()]);
    assert!(!runner.is_pending("name"));
    assert!(!runner.is_loading("name"));
}

#[tokio::test(start_paused = true)]
async fn spaced_calls_each_fire() {
    let runner = DebouncedEffectRunner::new();
    let calls = Calls::default();

    record(&runner, &calls, "name", "first", 200);
    sleep(Duration::from_millis(300)).await;
    record(&runner, &calls, "name", "second", 200);
    sleep(Duration::from_millis(300)).await;

    assert_eq!(
        *calls.lock().unwrap(),
        vec!["first".to_string(), "second".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_prevents_firing() {
    let runner = DebouncedEffectRunner::new();
    let calls = Calls::default();

    record(&runner, &calls, "name", "never", 500);
    runner.cancel("name");
    assert!(!runner.is_loading("name"));

    sleep(Duration::from_secs(2)).await;
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn keys_are_independent() {
    let runner = DebouncedEffectRunner::new();
    let calls = Calls::default();

    record(&runner, &calls, "a", "from-a", 100);
    record(&runner, &calls, "b", "from-b", 100);
    runner.cancel_where(|key| key == "a");
    sleep(Duration::from_millis(200)).await;

    assert_eq!(*calls.lock().unwrap(), vec!["from-b".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn failure_still_clears_loading() {
    let runner = DebouncedEffectRunner::new();
    runner
        .schedule("email", Duration::from_millis(50), || async {
            Err::<(), HookError>("lookup failed".into())
        })
        .expect("schedule");
    assert!(runner.is_loading("email"));

    sleep(Duration::from_millis(100)).await;
    assert!(!runner.is_loading("email"));
}

#[tokio::test(start_paused = true)]
async fn cancel_all_stops_everything() {
    let runner = DebouncedEffectRunner::new();
    let calls = Calls::default();
    record(&runner, &calls, "a", "1", 100);
    record(&runner, &calls, "b", "2", 100);
    runner.cancel_all();
    sleep(Duration::from_millis(500)).await;
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn scheduling_needs_a_runtime() {
    let runner = DebouncedEffectRunner::new();
    let err = runner
        .schedule("name", Duration::from_millis(10), || async {
            Ok::<(), HookError>(())
        })
        .expect_err("no runtime");
    assert!(matches!(err, EngineError::NoRuntime));
}
