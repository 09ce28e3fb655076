use std::time::Duration;

use folio_typewriter::{CyclerError, CyclerTimings, Direction, TextCycler, Typewriter};
use tokio::sync::watch;
use tokio::time::Instant;

fn typewriter(phrases: &[&str]) -> Typewriter {
    Typewriter::new(TextCycler::new(phrases.iter().copied(), CyclerTimings::default()).unwrap())
}

async fn next_frame(
    rx: &mut watch::Receiver<folio_typewriter::CyclerSnapshot>,
    t0: Instant,
) -> (String, Duration) {
    rx.changed().await.expect("typewriter still running");
    let text = rx.borrow_and_update().displayed.clone();
    (text, t0.elapsed())
}

fn assert_near(actual: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    assert!(
        actual >= expected && actual < expected + Duration::from_millis(5),
        "expected ~{expected:?}, got {actual:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn frames_follow_the_type_hold_delete_schedule() {
    let mut tw = typewriter(&["A", "BC"]);
    let mut rx = tw.subscribe();
    let t0 = Instant::now();
    tw.start().unwrap();

    let expected = [
        ("A", 150),
        ("", 1650),
        ("B", 1800),
        ("BC", 1950),
        ("B", 3450),
        ("", 3550),
        ("A", 3700),
    ];
    for (text, at_ms) in expected {
        let (got, when) = next_frame(&mut rx, t0).await;
        assert_eq!(got, text);
        assert_near(when, at_ms);
    }
    tw.stop();
}

#[tokio::test(start_paused = true)]
async fn no_shrink_during_the_hold() {
    let mut tw = typewriter(&["Rust"]);
    let mut rx = tw.subscribe();
    let t0 = Instant::now();
    tw.start().unwrap();

    let mut full_at = None;
    loop {
        let (text, when) = next_frame(&mut rx, t0).await;
        if let Some(full_at) = full_at {
            assert_eq!(text, "Rus");
            assert!(when - full_at >= Duration::from_millis(1500));
            assert_eq!(rx.borrow().direction, Direction::Deleting);
            break;
        }
        if text == "Rust" {
            full_at = Some(when);
        }
    }
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_pending_tick() {
    let mut tw = typewriter(&["Hello"]);
    let mut rx = tw.subscribe();
    tw.start().unwrap();
    assert!(tw.is_running());

    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().displayed, "H");

    tw.stop();
    assert!(!tw.is_running());
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert!(!rx.has_changed().unwrap());
    assert_eq!(tw.current().displayed, "H");
}

#[tokio::test(start_paused = true)]
async fn dropping_the_driver_closes_the_channel() {
    let mut tw = typewriter(&["Hello"]);
    let mut rx = tw.subscribe();
    tw.start().unwrap();
    rx.changed().await.unwrap();

    drop(tw);
    // Drain anything published before the drop, then observe the close.
    while rx.changed().await.is_ok() {}
}

#[tokio::test(start_paused = true)]
async fn start_is_single_shot() {
    let mut tw = typewriter(&["x"]);
    tw.start().unwrap();
    assert_eq!(tw.start(), Err(CyclerError::AlreadyStarted));

    tw.stop();
    assert_eq!(tw.start(), Err(CyclerError::Stopped));
}

#[test]
fn start_requires_a_runtime() {
    let mut tw = typewriter(&["x"]);
    assert_eq!(tw.start(), Err(CyclerError::NoRuntime));
    assert!(!tw.is_running());
}
