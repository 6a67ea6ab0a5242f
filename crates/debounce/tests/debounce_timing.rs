//! Timing behavior of debounced wrappers under virtual tokio time

mod common;

use common::Recorder;
use debounce::{debounce, Builder, DebounceOptions};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use timer::{FrameLoop, ManualClock};
use tokio::time::sleep;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[tokio::test(start_paused = true)]
async fn test_single_call_fires_after_wait() {
    let recorder = Recorder::new();
    let debounced = debounce(recorder.func(), Some(ms(100)), DebounceOptions::default()).unwrap();

    assert_eq!(debounced.call(7), None);
    assert!(debounced.pending());

    sleep(ms(99)).await;
    assert_eq!(recorder.count(), 0);

    sleep(ms(2)).await;
    assert_eq!(recorder.calls(), vec![(100, 7)]);
    assert!(!debounced.pending());

    // Nothing further once the burst is over
    sleep(ms(500)).await;
    assert_eq!(recorder.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leading_only_fires_synchronously() {
    let recorder = Recorder::new();
    let options = DebounceOptions {
        leading: true,
        trailing: false,
        max_wait: None,
    };
    let debounced = debounce(recorder.func(), Some(ms(100)), options).unwrap();

    assert_eq!(debounced.call(3), Some(30));
    assert_eq!(recorder.calls(), vec![(0, 3)]);

    sleep(ms(250)).await;
    assert_eq!(recorder.count(), 1);
    assert!(!debounced.pending());
}

#[tokio::test(start_paused = true)]
async fn test_burst_collapses_to_last_call() {
    let recorder = Recorder::new();
    let debounced = debounce(recorder.func(), Some(ms(100)), DebounceOptions::default()).unwrap();

    for arg in 1..=4 {
        debounced.call(arg);
        if arg < 4 {
            sleep(ms(30)).await;
        }
    }

    // Last call at 90ms, so the trailing edge lands at 190ms
    sleep(ms(95)).await;
    assert_eq!(recorder.count(), 0);

    sleep(ms(10)).await;
    assert_eq!(recorder.calls(), vec![(190, 4)]);

    sleep(ms(500)).await;
    assert_eq!(recorder.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_leading_and_trailing_burst() {
    let recorder = Recorder::new();
    let debounced = Builder::new()
        .func(recorder.func())
        .wait(ms(100))
        .leading(true)
        .build()
        .unwrap();

    assert_eq!(debounced.call(1), Some(10));
    sleep(ms(50)).await;
    assert_eq!(debounced.call(2), Some(10));

    sleep(ms(200)).await;
    assert_eq!(recorder.calls(), vec![(0, 1), (150, 2)]);
    assert_eq!(debounced.call(3), Some(30));
}

#[tokio::test(start_paused = true)]
async fn test_max_wait_sets_cadence() {
    let recorder = Recorder::new();
    let options = DebounceOptions {
        max_wait: Some(ms(250)),
        ..Default::default()
    };
    let debounced = debounce(recorder.func(), Some(ms(100)), options).unwrap();

    // Calls every 40ms for a full second, never quiet for `wait`
    for arg in 0..25 {
        debounced.call(arg);
        sleep(ms(40)).await;
    }
    sleep(ms(500)).await;

    assert_eq!(
        recorder.calls(),
        vec![(250, 6), (500, 12), (750, 18), (1000, 24)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_resets_to_fresh() {
    let recorder = Recorder::new();
    let debounced = Builder::new()
        .func(recorder.func())
        .wait(ms(100))
        .leading(true)
        .build()
        .unwrap();

    debounced.call(1);
    sleep(ms(20)).await;
    debounced.call(2);
    debounced.cancel();
    assert!(!debounced.pending());

    // Call 2 was dropped; the next call is a new leading edge
    assert_eq!(debounced.call(3), Some(30));
    sleep(ms(300)).await;
    assert_eq!(recorder.args(), vec![1, 3]);
    assert_eq!(recorder.calls()[1].0, 20);
}

#[tokio::test(start_paused = true)]
async fn test_flush() {
    let recorder = Recorder::new();
    let debounced = debounce(recorder.func(), Some(ms(100)), DebounceOptions::default()).unwrap();

    // Nothing pending: no side effects
    assert_eq!(debounced.flush(), None);
    assert_eq!(recorder.count(), 0);

    debounced.call(5);
    sleep(ms(10)).await;
    assert_eq!(debounced.flush(), Some(50));
    assert!(!debounced.pending());
    assert_eq!(recorder.calls(), vec![(10, 5)]);

    // The cancelled timer must not fire a second time
    sleep(ms(300)).await;
    assert_eq!(recorder.count(), 1);
    assert_eq!(debounced.flush(), Some(50));
}

#[tokio::test(start_paused = true)]
async fn test_pending_lifecycle() {
    let recorder = Recorder::new();
    let debounced = debounce(recorder.func(), Some(ms(100)), DebounceOptions::default()).unwrap();

    assert!(!debounced.pending());
    debounced.call(1);
    assert!(debounced.pending());
    sleep(ms(150)).await;
    assert!(!debounced.pending());

    debounced.call(2);
    assert!(debounced.pending());
    debounced.cancel();
    assert!(!debounced.pending());

    debounced.call(3);
    assert!(debounced.pending());
    debounced.flush();
    assert!(!debounced.pending());
}

#[tokio::test(start_paused = true)]
async fn test_backward_clock_does_not_wedge() {
    let recorder = Recorder::new();
    let clock = Arc::new(ManualClock::new(1_000));
    let debounced = Builder::new()
        .func(recorder.func())
        .wait(ms(100))
        .clock(clock.clone())
        .build()
        .unwrap();

    debounced.call(1);
    clock.set(500);

    // Expiry sees `now < last call` and completes the burst
    sleep(ms(150)).await;
    assert_eq!(recorder.args(), vec![1]);
    assert!(!debounced.pending());
}

#[test]
fn test_frame_scheduling_without_wait() {
    let recorder = Recorder::new();
    let frames = FrameLoop::new();
    let debounced = Builder::new()
        .func(recorder.func())
        .frames(frames.clone())
        .clock(Arc::new(ManualClock::new(0)))
        .build()
        .unwrap();

    assert_eq!(debounced.scheduler_name(), "frame");
    assert!(debounced.settings().frame_scheduled);

    debounced.call(1);
    debounced.call(2);
    assert_eq!(frames.queued(), 1);

    frames.tick();
    assert_eq!(recorder.args(), vec![2]);
    assert!(!debounced.pending());
}

#[tokio::test]
async fn test_explicit_zero_wait_uses_delay() {
    let recorder = Recorder::new();
    let debounced = Builder::new()
        .func(recorder.func())
        .wait(Duration::ZERO)
        .frames(FrameLoop::new())
        .build()
        .unwrap();

    assert_eq!(debounced.scheduler_name(), "delay");
    assert!(!debounced.settings().frame_scheduled);
}

#[test]
fn test_dropping_wrapper_cancels_timer() {
    let recorder = Recorder::new();
    let frames = FrameLoop::new();
    let debounced = Builder::new()
        .func(recorder.func())
        .frames(frames.clone())
        .build()
        .unwrap();

    debounced.call(1);
    assert_eq!(frames.queued(), 1);

    drop(debounced);
    assert_eq!(frames.queued(), 0);
    assert_eq!(frames.tick(), 0);
    assert_eq!(recorder.count(), 0);
}

#[test]
fn test_func_panic_reaches_caller() {
    let frames = FrameLoop::new();
    let debounced = Builder::new()
        .func(|n: u32| -> u32 {
            if n == 0 {
                panic!("zero");
            }
            n
        })
        .leading(true)
        .frames(frames.clone())
        .clock(Arc::new(ManualClock::new(0)))
        .build()
        .unwrap();

    let outcome = catch_unwind(AssertUnwindSafe(|| debounced.call(0)));
    assert!(outcome.is_err());

    // The wrapper is still usable after the failure
    assert!(debounced.pending());
    debounced.call(4);
    assert_eq!(debounced.flush(), Some(4));
}

#[test]
fn test_fixed_delay_needs_runtime() {
    let err = debounce(|n: u32| n, Some(ms(10)), DebounceOptions::default())
        .err()
        .unwrap();
    assert!(matches!(err, debounce::Error::Timer(_)));
}
