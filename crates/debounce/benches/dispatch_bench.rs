//! Call throughput benchmarks for debounced wrappers

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use debounce::{debounce, throttle, Builder, DebounceOptions, ThrottleOptions};
use std::time::Duration;
use timer::FrameLoop;

fn bench_burst_calls(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();

    // Calls inside a burst only record the payload
    let debounced = debounce(|n: u64| n, Some(Duration::from_secs(60)), DebounceOptions::default()).unwrap();
    debounced.call(0);
    c.bench_function("debounce_call_in_burst", |b| {
        b.iter(|| debounced.call(black_box(1)))
    });

    let throttled = throttle(|n: u64| n, Some(Duration::from_secs(60)), ThrottleOptions::default()).unwrap();
    throttled.call(0);
    c.bench_function("throttle_call_in_burst", |b| {
        b.iter(|| throttled.call(black_box(1)))
    });
}

fn bench_flush_cycle(c: &mut Criterion) {
    // Frame scheduling keeps timers off the runtime entirely
    let frames = FrameLoop::new();
    let debounced = Builder::new()
        .func(|n: u64| n.wrapping_mul(31))
        .frames(frames)
        .build()
        .unwrap();

    c.bench_function("call_then_flush", |b| {
        b.iter(|| {
            debounced.call(black_box(7));
            debounced.flush()
        })
    });
}

criterion_group!(benches, bench_burst_calls, bench_flush_cycle);
criterion_main!(benches);
