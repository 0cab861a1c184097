// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for decoding host invocations into typed commands.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};

use metrica_core::Command;

fn full_activation_args() -> Vec<Value> {
    vec![json!({
        "apiKey": "5012c3cc-20a4-4dac-92d1-83ebc27c0fa9",
        "handleFirstActivationAsUpdateEnabled": false,
        "trackLocationEnabled": true,
        "sessionTimeout": 10,
        "reportCrashesEnabled": true,
        "appVersion": "1.0.0",
        "loggingEnabled": true,
        "location": {
            "latitude": 53.890651,
            "longitude": 27.525408,
            "altitude": 224,
            "accuracy": 30,
            "course": 23,
            "speed": 2,
            "timestamp": 1490352300
        },
        "preloadInfo": {
            "trackingId": "123456",
            "additionalInfo": {"source": "partner", "campaign": "spring"}
        }
    })]
}

fn bench_decode_activate(c: &mut Criterion) {
    let args = full_activation_args();
    c.bench_function("decode activate (full config)", |b| {
        b.iter(|| {
            let cmd = Command::decode(black_box("activate"), black_box(&args));
            black_box(cmd).ok();
        });
    });
}

fn bench_decode_report_event(c: &mut Criterion) {
    let args = vec![json!("purchase"), json!({"sku": "A-1", "price": 9.99, "qty": 2})];
    c.bench_function("decode reportEvent (with params)", |b| {
        b.iter(|| {
            let cmd = Command::decode(black_box("reportEvent"), black_box(&args));
            black_box(cmd).ok();
        });
    });
}

fn bench_decode_unknown(c: &mut Criterion) {
    let args: Vec<Value> = Vec::new();
    c.bench_function("decode unknown action", |b| {
        b.iter(|| {
            let cmd = Command::decode(black_box("frobnicate"), black_box(&args));
            black_box(cmd).ok();
        });
    });
}

criterion_group!(
    benches,
    bench_decode_activate,
    bench_decode_report_event,
    bench_decode_unknown,
);
criterion_main!(benches);
