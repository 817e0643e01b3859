// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for lookup-response decoding and input hex encoding.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use map_ipc::{decoder, wire};

fn lookup_json(value: &[u8]) -> String {
    let bytes: Vec<String> = value.iter().map(|b| b.to_string()).collect();
    format!(
        "[{{\"key\": [0, 0, 0, 0], \"value\": [{}]}}]",
        bytes.join(", ")
    )
}

fn bench_decode_output(c: &mut Criterion) {
    let logits: Vec<u8> = [3i32, -1, 7, 2, 0, 0, 0, 0, 0, 0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    let raw = lookup_json(&logits);

    c.bench_function("decode_output_10_classes", |b| {
        b.iter(|| decoder::decode_output(black_box(raw.as_bytes()), 10).unwrap())
    });
}

fn bench_encode_input(c: &mut Criterion) {
    let pixels: Vec<u8> = (0..784).map(|i| (i % 256) as u8).collect();

    c.bench_function("hex_encode_784_pixels", |b| {
        b.iter(|| wire::encode_value(black_box(&pixels)))
    });
}

criterion_group!(benches, bench_decode_output, bench_encode_input);
criterion_main!(benches);
