// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the tensor codec.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_core::{codec, DType, QuantizedTensor, Shape};

fn bench_weight_roundtrip(c: &mut Criterion) {
    let values: Vec<i8> = (0..32 * 784).map(|i| (i % 251) as i8).collect();
    let t = QuantizedTensor::from_i8(Shape::matrix(32, 784), &values).unwrap();

    c.bench_function("encode_decode_hidden_weights", |b| {
        b.iter(|| {
            let bytes = codec::encode(black_box(&t));
            codec::decode(&bytes, Shape::matrix(32, 784), DType::I8).unwrap()
        })
    });
}

fn bench_logits_decode(c: &mut Criterion) {
    let bytes = codec::encode_i32_le(&[3, -1, 7, 2, 0, 0, 0, 0, 0, 0]);

    c.bench_function("decode_i32_logits", |b| {
        b.iter(|| codec::decode_i32_le(black_box(&bytes)).unwrap())
    });
}

criterion_group!(benches, bench_weight_roundtrip, bench_logits_decode);
criterion_main!(benches);
