// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the host-side request path and weight upload, with
//! in-memory maps standing in for the kernel.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use map_ipc::InMemoryMapStore;
use model_artifacts::{ModelDims, TensorRole};
use runtime::{InferencePipeline, SettlePolicy, WeightLoader};
use std::collections::HashMap;
use trace_monitor::{ExecutionTrigger, TraceError};

struct NoopTrigger;

impl ExecutionTrigger for NoopTrigger {
    fn trigger(&self) -> Result<(), TraceError> {
        Ok(())
    }

    fn describe(&self) -> String {
        "noop".into()
    }
}

fn bench_request_path(c: &mut Criterion) {
    let dims = ModelDims::default();
    let input = InMemoryMapStore::new("mnist_input", dims.input_bytes());
    let output = InMemoryMapStore::new("mnist_output", dims.output_bytes());
    let pipeline = InferencePipeline::new(&input, &output, NoopTrigger, dims)
        .with_settle(SettlePolicy::Immediate);
    let samples = vec![128u8; dims.input];

    c.bench_function("run_in_memory", |b| {
        b.iter(|| pipeline.run_samples(black_box(&samples)).unwrap())
    });
}

fn bench_weight_upload(c: &mut Criterion) {
    let dims = ModelDims::default();
    let maps: HashMap<TensorRole, InMemoryMapStore> = TensorRole::ALL
        .iter()
        .map(|&r| (r, InMemoryMapStore::new(r.map_name(), r.size_bytes(&dims))))
        .collect();
    let loader = WeightLoader::synthetic(dims).unwrap();

    c.bench_function("upload_synthetic_weights", |b| {
        b.iter(|| loader.upload(|role| &maps[&role]).unwrap())
    });
}

criterion_group!(benches, bench_request_path, bench_weight_upload);
criterion_main!(benches);
