// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: end-to-end inference pipeline.
//!
//! These tests run the complete flow from exported artifacts → weight upload
//! → input write → trigger → trace verification → lookup → arg-max against
//! in-memory maps and a simulated execution surface that performs the same
//! integer arithmetic as the kernel program.

use map_ipc::{InMemoryMapStore, MapError, MapOp, MapStore};
use model_artifacts::artifact::Validated;
use model_artifacts::{ArtifactExporter, ModelArtifactSet, ModelDims, TensorRole};
use runtime::{
    InferencePipeline, InputBuffer, RuntimeError, SettleOutcome, SettlePolicy, WeightLoader,
    WeightSource,
};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tensor_core::{QuantizedTensor, Shape};
use trace_monitor::{ExecutionTrigger, TraceError, TraceVerifier};

// ── Simulated execution surface ────────────────────────────────

fn leaky_relu(x: i32) -> i32 {
    if x >= 0 {
        x
    } else {
        x / 100
    }
}

/// Reference forward pass over raw map contents.
fn forward(dims: &ModelDims, input: &[u8], hw: &[i8], hb: &[i32], ow: &[i8], ob: &[i32]) -> Vec<i32> {
    let hidden: Vec<i32> = (0..dims.hidden)
        .map(|j| {
            let sum = (0..dims.input).fold(hb[j], |acc, i| {
                acc.wrapping_add(hw[j * dims.input + i] as i32 * input[i] as i32)
            });
            leaky_relu(sum)
        })
        .collect();
    (0..dims.output)
        .map(|o| {
            let sum = (0..dims.hidden).fold(ob[o], |acc, j| {
                acc.wrapping_add((ow[o * dims.hidden + j] as i32).wrapping_mul(hidden[j]))
            });
            leaky_relu(sum)
        })
        .collect()
}

fn as_i8(bytes: &[u8]) -> Vec<i8> {
    bytes.iter().map(|&b| b as i8).collect()
}

fn as_i32(bytes: &[u8]) -> Vec<i32> {
    tensor_core::codec::decode_i32_le(bytes).unwrap()
}

/// Maps shared between the host pipeline and the simulated surface.
struct Maps {
    dims: ModelDims,
    input: Arc<InMemoryMapStore>,
    output: Arc<InMemoryMapStore>,
    weights: HashMap<TensorRole, Arc<InMemoryMapStore>>,
}

impl Maps {
    fn new(dims: ModelDims) -> Self {
        let weights = TensorRole::ALL
            .iter()
            .map(|&r| {
                (
                    r,
                    Arc::new(InMemoryMapStore::new(r.map_name(), r.size_bytes(&dims))),
                )
            })
            .collect();
        Self {
            dims,
            input: Arc::new(InMemoryMapStore::new("mnist_input", dims.input_bytes())),
            output: Arc::new(InMemoryMapStore::new("mnist_output", dims.output_bytes())),
            weights,
        }
    }

    fn weight(&self, role: TensorRole) -> Vec<u8> {
        self.weights[&role]
            .peek(0)
            .unwrap_or_else(|| vec![0; role.size_bytes(&self.dims)])
    }
}

/// Runs the forward pass on every trigger and appends the trace marker.
struct SimulatedSurface {
    maps: Arc<Maps>,
    trace: Option<PathBuf>,
}

impl ExecutionTrigger for SimulatedSurface {
    fn trigger(&self) -> Result<(), TraceError> {
        let m = &self.maps;
        let input = m.input.peek(0).unwrap_or_else(|| vec![0; m.dims.input]);
        let logits = forward(
            &m.dims,
            &input,
            &as_i8(&m.weight(TensorRole::HiddenWeights)),
            &as_i32(&m.weight(TensorRole::HiddenBias)),
            &as_i8(&m.weight(TensorRole::OutputWeights)),
            &as_i32(&m.weight(TensorRole::OutputBias)),
        );
        let bytes: Vec<u8> = logits.iter().flat_map(|v| v.to_le_bytes()).collect();
        m.output
            .update(0, &bytes)
            .map_err(|e| TraceError::TriggerFailed(e.to_string()))?;

        if let Some(path) = &self.trace {
            let mut f = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| TraceError::TriggerFailed(e.to_string()))?;
            writeln!(f, "kinfer-1234 [002] d..31 bpf_trace_printk: BPF_INFER: inference executed")
                .map_err(|e| TraceError::TriggerFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        "simulated-surface".into()
    }
}

// ── Helpers ────────────────────────────────────────────────────

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("kinfer_integration").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Parameters under which class `winner` receives the largest logit for any
/// non-blank input.
fn winner_set(dims: ModelDims, winner: usize) -> ModelArtifactSet<Validated> {
    let hw = vec![1i8; dims.hidden * dims.input];
    let hb = vec![0i32; dims.hidden];
    let ow: Vec<i8> = (0..dims.output * dims.hidden)
        .map(|idx| if idx / dims.hidden == winner { 3 } else { 1 })
        .collect();
    let ob = vec![0i32; dims.output];
    ModelArtifactSet::new(
        dims,
        QuantizedTensor::from_i8(Shape::matrix(dims.hidden, dims.input), &hw).unwrap(),
        QuantizedTensor::from_i32(Shape::vector(dims.hidden), &hb).unwrap(),
        QuantizedTensor::from_i8(Shape::matrix(dims.output, dims.hidden), &ow).unwrap(),
        QuantizedTensor::from_i32(Shape::vector(dims.output), &ob).unwrap(),
    )
    .validate()
    .unwrap()
}

fn pipeline_for(
    maps: &Arc<Maps>,
    trace: Option<PathBuf>,
) -> InferencePipeline<Arc<InMemoryMapStore>, Arc<InMemoryMapStore>, SimulatedSurface> {
    let surface = SimulatedSurface {
        maps: Arc::clone(maps),
        trace: trace.clone(),
    };
    let mut p = InferencePipeline::new(
        Arc::clone(&maps.input),
        Arc::clone(&maps.output),
        surface,
        maps.dims,
    )
    .with_settle(SettlePolicy::Immediate);
    if let Some(path) = trace {
        p = p.with_verifier(TraceVerifier::new(path), Duration::from_secs(1));
    }
    p
}

// ── End-to-end ─────────────────────────────────────────────────

#[test]
fn test_exported_weights_drive_prediction() {
    let dims = ModelDims::default();
    let dir = temp_dir("exported");
    let prefix = format!("{}/mnist_", dir.display());
    ArtifactExporter::new(prefix.clone())
        .with_manifest(true)
        .export(&winner_set(dims, 7))
        .unwrap();

    let maps = Arc::new(Maps::new(dims));
    let loader = WeightLoader::from_prefix(&prefix, dims).unwrap();
    assert!(loader.is_file_backed());
    loader.upload(|role| Arc::clone(&maps.weights[&role])).unwrap();

    let trace = dir.join("trace_pipe");
    let _ = std::fs::remove_file(&trace);
    let out = pipeline_for(&maps, Some(trace)).run_samples(&[10; 784]).unwrap();

    assert_eq!(out.label, 7);
    assert_eq!(out.trace_detected, Some(true));
    // hidden = 784 × 10 = 7840 per unit; winner = 32 × 3 × 7840.
    assert_eq!(out.logits.logits()[7], 32 * 3 * 7840);
    assert_eq!(out.logits.logits()[0], 32 * 7840);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_synthetic_weights_tie_to_class_zero() {
    let dims = ModelDims::default();
    let maps = Arc::new(Maps::new(dims));
    let loader = WeightLoader::from_prefix("/nonexistent/kinfer/", dims).unwrap();
    assert!(!loader.is_file_backed());
    loader.upload(|role| Arc::clone(&maps.weights[&role])).unwrap();

    let out = pipeline_for(&maps, None).run_samples(&[1; 784]).unwrap();
    // Every class sees identical weights, so every logit is equal.
    assert!(out.logits.logits().windows(2).all(|w| w[0] == w[1]));
    assert_eq!(out.label, 0);
    assert_eq!(out.trace_detected, None);
}

#[test]
fn test_logits_match_reference_forward_pass() {
    let dims = ModelDims::new(16, 4, 3);
    let hw: Vec<i8> = (0..64).map(|i| ((i * 37) % 255) as u8 as i8).collect();
    let hb = vec![-500, 20, 0, 7];
    let ow: Vec<i8> = (0..12).map(|i| (i as i8) - 6).collect();
    let ob = vec![5, -5, 0];
    let set = ModelArtifactSet::new(
        dims,
        QuantizedTensor::from_i8(Shape::matrix(4, 16), &hw).unwrap(),
        QuantizedTensor::from_i32(Shape::vector(4), &hb).unwrap(),
        QuantizedTensor::from_i8(Shape::matrix(3, 4), &ow).unwrap(),
        QuantizedTensor::from_i32(Shape::vector(3), &ob).unwrap(),
    )
    .validate()
    .unwrap();

    let maps = Arc::new(Maps::new(dims));
    WeightLoader::from_set(set, WeightSource::Provided)
        .upload(|role| Arc::clone(&maps.weights[&role]))
        .unwrap();

    let input: Vec<u8> = (0..16).map(|i| (i * 16) as u8).collect();
    let out = pipeline_for(&maps, None).run_samples(&input).unwrap();
    let expected = forward(&dims, &input, &hw, &hb, &ow, &ob);
    assert_eq!(out.logits.logits(), expected.as_slice());
    assert_eq!(Some(out.label), map_ipc::argmax(&expected));
}

#[test]
fn test_image_input_end_to_end() {
    let dims = ModelDims::default();
    let maps = Arc::new(Maps::new(dims));
    WeightLoader::from_set(winner_set(dims, 3), WeightSource::Provided)
        .upload(|role| Arc::clone(&maps.weights[&role]))
        .unwrap();

    let dir = temp_dir("image");
    let path = dir.join("digit.png");
    image::GrayImage::from_pixel(64, 64, image::Luma([128]))
        .save(&path)
        .unwrap();

    let input = InputBuffer::from_image_path(&path, &dims).unwrap();
    let out = pipeline_for(&maps, None).run(&input).unwrap();
    assert_eq!(out.label, 3);
    assert_eq!(maps.input.peek(0).unwrap().len(), 784);
    let _ = std::fs::remove_dir_all(&dir);
}

// ── Protocol properties ────────────────────────────────────────

#[test]
fn test_single_update_and_lookup_at_key_zero() {
    let maps = Arc::new(Maps::new(ModelDims::default()));
    pipeline_for(&maps, None).run_samples(&[0; 784]).unwrap();

    assert_eq!(maps.input.ops(), vec![MapOp::Update { key: 0, len: 784 }]);
    // The surface's write, then the host's read.
    assert_eq!(
        maps.output.ops(),
        vec![MapOp::Update { key: 0, len: 40 }, MapOp::Lookup { key: 0 }]
    );
}

#[test]
fn test_bad_input_length_rejected_before_io() {
    let maps = Arc::new(Maps::new(ModelDims::default()));
    let p = pipeline_for(&maps, None);
    for len in [0, 783, 785, 28 * 29] {
        let err = p.run_samples(&vec![0; len]).unwrap_err();
        assert!(matches!(err, RuntimeError::InputShape { expected: 784, .. }));
    }
    assert!(maps.input.ops().is_empty());
    assert!(maps.output.ops().is_empty());
}

#[test]
fn test_poll_settle_sees_surface_write() {
    let dims = ModelDims::default();
    let maps = Arc::new(Maps::new(dims));
    WeightLoader::from_set(winner_set(dims, 5), WeightSource::Provided)
        .upload(|role| Arc::clone(&maps.weights[&role]))
        .unwrap();

    let out = pipeline_for(&maps, None)
        .with_settle(SettlePolicy::PollUntilChanged {
            interval: Duration::from_millis(1),
            max_attempts: 5,
        })
        .run_samples(&[2; 784])
        .unwrap();
    assert_eq!(out.settle, SettleOutcome::Changed { attempts: 1 });
    assert_eq!(out.label, 5);
}

#[test]
fn test_truncated_output_is_fatal() {
    struct TruncatingSurface(Arc<InMemoryMapStore>);

    impl ExecutionTrigger for TruncatingSurface {
        fn trigger(&self) -> Result<(), TraceError> {
            self.0.preload(0, vec![0; 39]);
            Ok(())
        }

        fn describe(&self) -> String {
            "truncating".into()
        }
    }

    let input = Arc::new(InMemoryMapStore::new("mnist_input", 784));
    let output = Arc::new(InMemoryMapStore::new("mnist_output", 40));
    let p = InferencePipeline::new(
        input,
        Arc::clone(&output),
        TruncatingSurface(Arc::clone(&output)),
        ModelDims::default(),
    )
    .with_settle(SettlePolicy::Immediate);

    let err = p.run_samples(&[0; 784]).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Map(MapError::UndersizedValue {
            expected_min: 40,
            actual: 39
        })
    ));
}

#[test]
fn test_silent_trace_does_not_fail_request() {
    let maps = Arc::new(Maps::new(ModelDims::default()));
    let dir = temp_dir("silent");
    let trace = dir.join("trace_pipe");
    std::fs::write(&trace, "sshd-1 [000] unrelated event\n").unwrap();

    let surface = SimulatedSurface {
        maps: Arc::clone(&maps),
        trace: None,
    };
    let out = InferencePipeline::new(
        Arc::clone(&maps.input),
        Arc::clone(&maps.output),
        surface,
        maps.dims,
    )
    .with_settle(SettlePolicy::Immediate)
    .with_verifier(TraceVerifier::new(&trace), Duration::from_millis(100))
    .run_samples(&[0; 784])
    .unwrap();

    assert_eq!(out.trace_detected, Some(false));
    assert_eq!(out.logits.len(), 10);
    let _ = std::fs::remove_dir_all(&dir);
}
