// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The single-request inference pipeline.
//!
//! ```text
//! InputBuffer
//!     │  input.update(key, 784 bytes)
//!     ▼
//! trigger()            ── surface runs on the next intercepted syscall
//!     │  verify(timeout)   (advisory, logged only)
//!     ▼
//! settle wait          ── advisory, no ordering guarantee
//!     │  output.lookup(key)
//!     ▼
//! OutputVector ── argmax ──▶ label
//! ```

use crate::{
    InferenceConfig, InferenceMetrics, InputBuffer, RuntimeError, SettleOutcome, SettlePolicy,
    Stage,
};
use map_ipc::{BpftoolMapStore, MapStore, OutputVector, SLOT_KEY};
use model_artifacts::ModelDims;
use std::time::{Duration, Instant};
use trace_monitor::{ExecutionTrigger, TraceVerifier};

/// The result of a single inference request.
#[derive(Debug, Clone)]
pub struct InferenceOutput {
    /// Raw logits read back from the output map.
    pub logits: OutputVector,
    /// Index of the highest logit.
    pub label: usize,
    /// Whether the trace marker was seen; `None` if verification is disabled.
    pub trace_detected: Option<bool>,
    /// What the settle wait observed.
    pub settle: SettleOutcome,
    pub metrics: InferenceMetrics,
}

/// Pipeline wired to pinned maps through `bpftool`.
pub type BpftoolPipeline =
    InferencePipeline<BpftoolMapStore, BpftoolMapStore, Box<dyn ExecutionTrigger>>;

/// Drives one update → trigger → verify → settle → lookup sequence.
///
/// # Single Flight
/// Both maps are accessed at [`SLOT_KEY`], so only one request may be in
/// flight against a given pair of maps. `run` takes `&self` but performs no
/// locking; concurrent callers, in this process or another, must serialize
/// whole requests themselves or they will read each other's results.
///
/// # Example
/// ```no_run
/// use runtime::{InferenceConfig, InferencePipeline, InputBuffer};
/// use std::path::Path;
///
/// # fn example() -> Result<(), runtime::RuntimeError> {
/// let config = InferenceConfig::default();
/// let pipeline = InferencePipeline::from_config(&config);
/// let input = InputBuffer::from_image_path(Path::new("digit.png"), &config.dims)?;
/// let out = pipeline.run(&input)?;
/// println!("predicted {} from {}", out.label, out.logits);
/// # Ok(())
/// # }
/// ```
pub struct InferencePipeline<I: MapStore, O: MapStore, T: ExecutionTrigger> {
    input: I,
    output: O,
    trigger: T,
    verifier: Option<TraceVerifier>,
    trace_timeout: Duration,
    settle: SettlePolicy,
    dims: ModelDims,
}

impl BpftoolPipeline {
    /// Builds a pipeline from configuration.
    pub fn from_config(config: &InferenceConfig) -> Self {
        let mut pipeline = InferencePipeline::new(
            config.input_store(),
            config.output_store(),
            config.trigger(),
            config.dims,
        )
        .with_settle(config.settle_policy());
        if config.verify_trace {
            pipeline = pipeline.with_verifier(
                TraceVerifier::new(&config.trace_pipe),
                config.trace_timeout(),
            );
        }
        pipeline
    }
}

impl<I: MapStore, O: MapStore, T: ExecutionTrigger> InferencePipeline<I, O, T> {
    /// Creates a pipeline with no trace verification and the default settle
    /// delay.
    pub fn new(input: I, output: O, trigger: T, dims: ModelDims) -> Self {
        Self {
            input,
            output,
            trigger,
            verifier: None,
            trace_timeout: Duration::from_secs(1),
            settle: SettlePolicy::default(),
            dims,
        }
    }

    /// Scans the trace feed for up to `timeout` after each trigger.
    pub fn with_verifier(mut self, verifier: TraceVerifier, timeout: Duration) -> Self {
        self.verifier = Some(verifier);
        self.trace_timeout = timeout;
        self
    }

    pub fn with_settle(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    pub fn dims(&self) -> &ModelDims {
        &self.dims
    }

    pub fn settle_policy(&self) -> &SettlePolicy {
        &self.settle
    }

    /// Classifies raw samples. Any length other than `dims.input` fails
    /// with [`RuntimeError::InputShape`] before a map is touched.
    pub fn run_samples(&self, samples: &[u8]) -> Result<InferenceOutput, RuntimeError> {
        let input = InputBuffer::from_samples(samples.to_vec(), &self.dims)?;
        self.run(&input)
    }

    /// Runs one request.
    ///
    /// # Errors
    /// Fails on the first map, trigger or decode error; nothing is retried.
    /// A missing trace marker is logged and does not fail the request.
    pub fn run(&self, input: &InputBuffer) -> Result<InferenceOutput, RuntimeError> {
        if input.len() != self.dims.input {
            return Err(RuntimeError::InputShape {
                expected: self.dims.input,
                actual: input.len(),
            });
        }

        let started = Instant::now();
        let mut metrics = InferenceMetrics::new();

        let baseline = if self.settle.needs_baseline() {
            Some(self.output.lookup(SLOT_KEY)?)
        } else {
            None
        };

        metrics.time(Stage::Update, || {
            self.input.update(SLOT_KEY, input.as_bytes())
        })?;
        tracing::info!(
            "wrote {} bytes to {} at key {}",
            input.len(),
            self.input.describe(),
            SLOT_KEY
        );

        metrics.time(Stage::Trigger, || self.trigger.trigger())?;

        let trace_detected = self.verifier.as_ref().map(|v| {
            metrics.time(Stage::Verify, || v.verify(self.trace_timeout))
        });

        let settle = metrics.time(Stage::Settle, || {
            self.settle.wait(&self.output, SLOT_KEY, baseline.as_deref())
        })?;

        let raw = metrics.time(Stage::Lookup, || self.output.lookup(SLOT_KEY))?;
        let logits = OutputVector::from_value_bytes(&raw, self.dims.output)?;
        let label = logits.argmax();

        metrics.finalise(started.elapsed());
        tracing::info!("output {logits} -> label {label}");
        tracing::debug!("{}", metrics.summary());

        Ok(InferenceOutput {
            logits,
            label,
            trace_detected,
            settle,
            metrics,
        })
    }
}

impl<I: MapStore, O: MapStore, T: ExecutionTrigger> std::fmt::Debug for InferencePipeline<I, O, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferencePipeline")
            .field("input", &self.input.describe())
            .field("output", &self.output.describe())
            .field("trigger", &self.trigger.describe())
            .field("verifier", &self.verifier)
            .field("settle", &self.settle)
            .field("dims", &self.dims)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_ipc::{InMemoryMapStore, MapError, MapOp};
    use trace_monitor::{CommandTrigger, TraceError};

    struct NoopTrigger;

    impl ExecutionTrigger for NoopTrigger {
        fn trigger(&self) -> Result<(), TraceError> {
            Ok(())
        }

        fn describe(&self) -> String {
            "noop".into()
        }
    }

    fn logits_bytes(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn pipeline<'a>(
        input: &'a InMemoryMapStore,
        output: &'a InMemoryMapStore,
    ) -> InferencePipeline<&'a InMemoryMapStore, &'a InMemoryMapStore, NoopTrigger> {
        InferencePipeline::new(input, output, NoopTrigger, ModelDims::default())
            .with_settle(SettlePolicy::Immediate)
    }

    #[test]
    fn test_update_once_at_key_zero() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        output.preload(0, logits_bytes(&[3, -1, 7, 2, 0, 0, 0, 0, 0, 0]));

        let out = pipeline(&input, &output).run_samples(&[1; 784]).unwrap();
        assert_eq!(out.label, 2);
        assert_eq!(out.trace_detected, None);
        assert_eq!(input.ops(), vec![MapOp::Update { key: 0, len: 784 }]);
        assert_eq!(output.ops(), vec![MapOp::Lookup { key: 0 }]);
    }

    #[test]
    fn test_wrong_length_touches_no_map() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        let err = pipeline(&input, &output).run_samples(&[0; 100]).unwrap_err();
        assert!(matches!(err, RuntimeError::InputShape { expected: 784, actual: 100 }));
        assert!(input.ops().is_empty());
        assert!(output.ops().is_empty());
    }

    #[test]
    fn test_undersized_output_is_fatal() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        output.preload(0, vec![0; 39]);
        let err = pipeline(&input, &output).run_samples(&[0; 784]).unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Map(MapError::UndersizedValue { expected_min: 40, actual: 39 })
        ));
    }

    #[test]
    fn test_missing_trace_is_not_fatal() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        let out = pipeline(&input, &output)
            .with_verifier(
                TraceVerifier::new("/nonexistent/trace_pipe"),
                Duration::from_millis(10),
            )
            .run_samples(&[0; 784])
            .unwrap();
        assert_eq!(out.trace_detected, Some(false));
        assert_eq!(out.label, 0);
        assert!(out.metrics.stage(Stage::Verify).is_some());
    }

    #[test]
    fn test_failing_trigger_is_fatal() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        let trigger = CommandTrigger::new("/nonexistent/kinfer-trigger");
        let p = InferencePipeline::new(&input, &output, trigger, ModelDims::default());
        assert!(matches!(
            p.run_samples(&[0; 784]),
            Err(RuntimeError::Trigger(TraceError::TriggerFailed(_)))
        ));
        assert!(output.ops().is_empty());
    }

    #[test]
    fn test_poll_reads_baseline_first() {
        let input = InMemoryMapStore::new("mnist_input", 784);
        let output = InMemoryMapStore::new("mnist_output", 40);
        let p = pipeline(&input, &output).with_settle(SettlePolicy::PollUntilChanged {
            interval: Duration::from_millis(1),
            max_attempts: 2,
        });
        let out = p.run_samples(&[0; 784]).unwrap();
        assert_eq!(out.settle, SettleOutcome::Unchanged { attempts: 2 });
        // baseline + 2 polls + final lookup
        assert_eq!(output.ops().len(), 4);
    }

    #[test]
    fn test_from_config_wiring() {
        let config = InferenceConfig {
            verify_trace: false,
            ..Default::default()
        };
        let p = InferencePipeline::from_config(&config);
        let dbg = format!("{p:?}");
        assert!(dbg.contains("/sys/fs/bpf/mnist_input"));
        assert!(dbg.contains("verifier: None"));
        assert!(dbg.contains("syscall:getpid"));
        assert_eq!(p.settle_policy(), &SettlePolicy::Fixed(Duration::from_millis(100)));
    }
}
