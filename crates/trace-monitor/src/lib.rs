// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # trace-monitor
//!
//! Causes the kernel-resident execution surface to run, then watches the
//! kernel trace feed for evidence that it did.
//!
//! - [`ExecutionTrigger`] / [`SyscallTrigger`]: issue a cheap system call
//!   that the surface's `raw_syscalls:sys_enter` hook intercepts.
//! - [`CommandTrigger`]: run an external program instead.
//! - [`TraceVerifier`]: scans `trace_pipe` for the `BPF_INFER:` marker
//!   within a bounded window.
//!
//! # Advisory Only
//! The trace feed is shared by every tracer on the system and `trace_pipe`
//! reads are destructive, so a missing marker does not prove the surface
//! did not run, and a present marker may belong to an earlier request.
//! Callers log the outcome and continue.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use trace_monitor::{ExecutionTrigger, SyscallTrigger, TraceVerifier};
//!
//! SyscallTrigger.trigger().unwrap();
//! let seen = TraceVerifier::default().verify(Duration::from_secs(1));
//! println!("marker seen: {seen}");
//! ```

mod error;
mod trigger;
mod verifier;

pub use error::TraceError;
pub use trigger::{CommandTrigger, ExecutionTrigger, SyscallTrigger};
pub use verifier::{TraceVerifier, DEFAULT_TRACE_PIPE, TRACE_MARKER};
