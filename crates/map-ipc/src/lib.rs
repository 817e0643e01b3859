// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # map-ipc
//!
//! Host-side access to the fixed-size key/value maps shared with the
//! kernel-resident execution surface, and decoding of what comes back.
//!
//! - [`MapStore`]: the port: `update(key, bytes)` / `lookup(key) -> bytes`.
//! - [`BpftoolClient`] / [`BpftoolMapStore`]: adapter that shells out to
//!   `bpftool` once per operation, hex-encoding keys and values.
//! - [`InMemoryMapStore`]: adapter backed by a process-local table, used by
//!   tests and dry runs.
//! - [`decoder`]: parses `bpftool -j map lookup` output into an
//!   [`OutputVector`] and picks the arg-max class.
//!
//! # Single-Slot Protocol
//! Both the input and output maps are accessed at key 0 only. One request
//! may be in flight at a time; nothing here serializes concurrent callers.
//!
//! # Example
//! ```no_run
//! use map_ipc::{BpftoolMapStore, MapStore};
//!
//! let input = BpftoolMapStore::new("bpftool", "/sys/fs/bpf/mnist_input");
//! input.update(0, &[0u8; 784]).unwrap();
//! ```

mod bpftool;
pub mod decoder;
mod error;
mod memory;
mod store;
pub mod wire;

pub use bpftool::{BpftoolClient, BpftoolMapStore};
pub use decoder::{argmax, OutputVector};
pub use error::MapError;
pub use memory::{InMemoryMapStore, MapOp};
pub use store::MapStore;

/// The only key used on either map.
pub const SLOT_KEY: u32 = 0;
