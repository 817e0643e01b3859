// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The map store port.

use crate::MapError;
use std::sync::Arc;

/// A fixed-slot key/value map with atomic per-key update and lookup.
///
/// The caller does not own the storage; implementations borrow an external
/// resource (a pinned kernel map, or a local table in tests). Values have a
/// fixed size per map.
///
/// Implementations include:
/// - [`crate::BpftoolMapStore`]: one `bpftool` child process per call.
/// - [`crate::InMemoryMapStore`]: process-local test double.
pub trait MapStore: Send + Sync {
    /// Writes `value` at `key`. Blocks until the write has completed.
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError>;

    /// Returns the raw bytes stored at `key`.
    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError>;

    /// Human-readable identity of the map, used in logs and errors.
    fn describe(&self) -> String;
}

impl<T: MapStore + ?Sized> MapStore for &T {
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError> {
        (**self).update(key, value)
    }

    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError> {
        (**self).lookup(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: MapStore + ?Sized> MapStore for Arc<T> {
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError> {
        (**self).update(key, value)
    }

    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError> {
        (**self).lookup(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: MapStore + ?Sized> MapStore for Box<T> {
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError> {
        (**self).update(key, value)
    }

    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError> {
        (**self).lookup(key)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
