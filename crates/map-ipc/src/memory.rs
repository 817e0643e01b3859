// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Process-local map store with array-map semantics.
//!
//! Mirrors a `BPF_MAP_TYPE_ARRAY`: every key below `max_entries` exists and
//! reads as zeros until written. Every operation is recorded so tests can
//! assert on ordering.

use crate::{MapError, MapStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// One recorded store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOp {
    Update { key: u32, len: usize },
    Lookup { key: u32 },
}

/// In-memory [`MapStore`] used by tests and dry runs.
#[derive(Debug)]
pub struct InMemoryMapStore {
    name: String,
    value_size: usize,
    max_entries: u32,
    entries: Mutex<HashMap<u32, Vec<u8>>>,
    ops: Mutex<Vec<MapOp>>,
}

impl InMemoryMapStore {
    /// A single-slot map, the shape every map in this system has.
    pub fn new(name: impl Into<String>, value_size: usize) -> Self {
        Self::with_capacity(name, value_size, 1)
    }

    pub fn with_capacity(name: impl Into<String>, value_size: usize, max_entries: u32) -> Self {
        Self {
            name: name.into(),
            value_size,
            max_entries,
            entries: Mutex::new(HashMap::new()),
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_size(&self) -> usize {
        self.value_size
    }

    /// Reads `key` without recording an operation. `None` if never written.
    pub fn peek(&self, key: u32) -> Option<Vec<u8>> {
        lock(&self.entries).get(&key).cloned()
    }

    /// Writes `key` without recording an operation or checking the size.
    ///
    /// Lets tests stage records a real map could never hold, such as a
    /// truncated output value.
    pub fn preload(&self, key: u32, value: Vec<u8>) {
        lock(&self.entries).insert(key, value);
    }

    /// All operations recorded so far, oldest first.
    pub fn ops(&self) -> Vec<MapOp> {
        lock(&self.ops).clone()
    }

    pub fn clear_ops(&self) {
        lock(&self.ops).clear();
    }

    fn check_key(&self, key: u32) -> Result<(), MapError> {
        if key >= self.max_entries {
            return Err(MapError::KeyNotFound {
                map: self.name.clone(),
                key,
            });
        }
        Ok(())
    }
}

impl MapStore for InMemoryMapStore {
    fn update(&self, key: u32, value: &[u8]) -> Result<(), MapError> {
        self.check_key(key)?;
        if value.len() != self.value_size {
            return Err(MapError::ValueSize {
                map: self.name.clone(),
                expected: self.value_size,
                actual: value.len(),
            });
        }
        lock(&self.entries).insert(key, value.to_vec());
        lock(&self.ops).push(MapOp::Update {
            key,
            len: value.len(),
        });
        Ok(())
    }

    fn lookup(&self, key: u32) -> Result<Vec<u8>, MapError> {
        self.check_key(key)?;
        lock(&self.ops).push(MapOp::Lookup { key });
        Ok(lock(&self.entries)
            .get(&key)
            .cloned()
            .unwrap_or_else(|| vec![0; self.value_size]))
    }

    fn describe(&self) -> String {
        format!("memory:{}", self.name)
    }
}

/// A panicked writer cannot leave a half-written value behind, so a
/// poisoned lock is still safe to read.
fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
