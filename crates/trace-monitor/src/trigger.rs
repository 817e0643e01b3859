// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Execution triggers.

use crate::TraceError;
use std::process::{Command, Stdio};

/// Causes the execution surface to run once.
///
/// There is no acknowledgment channel: `Ok(())` only means the triggering
/// event was issued.
pub trait ExecutionTrigger: Send + Sync {
    fn trigger(&self) -> Result<(), TraceError>;

    fn describe(&self) -> String;
}

/// Fires the surface by issuing a `getpid` system call.
///
/// The surface hooks `raw_syscalls:sys_enter`, so any syscall from any
/// process runs it; `getpid` is the cheapest one available from safe code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyscallTrigger;

impl ExecutionTrigger for SyscallTrigger {
    fn trigger(&self) -> Result<(), TraceError> {
        let pid = std::process::id();
        tracing::debug!("triggered execution surface via getpid (pid {pid})");
        Ok(())
    }

    fn describe(&self) -> String {
        "syscall:getpid".to_string()
    }
}

/// Fires the surface by running an external program to completion.
///
/// For surfaces hooked on events a bare syscall does not reach, such as
/// `sched_process_exec`. The program's output is discarded.
#[derive(Debug, Clone)]
pub struct CommandTrigger {
    program: String,
    args: Vec<String>,
}

impl CommandTrigger {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl ExecutionTrigger for CommandTrigger {
    fn trigger(&self) -> Result<(), TraceError> {
        let status = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| TraceError::TriggerFailed(format!("{}: {e}", self.program)))?;
        if !status.success() {
            return Err(TraceError::TriggerFailed(format!("{} exited with {status}", self.program)));
        }
        tracing::debug!("triggered execution surface via {}", self.describe());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("command:{}", self.program)
    }
}

impl<T: ExecutionTrigger + ?Sized> ExecutionTrigger for Box<T> {
    fn trigger(&self) -> Result<(), TraceError> {
        (**self).trigger()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl<T: ExecutionTrigger + ?Sized> ExecutionTrigger for std::sync::Arc<T> {
    fn trigger(&self) -> Result<(), TraceError> {
        (**self).trigger()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
