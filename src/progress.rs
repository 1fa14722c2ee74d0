// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 Sphragis Contributors

//! Progress, console and cancellation plumbing for long-running jobs

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Result, SphragisError};

/// Cooperative cancellation flag shared between a job and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; the job stops at its next poll point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type ProgressSink = Arc<dyn Fn(f32) + Send + Sync>;
type LogSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Channels a job reports through: a progress fraction sink, an append-only
/// console line sink and a cancellation token. All optional; a silent
/// reporter is valid. Sinks are invoked synchronously from the job's I/O
/// context and must not panic.
#[derive(Clone, Default)]
pub struct Reporter {
    progress: Option<ProgressSink>,
    log: Option<LogSink>,
    cancel: CancelToken,
}

impl Reporter {
    /// Reporter that drops everything; useful for tests and quiet runs.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn with_progress<F>(mut self, sink: F) -> Self
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(sink));
        self
    }

    pub fn with_log<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.log = Some(Arc::new(sink));
        self
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Emit a completed/total fraction in [0, 1].
    pub fn progress(&self, fraction: f32) {
        if let Some(sink) = &self.progress {
            sink(fraction);
        }
    }

    /// Emit a user-facing console line. Ordering is meaningful.
    pub fn log(&self, line: &str) {
        tracing::debug!("{}", line);
        if let Some(sink) = &self.log {
            sink(line);
        }
    }

    /// Handle on the reporter's cancellation flag, for callers that wire
    /// up cancellation after building the reporter.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Poll point between stages.
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(SphragisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Converts completed steps over a fixed denominator into progress
/// fractions. The final step lands on exactly 1.0.
pub(crate) struct StepTracker<'a> {
    completed: u64,
    total: u64,
    reporter: &'a Reporter,
}

impl<'a> StepTracker<'a> {
    pub(crate) fn new(total: u64, reporter: &'a Reporter) -> Self {
        Self {
            completed: 0,
            total,
            reporter,
        }
    }

    pub(crate) fn step(&mut self) {
        if self.total == 0 {
            return;
        }
        self.completed += 1;
        self.reporter.progress(self.completed as f32 / self.total as f32);
    }
}
