use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::download::progress::DownloadProgress;

/// Outcome of one operation that ran to completion.
///
/// `success` mirrors the exit code (0 means success); `error_output` holds
/// every stderr line in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult<T> {
    pub success: bool,
    pub error_output: Vec<String>,
    pub data: T,
}

impl<T> RunResult<T> {
    pub fn new(success: bool, error_output: Vec<String>, data: T) -> Self {
        Self {
            success,
            error_output,
            data,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RunResult<U> {
        RunResult {
            success: self.success,
            error_output: self.error_output,
            data: f(self.data),
        }
    }
}

/// Per-call wiring: cancellation plus optional progress and raw-output sinks.
///
/// Raw lines go to `output` unchanged, stdout and the orchestrator's own
/// status lines alike.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub cancel: CancellationToken,
    pub progress: Option<mpsc::UnboundedSender<DownloadProgress>>,
    pub output: Option<mpsc::UnboundedSender<String>>,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, tx: mpsc::UnboundedSender<DownloadProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn with_output(mut self, tx: mpsc::UnboundedSender<String>) -> Self {
        self.output = Some(tx);
        self
    }

    pub(crate) fn report(&self, progress: DownloadProgress) {
        if let Some(tx) = &self.progress {
            let _ = tx.send(progress);
        }
    }

    pub(crate) fn forward(&self, line: impl Into<String>) {
        if let Some(tx) = &self.output {
            let _ = tx.send(line.into());
        }
    }
}
