//! Preview execution: submit an assembled request and keep only the newest answer.

use crate::backend::ReportBackend;
use crate::error::AppError;
use crate::query::{PreviewRequest, PreviewResponse};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out preview generations and remembers the newest one that completed.
/// Previews are not cancelled; a response older than one already shown is dropped.
#[derive(Debug, Default)]
pub struct PreviewTracker {
    issued: AtomicU64,
    completed: AtomicU64,
}

impl PreviewTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// True when `generation` is newer than anything completed so far.
    pub fn complete(&self, generation: u64) -> bool {
        self.completed.fetch_max(generation, Ordering::SeqCst) < generation
    }

    pub fn latest_completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PreviewOutcome {
    Current {
        generation: u64,
        #[serde(flatten)]
        response: PreviewResponse,
    },
    /// A newer preview already completed; this response was discarded.
    Superseded { generation: u64 },
}

pub struct PreviewService;

impl PreviewService {
    pub async fn run(
        backend: &dyn ReportBackend,
        tracker: &PreviewTracker,
        request: &PreviewRequest,
    ) -> Result<PreviewOutcome, AppError> {
        let generation = tracker.begin();
        let result = backend.preview(request).await;
        if !tracker.complete(generation) {
            tracing::debug!(generation, "stale preview discarded");
            return Ok(PreviewOutcome::Superseded { generation });
        }
        let response = result?;
        if !response.success {
            let detail = response
                .message
                .unwrap_or_else(|| "backend reported an unsuccessful preview".into());
            tracing::warn!(generation, detail = %detail, "preview failed");
            return Err(AppError::Backend { status: 200, detail });
        }
        Ok(PreviewOutcome::Current {
            generation,
            response,
        })
    }
}
