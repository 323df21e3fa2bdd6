use serde::Serialize;

/// Default cap on retained error descriptions per import.
pub const DEFAULT_MAX_ERROR_SAMPLES: usize = 10;

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Result of a batch import. Row-level failures are counted, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub total_rows: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// First `max_error_samples` error descriptions.
    pub errors: Vec<String>,
    #[serde(skip)]
    max_error_samples: usize,
}

impl Default for ImportSummary {
    fn default() -> Self {
        Self::with_sample_cap(DEFAULT_MAX_ERROR_SAMPLES)
    }
}

impl ImportSummary {
    pub fn with_sample_cap(max_error_samples: usize) -> Self {
        Self {
            total_rows: 0,
            success_count: 0,
            error_count: 0,
            errors: Vec::new(),
            max_error_samples,
        }
    }

    /// Count a failure; keep its description only while under the cap.
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error_count += 1;
        if self.errors.len() < self.max_error_samples {
            self.errors.push(message.into());
        }
    }

    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Completed with some row-level failures.
    pub fn is_partial(&self) -> bool {
        self.error_count > 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} row{}: {} imported, {} error{}",
            self.total_rows,
            if self.total_rows == 1 { "" } else { "s" },
            self.success_count,
            self.error_count,
            if self.error_count == 1 { "" } else { "s" },
        )
    }
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    /// Records transitioned out of the Unknown state by this pass.
    pub validated: usize,
    /// Of those, resolved to a registry name (exact or mapped).
    pub valid: usize,
    /// Of those, flagged for correction.
    pub invalid: usize,
    /// Candidates whose update failed and were left Unknown.
    pub failed: usize,
}

/// Per-respondent correction counters, computed from current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CorrectionStats {
    pub total: usize,
    pub needs_correction: usize,
    pub invalid_names: usize,
    pub valid_names: usize,
}

/// Operator-facing totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Overview {
    pub evaluations: usize,
    pub weeks: usize,
    pub participants: usize,
    pub mappings: usize,
    pub pending_reconciliation: usize,
    pub needing_correction: usize,
}
