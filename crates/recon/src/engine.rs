use chrono::Utc;
use parking_lot::Mutex;

use evalgrid_core::{EvalError, EvaluationStore, NameValidity, ReconcileOutcome};

use crate::matcher::{NameIndex, Resolution};

/// Runs reconciliation passes, one at a time.
///
/// Passes are serialized per `Reconciler`: a second caller waits for the
/// running pass and then sees only what that pass left Unknown.
#[derive(Debug, Default)]
pub struct Reconciler {
    strict_mappings: bool,
    running: Mutex<()>,
}

impl Reconciler {
    pub fn new(strict_mappings: bool) -> Self {
        Self { strict_mappings, running: Mutex::new(()) }
    }

    /// Resolve every Unknown evaluatee name against the registry and mappings.
    ///
    /// 1. exact registry match: Valid, name unchanged
    /// 2. alias match: name rewritten to the official name, Valid
    /// 3. otherwise: Invalid and flagged for correction
    ///
    /// Updates are committed per record and only while the record is still
    /// Unknown, so an interrupted pass resumes where it stopped and nothing is
    /// counted twice. A row whose update fails is skipped and counted in
    /// `failed`; an unreachable store aborts the pass.
    pub fn run<S: EvaluationStore + ?Sized>(&self, store: &S) -> Result<ReconcileOutcome, EvalError> {
        let _pass = self.running.lock();

        let candidates = store.unvalidated_evaluations()?;
        let mut outcome = ReconcileOutcome::default();
        if candidates.is_empty() {
            log::info!("reconcile: nothing to do");
            return Ok(outcome);
        }

        let index = NameIndex::build(&store.participants()?, &store.name_mappings()?, self.strict_mappings);
        log::info!(
            "reconcile: {} candidates against {} official names, {} aliases",
            candidates.len(),
            index.official_count(),
            index.alias_count()
        );

        for record in &candidates {
            let (validity, rewrite) = match index.resolve(&record.evaluatee_name) {
                Resolution::Exact => (NameValidity::Valid, None),
                Resolution::Mapped(official) => (NameValidity::Valid, Some(official)),
                Resolution::Unmatched => (NameValidity::Invalid, None),
            };

            match store.record_name_validity(record.id, validity, rewrite, Utc::now()) {
                Ok(true) => {
                    outcome.validated += 1;
                    if validity == NameValidity::Valid {
                        outcome.valid += 1;
                    } else {
                        outcome.invalid += 1;
                    }
                    if let Some(official) = rewrite {
                        log::debug!("evaluation {}: '{}' -> '{}'", record.id, record.evaluatee_name, official);
                    }
                }
                Ok(false) => {
                    log::debug!("evaluation {}: already decided by another pass", record.id);
                }
                Err(e) if e.is_unavailable() => {
                    log::warn!(
                        "reconcile aborted after {} of {} candidates: {e}",
                        outcome.validated,
                        candidates.len()
                    );
                    return Err(e.into());
                }
                Err(e) => {
                    log::warn!("evaluation {}: validation not saved: {e}", record.id);
                    outcome.failed += 1;
                }
            }
        }

        log::info!(
            "reconcile: {} validated ({} valid, {} flagged), {} failed",
            outcome.validated,
            outcome.valid,
            outcome.invalid,
            outcome.failed
        );
        Ok(outcome)
    }
}

/// One reconciliation pass with default options.
///
/// Each call gets its own `Reconciler`, so calls are not serialized against
/// each other. Overlapping calls still never double-count: a record is only
/// written while it is Unknown. Share one `Reconciler` to queue passes.
pub fn reconcile_names<S: EvaluationStore + ?Sized>(store: &S) -> Result<ReconcileOutcome, EvalError> {
    Reconciler::default().run(store)
}
