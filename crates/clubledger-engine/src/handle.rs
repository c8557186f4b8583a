//! Shared access to a ledger: one writer at a time, any number of readers.
//!
//! Submissions take the writer mutex, stage the operation on a clone of the
//! committed ledger and publish the result as a new `Arc`. Readers only hold
//! the read lock long enough to clone that `Arc`, so a slow reader never
//! blocks a commit and always sees one consistent state.

use std::{num::NonZeroUsize, sync::Arc, thread};

use clubledger_authority::ValidatedClaim;
use clubledger_types::{AttestationClaim, LedgerConfig, Result};
use parking_lot::{Mutex, RwLock};

use crate::{
    ledger::Ledger,
    operation::{Operation, Outcome},
};

pub struct LedgerHandle {
    writer: Mutex<()>,
    committed: RwLock<Arc<Ledger>>,
}

impl LedgerHandle {
    #[must_use]
    pub fn new(ledger: Ledger) -> Self {
        Self {
            writer: Mutex::new(()),
            committed: RwLock::new(Arc::new(ledger)),
        }
    }

    /// # Errors
    /// As [`Ledger::genesis`].
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Ledger::genesis(config).map(Self::new)
    }

    /// The latest committed state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Ledger> {
        Arc::clone(&self.committed.read())
    }

    /// Apply one operation and publish the result.
    ///
    /// # Errors
    /// Whatever the operation is rejected with; nothing is published then.
    pub fn submit(&self, op: Operation) -> Result<Outcome> {
        let _writer = self.writer.lock();
        let current = self.snapshot();
        let (next, outcome) = current.stage(op)?;
        *self.committed.write() = Arc::new(next);
        Ok(outcome)
    }

    /// Apply operations in order under one writer lock and publish once.
    ///
    /// Each operation still commits or fails on its own; readers never see
    /// the intermediate states.
    pub fn submit_batch(&self, ops: Vec<Operation>) -> Vec<Result<Outcome>> {
        let _writer = self.writer.lock();
        let mut next = Ledger::clone(&self.snapshot());
        let results = next.apply_all(ops);
        if results.iter().any(Result::is_ok) {
            *self.committed.write() = Arc::new(next);
        }
        results
    }

    /// Check candidate claims in parallel against the current snapshot.
    ///
    /// Nothing is recorded: two candidates sharing a nonce both pass here,
    /// and the second is rejected when submitted.
    pub fn prevalidate_claims(&self, claims: &[AttestationClaim]) -> Vec<Result<ValidatedClaim>> {
        let snapshot = self.snapshot();
        let workers = thread::available_parallelism().map_or(1, NonZeroUsize::get);
        let chunk = claims.len().div_ceil(workers).max(1);

        thread::scope(|scope| {
            let handles: Vec<_> = claims
                .chunks(chunk)
                .map(|part| {
                    let ledger = &snapshot;
                    scope.spawn(move || {
                        part.iter()
                            .map(|c| ledger.check_claim(c))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(results) => results,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        })
    }
}

impl std::fmt::Debug for LedgerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("LedgerHandle")
            .field("epoch", &snapshot.epoch())
            .field("events", &snapshot.events().len())
            .finish_non_exhaustive()
    }
}
