//! Replay protection for attestation claims.
//!
//! Each `(officer, epoch)` pair owns a bounded set of consumed nonces. Sets
//! for epochs outside the acceptance window are dropped on epoch advance;
//! claims for those epochs are already rejected by the epoch check, so the
//! dropped nonces can never be replayed.

use std::collections::{BTreeMap, BTreeSet};

use clubledger_types::{AccountId, EpochId, LedgerError, Result};

/// Tracks consumed nonces per `(officer, epoch)`.
#[derive(Debug, Clone, Default)]
pub struct NonceTracker {
    used: BTreeMap<(AccountId, EpochId), BTreeSet<u64>>,
    /// Maximum nonces per `(officer, epoch)` before further claims are refused.
    max_per_slot: usize,
}

impl NonceTracker {
    #[must_use]
    pub fn new(max_per_slot: usize) -> Self {
        Self {
            used: BTreeMap::new(),
            max_per_slot,
        }
    }

    /// Check that the nonce is fresh and the slot has room, without recording.
    ///
    /// # Errors
    /// `NonceReplay` if consumed, `EpochCapExceeded` if the slot is full.
    pub fn check(&self, officer: &AccountId, epoch: EpochId, nonce: u64) -> Result<()> {
        let Some(nonces) = self.used.get(&(*officer, epoch)) else {
            return Ok(());
        };
        if nonces.contains(&nonce) {
            return Err(LedgerError::NonceReplay {
                officer: *officer,
                epoch,
                nonce,
            });
        }
        if nonces.len() >= self.max_per_slot {
            return Err(LedgerError::EpochCapExceeded {
                reason: format!(
                    "officer {officer} exceeded nonce quota ({}) in {epoch}",
                    self.max_per_slot
                ),
            });
        }
        Ok(())
    }

    /// Check and record a nonce.
    ///
    /// # Errors
    /// Same as [`Self::check`]; nothing is recorded on error.
    pub fn check_and_record(&mut self, officer: &AccountId, epoch: EpochId, nonce: u64) -> Result<()> {
        self.check(officer, epoch, nonce)?;
        self.used.entry((*officer, epoch)).or_default().insert(nonce);
        Ok(())
    }

    #[must_use]
    pub fn is_used(&self, officer: &AccountId, epoch: EpochId, nonce: u64) -> bool {
        self.used
            .get(&(*officer, epoch))
            .is_some_and(|n| n.contains(&nonce))
    }

    /// Drop every slot for epochs before `oldest_live`.
    pub fn prune_before(&mut self, oldest_live: EpochId) {
        self.used.retain(|(_, epoch), _| *epoch >= oldest_live);
    }

    /// Total nonces tracked across all slots.
    #[must_use]
    pub fn total_nonces(&self) -> usize {
        self.used.values().map(BTreeSet::len).sum()
    }
}
