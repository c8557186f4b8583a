//! Supply conservation invariant checker.
//!
//! Tracked independently of the balance map:
//! ```text
//! total_supply == Σ minted − Σ burned
//! ```
//!
//! The reward ledger additionally checks
//! `Σ available + Σ locked + treasury == total_supply`. If either identity
//! breaks, the operation that caused it is rolled back and reported as
//! `CL_ERR_800`.

use clubledger_types::{Amount, LedgerError, Result};

/// Running mint and burn totals since genesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyConservation {
    minted: Amount,
    burned: Amount,
}

impl SupplyConservation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mint(&mut self, amount: Amount) {
        self.minted = self.minted.saturating_add(amount);
    }

    pub fn record_burn(&mut self, amount: Amount) {
        self.burned = self.burned.saturating_add(amount);
    }

    /// Expected total supply: minted − burned.
    #[must_use]
    pub fn expected_supply(&self) -> Option<Amount> {
        self.minted.checked_sub(self.burned)
    }

    /// Verify `actual_supply` against the mint/burn log.
    ///
    /// # Errors
    /// [`LedgerError::ConservationViolation`] if they differ.
    pub fn verify(&self, actual_supply: Amount) -> Result<()> {
        if self.expected_supply() != Some(actual_supply) {
            tracing::error!(
                minted = %self.minted,
                burned = %self.burned,
                actual = %actual_supply,
                "Supply conservation violated"
            );
            return Err(LedgerError::ConservationViolation {
                reason: format!(
                    "actual supply {actual_supply} != minted {} - burned {}",
                    self.minted, self.burned
                ),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn total_minted(&self) -> Amount {
        self.minted
    }

    #[must_use]
    pub fn total_burned(&self) -> Amount {
        self.burned
    }
}
