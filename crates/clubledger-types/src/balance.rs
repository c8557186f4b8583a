//! Balance tracking types for the reward token.
//!
//! Every account has an `available` balance (spendable for transfers, burns
//! and new reservations) and a `locked` balance (held by active reservations
//! until they are released, refunded or expire).

use serde::{Deserialize, Serialize};

/// Token amount. Unsigned, so no balance can ever go negative.
pub type Amount = u128;

/// A single balance entry for one account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct BalanceEntry {
    /// Spendable balance.
    pub available: Amount,
    /// Held by active reservations.
    pub locked: Amount,
}

impl BalanceEntry {
    /// Total balance (available + locked), saturating.
    #[must_use]
    pub fn total(&self) -> Amount {
        self.available.saturating_add(self.locked)
    }

    /// Whether this entry has no balance at all.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.available == 0 && self.locked == 0
    }
}

/// Point-in-time view of where the token supply sits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SupplySnapshot {
    pub total_supply: Amount,
    /// Sum of every account's available balance.
    pub circulating: Amount,
    /// Sum of every account's locked balance.
    pub locked: Amount,
    pub treasury: Amount,
    /// Cumulative amount ever minted (genesis included).
    pub minted: Amount,
    /// Cumulative amount ever burned.
    pub burned: Amount,
}

impl SupplySnapshot {
    /// `circulating + locked + treasury == total_supply == minted - burned`.
    #[must_use]
    pub fn is_conserved(&self) -> bool {
        let held = self
            .circulating
            .checked_add(self.locked)
            .and_then(|v| v.checked_add(self.treasury));
        held == Some(self.total_supply) && self.minted.checked_sub(self.burned) == Some(self.total_supply)
    }
}
