//! Conserved reward-token ledger.
//!
//! Every account has `available` and `locked` balances; the treasury is a
//! separate pool. All mutations validate first and then apply, so a
//! returned error always means nothing changed.
//!
//! ```text
//! Σ available + Σ locked + treasury == total_supply == minted − burned
//! ```

use std::collections::BTreeMap;

use clubledger_authority::ValidatedClaim;
use clubledger_types::{
    AccountId, Amount, BalanceEntry, EpochId, GovernanceGrant, GrantAction, GrantScope,
    GrantTarget, LedgerError, Result, SupplySnapshot,
};

use crate::supply_conservation::SupplyConservation;

/// What justifies a mint.
#[derive(Debug, Clone, Copy)]
pub enum MintCause<'a> {
    /// A verified attestation claim. Its beneficiary and amount must match.
    Claim(&'a ValidatedClaim),
    /// A governance grant for `RewardLedger/MintReward/Account(account)`.
    Governance(&'a GovernanceGrant),
}

fn positive(amount: Amount) -> Result<()> {
    if amount == 0 {
        return Err(LedgerError::InvalidAmount {
            reason: "amount must be positive".into(),
        });
    }
    Ok(())
}

/// Balance ledger for the reward token.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    balances: BTreeMap<AccountId, BalanceEntry>,
    treasury: Amount,
    total_supply: Amount,
    supply_cap: Option<Amount>,
    conservation: SupplyConservation,
}

impl RewardLedger {
    #[must_use]
    pub fn new(supply_cap: Option<Amount>) -> Self {
        Self {
            supply_cap,
            ..Self::default()
        }
    }

    // ── Supply changes ────────────────────────────────────────────────

    fn supply_after_mint(&self, amount: Amount) -> Result<Amount> {
        let requested = self
            .total_supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        if let Some(cap) = self.supply_cap {
            if requested > cap {
                return Err(LedgerError::SupplyCapExceeded { cap, requested });
            }
        }
        Ok(requested)
    }

    /// Mint `amount` to `account`.
    ///
    /// # Errors
    /// `InvalidAmount`, `InvalidInput` if a claim cause disagrees with the
    /// arguments, `Unauthorized` for a mismatched grant, `SupplyCapExceeded`
    /// or `Overflow`.
    pub fn mint(
        &mut self,
        account: AccountId,
        amount: Amount,
        cause: MintCause<'_>,
        now: EpochId,
    ) -> Result<()> {
        positive(amount)?;
        match cause {
            MintCause::Claim(claim) => {
                if claim.beneficiary() != account || claim.amount() != amount {
                    return Err(LedgerError::invalid_input(
                        "mint does not match the validated claim",
                    ));
                }
            }
            MintCause::Governance(grant) => grant.check(
                GrantScope::RewardLedger,
                GrantAction::MintReward,
                &GrantTarget::Account(account),
                now,
            )?,
        }
        let new_supply = self.supply_after_mint(amount)?;

        self.balances.entry(account).or_default().available += amount;
        self.total_supply = new_supply;
        self.conservation.record_mint(amount);
        tracing::info!(account = %account, amount = %amount, supply = %new_supply, "Minted");
        Ok(())
    }

    /// Credit a genesis allocation.
    ///
    /// # Errors
    /// `SupplyCapExceeded` or `Overflow`.
    pub fn genesis_allocate(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let new_supply = self.supply_after_mint(amount)?;
        self.balances.entry(account).or_default().available += amount;
        self.total_supply = new_supply;
        self.conservation.record_mint(amount);
        Ok(())
    }

    /// Seed the treasury at genesis.
    ///
    /// # Errors
    /// `SupplyCapExceeded` or `Overflow`.
    pub fn genesis_treasury(&mut self, amount: Amount) -> Result<()> {
        let new_supply = self.supply_after_mint(amount)?;
        self.treasury += amount;
        self.total_supply = new_supply;
        self.conservation.record_mint(amount);
        Ok(())
    }

    /// Destroy spendable tokens.
    ///
    /// # Errors
    /// `InvalidAmount` or `InsufficientBalance`.
    pub fn burn(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        positive(amount)?;
        self.debit_available(account, amount)?;
        self.total_supply -= amount;
        self.conservation.record_burn(amount);
        tracing::info!(account = %account, amount = %amount, "Burned");
        Ok(())
    }

    /// Change or clear the supply ceiling.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if the new cap
    /// is below the current supply.
    pub fn set_supply_cap(
        &mut self,
        cap: Option<Amount>,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::RewardLedger,
            GrantAction::SetSupplyCap,
            &GrantTarget::Ledger,
            now,
        )?;
        if let Some(c) = cap {
            if c < self.total_supply {
                return Err(LedgerError::invalid_input(format!(
                    "supply cap {c} below current supply {}",
                    self.total_supply
                )));
            }
        }
        self.supply_cap = cap;
        tracing::info!(cap = ?cap, "Supply cap updated");
        Ok(())
    }

    // ── Movements ─────────────────────────────────────────────────────

    fn debit_available(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let available = self.available(&account);
        if available < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if let Some(entry) = self.balances.get_mut(&account) {
            entry.available -= amount;
        }
        Ok(())
    }

    /// Move spendable tokens between accounts.
    ///
    /// # Errors
    /// `InvalidAmount`, `InvalidInput` for a self-transfer, or `InsufficientBalance`.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<()> {
        positive(amount)?;
        if from == to {
            return Err(LedgerError::invalid_input("transfer to self"));
        }
        self.debit_available(from, amount)?;
        self.balances.entry(to).or_default().available += amount;
        tracing::info!(from = %from, to = %to, amount = %amount, "Transferred");
        Ok(())
    }

    /// Move spendable tokens into the treasury.
    ///
    /// # Errors
    /// `InvalidAmount` or `InsufficientBalance`.
    pub fn fund_treasury(&mut self, from: AccountId, amount: Amount) -> Result<()> {
        positive(amount)?;
        self.debit_available(from, amount)?;
        self.treasury += amount;
        tracing::info!(from = %from, amount = %amount, treasury = %self.treasury, "Treasury funded");
        Ok(())
    }

    /// Pay out of the treasury. Used by withdrawal execution.
    ///
    /// # Errors
    /// `InsufficientBalance` if the treasury holds less than `amount`.
    pub fn pay_from_treasury(&mut self, to: AccountId, amount: Amount) -> Result<()> {
        if self.treasury < amount {
            return Err(LedgerError::InsufficientBalance {
                needed: amount,
                available: self.treasury,
            });
        }
        self.treasury -= amount;
        self.balances.entry(to).or_default().available += amount;
        Ok(())
    }

    /// Move spendable tokens into the account's locked balance.
    ///
    /// # Errors
    /// `InvalidAmount` or `InsufficientBalance`.
    pub fn lock(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        positive(amount)?;
        self.debit_available(account, amount)?;
        self.balances.entry(account).or_default().locked += amount;
        Ok(())
    }

    fn debit_locked(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        let entry = self.balances.get_mut(&account);
        match entry {
            Some(e) if e.locked >= amount => {
                e.locked -= amount;
                Ok(())
            }
            _ => Err(LedgerError::ConservationViolation {
                reason: format!("{account} has less than {amount} locked"),
            }),
        }
    }

    /// Return locked tokens to the account's spendable balance.
    ///
    /// # Errors
    /// `ConservationViolation` if less than `amount` is locked.
    pub fn unlock(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        self.debit_locked(account, amount)?;
        self.balances.entry(account).or_default().available += amount;
        Ok(())
    }

    /// Destroy locked tokens (a consumed reservation).
    ///
    /// # Errors
    /// `ConservationViolation` if less than `amount` is locked.
    pub fn burn_locked(&mut self, account: AccountId, amount: Amount) -> Result<()> {
        self.debit_locked(account, amount)?;
        self.total_supply -= amount;
        self.conservation.record_burn(amount);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[must_use]
    pub fn balance(&self, account: &AccountId) -> BalanceEntry {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Spendable balance.
    #[must_use]
    pub fn available(&self, account: &AccountId) -> Amount {
        self.balances.get(account).map_or(0, |e| e.available)
    }

    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, &BalanceEntry)> {
        self.balances.iter()
    }

    #[must_use]
    pub fn treasury(&self) -> Amount {
        self.treasury
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    #[must_use]
    pub fn supply_cap(&self) -> Option<Amount> {
        self.supply_cap
    }

    /// Sum of every account's locked balance.
    #[must_use]
    pub fn total_locked(&self) -> Amount {
        self.balances
            .values()
            .fold(0, |acc: Amount, e| acc.saturating_add(e.locked))
    }

    #[must_use]
    pub fn snapshot(&self) -> SupplySnapshot {
        let (circulating, locked) = self.balances.values().fold((0u128, 0u128), |(a, l), e| {
            (a.saturating_add(e.available), l.saturating_add(e.locked))
        });
        SupplySnapshot {
            total_supply: self.total_supply,
            circulating,
            locked,
            treasury: self.treasury,
            minted: self.conservation.total_minted(),
            burned: self.conservation.total_burned(),
        }
    }

    /// Check both conservation identities.
    ///
    /// # Errors
    /// `ConservationViolation` describing the mismatch.
    pub fn verify_conservation(&self) -> Result<()> {
        let snap = self.snapshot();
        if !snap.is_conserved() {
            tracing::error!(
                supply = %snap.total_supply,
                circulating = %snap.circulating,
                locked = %snap.locked,
                treasury = %snap.treasury,
                "Balance conservation violated"
            );
            return Err(LedgerError::ConservationViolation {
                reason: format!("{snap:?}"),
            });
        }
        self.conservation.verify(self.total_supply)
    }
}
