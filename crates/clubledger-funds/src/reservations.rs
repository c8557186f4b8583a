//! Reservation manager: locks spendable funds against an external resource.
//!
//! The lock lives in the account's `locked` balance on the [`RewardLedger`].
//! Each reservation ends in exactly one terminal state:
//! - `Released`: a settler reported the resource consumed; the lock is burned.
//! - `Refunded`: a settler reported it unused; the lock returns to the account.
//! - `Expired`: nobody settled by `expires_at`; the sweep refunds the lock.

use std::collections::{BTreeMap, BTreeSet};

use clubledger_types::{
    AccountId, Amount, Disposition, EpochId, GovernanceGrant, GrantAction, GrantScope,
    GrantTarget, LedgerError, Reservation, ReservationConfig, ReservationId, ReservationStatus,
    ResourceType, Result,
};

use crate::rewards::RewardLedger;

/// Tracks reservations and the settlers allowed to close them.
#[derive(Debug, Clone)]
pub struct ReservationManager {
    reservations: BTreeMap<ReservationId, Reservation>,
    settlers: BTreeMap<ResourceType, BTreeSet<AccountId>>,
    max_duration: u64,
    next_id: u64,
}

impl ReservationManager {
    #[must_use]
    pub fn new(config: &ReservationConfig) -> Self {
        Self {
            reservations: BTreeMap::new(),
            settlers: BTreeMap::new(),
            max_duration: config.max_duration_epochs,
            next_id: 1,
        }
    }

    /// Lock `amount` of `account`'s spendable balance for `duration` epochs.
    ///
    /// # Errors
    /// `InvalidInput` for a duration outside `1..=max`, `InvalidAmount`,
    /// or `InsufficientBalance`.
    pub fn reserve(
        &mut self,
        rewards: &mut RewardLedger,
        account: AccountId,
        resource: ResourceType,
        amount: Amount,
        duration: u64,
        now: EpochId,
    ) -> Result<ReservationId> {
        if duration == 0 || duration > self.max_duration {
            return Err(LedgerError::invalid_input(format!(
                "reservation duration {duration} outside 1..={}",
                self.max_duration
            )));
        }
        rewards.lock(account, amount)?;

        let id = ReservationId(self.next_id);
        self.next_id += 1;
        let expires_at = now.after(duration);
        tracing::info!(
            reservation = %id,
            account = %account,
            resource = %resource,
            amount = %amount,
            expires_at = %expires_at,
            "Reservation created"
        );
        self.reservations.insert(
            id,
            Reservation {
                id,
                account,
                resource,
                amount,
                created_at: now,
                expires_at,
                status: ReservationStatus::Active,
                settled_at: None,
                settled_by: None,
            },
        );
        Ok(id)
    }

    /// Settlement callback for a reservation.
    ///
    /// Checks run in order: existence, settler authorization, status, expiry.
    ///
    /// # Errors
    /// `ReservationNotFound`, `Unauthorized`, `AlreadySettled` or
    /// `ReservationExpired`.
    pub fn release(
        &mut self,
        rewards: &mut RewardLedger,
        id: ReservationId,
        disposition: Disposition,
        settler: AccountId,
        now: EpochId,
    ) -> Result<ReservationStatus> {
        let reservation = self
            .reservations
            .get(&id)
            .ok_or(LedgerError::ReservationNotFound(id))?;
        if !self.is_settler(&reservation.resource, &settler) {
            tracing::warn!(
                reservation = %id,
                settler = %settler,
                resource = %reservation.resource,
                "Settlement by unauthorized settler rejected"
            );
            return Err(LedgerError::unauthorized(format!(
                "{settler} is not a settler for {}",
                reservation.resource
            )));
        }
        if !reservation.is_active() {
            return Err(LedgerError::AlreadySettled {
                id,
                status: reservation.status,
            });
        }
        if reservation.is_past_expiry(now) {
            return Err(LedgerError::ReservationExpired {
                id,
                expires_at: reservation.expires_at,
            });
        }

        let (account, amount) = (reservation.account, reservation.amount);
        match disposition {
            Disposition::Spend => rewards.burn_locked(account, amount)?,
            Disposition::Refund => rewards.unlock(account, amount)?,
        }
        let reservation = self
            .reservations
            .get_mut(&id)
            .ok_or(LedgerError::ReservationNotFound(id))?;
        reservation.mark_settled(disposition, settler, now)?;
        tracing::info!(
            reservation = %id,
            status = %reservation.status,
            amount = %amount,
            "Reservation settled"
        );
        Ok(reservation.status)
    }

    /// Expire every active reservation past its expiry and refund its lock.
    ///
    /// Returns the ids that moved to `Expired`. A second sweep at the same
    /// epoch finds nothing.
    ///
    /// # Errors
    /// `ConservationViolation` if a lock is missing from the reward ledger.
    pub fn sweep_expired(
        &mut self,
        rewards: &mut RewardLedger,
        now: EpochId,
    ) -> Result<Vec<ReservationId>> {
        let due: Vec<ReservationId> = self
            .reservations
            .values()
            .filter(|r| r.is_active() && r.is_past_expiry(now))
            .map(|r| r.id)
            .collect();

        for id in &due {
            if let Some(r) = self.reservations.get_mut(id) {
                rewards.unlock(r.account, r.amount)?;
                r.mark_expired(now)?;
                tracing::debug!(reservation = %id, amount = %r.amount, "Reservation expired");
            }
        }
        if !due.is_empty() {
            tracing::info!(count = due.len(), epoch = %now, "Expired reservations swept");
        }
        Ok(due)
    }

    // ── Settler authorization ─────────────────────────────────────────

    /// Allow `settler` to report dispositions for `resource`.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if already a settler.
    pub fn authorize_settler(
        &mut self,
        resource: ResourceType,
        settler: AccountId,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::ReservationManager,
            GrantAction::AuthorizeSettler,
            &GrantTarget::Resource(resource.clone()),
            now,
        )?;
        self.add_settler(resource, settler)
    }

    /// Genesis settler registration.
    ///
    /// # Errors
    /// `InvalidInput` if already a settler.
    pub fn add_settler(&mut self, resource: ResourceType, settler: AccountId) -> Result<()> {
        let set = self.settlers.entry(resource.clone()).or_default();
        if !set.insert(settler) {
            return Err(LedgerError::invalid_input(format!(
                "{settler} already settles {resource}"
            )));
        }
        tracing::info!(resource = %resource, settler = %settler, "Settler authorized");
        Ok(())
    }

    /// # Errors
    /// `Unauthorized` for a mismatched grant, `InvalidInput` if not a settler.
    pub fn revoke_settler(
        &mut self,
        resource: &ResourceType,
        settler: AccountId,
        grant: &GovernanceGrant,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::ReservationManager,
            GrantAction::RevokeSettler,
            &GrantTarget::Resource(resource.clone()),
            now,
        )?;
        let removed = self
            .settlers
            .get_mut(resource)
            .is_some_and(|set| set.remove(&settler));
        if !removed {
            return Err(LedgerError::invalid_input(format!(
                "{settler} does not settle {resource}"
            )));
        }
        tracing::info!(resource = %resource, settler = %settler, "Settler revoked");
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[must_use]
    pub fn is_settler(&self, resource: &ResourceType, account: &AccountId) -> bool {
        self.settlers
            .get(resource)
            .is_some_and(|set| set.contains(account))
    }

    #[must_use]
    pub fn get(&self, id: &ReservationId) -> Option<&Reservation> {
        self.reservations.get(id)
    }

    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    pub fn reservations_of(&self, account: AccountId) -> impl Iterator<Item = &Reservation> {
        self.reservations
            .values()
            .filter(move |r| r.account == account)
    }

    pub fn settlers(&self) -> impl Iterator<Item = (&ResourceType, &BTreeSet<AccountId>)> {
        self.settlers.iter()
    }

    /// Sum of amounts held by active reservations.
    #[must_use]
    pub fn active_locked_total(&self) -> Amount {
        self.reservations
            .values()
            .filter(|r| r.is_active())
            .fold(0, |acc: Amount, r| acc.saturating_add(r.amount))
    }

    #[must_use]
    pub fn max_duration(&self) -> u64 {
        self.max_duration
    }
}
