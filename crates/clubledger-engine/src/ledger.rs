//! The ledger store.
//!
//! [`Ledger`] exclusively owns every component. Mutation goes through
//! [`Ledger::apply`] (see `operation.rs`); everything here is either a
//! read-only view or a step `apply` composes.

use clubledger_authority::{
    AttestationVerifier, BadgeLedger, GrantGuard, MembershipRegistry, ValidatedClaim,
};
use clubledger_funds::{ReservationManager, RewardLedger, TreasuryController};
use clubledger_types::{
    AccountId, Amount, AttestationClaim, Badge, BadgeId, BalanceEntry, Club, ClubId, EpochId,
    EventLog, LedgerError, LedgerEvent, Membership, Reservation, ReservationId, ReservationStatus,
    Result, SupplySnapshot, WithdrawalId, WithdrawalRequest, constants,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Complete ledger state.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub(crate) registry: MembershipRegistry,
    pub(crate) verifier: AttestationVerifier,
    pub(crate) badges: BadgeLedger,
    pub(crate) rewards: RewardLedger,
    pub(crate) reservations: ReservationManager,
    pub(crate) treasury: TreasuryController,
    pub(crate) grants: GrantGuard,
    pub(crate) epoch: EpochId,
    pub(crate) events: EventLog,
}

/// What an expiry sweep closed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub epoch: EpochId,
    pub reservations: Vec<ReservationId>,
    pub withdrawals: Vec<WithdrawalId>,
}

impl Ledger {
    pub(crate) fn emit(&mut self, event: LedgerEvent) {
        self.events.push(self.epoch, event);
    }

    // ── Epoch ─────────────────────────────────────────────────────────

    /// Move the epoch counter forward, prune claim bookkeeping that fell out
    /// of the acceptance window, and sweep whatever expired.
    ///
    /// # Errors
    /// `EpochRegression` unless `to` is strictly after the current epoch.
    pub(crate) fn advance_epoch(&mut self, to: EpochId) -> Result<SweepReport> {
        if to <= self.epoch {
            return Err(LedgerError::EpochRegression {
                current: self.epoch,
                requested: to,
            });
        }
        let from = self.epoch;
        self.epoch = to;
        self.verifier.prune(to);
        self.emit(LedgerEvent::EpochAdvanced { from, to });
        tracing::info!(from = %from, to = %to, "Epoch advanced");
        self.sweep()
    }

    /// Expire reservations and timelocked withdrawals past their deadlines.
    /// Running it twice in the same epoch is a no-op.
    pub(crate) fn sweep(&mut self) -> Result<SweepReport> {
        let reservations = self.reservations.sweep_expired(&mut self.rewards, self.epoch)?;
        for id in &reservations {
            self.emit(LedgerEvent::ReservationSettled {
                id: *id,
                status: ReservationStatus::Expired,
            });
        }
        let withdrawals = self.treasury.sweep_expired(self.epoch)?;
        for id in &withdrawals {
            self.emit(LedgerEvent::WithdrawalExpired { id: *id });
        }
        Ok(SweepReport {
            epoch: self.epoch,
            reservations,
            withdrawals,
        })
    }

    // ── Invariants ────────────────────────────────────────────────────

    /// Check the cross-component invariants.
    ///
    /// - supply conservation (balances + locks + treasury == minted − burned)
    /// - every locked token belongs to exactly one active reservation
    ///
    /// # Errors
    /// `ConservationViolation` naming the broken identity.
    pub fn verify_invariants(&self) -> Result<()> {
        self.rewards.verify_conservation()?;
        let locked = self.rewards.total_locked();
        let reserved = self.reservations.active_locked_total();
        if locked != reserved {
            tracing::error!(
                locked = %locked,
                reserved = %reserved,
                "Locked funds out of sync with reservations"
            );
            return Err(LedgerError::ConservationViolation {
                reason: format!("locked balance {locked} != active reservations {reserved}"),
            });
        }
        Ok(())
    }

    // ── Claims ────────────────────────────────────────────────────────

    /// Validate a claim against this state without recording anything.
    ///
    /// # Errors
    /// Any rejection the verifier would produce.
    pub fn check_claim(&self, claim: &AttestationClaim) -> Result<ValidatedClaim> {
        self.verifier.check(claim, &self.registry, self.epoch)
    }

    // ── Views ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    #[must_use]
    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    #[must_use]
    pub fn verifier(&self) -> &AttestationVerifier {
        &self.verifier
    }

    #[must_use]
    pub fn badge_ledger(&self) -> &BadgeLedger {
        &self.badges
    }

    #[must_use]
    pub fn rewards(&self) -> &RewardLedger {
        &self.rewards
    }

    #[must_use]
    pub fn reservation_manager(&self) -> &ReservationManager {
        &self.reservations
    }

    #[must_use]
    pub fn treasury(&self) -> &TreasuryController {
        &self.treasury
    }

    #[must_use]
    pub fn grants(&self) -> &GrantGuard {
        &self.grants
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// # Errors
    /// `ClubNotFound`.
    pub fn club(&self, id: ClubId) -> Result<&Club> {
        self.registry.club(id)
    }

    pub fn clubs(&self) -> impl Iterator<Item = &Club> {
        self.registry.clubs()
    }

    #[must_use]
    pub fn membership(&self, club: ClubId, account: &AccountId) -> Option<&Membership> {
        self.registry.membership(club, account)
    }

    pub fn memberships(&self) -> impl Iterator<Item = &Membership> {
        self.registry.memberships()
    }

    #[must_use]
    pub fn badge(&self, id: BadgeId) -> Option<&Badge> {
        self.badges.badge(id)
    }

    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.badges()
    }

    #[must_use]
    pub fn balance(&self, account: &AccountId) -> BalanceEntry {
        self.rewards.balance(account)
    }

    /// Spendable balance of `account`.
    #[must_use]
    pub fn available(&self, account: &AccountId) -> Amount {
        self.rewards.available(account)
    }

    pub fn balances(&self) -> impl Iterator<Item = (&AccountId, &BalanceEntry)> {
        self.rewards.balances()
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.rewards.total_supply()
    }

    #[must_use]
    pub fn treasury_balance(&self) -> Amount {
        self.rewards.treasury()
    }

    #[must_use]
    pub fn supply_snapshot(&self) -> SupplySnapshot {
        self.rewards.snapshot()
    }

    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.get(&id)
    }

    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.reservations()
    }

    #[must_use]
    pub fn withdrawal(&self, id: WithdrawalId) -> Option<&WithdrawalRequest> {
        self.treasury.get(&id)
    }

    pub fn withdrawals(&self) -> impl Iterator<Item = &WithdrawalRequest> {
        self.treasury.requests()
    }

    // ── State digest ──────────────────────────────────────────────────

    /// SHA-256 over the canonical committed state.
    ///
    /// Two ledgers that applied the same operations from the same genesis
    /// produce the same digest. Iteration order is `BTreeMap` order throughout.
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::STATE_DOMAIN);
        hasher.update(self.epoch.0.to_le_bytes());

        let snap = self.rewards.snapshot();
        for v in [
            snap.total_supply,
            snap.circulating,
            snap.locked,
            snap.treasury,
            snap.minted,
            snap.burned,
        ] {
            hasher.update(v.to_le_bytes());
        }
        match self.rewards.supply_cap() {
            Some(cap) => {
                hasher.update([1]);
                hasher.update(cap.to_le_bytes());
            }
            None => hasher.update([0]),
        }
        for (account, entry) in self.rewards.balances() {
            hasher.update(account.as_bytes());
            hasher.update(entry.available.to_le_bytes());
            hasher.update(entry.locked.to_le_bytes());
        }

        for club in self.registry.clubs() {
            hasher.update(club.id.0.to_le_bytes());
            update_prefixed(&mut hasher, club.name.as_bytes());
            hasher.update((club.officer_quorum as u64).to_le_bytes());
            hasher.update(club.member_count.to_le_bytes());
            hasher.update((club.officers.len() as u64).to_le_bytes());
            for (officer, key) in &club.officers {
                hasher.update(officer.as_bytes());
                hasher.update(key.0);
            }
        }
        for m in self.registry.memberships() {
            hasher.update(m.club.0.to_le_bytes());
            hasher.update(m.account.as_bytes());
            hasher.update([m.role as u8, m.status as u8]);
            hasher.update((m.history.len() as u64).to_le_bytes());
        }

        for b in self.badges.badges() {
            hasher.update(b.id.0.to_le_bytes());
            hasher.update(b.owner.as_bytes());
            hasher.update(b.club.0.to_le_bytes());
            hasher.update([b.tier as u8, u8::from(b.soulbound), u8::from(b.revoked)]);
            hasher.update(b.metadata_hash.0);
        }
        for (club, t) in self.badges.club_thresholds() {
            hasher.update(club.0.to_le_bytes());
            hasher.update((t.elevated as u64).to_le_bytes());
            hasher.update((t.flagship as u64).to_le_bytes());
        }

        for r in self.reservations.reservations() {
            hasher.update(r.id.0.to_le_bytes());
            hasher.update(r.account.as_bytes());
            update_prefixed(&mut hasher, r.resource.0.as_bytes());
            hasher.update(r.amount.to_le_bytes());
            hasher.update(r.expires_at.0.to_le_bytes());
            hasher.update([r.status as u8]);
        }
        for (resource, settlers) in self.reservations.settlers() {
            update_prefixed(&mut hasher, resource.0.as_bytes());
            hasher.update((settlers.len() as u64).to_le_bytes());
            for s in settlers {
                hasher.update(s.as_bytes());
            }
        }

        for w in self.treasury.requests() {
            hasher.update(w.id.0.to_le_bytes());
            hasher.update(w.amount.to_le_bytes());
            hasher.update(w.destination.as_bytes());
            hasher.update([w.status as u8]);
            hasher.update((w.approvals.len() as u64).to_le_bytes());
        }
        hasher.update((self.treasury.quorum_threshold() as u64).to_le_bytes());
        for s in self.treasury.signers() {
            hasher.update(s.as_bytes());
        }

        for g in self.grants.iter() {
            hasher.update(g.0.to_le_bytes());
        }
        for ((who, epoch), total) in self.verifier.totals() {
            hasher.update(who.as_bytes());
            hasher.update(epoch.0.to_le_bytes());
            hasher.update(total.to_le_bytes());
        }
        hasher.update((self.verifier.tracked_nonces() as u64).to_le_bytes());
        hasher.update((self.verifier.tracked_approval_nonces() as u64).to_le_bytes());
        hasher.update(self.events.next_sequence().to_le_bytes());

        hasher.finalize().into()
    }

    #[must_use]
    pub fn state_digest_hex(&self) -> String {
        hex::encode(self.state_digest())
    }
}

/// Feed variable-length `bytes` to the hasher behind their u64 LE length, so
/// adjacent fields can never shift into each other.
fn update_prefixed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubledger_types::{GenesisClub, GenesisSettler, LedgerConfig, OfficerKey, ResourceType};
    use ed25519_dalek::SigningKey;

    fn prefixed(parts: &[&[u8]]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for part in parts {
            update_prefixed(&mut hasher, part);
        }
        hasher.finalize().into()
    }

    fn ledger(club_name: &str, resource: &str) -> Ledger {
        let mut cfg = LedgerConfig::default();
        cfg.genesis.clubs = vec![GenesisClub {
            id: ClubId(1),
            name: club_name.into(),
            officers: [(
                AccountId::from_seed(1),
                OfficerKey::from(SigningKey::from_bytes(&[1; 32]).verifying_key()),
            )]
            .into_iter()
            .collect(),
            members: Vec::new(),
        }];
        cfg.genesis.settlers = vec![GenesisSettler {
            resource: ResourceType::new(resource),
            settler: AccountId::from_seed(9),
        }];
        Ledger::genesis(&cfg).unwrap()
    }

    #[test]
    fn prefixed_fields_do_not_shift() {
        assert_ne!(prefixed(&[b"ab", b"c"]), prefixed(&[b"a", b"bc"]));
        assert_ne!(prefixed(&[b"", b"x"]), prefixed(&[b"x", b""]));
        assert_eq!(prefixed(&[b"ab", b"c"]), prefixed(&[b"ab", b"c"]));
    }

    #[test]
    fn digest_covers_names_and_resources() {
        let base = ledger("chess", "GPU");
        assert_eq!(base.state_digest(), ledger("chess", "GPU").state_digest());
        assert_ne!(base.state_digest(), ledger("chesz", "GPU").state_digest());
        assert_ne!(base.state_digest(), ledger("chess", "GPU2").state_digest());
    }
}
