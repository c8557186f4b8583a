//! # Attestation verifier
//!
//! Turns an [`AttestationClaim`] into a [`ValidatedClaim`], the only value
//! the reward ledger accepts as a claim-backed mint cause.
//!
//! ## Checks, in order
//!
//! 1. amount is positive
//! 2. the signer is a current officer of the claim's club
//! 3. the ed25519 signature verifies against the officer's registered key
//! 4. `(officer, epoch, nonce)` has not been consumed
//! 5. the claim epoch is current, or the previous one when grace is enabled
//! 6. the officer's and beneficiary's per-epoch totals stay within their caps
//!
//! [`AttestationVerifier::check`] runs all of these against a read-only view
//! so candidate claims can be screened in parallel. Only
//! [`AttestationVerifier::record`] mutates, and the ledger calls it in the
//! same operation as the mint.
//!
//! ## Officer approvals
//!
//! Badge, role and claim-revocation actions carry an [`OfficerApproval`].
//! [`AttestationVerifier::check_approval`] verifies every co-signature
//! against the signer's registered key and turns it into a
//! [`ValidatedApproval`]; approval nonces live in their own tracker so they
//! never collide with claim nonces.

use std::collections::{BTreeMap, BTreeSet};

use clubledger_types::{
    AccountId, Amount, ApprovedAction, AttestationClaim, ClaimConfig, ClubId, EpochId,
    LedgerError, OfficerApproval, OfficerKey, Result, approval_payload, constants,
};
use ed25519_dalek::Signature;

use crate::{MembershipRegistry, nonce::NonceTracker};

/// A claim that passed every verification step.
///
/// Fields are private so a `ValidatedClaim` can only come from
/// [`AttestationVerifier::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClaim {
    club: ClubId,
    beneficiary: AccountId,
    amount: Amount,
    epoch: EpochId,
    nonce: u64,
    officer: AccountId,
    digest: [u8; 32],
}

impl ValidatedClaim {
    fn from_claim(claim: &AttestationClaim) -> Self {
        Self {
            club: claim.club,
            beneficiary: claim.beneficiary,
            amount: claim.amount,
            epoch: claim.epoch,
            nonce: claim.nonce,
            officer: claim.officer,
            digest: claim.digest(),
        }
    }

    #[must_use]
    pub fn club(&self) -> ClubId {
        self.club
    }

    #[must_use]
    pub fn beneficiary(&self) -> AccountId {
        self.beneficiary
    }

    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    #[must_use]
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    #[must_use]
    pub fn officer(&self) -> AccountId {
        self.officer
    }

    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }
}

/// Skip verification. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl ValidatedClaim {
    pub fn assume_valid(claim: &AttestationClaim) -> Self {
        Self::from_claim(claim)
    }
}

/// An officer approval whose every signature verified against a current
/// officer's registered key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedApproval {
    club: ClubId,
    action: ApprovedAction,
    epoch: EpochId,
    nonce: u64,
    approvers: BTreeSet<AccountId>,
}

impl ValidatedApproval {
    #[must_use]
    pub fn club(&self) -> ClubId {
        self.club
    }

    #[must_use]
    pub fn action(&self) -> &ApprovedAction {
        &self.action
    }

    #[must_use]
    pub fn epoch(&self) -> EpochId {
        self.epoch
    }

    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    #[must_use]
    pub fn approvers(&self) -> &BTreeSet<AccountId> {
        &self.approvers
    }

    /// `Unauthorized` unless this approval was signed for `action` in `club`.
    ///
    /// # Errors
    /// `Unauthorized` on any mismatch.
    pub fn ensure_covers(&self, club: ClubId, action: &ApprovedAction) -> Result<()> {
        if self.club != club || &self.action != action {
            tracing::warn!(club = %club, action = action.name(), "Approval signed for a different action");
            return Err(LedgerError::unauthorized(format!(
                "approval does not cover {} in {club}",
                action.name()
            )));
        }
        Ok(())
    }
}

/// Skip signature verification. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl ValidatedApproval {
    pub fn assume_valid(
        club: ClubId,
        action: ApprovedAction,
        approvers: impl IntoIterator<Item = AccountId>,
    ) -> Self {
        Self {
            club,
            action,
            epoch: EpochId(0),
            nonce: 0,
            approvers: approvers.into_iter().collect(),
        }
    }
}

/// Nonce and per-epoch total bookkeeping for attestation claims and
/// officer approvals.
#[derive(Debug, Clone)]
pub struct AttestationVerifier {
    config: ClaimConfig,
    nonces: NonceTracker,
    approval_nonces: NonceTracker,
    officer_totals: BTreeMap<(AccountId, EpochId), Amount>,
    beneficiary_totals: BTreeMap<(AccountId, EpochId), Amount>,
}

impl AttestationVerifier {
    #[must_use]
    pub fn new(config: ClaimConfig) -> Self {
        let nonces = NonceTracker::new(config.max_nonces_per_officer_epoch);
        let approval_nonces = NonceTracker::new(config.max_nonces_per_officer_epoch);
        Self {
            config,
            nonces,
            approval_nonces,
            officer_totals: BTreeMap::new(),
            beneficiary_totals: BTreeMap::new(),
        }
    }

    /// Verify a 64-byte ed25519 signature over `payload` with `verify_strict`.
    fn verify_signature(key: &OfficerKey, payload: &[u8], signature: &[u8]) -> Result<()> {
        if signature.len() != constants::SIGNATURE_LEN {
            return Err(LedgerError::InvalidSignature {
                reason: format!(
                    "expected {} signature bytes, got {}",
                    constants::SIGNATURE_LEN,
                    signature.len()
                ),
            });
        }
        let signature =
            Signature::from_slice(signature).map_err(|e| LedgerError::InvalidSignature {
                reason: e.to_string(),
            })?;
        key.verifying_key()?
            .verify_strict(payload, &signature)
            .map_err(|e| LedgerError::InvalidSignature {
                reason: e.to_string(),
            })
    }

    /// Run every verification step without mutating anything.
    ///
    /// # Errors
    /// `InvalidAmount`, `Unauthorized`, `InvalidSignature`, `NonceReplay`,
    /// `EpochExpired`, `EpochCapExceeded` or `Overflow`, from the first
    /// failing step.
    pub fn check(
        &self,
        claim: &AttestationClaim,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<ValidatedClaim> {
        if claim.amount == 0 {
            return Err(LedgerError::InvalidAmount {
                reason: "claim amount must be positive".into(),
            });
        }

        let Some(key) = registry.officer_key(claim.club, &claim.officer) else {
            tracing::warn!(club = %claim.club, officer = %claim.officer, "Claim signed by non-officer");
            return Err(LedgerError::unauthorized(format!(
                "{} is not an officer of {}",
                claim.officer, claim.club
            )));
        };

        Self::verify_signature(key, &claim.signing_payload(), &claim.signature).inspect_err(|_| {
            tracing::warn!(officer = %claim.officer, nonce = claim.nonce, "Claim signature rejected");
        })?;

        self.nonces.check(&claim.officer, claim.epoch, claim.nonce)?;

        if !self.epoch_accepted(claim.epoch, now) {
            return Err(LedgerError::EpochExpired {
                claim_epoch: claim.epoch,
                current: now,
            });
        }

        let officer_total = Self::total(&self.officer_totals, claim.officer, claim.epoch)
            .checked_add(claim.amount)
            .ok_or(LedgerError::Overflow)?;
        if officer_total > self.config.officer_epoch_cap {
            return Err(LedgerError::EpochCapExceeded {
                reason: format!(
                    "officer {} would attest {officer_total} in {}, cap {}",
                    claim.officer, claim.epoch, self.config.officer_epoch_cap
                ),
            });
        }
        let beneficiary_total = Self::total(&self.beneficiary_totals, claim.beneficiary, claim.epoch)
            .checked_add(claim.amount)
            .ok_or(LedgerError::Overflow)?;
        if beneficiary_total > self.config.beneficiary_epoch_cap {
            return Err(LedgerError::EpochCapExceeded {
                reason: format!(
                    "beneficiary {} would receive {beneficiary_total} in {}, cap {}",
                    claim.beneficiary, claim.epoch, self.config.beneficiary_epoch_cap
                ),
            });
        }

        Ok(ValidatedClaim::from_claim(claim))
    }

    /// Consume the nonce and add to the per-epoch totals.
    ///
    /// # Errors
    /// `NonceReplay` if the nonce was consumed since the claim was checked,
    /// or `Overflow`. Nothing is recorded on error.
    pub fn record(&mut self, claim: &ValidatedClaim) -> Result<()> {
        let officer_total = Self::total(&self.officer_totals, claim.officer, claim.epoch)
            .checked_add(claim.amount)
            .ok_or(LedgerError::Overflow)?;
        let beneficiary_total = Self::total(&self.beneficiary_totals, claim.beneficiary, claim.epoch)
            .checked_add(claim.amount)
            .ok_or(LedgerError::Overflow)?;
        self.nonces
            .check_and_record(&claim.officer, claim.epoch, claim.nonce)?;
        self.officer_totals
            .insert((claim.officer, claim.epoch), officer_total);
        self.beneficiary_totals
            .insert((claim.beneficiary, claim.epoch), beneficiary_total);
        tracing::debug!(
            officer = %claim.officer,
            epoch = %claim.epoch,
            nonce = claim.nonce,
            "Claim nonce consumed"
        );
        Ok(())
    }

    /// `check` followed by `record`.
    ///
    /// # Errors
    /// Any error from [`Self::check`].
    pub fn verify(
        &mut self,
        claim: &AttestationClaim,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<ValidatedClaim> {
        let validated = self.check(claim, registry, now)?;
        self.record(&validated)?;
        Ok(validated)
    }

    // ── Officer approvals ─────────────────────────────────────────────

    /// Verify every co-signature on `approval` for `action` in `club`,
    /// without mutating anything.
    ///
    /// Checks, in order: at least one signature, no signer twice, every
    /// signer a current officer, every signature valid over the approval
    /// payload, no signer's `(epoch, nonce)` consumed, and the approval epoch
    /// inside the acceptance window.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized`, `InvalidInput` for a repeated signer,
    /// `InvalidSignature`, `NonceReplay` or `EpochExpired`.
    pub fn check_approval(
        &self,
        club: ClubId,
        action: &ApprovedAction,
        approval: &OfficerApproval,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<ValidatedApproval> {
        let entry = registry.club(club)?;
        if approval.signatures.is_empty() {
            return Err(LedgerError::unauthorized(format!(
                "{} approval carries no signatures",
                action.name()
            )));
        }

        let payload = approval_payload(club, action, approval.epoch, approval.nonce);
        let mut approvers = BTreeSet::new();
        for signed in &approval.signatures {
            if !approvers.insert(signed.officer) {
                return Err(LedgerError::invalid_input(format!(
                    "{} signed the approval twice",
                    signed.officer
                )));
            }
            let Some(key) = entry.officer_key(&signed.officer) else {
                tracing::warn!(club = %club, officer = %signed.officer, action = action.name(), "Approval signed by non-officer");
                return Err(LedgerError::unauthorized(format!(
                    "{} is not an officer of {club}",
                    signed.officer
                )));
            };
            Self::verify_signature(key, &payload, &signed.signature).inspect_err(|_| {
                tracing::warn!(officer = %signed.officer, action = action.name(), "Approval signature rejected");
            })?;
            self.approval_nonces
                .check(&signed.officer, approval.epoch, approval.nonce)?;
        }

        if !self.epoch_accepted(approval.epoch, now) {
            return Err(LedgerError::EpochExpired {
                claim_epoch: approval.epoch,
                current: now,
            });
        }

        Ok(ValidatedApproval {
            club,
            action: action.clone(),
            epoch: approval.epoch,
            nonce: approval.nonce,
            approvers,
        })
    }

    /// Consume the approval nonce for every signer.
    ///
    /// # Errors
    /// `NonceReplay` if any signer's nonce was consumed since the check.
    /// Nothing is recorded on error.
    pub fn record_approval(&mut self, approval: &ValidatedApproval) -> Result<()> {
        for officer in &approval.approvers {
            self.approval_nonces
                .check(officer, approval.epoch, approval.nonce)?;
        }
        for officer in &approval.approvers {
            self.approval_nonces
                .check_and_record(officer, approval.epoch, approval.nonce)?;
        }
        tracing::debug!(
            action = approval.action.name(),
            epoch = %approval.epoch,
            nonce = approval.nonce,
            signers = approval.approvers.len(),
            "Approval nonce consumed"
        );
        Ok(())
    }

    /// Consume the claim named by a `RevokeClaim` approval without minting,
    /// so the claim can never be redeemed.
    ///
    /// The approval must be signed by the claim's officer, or by at least
    /// the club's role-change quorum of officers.
    ///
    /// # Errors
    /// `Unauthorized` if the approval is for another action or too small,
    /// `EpochExpired` if the claim epoch is outside the window, or
    /// `NonceReplay` if the claim was already redeemed or revoked.
    pub fn revoke_claim(
        &mut self,
        approval: &ValidatedApproval,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<()> {
        let ApprovedAction::RevokeClaim {
            officer,
            epoch,
            nonce,
        } = approval.action
        else {
            return Err(LedgerError::unauthorized(format!(
                "{} approval cannot revoke a claim",
                approval.action.name()
            )));
        };
        let entry = registry.check_officers(approval.club, &approval.approvers)?;
        let required = entry.role_change_quorum();
        if !approval.approvers.contains(&officer) && approval.approvers.len() < required {
            return Err(LedgerError::unauthorized(format!(
                "revoking another officer's claim needs {required} officer approvals, got {}",
                approval.approvers.len()
            )));
        }
        if !self.epoch_accepted(epoch, now) {
            return Err(LedgerError::EpochExpired {
                claim_epoch: epoch,
                current: now,
            });
        }
        self.nonces.check_and_record(&officer, epoch, nonce)?;
        tracing::info!(club = %approval.club, officer = %officer, epoch = %epoch, nonce, "Claim revoked");
        Ok(())
    }

    /// Drop bookkeeping for epochs that can no longer be claimed at `now`.
    pub fn prune(&mut self, now: EpochId) {
        let oldest = self.oldest_accepted(now);
        self.nonces.prune_before(oldest);
        self.approval_nonces.prune_before(oldest);
        self.officer_totals.retain(|(_, epoch), _| *epoch >= oldest);
        self.beneficiary_totals.retain(|(_, epoch), _| *epoch >= oldest);
    }

    fn oldest_accepted(&self, now: EpochId) -> EpochId {
        if self.config.allow_prior_epoch {
            now.prev().unwrap_or(now)
        } else {
            now
        }
    }

    fn epoch_accepted(&self, claim_epoch: EpochId, now: EpochId) -> bool {
        claim_epoch == now || (self.config.allow_prior_epoch && now.prev() == Some(claim_epoch))
    }

    fn total(map: &BTreeMap<(AccountId, EpochId), Amount>, who: AccountId, epoch: EpochId) -> Amount {
        map.get(&(who, epoch)).copied().unwrap_or(0)
    }

    /// Amount `officer` has attested in `epoch` so far.
    #[must_use]
    pub fn officer_total(&self, officer: AccountId, epoch: EpochId) -> Amount {
        Self::total(&self.officer_totals, officer, epoch)
    }

    /// Amount `beneficiary` has received through claims in `epoch` so far.
    #[must_use]
    pub fn beneficiary_total(&self, beneficiary: AccountId, epoch: EpochId) -> Amount {
        Self::total(&self.beneficiary_totals, beneficiary, epoch)
    }

    #[must_use]
    pub fn is_nonce_used(&self, officer: &AccountId, epoch: EpochId, nonce: u64) -> bool {
        self.nonces.is_used(officer, epoch, nonce)
    }

    #[must_use]
    pub fn is_approval_nonce_used(&self, officer: &AccountId, epoch: EpochId, nonce: u64) -> bool {
        self.approval_nonces.is_used(officer, epoch, nonce)
    }

    #[must_use]
    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    /// Canonical view of the per-epoch totals, for the state digest.
    pub fn totals(&self) -> impl Iterator<Item = (&(AccountId, EpochId), &Amount)> {
        self.officer_totals.iter().chain(self.beneficiary_totals.iter())
    }

    /// Claim nonces currently retained.
    #[must_use]
    pub fn tracked_nonces(&self) -> usize {
        self.nonces.total_nonces()
    }

    /// Approval nonces currently retained.
    #[must_use]
    pub fn tracked_approval_nonces(&self) -> usize {
        self.approval_nonces.total_nonces()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubledger_types::{MembershipConfig, OfficerKey};
    use ed25519_dalek::SigningKey;

    const CLUB: ClubId = ClubId(1);

    fn officer_key() -> SigningKey {
        SigningKey::from_bytes(&[0x0f; 32])
    }

    fn officer() -> AccountId {
        AccountId::from_seed(0x0f)
    }

    fn registry() -> MembershipRegistry {
        let mut reg = MembershipRegistry::new(MembershipConfig::default());
        let founders = [(officer(), OfficerKey::from(officer_key().verifying_key()))]
            .into_iter()
            .collect();
        reg.bootstrap_club(CLUB, "chess", &founders, &[], EpochId(0)).unwrap();
        reg
    }

    fn claim(amount: Amount, epoch: u64, nonce: u64) -> AttestationClaim {
        AttestationClaim::unsigned(CLUB, AccountId::from_seed(0xa), amount, EpochId(epoch), nonce, officer())
            .signed_with(&officer_key())
    }

    fn verifier() -> AttestationVerifier {
        AttestationVerifier::new(ClaimConfig::default())
    }

    #[test]
    fn valid_claim_passes() {
        let reg = registry();
        let mut v = verifier();
        let ok = v.verify(&claim(1_000, 5, 7), &reg, EpochId(5)).unwrap();
        assert_eq!(ok.amount(), 1_000);
        assert_eq!(ok.beneficiary(), AccountId::from_seed(0xa));
        assert!(v.is_nonce_used(&officer(), EpochId(5), 7));
        assert_eq!(v.officer_total(officer(), EpochId(5)), 1_000);
    }

    #[test]
    fn replay_rejected() {
        let reg = registry();
        let mut v = verifier();
        let c = claim(1_000, 5, 7);
        v.verify(&c, &reg, EpochId(5)).unwrap();
        let err = v.verify(&c, &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::NonceReplay { nonce: 7, .. }));
        assert_eq!(v.beneficiary_total(AccountId::from_seed(0xa), EpochId(5)), 1_000);
    }

    #[test]
    fn check_is_pure() {
        let reg = registry();
        let v = verifier();
        let c = claim(1_000, 5, 7);
        v.check(&c, &reg, EpochId(5)).unwrap();
        v.check(&c, &reg, EpochId(5)).unwrap();
        assert!(!v.is_nonce_used(&officer(), EpochId(5), 7));
    }

    #[test]
    fn non_officer_rejected() {
        let reg = registry();
        let stranger = SigningKey::from_bytes(&[0x33; 32]);
        let c = AttestationClaim::unsigned(CLUB, AccountId::from_seed(0xa), 10, EpochId(5), 1, AccountId::from_seed(0x33))
            .signed_with(&stranger);
        let err = verifier().check(&c, &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn tampered_claim_rejected() {
        let reg = registry();
        let mut c = claim(1_000, 5, 7);
        c.amount = 1_000_000;
        let err = verifier().check(&c, &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    }

    #[test]
    fn short_signature_rejected() {
        let reg = registry();
        let mut c = claim(1_000, 5, 7);
        c.signature.truncate(10);
        let err = verifier().check(&c, &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    }

    #[test]
    fn epoch_window() {
        let reg = registry();
        let v = verifier();
        assert!(v.check(&claim(10, 4, 1), &reg, EpochId(5)).is_ok());
        assert!(matches!(
            v.check(&claim(10, 3, 1), &reg, EpochId(5)),
            Err(LedgerError::EpochExpired { .. })
        ));
        assert!(matches!(
            v.check(&claim(10, 6, 1), &reg, EpochId(5)),
            Err(LedgerError::EpochExpired { .. })
        ));

        let strict = AttestationVerifier::new(ClaimConfig {
            allow_prior_epoch: false,
            ..ClaimConfig::default()
        });
        assert!(strict.check(&claim(10, 4, 1), &reg, EpochId(5)).is_err());
    }

    #[test]
    fn beneficiary_cap_enforced() {
        let reg = registry();
        let mut v = AttestationVerifier::new(ClaimConfig {
            beneficiary_epoch_cap: 1_500,
            ..ClaimConfig::default()
        });
        v.verify(&claim(1_000, 5, 1), &reg, EpochId(5)).unwrap();
        let err = v.verify(&claim(501, 5, 2), &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::EpochCapExceeded { .. }));
        assert!(err.is_transient());
        // Rejected claim did not burn its nonce.
        assert!(!v.is_nonce_used(&officer(), EpochId(5), 2));
        assert!(v.verify(&claim(500, 5, 2), &reg, EpochId(5)).is_ok());
    }

    #[test]
    fn officer_cap_enforced() {
        let reg = registry();
        let v = AttestationVerifier::new(ClaimConfig {
            officer_epoch_cap: 100,
            ..ClaimConfig::default()
        });
        assert!(matches!(
            v.check(&claim(101, 5, 1), &reg, EpochId(5)),
            Err(LedgerError::EpochCapExceeded { .. })
        ));
    }

    #[test]
    fn zero_amount_rejected() {
        let reg = registry();
        assert!(matches!(
            verifier().check(&claim(0, 5, 1), &reg, EpochId(5)),
            Err(LedgerError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn prune_keeps_grace_epoch() {
        let reg = registry();
        let mut v = verifier();
        v.verify(&claim(10, 4, 1), &reg, EpochId(5)).unwrap();
        v.verify(&claim(10, 5, 1), &reg, EpochId(5)).unwrap();
        v.prune(EpochId(6));
        assert!(!v.is_nonce_used(&officer(), EpochId(4), 1));
        assert!(v.is_nonce_used(&officer(), EpochId(5), 1));
        assert_eq!(v.officer_total(officer(), EpochId(4)), 0);
        assert_eq!(v.tracked_nonces(), 1);
    }

    // ── Officer approvals ─────────────────────────────────────────────

    fn council() -> MembershipRegistry {
        let mut reg = MembershipRegistry::new(MembershipConfig::default());
        let founders = (1..=3u8)
            .map(|s| {
                (
                    AccountId::from_seed(s),
                    OfficerKey::from(SigningKey::from_bytes(&[s; 32]).verifying_key()),
                )
            })
            .collect();
        reg.bootstrap_club(CLUB, "chess", &founders, &[AccountId::from_seed(9)], EpochId(0))
            .unwrap();
        reg
    }

    fn promote(account: u8) -> ApprovedAction {
        ApprovedAction::GrantOfficer {
            account: AccountId::from_seed(account),
            key: OfficerKey::from(SigningKey::from_bytes(&[account; 32]).verifying_key()),
        }
    }

    fn signed(action: &ApprovedAction, nonce: u64, seeds: &[u8]) -> OfficerApproval {
        seeds.iter().fold(OfficerApproval::new(EpochId(5), nonce), |a, s| {
            a.signed_by(CLUB, action, AccountId::from_seed(*s), &SigningKey::from_bytes(&[*s; 32]))
        })
    }

    #[test]
    fn approval_verifies_every_signer() {
        let reg = council();
        let action = promote(9);
        let ok = verifier()
            .check_approval(CLUB, &action, &signed(&action, 1, &[1, 2]), &reg, EpochId(5))
            .unwrap();
        assert_eq!(ok.approvers().len(), 2);
        assert_eq!(ok.action(), &action);
        assert!(ok.ensure_covers(CLUB, &action).is_ok());
        assert!(ok.ensure_covers(CLUB, &promote(8)).is_err());
    }

    #[test]
    fn forged_officer_signature_rejected() {
        let reg = council();
        let action = promote(9);
        // Member 9 names officers 1 and 2 but signs with its own key.
        let mut approval = OfficerApproval::new(EpochId(5), 1);
        for officer in [1u8, 2] {
            approval = approval.signed_by(
                CLUB,
                &action,
                AccountId::from_seed(officer),
                &SigningKey::from_bytes(&[9; 32]),
            );
        }
        let err = verifier()
            .check_approval(CLUB, &action, &approval, &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    }

    #[test]
    fn unsigned_approval_rejected() {
        let reg = council();
        let action = promote(9);
        let err = verifier()
            .check_approval(CLUB, &action, &OfficerApproval::new(EpochId(5), 1), &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));

        let mut blank = signed(&action, 1, &[1, 2]);
        for sig in &mut blank.signatures {
            sig.signature.clear();
        }
        let err = verifier()
            .check_approval(CLUB, &action, &blank, &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    }

    #[test]
    fn approval_by_member_rejected() {
        let reg = council();
        let action = promote(9);
        let err = verifier()
            .check_approval(CLUB, &action, &signed(&action, 1, &[1, 9]), &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Unauthorized { .. }));
    }

    #[test]
    fn approval_signed_for_other_action_rejected() {
        let reg = council();
        let approval = signed(&promote(8), 1, &[1, 2]);
        let err = verifier()
            .check_approval(CLUB, &promote(9), &approval, &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidSignature { .. }));
    }

    #[test]
    fn repeated_signer_rejected() {
        let reg = council();
        let action = promote(9);
        let err = verifier()
            .check_approval(CLUB, &action, &signed(&action, 1, &[1, 1]), &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidInput { .. }));
    }

    #[test]
    fn recorded_approval_cannot_be_replayed() {
        let reg = council();
        let mut v = verifier();
        let action = promote(9);
        let approval = signed(&action, 4, &[1, 2]);
        let ok = v.check_approval(CLUB, &action, &approval, &reg, EpochId(5)).unwrap();
        v.record_approval(&ok).unwrap();
        assert!(v.is_approval_nonce_used(&AccountId::from_seed(2), EpochId(5), 4));
        // Claim nonces are a separate space.
        assert!(!v.is_nonce_used(&AccountId::from_seed(2), EpochId(5), 4));
        let err = v
            .check_approval(CLUB, &action, &approval, &reg, EpochId(5))
            .unwrap_err();
        assert!(matches!(err, LedgerError::NonceReplay { nonce: 4, .. }));
    }

    #[test]
    fn stale_approval_rejected() {
        let reg = council();
        let action = promote(9);
        let err = verifier()
            .check_approval(CLUB, &action, &signed(&action, 1, &[1, 2]), &reg, EpochId(7))
            .unwrap_err();
        assert!(matches!(err, LedgerError::EpochExpired { .. }));
    }

    // ── Claim revocation ──────────────────────────────────────────────

    fn revocation(officer: u8, nonce: u64) -> ApprovedAction {
        ApprovedAction::RevokeClaim {
            officer: AccountId::from_seed(officer),
            epoch: EpochId(5),
            nonce,
        }
    }

    fn officer_claim(officer: u8, nonce: u64) -> AttestationClaim {
        AttestationClaim::unsigned(CLUB, AccountId::from_seed(9), 10, EpochId(5), nonce, AccountId::from_seed(officer))
            .signed_with(&SigningKey::from_bytes(&[officer; 32]))
    }

    #[test]
    fn revoked_claim_cannot_be_redeemed() {
        let reg = council();
        let mut v = verifier();
        let action = revocation(1, 7);
        let ok = v
            .check_approval(CLUB, &action, &signed(&action, 100, &[1]), &reg, EpochId(5))
            .unwrap();
        v.revoke_claim(&ok, &reg, EpochId(5)).unwrap();
        assert!(v.is_nonce_used(&AccountId::from_seed(1), EpochId(5), 7));
        assert_eq!(v.officer_total(AccountId::from_seed(1), EpochId(5)), 0);

        let err = v.verify(&officer_claim(1, 7), &reg, EpochId(5)).unwrap_err();
        assert!(matches!(err, LedgerError::NonceReplay { nonce: 7, .. }));
    }

    #[test]
    fn revoking_another_officers_claim_needs_quorum() {
        let reg = council();
        let mut v = verifier();
        let action = revocation(1, 7);
        let lone = ValidatedApproval::assume_valid(CLUB, action.clone(), [AccountId::from_seed(2)]);
        assert!(matches!(
            v.revoke_claim(&lone, &reg, EpochId(5)),
            Err(LedgerError::Unauthorized { .. })
        ));
        assert!(!v.is_nonce_used(&AccountId::from_seed(1), EpochId(5), 7));

        let pair = ValidatedApproval::assume_valid(
            CLUB,
            action,
            [AccountId::from_seed(2), AccountId::from_seed(3)],
        );
        v.revoke_claim(&pair, &reg, EpochId(5)).unwrap();
        assert!(v.is_nonce_used(&AccountId::from_seed(1), EpochId(5), 7));
    }

    #[test]
    fn redeemed_claim_cannot_be_revoked() {
        let reg = council();
        let mut v = verifier();
        v.verify(&officer_claim(1, 7), &reg, EpochId(5)).unwrap();
        let own = ValidatedApproval::assume_valid(CLUB, revocation(1, 7), [AccountId::from_seed(1)]);
        assert!(matches!(
            v.revoke_claim(&own, &reg, EpochId(5)),
            Err(LedgerError::NonceReplay { nonce: 7, .. })
        ));
        let stale = ValidatedApproval::assume_valid(CLUB, revocation(1, 8), [AccountId::from_seed(1)]);
        assert!(matches!(
            v.revoke_claim(&stale, &reg, EpochId(7)),
            Err(LedgerError::EpochExpired { .. })
        ));
    }

    #[test]
    fn revoke_claim_needs_revocation_approval() {
        let reg = council();
        let mut v = verifier();
        let wrong = ValidatedApproval::assume_valid(CLUB, promote(9), [AccountId::from_seed(1)]);
        assert!(matches!(
            v.revoke_claim(&wrong, &reg, EpochId(5)),
            Err(LedgerError::Unauthorized { .. })
        ));
    }
}
