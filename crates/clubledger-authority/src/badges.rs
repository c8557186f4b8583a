//! Badge ledger: tiered issuance, revocation and transfer.

use std::collections::BTreeMap;

use clubledger_types::{
    AccountId, ApprovedAction, Badge, BadgeId, BadgeTier, BadgeTransfer, ClubId, ContentDigest,
    EpochId, GovernanceGrant, GrantAction, GrantScope, GrantTarget, LedgerError, Provenance,
    QuorumId, QuorumRule, Result, TierThresholds,
};

use crate::{MembershipRegistry, ValidatedApproval};

/// Parameters of a new badge, apart from the officer approval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeRequest {
    pub club: ClubId,
    pub owner: AccountId,
    pub tier: BadgeTier,
    pub soulbound: bool,
    pub metadata_hash: ContentDigest,
}

impl BadgeRequest {
    /// The action officers sign to approve this issuance.
    #[must_use]
    pub fn action(&self) -> ApprovedAction {
        ApprovedAction::IssueBadge {
            owner: self.owner,
            tier: self.tier,
            soulbound: self.soulbound,
            metadata_hash: self.metadata_hash,
        }
    }
}

/// Owns every issued badge and the per-club tier thresholds.
#[derive(Debug, Clone)]
pub struct BadgeLedger {
    badges: BTreeMap<BadgeId, Badge>,
    /// Clubs without an entry use `default_thresholds`.
    thresholds: BTreeMap<ClubId, TierThresholds>,
    default_thresholds: TierThresholds,
    next_id: u64,
}

impl BadgeLedger {
    #[must_use]
    pub fn new(default_thresholds: TierThresholds) -> Self {
        Self {
            badges: BTreeMap::new(),
            thresholds: BTreeMap::new(),
            default_thresholds,
            next_id: 1,
        }
    }

    #[must_use]
    pub fn thresholds_for(&self, club: ClubId) -> TierThresholds {
        self.thresholds
            .get(&club)
            .copied()
            .unwrap_or(self.default_thresholds)
    }

    /// Check `approval` against the tier's rule for `club` and build the provenance.
    ///
    /// The approval must cover `action` in `club` and every signer must be a
    /// current officer (`Unauthorized`), then the signer count must satisfy
    /// the rule (`QuorumNotMet`).
    fn authorize(
        &self,
        club: ClubId,
        tier: BadgeTier,
        action: &ApprovedAction,
        approval: &ValidatedApproval,
        registry: &MembershipRegistry,
    ) -> Result<Provenance> {
        approval.ensure_covers(club, action)?;
        let signers = approval.approvers();
        registry.check_officers(club, signers)?;

        let required = match tier.quorum_rule(&self.thresholds_for(club)) {
            QuorumRule::AnyOfficer => 1,
            QuorumRule::Threshold(n) => n,
        };
        if signers.len() < required {
            return Err(LedgerError::QuorumNotMet {
                required,
                provided: signers.len(),
            });
        }

        Ok(match signers.first() {
            Some(officer) if signers.len() == 1 => Provenance::Officer(*officer),
            _ => Provenance::Quorum {
                id: QuorumId::from_approvers(club, signers),
                approvers: signers.clone(),
            },
        })
    }

    /// The action officers sign to revoke badge `id`.
    ///
    /// # Errors
    /// `BadgeNotFound`.
    pub fn revoke_action(&self, id: BadgeId) -> Result<(ClubId, ApprovedAction)> {
        let badge = self.badges.get(&id).ok_or(LedgerError::BadgeNotFound(id))?;
        Ok((
            badge.club,
            ApprovedAction::RevokeBadge {
                badge: id,
                tier: badge.tier,
            },
        ))
    }

    /// Issue a new badge.
    ///
    /// # Errors
    /// `ClubNotFound`, `Unauthorized` if the approval covers another action
    /// or any signer is not an officer, or `QuorumNotMet` if the approval is
    /// too small for the tier.
    pub fn issue(
        &mut self,
        request: BadgeRequest,
        approval: &ValidatedApproval,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<BadgeId> {
        let provenance =
            self.authorize(request.club, request.tier, &request.action(), approval, registry)?;

        let id = BadgeId(self.next_id);
        self.next_id += 1;
        tracing::info!(
            badge = %id,
            club = %request.club,
            owner = %request.owner,
            tier = %request.tier,
            soulbound = request.soulbound,
            "Badge issued"
        );
        self.badges.insert(
            id,
            Badge {
                id,
                owner: request.owner,
                club: request.club,
                tier: request.tier,
                soulbound: request.soulbound,
                metadata_hash: request.metadata_hash,
                provenance,
                issued_at: now,
                revoked: false,
                revoked_at: None,
                transfers: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Revoke a badge under the same rule its tier requires for issuance.
    ///
    /// # Errors
    /// `BadgeNotFound`, `BadgeRevoked`, `Unauthorized` or `QuorumNotMet`.
    pub fn revoke(
        &mut self,
        id: BadgeId,
        approval: &ValidatedApproval,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<()> {
        let badge = self.badges.get(&id).ok_or(LedgerError::BadgeNotFound(id))?;
        if badge.revoked {
            return Err(LedgerError::BadgeRevoked(id));
        }
        let (club, action) = self.revoke_action(id)?;
        self.authorize(club, badge.tier, &action, approval, registry)?;

        let badge = self.badges.get_mut(&id).ok_or(LedgerError::BadgeNotFound(id))?;
        badge.mark_revoked(now)?;
        tracing::info!(badge = %id, "Badge revoked");
        Ok(())
    }

    /// Move a transferable badge from its owner to another account.
    ///
    /// # Errors
    /// `BadgeNotFound`, `SoulboundViolation`, `BadgeRevoked`, `Unauthorized`
    /// if `from` is not the owner, or `InvalidInput` for a self-transfer.
    pub fn transfer(
        &mut self,
        id: BadgeId,
        from: AccountId,
        to: AccountId,
        now: EpochId,
    ) -> Result<()> {
        let badge = self.badges.get_mut(&id).ok_or(LedgerError::BadgeNotFound(id))?;
        if badge.soulbound {
            tracing::warn!(badge = %id, from = %from, "Soulbound transfer rejected");
            return Err(LedgerError::SoulboundViolation(id));
        }
        if badge.revoked {
            return Err(LedgerError::BadgeRevoked(id));
        }
        if badge.owner != from {
            return Err(LedgerError::unauthorized(format!("{from} does not own {id}")));
        }
        if from == to {
            return Err(LedgerError::invalid_input("badge transfer to current owner"));
        }
        badge.owner = to;
        badge.transfers.push(BadgeTransfer {
            from,
            to,
            epoch: now,
        });
        tracing::info!(badge = %id, from = %from, to = %to, "Badge transferred");
        Ok(())
    }

    /// Replace the tier thresholds for one club.
    ///
    /// # Errors
    /// `Unauthorized` for a mismatched grant, `ClubNotFound`, or
    /// `InvalidInput` for inconsistent thresholds.
    pub fn set_thresholds(
        &mut self,
        club: ClubId,
        thresholds: TierThresholds,
        grant: &GovernanceGrant,
        registry: &MembershipRegistry,
        now: EpochId,
    ) -> Result<()> {
        grant.check(
            GrantScope::BadgeLedger,
            GrantAction::SetQuorumThreshold,
            &GrantTarget::Club(club),
            now,
        )?;
        registry.club(club)?;
        if !thresholds.is_valid() {
            return Err(LedgerError::invalid_input(format!(
                "invalid tier thresholds {thresholds:?}"
            )));
        }
        self.thresholds.insert(club, thresholds);
        tracing::info!(
            club = %club,
            elevated = thresholds.elevated,
            flagship = thresholds.flagship,
            "Badge tier thresholds updated"
        );
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────────────

    #[must_use]
    pub fn badge(&self, id: BadgeId) -> Option<&Badge> {
        self.badges.get(&id)
    }

    pub fn badges(&self) -> impl Iterator<Item = &Badge> {
        self.badges.values()
    }

    pub fn badges_of<'a>(&'a self, owner: &'a AccountId) -> impl Iterator<Item = &'a Badge> + 'a {
        self.badges.values().filter(move |b| &b.owner == owner)
    }

    /// Club-specific thresholds that differ from the default.
    pub fn club_thresholds(&self) -> impl Iterator<Item = (&ClubId, &TierThresholds)> {
        self.thresholds.iter()
    }
}
