//! Operations: the only way to change a [`Ledger`].
//!
//! Each [`Operation`] is applied to a private copy of the committed state,
//! the cross-component invariants are checked, and only then does the copy
//! replace the committed state. A rejected operation leaves no trace: no
//! balance change, no consumed nonce, no consumed grant, no event.

use std::collections::BTreeMap;

use clubledger_authority::{BadgeRequest, MembershipRegistry, RoleAuthority};
use clubledger_funds::MintCause;
use clubledger_types::{
    AccountId, Amount, ApprovalSource, ApprovedAction, AttestationClaim, Authority, BadgeId,
    BadgeTier, ClubId, ContentDigest, Disposition, EpochId, GovernanceGrant, LedgerError,
    LedgerEvent, MemberStatus, MintSource, OfficerApproval, OfficerKey, ReservationId,
    ReservationStatus, ResourceType, Result, TierThresholds, WithdrawalId, WithdrawalStatus,
};
use serde::{Deserialize, Serialize};

use crate::ledger::{Ledger, SweepReport};

/// A state transition submitted by the surrounding transaction layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    // --- Membership ---
    CreateClub {
        id: ClubId,
        name: String,
        founders: BTreeMap<AccountId, OfficerKey>,
        metadata: Option<ContentDigest>,
        grant: GovernanceGrant,
    },
    RegisterMembership {
        account: AccountId,
        club: ClubId,
        attested_by: Option<AccountId>,
    },
    GrantOfficerRole {
        club: ClubId,
        account: AccountId,
        key: OfficerKey,
        authority: Authority,
    },
    RevokeOfficerRole {
        club: ClubId,
        account: AccountId,
        authority: Authority,
    },
    SetMemberStatus {
        club: ClubId,
        account: AccountId,
        status: MemberStatus,
        officer: AccountId,
    },
    SetOfficerQuorum {
        club: ClubId,
        quorum: usize,
        grant: GovernanceGrant,
    },

    // --- Rewards ---
    SubmitClaim(AttestationClaim),
    /// Burn an unredeemed claim's nonce without minting.
    RevokeClaim {
        club: ClubId,
        officer: AccountId,
        epoch: EpochId,
        nonce: u64,
        approval: OfficerApproval,
    },
    GovernanceMint {
        account: AccountId,
        amount: Amount,
        grant: GovernanceGrant,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
    Burn {
        account: AccountId,
        amount: Amount,
    },
    FundTreasury {
        from: AccountId,
        amount: Amount,
    },
    SetSupplyCap {
        cap: Option<Amount>,
        grant: GovernanceGrant,
    },

    // --- Badges ---
    IssueBadge {
        club: ClubId,
        owner: AccountId,
        tier: BadgeTier,
        soulbound: bool,
        metadata_hash: ContentDigest,
        approval: OfficerApproval,
    },
    RevokeBadge {
        id: BadgeId,
        approval: OfficerApproval,
    },
    TransferBadge {
        id: BadgeId,
        from: AccountId,
        to: AccountId,
    },
    SetTierThresholds {
        club: ClubId,
        thresholds: TierThresholds,
        grant: GovernanceGrant,
    },

    // --- Reservations ---
    Reserve {
        account: AccountId,
        resource: ResourceType,
        amount: Amount,
        duration: u64,
    },
    /// Settlement callback from the resource provider.
    Settle {
        id: ReservationId,
        disposition: Disposition,
        settler: AccountId,
    },
    AuthorizeSettler {
        resource: ResourceType,
        settler: AccountId,
        grant: GovernanceGrant,
    },
    RevokeSettler {
        resource: ResourceType,
        settler: AccountId,
        grant: GovernanceGrant,
    },

    // --- Treasury ---
    ProposeWithdrawal {
        amount: Amount,
        destination: AccountId,
        proposer: AccountId,
    },
    ApproveWithdrawal {
        id: WithdrawalId,
        signer: AccountId,
    },
    GovernanceApproveWithdrawal {
        id: WithdrawalId,
        grant: GovernanceGrant,
    },
    ExecuteWithdrawal {
        id: WithdrawalId,
    },
    CancelWithdrawal {
        id: WithdrawalId,
        proposer: AccountId,
    },
    VetoWithdrawal {
        id: WithdrawalId,
        grant: GovernanceGrant,
    },
    ReproposeWithdrawal {
        id: WithdrawalId,
        proposer: AccountId,
    },
    SetTreasuryThreshold {
        threshold: usize,
        grant: GovernanceGrant,
    },
    AddTreasurySigner {
        account: AccountId,
        grant: GovernanceGrant,
    },
    RemoveTreasurySigner {
        account: AccountId,
        grant: GovernanceGrant,
    },

    // --- Epoch ---
    AdvanceEpoch {
        to: EpochId,
    },
    Sweep,
}

impl Operation {
    /// The governance grant this operation spends, if any.
    #[must_use]
    pub fn grant(&self) -> Option<&GovernanceGrant> {
        match self {
            Self::CreateClub { grant, .. }
            | Self::SetOfficerQuorum { grant, .. }
            | Self::GovernanceMint { grant, .. }
            | Self::SetSupplyCap { grant, .. }
            | Self::SetTierThresholds { grant, .. }
            | Self::AuthorizeSettler { grant, .. }
            | Self::RevokeSettler { grant, .. }
            | Self::GovernanceApproveWithdrawal { grant, .. }
            | Self::VetoWithdrawal { grant, .. }
            | Self::SetTreasuryThreshold { grant, .. }
            | Self::AddTreasurySigner { grant, .. }
            | Self::RemoveTreasurySigner { grant, .. } => Some(grant),
            Self::GrantOfficerRole { authority, .. } | Self::RevokeOfficerRole { authority, .. } => {
                authority.grant()
            }
            _ => None,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateClub { .. } => "create_club",
            Self::RegisterMembership { .. } => "register_membership",
            Self::GrantOfficerRole { .. } => "grant_officer_role",
            Self::RevokeOfficerRole { .. } => "revoke_officer_role",
            Self::SetMemberStatus { .. } => "set_member_status",
            Self::SetOfficerQuorum { .. } => "set_officer_quorum",
            Self::SubmitClaim(_) => "submit_claim",
            Self::RevokeClaim { .. } => "revoke_claim",
            Self::GovernanceMint { .. } => "governance_mint",
            Self::Transfer { .. } => "transfer",
            Self::Burn { .. } => "burn",
            Self::FundTreasury { .. } => "fund_treasury",
            Self::SetSupplyCap { .. } => "set_supply_cap",
            Self::IssueBadge { .. } => "issue_badge",
            Self::RevokeBadge { .. } => "revoke_badge",
            Self::TransferBadge { .. } => "transfer_badge",
            Self::SetTierThresholds { .. } => "set_tier_thresholds",
            Self::Reserve { .. } => "reserve",
            Self::Settle { .. } => "settle",
            Self::AuthorizeSettler { .. } => "authorize_settler",
            Self::RevokeSettler { .. } => "revoke_settler",
            Self::ProposeWithdrawal { .. } => "propose_withdrawal",
            Self::ApproveWithdrawal { .. } => "approve_withdrawal",
            Self::GovernanceApproveWithdrawal { .. } => "governance_approve_withdrawal",
            Self::ExecuteWithdrawal { .. } => "execute_withdrawal",
            Self::CancelWithdrawal { .. } => "cancel_withdrawal",
            Self::VetoWithdrawal { .. } => "veto_withdrawal",
            Self::ReproposeWithdrawal { .. } => "repropose_withdrawal",
            Self::SetTreasuryThreshold { .. } => "set_treasury_threshold",
            Self::AddTreasurySigner { .. } => "add_treasury_signer",
            Self::RemoveTreasurySigner { .. } => "remove_treasury_signer",
            Self::AdvanceEpoch { .. } => "advance_epoch",
            Self::Sweep => "sweep",
        }
    }
}

/// Result of a committed operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Committed; nothing further to report.
    Applied,
    Minted {
        account: AccountId,
        amount: Amount,
        total_supply: Amount,
    },
    BadgeIssued(BadgeId),
    Reserved {
        id: ReservationId,
        expires_at: EpochId,
    },
    ReservationSettled {
        id: ReservationId,
        status: ReservationStatus,
    },
    WithdrawalProposed(WithdrawalId),
    Withdrawal {
        id: WithdrawalId,
        status: WithdrawalStatus,
    },
    Swept(SweepReport),
}

impl Ledger {
    /// Apply `op` atomically.
    ///
    /// # Errors
    /// Whatever the operation is rejected with. `self` is unchanged on error.
    pub fn apply(&mut self, op: Operation) -> Result<Outcome> {
        let (next, outcome) = self.stage(op)?;
        *self = next;
        Ok(outcome)
    }

    /// Apply `op` to a copy of this ledger and return the copy.
    ///
    /// # Errors
    /// Whatever the operation is rejected with, or `ConservationViolation`.
    pub fn stage(&self, op: Operation) -> Result<(Self, Outcome)> {
        let kind = op.kind();
        let mut next = self.clone();
        let outcome = match next.execute(op) {
            Ok(outcome) => outcome,
            Err(e) => {
                if matches!(
                    e,
                    LedgerError::Unauthorized { .. }
                        | LedgerError::InvalidSignature { .. }
                        | LedgerError::NonceReplay { .. }
                        | LedgerError::GrantAlreadyUsed(_)
                ) {
                    tracing::warn!(op = kind, error = %e, "Operation rejected");
                } else {
                    tracing::debug!(op = kind, error = %e, "Operation rejected");
                }
                return Err(e);
            }
        };
        next.verify_invariants()?;
        tracing::debug!(
            op = kind,
            events = next.events.len(),
            epoch = %next.epoch,
            "Operation committed"
        );
        Ok((next, outcome))
    }

    /// Apply operations in order, each one atomically. A rejected operation
    /// does not stop the ones after it.
    pub fn apply_all(&mut self, ops: impl IntoIterator<Item = Operation>) -> Vec<Result<Outcome>> {
        ops.into_iter().map(|op| self.apply(op)).collect()
    }

    fn execute(&mut self, op: Operation) -> Result<Outcome> {
        let grant = op.grant().cloned();
        if let Some(grant) = &grant {
            self.grants.ensure_unused(grant)?;
        }
        let outcome = self.dispatch(op)?;
        if let Some(grant) = grant {
            self.grants.consume(&grant)?;
            self.emit(LedgerEvent::GrantConsumed { grant: grant.id });
        }
        Ok(outcome)
    }

    #[allow(clippy::too_many_lines)]
    fn dispatch(&mut self, op: Operation) -> Result<Outcome> {
        let now = self.epoch;
        match op {
            // ── Membership ────────────────────────────────────────────
            Operation::CreateClub {
                id,
                name,
                founders,
                metadata,
                grant,
            } => {
                self.registry
                    .create_club(id, &name, &founders, metadata, &grant, now)?;
                self.emit(LedgerEvent::ClubCreated { club: id, name });
                for account in founders.into_keys() {
                    self.emit(LedgerEvent::OfficerGranted { club: id, account });
                }
                Ok(Outcome::Applied)
            }
            Operation::RegisterMembership {
                account,
                club,
                attested_by,
            } => {
                self.registry
                    .register_membership(account, club, attested_by, now)?;
                self.emit(LedgerEvent::MembershipRegistered {
                    account,
                    club,
                    attested_by,
                });
                Ok(Outcome::Applied)
            }
            Operation::GrantOfficerRole {
                club,
                account,
                key,
                authority,
            } => {
                let action = ApprovedAction::GrantOfficer { account, key };
                self.change_role(club, &action, &authority, |registry, auth| {
                    registry.grant_officer_role(club, account, key, auth, now)
                })?;
                self.emit(LedgerEvent::OfficerGranted { club, account });
                Ok(Outcome::Applied)
            }
            Operation::RevokeOfficerRole {
                club,
                account,
                authority,
            } => {
                let action = ApprovedAction::RevokeOfficer { account };
                self.change_role(club, &action, &authority, |registry, auth| {
                    registry.revoke_officer_role(club, account, auth, now)
                })?;
                self.emit(LedgerEvent::OfficerRevoked { club, account });
                Ok(Outcome::Applied)
            }
            Operation::SetMemberStatus {
                club,
                account,
                status,
                officer,
            } => {
                self.registry
                    .set_member_status(club, account, status, officer, now)?;
                self.emit(LedgerEvent::MemberStatusChanged {
                    club,
                    account,
                    status,
                });
                Ok(Outcome::Applied)
            }
            Operation::SetOfficerQuorum {
                club,
                quorum,
                grant,
            } => {
                self.registry.set_officer_quorum(club, quorum, &grant, now)?;
                self.emit(LedgerEvent::OfficerQuorumSet { club, quorum });
                Ok(Outcome::Applied)
            }

            // ── Rewards ───────────────────────────────────────────────
            Operation::SubmitClaim(claim) => {
                // Check, mint, then record: a rejected mint leaves the nonce free.
                let validated = self.verifier.check(&claim, &self.registry, now)?;
                let (account, amount) = (validated.beneficiary(), validated.amount());
                self.rewards
                    .mint(account, amount, MintCause::Claim(&validated), now)?;
                self.verifier.record(&validated)?;
                self.emit(LedgerEvent::Minted {
                    account,
                    amount,
                    source: MintSource::Claim {
                        officer: validated.officer(),
                        nonce: validated.nonce(),
                    },
                });
                Ok(Outcome::Minted {
                    account,
                    amount,
                    total_supply: self.rewards.total_supply(),
                })
            }
            Operation::RevokeClaim {
                club,
                officer,
                epoch,
                nonce,
                approval,
            } => {
                let action = ApprovedAction::RevokeClaim {
                    officer,
                    epoch,
                    nonce,
                };
                let validated = self
                    .verifier
                    .check_approval(club, &action, &approval, &self.registry, now)?;
                self.verifier.revoke_claim(&validated, &self.registry, now)?;
                self.verifier.record_approval(&validated)?;
                self.emit(LedgerEvent::ClaimRevoked {
                    club,
                    officer,
                    epoch,
                    nonce,
                });
                Ok(Outcome::Applied)
            }
            Operation::GovernanceMint {
                account,
                amount,
                grant,
            } => {
                self.rewards
                    .mint(account, amount, MintCause::Governance(&grant), now)?;
                self.emit(LedgerEvent::Minted {
                    account,
                    amount,
                    source: MintSource::Governance(grant.id),
                });
                Ok(Outcome::Minted {
                    account,
                    amount,
                    total_supply: self.rewards.total_supply(),
                })
            }
            Operation::Transfer { from, to, amount } => {
                self.rewards.transfer(from, to, amount)?;
                self.emit(LedgerEvent::Transferred { from, to, amount });
                Ok(Outcome::Applied)
            }
            Operation::Burn { account, amount } => {
                self.rewards.burn(account, amount)?;
                self.emit(LedgerEvent::Burned { account, amount });
                Ok(Outcome::Applied)
            }
            Operation::FundTreasury { from, amount } => {
                self.rewards.fund_treasury(from, amount)?;
                self.emit(LedgerEvent::TreasuryFunded { from, amount });
                Ok(Outcome::Applied)
            }
            Operation::SetSupplyCap { cap, grant } => {
                self.rewards.set_supply_cap(cap, &grant, now)?;
                self.emit(LedgerEvent::SupplyCapSet { cap });
                Ok(Outcome::Applied)
            }

            // ── Badges ────────────────────────────────────────────────
            Operation::IssueBadge {
                club,
                owner,
                tier,
                soulbound,
                metadata_hash,
                approval,
            } => {
                let request = BadgeRequest {
                    club,
                    owner,
                    tier,
                    soulbound,
                    metadata_hash,
                };
                let validated = self.verifier.check_approval(
                    club,
                    &request.action(),
                    &approval,
                    &self.registry,
                    now,
                )?;
                let id = self.badges.issue(request, &validated, &self.registry, now)?;
                self.verifier.record_approval(&validated)?;
                self.emit(LedgerEvent::BadgeIssued {
                    id,
                    club,
                    owner,
                    tier,
                });
                Ok(Outcome::BadgeIssued(id))
            }
            Operation::RevokeBadge { id, approval } => {
                let (club, action) = self.badges.revoke_action(id)?;
                let validated = self
                    .verifier
                    .check_approval(club, &action, &approval, &self.registry, now)?;
                self.badges.revoke(id, &validated, &self.registry, now)?;
                self.verifier.record_approval(&validated)?;
                self.emit(LedgerEvent::BadgeRevoked { id });
                Ok(Outcome::Applied)
            }
            Operation::TransferBadge { id, from, to } => {
                self.badges.transfer(id, from, to, now)?;
                self.emit(LedgerEvent::BadgeTransferred { id, from, to });
                Ok(Outcome::Applied)
            }
            Operation::SetTierThresholds {
                club,
                thresholds,
                grant,
            } => {
                self.badges
                    .set_thresholds(club, thresholds, &grant, &self.registry, now)?;
                self.emit(LedgerEvent::TierThresholdsSet { club, thresholds });
                Ok(Outcome::Applied)
            }

            // ── Reservations ──────────────────────────────────────────
            Operation::Reserve {
                account,
                resource,
                amount,
                duration,
            } => {
                let id = self.reservations.reserve(
                    &mut self.rewards,
                    account,
                    resource.clone(),
                    amount,
                    duration,
                    now,
                )?;
                let expires_at = now.after(duration);
                self.emit(LedgerEvent::ReservationCreated {
                    id,
                    account,
                    resource,
                    amount,
                    expires_at,
                });
                Ok(Outcome::Reserved { id, expires_at })
            }
            Operation::Settle {
                id,
                disposition,
                settler,
            } => {
                let status =
                    self.reservations
                        .release(&mut self.rewards, id, disposition, settler, now)?;
                self.emit(LedgerEvent::ReservationSettled { id, status });
                Ok(Outcome::ReservationSettled { id, status })
            }
            Operation::AuthorizeSettler {
                resource,
                settler,
                grant,
            } => {
                self.reservations
                    .authorize_settler(resource.clone(), settler, &grant, now)?;
                self.emit(LedgerEvent::SettlerAuthorized { resource, settler });
                Ok(Outcome::Applied)
            }
            Operation::RevokeSettler {
                resource,
                settler,
                grant,
            } => {
                self.reservations
                    .revoke_settler(&resource, settler, &grant, now)?;
                self.emit(LedgerEvent::SettlerRevoked { resource, settler });
                Ok(Outcome::Applied)
            }

            // ── Treasury ──────────────────────────────────────────────
            Operation::ProposeWithdrawal {
                amount,
                destination,
                proposer,
            } => {
                let id = self.treasury.propose(amount, destination, proposer, now)?;
                self.emit(LedgerEvent::WithdrawalProposed {
                    id,
                    amount,
                    destination,
                    reproposal_of: None,
                });
                Ok(Outcome::WithdrawalProposed(id))
            }
            Operation::ApproveWithdrawal { id, signer } => {
                let status = self.treasury.approve(id, signer, now)?;
                self.after_approval(id, ApprovalSource::Signer(signer), status)
            }
            Operation::GovernanceApproveWithdrawal { id, grant } => {
                let status = self.treasury.approve_with_grant(id, &grant, now)?;
                self.after_approval(id, ApprovalSource::Governance, status)
            }
            Operation::ExecuteWithdrawal { id } => {
                self.treasury.execute(id, &mut self.rewards, now)?;
                let (amount, destination) = self
                    .treasury
                    .get(&id)
                    .map(|w| (w.amount, w.destination))
                    .ok_or(LedgerError::WithdrawalNotFound(id))?;
                self.emit(LedgerEvent::WithdrawalExecuted {
                    id,
                    amount,
                    destination,
                });
                Ok(Outcome::Withdrawal {
                    id,
                    status: WithdrawalStatus::Executed,
                })
            }
            Operation::CancelWithdrawal { id, proposer } => {
                self.treasury.cancel(id, proposer, now)?;
                self.emit(LedgerEvent::WithdrawalCancelled { id, vetoed: false });
                Ok(Outcome::Withdrawal {
                    id,
                    status: WithdrawalStatus::Cancelled,
                })
            }
            Operation::VetoWithdrawal { id, grant } => {
                self.treasury.veto(id, &grant, now)?;
                self.emit(LedgerEvent::WithdrawalCancelled { id, vetoed: true });
                Ok(Outcome::Withdrawal {
                    id,
                    status: WithdrawalStatus::Cancelled,
                })
            }
            Operation::ReproposeWithdrawal { id, proposer } => {
                let new_id = self.treasury.repropose(id, proposer, now)?;
                let (amount, destination) = self
                    .treasury
                    .get(&new_id)
                    .map(|w| (w.amount, w.destination))
                    .ok_or(LedgerError::WithdrawalNotFound(new_id))?;
                self.emit(LedgerEvent::WithdrawalProposed {
                    id: new_id,
                    amount,
                    destination,
                    reproposal_of: Some(id),
                });
                Ok(Outcome::WithdrawalProposed(new_id))
            }
            Operation::SetTreasuryThreshold { threshold, grant } => {
                self.treasury.set_quorum_threshold(threshold, &grant, now)?;
                self.emit(LedgerEvent::TreasuryThresholdSet { threshold });
                Ok(Outcome::Applied)
            }
            Operation::AddTreasurySigner { account, grant } => {
                self.treasury.add_signer(account, &grant, now)?;
                self.emit(LedgerEvent::TreasurySignerAdded { account });
                Ok(Outcome::Applied)
            }
            Operation::RemoveTreasurySigner { account, grant } => {
                self.treasury.remove_signer(account, &grant, now)?;
                self.emit(LedgerEvent::TreasurySignerRemoved { account });
                Ok(Outcome::Applied)
            }

            // ── Epoch ─────────────────────────────────────────────────
            Operation::AdvanceEpoch { to } => self.advance_epoch(to).map(Outcome::Swept),
            Operation::Sweep => self.sweep().map(Outcome::Swept),
        }
    }

    /// Verify `authority` for `action` and run the registry change under it.
    /// Officer approvals consume their nonces only once the change succeeds.
    fn change_role(
        &mut self,
        club: ClubId,
        action: &ApprovedAction,
        authority: &Authority,
        change: impl FnOnce(&mut MembershipRegistry, RoleAuthority<'_>) -> Result<()>,
    ) -> Result<()> {
        match authority {
            Authority::Officers(approval) => {
                let validated = self.verifier.check_approval(
                    club,
                    action,
                    approval,
                    &self.registry,
                    self.epoch,
                )?;
                change(&mut self.registry, RoleAuthority::Officers(&validated))?;
                self.verifier.record_approval(&validated)
            }
            Authority::Governance(grant) => {
                change(&mut self.registry, RoleAuthority::Governance(grant))
            }
        }
    }

    fn after_approval(
        &mut self,
        id: WithdrawalId,
        source: ApprovalSource,
        status: WithdrawalStatus,
    ) -> Result<Outcome> {
        let request = self
            .treasury
            .get(&id)
            .ok_or(LedgerError::WithdrawalNotFound(id))?;
        let approvals = request.approvals.len();
        let window = request.timelock_until.zip(request.deadline);
        self.emit(LedgerEvent::WithdrawalApproved {
            id,
            source,
            approvals,
        });
        if status == WithdrawalStatus::Timelocked {
            if let Some((timelock_until, deadline)) = window {
                self.emit(LedgerEvent::WithdrawalTimelocked {
                    id,
                    timelock_until,
                    deadline,
                });
            }
        }
        Ok(Outcome::Withdrawal { id, status })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubledger_types::{GrantAction, GrantScope, GrantTarget};

    #[test]
    fn grant_extraction() {
        let grant = GovernanceGrant::dummy(
            7,
            GrantScope::RewardLedger,
            GrantAction::MintReward,
            GrantTarget::Account(AccountId::from_seed(1)),
        );
        let op = Operation::GovernanceMint {
            account: AccountId::from_seed(1),
            amount: 10,
            grant: grant.clone(),
        };
        assert_eq!(op.grant(), Some(&grant));

        let by_officers = Operation::RevokeOfficerRole {
            club: ClubId(1),
            account: AccountId::from_seed(2),
            authority: Authority::Officers(OfficerApproval::new(EpochId(1), 0)),
        };
        assert_eq!(by_officers.grant(), None);

        let by_governance = Operation::RevokeOfficerRole {
            club: ClubId(1),
            account: AccountId::from_seed(2),
            authority: Authority::Governance(grant.clone()),
        };
        assert_eq!(by_governance.grant(), Some(&grant));
        assert_eq!(Operation::Sweep.grant(), None);
    }

    #[test]
    fn operations_round_trip_as_json() {
        let op = Operation::Reserve {
            account: AccountId::from_seed(1),
            resource: ResourceType::new("GPU"),
            amount: 500,
            duration: 10,
        };
        let json = serde_json::to_string(&op).unwrap();
        let back: Operation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, op);
        assert_eq!(back.kind(), "reserve");
    }
}
