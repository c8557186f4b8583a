//! Capability grants issued by the external governance layer.
//!
//! The ledger never tallies votes. It only checks that a presented grant
//! names the right component, action and target, and has not expired. Each
//! grant id is accepted at most once; that bookkeeping lives with the ledger.

use serde::{Deserialize, Serialize};

use crate::{
    AccountId, ClubId, EpochId, GrantId, LedgerError, OfficerApproval, ResourceType, WithdrawalId,
};

/// The ledger component a grant is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantScope {
    MembershipRegistry,
    BadgeLedger,
    RewardLedger,
    ReservationManager,
    TreasuryController,
}

/// The action a grant authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantAction {
    CreateClub,
    GrantOfficer,
    RevokeOfficer,
    SetQuorumThreshold,
    MintReward,
    SetSupplyCap,
    AuthorizeSettler,
    RevokeSettler,
    ApproveWithdrawal,
    VetoWithdrawal,
    AddTreasurySigner,
    RemoveTreasurySigner,
}

/// The object a grant is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantTarget {
    Club(ClubId),
    Member { club: ClubId, account: AccountId },
    Account(AccountId),
    Withdrawal(WithdrawalId),
    Resource(ResourceType),
    /// Ledger-wide settings (supply cap, treasury threshold).
    Ledger,
}

/// A single-use capability produced by a governance decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceGrant {
    pub id: GrantId,
    pub scope: GrantScope,
    pub action: GrantAction,
    pub target: GrantTarget,
    /// Last epoch in which the grant may be used.
    pub expires_at: EpochId,
}

impl GovernanceGrant {
    /// Check that this grant authorizes `action` on `target` within `scope` at `now`.
    ///
    /// Does not check single-use; the caller tracks consumed ids.
    ///
    /// # Errors
    /// `Unauthorized` on any mismatch or if the grant has expired.
    pub fn check(
        &self,
        scope: GrantScope,
        action: GrantAction,
        target: &GrantTarget,
        now: EpochId,
    ) -> crate::Result<()> {
        if self.scope != scope || self.action != action {
            return Err(LedgerError::unauthorized(format!(
                "{} is for {:?}/{:?}, not {:?}/{:?}",
                self.id, self.scope, self.action, scope, action
            )));
        }
        if &self.target != target {
            return Err(LedgerError::unauthorized(format!(
                "{} targets {:?}, not {:?}",
                self.id, self.target, target
            )));
        }
        if now > self.expires_at {
            return Err(LedgerError::unauthorized(format!(
                "{} expired at {}, now {}",
                self.id, self.expires_at, now
            )));
        }
        Ok(())
    }
}

/// Test grant that never expires. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl GovernanceGrant {
    pub fn dummy(id: u64, scope: GrantScope, action: GrantAction, target: GrantTarget) -> Self {
        Self {
            id: GrantId(id),
            scope,
            action,
            target,
            expires_at: EpochId(u64::MAX),
        }
    }
}

/// Authority presented for an officer-list change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Authority {
    /// Signed approval from current officers of the club.
    Officers(OfficerApproval),
    /// An external governance grant.
    Governance(GovernanceGrant),
}

impl Authority {
    /// The grant carried by this authority, if any.
    #[must_use]
    pub fn grant(&self) -> Option<&GovernanceGrant> {
        match self {
            Self::Officers(_) => None,
            Self::Governance(grant) => Some(grant),
        }
    }

    #[must_use]
    pub fn approval(&self) -> Option<&OfficerApproval> {
        match self {
            Self::Officers(approval) => Some(approval),
            Self::Governance(_) => None,
        }
    }
}
