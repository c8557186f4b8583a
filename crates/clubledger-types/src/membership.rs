//! Club, membership and officer-authority records.

use std::collections::{BTreeMap, BTreeSet};

use ed25519_dalek::VerifyingKey;
use serde::{Deserialize, Serialize};

use crate::{AccountId, ClubId, ContentDigest, EpochId, GrantId, LedgerError, ids::hex_bytes};

/// Role an account holds within a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    Member,
    Officer,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member => write!(f, "MEMBER"),
            Self::Officer => write!(f, "OFFICER"),
        }
    }
}

/// Standing of a membership. Records are never deleted; `Removed` is the
/// terminal marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberStatus {
    Active,
    Suspended,
    Removed,
}

impl MemberStatus {
    /// `Removed` is final; `Active` and `Suspended` may flip between each other.
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Suspended | Self::Removed)
                | (Self::Suspended, Self::Active | Self::Removed)
        )
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Suspended => write!(f, "SUSPENDED"),
            Self::Removed => write!(f, "REMOVED"),
        }
    }
}

/// What authorized a membership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSource {
    /// Genesis configuration.
    Genesis,
    /// Plain registration, optionally vouched for by an officer.
    Attestation(Option<AccountId>),
    /// A single officer acting alone (status changes).
    Officer(AccountId),
    /// A quorum of the club's officers acting together.
    OfficerQuorum(BTreeSet<AccountId>),
    /// An external governance grant.
    Governance(GrantId),
}

/// One entry of the append-only membership history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipChange {
    pub epoch: EpochId,
    pub role: Role,
    pub status: MemberStatus,
    pub source: ChangeSource,
}

/// The (account, club) membership fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub account: AccountId,
    pub club: ClubId,
    pub role: Role,
    pub status: MemberStatus,
    /// Officer who vouched for the registration, if any.
    pub attested_by: Option<AccountId>,
    pub attested_at: EpochId,
    /// Every role/status change, oldest first. Never truncated.
    pub history: Vec<MembershipChange>,
}

impl Membership {
    /// A new membership with its first history entry already recorded.
    #[must_use]
    pub fn new(
        account: AccountId,
        club: ClubId,
        role: Role,
        attested_by: Option<AccountId>,
        now: EpochId,
        source: ChangeSource,
    ) -> Self {
        Self {
            account,
            club,
            role,
            status: MemberStatus::Active,
            attested_by,
            attested_at: now,
            history: vec![MembershipChange {
                epoch: now,
                role,
                status: MemberStatus::Active,
                source,
            }],
        }
    }

    /// Overwrite role and status, appending the change to history.
    pub fn record_change(
        &mut self,
        role: Role,
        status: MemberStatus,
        now: EpochId,
        source: ChangeSource,
    ) {
        self.role = role;
        self.status = status;
        self.history.push(MembershipChange {
            epoch: now,
            role,
            status,
            source,
        });
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }
}

/// Raw ed25519 public key registered for an officer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OfficerKey(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl OfficerKey {
    /// Decode into a usable verifying key.
    ///
    /// # Errors
    /// `InvalidSignature` if the bytes are not a valid curve point.
    pub fn verifying_key(&self) -> crate::Result<VerifyingKey> {
        VerifyingKey::from_bytes(&self.0).map_err(|e| LedgerError::InvalidSignature {
            reason: format!("malformed officer key: {e}"),
        })
    }
}

impl From<VerifyingKey> for OfficerKey {
    fn from(key: VerifyingKey) -> Self {
        Self(key.to_bytes())
    }
}

/// A club and its officer authority list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: ClubId,
    pub name: String,
    /// Current officers and their registered signing keys.
    pub officers: BTreeMap<AccountId, OfficerKey>,
    /// Co-signers required to change the officer list.
    pub officer_quorum: usize,
    pub member_count: u64,
    pub metadata: Option<ContentDigest>,
    pub created_at: EpochId,
}

impl Club {
    #[must_use]
    pub fn is_officer(&self, account: &AccountId) -> bool {
        self.officers.contains_key(account)
    }

    #[must_use]
    pub fn officer_key(&self, account: &AccountId) -> Option<&OfficerKey> {
        self.officers.get(account)
    }

    /// Approvals needed for an officer-role change: the configured quorum,
    /// capped at the current officer count and never below one.
    #[must_use]
    pub fn role_change_quorum(&self) -> usize {
        self.officer_quorum.min(self.officers.len()).max(1)
    }

    /// Officers in `approvers` that are not current officers of this club.
    #[must_use]
    pub fn non_officers<'a>(&self, approvers: &'a BTreeSet<AccountId>) -> Vec<&'a AccountId> {
        approvers.iter().filter(|a| !self.is_officer(a)).collect()
    }
}
