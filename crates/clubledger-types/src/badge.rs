//! Badge (credential) records and the tiered quorum rules that govern them.
//!
//! ## Tier → authorization
//!
//! | Tier | Rule |
//! |---|---|
//! | `Basic` | any single current officer |
//! | `Elevated` | `TierThresholds::elevated` distinct officers |
//! | `Flagship` | `TierThresholds::flagship` distinct officers |
//!
//! Revocation requires the same rule as issuance, evaluated against the
//! club's thresholds at the time of revocation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AccountId, BadgeId, ClubId, EpochId, QuorumId, constants, ids::hex_bytes};

/// 32-byte digest of off-chain metadata. Only the hash is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentDigest(#[serde(with = "hex_bytes")] pub [u8; 32]);

/// Badge tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum BadgeTier {
    Basic,
    Elevated,
    Flagship,
}

/// The authorization rule a tier carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumRule {
    /// One current officer suffices.
    AnyOfficer,
    /// At least this many distinct current officers.
    Threshold(usize),
}

impl QuorumRule {
    /// Distinct approvals required under this rule.
    #[must_use]
    pub fn required(&self) -> usize {
        match self {
            Self::AnyOfficer => 1,
            Self::Threshold(n) => *n,
        }
    }
}

/// Per-club approval thresholds for the quorum tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierThresholds {
    pub elevated: usize,
    pub flagship: usize,
}

impl TierThresholds {
    /// Both thresholds must be at least 1 and Flagship never below Elevated.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.elevated >= 1 && self.flagship >= self.elevated
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            elevated: constants::DEFAULT_ELEVATED_QUORUM,
            flagship: constants::DEFAULT_FLAGSHIP_QUORUM,
        }
    }
}

impl BadgeTier {
    #[must_use]
    pub fn quorum_rule(&self, thresholds: &TierThresholds) -> QuorumRule {
        match self {
            Self::Basic => QuorumRule::AnyOfficer,
            Self::Elevated => QuorumRule::Threshold(thresholds.elevated),
            Self::Flagship => QuorumRule::Threshold(thresholds.flagship),
        }
    }
}

impl std::fmt::Display for BadgeTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Basic => write!(f, "BASIC"),
            Self::Elevated => write!(f, "ELEVATED"),
            Self::Flagship => write!(f, "FLAGSHIP"),
        }
    }
}

/// Who authorized a badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provenance {
    Officer(AccountId),
    Quorum {
        id: QuorumId,
        approvers: BTreeSet<AccountId>,
    },
}

/// Record of a completed ownership change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTransfer {
    pub from: AccountId,
    pub to: AccountId,
    pub epoch: EpochId,
}

/// An issued credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub owner: AccountId,
    pub club: ClubId,
    pub tier: BadgeTier,
    /// Soulbound badges never change owner.
    pub soulbound: bool,
    pub metadata_hash: ContentDigest,
    pub provenance: Provenance,
    pub issued_at: EpochId,
    pub revoked: bool,
    pub revoked_at: Option<EpochId>,
    pub transfers: Vec<BadgeTransfer>,
}

impl Badge {
    /// Mark the badge revoked. Revocation is permanent.
    ///
    /// # Errors
    /// `BadgeRevoked` if already revoked.
    pub fn mark_revoked(&mut self, now: EpochId) -> crate::Result<()> {
        if self.revoked {
            return Err(crate::LedgerError::BadgeRevoked(self.id));
        }
        self.revoked = true;
        self.revoked_at = Some(now);
        Ok(())
    }
}
