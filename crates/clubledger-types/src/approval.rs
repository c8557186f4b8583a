//! Signed officer approvals for badge, role and claim-revocation actions.
//!
//! Every co-signer signs the same canonical payload:
//!
//! `"clubledger:approval:v1:" || club_le || epoch_le || nonce_le || action`
//!
//! where `action` is a tag byte followed by the action's fixed-width fields.
//! The payload binds the club, the exact target and, for badges, the tier,
//! so a signature for one action never authorizes another.

use std::collections::BTreeSet;

use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};

use crate::{AccountId, BadgeId, BadgeTier, ClubId, ContentDigest, EpochId, OfficerKey, constants};

/// The action a set of officers is approving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovedAction {
    IssueBadge {
        owner: AccountId,
        tier: BadgeTier,
        soulbound: bool,
        metadata_hash: ContentDigest,
    },
    RevokeBadge {
        badge: BadgeId,
        tier: BadgeTier,
    },
    GrantOfficer {
        account: AccountId,
        key: OfficerKey,
    },
    RevokeOfficer {
        account: AccountId,
    },
    /// Burn `(officer, epoch, nonce)` so the claim can never be redeemed.
    RevokeClaim {
        officer: AccountId,
        epoch: EpochId,
        nonce: u64,
    },
}

impl ApprovedAction {
    fn tier_byte(tier: BadgeTier) -> u8 {
        match tier {
            BadgeTier::Basic => 0,
            BadgeTier::Elevated => 1,
            BadgeTier::Flagship => 2,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::IssueBadge {
                owner,
                tier,
                soulbound,
                metadata_hash,
            } => {
                out.push(1);
                out.extend_from_slice(owner.as_bytes());
                out.push(Self::tier_byte(*tier));
                out.push(u8::from(*soulbound));
                out.extend_from_slice(&metadata_hash.0);
            }
            Self::RevokeBadge { badge, tier } => {
                out.push(2);
                out.extend_from_slice(&badge.0.to_le_bytes());
                out.push(Self::tier_byte(*tier));
            }
            Self::GrantOfficer { account, key } => {
                out.push(3);
                out.extend_from_slice(account.as_bytes());
                out.extend_from_slice(&key.0);
            }
            Self::RevokeOfficer { account } => {
                out.push(4);
                out.extend_from_slice(account.as_bytes());
            }
            Self::RevokeClaim {
                officer,
                epoch,
                nonce,
            } => {
                out.push(5);
                out.extend_from_slice(officer.as_bytes());
                out.extend_from_slice(&epoch.0.to_le_bytes());
                out.extend_from_slice(&nonce.to_le_bytes());
            }
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::IssueBadge { .. } => "issue_badge",
            Self::RevokeBadge { .. } => "revoke_badge",
            Self::GrantOfficer { .. } => "grant_officer",
            Self::RevokeOfficer { .. } => "revoke_officer",
            Self::RevokeClaim { .. } => "revoke_claim",
        }
    }
}

/// Canonical bytes each co-signer signs.
#[must_use]
pub fn approval_payload(club: ClubId, action: &ApprovedAction, epoch: EpochId, nonce: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(constants::APPROVAL_DOMAIN.len() + 4 + 8 + 8 + 1 + 72);
    payload.extend_from_slice(constants::APPROVAL_DOMAIN);
    payload.extend_from_slice(&club.0.to_le_bytes());
    payload.extend_from_slice(&epoch.0.to_le_bytes());
    payload.extend_from_slice(&nonce.to_le_bytes());
    action.encode_into(&mut payload);
    payload
}

/// One officer's ed25519 signature over an approval payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerSignature {
    pub officer: AccountId,
    pub signature: Vec<u8>,
}

/// Co-signatures for a single action.
///
/// `(officer, epoch, nonce)` is consumed for every signer when the action
/// commits, so an approval cannot be replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfficerApproval {
    pub epoch: EpochId,
    pub nonce: u64,
    pub signatures: Vec<OfficerSignature>,
}

impl OfficerApproval {
    /// An approval with no signatures yet.
    #[must_use]
    pub fn new(epoch: EpochId, nonce: u64) -> Self {
        Self {
            epoch,
            nonce,
            signatures: Vec::new(),
        }
    }

    /// Append `officer`'s signature over the payload for `(club, action)`.
    #[must_use]
    pub fn signed_by(
        mut self,
        club: ClubId,
        action: &ApprovedAction,
        officer: AccountId,
        key: &SigningKey,
    ) -> Self {
        let payload = approval_payload(club, action, self.epoch, self.nonce);
        self.signatures.push(OfficerSignature {
            officer,
            signature: key.sign(&payload).to_bytes().to_vec(),
        });
        self
    }

    /// Accounts that claim to have signed, without checking the signatures.
    #[must_use]
    pub fn claimed_signers(&self) -> BTreeSet<AccountId> {
        self.signatures.iter().map(|s| s.officer).collect()
    }
}
