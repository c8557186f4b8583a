//! Off-chain reward claims signed by a club officer.

use ed25519_dalek::{Signer, SigningKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{AccountId, Amount, ClubId, EpochId, constants};

/// A signed attestation that `beneficiary` earned `amount` in `epoch`.
///
/// `(officer, epoch, nonce)` may be consumed at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationClaim {
    pub club: ClubId,
    pub beneficiary: AccountId,
    pub amount: Amount,
    pub epoch: EpochId,
    pub nonce: u64,
    /// The signing officer.
    pub officer: AccountId,
    /// Ed25519 signature over [`Self::signing_payload`].
    pub signature: Vec<u8>,
}

impl AttestationClaim {
    /// A claim with an empty signature, to be signed with [`Self::signed_with`].
    #[must_use]
    pub fn unsigned(
        club: ClubId,
        beneficiary: AccountId,
        amount: Amount,
        epoch: EpochId,
        nonce: u64,
        officer: AccountId,
    ) -> Self {
        Self {
            club,
            beneficiary,
            amount,
            epoch,
            nonce,
            officer,
            signature: Vec::new(),
        }
    }

    /// Canonical signing payload.
    ///
    /// Format: `"clubledger:claim:v1:" || club_le || beneficiary || amount_le || epoch_le || nonce_le || officer`
    #[must_use]
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(constants::CLAIM_DOMAIN.len() + 4 + 32 + 16 + 8 + 8 + 32);
        payload.extend_from_slice(constants::CLAIM_DOMAIN);
        payload.extend_from_slice(&self.club.0.to_le_bytes());
        payload.extend_from_slice(self.beneficiary.as_bytes());
        payload.extend_from_slice(&self.amount.to_le_bytes());
        payload.extend_from_slice(&self.epoch.0.to_le_bytes());
        payload.extend_from_slice(&self.nonce.to_le_bytes());
        payload.extend_from_slice(self.officer.as_bytes());
        payload
    }

    /// Sign the canonical payload, replacing any existing signature.
    #[must_use]
    pub fn signed_with(mut self, key: &SigningKey) -> Self {
        self.signature = key.sign(&self.signing_payload()).to_bytes().to_vec();
        self
    }

    /// SHA-256 over the signing payload. Stable identifier for logs and events.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        Sha256::digest(self.signing_payload()).into()
    }
}
