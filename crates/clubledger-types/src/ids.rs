//! Identifiers used throughout the club ledger.
//!
//! Ledger-issued identifiers are sequence numbers handed out by the owning
//! component, so every replica applying the same operations assigns the same
//! ids. [`AccountId`] is the opaque 32-byte identity key supplied by the
//! surrounding environment. [`QuorumId`] is derived from the approver set.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants;

/// Hex (de)serialization for fixed-width byte keys, so they can be used as
/// JSON object keys and read back from config files.
pub(crate) mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let raw = hex::decode(&s).map_err(D::Error::custom)?;
        raw.try_into()
            .map_err(|v: Vec<u8>| D::Error::custom(format!("expected {N} bytes, got {}", v.len())))
    }
}

// ---------------------------------------------------------------------------
// AccountId
// ---------------------------------------------------------------------------

/// Opaque identity key of a ledger participant. Carries no PII.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl AccountId {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex prefix for log lines.
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }

    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acct:{}", hex::encode(&self.0[..8]))
    }
}

/// Deterministic account for unit tests. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl AccountId {
    pub fn from_seed(seed: u8) -> Self {
        Self([seed; 32])
    }
}

// ---------------------------------------------------------------------------
// ClubId
// ---------------------------------------------------------------------------

/// Fixed-width club identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ClubId(pub u32);

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "club:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// EpochId
// ---------------------------------------------------------------------------

/// Monotonically increasing epoch counter, advanced by an external source.
///
/// Every deadline in the ledger (claim windows, reservation expiry,
/// timelocks) is expressed in epochs; there is no wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize, Default)]
pub struct EpochId(pub u64);

impl EpochId {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// The immediately preceding epoch, if any.
    #[must_use]
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }

    /// `self + epochs`, saturating at `u64::MAX`.
    #[must_use]
    pub fn after(self, epochs: u64) -> Self {
        Self(self.0.saturating_add(epochs))
    }
}

impl fmt::Display for EpochId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Sequence-issued ids
// ---------------------------------------------------------------------------

/// Globally unique badge identifier, immutable once issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct BadgeId(pub u64);

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "badge:{}", self.0)
    }
}

/// Identifier of a locked-fund reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ReservationId(pub u64);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rsv:{}", self.0)
    }
}

/// Identifier of a treasury withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct WithdrawalId(pub u64);

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wd:{}", self.0)
    }
}

/// Identifier assigned by the governance layer to a capability grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct GrantId(pub u64);

impl fmt::Display for GrantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grant:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// QuorumId
// ---------------------------------------------------------------------------

/// Identifier for a set of officer approvals acting together.
///
/// Derived from the club and the sorted approver set, so the same quorum
/// always maps to the same id on every replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct QuorumId(pub Uuid);

impl QuorumId {
    #[must_use]
    pub fn from_approvers(club: ClubId, approvers: &BTreeSet<AccountId>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(constants::QUORUM_DOMAIN);
        hasher.update(club.0.to_le_bytes());
        hasher.update((approvers.len() as u64).to_le_bytes());
        for approver in approvers {
            hasher.update(approver.as_bytes());
        }
        let hash = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&hash[..16]);
        Self(Uuid::from_bytes(bytes))
    }
}

impl fmt::Display for QuorumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quorum:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
