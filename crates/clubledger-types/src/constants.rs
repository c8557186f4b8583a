//! System-wide constants for the club ledger.

/// Domain tag prefixed to every attestation claim signing payload.
pub const CLAIM_DOMAIN: &[u8] = b"clubledger:claim:v1:";

/// Domain tag prefixed to every officer approval signing payload.
pub const APPROVAL_DOMAIN: &[u8] = b"clubledger:approval:v1:";

/// Domain tag for deterministic quorum identifiers.
pub const QUORUM_DOMAIN: &[u8] = b"clubledger:quorum:v1:";

/// Domain tag for the ledger state digest.
pub const STATE_DOMAIN: &[u8] = b"clubledger:state:v1:";

/// Length of an ed25519 signature in bytes.
pub const SIGNATURE_LEN: usize = 64;

/// Maximum officers a single club may hold.
pub const MAX_OFFICERS_PER_CLUB: usize = 32;

/// Maximum length of a club name in bytes.
pub const MAX_CLUB_NAME_LEN: usize = 64;

/// Default number of officers that must co-sign an officer role change.
pub const DEFAULT_OFFICER_QUORUM: usize = 2;

/// Default approvals required to issue or revoke an Elevated badge.
pub const DEFAULT_ELEVATED_QUORUM: usize = 2;

/// Default approvals required to issue or revoke a Flagship badge.
pub const DEFAULT_FLAGSHIP_QUORUM: usize = 3;

/// Default cumulative amount a single officer may attest per epoch.
pub const DEFAULT_OFFICER_EPOCH_CAP: u128 = 1_000_000;

/// Default cumulative amount a single beneficiary may receive per epoch.
pub const DEFAULT_BENEFICIARY_EPOCH_CAP: u128 = 100_000;

/// Maximum distinct nonces tracked per (officer, epoch) before new claims are refused.
pub const MAX_NONCES_PER_OFFICER_EPOCH: usize = 100_000;

/// Default maximum reservation duration in epochs.
pub const DEFAULT_MAX_RESERVATION_EPOCHS: u64 = 10_000;

/// Default distinct approvals required for a treasury withdrawal.
///
/// One, so the default configuration (no treasury signers) validates with a
/// single governance approval as the quorum. Deployments that configure
/// signers raise it alongside the signer set.
pub const DEFAULT_TREASURY_QUORUM: usize = 1;

/// Default timelock between approval and execution, in epochs.
pub const DEFAULT_TIMELOCK_EPOCHS: u64 = 10;

/// Default window after the timelock during which execution is allowed, in epochs.
pub const DEFAULT_EXECUTION_WINDOW_EPOCHS: u64 = 100;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "ClubLedger";
