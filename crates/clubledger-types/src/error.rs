//! Error types for the club ledger.
//!
//! All errors use the `CL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Membership errors
//! - 2xx: Attestation claim errors
//! - 3xx: Badge errors
//! - 4xx: Balance errors
//! - 5xx: Reservation errors
//! - 6xx: Treasury errors
//! - 7xx: Governance / epoch errors
//! - 8xx: Invariant errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::{
    AccountId, Amount, BadgeId, ClubId, EpochId, GrantId, ReservationId, ReservationStatus,
    WithdrawalId, WithdrawalStatus,
};

/// Central error enum for all ledger operations.
///
/// Every rejected operation leaves the ledger untouched, so an error is
/// always safe to report back to the submitter as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // =================================================================
    // Membership Errors (1xx)
    // =================================================================
    /// A membership for this (account, club) already exists.
    #[error("CL_ERR_100: Duplicate membership: {account} in {club}")]
    DuplicateMembership { account: AccountId, club: ClubId },

    /// The caller lacks the authority required for this operation.
    #[error("CL_ERR_101: Unauthorized: {reason}")]
    Unauthorized { reason: String },

    /// The referenced club does not exist.
    #[error("CL_ERR_102: Club not found: {0}")]
    ClubNotFound(ClubId),

    /// A club with this id already exists.
    #[error("CL_ERR_103: Club already exists: {0}")]
    DuplicateClub(ClubId),

    /// No membership exists for this (account, club).
    #[error("CL_ERR_104: Membership not found: {account} in {club}")]
    MembershipNotFound { account: AccountId, club: ClubId },

    // =================================================================
    // Attestation Claim Errors (2xx)
    // =================================================================
    /// The ed25519 signature on the claim didn't verify.
    #[error("CL_ERR_200: Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// The (officer, epoch, nonce) triple was already consumed.
    #[error("CL_ERR_201: Nonce replay detected for officer {officer} nonce {nonce} in {epoch}")]
    NonceReplay {
        officer: AccountId,
        epoch: EpochId,
        nonce: u64,
    },

    /// The claim's epoch is outside the acceptance window.
    #[error("CL_ERR_202: Claim epoch expired: claim for {claim_epoch}, current {current}")]
    EpochExpired {
        claim_epoch: EpochId,
        current: EpochId,
    },

    /// Accepting the claim would breach a per-epoch cumulative cap.
    #[error("CL_ERR_203: Epoch cap exceeded: {reason}")]
    EpochCapExceeded { reason: String },

    // =================================================================
    // Badge Errors (3xx)
    // =================================================================
    /// Not enough distinct officer approvals for the requested tier.
    #[error("CL_ERR_300: Quorum not met: need {required}, have {provided}")]
    QuorumNotMet { required: usize, provided: usize },

    /// Soulbound badges can never change owner.
    #[error("CL_ERR_301: Soulbound violation: {0} is non-transferable")]
    SoulboundViolation(BadgeId),

    /// The referenced badge does not exist.
    #[error("CL_ERR_302: Badge not found: {0}")]
    BadgeNotFound(BadgeId),

    /// The badge has been revoked and cannot be used or revoked again.
    #[error("CL_ERR_303: Badge revoked: {0}")]
    BadgeRevoked(BadgeId),

    // =================================================================
    // Balance Errors (4xx)
    // =================================================================
    /// Not enough spendable balance to perform the operation.
    #[error("CL_ERR_400: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Minting would breach the governance-configured supply ceiling.
    #[error("CL_ERR_401: Supply cap exceeded: cap {cap}, supply would be {requested}")]
    SupplyCapExceeded { cap: Amount, requested: Amount },

    /// Amounts must be strictly positive.
    #[error("CL_ERR_402: Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    /// An arithmetic operation would overflow the amount type.
    #[error("CL_ERR_403: Arithmetic overflow")]
    Overflow,

    // =================================================================
    // Reservation Errors (5xx)
    // =================================================================
    /// The referenced reservation does not exist.
    #[error("CL_ERR_500: Reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    /// The reservation already reached a terminal disposition.
    #[error("CL_ERR_501: Reservation {id} already settled ({status})")]
    AlreadySettled {
        id: ReservationId,
        status: ReservationStatus,
    },

    /// The reservation is past its expiry and awaits the sweep.
    #[error("CL_ERR_502: Reservation {id} expired at {expires_at}")]
    ReservationExpired {
        id: ReservationId,
        expires_at: EpochId,
    },

    // =================================================================
    // Treasury Errors (6xx)
    // =================================================================
    /// Execution attempted before the timelock elapsed.
    #[error("CL_ERR_600: Timelock not elapsed: executable from {until}, now {now}")]
    TimelockNotElapsed { until: EpochId, now: EpochId },

    /// This approver already approved the request.
    #[error("CL_ERR_601: Duplicate approval on {0}")]
    DuplicateApproval(WithdrawalId),

    /// The referenced withdrawal request does not exist.
    #[error("CL_ERR_602: Withdrawal not found: {0}")]
    WithdrawalNotFound(WithdrawalId),

    /// The request cannot move from its current status to the target status.
    #[error("CL_ERR_603: Invalid transition on {id}: {from} -> {to}")]
    InvalidTransition {
        id: WithdrawalId,
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    },

    /// The execution deadline passed; the request must be re-proposed.
    #[error("CL_ERR_604: Withdrawal {id} expired at {deadline}")]
    WithdrawalExpired { id: WithdrawalId, deadline: EpochId },

    // =================================================================
    // Governance / Epoch Errors (7xx)
    // =================================================================
    /// The governance grant was already consumed by an earlier operation.
    #[error("CL_ERR_700: Governance grant already used: {0}")]
    GrantAlreadyUsed(GrantId),

    /// The epoch counter can only move forward.
    #[error("CL_ERR_701: Epoch regression: current {current}, requested {requested}")]
    EpochRegression { current: EpochId, requested: EpochId },

    // =================================================================
    // Invariant Errors (8xx)
    // =================================================================
    /// Conservation of value violated. Critical safety alert.
    #[error("CL_ERR_800: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Structurally invalid input.
    #[error("CL_ERR_900: Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Serialization / deserialization error.
    #[error("CL_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("CL_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Shorthand for [`LedgerError::Unauthorized`].
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`LedgerError::InvalidInput`].
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether the same request may succeed later once preconditions change
    /// (more approvals, restored balance, elapsed timelock, new epoch budget).
    ///
    /// Replay, signature and authorization errors are permanent for that
    /// exact input: the submitter must construct a new request.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::QuorumNotMet { .. }
                | Self::InsufficientBalance { .. }
                | Self::SupplyCapExceeded { .. }
                | Self::TimelockNotElapsed { .. }
                | Self::EpochCapExceeded { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
