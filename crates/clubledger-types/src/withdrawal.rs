//! # WithdrawalRequest: multisig and timelocked treasury outflow
//!
//! ## State Machine
//!
//! ```text
//!   PROPOSED ──quorum──▶ APPROVED ──▶ TIMELOCKED ──execute──▶ EXECUTED
//!      │                    │             │
//!      └────────────────────┴─────────────┴──▶ CANCELLED | EXPIRED
//! ```
//!
//! Transitions never skip forward or go back. `Cancelled` and `Expired` are
//! terminal and reachable from any non-terminal state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EpochId, LedgerError, WithdrawalId};

/// Status of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    Proposed,
    Approved,
    Timelocked,
    Executed,
    Cancelled,
    Expired,
}

impl WithdrawalStatus {
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Proposed, Self::Approved)
                | (Self::Approved, Self::Timelocked)
                | (Self::Timelocked, Self::Executed)
                | (
                    Self::Proposed | Self::Approved | Self::Timelocked,
                    Self::Cancelled | Self::Expired
                )
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Executed | Self::Cancelled | Self::Expired)
    }
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposed => write!(f, "PROPOSED"),
            Self::Approved => write!(f, "APPROVED"),
            Self::Timelocked => write!(f, "TIMELOCKED"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// One distinct approval on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ApprovalSource {
    /// A treasury signer.
    Signer(AccountId),
    /// A governance grant. Counts once, however many grants are presented.
    Governance,
}

/// An entry of the request's status history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: WithdrawalStatus,
    pub epoch: EpochId,
}

/// A proposed treasury outflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub id: WithdrawalId,
    pub amount: Amount,
    pub destination: AccountId,
    pub proposer: AccountId,
    pub approvals: BTreeSet<ApprovalSource>,
    /// Threshold captured when the request was proposed.
    pub quorum_threshold: usize,
    pub proposed_at: EpochId,
    /// First epoch at which execution is allowed. Set on approval.
    pub timelock_until: Option<EpochId>,
    /// Last epoch at which execution is allowed. Set on approval.
    pub deadline: Option<EpochId>,
    pub status: WithdrawalStatus,
    pub history: Vec<StatusChange>,
    /// The cancelled or expired request this one replaces.
    pub reproposal_of: Option<WithdrawalId>,
}

impl WithdrawalRequest {
    /// A fresh `Proposed` request with no approvals.
    #[must_use]
    pub fn new(
        id: WithdrawalId,
        amount: Amount,
        destination: AccountId,
        proposer: AccountId,
        quorum_threshold: usize,
        now: EpochId,
    ) -> Self {
        Self {
            id,
            amount,
            destination,
            proposer,
            approvals: BTreeSet::new(),
            quorum_threshold,
            proposed_at: now,
            timelock_until: None,
            deadline: None,
            status: WithdrawalStatus::Proposed,
            history: vec![StatusChange {
                status: WithdrawalStatus::Proposed,
                epoch: now,
            }],
            reproposal_of: None,
        }
    }

    #[must_use]
    pub fn has_quorum(&self) -> bool {
        self.approvals.len() >= self.quorum_threshold
    }

    /// Move to `to`, appending to history.
    ///
    /// # Errors
    /// `InvalidTransition` if the move is not allowed from the current status.
    pub fn transition(&mut self, to: WithdrawalStatus, now: EpochId) -> crate::Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(LedgerError::InvalidTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.history.push(StatusChange { status: to, epoch: now });
        Ok(())
    }

    /// Whether a timelocked request has run past its execution deadline.
    #[must_use]
    pub fn is_past_deadline(&self, now: EpochId) -> bool {
        self.deadline.is_some_and(|d| now > d)
    }
}
