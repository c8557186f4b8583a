//! # Reservation: funds locked against an external resource
//!
//! ## State Machine
//!
//! ```text
//!   ┌────────┐  settle(Spend)   ┌──────────┐
//!   │ ACTIVE ├─────────────────▶│ RELEASED │  lock burned
//!   └───┬─┬──┘                  └──────────┘
//!       │ │ settle(Refund)      ┌──────────┐
//!       │ └────────────────────▶│ REFUNDED │  lock returned
//!       │                       └──────────┘
//!       │ sweep past expiry     ┌─────────┐
//!       └──────────────────────▶│ EXPIRED │   lock returned
//!                               └─────────┘
//! ```
//!
//! Every reservation reaches exactly one terminal state.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, EpochId, LedgerError, ReservationId};

/// Kind of external resource a reservation pays for (e.g. "GPU").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(pub String);

impl ResourceType {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Funds are locked.
    Active,
    /// Resource consumed; the lock was burned.
    Released,
    /// Resource not used; the lock went back to the account.
    Refunded,
    /// Nobody settled before expiry; the sweep refunded the lock.
    Expired,
}

impl ReservationStatus {
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Active, Self::Released | Self::Refunded | Self::Expired)
        )
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Released => write!(f, "RELEASED"),
            Self::Refunded => write!(f, "REFUNDED"),
            Self::Expired => write!(f, "EXPIRED"),
        }
    }
}

/// Outcome reported by the settlement callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    /// The resource was consumed.
    Spend,
    /// The resource was not used.
    Refund,
}

impl Disposition {
    #[must_use]
    pub fn target_status(&self) -> ReservationStatus {
        match self {
            Self::Spend => ReservationStatus::Released,
            Self::Refund => ReservationStatus::Refunded,
        }
    }
}

/// A locked-fund reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub account: AccountId,
    pub resource: ResourceType,
    pub amount: Amount,
    pub created_at: EpochId,
    pub expires_at: EpochId,
    pub status: ReservationStatus,
    pub settled_at: Option<EpochId>,
    /// Settler that reported the disposition. `None` for sweeps.
    pub settled_by: Option<AccountId>,
}

impl Reservation {
    /// Strictly past expiry: settlement is still accepted at `expires_at`.
    #[must_use]
    pub fn is_past_expiry(&self, now: EpochId) -> bool {
        now > self.expires_at
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == ReservationStatus::Active
    }

    /// Apply a settler's disposition.
    ///
    /// # Errors
    /// `AlreadySettled` if the reservation is no longer active.
    pub fn mark_settled(
        &mut self,
        disposition: Disposition,
        settler: AccountId,
        now: EpochId,
    ) -> crate::Result<()> {
        self.transition(disposition.target_status(), now)?;
        self.settled_by = Some(settler);
        Ok(())
    }

    /// Move to `Expired`.
    ///
    /// # Errors
    /// `AlreadySettled` if the reservation is no longer active.
    pub fn mark_expired(&mut self, now: EpochId) -> crate::Result<()> {
        self.transition(ReservationStatus::Expired, now)
    }

    fn transition(&mut self, target: ReservationStatus, now: EpochId) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(LedgerError::AlreadySettled {
                id: self.id,
                status: self.status,
            });
        }
        self.status = target;
        self.settled_at = Some(now);
        Ok(())
    }
}
