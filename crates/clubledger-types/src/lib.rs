//! # clubledger-types
//!
//! Shared types, errors, and configuration for the **club ledger**.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ClubId`], [`BadgeId`], [`ReservationId`], [`WithdrawalId`], [`GrantId`], [`EpochId`], [`QuorumId`]
//! - **Amounts**: [`Amount`], [`SupplySnapshot`]
//! - **Membership model**: [`Club`], [`Membership`], [`Role`], [`MemberStatus`], [`OfficerKey`]
//! - **Badge model**: [`Badge`], [`BadgeTier`], [`QuorumRule`], [`TierThresholds`], [`Provenance`]
//! - **Claim model**: [`AttestationClaim`]
//! - **Officer approvals**: [`OfficerApproval`], [`OfficerSignature`], [`ApprovedAction`]
//! - **Governance**: [`GovernanceGrant`], [`GrantScope`], [`GrantAction`], [`GrantTarget`], [`Authority`]
//! - **Reservation model**: [`Reservation`], [`ReservationStatus`], [`Disposition`], [`ResourceType`]
//! - **Treasury model**: [`WithdrawalRequest`], [`WithdrawalStatus`], [`ApprovalSource`]
//! - **Events**: [`LedgerEvent`], [`EventLog`]
//! - **Configuration**: [`LedgerConfig`] and its sections
//! - **Errors**: [`LedgerError`] with `CL_ERR_` prefix codes
//! - **Constants**: system-wide limits and defaults

pub mod approval;
pub mod badge;
pub mod balance;
pub mod claim;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod governance;
pub mod ids;
pub mod membership;
pub mod reservation;
pub mod withdrawal;

// Re-export all primary types at crate root for ergonomic imports:
//   use clubledger_types::{AccountId, Badge, LedgerError, ...};

pub use approval::*;
pub use badge::*;
pub use balance::*;
pub use claim::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use governance::*;
pub use ids::*;
pub use membership::*;
pub use reservation::*;
pub use withdrawal::*;

// Constants are accessed via `clubledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
