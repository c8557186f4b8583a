//! # clubledger-authority
//!
//! **Authority plane**: who may do what, and what they have already done.
//!
//! 1. **MembershipRegistry**: clubs, memberships, officer keys and quorums
//! 2. **AttestationVerifier**: signature, nonce, epoch and cap checks for reward
//!    claims and signed officer approvals
//! 3. **BadgeLedger**: tiered badge issuance and revocation, soulbound enforcement
//! 4. **GrantGuard**: single-use enforcement for governance grants
//!
//! Nothing here moves tokens. A successful claim check yields a
//! [`ValidatedClaim`], which the funds plane accepts as a mint cause.

pub mod attestation;
pub mod badges;
pub mod grants;
pub mod nonce;
pub mod registry;

pub use attestation::{AttestationVerifier, ValidatedApproval, ValidatedClaim};
pub use badges::{BadgeLedger, BadgeRequest};
pub use grants::GrantGuard;
pub use nonce::NonceTracker;
pub use registry::{MembershipRegistry, RoleAuthority};
