//! # clubledger-funds
//!
//! **Funds plane**: every movement of the reward token.
//!
//! - [`RewardLedger`]: balances, treasury, supply cap, lock primitives
//! - [`SupplyConservation`]: independent mint/burn accounting
//! - [`ReservationManager`]: locked-fund reservations and their settlement
//! - [`TreasuryController`]: multisig + timelock withdrawals from the treasury
//!
//! Every method validates before it mutates; an `Err` leaves the component
//! unchanged.

pub mod reservations;
pub mod rewards;
pub mod supply_conservation;
pub mod treasury;

pub use reservations::ReservationManager;
pub use rewards::{MintCause, RewardLedger};
pub use supply_conservation::SupplyConservation;
pub use treasury::TreasuryController;
