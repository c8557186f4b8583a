//! # clubledger-engine
//!
//! The single owned store for the club ledger and the only way to change it.
//!
//! - [`Ledger`]: every component plus the epoch counter and event log
//! - [`Operation`] / [`Outcome`]: discrete, serializable state transitions
//! - [`Ledger::genesis`]: initial state from a [`LedgerConfig`](clubledger_types::LedgerConfig)
//! - [`LedgerHandle`]: one serialized writer, `Arc` snapshots for readers
//!
//! ## Commit model
//!
//! ```text
//!   Operation ──▶ clone committed Ledger ──▶ execute ──▶ verify invariants ──▶ publish
//!                                              │                │
//!                                              └──── Err ───────┴──▶ committed state untouched
//! ```

pub mod genesis;
pub mod handle;
pub mod ledger;
pub mod operation;

pub use handle::LedgerHandle;
pub use ledger::{Ledger, SweepReport};
pub use operation::{Operation, Outcome};
