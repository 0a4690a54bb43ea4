//! Append-only points ledger: the single source of truth for balances.
//!
//! Nothing in this crate mutates a stored counter. Every point change is
//! one immutable `PointsTransaction` row, and a balance only ever exists
//! as the fold of those rows at read time.

pub mod balance;
pub mod store;

pub use store::{ClientDirectory, LedgerStore};
