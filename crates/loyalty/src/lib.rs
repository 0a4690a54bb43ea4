//! Tier resolution and reward issuance over the points ledger.

pub mod engine;
pub mod tiers;

pub use engine::RewardEngine;
pub use tiers::{progress_percent, resolve_tier};
