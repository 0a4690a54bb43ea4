//! Read-only loyalty projections for leaderboard and reporting display.

pub mod summary;

pub use summary::SummaryQuery;
