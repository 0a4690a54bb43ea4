//! Loyalty domain types — append-only points ledger, tier system, rewards.
//!
//! Balance is never stored: it is always the fold of a client's
//! transaction deltas, so every point change carries a reason and a
//! timestamp, and corrections are offsetting rows rather than silent
//! overwrites.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Tier System ────────────────────────────────────────────────────────────

/// Loyalty tier levels, ordered by their minimum-balance floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    /// Stable label for metrics and log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "bronze",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        }
    }
}

impl Default for Tier {
    fn default() -> Self {
        Tier::Bronze
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the tier threshold table: the lowest balance that
/// qualifies for `tier`. The table is configuration data consulted by a
/// generic resolver; adding a tier is a config change, not a code change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierThreshold {
    pub tier: Tier,
    pub min_points: i64,
}

/// A client's resolved standing: current tier plus the distance to the
/// next tier's floor (`0` at the top tier).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierStanding {
    pub tier: Tier,
    pub points_to_next: i64,
}

// ─── Ledger ─────────────────────────────────────────────────────────────────

/// Why a transaction exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Automatic grant from a completed, paid booking.
    EarnFromBooking,
    /// Administrator-issued bonus points.
    ManualCredit,
    /// Administrator-issued deduction (corrections, adjustments).
    ManualDebit,
    /// Scheduled points expiry.
    Expiration,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::EarnFromBooking => "earn_from_booking",
            TransactionKind::ManualCredit => "manual_credit",
            TransactionKind::ManualDebit => "manual_debit",
            TransactionKind::Expiration => "expiration",
        }
    }
}

/// One immutable row of the points ledger. Never mutated or deleted
/// after creation; corrections are new offsetting transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsTransaction {
    pub id: Uuid,
    pub client_id: Uuid,
    /// Signed point delta. Always non-zero.
    pub delta: i64,
    pub kind: TransactionKind,
    pub description: Option<String>,
    /// Booking that produced this row, for `earn_from_booking` kinds.
    pub source_booking: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Client identity as the ledger sees it. Owned by the external
/// client-management subsystem; the loyalty engine only references the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledClient {
    pub client_id: Uuid,
    pub display_name: String,
    pub enrolled_at: DateTime<Utc>,
}

// ─── Booking Events ─────────────────────────────────────────────────────────

/// Booking-completion event consumed from the scheduling subsystem.
/// Amounts arrive in the smallest currency unit (cents).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingCompleted {
    pub client_id: Uuid,
    pub booking_id: Uuid,
    pub amount_cents: u64,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of ingesting a booking-completion event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum EarnDisposition {
    /// One new earn transaction was appended.
    Recorded { transaction: PointsTransaction },
    /// This booking already produced an earn row; the ledger is untouched.
    AlreadyRecorded { transaction_id: Uuid },
    /// The booking was below one whole currency unit; nothing to record.
    NoPoints,
}

// ─── Rewards ────────────────────────────────────────────────────────────────

/// What an administrator is issuing. Only the `Points` variant carries a
/// ledger effect; the others are descriptive and land in the audit log only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum RewardKind {
    /// Bonus points (positive) or a correction debit (negative).
    Points { delta: i64 },
    /// Percentage discount on a future booking.
    Discount { percent: u8 },
    /// Complimentary add-on to a booked service.
    FreeAddOn { add_on: String },
    /// A full complimentary service.
    FreeService { service: String },
}

impl RewardKind {
    /// Ledger delta this reward carries, if any.
    pub fn ledger_delta(&self) -> Option<i64> {
        match self {
            RewardKind::Points { delta } => Some(*delta),
            _ => None,
        }
    }

    /// Short human-readable label for audit rows and logs.
    pub fn label(&self) -> String {
        match self {
            RewardKind::Points { delta } => format!("{delta:+} points"),
            RewardKind::Discount { percent } => format!("{percent}% discount"),
            RewardKind::FreeAddOn { add_on } => format!("free add-on: {add_on}"),
            RewardKind::FreeService { service } => format!("free service: {service}"),
        }
    }
}

/// Request to issue a reward to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRewardRequest {
    pub client_id: Uuid,
    pub reward: RewardKind,
    pub note: Option<String>,
}

/// Result of a reward issuance, including the tier transition it caused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRewardResponse {
    pub client_id: Uuid,
    /// The client moved to a strictly higher tier.
    pub tiered_up: bool,
    /// The tier changed in either direction (debits can demote).
    pub tier_changed: bool,
    pub new_tier: Tier,
    pub balance_before: i64,
    pub balance_after: i64,
    /// Delta written to the ledger; `None` for non-points rewards.
    pub ledger_delta: Option<i64>,
}

/// Audit row recorded for every successful issuance, points or not.
/// Keeps non-points rewards traceable without putting zero-delta rows
/// in the points ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardAuditRecord {
    pub id: Uuid,
    pub client_id: Uuid,
    pub reward: RewardKind,
    pub note: Option<String>,
    pub issued_at: DateTime<Utc>,
}

// ─── Summary Projection ─────────────────────────────────────────────────────

/// Per-client snapshot for the leaderboard view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub client_id: Uuid,
    pub display_name: String,
    pub balance: i64,
    pub tier: Tier,
    pub points_to_next: i64,
    /// Progress through the current tier band, clamped to [0, 100].
    pub progress_percent: u8,
    /// Most recent transaction time, or enrollment time if none exist.
    pub last_activity_at: DateTime<Utc>,
}
