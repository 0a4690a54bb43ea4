//! In-memory append-only transaction store backed by `DashMap`, plus the
//! enrolled-client directory seam the booking and admin subsystems
//! validate against.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use studio_core::loyalty::{
    BookingCompleted, EarnDisposition, EnrolledClient, PointsTransaction, TransactionKind,
};
use studio_core::{LoyaltyError, LoyaltyResult};
use tracing::{debug, info};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Client directory
// ---------------------------------------------------------------------------

/// Enrolled-client lookup. Stands in for the external client-management
/// subsystem; the ledger only ever asks "is this client active" and reads
/// the enrollment timestamp for reporting fallbacks.
#[derive(Default)]
pub struct ClientDirectory {
    clients: DashMap<Uuid, EnrolledClient>,
}

impl ClientDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enroll a client now.
    pub fn enroll(&self, display_name: &str) -> EnrolledClient {
        self.enroll_at(display_name, Utc::now())
    }

    /// Enroll a client with an explicit timestamp (tie-breaking in the
    /// leaderboard depends on enrollment order).
    pub fn enroll_at(&self, display_name: &str, enrolled_at: DateTime<Utc>) -> EnrolledClient {
        let client = EnrolledClient {
            client_id: Uuid::new_v4(),
            display_name: display_name.to_string(),
            enrolled_at,
        };
        self.clients.insert(client.client_id, client.clone());
        debug!(client_id = %client.client_id, name = display_name, "Client enrolled");
        client
    }

    pub fn is_enrolled(&self, client_id: Uuid) -> bool {
        self.clients.contains_key(&client_id)
    }

    pub fn get(&self, client_id: Uuid) -> Option<EnrolledClient> {
        self.clients.get(&client_id).map(|c| c.clone())
    }

    /// Snapshot of every enrolled client.
    pub fn enrolled_clients(&self) -> Vec<EnrolledClient> {
        self.clients.iter().map(|c| c.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Ledger store
// ---------------------------------------------------------------------------

/// Append-only store of `PointsTransaction` rows keyed by client.
///
/// Rows are inserted in creation order and never rewritten, so per-client
/// reads are ascending by `created_at` without a sort. Concurrent writers
/// for the same client only ever append, which makes lost updates
/// structurally impossible.
pub struct LedgerStore {
    directory: std::sync::Arc<ClientDirectory>,
    rows: DashMap<Uuid, Vec<PointsTransaction>>,
    /// Idempotency index: booking id → earn transaction id.
    booking_index: DashMap<Uuid, Uuid>,
}

impl LedgerStore {
    pub fn new(directory: std::sync::Arc<ClientDirectory>) -> Self {
        Self {
            directory,
            rows: DashMap::new(),
            booking_index: DashMap::new(),
        }
    }

    pub fn directory(&self) -> &ClientDirectory {
        &self.directory
    }

    /// Append one immutable transaction row.
    ///
    /// Rejects a zero delta and unknown clients; deliberately does not
    /// check for "insufficient balance" — negative balances are a valid,
    /// displayed state. A validation failure writes nothing.
    pub fn append(
        &self,
        client_id: Uuid,
        delta: i64,
        kind: TransactionKind,
        description: Option<String>,
        source_booking: Option<Uuid>,
    ) -> LoyaltyResult<PointsTransaction> {
        if delta == 0 {
            return Err(LoyaltyError::Validation(
                "transaction delta must be non-zero".to_string(),
            ));
        }
        if !self.directory.is_enrolled(client_id) {
            return Err(LoyaltyError::UnknownClient(client_id));
        }

        let tx = PointsTransaction {
            id: Uuid::new_v4(),
            client_id,
            delta,
            kind,
            description,
            source_booking,
            created_at: Utc::now(),
        };
        self.rows.entry(client_id).or_default().push(tx.clone());

        metrics::counter!("ledger.transactions_appended", "kind" => kind.as_str()).increment(1);
        debug!(
            client_id = %client_id,
            transaction_id = %tx.id,
            delta = delta,
            kind = kind.as_str(),
            "Transaction appended"
        );

        Ok(tx)
    }

    /// Snapshot of a client's transactions, ascending by creation time.
    /// Aggregation input only; never handed raw to the presentation layer.
    pub fn transactions_for_client(&self, client_id: Uuid) -> Vec<PointsTransaction> {
        self.rows
            .get(&client_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Creation time of the client's most recent transaction.
    pub fn last_activity(&self, client_id: Uuid) -> Option<DateTime<Utc>> {
        self.rows
            .get(&client_id)
            .and_then(|r| r.last().map(|tx| tx.created_at))
    }

    /// Ingest a booking-completion event from the scheduling subsystem.
    ///
    /// Points equal whole currency units spent; fractional cents are
    /// truncated, not rounded, so the earn row can be audited against the
    /// booking amount. At-most-once per booking id: a replayed event
    /// returns the existing row id and leaves the ledger untouched.
    pub fn record_booking_completion(
        &self,
        event: &BookingCompleted,
    ) -> LoyaltyResult<EarnDisposition> {
        if !self.directory.is_enrolled(event.client_id) {
            return Err(LoyaltyError::UnknownClient(event.client_id));
        }

        let points = (event.amount_cents / 100) as i64;
        if points == 0 {
            return Ok(EarnDisposition::NoPoints);
        }

        match self.booking_index.entry(event.booking_id) {
            dashmap::mapref::entry::Entry::Occupied(existing) => {
                debug!(
                    booking_id = %event.booking_id,
                    transaction_id = %existing.get(),
                    "Booking already recorded, skipping"
                );
                Ok(EarnDisposition::AlreadyRecorded {
                    transaction_id: *existing.get(),
                })
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let tx = self.append(
                    event.client_id,
                    points,
                    TransactionKind::EarnFromBooking,
                    Some(format!("completed booking {}", event.booking_id)),
                    Some(event.booking_id),
                )?;
                slot.insert(tx.id);
                metrics::counter!("ledger.points_earned").increment(points as u64);
                info!(
                    client_id = %event.client_id,
                    booking_id = %event.booking_id,
                    points = points,
                    "Earn transaction recorded"
                );
                Ok(EarnDisposition::Recorded { transaction: tx })
            }
        }
    }

    /// Seed demo clients and bookings for local runs.
    pub fn seed_demo_data(&self) -> LoyaltyResult<()> {
        let names = ["Ada Moreno", "Priya Nair", "Tomas Lindqvist"];
        let amounts_cents: [&[u64]; 3] = [
            &[175_00, 220_00, 95_50],
            &[340_00, 120_00],
            &[60_00],
        ];

        for (name, amounts) in names.iter().zip(amounts_cents) {
            let client = self.directory.enroll(name);
            for &amount in amounts {
                self.record_booking_completion(&BookingCompleted {
                    client_id: client.client_id,
                    booking_id: Uuid::new_v4(),
                    amount_cents: amount,
                    completed_at: Utc::now(),
                })?;
            }
        }

        info!("Seeded demo ledger for 3 clients");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
