//! Leaderboard projection: balance, tier, and progress for every
//! enrolled client, joined from the ledger and the tier resolver.

use std::sync::Arc;
use studio_core::config::LoyaltyConfig;
use studio_core::loyalty::{ClientSummary, TierThreshold};
use studio_core::LoyaltyResult;
use studio_ledger::LedgerStore;
use studio_loyalty::{progress_percent, resolve_tier};
use tracing::debug;
use uuid::Uuid;

/// Read-only summary query over the ledger. Never writes; calling it
/// twice with no intervening appends returns identical results.
pub struct SummaryQuery {
    store: Arc<LedgerStore>,
    thresholds: Vec<TierThreshold>,
}

impl SummaryQuery {
    pub fn new(store: Arc<LedgerStore>, config: &LoyaltyConfig) -> Self {
        Self {
            store,
            thresholds: config.thresholds(),
        }
    }

    /// Snapshot for every enrolled client, ordered by balance descending
    /// with ties broken by earliest enrollment. Balances come from one
    /// aggregate pass over the log, not a read per client.
    pub fn list_summaries(&self) -> LoyaltyResult<Vec<ClientSummary>> {
        let balances = self.store.sum_all_by_client()?;
        let clients = self.store.directory().enrolled_clients();

        let mut ranked: Vec<(chrono::DateTime<chrono::Utc>, ClientSummary)> = clients
            .into_iter()
            .map(|client| {
                let balance = balances.get(&client.client_id).copied().unwrap_or(0);
                let standing = resolve_tier(&self.thresholds, balance);
                let last_activity_at = self
                    .store
                    .last_activity(client.client_id)
                    .unwrap_or(client.enrolled_at);

                let summary = ClientSummary {
                    client_id: client.client_id,
                    display_name: client.display_name,
                    balance,
                    tier: standing.tier,
                    points_to_next: standing.points_to_next,
                    progress_percent: progress_percent(&self.thresholds, balance),
                    last_activity_at,
                };
                (client.enrolled_at, summary)
            })
            .collect();

        ranked.sort_by(|(a_enrolled, a), (b_enrolled, b)| {
            b.balance
                .cmp(&a.balance)
                .then_with(|| a_enrolled.cmp(b_enrolled))
                .then_with(|| a.client_id.cmp(&b.client_id))
        });
        let summaries: Vec<ClientSummary> = ranked.into_iter().map(|(_, s)| s).collect();

        debug!(clients = summaries.len(), "Loyalty summaries computed");
        Ok(summaries)
    }

    /// Single-client standing for the profile view.
    pub fn summary_for_client(&self, client_id: Uuid) -> LoyaltyResult<Option<ClientSummary>> {
        let Some(client) = self.store.directory().get(client_id) else {
            return Ok(None);
        };

        let balance = self.store.compute_balance(client_id)?;
        let standing = resolve_tier(&self.thresholds, balance);

        Ok(Some(ClientSummary {
            client_id,
            display_name: client.display_name,
            balance,
            tier: standing.tier,
            points_to_next: standing.points_to_next,
            progress_percent: progress_percent(&self.thresholds, balance),
            last_activity_at: self.store.last_activity(client_id).unwrap_or(client.enrolled_at),
        }))
    }
}
