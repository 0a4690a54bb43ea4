//! Reward issuance engine: the only writer of manual credit/debit
//! transactions, and the place tier transitions are detected.

use crate::tiers::resolve_tier;
use chrono::Utc;
use dashmap::DashMap;
use std::sync::Arc;
use studio_core::config::LoyaltyConfig;
use studio_core::loyalty::{
    IssueRewardRequest, IssueRewardResponse, RewardAuditRecord, TierThreshold, TransactionKind,
};
use studio_core::{LoyaltyError, LoyaltyResult};
use studio_ledger::LedgerStore;
use tracing::{debug, info};
use uuid::Uuid;

/// Issues rewards against the ledger and reports the tier transition
/// each issuance caused.
///
/// The before/after balances are recomputed fresh from the log inside
/// each call, never taken from caller state. Two interleaving issuances
/// for the same client can therefore never corrupt the balance; at worst
/// both observe the same transition and the duplicate report is a
/// display-level imprecision.
pub struct RewardEngine {
    store: Arc<LedgerStore>,
    thresholds: Vec<TierThreshold>,
    audit_log: DashMap<Uuid, Vec<RewardAuditRecord>>,
}

impl RewardEngine {
    pub fn new(store: Arc<LedgerStore>, config: &LoyaltyConfig) -> Self {
        let thresholds = config.thresholds();
        info!(tiers = thresholds.len(), "Reward engine initialized");
        Self {
            store,
            thresholds,
            audit_log: DashMap::new(),
        }
    }

    pub fn thresholds(&self) -> &[TierThreshold] {
        &self.thresholds
    }

    /// Issue a reward to a client.
    ///
    /// Only `RewardKind::Points` touches the ledger; the other kinds are
    /// recorded in the audit log alone. A validation failure leaves both
    /// the ledger and the audit log untouched.
    pub fn issue_reward(&self, request: &IssueRewardRequest) -> LoyaltyResult<IssueRewardResponse> {
        if let Some(0) = request.reward.ledger_delta() {
            return Err(LoyaltyError::Validation(
                "points reward delta must be non-zero".to_string(),
            ));
        }
        if !self.store.directory().is_enrolled(request.client_id) {
            return Err(LoyaltyError::UnknownClient(request.client_id));
        }

        let balance_before = self.store.compute_balance(request.client_id)?;
        let tier_before = resolve_tier(&self.thresholds, balance_before).tier;

        let ledger_delta = match request.reward.ledger_delta() {
            Some(delta) => {
                let kind = if delta > 0 {
                    TransactionKind::ManualCredit
                } else {
                    TransactionKind::ManualDebit
                };
                self.store.append(
                    request.client_id,
                    delta,
                    kind,
                    request.note.clone().or_else(|| Some(request.reward.label())),
                    None,
                )?;
                Some(delta)
            }
            None => {
                debug!(
                    client_id = %request.client_id,
                    reward = %request.reward.label(),
                    "Non-points reward, ledger untouched"
                );
                None
            }
        };

        let balance_after = self.store.compute_balance(request.client_id)?;
        let tier_after = resolve_tier(&self.thresholds, balance_after).tier;

        self.record_audit(request);

        let tiered_up = tier_after > tier_before;
        metrics::counter!("loyalty.rewards_issued").increment(1);
        if tiered_up {
            metrics::counter!("loyalty.tier_upgrades").increment(1);
            info!(
                client_id = %request.client_id,
                old = tier_before.as_str(),
                new = tier_after.as_str(),
                "Tier upgrade"
            );
        }

        Ok(IssueRewardResponse {
            client_id: request.client_id,
            tiered_up,
            tier_changed: tier_after != tier_before,
            new_tier: tier_after,
            balance_before,
            balance_after,
            ledger_delta,
        })
    }

    fn record_audit(&self, request: &IssueRewardRequest) {
        let record = RewardAuditRecord {
            id: Uuid::new_v4(),
            client_id: request.client_id,
            reward: request.reward.clone(),
            note: request.note.clone(),
            issued_at: Utc::now(),
        };
        self.audit_log
            .entry(request.client_id)
            .or_default()
            .push(record);
    }

    /// Audit trail of every issuance for a client, points or not.
    pub fn audit_for_client(&self, client_id: Uuid) -> Vec<RewardAuditRecord> {
        self.audit_log
            .get(&client_id)
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::loyalty::{RewardKind, Tier};
    use studio_ledger::ClientDirectory;

    fn engine() -> RewardEngine {
        let store = Arc::new(LedgerStore::new(Arc::new(ClientDirectory::new())));
        RewardEngine::new(store, &LoyaltyConfig::default())
    }

    fn points(client_id: Uuid, delta: i64) -> IssueRewardRequest {
        IssueRewardRequest {
            client_id,
            reward: RewardKind::Points { delta },
            note: None,
        }
    }

    #[test]
    fn test_tier_up_on_crossing_silver_floor() {
        let engine = engine();
        let client = engine.store.directory().enroll("Climber");
        engine.issue_reward(&points(client.client_id, 200)).unwrap();

        let resp = engine.issue_reward(&points(client.client_id, 250)).unwrap();

        assert_eq!(resp.balance_after, 450);
        assert!(resp.tiered_up);
        assert_eq!(resp.new_tier, Tier::Silver);
    }

    #[test]
    fn test_tier_up_exactly_at_gold_floor() {
        let engine = engine();
        let client = engine.store.directory().enroll("Boundary");
        engine.issue_reward(&points(client.client_id, 690)).unwrap();

        // 690 + 10 lands exactly on gold's floor.
        let resp = engine.issue_reward(&points(client.client_id, 10)).unwrap();

        assert_eq!(resp.balance_after, 700);
        assert!(resp.tiered_up);
        assert_eq!(resp.new_tier, Tier::Gold);
    }

    #[test]
    fn test_no_tier_change_within_band() {
        let engine = engine();
        let client = engine.store.directory().enroll("Steady");
        engine.issue_reward(&points(client.client_id, 350)).unwrap();

        let resp = engine.issue_reward(&points(client.client_id, 50)).unwrap();

        assert!(!resp.tiered_up);
        assert!(!resp.tier_changed);
        assert_eq!(resp.new_tier, Tier::Silver);
    }

    #[test]
    fn test_debit_can_demote() {
        let engine = engine();
        let client = engine.store.directory().enroll("Corrected");
        engine.issue_reward(&points(client.client_id, 800)).unwrap();

        let resp = engine.issue_reward(&points(client.client_id, -200)).unwrap();

        assert!(!resp.tiered_up);
        assert!(resp.tier_changed);
        assert_eq!(resp.new_tier, Tier::Silver);
        assert_eq!(resp.ledger_delta, Some(-200));
    }

    #[test]
    fn test_zero_delta_rejected_with_no_effects() {
        let engine = engine();
        let client = engine.store.directory().enroll("Zero");
        engine.issue_reward(&points(client.client_id, 100)).unwrap();

        let err = engine.issue_reward(&points(client.client_id, 0)).unwrap_err();

        assert!(matches!(err, LoyaltyError::Validation(_)));
        assert_eq!(engine.store.compute_balance(client.client_id).unwrap(), 100);
        assert_eq!(engine.audit_for_client(client.client_id).len(), 1);
    }

    #[test]
    fn test_unknown_client_rejected() {
        let engine = engine();
        let stranger = Uuid::new_v4();

        let err = engine.issue_reward(&points(stranger, 50)).unwrap_err();
        assert!(matches!(err, LoyaltyError::UnknownClient(id) if id == stranger));
    }

    #[test]
    fn test_non_points_reward_audited_but_not_ledgered() {
        let engine = engine();
        let client = engine.store.directory().enroll("Pampered");

        let resp = engine
            .issue_reward(&IssueRewardRequest {
                client_id: client.client_id,
                reward: RewardKind::FreeAddOn {
                    add_on: "hot stone upgrade".to_string(),
                },
                note: Some("anniversary".to_string()),
            })
            .unwrap();

        assert_eq!(resp.ledger_delta, None);
        assert!(!resp.tier_changed);
        assert_eq!(engine.store.compute_balance(client.client_id).unwrap(), 0);

        let audit = engine.audit_for_client(client.client_id);
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].note.as_deref(), Some("anniversary"));
    }

    #[test]
    fn test_manual_debit_kind_chosen_by_sign() {
        let engine = engine();
        let client = engine.store.directory().enroll("Signed");

        engine.issue_reward(&points(client.client_id, 40)).unwrap();
        engine.issue_reward(&points(client.client_id, -15)).unwrap();

        let rows = engine.store.transactions_for_client(client.client_id);
        assert_eq!(rows[0].kind, TransactionKind::ManualCredit);
        assert_eq!(rows[1].kind, TransactionKind::ManualDebit);
    }
}
