//! Balance aggregation: a client's balance is the checked fold of their
//! transaction deltas, recomputed on every read. No cached balance
//! exists anywhere that could drift from the log.

use crate::store::LedgerStore;
use std::collections::HashMap;
use studio_core::{LoyaltyError, LoyaltyResult};
use uuid::Uuid;

impl LedgerStore {
    /// Current balance for one client. A client with no transactions has
    /// balance `0`. Overflow fails loudly instead of wrapping.
    pub fn compute_balance(&self, client_id: Uuid) -> LoyaltyResult<i64> {
        self.transactions_for_client(client_id)
            .iter()
            .try_fold(0i64, |acc, tx| acc.checked_add(tx.delta))
            .ok_or(LoyaltyError::BalanceOverflow(client_id))
    }

    /// One aggregate pass producing a balance for every enrolled client,
    /// including clients with no transactions. Saves the summary read
    /// path a round trip per client.
    pub fn sum_all_by_client(&self) -> LoyaltyResult<HashMap<Uuid, i64>> {
        let mut balances: HashMap<Uuid, i64> = self
            .directory()
            .enrolled_clients()
            .into_iter()
            .map(|c| (c.client_id, 0))
            .collect();

        for (client_id, balance) in balances.iter_mut() {
            *balance = self.compute_balance(*client_id)?;
        }

        Ok(balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ClientDirectory;
    use std::sync::Arc;
    use studio_core::loyalty::TransactionKind;

    fn store() -> LedgerStore {
        LedgerStore::new(Arc::new(ClientDirectory::new()))
    }

    #[test]
    fn test_balance_is_sum_of_deltas() {
        let store = store();
        let client = store.directory().enroll("Summed");

        for delta in [120, -20, 300, -1] {
            store
                .append(client.client_id, delta, TransactionKind::ManualCredit, None, None)
                .unwrap();
        }

        assert_eq!(store.compute_balance(client.client_id).unwrap(), 399);
    }

    #[test]
    fn test_balance_zero_without_transactions() {
        let store = store();
        let client = store.directory().enroll("Fresh");

        assert_eq!(store.compute_balance(client.client_id).unwrap(), 0);
    }

    #[test]
    fn test_balance_may_go_negative() {
        let store = store();
        let client = store.directory().enroll("In Debt");

        store
            .append(client.client_id, -150, TransactionKind::ManualDebit, None, None)
            .unwrap();

        assert_eq!(store.compute_balance(client.client_id).unwrap(), -150);
    }

    #[test]
    fn test_balance_overflow_fails_loudly() {
        let store = store();
        let client = store.directory().enroll("Overflow");

        store
            .append(client.client_id, i64::MAX, TransactionKind::ManualCredit, None, None)
            .unwrap();
        store
            .append(client.client_id, 1, TransactionKind::ManualCredit, None, None)
            .unwrap();

        let err = store.compute_balance(client.client_id).unwrap_err();
        assert!(matches!(err, LoyaltyError::BalanceOverflow(id) if id == client.client_id));
    }

    #[test]
    fn test_sum_all_covers_every_enrolled_client() {
        let store = store();
        let active = store.directory().enroll("Active");
        let idle = store.directory().enroll("Idle");

        store
            .append(active.client_id, 75, TransactionKind::ManualCredit, None, None)
            .unwrap();

        let balances = store.sum_all_by_client().unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[&active.client_id], 75);
        assert_eq!(balances[&idle.client_id], 0);
    }
}
