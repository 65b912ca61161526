//! In-memory ledger store with per-group exclusive sections.
//!
//! The per-group ledger sequence is the only shared mutable resource in
//! the core; cross-group operations share nothing. Each group's state
//! sits behind its own `RwLock`, so appends to one group serialize while
//! requests for different groups proceed independently, and a balance
//! read observes either a fully-applied append or none of it.
//!
//! Persistence technology is out of scope; this store is the narrow seam
//! where a durable backend would plug in.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};
use tokio::time::timeout;

use splitledger_shared::config::LedgerConfig;
use splitledger_shared::types::{Amount, ExpenseId, GroupId, SettlementId, UserId};

use crate::balance::{self, NetBalance};
use crate::group::Group;
use crate::simplify::{self, SettlementSuggestion};

use super::entry::{Expense, LedgerEntry, Settlement};
use super::error::LedgerError;
use super::types::{ExpenseInput, SettlementInput};
use super::validation;

/// Per-group state: the group, its entry sequence, and the balance cache.
///
/// The cache is guarded by the same lock as the entries, so it can never
/// be read while an append to the same group is in flight.
#[derive(Debug)]
struct GroupState {
    group: Group,
    entries: Vec<LedgerEntry>,
    cached_balances: Option<NetBalance>,
}

/// Append-only, per-group event store of financial facts.
///
/// The sole source of truth: every derived view is a pure function of a
/// group's entry sequence. Appends are all-or-nothing; a failed append
/// leaves the ledger exactly as it was.
#[derive(Debug)]
pub struct LedgerStore {
    groups: DashMap<GroupId, Arc<RwLock<GroupState>>>,
    lock_timeout: Duration,
    append_retries: u32,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new(&LedgerConfig::default())
    }
}

impl LedgerStore {
    /// Creates an empty store with the given lock timeout and retry budget.
    #[must_use]
    pub fn new(config: &LedgerConfig) -> Self {
        Self {
            groups: DashMap::new(),
            lock_timeout: Duration::from_millis(config.lock_timeout_ms),
            append_retries: config.append_retries,
        }
    }

    /// Creates a new group with the creator as its sole member.
    ///
    /// # Errors
    ///
    /// Returns `EmptyName` if the name is empty.
    pub fn create_group(&self, name: &str, creator: UserId) -> Result<Group, LedgerError> {
        validation::validate_group_name(name)?;

        let group = Group::new(name.trim(), creator);
        let state = GroupState {
            group: group.clone(),
            entries: Vec::new(),
            cached_balances: None,
        };
        self.groups.insert(group.id, Arc::new(RwLock::new(state)));

        Ok(group)
    }

    /// Returns a snapshot of the group.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group.
    pub async fn group(&self, group_id: GroupId) -> Result<Group, LedgerError> {
        let state = self.read_state(group_id).await?;
        Ok(state.group.clone())
    }

    /// Adds a member to a group. Membership only grows.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyMember` if the user is already in the group, and
    /// `GroupNotFound` for an unknown group.
    pub async fn add_member(
        &self,
        group_id: GroupId,
        user: UserId,
    ) -> Result<Group, LedgerError> {
        let mut state = self.write_state(group_id).await?;

        if !state.group.add_member(user) {
            return Err(LedgerError::AlreadyMember(user));
        }

        // The balance map gains a zero entry for the new member.
        state.cached_balances = None;

        Ok(state.group.clone())
    }

    /// Appends an expense to a group's ledger.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive, the
    /// participant set is empty, or any referenced user is not a member;
    /// `GroupNotFound` for an unknown group; `Contended` if the group's
    /// exclusive section stayed busy past the retry budget.
    pub async fn append_expense(
        &self,
        group_id: GroupId,
        input: ExpenseInput,
    ) -> Result<Expense, LedgerError> {
        let mut state = self.write_state(group_id).await?;

        validation::validate_expense(&state.group, &input)?;

        let expense = Expense {
            id: ExpenseId::new(),
            group_id,
            payer: input.payer,
            amount: input.amount,
            description: input.description,
            split_between: input.split_between,
            created_at: Utc::now(),
        };

        state.entries.push(LedgerEntry::Expense(expense.clone()));
        state.cached_balances = None;

        Ok(expense)
    }

    /// Appends a settlement to a group's ledger.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the amount is not positive, the payer
    /// and payee coincide, or either party is not a member; `GroupNotFound`
    /// for an unknown group; `Contended` past the retry budget.
    pub async fn append_settlement(
        &self,
        group_id: GroupId,
        input: SettlementInput,
    ) -> Result<Settlement, LedgerError> {
        let mut state = self.write_state(group_id).await?;

        validation::validate_settlement(&state.group, &input)?;

        let settlement = Settlement {
            id: SettlementId::new(),
            group_id,
            payer: input.payer,
            payee: input.payee,
            amount: input.amount,
            created_at: Utc::now(),
        };

        state
            .entries
            .push(LedgerEntry::Settlement(settlement.clone()));
        state.cached_balances = None;

        Ok(settlement)
    }

    /// Returns a group's full entry sequence in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group.
    pub async fn entries(&self, group_id: GroupId) -> Result<Vec<LedgerEntry>, LedgerError> {
        let state = self.read_state(group_id).await?;
        Ok(state.entries.clone())
    }

    /// Computes (or returns the cached) net-balance map for a group.
    ///
    /// The cache is invalidated synchronously by every successful append
    /// under the same per-group lock, so two calls with no intervening
    /// append return identical maps.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group, and `UnbalancedLedger`
    /// if the computed map fails the zero-sum check (an internal fault).
    pub async fn balances(&self, group_id: GroupId) -> Result<NetBalance, LedgerError> {
        {
            let state = self.read_state(group_id).await?;
            if let Some(cached) = &state.cached_balances {
                return Ok(cached.clone());
            }
        }

        // Cache miss: recompute under the write lock. Another task may have
        // filled the cache while we waited, so check again.
        let mut state = self.write_state(group_id).await?;
        if let Some(cached) = &state.cached_balances {
            return Ok(cached.clone());
        }

        let balances = balance::compute(&state.group, &state.entries);
        if !balance::is_zero_sum(&balances) {
            let sum: Amount = balances.values().copied().sum();
            return Err(LedgerError::UnbalancedLedger { group_id, sum });
        }

        state.cached_balances = Some(balances.clone());
        Ok(balances)
    }

    /// Computes settlement suggestions that would zero the group's balances.
    ///
    /// Purely derived; nothing is appended. Recording an actual settlement
    /// is a separate, explicit call to [`Self::append_settlement`].
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group; invariant faults
    /// propagate from the balance computation.
    pub async fn settle_suggestions(
        &self,
        group_id: GroupId,
    ) -> Result<Vec<SettlementSuggestion>, LedgerError> {
        let balances = self.balances(group_id).await?;
        simplify::simplify(&balances)
    }

    /// Returns the number of groups currently held by the store.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn handle(&self, group_id: GroupId) -> Result<Arc<RwLock<GroupState>>, LedgerError> {
        self.groups
            .get(&group_id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(LedgerError::GroupNotFound(group_id))
    }

    async fn read_state(
        &self,
        group_id: GroupId,
    ) -> Result<OwnedRwLockReadGuard<GroupState>, LedgerError> {
        let lock = self.handle(group_id)?;
        timeout(self.lock_timeout, lock.read_owned())
            .await
            .map_err(|_| LedgerError::Contended(group_id))
    }

    /// Enters the group's exclusive section, retrying a bounded number of
    /// times before surfacing `Contended`.
    async fn write_state(
        &self,
        group_id: GroupId,
    ) -> Result<OwnedRwLockWriteGuard<GroupState>, LedgerError> {
        let lock = self.handle(group_id)?;

        let attempts = self.append_retries.saturating_add(1);
        for _ in 0..attempts {
            if let Ok(guard) = timeout(self.lock_timeout, Arc::clone(&lock).write_owned()).await {
                return Ok(guard);
            }
        }

        Err(LedgerError::Contended(group_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn expense_input(payer: UserId, amount: i64, participants: &[UserId]) -> ExpenseInput {
        ExpenseInput {
            payer,
            amount: Amount::new(amount),
            description: "Test expense".to_string(),
            split_between: participants.iter().copied().collect::<BTreeSet<_>>(),
        }
    }

    async fn three_member_group(store: &LedgerStore) -> (GroupId, UserId, UserId, UserId) {
        let mut users = vec![UserId::new(), UserId::new(), UserId::new()];
        users.sort();
        let (alice, bob, carol) = (users[0], users[1], users[2]);

        let group = store.create_group("Trip", alice).unwrap();
        store.add_member(group.id, bob).await.unwrap();
        store.add_member(group.id, carol).await.unwrap();

        (group.id, alice, bob, carol)
    }

    #[tokio::test]
    async fn test_create_and_get_group() {
        let store = LedgerStore::default();
        let creator = UserId::new();

        let group = store.create_group("Flatmates", creator).unwrap();
        let fetched = store.group(group.id).await.unwrap();

        assert_eq!(fetched.id, group.id);
        assert_eq!(fetched.name, "Flatmates");
        assert!(fetched.is_member(creator));
        assert_eq!(store.group_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_group_name_rejected() {
        let store = LedgerStore::default();
        assert!(matches!(
            store.create_group("  ", UserId::new()),
            Err(LedgerError::EmptyName)
        ));
    }

    #[tokio::test]
    async fn test_unknown_group() {
        let store = LedgerStore::default();
        let missing = GroupId::new();

        assert!(matches!(
            store.group(missing).await,
            Err(LedgerError::GroupNotFound(id)) if id == missing
        ));
        assert!(matches!(
            store.balances(missing).await,
            Err(LedgerError::GroupNotFound(_))
        ));
        assert!(matches!(
            store.entries(missing).await,
            Err(LedgerError::GroupNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_member_twice_conflicts() {
        let store = LedgerStore::default();
        let creator = UserId::new();
        let group = store.create_group("Trip", creator).unwrap();

        let other = UserId::new();
        store.add_member(group.id, other).await.unwrap();

        assert!(matches!(
            store.add_member(group.id, other).await,
            Err(LedgerError::AlreadyMember(u)) if u == other
        ));
    }

    // Scenarios A-C end to end through the store.
    #[tokio::test]
    async fn test_expense_settlement_suggestion_flow() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, carol) = three_member_group(&store).await;

        store
            .append_expense(group_id, expense_input(alice, 900, &[alice, bob, carol]))
            .await
            .unwrap();

        let balances = store.balances(group_id).await.unwrap();
        assert_eq!(balances[&alice], Amount::new(600));
        assert_eq!(balances[&bob], Amount::new(-300));
        assert_eq!(balances[&carol], Amount::new(-300));

        store
            .append_settlement(
                group_id,
                SettlementInput {
                    payer: bob,
                    payee: alice,
                    amount: Amount::new(300),
                },
            )
            .await
            .unwrap();

        let balances = store.balances(group_id).await.unwrap();
        assert_eq!(balances[&alice], Amount::new(300));
        assert_eq!(balances[&bob], Amount::ZERO);
        assert_eq!(balances[&carol], Amount::new(-300));

        let suggestions = store.settle_suggestions(group_id).await.unwrap();
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].from, carol);
        assert_eq!(suggestions[0].to, alice);
        assert_eq!(suggestions[0].amount, Amount::new(300));
    }

    // Scenario D: a failed append leaves the ledger unchanged.
    #[tokio::test]
    async fn test_failed_append_leaves_ledger_untouched() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, _) = three_member_group(&store).await;

        store
            .append_expense(group_id, expense_input(alice, 500, &[alice, bob]))
            .await
            .unwrap();
        assert_eq!(store.entries(group_id).await.unwrap().len(), 1);

        let stranger = UserId::new();
        let result = store
            .append_expense(group_id, expense_input(alice, 500, &[alice, stranger]))
            .await;
        assert!(matches!(result, Err(LedgerError::NotAMember(u)) if u == stranger));

        assert_eq!(store.entries(group_id).await.unwrap().len(), 1);
    }

    // Entries at the per-entry cap replay exactly; anything larger never
    // reaches the ledger, so balance sums stay inside i64.
    #[tokio::test]
    async fn test_amounts_are_capped_per_entry() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, _) = three_member_group(&store).await;

        let cap = validation::MAX_ENTRY_AMOUNT.minor_units();
        for _ in 0..2 {
            store
                .append_expense(group_id, expense_input(alice, cap, &[bob]))
                .await
                .unwrap();
        }

        let balances = store.balances(group_id).await.unwrap();
        assert_eq!(balances[&alice], Amount::new(2 * cap));
        assert_eq!(balances[&bob], Amount::new(-2 * cap));

        let result = store
            .append_expense(group_id, expense_input(alice, i64::MAX, &[alice, bob]))
            .await;
        assert!(matches!(result, Err(LedgerError::AmountTooLarge(_))));
        assert_eq!(store.entries(group_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_entries_in_insertion_order() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, _) = three_member_group(&store).await;

        store
            .append_expense(group_id, expense_input(alice, 100, &[bob]))
            .await
            .unwrap();
        store
            .append_settlement(
                group_id,
                SettlementInput {
                    payer: bob,
                    payee: alice,
                    amount: Amount::new(100),
                },
            )
            .await
            .unwrap();

        let entries = store.entries(group_id).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], LedgerEntry::Expense(_)));
        assert!(matches!(entries[1], LedgerEntry::Settlement(_)));
    }

    #[tokio::test]
    async fn test_balances_idempotent_and_cached() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, carol) = three_member_group(&store).await;

        store
            .append_expense(group_id, expense_input(alice, 1000, &[alice, bob, carol]))
            .await
            .unwrap();

        let first = store.balances(group_id).await.unwrap();
        let second = store.balances(group_id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_new_member_appears_with_zero_balance() {
        let store = LedgerStore::default();
        let (group_id, alice, bob, _) = three_member_group(&store).await;

        store
            .append_expense(group_id, expense_input(alice, 100, &[bob]))
            .await
            .unwrap();
        // Warm the cache, then grow the group.
        store.balances(group_id).await.unwrap();

        let dave = UserId::new();
        store.add_member(group_id, dave).await.unwrap();

        let balances = store.balances(group_id).await.unwrap();
        assert_eq!(balances[&dave], Amount::ZERO);
        assert_eq!(balances.len(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_appends_serialize() {
        let store = Arc::new(LedgerStore::default());
        let (group_id, alice, bob, carol) = three_member_group(&store).await;

        let mut handles = Vec::new();
        for i in 0..32i64 {
            let store = Arc::clone(&store);
            let payer = if i % 2 == 0 { alice } else { bob };
            handles.push(tokio::spawn(async move {
                store
                    .append_expense(group_id, expense_input(payer, 90 + i, &[alice, bob, carol]))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let entries = store.entries(group_id).await.unwrap();
        assert_eq!(entries.len(), 32);

        let balances = store.balances(group_id).await.unwrap();
        let sum: Amount = balances.values().copied().sum();
        assert!(sum.is_zero());
    }
}
