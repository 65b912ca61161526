//! Property-based tests for debt simplification.

use std::collections::BTreeMap;

use proptest::prelude::*;
use splitledger_shared::types::{Amount, UserId};

use crate::balance::NetBalance;

use super::simplify;

/// Generates a zero-sum balance map: arbitrary signed amounts for all
/// members but one, and the negated sum for the last member.
fn zero_sum_balances() -> impl Strategy<Value = NetBalance> {
    prop::collection::vec(-1_000_000i64..1_000_000, 1..=10).prop_map(|mut amounts| {
        let sum: i64 = amounts.iter().sum();
        amounts.push(-sum);

        let mut users: Vec<UserId> = (0..amounts.len()).map(|_| UserId::new()).collect();
        users.sort();

        users
            .into_iter()
            .zip(amounts)
            .map(|(user, amount)| (user, Amount::new(amount)))
            .collect::<BTreeMap<_, _>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Applying the suggestions as settlements (payer credited, payee
    /// debited) drives every balance in the snapshot to zero.
    #[test]
    fn prop_suggestions_zero_all_balances(balances in zero_sum_balances()) {
        let suggestions = simplify(&balances).unwrap();

        let mut remaining = balances;
        for suggestion in &suggestions {
            *remaining.get_mut(&suggestion.from).unwrap() += suggestion.amount;
            *remaining.get_mut(&suggestion.to).unwrap() -= suggestion.amount;
        }

        for (user, balance) in &remaining {
            prop_assert!(balance.is_zero(), "user {user} left with {balance}");
        }
    }

    /// Never a self-payment, never a zero or negative amount.
    #[test]
    fn prop_suggestions_are_well_formed(balances in zero_sum_balances()) {
        let suggestions = simplify(&balances).unwrap();

        for suggestion in &suggestions {
            prop_assert_ne!(suggestion.from, suggestion.to);
            prop_assert!(suggestion.amount.is_positive());
        }
    }

    /// The greedy matching emits at most nonzero_balances - 1 transactions.
    #[test]
    fn prop_output_length_bound(balances in zero_sum_balances()) {
        let nonzero = balances.values().filter(|b| !b.is_zero()).count();
        let suggestions = simplify(&balances).unwrap();

        prop_assert!(suggestions.len() <= nonzero.saturating_sub(1));
    }

    /// Same balances in, same suggestions out.
    #[test]
    fn prop_simplify_is_deterministic(balances in zero_sum_balances()) {
        prop_assert_eq!(simplify(&balances).unwrap(), simplify(&balances).unwrap());
    }
}
