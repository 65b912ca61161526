//! Property-based tests for net-balance computation.

use std::collections::BTreeSet;

use chrono::Utc;
use proptest::prelude::*;
use splitledger_shared::types::{Amount, ExpenseId, SettlementId, UserId};

use crate::group::Group;
use crate::ledger::entry::{Expense, LedgerEntry, Settlement};

use super::{compute, is_zero_sum, split_amount};

/// A generated ledger event, index-based so it can be resolved against
/// whatever member set the group ends up with.
#[derive(Debug, Clone)]
enum RawEvent {
    Expense {
        payer: usize,
        amount: i64,
        participants: Vec<usize>,
    },
    Settlement {
        payer: usize,
        payee: usize,
        amount: i64,
    },
}

fn raw_event_strategy(member_count: usize) -> impl Strategy<Value = RawEvent> {
    let expense = (
        0..member_count,
        1i64..1_000_000,
        prop::collection::vec(0..member_count, 1..=member_count),
    )
        .prop_map(|(payer, amount, participants)| RawEvent::Expense {
            payer,
            amount,
            participants,
        });

    let settlement = (0..member_count, 0..member_count, 1i64..1_000_000).prop_filter_map(
        "payer and payee must differ",
        |(payer, payee, amount)| {
            (payer != payee).then_some(RawEvent::Settlement {
                payer,
                payee,
                amount,
            })
        },
    );

    prop_oneof![expense, settlement]
}

fn ledger_strategy() -> impl Strategy<Value = (usize, Vec<RawEvent>)> {
    (2usize..=6).prop_flat_map(|member_count| {
        (
            Just(member_count),
            prop::collection::vec(raw_event_strategy(member_count), 0..30),
        )
    })
}

fn build_group(member_count: usize) -> (Group, Vec<UserId>) {
    let mut members: Vec<UserId> = (0..member_count).map(|_| UserId::new()).collect();
    members.sort();
    let mut group = Group::new("Prop", members[0]);
    for member in &members[1..] {
        group.add_member(*member);
    }
    (group, members)
}

fn resolve(group: &Group, members: &[UserId], events: &[RawEvent]) -> Vec<LedgerEntry> {
    events
        .iter()
        .map(|event| match event {
            RawEvent::Expense {
                payer,
                amount,
                participants,
            } => LedgerEntry::Expense(Expense {
                id: ExpenseId::new(),
                group_id: group.id,
                payer: members[*payer],
                amount: Amount::new(*amount),
                description: "prop".to_string(),
                split_between: participants.iter().map(|i| members[*i]).collect(),
                created_at: Utc::now(),
            }),
            RawEvent::Settlement {
                payer,
                payee,
                amount,
            } => LedgerEntry::Settlement(Settlement {
                id: SettlementId::new(),
                group_id: group.id,
                payer: members[*payer],
                payee: members[*payee],
                amount: Amount::new(*amount),
                created_at: Utc::now(),
            }),
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For all groups at all times, computed balances sum to exactly zero.
    #[test]
    fn prop_balances_always_sum_to_zero((member_count, events) in ledger_strategy()) {
        let (group, members) = build_group(member_count);
        let entries = resolve(&group, &members, &events);

        let balances = compute(&group, &entries);

        prop_assert!(is_zero_sum(&balances));
        prop_assert_eq!(balances.len(), member_count);
    }

    /// Shares reconstruct the expense amount exactly - no currency leaks
    /// from rounding.
    #[test]
    fn prop_shares_reconstruct_amount(
        amount in 1i64..10_000_000,
        member_count in 1usize..=12,
    ) {
        let participants: BTreeSet<UserId> =
            (0..member_count).map(|_| UserId::new()).collect();

        let shares = split_amount(Amount::new(amount), &participants);

        let total: Amount = shares.iter().map(|(_, s)| *s).sum();
        prop_assert_eq!(total, Amount::new(amount));
        prop_assert_eq!(shares.len(), member_count);
    }

    /// Shares differ by at most one minor unit, and the larger shares go
    /// to the smallest user ids.
    #[test]
    fn prop_shares_are_even_and_ordered(
        amount in 1i64..10_000_000,
        member_count in 2usize..=12,
    ) {
        let participants: BTreeSet<UserId> =
            (0..member_count).map(|_| UserId::new()).collect();

        let shares = split_amount(Amount::new(amount), &participants);

        let min = shares.iter().map(|(_, s)| *s).min().unwrap();
        let max = shares.iter().map(|(_, s)| *s).max().unwrap();
        prop_assert!(max - min <= Amount::new(1));

        // Non-increasing in ascending id order
        for pair in shares.windows(2) {
            prop_assert!(pair[0].1 >= pair[1].1);
        }
    }

    /// Calling compute twice with no intervening append yields identical maps.
    #[test]
    fn prop_compute_is_deterministic((member_count, events) in ledger_strategy()) {
        let (group, members) = build_group(member_count);
        let entries = resolve(&group, &members, &events);

        prop_assert_eq!(compute(&group, &entries), compute(&group, &entries));
    }
}
