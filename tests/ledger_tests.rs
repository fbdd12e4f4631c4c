use std::collections::BTreeMap;

use chrono::Utc;
use stash_split::core::{AllocationPlan, Deposit, Ledger};

fn half_and_half() -> AllocationPlan {
    AllocationPlan::new(BTreeMap::from([
        ("a".to_string(), 0.5),
        ("b".to_string(), 0.5),
    ]))
    .unwrap()
}

#[test]
fn deposits_are_appended_in_order() {
    let plan = half_and_half();
    let mut ledger = Ledger::default();
    for amount in [10.0, 20.0, 30.0] {
        ledger.append(Deposit::new(amount, &plan, Utc::now()).unwrap());
    }

    let amounts: Vec<_> = ledger.deposits().map(|d| d.amount).collect();
    assert_eq!(amounts, vec![10.0, 20.0, 30.0]);
}

#[test]
fn pop_last_is_the_inverse_of_append() {
    let plan = half_and_half();
    let mut ledger = Ledger::default();
    ledger.append(Deposit::new(10.0, &plan, Utc::now()).unwrap());
    let before: Vec<_> = ledger.deposits().cloned().collect();

    let recorded = Deposit::new(50.0, &plan, Utc::now()).unwrap();
    ledger.append(recorded.clone());
    let popped = ledger.pop_last().unwrap();

    assert_eq!(popped.amount, recorded.amount);
    assert_eq!(popped.allocations, recorded.allocations);
    let after: Vec<_> = ledger.deposits().cloned().collect();
    assert_eq!(after, before);
}

#[test]
fn clear_empties_the_ledger() {
    let plan = half_and_half();
    let mut ledger = Ledger::default();
    ledger.append(Deposit::new(10.0, &plan, Utc::now()).unwrap());
    ledger.clear();
    assert!(ledger.is_empty());
    assert_eq!(ledger.pop_last(), None);
}

#[test]
fn serialization_round_trip_preserves_history() {
    let plan = half_and_half();
    let mut ledger = Ledger::default();
    ledger.append(Deposit::new(100.0, &plan, Utc::now()).unwrap());
    ledger.append(Deposit::new(25.5, &plan, Utc::now()).unwrap());

    let json = serde_json::to_string(&ledger).unwrap();
    let parsed: Ledger = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, ledger);
}
