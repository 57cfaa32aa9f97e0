//! Integration tests for record store CRUD and identity rules

use policybook::{
    InsuranceType, PaymentPlan, PolicyBook, PolicyDraft, PolicyError, RecordId, RecordStore,
};
use serde_json::json;
use std::collections::HashSet;

fn draft(name: &str, plate: &str) -> PolicyDraft {
    PolicyDraft::from_json(json!({
        "custName": name,
        "phone": "0812345678",
        "plate": plate,
        "model": "Toyota Vios",
        "year": "2020",
        "insuranceType": "พรบ+สมัครใจ",
        "premiumPRB": 1000,
        "discountPRB": 100,
        "premiumVOL": 5000,
        "discountVOL": 500
    }))
    .unwrap()
}

#[test]
fn test_create_captures_total() {
    let mut store = RecordStore::in_memory();
    let record = store.create(draft("สมชาย", "กข-1234")).unwrap().into_value();
    assert_eq!(record.total_amount(), 5400.00);
}

#[test]
fn test_total_is_captured_not_derived() {
    let mut store = RecordStore::in_memory();
    let record = store.create(draft("a", "p-1")).unwrap().into_value();

    // Editing a draft copy does not touch the stored total
    let mut edited = record.to_draft();
    edited.policy.voluntary.premium = 9000.0;
    assert_eq!(store.get(record.id()).unwrap().total_amount(), 5400.0);

    let updated = store.update(record.id(), edited).unwrap().into_value();
    assert_eq!(updated.total_amount(), 9400.0);
}

#[test]
fn test_ids_unique_and_order_preserved() {
    let mut store = RecordStore::in_memory();
    let mut ids = Vec::new();
    for i in 0..20 {
        let record = store
            .create(draft(&format!("c{}", i), &format!("p-{}", i)))
            .unwrap()
            .into_value();
        ids.push(record.id().clone());
    }
    store.delete(&ids[3]).unwrap();
    store.delete(&ids[10]).unwrap();
    store.update(&ids[5], draft("changed", "p-5")).unwrap();

    let survivors: Vec<&RecordId> = store.all().iter().map(|r| r.id()).collect();
    let expected: Vec<&RecordId> = ids
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 3 && *i != 10)
        .map(|(_, id)| id)
        .collect();
    assert_eq!(survivors, expected);

    let unique: HashSet<&RecordId> = survivors.iter().copied().collect();
    assert_eq!(unique.len(), 18);
    assert_eq!(store.all()[4].customer().name, "changed");
}

#[test]
fn test_delete_unknown_leaves_collection_unchanged() {
    let mut store = RecordStore::in_memory();
    store.create(draft("a", "p-1")).unwrap();
    store.create(draft("b", "p-2")).unwrap();
    let before = store.all().to_vec();

    let err = store.delete(&RecordId::from("nope")).unwrap_err();
    assert_eq!(err, PolicyError::NotFound(RecordId::from("nope")));
    assert!(err.is_fatal());
    assert_eq!(store.all(), before.as_slice());
}

#[test]
fn test_second_delete_fails() {
    let mut store = RecordStore::in_memory();
    let id = store.create(draft("a", "p-1")).unwrap().into_value().id().clone();
    assert!(store.delete(&id).is_ok());
    assert!(matches!(store.delete(&id), Err(PolicyError::NotFound(_))));
}

#[test]
fn test_loose_draft_missing_required_field() {
    let err = PolicyDraft::from_json(json!({
        "custName": "a",
        "phone": "1",
        "model": "m",
        "year": "2020",
        "insuranceType": "พรบ"
    }))
    .unwrap_err();
    assert!(matches!(err, PolicyError::MalformedRecord(ref msg) if msg.contains("plate")));
}

#[test]
fn test_update_preserves_identity() {
    let mut store = RecordStore::in_memory();
    let original = store.create(draft("a", "p-1")).unwrap().into_value();
    let mut changed = draft("b", "p-9");
    changed.policy.insurance_type = InsuranceType::Voluntary;
    changed.policy.payment_plan = PaymentPlan::installment(6);

    let updated = store.update(original.id(), changed).unwrap().into_value();
    assert_eq!(updated.id(), original.id());
    assert_eq!(updated.created_at(), original.created_at());
    assert_eq!(updated.vehicle().plate, "P-9");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_bulk_insert_reports_each_row() {
    let mut book = PolicyBook::in_memory();
    let mut bad = draft("bad", "x");
    bad.policy.payment_plan =
        PaymentPlan::Installment(policybook::InstallmentMonths::Custom("  ".into()));

    let outcome = book.bulk_insert(vec![draft("a", "p-1"), bad, draft("c", "p-3")]);
    assert_eq!(outcome.value.len(), 2);
    assert_eq!(outcome.warnings.len(), 1);
    assert!(!outcome.warnings[0].is_fatal());
    assert_eq!(book.len(), 2);
}

#[test]
fn test_stats_and_clear() {
    let mut book = PolicyBook::in_memory();
    book.create(draft("a", "p-1")).unwrap();
    book.create(draft("b", "p-2")).unwrap();
    let stats = book.stats();
    assert_eq!(stats.record_count, 2);
    assert_eq!(stats.total_amount, 10800.0);

    assert_eq!(book.clear_all().into_value(), 2);
    assert!(book.is_empty());
    assert_eq!(book.current_page().meta.total_filtered, 0);
}
