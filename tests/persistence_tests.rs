//! Integration tests for file-backed persistence and degraded storage

use policybook::storage::NullGateway;
use policybook::{
    BlobStore, BookConfig, FileBlobStore, JsonGateway, MemoryBlobStore, PolicyBook, PolicyDraft,
    PolicyError, RecordId,
};
use chrono::NaiveDate;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

const KEY: &str = "insuranceData";

fn draft(name: &str) -> PolicyDraft {
    PolicyDraft::from_json(json!({
        "custName": name,
        "phone": "0811111111",
        "plate": "กก-1",
        "model": "Isuzu D-Max",
        "year": "2018",
        "insuranceType": "พรบ",
        "premiumPRB": 645.21
    }))
    .unwrap()
}

fn memory_book(blobs: &MemoryBlobStore) -> PolicyBook {
    PolicyBook::with_gateway(
        BookConfig::default(),
        Box::new(JsonGateway::new(blobs.clone(), KEY)),
    )
    .into_value()
}

#[test]
fn test_reopen_restores_collection() {
    let temp_dir = TempDir::new().unwrap();
    let config = BookConfig::new(temp_dir.path());

    let (first_id, second_id) = {
        let mut book = PolicyBook::open(config.clone()).into_value();
        let a = book.create(draft("a")).unwrap().into_value();
        let b = book.create(draft("b")).unwrap().into_value();
        book.delete(a.id()).unwrap();
        let c = book.create(draft("c")).unwrap().into_value();
        (b.id().clone(), c.id().clone())
    };

    assert!(config.storage_path().exists());

    let reopened = PolicyBook::open(config).into_value();
    let ids: Vec<&RecordId> = reopened.records().iter().map(|r| r.id()).collect();
    assert_eq!(ids, [&first_id, &second_id]);
    assert_eq!(reopened.records()[0].total_amount(), 645.21);
}

#[test]
fn test_persisted_blob_uses_camel_case_keys() {
    let temp_dir = TempDir::new().unwrap();
    let mut book = PolicyBook::open(BookConfig::new(temp_dir.path())).into_value();
    book.create(draft("a")).unwrap();

    let raw = fs::read(temp_dir.path().join("insuranceData.json")).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let entry = &value.as_array().unwrap()[0];
    for key in ["id", "timestamp", "custName", "memberLevel", "premiumPRB", "paymentType", "totalAmount"] {
        assert!(entry.get(key).is_some(), "missing {}", key);
    }
    assert_eq!(entry["paymentType"], json!("เต็มจำนวน"));
    assert_eq!(entry["docAddress"], json!("ตามบัตรประชาชน"));
}

#[test]
fn test_corrupt_file_opens_empty_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("insuranceData.json"), b"\x00garbage").unwrap();

    let outcome = PolicyBook::open(BookConfig::new(temp_dir.path()));
    assert!(matches!(
        outcome.warnings.as_slice(),
        [PolicyError::PersistenceWarning(_)]
    ));
    let mut book = outcome.into_value();
    assert!(book.is_empty());

    // The book stays usable and overwrites the corrupt blob
    book.create(draft("fresh")).unwrap();
    assert_eq!(PolicyBook::open(BookConfig::new(temp_dir.path())).into_value().len(), 1);
}

#[test]
fn test_failed_save_is_a_warning_and_keeps_memory_state() {
    let blobs = MemoryBlobStore::new();
    let mut book = memory_book(&blobs);
    book.create(draft("saved")).unwrap();

    blobs.set_fail_writes(true);
    let outcome = book.create(draft("unsaved")).unwrap();
    assert_eq!(outcome.warnings.len(), 1);
    assert!(!outcome.warnings[0].is_fatal());
    assert_eq!(book.len(), 2);

    let id = outcome.value.id().clone();
    let deleted = book.delete(&id).unwrap();
    assert!(deleted.has_warnings());
    assert_eq!(book.len(), 1);

    // Storage still holds the last good write
    blobs.set_fail_writes(false);
    assert_eq!(memory_book(&blobs).len(), 1);
}

#[test]
fn test_legacy_store_loads_and_rekeys_duplicates() {
    let blobs = MemoryBlobStore::new();
    let entry = json!({
        "id": 1700000000000u64,
        "timestamp": "2023-11-14T22:13:20.000Z",
        "custName": "เก่า",
        "phone": "02",
        "plate": "1กก-1",
        "model": "Nissan March",
        "year": "2015",
        "insuranceType": "พรบ",
        "premiumPRB": 600,
        "totalAmount": 600
    });
    blobs
        .put(KEY, json!([entry.clone(), entry]).to_string().as_bytes())
        .unwrap();

    let outcome = PolicyBook::with_gateway(
        BookConfig::default(),
        Box::new(JsonGateway::new(blobs.clone(), KEY)),
    );
    assert_eq!(outcome.warnings.len(), 1);
    let book = outcome.into_value();
    assert_eq!(book.len(), 2);
    assert_eq!(book.records()[0].id().as_str(), "1700000000000");
    assert_ne!(book.records()[1].id(), book.records()[0].id());
    assert!(book.get(&RecordId::from("1700000000000")).is_some());
}

#[test]
fn test_spreadsheet_typed_legacy_record_survives_reload_and_save() {
    let blobs = MemoryBlobStore::new();
    let entry = json!({
        "id": 1700000000000.5,
        "timestamp": "2023-11-14T22:13:20.000Z",
        "custName": "นำเข้า",
        "memberLevel": "ไม่เป็นสมาชิก",
        "phone": 812345678,
        "plate": "1กก-1",
        "model": "Honda City",
        "year": 2020,
        "cc": 1500,
        "seat": 5,
        "color": "",
        "useType": "ใช้ส่วนบุคคล",
        "insuranceType": "พรบ",
        "premiumPRB": 645.21,
        "discountPRB": "0",
        "premiumVOL": 0,
        "totalAmount": 645.21,
        "startPRB": 45306,
        "endPRB": "2025-01-15",
        "startVOL": null,
        "endVOL": "",
        "paymentType": "เต็มจำนวน"
    });
    blobs.put(KEY, json!([entry]).to_string().as_bytes()).unwrap();

    let outcome = PolicyBook::with_gateway(
        BookConfig::default(),
        Box::new(JsonGateway::new(blobs.clone(), KEY)),
    );
    assert!(!outcome.has_warnings(), "{:?}", outcome.warnings);
    let mut book = outcome.into_value();
    assert_eq!(book.len(), 1);

    let legacy = &book.records()[0];
    assert_eq!(legacy.vehicle().year, "2020");
    assert_eq!(legacy.vehicle().displacement, "1500");
    assert_eq!(legacy.vehicle().seats, "5");
    assert_eq!(legacy.customer().phone, "812345678");
    assert_eq!(legacy.policy().compulsory.start, NaiveDate::from_ymd_opt(2024, 1, 15));
    assert_eq!(legacy.policy().voluntary.start, None);
    assert_eq!(legacy.total_amount(), 645.21);

    // A later save keeps the legacy record, now in canonical form
    book.create(draft("new")).unwrap();
    let stored: serde_json::Value = serde_json::from_slice(&blobs.raw(KEY).unwrap()).unwrap();
    let stored = stored.as_array().unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0]["year"], json!("2020"));
    assert_eq!(stored[0]["startPRB"], json!("2024-01-15"));
    assert_eq!(memory_book(&blobs).len(), 2);
}

#[test]
fn test_bulk_insert_saves_once_per_batch() {
    let blobs = MemoryBlobStore::new();
    let mut book = memory_book(&blobs);
    book.bulk_insert((0..50).map(|i| draft(&i.to_string())).collect());

    let stored: serde_json::Value = serde_json::from_slice(&blobs.raw(KEY).unwrap()).unwrap();
    assert_eq!(stored.as_array().unwrap().len(), 50);
}

#[test]
fn test_file_store_writes_into_missing_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");
    let store = FileBlobStore::new(&nested);
    assert_eq!(store.get(KEY).unwrap(), None);
    store.put(KEY, b"[]").unwrap();
    assert_eq!(store.get(KEY).unwrap(), Some(b"[]".to_vec()));
}

#[test]
fn test_null_gateway_keeps_nothing() {
    let mut book = PolicyBook::with_gateway(BookConfig::default(), Box::new(NullGateway)).into_value();
    book.create(draft("a")).unwrap();
    let again = PolicyBook::with_gateway(BookConfig::default(), Box::new(NullGateway)).into_value();
    assert!(again.is_empty());
}
