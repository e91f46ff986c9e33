use std::fs;

use tempfile::tempdir;
use tracker_core::{
    session_service::{SessionService, SessionStore},
    storage::BillStore,
    BillDraft, BillService, CoreError, RemainderPolicy, StubAuthProvider, SystemClock,
};
use tracker_domain::{Bill, User};
use tracker_storage_json::{JsonBillStore, JsonSessionStore};

fn sample_bill(title: &str, installments: u32) -> Bill {
    let draft = BillDraft::new(title, "300").with_installments(installments.to_string());
    BillService::create_or_update(&draft, None, &SystemClock, RemainderPolicy::default())
        .expect("create bill")
}

#[test]
fn json_store_round_trips_bills() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().join("data")).expect("create store");
    assert!(store.list().expect("list empty").is_empty());

    let bill = sample_bill("Fridge", 3);
    store.add(&bill).expect("add bill");

    let toggled = BillService::toggle_installment(&bill, 2, &SystemClock).expect("toggle");
    store.update(&toggled).expect("update bill");

    let reopened = JsonBillStore::new(dir.path().join("data")).expect("reopen store");
    let loaded = reopened.list().expect("list bills");
    assert_eq!(loaded, vec![toggled]);
    assert!(store.bills_path().exists());
}

#[test]
fn json_store_rejects_duplicates_and_unknown_updates() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().to_path_buf()).expect("create store");
    let bill = sample_bill("TV", 2);

    store.add(&bill).expect("add bill");
    assert!(matches!(store.add(&bill), Err(CoreError::DuplicateBill(id)) if id == bill.id));

    let other = sample_bill("Radio", 1);
    assert!(matches!(
        store.update(&other),
        Err(CoreError::BillNotFound(id)) if id == other.id
    ));
}

#[test]
fn json_store_delete_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().to_path_buf()).expect("create store");
    let keep = sample_bill("Keep", 1);
    let gone = sample_bill("Drop", 1);
    store.add(&keep).expect("add keep");
    store.add(&gone).expect("add gone");

    store.delete(gone.id).expect("delete");
    store.delete(gone.id).expect("delete again");

    let remaining = store.list().expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, keep.id);
}

#[test]
fn json_store_keeps_bounded_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::with_retention(dir.path().to_path_buf(), 2).expect("create store");

    let bill = sample_bill("Backed", 2);
    store.add(&bill).expect("first write has nothing to back up");
    assert!(store.list_backups().expect("list backups").is_empty());

    let toggled = BillService::toggle_installment(&bill, 1, &SystemClock).expect("toggle");
    store.update(&toggled).expect("second write");

    let backups = store.list_backups().expect("list backups");
    assert_eq!(backups.len(), 1);
    assert!(backups[0].id.starts_with("bills_"));
    assert!(backups[0].created_at.is_some());

    let restored = store.restore_backup(&backups[0].id).expect("restore");
    assert_eq!(restored, vec![bill.clone()]);
    assert_eq!(store.list().expect("list"), vec![bill]);
    assert!(store.list_backups().expect("list backups").len() <= 2);
}

#[test]
fn rapid_writes_keep_distinct_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().to_path_buf()).expect("create store");

    let bill = sample_bill("Quick", 3);
    store.add(&bill).expect("initial write");
    let mut current = bill;
    for number in 1..=3 {
        current = BillService::toggle_installment(&current, number, &SystemClock).expect("toggle");
        store.update(&current).expect("update");
    }

    let backups = store.list_backups().expect("list backups");
    assert_eq!(backups.len(), 3);
    let mut ids: Vec<&str> = backups.iter().map(|b| b.id.as_str()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    let newest = store.restore_backup(&backups[0].id).expect("restore newest");
    assert_eq!(newest[0].paid_installments(), 2);
}

#[test]
fn restore_rejects_paths_outside_backups() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().join("data")).expect("create store");
    store.add(&sample_bill("Safe", 1)).expect("add");

    assert!(matches!(
        store.restore_backup("../bills.json"),
        Err(CoreError::Storage(_))
    ));
}

#[test]
fn json_store_reports_corrupt_documents() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().to_path_buf()).expect("create store");
    fs::write(store.bills_path(), "{ not json").expect("write corrupt file");

    assert!(matches!(store.list(), Err(CoreError::Serde(_))));
}

#[test]
fn json_store_refuses_newer_schema() {
    let dir = tempdir().expect("tempdir");
    let store = JsonBillStore::new(dir.path().to_path_buf()).expect("create store");
    fs::write(store.bills_path(), r#"{"schema_version": 99, "bills": []}"#)
        .expect("write future file");

    assert!(matches!(store.list(), Err(CoreError::Storage(_))));
}

#[test]
fn session_store_remembers_and_forgets_user() {
    let dir = tempdir().expect("tempdir");
    let store = JsonSessionStore::new(dir.path());
    assert!(store.load().expect("load empty").is_none());

    let provider = StubAuthProvider::default();
    SessionService::sign_in(&provider, &store, "me@example.com", "1234", true).expect("sign in");

    let restored = SessionService::restore(&store);
    assert_eq!(
        restored.user,
        Some(User::new("local-1", Some("me@example.com".into())))
    );

    SessionService::sign_out(&store);
    assert!(store.load().expect("load cleared").is_none());
}

#[test]
fn unreadable_session_restores_anonymous() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("session.json"), "garbage").expect("write garbage");
    let store = JsonSessionStore::new(dir.path());

    assert!(store.load().is_err());
    assert!(!SessionService::restore(&store).is_authenticated());
}
