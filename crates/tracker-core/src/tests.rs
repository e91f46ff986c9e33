use chrono::{TimeZone, Utc};

use crate::{
    bill_service::BillService,
    schedule::RemainderPolicy,
    session_service::{InMemorySessionStore, SessionService, SessionStore},
    storage::{bill_warnings, BillStore, InMemoryBillStore},
    summary_service::SummaryService,
    time::FixedClock,
    validation::{BillDraft, ValidationError},
    AuthError, CoreError, LocaleCurrency, SignUpMetadata, StubAuthProvider,
};
use tracker_domain::{amounts_match, Bill, Installment, Payment};

fn clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap())
}

fn installment_bill(total: &str, count: u32) -> Bill {
    let draft = BillDraft::new("Sofa", total).with_installments(count.to_string());
    BillService::create_or_update(&draft, None, &clock(), RemainderPolicy::AbsorbInLast)
        .expect("create bill")
}

fn single_bill(total: &str) -> Bill {
    BillService::create_or_update(
        &BillDraft::new("Electricity", total),
        None,
        &clock(),
        RemainderPolicy::AbsorbInLast,
    )
    .expect("create bill")
}

#[test]
fn create_builds_unpaid_schedule() {
    let bill = installment_bill("300", 3);

    assert!(bill.has_installments());
    assert_eq!(bill.installment_count(), 3);
    assert_eq!(bill.installment_amount(), 100.0);
    assert_eq!(bill.paid_value(), 0.0);
    assert_eq!(bill.created_at, clock().0);
    let numbers: Vec<u32> = bill.installments().iter().map(|i| i.number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    assert!(bill.installments().iter().all(|i| !i.paid && i.amount == 100.0));
}

#[test]
fn paid_value_tracks_schedule_after_every_toggle() {
    let mut bill = installment_bill("1.000,00", 7);

    for number in [3, 1, 7, 3, 5, 2, 1] {
        bill = BillService::toggle_installment(&bill, number, &clock()).unwrap();
        assert!(amounts_match(bill.paid_value(), BillService::paid_total(&bill)));
        let expected: f64 = bill
            .installments()
            .iter()
            .filter(|i| i.paid)
            .map(|i| i.amount)
            .sum();
        assert_eq!(bill.paid_value(), expected);
    }
}

#[test]
fn double_toggle_restores_original_state() {
    let original = installment_bill("500", 5);

    let once = BillService::toggle_installment(&original, 2, &clock()).unwrap();
    let installment = once.installment(2).unwrap();
    assert!(installment.paid);
    assert_eq!(installment.paid_at, Some(clock().0));
    assert_eq!(once.paid_value(), 100.0);

    let twice = BillService::toggle_installment(&once, 2, &clock()).unwrap();
    assert_eq!(twice.paid_value(), original.paid_value());
    for (before, after) in original.installments().iter().zip(twice.installments()) {
        assert_eq!(before.paid, after.paid);
    }
    assert!(twice.installment(2).unwrap().paid_at.is_none());
}

#[test]
fn toggling_missing_installment_is_not_found() {
    let bill = installment_bill("90", 3);

    let err = BillService::toggle_installment(&bill, 4, &clock()).unwrap_err();
    assert!(matches!(
        err,
        CoreError::InstallmentNotFound { number: 4, bill: id } if id == bill.id
    ));
    let err = BillService::toggle_installment(&bill, 0, &clock()).unwrap_err();
    assert!(matches!(err, CoreError::InstallmentNotFound { .. }));
}

#[test]
fn edit_merges_payment_state_by_number() {
    let bill = installment_bill("300", 3);
    let bill = BillService::toggle_installment(&bill, 2, &clock()).unwrap();

    let grown = BillService::create_or_update(
        &BillDraft::new("Sofa", "500").with_installments("5"),
        Some(&bill),
        &clock(),
        RemainderPolicy::AbsorbInLast,
    )
    .unwrap();

    assert_eq!(grown.id, bill.id);
    assert_eq!(grown.created_at, bill.created_at);
    assert_eq!(grown.installment_count(), 5);
    let paid: Vec<bool> = grown.installments().iter().map(|i| i.paid).collect();
    assert_eq!(paid, vec![false, true, false, false, false]);
    assert!(grown.installments().iter().all(|i| i.amount == 100.0));
    assert_eq!(grown.paid_value(), 100.0);

    let shrunk = BillService::create_or_update(
        &BillDraft::new("Sofa", "500").with_installments("1"),
        Some(&grown),
        &clock(),
        RemainderPolicy::AbsorbInLast,
    )
    .unwrap();
    assert_eq!(shrunk.installment_count(), 1);
    assert!(!shrunk.installments()[0].paid);
    assert_eq!(shrunk.installments()[0].amount, 500.0);
    assert_eq!(shrunk.paid_value(), 0.0);
}

#[test]
fn shrinking_keeps_first_installment_state() {
    let bill = installment_bill("300", 3);
    let bill = BillService::toggle_installment(&bill, 1, &clock()).unwrap();

    let shrunk = BillService::create_or_update(
        &BillDraft::new("Sofa", "250").with_installments("1"),
        Some(&bill),
        &clock(),
        RemainderPolicy::AbsorbInLast,
    )
    .unwrap();

    assert!(shrunk.installments()[0].paid);
    assert_eq!(shrunk.paid_value(), 250.0);
}

#[test]
fn single_payment_flip_is_binary() {
    let bill = single_bill("100");
    assert_eq!(bill.paid_value(), 0.0);

    let paid = BillService::toggle_single_paid(&bill).unwrap();
    assert_eq!(paid.paid_value(), 100.0);
    assert!(BillService::is_settled(&paid));

    let unpaid = BillService::toggle_single_paid(&paid).unwrap();
    assert_eq!(unpaid.paid_value(), 0.0);
}

#[test]
fn toggles_reject_the_wrong_payment_shape() {
    let single = single_bill("100");
    let split = installment_bill("100", 2);

    assert!(matches!(
        BillService::toggle_installment(&single, 1, &clock()),
        Err(CoreError::InvalidOperation(_))
    ));
    assert!(matches!(
        BillService::toggle_single_paid(&split),
        Err(CoreError::InvalidOperation(_))
    ));
    assert!(matches!(
        BillService::progress(&single),
        Err(CoreError::InvalidOperation(_))
    ));
}

#[test]
fn single_payment_paid_text_is_normalized() {
    let draft = BillDraft::new("Internet", "120").with_paid_value("120,00");
    let bill =
        BillService::create_or_update(&draft, None, &clock(), RemainderPolicy::default()).unwrap();
    assert_eq!(bill.paid_value(), 120.0);

    let partial = BillDraft::new("Internet", "120").with_paid_value("60");
    let bill =
        BillService::create_or_update(&partial, None, &clock(), RemainderPolicy::default())
            .unwrap();
    assert_eq!(bill.paid_value(), 0.0);
}

#[test]
fn editing_single_bill_without_paid_text_keeps_paid_state() {
    let paid = BillService::toggle_single_paid(&single_bill("80")).unwrap();

    let edited = BillService::create_or_update(
        &BillDraft::new("Electricity", "95"),
        Some(&paid),
        &clock(),
        RemainderPolicy::default(),
    )
    .unwrap();

    assert_eq!(edited.paid_value(), 95.0);
}

#[test]
fn validation_reports_first_failing_rule() {
    let err = BillService::create_or_update(
        &BillDraft::new("", "-5"),
        None,
        &clock(),
        RemainderPolicy::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::MissingTitle)
    ));
}

#[test]
fn progress_counts_paid_installments() {
    let bill = installment_bill("400", 4);
    let bill = BillService::toggle_installment(&bill, 3, &clock()).unwrap();

    assert_eq!(BillService::progress(&bill).unwrap(), 25.0);
}

#[test]
fn progress_on_empty_schedule_is_an_invariant_violation() {
    let bill = Bill::new("Broken", 10.0, clock().0).with_payment(Payment::Installments {
        paid_value: 0.0,
        schedule: Vec::new(),
    });

    assert!(matches!(
        BillService::progress(&bill),
        Err(CoreError::InvariantViolation(_))
    ));
}

#[test]
fn uneven_split_sums_to_total() {
    let bill = installment_bill("100", 3);
    let scheduled: f64 = bill.installments().iter().map(|i| i.amount).sum();

    assert!(amounts_match(scheduled, 100.0));
    assert_eq!(bill.installments()[2].amount, 33.34);
    assert!(bill_warnings(&bill).is_empty());
}

#[test]
fn tiny_totals_split_without_negative_installments() {
    for (total, count) in [("1", 150), ("0,05", 10)] {
        let bill = installment_bill(total, count);
        let last = bill.installments().last().unwrap();

        assert!(bill.installments().iter().all(|i| i.amount >= 0.0));
        assert!(bill_warnings(&bill).is_empty(), "{total} / {count}");

        let paid = BillService::toggle_installment(&bill, last.number, &clock()).unwrap();
        assert!(paid.paid_value() > bill.paid_value());
        assert!(amounts_match(paid.paid_value(), last.amount));
    }
}

#[test]
fn sub_cent_totals_are_rejected() {
    let err = BillService::create_or_update(
        &BillDraft::new("Gum", "0,001").with_installments("2"),
        None,
        &clock(),
        RemainderPolicy::default(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::Validation(ValidationError::InvalidTotal)
    ));
}

#[test]
fn locale_aware_create_reads_us_amounts() {
    let locale = LocaleCurrency::for_locale("en-US", "USD");
    let bill = BillService::create_or_update_in(
        &BillDraft::new("Laptop", "$ 1,234.50").with_installments("2"),
        None,
        &clock(),
        RemainderPolicy::default(),
        &locale,
    )
    .unwrap();

    assert_eq!(bill.total_value, 1234.5);
    assert_eq!(bill.installments()[1].amount, 617.25);
}

#[test]
fn summary_totals_bills() {
    let rent = BillService::toggle_single_paid(&single_bill("1000")).unwrap();
    let phone = installment_bill("600", 3);
    let phone = BillService::toggle_installment(&phone, 1, &clock()).unwrap();
    let bills = vec![rent, phone, single_bill("50")];

    let summary = SummaryService::summarize(&bills);
    assert_eq!(summary.bill_count, 3);
    assert_eq!(summary.settled_count, 1);
    assert_eq!(summary.open_count(), 2);
    assert_eq!(summary.total_value, 1650.0);
    assert_eq!(summary.paid_value, 1200.0);
    assert_eq!(summary.remaining_value, 450.0);
    assert_eq!(SummaryService::open_bills(&bills).len(), 2);
}

#[test]
fn warnings_flag_drifted_cache_and_gaps() {
    let mut schedule = vec![Installment::new(1, 50.0), Installment::new(3, 50.0)];
    schedule[0].toggle(clock().0);
    let bill = Bill::new("Drift", 100.0, clock().0).with_payment(Payment::Installments {
        paid_value: 0.0,
        schedule,
    });

    let warnings = bill_warnings(&bill);
    assert_eq!(warnings.len(), 2);
    assert!(warnings.iter().any(|w| w.contains("numbered 3")));
    assert!(warnings.iter().any(|w| w.contains("cached paid value")));
}

#[test]
fn in_memory_store_enforces_contract() {
    let store = InMemoryBillStore::new();
    let bill = single_bill("10");

    store.add(&bill).unwrap();
    assert!(matches!(store.add(&bill), Err(CoreError::DuplicateBill(_))));

    let paid = BillService::toggle_single_paid(&bill).unwrap();
    store.update(&paid).unwrap();
    assert_eq!(store.get(bill.id).unwrap().paid_value(), 10.0);

    let stranger = single_bill("5");
    assert!(matches!(
        store.update(&stranger),
        Err(CoreError::BillNotFound(_))
    ));

    store.delete(bill.id).unwrap();
    store.delete(bill.id).unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn session_sign_in_remembers_when_asked() {
    let provider = StubAuthProvider::default();
    let store = InMemorySessionStore::default();

    let session =
        SessionService::sign_in(&provider, &store, "me@example.com", "1234", false).unwrap();
    assert!(session.is_authenticated());
    assert!(store.load().unwrap().is_none());

    SessionService::sign_in(&provider, &store, "me@example.com", "1234", true).unwrap();
    assert!(SessionService::restore(&store).is_authenticated());

    let signed_out = SessionService::sign_out(&store);
    assert!(!signed_out.is_authenticated());
    assert!(!SessionService::restore(&store).is_authenticated());
}

#[test]
fn session_sign_in_surfaces_auth_errors() {
    let provider = StubAuthProvider::default();
    let store = InMemorySessionStore::default();

    let err = SessionService::sign_in(&provider, &store, "me@example.com", "nope", true)
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::Auth(AuthError::InvalidCredentials)
    ));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn sign_up_and_password_reset_go_through_the_provider() {
    let provider = StubAuthProvider::default();
    let metadata = SignUpMetadata {
        display_name: Some("Ana".into()),
    };

    let user = SessionService::sign_up(&provider, "ana@example.com", "secret", metadata).unwrap();
    assert_eq!(user.email.as_deref(), Some("ana@example.com"));
    assert_eq!(user.display_name.as_deref(), Some("Ana"));

    SessionService::reset_password(&provider, "ana@example.com").unwrap();
    assert!(matches!(
        SessionService::reset_password(&provider, "ana"),
        Err(CoreError::Auth(AuthError::InvalidEmail))
    ));
}
