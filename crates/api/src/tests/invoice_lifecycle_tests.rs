// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice lifecycle tests through the API boundary: issuance with
//! wash-event locking, retry-safe external numbering, cancellation,
//! payment, and the overdue sweep.

use time::macros::date;
use washnet_domain::WashStatus;
use washnet_persistence::Persistence;

use crate::error::ApiError;
use crate::handlers::{
    cancel_invoice, issue_invoice, mark_invoice_paid, mark_invoice_sent, prepare_draft_invoice,
    sweep_overdue,
};
use crate::ports::Notification;
use crate::request_response::{
    CancelInvoiceRequest, InvoiceResponse, IssueInvoiceRequest, MarkInvoicePaidRequest,
    MarkInvoiceSentRequest, PrepareInvoiceRequest, SweepOverdueRequest,
};
use crate::tests::helpers::{
    FailingIssuer, RecordingIssuer, RecordingNotifier, admin, completed_washes, seed_network,
    test_cause, test_ctx, test_now,
};

/// Seeds three completed washes and prepares the January draft.
///
/// Returns the draft invoice id and the partner id.
fn prepared_invoice(persistence: &mut Persistence) -> (i64, i64) {
    let network = seed_network(persistence);
    completed_washes(
        persistence,
        network.own_location_id,
        network.partner_company_id,
        3,
    );

    let invoice_id: i64 = prepare_draft_invoice(
        persistence,
        &test_ctx(),
        PrepareInvoiceRequest {
            partner_company_id: network.partner_company_id,
            period_start: date!(2026 - 01 - 01),
            period_end: date!(2026 - 01 - 31),
            issue_date: date!(2026 - 02 - 01),
            due_days: None,
        },
        &admin(),
        test_cause(),
    )
    .expect("Prepare draft invoice")
    .invoice
    .invoice_id;

    (invoice_id, network.partner_company_id)
}

fn issue(
    persistence: &mut Persistence,
    invoice_id: i64,
    issuer: &RecordingIssuer,
    notifier: &RecordingNotifier,
) -> Result<InvoiceResponse, ApiError> {
    issue_invoice(
        persistence,
        &test_ctx(),
        IssueInvoiceRequest {
            invoice_id,
            issue_date: date!(2026 - 02 - 05),
        },
        &admin(),
        issuer,
        notifier,
        test_cause(),
        test_now(),
    )
}

#[test]
fn test_issue_locks_washes_and_numbers_once() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, _) = prepared_invoice(&mut persistence);
    let issuer: RecordingIssuer = RecordingIssuer::default();
    let notifier: RecordingNotifier = RecordingNotifier::default();

    let response = issue(&mut persistence, invoice_id, &issuer, &notifier).expect("Issue");

    assert_eq!(response.invoice.status, "issued");
    assert_eq!(
        response.invoice.external_number.as_deref(),
        Some(format!("WSH-2026-{invoice_id:04}").as_str())
    );
    // The payment window travels with the new issue date
    assert_eq!(response.invoice.issue_date, date!(2026 - 02 - 05));
    assert_eq!(response.invoice.due_date, date!(2026 - 02 - 20));
    assert_eq!(issuer.calls.get(), 1);

    // Every referenced wash event is now locked
    let washes = persistence
        .list_wash_events_for_invoice(invoice_id)
        .expect("List washes");
    assert_eq!(washes.len(), 3);
    assert!(washes.iter().all(|w| w.status == WashStatus::Locked));

    // The partner was told, best-effort
    assert!(matches!(
        notifier.sent.borrow().as_slice(),
        [Notification::InvoiceIssued { .. }]
    ));
}

#[test]
fn test_issue_retry_never_double_numbers() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, _) = prepared_invoice(&mut persistence);
    let issuer: RecordingIssuer = RecordingIssuer::default();
    let notifier: RecordingNotifier = RecordingNotifier::default();

    let first = issue(&mut persistence, invoice_id, &issuer, &notifier).expect("First issue");
    let second = issue(&mut persistence, invoice_id, &issuer, &notifier).expect("Retried issue");

    assert_eq!(issuer.calls.get(), 1, "the provider is called exactly once");
    assert_eq!(
        first.invoice.external_number,
        second.invoice.external_number
    );
}

#[test]
fn test_failed_external_issuance_stays_retryable() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, _) = prepared_invoice(&mut persistence);
    let notifier: RecordingNotifier = RecordingNotifier::default();

    let result = issue_invoice(
        &mut persistence,
        &test_ctx(),
        IssueInvoiceRequest {
            invoice_id,
            issue_date: date!(2026 - 02 - 05),
        },
        &admin(),
        &FailingIssuer,
        &notifier,
        test_cause(),
        test_now(),
    );

    match result {
        Err(ApiError::ExternalIssuanceFailed { invoice_id: id, .. }) => {
            assert_eq!(id, invoice_id);
        }
        other => panic!("Expected ExternalIssuanceFailed, got {other:?}"),
    }

    // The local transition stands: issued, locked washes, no reference,
    // never reverted to draft
    let pending = persistence.get_invoice(invoice_id).expect("Reload");
    assert_eq!(pending.status.as_str(), "issued");
    assert_eq!(pending.external_id, None);
    let washes = persistence
        .list_wash_events_for_invoice(invoice_id)
        .expect("List washes");
    assert!(washes.iter().all(|w| w.status == WashStatus::Locked));

    // A retry with a healthy provider completes the numbering
    let issuer: RecordingIssuer = RecordingIssuer::default();
    let retried = issue(&mut persistence, invoice_id, &issuer, &notifier).expect("Retry");
    assert_eq!(issuer.calls.get(), 1);
    assert!(retried.invoice.external_number.is_some());
}

#[test]
fn test_cancelling_a_draft_deletes_it_and_frees_the_washes() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, partner_company_id) = prepared_invoice(&mut persistence);

    let response = cancel_invoice(
        &mut persistence,
        &test_ctx(),
        CancelInvoiceRequest { invoice_id },
        &admin(),
        test_cause(),
    )
    .expect("Cancel draft");

    assert!(response.draft_deleted);
    assert_eq!(response.status, "cancelled");

    // The draft row is gone and the washes are billable again
    assert!(persistence.get_invoice(invoice_id).is_err());
    let washes = persistence
        .list_billable_washes(partner_company_id, date!(2026 - 01 - 01), date!(2026 - 01 - 31), None)
        .expect("Billable washes");
    assert_eq!(washes.len(), 3);
}

#[test]
fn test_cancelling_an_issued_invoice_releases_the_washes() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, partner_company_id) = prepared_invoice(&mut persistence);
    issue(
        &mut persistence,
        invoice_id,
        &RecordingIssuer::default(),
        &RecordingNotifier::default(),
    )
    .expect("Issue");

    let response = cancel_invoice(
        &mut persistence,
        &test_ctx(),
        CancelInvoiceRequest { invoice_id },
        &admin(),
        test_cause(),
    )
    .expect("Cancel issued invoice");

    assert!(!response.draft_deleted);
    let cancelled = persistence.get_invoice(invoice_id).expect("Reload");
    assert_eq!(cancelled.status.as_str(), "cancelled");

    // The locked events lost their linkage and may be billed again
    let washes = persistence
        .list_billable_washes(partner_company_id, date!(2026 - 01 - 01), date!(2026 - 01 - 31), None)
        .expect("Billable washes");
    assert_eq!(washes.len(), 3);
    assert!(
        washes
            .iter()
            .all(|w| w.event.status == WashStatus::Locked && w.event.invoice_id.is_none())
    );
}

#[test]
fn test_sent_then_paid_is_terminal() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, partner_company_id) = prepared_invoice(&mut persistence);
    issue(
        &mut persistence,
        invoice_id,
        &RecordingIssuer::default(),
        &RecordingNotifier::default(),
    )
    .expect("Issue");

    let sent = mark_invoice_sent(
        &mut persistence,
        &test_ctx(),
        MarkInvoiceSentRequest { invoice_id },
        &admin(),
        test_cause(),
    )
    .expect("Mark sent");
    assert_eq!(sent.invoice.status, "sent");

    let paid = mark_invoice_paid(
        &mut persistence,
        &test_ctx(),
        MarkInvoicePaidRequest {
            invoice_id,
            paid_date: date!(2026 - 02 - 18),
        },
        &admin(),
        test_cause(),
    )
    .expect("Mark paid");
    assert_eq!(paid.invoice.status, "paid");
    assert_eq!(paid.invoice.paid_date, Some(date!(2026 - 02 - 18)));

    // Paid is terminal: cancellation must fail
    let result = cancel_invoice(
        &mut persistence,
        &test_ctx(),
        CancelInvoiceRequest { invoice_id },
        &admin(),
        test_cause(),
    );
    match result {
        Err(ApiError::DomainRuleViolation { rule, .. }) => {
            assert_eq!(rule, "invoice_lifecycle");
        }
        other => panic!("Expected DomainRuleViolation, got {other:?}"),
    }
}

#[test]
fn test_overdue_sweep_moves_past_due_invoices() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let (invoice_id, partner_company_id) = prepared_invoice(&mut persistence);
    issue(
        &mut persistence,
        invoice_id,
        &RecordingIssuer::default(),
        &RecordingNotifier::default(),
    )
    .expect("Issue");

    // Due 2026-02-20: a sweep on the due date moves nothing
    let on_time = sweep_overdue(
        &mut persistence,
        &test_ctx(),
        SweepOverdueRequest {
            as_of: date!(2026 - 02 - 20),
        },
        &RecordingNotifier::default(),
        test_cause(),
    )
    .expect("Sweep on due date");
    assert!(on_time.moved_invoice_ids.is_empty());

    let notifier: RecordingNotifier = RecordingNotifier::default();
    let late = sweep_overdue(
        &mut persistence,
        &test_ctx(),
        SweepOverdueRequest {
            as_of: date!(2026 - 02 - 21),
        },
        &notifier,
        test_cause(),
    )
    .expect("Sweep past due date");

    assert_eq!(late.moved_invoice_ids, vec![invoice_id]);
    assert_eq!(late.skipped, 0);
    let overdue = persistence.get_invoice(invoice_id).expect("Reload");
    assert_eq!(overdue.status.as_str(), "overdue");
    assert!(matches!(
        notifier.sent.borrow().as_slice(),
        [Notification::InvoiceOverdue { .. }]
    ));

    // Overdue invoices remain payable
    let paid = mark_invoice_paid(
        &mut persistence,
        &test_ctx(),
        MarkInvoicePaidRequest {
            invoice_id,
            paid_date: date!(2026 - 03 - 02),
        },
        &admin(),
        test_cause(),
    )
    .expect("Pay overdue invoice");
    assert_eq!(paid.invoice.status, "paid");

    // A later sweep leaves the paid invoice alone
    let after_payment = sweep_overdue(
        &mut persistence,
        &test_ctx(),
        SweepOverdueRequest {
            as_of: date!(2026 - 04 - 01),
        },
        &RecordingNotifier::default(),
        test_cause(),
    )
    .expect("Sweep after payment");
    assert!(after_payment.moved_invoice_ids.is_empty());
}
