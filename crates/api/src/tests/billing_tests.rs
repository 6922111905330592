// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Discount and invoice preparation tests through the API boundary.

use time::macros::date;
use washnet_persistence::Persistence;

use crate::handlers::{
    issue_invoice, prepare_draft_invoice, preview_discount, upsert_partner_price,
};
use crate::request_response::{
    DiscountPreviewRequest, IssueInvoiceRequest, PrepareInvoiceRequest, PrepareInvoiceResponse,
    UpsertPartnerPriceRequest,
};
use crate::tests::helpers::{
    RecordingIssuer, RecordingNotifier, SERVICE_PACKAGE_ID, admin, completed_washes,
    seed_network, test_cause, test_ctx, test_now,
};

fn prepare_january(
    persistence: &mut Persistence,
    partner_company_id: i64,
) -> PrepareInvoiceResponse {
    prepare_draft_invoice(
        persistence,
        &test_ctx(),
        PrepareInvoiceRequest {
            partner_company_id,
            period_start: date!(2026 - 01 - 01),
            period_end: date!(2026 - 01 - 31),
            issue_date: date!(2026 - 02 - 01),
            due_days: None,
        },
        &admin(),
        test_cause(),
    )
    .expect("Prepare draft invoice")
}

#[test]
fn test_twelve_own_washes_select_tier_one() {
    // 12 own-network washes at 1000 HUF: subtotal 12000, tier1 (10 @ 5%)
    // selected, discount 600
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        12,
    );

    let response = prepare_january(&mut persistence, network.partner_company_id);

    assert_eq!(response.items.len(), 12);
    assert_eq!(response.invoice.subtotal, 12_000);
    assert_eq!(response.own_discount.tier_threshold, Some(10));
    assert_eq!(response.own_discount.discount_percent, 5);
    assert_eq!(response.invoice.discount_amount, 600);
    // VAT applies to the discounted subtotal
    assert_eq!(response.invoice.vat_amount, 11_400 * 27 / 100);
    assert_eq!(response.invoice.total, 11_400 + 11_400 * 27 / 100);
    assert_eq!(response.invoice.status, "draft");
    assert_eq!(response.invoice.due_date, date!(2026 - 02 - 16));
}

#[test]
fn test_sixty_own_washes_select_tier_two() {
    // 60 own-network washes: tier2 (50 @ 10%) selected, discount 6000
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        60,
    );

    let response = prepare_january(&mut persistence, network.partner_company_id);

    assert_eq!(response.invoice.subtotal, 60_000);
    assert_eq!(response.own_discount.tier_threshold, Some(50));
    assert_eq!(response.own_discount.discount_percent, 10);
    assert_eq!(response.invoice.discount_amount, 6_000);
}

#[test]
fn test_partition_ladders_never_mix() {
    // 12 own washes reach the own tier1; 5 sub washes stay below every
    // sub threshold, so only the own partition is discounted
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        12,
    );
    completed_washes(
        &mut persistence,
        network.sub_location_id,
        network.partner_company_id,
        5,
    );

    let response = prepare_january(&mut persistence, network.partner_company_id);

    assert_eq!(response.invoice.subtotal, 17_000);
    assert_eq!(response.own_discount.wash_count, 12);
    assert_eq!(response.own_discount.discount_amount, 600);
    assert_eq!(response.sub_discount.wash_count, 5);
    assert_eq!(response.sub_discount.tier_threshold, None);
    assert_eq!(response.sub_discount.discount_amount, 0);
    assert_eq!(response.invoice.discount_amount, 600);
}

#[test]
fn test_prepare_is_idempotent_over_unchanged_washes() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        12,
    );

    let first = prepare_january(&mut persistence, network.partner_company_id);
    let second = prepare_january(&mut persistence, network.partner_company_id);

    assert_eq!(first.invoice.subtotal, second.invoice.subtotal);
    assert_eq!(first.invoice.discount_amount, second.invoice.discount_amount);
    assert_eq!(first.invoice.vat_amount, second.invoice.vat_amount);
    assert_eq!(first.invoice.total, second.invoice.total);
    assert_eq!(first.items.len(), second.items.len());

    // The prior draft was replaced, not duplicated
    let draft = persistence
        .find_draft_invoice(
            network.partner_company_id,
            date!(2026 - 01 - 01),
            date!(2026 - 01 - 31),
        )
        .expect("Query draft")
        .expect("One draft exists");
    assert_eq!(draft.invoice_id, Some(second.invoice.invoice_id));
}

#[test]
fn test_partner_override_price_wins() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);

    upsert_partner_price(
        &mut persistence,
        &test_ctx(),
        UpsertPartnerPriceRequest {
            partner_company_id: network.partner_company_id,
            service_package_id: SERVICE_PACKAGE_ID,
            vehicle_type: String::from("tractor"),
            price: 850,
            currency: String::from("HUF"),
        },
        &admin(),
    )
    .expect("Upsert partner price");

    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        3,
    );

    let response = prepare_january(&mut persistence, network.partner_company_id);

    assert_eq!(response.items.len(), 3);
    assert!(response.items.iter().all(|item| item.unit_price == 850));
    assert_eq!(response.invoice.subtotal, 2_550);
}

#[test]
fn test_discount_preview_is_side_effect_free() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        12,
    );

    let request = DiscountPreviewRequest {
        partner_company_id: network.partner_company_id,
        period_start: date!(2026 - 01 - 01),
        period_end: date!(2026 - 01 - 31),
    };
    let first = preview_discount(&mut persistence, &test_ctx(), request, &admin())
        .expect("First preview");
    let second =
        preview_discount(&mut persistence, &test_ctx(), request, &admin()).expect("Second preview");

    assert_eq!(first, second);
    assert_eq!(first.own.discount_amount, 600);
    assert_eq!(first.total_discount, 600);

    // Previewing created no draft
    let draft = persistence
        .find_draft_invoice(
            network.partner_company_id,
            date!(2026 - 01 - 01),
            date!(2026 - 01 - 31),
        )
        .expect("Query draft");
    assert!(draft.is_none());
}

#[test]
fn test_zero_washes_prepare_an_empty_draft() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);

    let response = prepare_january(&mut persistence, network.partner_company_id);

    assert!(response.items.is_empty());
    assert_eq!(response.invoice.subtotal, 0);
    assert_eq!(response.invoice.discount_amount, 0);
    assert_eq!(response.invoice.total, 0);
}

#[test]
fn test_issued_washes_are_never_billed_twice() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    completed_washes(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        12,
    );

    let first = prepare_january(&mut persistence, network.partner_company_id);
    issue_invoice(
        &mut persistence,
        &test_ctx(),
        IssueInvoiceRequest {
            invoice_id: first.invoice.invoice_id,
            issue_date: date!(2026 - 02 - 01),
        },
        &admin(),
        &RecordingIssuer::default(),
        &RecordingNotifier::default(),
        test_cause(),
        test_now(),
    )
    .expect("Issue");

    // The washes are linked to an issued invoice; a fresh preparation of
    // the same period finds nothing billable
    let second = prepare_january(&mut persistence, network.partner_company_id);
    assert!(second.items.is_empty());
    assert_eq!(second.invoice.subtotal, 0);
}
