// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Draft invoice preparation.
//!
//! Preparation aggregates a partner's billable wash events over one
//! period into a draft invoice: one line item per event, per-partition
//! subtotals, the volume discount, and VAT on the discounted subtotal.
//! It is a pure assembly over already-fetched events and never mutates
//! them; re-running it over the same inputs produces the identical draft.

use crate::apply::due_date_for;
use crate::error::CoreError;
use crate::state::{BillableWash, PreparedInvoice};
use time::Date;
use washnet_audit::{Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot};
use washnet_domain::{
    Currency, DiscountResult, Invoice, InvoiceItem, InvoiceStatus, Money, OperationType,
    PartnerCompany, PriceCatalog, apply_percent, calculate_discount, resolve_price,
    validate_period, validate_vat_rate,
};

/// Assembles a draft invoice for a partner over one billing period.
///
/// Every supplied wash must be billable (completed or locked), belong to
/// the invoiced partner, and be free of any existing invoice linkage; a
/// violation aborts the preparation with no partial draft. Prices are
/// resolved from the catalog per line, so the draft is reproducible at a
/// fixed catalog state.
///
/// # Arguments
///
/// * `catalog` - The price catalog snapshot
/// * `partner` - The partner being invoiced (must be persisted)
/// * `washes` - The partner's billable washes in the period, with each
///   performing location's operation type
/// * `period_start` - First day of the period (inclusive)
/// * `period_end` - Last day of the period (inclusive)
/// * `vat_rate` - The network's VAT rate in whole percent
/// * `currency` - The invoice currency
/// * `issue_date` - The provisional issuance date
/// * `due_days` - The payment window in days
/// * `actor` - The actor performing the preparation
/// * `cause` - The cause or reason for the preparation
///
/// # Returns
///
/// The assembled draft with its line items, discount breakdown, wash
/// linkage list, and audit event.
///
/// # Errors
///
/// Returns an error if:
/// - The period or VAT rate is invalid
/// - The partner has no canonical identifier
/// - Any wash is not billable, already billed, or belongs to another partner
/// - Any price is missing or in a different currency
#[allow(clippy::too_many_arguments)]
pub fn prepare_invoice(
    catalog: &PriceCatalog,
    partner: &PartnerCompany,
    washes: &[BillableWash],
    period_start: Date,
    period_end: Date,
    vat_rate: u8,
    currency: Currency,
    issue_date: Date,
    due_days: u16,
    actor: Actor,
    cause: Cause,
) -> Result<PreparedInvoice, CoreError> {
    validate_period(period_start, period_end)?;
    validate_vat_rate(vat_rate)?;

    let partner_id: i64 = partner
        .partner_company_id
        .ok_or_else(|| CoreError::MissingIdentifier {
            record: String::from("partner company"),
        })?;

    let mut items: Vec<InvoiceItem> = Vec::with_capacity(washes.len());
    let mut wash_event_ids: Vec<i64> = Vec::with_capacity(washes.len());
    let mut own_count: u32 = 0;
    let mut own_subtotal: i64 = 0;
    let mut sub_count: u32 = 0;
    let mut sub_subtotal: i64 = 0;

    for wash in washes {
        let event = &wash.event;

        if !event.status.is_billable() {
            return Err(CoreError::EventNotBillable {
                wash_event_id: event.wash_event_id,
                status: event.status.as_str().to_string(),
            });
        }

        // The at-most-once rule: an event linked to a non-cancelled
        // invoice must never be offered for billing again.
        if let Some(invoice_id) = event.invoice_id {
            return Err(CoreError::EventAlreadyBilled {
                wash_event_id: event.wash_event_id,
                invoice_id,
            });
        }

        if event.partner_company_id != Some(partner_id) {
            return Err(CoreError::WrongPartner {
                wash_event_id: event.wash_event_id,
                expected: partner_id,
                actual: event.partner_company_id,
            });
        }

        let wash_event_id: i64 =
            event
                .wash_event_id
                .ok_or_else(|| CoreError::MissingIdentifier {
                    record: String::from("wash event"),
                })?;

        let price: Money = resolve_price(
            catalog,
            event.network_id,
            event.partner_company_id,
            event.service_package_id,
            event.vehicle_type,
        )
        .map_err(CoreError::DomainViolation)?;

        if price.currency != currency {
            return Err(CoreError::CurrencyMismatch {
                expected: currency.code().to_string(),
                actual: price.currency.code().to_string(),
            });
        }

        match wash.operation_type {
            OperationType::Own => {
                own_count += 1;
                own_subtotal += price.amount;
            }
            OperationType::Subcontractor => {
                sub_count += 1;
                sub_subtotal += price.amount;
            }
        }

        items.push(InvoiceItem {
            invoice_item_id: None,
            description: item_description(wash),
            quantity: 1,
            unit_price: price.amount,
            total_price: price.amount,
            vat_rate,
            wash_event_id: Some(wash_event_id),
        });
        wash_event_ids.push(wash_event_id);
    }

    let subtotal: i64 = own_subtotal + sub_subtotal;
    let discount: DiscountResult =
        calculate_discount(partner, own_count, own_subtotal, sub_count, sub_subtotal);

    let taxable: i64 = subtotal - discount.total_discount;
    let vat_amount: i64 = apply_percent(taxable, vat_rate);
    let total: i64 = taxable + vat_amount;

    // With two independent ladders there is no single input percent; the
    // header carries the effective rate over the whole invoice.
    let discount_percent: u8 = if subtotal > 0 {
        u8::try_from(discount.total_discount * 100 / subtotal).unwrap_or(100)
    } else {
        0
    };

    let invoice: Invoice = Invoice {
        invoice_id: None,
        network_id: partner.network_id,
        partner_company_id: partner_id,
        period_start,
        period_end,
        subtotal,
        discount_percent,
        discount_amount: discount.total_discount,
        vat_rate,
        vat_amount,
        total,
        currency,
        status: InvoiceStatus::Draft,
        issue_date,
        due_date: due_date_for(issue_date, due_days),
        paid_date: None,
        external_id: None,
        external_number: None,
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("PrepareInvoice"),
            Some(format!(
                "Prepared draft for partner {partner_id}, period {period_start}..{period_end}, {} washes",
                washes.len()
            )),
        ),
        StateSnapshot::new(format!(
            "partner={partner_id},period={period_start}..{period_end},draft=none"
        )),
        StateSnapshot::new(invoice.snapshot()),
        partner.network_id,
        AuditSubject::Pending,
    );

    Ok(PreparedInvoice {
        invoice,
        items,
        discount,
        wash_event_ids,
        audit_event,
    })
}

/// Renders the line description for one billed wash.
fn item_description(wash: &BillableWash) -> String {
    let event = &wash.event;
    let plate: &str = event
        .tractor_plate
        .as_deref()
        .or(event.trailer_plate.as_deref())
        .unwrap_or("no plate");
    let completed: String = event
        .completed_at
        .map_or_else(|| String::from("unknown date"), |t| t.date().to_string());

    format!(
        "Wash: {} ({plate}), completed {completed}",
        event.vehicle_type
    )
}
