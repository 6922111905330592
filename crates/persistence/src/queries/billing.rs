// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Billing queries.
//!
//! The billable-event query implements the preparation-time rules: only
//! completed or locked events count, and only while they carry no invoice
//! linkage. The overdue query feeds the scheduled sweep; it reads invoices
//! only and never touches wash events.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use std::str::FromStr;
use time::Date;
use washnet::BillableWash;
use washnet_domain::{Currency, Invoice, InvoiceItem, InvoiceStatus, OperationType};

use crate::codec::{parse_date, parse_date_opt};
use crate::data_models::{InvoiceItemRow, InvoiceRow, WashEventRow};
use crate::diesel_schema::{invoice_items, invoices, locations, wash_events};
use crate::error::PersistenceError;
use crate::queries::wash_events::reconstruct_wash_event;

/// Statuses that count toward billing.
const BILLABLE_STATUSES: [&str; 2] = ["completed", "locked"];

/// Rebuilds an `Invoice` from one stored row.
fn reconstruct_invoice(row: InvoiceRow) -> Result<Invoice, PersistenceError> {
    let (
        invoice_id,
        network_id,
        partner_company_id,
        period_start,
        period_end,
        subtotal,
        discount_percent,
        discount_amount,
        vat_rate,
        vat_amount,
        total,
        currency,
        status,
        issue_date,
        due_date,
        paid_date,
        external_id,
        external_number,
    ) = row;

    Ok(Invoice {
        invoice_id: Some(invoice_id),
        network_id,
        partner_company_id,
        period_start: parse_date(&period_start)?,
        period_end: parse_date(&period_end)?,
        subtotal,
        discount_percent: u8::try_from(discount_percent).map_err(|_| {
            PersistenceError::ReconstructionError(format!(
                "invalid stored discount percent: {discount_percent}"
            ))
        })?,
        discount_amount,
        vat_rate: u8::try_from(vat_rate).map_err(|_| {
            PersistenceError::ReconstructionError(format!("invalid stored VAT rate: {vat_rate}"))
        })?,
        vat_amount,
        total,
        currency: Currency::new(&currency)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
        status: InvoiceStatus::from_str(&status)
            .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
        issue_date: parse_date(&issue_date)?,
        due_date: parse_date(&due_date)?,
        paid_date: parse_date_opt(paid_date.as_deref())?,
        external_id,
        external_number,
    })
}

/// Rebuilds an `InvoiceItem` from one stored row.
fn reconstruct_invoice_item(row: InvoiceItemRow) -> Result<InvoiceItem, PersistenceError> {
    let (invoice_item_id, _invoice_id, description, quantity, unit_price, total_price, vat_rate, wash_event_id) =
        row;

    Ok(InvoiceItem {
        invoice_item_id: Some(invoice_item_id),
        description,
        quantity: u32::try_from(quantity).map_err(|_| {
            PersistenceError::ReconstructionError(format!("invalid stored quantity: {quantity}"))
        })?,
        unit_price,
        total_price,
        vat_rate: u8::try_from(vat_rate).map_err(|_| {
            PersistenceError::ReconstructionError(format!("invalid stored VAT rate: {vat_rate}"))
        })?,
        wash_event_id,
    })
}

backend_fn! {
/// Lists a partner's billable wash events in a period.
///
/// Billable means completed or locked, carrying no invoice linkage, and
/// completed within `[period_start, period_end]` (inclusive). Each event
/// comes with its location's operation type, which drives the discount
/// partition.
///
/// When preparation replaces an existing draft, events linked to that
/// draft are still billable: pass its identifier as `replacing_draft` and
/// they are included.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner_company_id` - The partner being billed
/// * `period_start` - First day of the period (inclusive)
/// * `period_end` - Last day of the period (inclusive)
/// * `replacing_draft` - A draft about to be replaced, whose linked events
///   remain available
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or reconstructed.
pub fn list_billable_washes(
    conn: &mut _,
    partner_company_id: i64,
    period_start: Date,
    period_end: Date,
    replacing_draft: Option<i64>,
) -> Result<Vec<BillableWash>, PersistenceError> {
    let end_exclusive: Date = period_end.next_day().ok_or_else(|| {
        PersistenceError::QueryFailed(String::from("billing period end out of range"))
    })?;

    // No identifier is ever negative, so -1 makes the draft arm inert when
    // no draft is being replaced.
    let draft_id: i64 = replacing_draft.unwrap_or(-1);

    // Stored timestamps are RFC 3339 UTC text and order lexicographically,
    // so the period filter is a plain text range.
    let rows: Vec<(WashEventRow, String)> = wash_events::table
        .inner_join(locations::table)
        .select((wash_events::all_columns, locations::operation_type))
        .filter(wash_events::partner_company_id.eq(partner_company_id))
        .filter(wash_events::status.eq_any(BILLABLE_STATUSES))
        .filter(
            wash_events::invoice_id
                .is_null()
                .or(wash_events::invoice_id.eq(draft_id)),
        )
        .filter(wash_events::completed_at.ge(Some(period_start.to_string())))
        .filter(wash_events::completed_at.lt(Some(end_exclusive.to_string())))
        .order(wash_events::wash_event_id.asc())
        .load::<(WashEventRow, String)>(conn)?;

    rows.into_iter()
        .map(|(event_row, operation_type)| {
            Ok(BillableWash {
                event: reconstruct_wash_event(event_row)?,
                operation_type: OperationType::from_str(&operation_type)
                    .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?,
            })
        })
        .collect()
}
}

backend_fn! {
/// Retrieves an invoice by ID.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice to retrieve
///
/// # Errors
///
/// Returns `InvoiceNotFound` if no such invoice exists.
pub fn get_invoice(
    conn: &mut _,
    invoice_id: i64,
) -> Result<Invoice, PersistenceError> {
    let row: Option<InvoiceRow> = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .first::<InvoiceRow>(conn)
        .optional()?;

    match row {
        Some(row) => reconstruct_invoice(row),
        None => Err(PersistenceError::InvoiceNotFound(invoice_id)),
    }
}
}

backend_fn! {
/// Finds the draft invoice for a partner and period, if one exists.
///
/// The unique-draft constraint guarantees at most one row matches.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner_company_id` - The partner being billed
/// * `period_start` - First day of the period (inclusive)
/// * `period_end` - Last day of the period (inclusive)
///
/// # Errors
///
/// Returns an error if the query fails or the row cannot be reconstructed.
pub fn find_draft_invoice(
    conn: &mut _,
    partner_company_id: i64,
    period_start: Date,
    period_end: Date,
) -> Result<Option<Invoice>, PersistenceError> {
    let row: Option<InvoiceRow> = invoices::table
        .filter(invoices::partner_company_id.eq(partner_company_id))
        .filter(invoices::period_start.eq(period_start.to_string()))
        .filter(invoices::period_end.eq(period_end.to_string()))
        .filter(invoices::status.eq("draft"))
        .first::<InvoiceRow>(conn)
        .optional()?;

    row.map(reconstruct_invoice).transpose()
}
}

backend_fn! {
/// Lists the line items of an invoice.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice whose items are listed
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or reconstructed.
pub fn list_invoice_items(
    conn: &mut _,
    invoice_id: i64,
) -> Result<Vec<InvoiceItem>, PersistenceError> {
    let rows: Vec<InvoiceItemRow> = invoice_items::table
        .filter(invoice_items::invoice_id.eq(invoice_id))
        .order(invoice_items::invoice_item_id.asc())
        .load::<InvoiceItemRow>(conn)?;

    rows.into_iter().map(reconstruct_invoice_item).collect()
}
}

backend_fn! {
/// Lists the invoices the overdue sweep must move.
///
/// Candidates are issued or sent invoices whose due date has passed as of
/// the sweep's reference date.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `network_id` - The network being swept
/// * `as_of` - The sweep's reference date
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or reconstructed.
pub fn list_overdue_candidates(
    conn: &mut _,
    network_id: i64,
    as_of: Date,
) -> Result<Vec<Invoice>, PersistenceError> {
    let rows: Vec<InvoiceRow> = invoices::table
        .filter(invoices::network_id.eq(network_id))
        .filter(invoices::status.eq_any(["issued", "sent"]))
        .filter(invoices::due_date.lt(as_of.to_string()))
        .order(invoices::invoice_id.asc())
        .load::<InvoiceRow>(conn)?;

    rows.into_iter().map(reconstruct_invoice).collect()
}
}
