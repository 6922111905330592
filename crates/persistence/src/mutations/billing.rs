// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice mutation operations.
//!
//! Draft replacement, wash-event linkage, lifecycle compare-and-swap
//! updates, and the external issuance guard. The at-most-once billing rule
//! is enforced here: a wash event is linked to an invoice only while its
//! `invoice_id` column is NULL, and cancelling an invoice (or replacing a
//! draft) releases the linkage again.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use washnet_domain::{Invoice, InvoiceItem};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{invoice_items, invoices, wash_events};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an invoice header row.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice` - The invoice to insert (must not have an ID yet)
///
/// # Returns
///
/// The invoice ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails. A unique-constraint violation on
/// the draft guard index surfaces as `DuplicateDraft`.
pub fn insert_invoice(
    conn: &mut _,
    invoice: &Invoice,
) -> Result<i64, PersistenceError> {
    if invoice.invoice_id.is_some() {
        return Err(PersistenceError::QueryFailed(String::from(
            "insert_invoice: invoice already has a canonical identifier",
        )));
    }

    let result = diesel::insert_into(invoices::table)
        .values((
            invoices::network_id.eq(invoice.network_id),
            invoices::partner_company_id.eq(invoice.partner_company_id),
            invoices::period_start.eq(invoice.period_start.to_string()),
            invoices::period_end.eq(invoice.period_end.to_string()),
            invoices::subtotal.eq(invoice.subtotal),
            invoices::discount_percent.eq(i32::from(invoice.discount_percent)),
            invoices::discount_amount.eq(invoice.discount_amount),
            invoices::vat_rate.eq(i32::from(invoice.vat_rate)),
            invoices::vat_amount.eq(invoice.vat_amount),
            invoices::total.eq(invoice.total),
            invoices::currency.eq(invoice.currency.code()),
            invoices::status.eq(invoice.status.as_str()),
            invoices::issue_date.eq(invoice.issue_date.to_string()),
            invoices::due_date.eq(invoice.due_date.to_string()),
            invoices::paid_date.eq(invoice.paid_date.map(|d| d.to_string())),
            invoices::external_id.eq(invoice.external_id.as_deref()),
            invoices::external_number.eq(invoice.external_number.as_deref()),
        ))
        .execute(conn);

    match result {
        Ok(_) => Ok(conn.get_last_insert_rowid()?),
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => Err(PersistenceError::DuplicateDraft {
            partner_company_id: invoice.partner_company_id,
            period_start: invoice.period_start.to_string(),
        }),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Inserts the line items of an invoice.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The owning invoice
/// * `items` - The line items to insert
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_invoice_items(
    conn: &mut _,
    invoice_id: i64,
    items: &[InvoiceItem],
) -> Result<(), PersistenceError> {
    for item in items {
        diesel::insert_into(invoice_items::table)
            .values((
                invoice_items::invoice_id.eq(invoice_id),
                invoice_items::description.eq(item.description.as_str()),
                invoice_items::quantity.eq(i32::try_from(item.quantity).unwrap_or(i32::MAX)),
                invoice_items::unit_price.eq(item.unit_price),
                invoice_items::total_price.eq(item.total_price),
                invoice_items::vat_rate.eq(i32::from(item.vat_rate)),
                invoice_items::wash_event_id.eq(item.wash_event_id),
            ))
            .execute(conn)?;
    }
    Ok(())
}
}

backend_fn! {
/// Links wash events to an invoice.
///
/// A wash event may be billed at most once: the update is conditioned on
/// `invoice_id IS NULL`, so an event already linked to a non-cancelled
/// invoice is never claimed twice.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The claiming invoice
/// * `wash_event_ids` - The events the invoice bills
///
/// # Errors
///
/// Returns `DuplicateBilling` naming the first already-linked event if any
/// of the events could not be claimed.
pub fn link_wash_events(
    conn: &mut _,
    invoice_id: i64,
    wash_event_ids: &[i64],
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        wash_events::table
            .filter(wash_events::wash_event_id.eq_any(wash_event_ids))
            .filter(wash_events::invoice_id.is_null()),
    )
    .set(wash_events::invoice_id.eq(invoice_id))
    .execute(conn)?;

    if affected == wash_event_ids.len() {
        return Ok(());
    }

    // Identify the offending event for the error; the caller's transaction
    // rolls the partial linkage back.
    let already_linked: Option<i64> = wash_events::table
        .select(wash_events::wash_event_id)
        .filter(wash_events::wash_event_id.eq_any(wash_event_ids))
        .filter(wash_events::invoice_id.is_not_null())
        .filter(wash_events::invoice_id.ne(invoice_id))
        .first::<i64>(conn)
        .optional()?;

    Err(PersistenceError::DuplicateBilling {
        wash_event_id: already_linked.unwrap_or_default(),
    })
}
}

backend_fn! {
/// Releases every wash event linked to an invoice.
///
/// Used when a draft is replaced or an invoice is cancelled; the events
/// become billable again.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice whose linkage is released
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn release_wash_events(
    conn: &mut _,
    invoice_id: i64,
) -> Result<usize, PersistenceError> {
    Ok(diesel::update(
        wash_events::table.filter(wash_events::invoice_id.eq(invoice_id)),
    )
    .set(wash_events::invoice_id.eq(None::<i64>))
    .execute(conn)?)
}
}

backend_fn! {
/// Deletes a draft invoice and its line items.
///
/// Only drafts are deletable; the delete is conditioned on the status
/// still being `draft`.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The draft to delete
///
/// # Errors
///
/// Returns `ConcurrentModification` if the invoice is no longer a draft,
/// or `InvoiceNotFound` if it does not exist.
pub fn delete_draft(
    conn: &mut _,
    invoice_id: i64,
) -> Result<(), PersistenceError> {
    diesel::delete(invoice_items::table.filter(invoice_items::invoice_id.eq(invoice_id)))
        .execute(conn)?;

    let affected: usize = diesel::delete(
        invoices::table
            .filter(invoices::invoice_id.eq(invoice_id))
            .filter(invoices::status.eq("draft")),
    )
    .execute(conn)?;

    if affected == 1 {
        return Ok(());
    }

    let exists: i64 = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .count()
        .get_result(conn)?;

    if exists == 0 {
        Err(PersistenceError::InvoiceNotFound(invoice_id))
    } else {
        Err(PersistenceError::ConcurrentModification {
            record: String::from("invoice"),
            id: invoice_id,
            expected: String::from("draft"),
        })
    }
}
}

backend_fn! {
/// Applies an invoice transition with a compare-and-swap on status.
///
/// Writes the new status, dates, and header fields only if the stored
/// status still equals `expected_status`.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice to update
/// * `expected_status` - The status the caller read before transitioning
/// * `new_invoice` - The invoice after the transition
///
/// # Errors
///
/// Returns `ConcurrentModification` if the stored status no longer matches,
/// or `InvoiceNotFound` if the invoice does not exist.
pub fn cas_invoice_status(
    conn: &mut _,
    invoice_id: i64,
    expected_status: &str,
    new_invoice: &Invoice,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        invoices::table
            .filter(invoices::invoice_id.eq(invoice_id))
            .filter(invoices::status.eq(expected_status)),
    )
    .set((
        invoices::status.eq(new_invoice.status.as_str()),
        invoices::issue_date.eq(new_invoice.issue_date.to_string()),
        invoices::due_date.eq(new_invoice.due_date.to_string()),
        invoices::paid_date.eq(new_invoice.paid_date.map(|d| d.to_string())),
    ))
    .execute(conn)?;

    if affected == 1 {
        return Ok(());
    }

    let exists: i64 = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .count()
        .get_result(conn)?;

    if exists == 0 {
        Err(PersistenceError::InvoiceNotFound(invoice_id))
    } else {
        Err(PersistenceError::ConcurrentModification {
            record: String::from("invoice"),
            id: invoice_id,
            expected: expected_status.to_string(),
        })
    }
}
}

backend_fn! {
/// Stores the external issuing provider's reference on an invoice.
///
/// The issuance guard: the update is conditioned on `external_id IS NULL`,
/// so a retried issuance can never overwrite an already-stored reference
/// and double-number the invoice.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice to update
/// * `external_id` - The provider's reference
/// * `external_number` - The provider's invoice number
///
/// # Errors
///
/// Returns `ExternalReferenceAlreadySet` if a reference is already stored,
/// or `InvoiceNotFound` if the invoice does not exist.
pub fn set_external_reference(
    conn: &mut _,
    invoice_id: i64,
    external_id: &str,
    external_number: &str,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        invoices::table
            .filter(invoices::invoice_id.eq(invoice_id))
            .filter(invoices::external_id.is_null()),
    )
    .set((
        invoices::external_id.eq(external_id),
        invoices::external_number.eq(external_number),
    ))
    .execute(conn)?;

    if affected == 1 {
        return Ok(());
    }

    let exists: i64 = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .count()
        .get_result(conn)?;

    if exists == 0 {
        Err(PersistenceError::InvoiceNotFound(invoice_id))
    } else {
        Err(PersistenceError::ExternalReferenceAlreadySet { invoice_id })
    }
}
}
