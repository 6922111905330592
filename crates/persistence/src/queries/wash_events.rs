// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wash event queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use std::str::FromStr;
use washnet_domain::{Currency, EntryMode, Money, VehicleType, WashEvent, WashStatus};

use crate::codec::{parse_datetime, parse_datetime_opt};
use crate::data_models::WashEventRow;
use crate::diesel_schema::wash_events;
use crate::error::PersistenceError;

/// Rebuilds a `WashEvent` from one stored row.
pub(crate) fn reconstruct_wash_event(row: WashEventRow) -> Result<WashEvent, PersistenceError> {
    let (
        wash_event_id,
        network_id,
        location_id,
        partner_company_id,
        driver_id,
        driver_name,
        tractor_plate,
        trailer_plate,
        entry_mode,
        service_package_id,
        vehicle_type,
        status,
        created_at,
        authorized_at,
        started_at,
        completed_at,
        rejected_at,
        rejection_reason,
        total_price,
        currency,
        invoice_id,
    ) = row;

    let total_price: Option<Money> = match (total_price, currency) {
        (Some(amount), Some(code)) => {
            let currency: Currency = Currency::new(&code).map_err(reconstruction)?;
            Some(Money::new(amount, currency).map_err(reconstruction)?)
        }
        (None, _) => None,
        (Some(amount), None) => {
            return Err(PersistenceError::ReconstructionError(format!(
                "wash event {wash_event_id} has price {amount} without a currency"
            )));
        }
    };

    Ok(WashEvent {
        wash_event_id: Some(wash_event_id),
        network_id,
        location_id,
        partner_company_id,
        driver_id,
        driver_name,
        tractor_plate,
        trailer_plate,
        entry_mode: EntryMode::from_str(&entry_mode).map_err(reconstruction)?,
        service_package_id,
        vehicle_type: VehicleType::from_str(&vehicle_type).map_err(reconstruction)?,
        status: WashStatus::from_str(&status).map_err(reconstruction)?,
        created_at: parse_datetime(&created_at)?,
        authorized_at: parse_datetime_opt(authorized_at.as_deref())?,
        started_at: parse_datetime_opt(started_at.as_deref())?,
        completed_at: parse_datetime_opt(completed_at.as_deref())?,
        rejected_at: parse_datetime_opt(rejected_at.as_deref())?,
        rejection_reason,
        total_price,
        invoice_id,
    })
}

/// Maps a domain parse failure onto a reconstruction error.
fn reconstruction(err: washnet_domain::DomainError) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}

backend_fn! {
/// Retrieves a wash event by ID.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `wash_event_id` - The event to retrieve
///
/// # Errors
///
/// Returns `WashEventNotFound` if no such event exists, or an error if the
/// stored row cannot be reconstructed.
pub fn get_wash_event(
    conn: &mut _,
    wash_event_id: i64,
) -> Result<WashEvent, PersistenceError> {
    let row: Option<WashEventRow> = wash_events::table
        .filter(wash_events::wash_event_id.eq(wash_event_id))
        .first::<WashEventRow>(conn)
        .optional()?;

    match row {
        Some(row) => reconstruct_wash_event(row),
        None => Err(PersistenceError::WashEventNotFound(wash_event_id)),
    }
}
}

backend_fn! {
/// Lists the wash events linked to an invoice.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `invoice_id` - The invoice whose events are listed
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or reconstructed.
pub fn list_wash_events_for_invoice(
    conn: &mut _,
    invoice_id: i64,
) -> Result<Vec<WashEvent>, PersistenceError> {
    let rows: Vec<WashEventRow> = wash_events::table
        .filter(wash_events::invoice_id.eq(invoice_id))
        .order(wash_events::wash_event_id.asc())
        .load::<WashEventRow>(conn)?;

    rows.into_iter().map(reconstruct_wash_event).collect()
}
}
