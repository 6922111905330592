// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wash event mutation operations.
//!
//! Status changes go through a compare-and-swap on the status column: the
//! update is conditioned on the status still holding the value the caller
//! read. Two concurrent transitions from the same snapshot therefore
//! resolve into exactly one success and one `ConcurrentModification`.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use washnet_domain::WashEvent;

use crate::backend::PersistenceBackend;
use crate::codec::{format_datetime, format_datetime_opt};
use crate::diesel_schema::wash_events;
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a new wash event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The wash event to insert (must not have an ID yet)
///
/// # Returns
///
/// The wash event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails or the event already carries an ID.
pub fn insert_wash_event(
    conn: &mut _,
    event: &WashEvent,
) -> Result<i64, PersistenceError> {
    if event.wash_event_id.is_some() {
        return Err(PersistenceError::QueryFailed(String::from(
            "insert_wash_event: event already has a canonical identifier",
        )));
    }

    diesel::insert_into(wash_events::table)
        .values((
            wash_events::network_id.eq(event.network_id),
            wash_events::location_id.eq(event.location_id),
            wash_events::partner_company_id.eq(event.partner_company_id),
            wash_events::driver_id.eq(event.driver_id),
            wash_events::driver_name.eq(event.driver_name.as_deref()),
            wash_events::tractor_plate.eq(event.tractor_plate.as_deref()),
            wash_events::trailer_plate.eq(event.trailer_plate.as_deref()),
            wash_events::entry_mode.eq(event.entry_mode.as_str()),
            wash_events::service_package_id.eq(event.service_package_id),
            wash_events::vehicle_type.eq(event.vehicle_type.as_str()),
            wash_events::status.eq(event.status.as_str()),
            wash_events::created_at.eq(format_datetime(event.created_at)?),
        ))
        .execute(conn)?;

    let wash_event_id: i64 = conn.get_last_insert_rowid()?;

    Ok(wash_event_id)
}
}

backend_fn! {
/// Applies a wash-event transition with a compare-and-swap on status.
///
/// Writes the new status, timestamps, rejection reason, and computed price
/// only if the stored status still equals `expected_status`.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `wash_event_id` - The event to update
/// * `expected_status` - The status the caller read before transitioning
/// * `new_event` - The event after the transition
///
/// # Errors
///
/// Returns `ConcurrentModification` if the stored status no longer matches,
/// or `WashEventNotFound` if the event does not exist.
pub fn cas_wash_status(
    conn: &mut _,
    wash_event_id: i64,
    expected_status: &str,
    new_event: &WashEvent,
) -> Result<(), PersistenceError> {
    let (price, currency): (Option<i64>, Option<String>) = match &new_event.total_price {
        Some(money) => (Some(money.amount), Some(money.currency.code().to_string())),
        None => (None, None),
    };

    let affected: usize = diesel::update(
        wash_events::table
            .filter(wash_events::wash_event_id.eq(wash_event_id))
            .filter(wash_events::status.eq(expected_status)),
    )
    .set((
        wash_events::status.eq(new_event.status.as_str()),
        wash_events::authorized_at.eq(format_datetime_opt(new_event.authorized_at)?),
        wash_events::started_at.eq(format_datetime_opt(new_event.started_at)?),
        wash_events::completed_at.eq(format_datetime_opt(new_event.completed_at)?),
        wash_events::rejected_at.eq(format_datetime_opt(new_event.rejected_at)?),
        wash_events::rejection_reason.eq(new_event.rejection_reason.as_deref()),
        wash_events::total_price.eq(price),
        wash_events::currency.eq(currency),
    ))
    .execute(conn)?;

    if affected == 1 {
        return Ok(());
    }

    let exists: i64 = wash_events::table
        .filter(wash_events::wash_event_id.eq(wash_event_id))
        .count()
        .get_result(conn)?;

    if exists == 0 {
        Err(PersistenceError::WashEventNotFound(wash_event_id))
    } else {
        Err(PersistenceError::ConcurrentModification {
            record: String::from("wash_event"),
            id: wash_event_id,
            expected: expected_status.to_string(),
        })
    }
}
}
