// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog mutation operations.
//!
//! Locations, partner companies with their discount ladders, and the price
//! catalog. Partners are soft-deleted only; price changes deactivate the
//! previous row rather than overwriting it, preserving at most one active
//! price per key.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use washnet_domain::{DiscountLadder, Location, PartnerCompany, PartnerCustomPrice, ServicePrice};

use crate::backend::PersistenceBackend;
use crate::data_models::NewDiscountTier;
use crate::diesel_schema::{
    discount_tiers, locations, partner_companies, partner_custom_prices, service_prices,
};
use crate::error::PersistenceError;

/// Ladder discriminator stored with each tier row.
pub const LADDER_OWN: &str = "own";
/// Ladder discriminator stored with each tier row.
pub const LADDER_SUB: &str = "subcontractor";

backend_fn! {
/// Inserts a new location.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `location` - The location to insert (must not have an ID yet)
///
/// # Returns
///
/// The location ID assigned by the database.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_location(
    conn: &mut _,
    location: &Location,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(locations::table)
        .values((
            locations::network_id.eq(location.network_id),
            locations::code.eq(location.code.as_str()),
            locations::operation_type.eq(location.operation_type.as_str()),
            locations::is_active.eq(i32::from(location.is_active)),
        ))
        .execute(conn)?;

    Ok(conn.get_last_insert_rowid()?)
}
}

backend_fn! {
/// Inserts a new partner company with both discount ladders.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner` - The partner to insert (must not have an ID yet)
///
/// # Returns
///
/// The partner company ID assigned by the database.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn create_partner(
    conn: &mut _,
    partner: &PartnerCompany,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(partner_companies::table)
        .values((
            partner_companies::network_id.eq(partner.network_id),
            partner_companies::code.eq(partner.code.value()),
            partner_companies::name.eq(partner.name.as_str()),
            partner_companies::tax_number.eq(partner.tax_number.as_deref()),
            partner_companies::billing_type.eq(partner.billing_type.as_str()),
            partner_companies::billing_cycle.eq(partner.billing_cycle.map(|c| c.as_str())),
            partner_companies::is_active.eq(i32::from(partner.is_active)),
        ))
        .execute(conn)?;

    let partner_company_id: i64 = conn.get_last_insert_rowid()?;

    let tiers: Vec<NewDiscountTier> =
        ladder_rows(partner_company_id, &partner.own_ladder, &partner.sub_ladder);
    diesel::insert_into(discount_tiers::table)
        .values(&tiers)
        .execute(conn)?;

    Ok(partner_company_id)
}
}

backend_fn! {
/// Replaces both discount ladders of a partner.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner_company_id` - The partner to update
/// * `own_ladder` - The new own-network ladder
/// * `sub_ladder` - The new subcontractor ladder
///
/// # Errors
///
/// Returns an error if the partner does not exist or a write fails.
pub fn replace_partner_ladders(
    conn: &mut _,
    partner_company_id: i64,
    own_ladder: &DiscountLadder,
    sub_ladder: &DiscountLadder,
) -> Result<(), PersistenceError> {
    let exists: i64 = partner_companies::table
        .filter(partner_companies::partner_company_id.eq(partner_company_id))
        .count()
        .get_result(conn)?;

    if exists == 0 {
        return Err(PersistenceError::PartnerNotFound(partner_company_id));
    }

    diesel::delete(
        discount_tiers::table.filter(discount_tiers::partner_company_id.eq(partner_company_id)),
    )
    .execute(conn)?;

    let tiers: Vec<NewDiscountTier> = ladder_rows(partner_company_id, own_ladder, sub_ladder);
    diesel::insert_into(discount_tiers::table)
        .values(&tiers)
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Soft-deletes a partner company.
///
/// The partner remains in place for invoices that reference it; only the
/// active flag changes.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner_company_id` - The partner to deactivate
///
/// # Errors
///
/// Returns `PartnerNotFound` if the partner does not exist.
pub fn deactivate_partner(
    conn: &mut _,
    partner_company_id: i64,
) -> Result<(), PersistenceError> {
    let affected: usize = diesel::update(
        partner_companies::table
            .filter(partner_companies::partner_company_id.eq(partner_company_id)),
    )
    .set(partner_companies::is_active.eq(0))
    .execute(conn)?;

    if affected == 0 {
        return Err(PersistenceError::PartnerNotFound(partner_company_id));
    }

    Ok(())
}
}

backend_fn! {
/// Inserts or replaces the network-default price for one key.
///
/// Any currently active price for the same (network, service package,
/// vehicle type) key is deactivated first, so at most one active price
/// exists per key.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `price` - The new price
///
/// # Returns
///
/// The service price ID assigned by the database.
///
/// # Errors
///
/// Returns an error if a write fails.
pub fn upsert_service_price(
    conn: &mut _,
    price: &ServicePrice,
) -> Result<i64, PersistenceError> {
    diesel::update(
        service_prices::table
            .filter(service_prices::network_id.eq(price.network_id))
            .filter(service_prices::service_package_id.eq(price.service_package_id))
            .filter(service_prices::vehicle_type.eq(price.vehicle_type.as_str()))
            .filter(service_prices::is_active.eq(1)),
    )
    .set(service_prices::is_active.eq(0))
    .execute(conn)?;

    diesel::insert_into(service_prices::table)
        .values((
            service_prices::network_id.eq(price.network_id),
            service_prices::service_package_id.eq(price.service_package_id),
            service_prices::vehicle_type.eq(price.vehicle_type.as_str()),
            service_prices::price.eq(price.price.amount),
            service_prices::currency.eq(price.price.currency.code()),
            service_prices::is_active.eq(i32::from(price.is_active)),
        ))
        .execute(conn)?;

    Ok(conn.get_last_insert_rowid()?)
}
}

backend_fn! {
/// Inserts or replaces a partner-specific price override for one key.
///
/// Any currently active override for the same (network, partner, service
/// package, vehicle type) key is deactivated first.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `price` - The new override
///
/// # Returns
///
/// The partner custom price ID assigned by the database.
///
/// # Errors
///
/// Returns an error if a write fails.
pub fn upsert_partner_price(
    conn: &mut _,
    price: &PartnerCustomPrice,
) -> Result<i64, PersistenceError> {
    diesel::update(
        partner_custom_prices::table
            .filter(partner_custom_prices::network_id.eq(price.network_id))
            .filter(partner_custom_prices::partner_company_id.eq(price.partner_company_id))
            .filter(partner_custom_prices::service_package_id.eq(price.service_package_id))
            .filter(partner_custom_prices::vehicle_type.eq(price.vehicle_type.as_str()))
            .filter(partner_custom_prices::is_active.eq(1)),
    )
    .set(partner_custom_prices::is_active.eq(0))
    .execute(conn)?;

    diesel::insert_into(partner_custom_prices::table)
        .values((
            partner_custom_prices::network_id.eq(price.network_id),
            partner_custom_prices::partner_company_id.eq(price.partner_company_id),
            partner_custom_prices::service_package_id.eq(price.service_package_id),
            partner_custom_prices::vehicle_type.eq(price.vehicle_type.as_str()),
            partner_custom_prices::price.eq(price.price.amount),
            partner_custom_prices::currency.eq(price.price.currency.code()),
            partner_custom_prices::is_active.eq(i32::from(price.is_active)),
        ))
        .execute(conn)?;

    Ok(conn.get_last_insert_rowid()?)
}
}

/// Builds the flattened tier rows for both ladders of a partner.
fn ladder_rows(
    partner_company_id: i64,
    own_ladder: &DiscountLadder,
    sub_ladder: &DiscountLadder,
) -> Vec<NewDiscountTier> {
    let mut rows: Vec<NewDiscountTier> = Vec::new();
    for (name, ladder) in [(LADDER_OWN, own_ladder), (LADDER_SUB, sub_ladder)] {
        for (index, tier) in ladder.tiers().iter().enumerate() {
            rows.push(NewDiscountTier {
                partner_company_id,
                ladder: name.to_string(),
                tier_index: i32::try_from(index).unwrap_or(i32::MAX),
                threshold: i32::try_from(tier.threshold).unwrap_or(i32::MAX),
                percent: i32::from(tier.percent),
            });
        }
    }
    rows
}
