// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Catalog queries.
//!
//! Partners are reconstructed together with their discount ladders; the
//! price catalog is loaded as an in-memory snapshot so that price
//! resolution and invoice preparation run without further database reads.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use std::str::FromStr;
use washnet_domain::{
    BillingCycle, BillingType, Currency, DiscountLadder, DiscountTier, Location, Money,
    OperationType, PartnerCode, PartnerCompany, PartnerCustomPrice, PriceCatalog, ServicePrice,
    VehicleType,
};

use crate::data_models::PartnerCompanyRow;
use crate::diesel_schema::{
    discount_tiers, locations, partner_companies, partner_custom_prices, service_prices,
};
use crate::error::PersistenceError;
use crate::mutations::catalog::{LADDER_OWN, LADDER_SUB};

/// Maps a domain parse failure onto a reconstruction error.
fn reconstruction(err: washnet_domain::DomainError) -> PersistenceError {
    PersistenceError::ReconstructionError(err.to_string())
}

/// Rebuilds one ladder from its stored tier rows.
fn reconstruct_ladder(rows: &[(String, i32, i32)], name: &str) -> Result<DiscountLadder, PersistenceError> {
    let tiers: Vec<DiscountTier> = rows
        .iter()
        .filter(|(ladder, _, _)| ladder == name)
        .map(|(_, threshold, percent)| {
            Ok(DiscountTier {
                threshold: threshold.to_u32().ok_or_else(|| {
                    PersistenceError::ReconstructionError(format!(
                        "invalid stored tier threshold: {threshold}"
                    ))
                })?,
                percent: percent.to_u8().ok_or_else(|| {
                    PersistenceError::ReconstructionError(format!(
                        "invalid stored tier percent: {percent}"
                    ))
                })?,
            })
        })
        .collect::<Result<Vec<DiscountTier>, PersistenceError>>()?;

    DiscountLadder::new(tiers).map_err(reconstruction)
}

backend_fn! {
/// Retrieves a location by ID.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `location_id` - The location to retrieve
///
/// # Errors
///
/// Returns `NotFound` if no such location exists.
pub fn get_location(
    conn: &mut _,
    location_id: i64,
) -> Result<Location, PersistenceError> {
    let row: Option<(i64, i64, String, String, i32)> = locations::table
        .filter(locations::location_id.eq(location_id))
        .first::<(i64, i64, String, String, i32)>(conn)
        .optional()?;

    let (location_id, network_id, code, operation_type, is_active) = row.ok_or_else(|| {
        PersistenceError::NotFound(format!("location {location_id}"))
    })?;

    Ok(Location {
        location_id: Some(location_id),
        network_id,
        code,
        operation_type: OperationType::from_str(&operation_type).map_err(reconstruction)?,
        is_active: is_active != 0,
    })
}
}

backend_fn! {
/// Retrieves a partner company with both discount ladders.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `partner_company_id` - The partner to retrieve
///
/// # Errors
///
/// Returns `PartnerNotFound` if no such partner exists, or an error if the
/// stored rows cannot be reconstructed.
pub fn get_partner(
    conn: &mut _,
    partner_company_id: i64,
) -> Result<PartnerCompany, PersistenceError> {
    let row: Option<PartnerCompanyRow> = partner_companies::table
        .filter(partner_companies::partner_company_id.eq(partner_company_id))
        .first::<PartnerCompanyRow>(conn)
        .optional()?;

    let Some(row) = row else {
        return Err(PersistenceError::PartnerNotFound(partner_company_id));
    };

    let tier_rows: Vec<(String, i32, i32)> = discount_tiers::table
        .select((
            discount_tiers::ladder,
            discount_tiers::threshold,
            discount_tiers::percent,
        ))
        .filter(discount_tiers::partner_company_id.eq(partner_company_id))
        .order(discount_tiers::tier_index.asc())
        .load::<(String, i32, i32)>(conn)?;

    reconstruct_partner(row, &tier_rows)
}
}

backend_fn! {
/// Finds a partner's canonical identifier by code within a network.
///
/// Used at onboarding to enforce per-network code uniqueness.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `network_id` - The network to search within
/// * `code` - The partner code (already normalized)
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_partner_by_code(
    conn: &mut _,
    network_id: i64,
    code: &str,
) -> Result<Option<i64>, PersistenceError> {
    Ok(partner_companies::table
        .select(partner_companies::partner_company_id)
        .filter(partner_companies::network_id.eq(network_id))
        .filter(partner_companies::code.eq(code))
        .first::<i64>(conn)
        .optional()?)
}
}

backend_fn! {
/// Loads the price catalog snapshot for one network.
///
/// Both active and inactive rows are loaded; resolution filters on the
/// active flag so a deactivated override correctly falls back to the
/// network default.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `network_id` - The network whose catalog is loaded
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or reconstructed.
pub fn load_price_catalog(
    conn: &mut _,
    network_id: i64,
) -> Result<PriceCatalog, PersistenceError> {
    let service_rows: Vec<(i64, i64, i64, String, i64, String, i32)> = service_prices::table
        .filter(service_prices::network_id.eq(network_id))
        .load::<(i64, i64, i64, String, i64, String, i32)>(conn)?;

    let mut service_prices_list: Vec<ServicePrice> = Vec::with_capacity(service_rows.len());
    for (id, network_id, service_package_id, vehicle_type, amount, currency, is_active) in
        service_rows
    {
        service_prices_list.push(ServicePrice {
            service_price_id: Some(id),
            network_id,
            service_package_id,
            vehicle_type: VehicleType::from_str(&vehicle_type).map_err(reconstruction)?,
            price: Money::new(amount, Currency::new(&currency).map_err(reconstruction)?)
                .map_err(reconstruction)?,
            is_active: is_active != 0,
        });
    }

    let partner_rows: Vec<(i64, i64, i64, i64, String, i64, String, i32)> =
        partner_custom_prices::table
            .filter(partner_custom_prices::network_id.eq(network_id))
            .load::<(i64, i64, i64, i64, String, i64, String, i32)>(conn)?;

    let mut partner_prices_list: Vec<PartnerCustomPrice> = Vec::with_capacity(partner_rows.len());
    for (
        id,
        network_id,
        partner_company_id,
        service_package_id,
        vehicle_type,
        amount,
        currency,
        is_active,
    ) in partner_rows
    {
        partner_prices_list.push(PartnerCustomPrice {
            partner_custom_price_id: Some(id),
            network_id,
            partner_company_id,
            service_package_id,
            vehicle_type: VehicleType::from_str(&vehicle_type).map_err(reconstruction)?,
            price: Money::new(amount, Currency::new(&currency).map_err(reconstruction)?)
                .map_err(reconstruction)?,
            is_active: is_active != 0,
        });
    }

    Ok(PriceCatalog::new(service_prices_list, partner_prices_list))
}
}

/// Rebuilds a `PartnerCompany` from its header row and tier rows.
fn reconstruct_partner(
    row: PartnerCompanyRow,
    tier_rows: &[(String, i32, i32)],
) -> Result<PartnerCompany, PersistenceError> {
    let (
        partner_company_id,
        network_id,
        code,
        name,
        tax_number,
        billing_type,
        billing_cycle,
        is_active,
    ) = row;

    Ok(PartnerCompany {
        partner_company_id: Some(partner_company_id),
        network_id,
        code: PartnerCode::new(&code),
        name,
        tax_number,
        billing_type: BillingType::from_str(&billing_type).map_err(reconstruction)?,
        billing_cycle: billing_cycle
            .as_deref()
            .map(BillingCycle::from_str)
            .transpose()
            .map_err(reconstruction)?,
        own_ladder: reconstruct_ladder(tier_rows, LADDER_OWN)?,
        sub_ladder: reconstruct_ladder(tier_rows, LADDER_SUB)?,
        is_active: is_active != 0,
    })
}
