// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Unit-price resolution against the network price catalog.
//!
//! Resolution is read-only and referentially transparent: for a fixed
//! catalog state, identical inputs always resolve to the identical price.
//! Invoice reproducibility depends on this.

use crate::error::DomainError;
use crate::types::{Money, PartnerCustomPrice, ServicePrice, VehicleType};

/// An in-memory snapshot of the price catalog for one network.
///
/// The catalog is administration input: it is loaded by the persistence
/// layer and passed in explicitly, so resolution never touches a database.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PriceCatalog {
    /// Network-default prices.
    pub service_prices: Vec<ServicePrice>,
    /// Partner-specific overrides.
    pub partner_prices: Vec<PartnerCustomPrice>,
}

impl PriceCatalog {
    /// Creates a new catalog snapshot.
    ///
    /// # Arguments
    ///
    /// * `service_prices` - Network-default prices
    /// * `partner_prices` - Partner-specific overrides
    #[must_use]
    pub const fn new(
        service_prices: Vec<ServicePrice>,
        partner_prices: Vec<PartnerCustomPrice>,
    ) -> Self {
        Self {
            service_prices,
            partner_prices,
        }
    }
}

/// Resolves the unit price for one wash.
///
/// If a partner is given and an active partner-specific override exists
/// for the exact (partner, service package, vehicle type) key, the
/// override wins. Otherwise the active network-default price for
/// (service package, vehicle type) applies. Billing never silently
/// defaults to zero: a missing price is an error.
///
/// # Arguments
///
/// * `catalog` - The catalog snapshot to resolve against
/// * `network_id` - The network performing the wash
/// * `partner_company_id` - The partner being billed, if any
/// * `service_package_id` - The service package performed
/// * `vehicle_type` - The washed vehicle's type
///
/// # Returns
///
/// The resolved unit price.
///
/// # Errors
///
/// Returns `DomainError::PriceNotConfigured` if neither an active
/// override nor an active network-default price exists for the key.
pub fn resolve_price(
    catalog: &PriceCatalog,
    network_id: i64,
    partner_company_id: Option<i64>,
    service_package_id: i64,
    vehicle_type: VehicleType,
) -> Result<Money, DomainError> {
    if let Some(partner_id) = partner_company_id {
        let custom: Option<&PartnerCustomPrice> = catalog.partner_prices.iter().find(|p| {
            p.is_active
                && p.network_id == network_id
                && p.partner_company_id == partner_id
                && p.service_package_id == service_package_id
                && p.vehicle_type == vehicle_type
        });

        if let Some(price) = custom {
            return Ok(price.price.clone());
        }
    }

    let base: Option<&ServicePrice> = catalog.service_prices.iter().find(|p| {
        p.is_active
            && p.network_id == network_id
            && p.service_package_id == service_package_id
            && p.vehicle_type == vehicle_type
    });

    base.map(|p| p.price.clone())
        .ok_or(DomainError::PriceNotConfigured {
            network_id,
            partner_company_id,
            service_package_id,
            vehicle_type,
        })
}
