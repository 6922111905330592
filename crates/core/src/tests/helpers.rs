// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared builders for core tests.

use time::macros::datetime;
use time::OffsetDateTime;
use washnet_audit::{Actor, Cause};
use washnet_domain::{
    BillingCycle, BillingType, Currency, DiscountLadder, DiscountTier, EntryMode, Money,
    PartnerCode, PartnerCompany, PriceCatalog, ServicePrice, VehicleType, WashEvent, WashStatus,
};

pub const NETWORK_ID: i64 = 1;
pub const LOCATION_ID: i64 = 3;
pub const PARTNER_ID: i64 = 7;
pub const SERVICE_PACKAGE_ID: i64 = 1;

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-01-12 10:30 UTC)
}

pub fn operator_actor() -> Actor {
    Actor::new(String::from("op-17"), String::from("operator"))
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

pub fn make_catalog(amount: i64) -> PriceCatalog {
    PriceCatalog::new(
        vec![ServicePrice {
            service_price_id: Some(1),
            network_id: NETWORK_ID,
            service_package_id: SERVICE_PACKAGE_ID,
            vehicle_type: VehicleType::Tractor,
            price: Money::new(amount, Currency::huf()).unwrap(),
            is_active: true,
        }],
        vec![],
    )
}

pub fn make_event(entry_mode: EntryMode, status: WashStatus) -> WashEvent {
    let mut event: WashEvent = WashEvent::new(
        NETWORK_ID,
        LOCATION_ID,
        entry_mode,
        SERVICE_PACKAGE_ID,
        VehicleType::Tractor,
        test_now(),
    );
    event.wash_event_id = Some(42);
    event.partner_company_id = Some(PARTNER_ID);
    event.tractor_plate = Some(String::from("ABC-123"));
    event.status = status;
    event
}

pub fn two_tier_ladder() -> DiscountLadder {
    DiscountLadder::new(vec![
        DiscountTier {
            threshold: 10,
            percent: 5,
        },
        DiscountTier {
            threshold: 50,
            percent: 10,
        },
    ])
    .unwrap()
}

pub fn make_partner() -> PartnerCompany {
    PartnerCompany {
        partner_company_id: Some(PARTNER_ID),
        network_id: NETWORK_ID,
        code: PartnerCode::new("HAULER-01"),
        name: String::from("Hauler Kft."),
        tax_number: Some(String::from("12345678-2-42")),
        billing_type: BillingType::Contract,
        billing_cycle: Some(BillingCycle::Monthly),
        own_ladder: two_tier_ladder(),
        sub_ladder: DiscountLadder::empty(),
        is_active: true,
    }
}
