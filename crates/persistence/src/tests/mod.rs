// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod backend_validation_tests;
mod wash_transition_tests;

use time::macros::datetime;
use time::OffsetDateTime;
use washnet::{WashCommand, WashTransition, apply_wash};
use washnet_audit::{Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot};
use washnet_domain::{
    BillingCycle, BillingType, Currency, DiscountLadder, DiscountTier, EntryMode, Location, Money,
    OperationType, PartnerCode, PartnerCompany, PriceCatalog, ServicePrice, VehicleType,
    WashEvent,
};

use crate::Persistence;

pub const NETWORK_ID: i64 = 1;
pub const SERVICE_PACKAGE_ID: i64 = 1;

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("op-17"), String::from("operator"))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("test-cause"), String::from("Test operation"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-01-12 10:30 UTC)
}

/// A seeded network: one own location, one subcontractor location, one
/// contract partner with a two-tier own ladder, and a tractor price.
pub struct TestNetwork {
    pub own_location_id: i64,
    pub sub_location_id: i64,
    pub partner_company_id: i64,
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
    .expect("Valid test ladder")
}

pub fn create_test_partner() -> PartnerCompany {
    PartnerCompany {
        partner_company_id: None,
        network_id: NETWORK_ID,
        code: PartnerCode::new("HAULER-01"),
        name: String::from("Hauler Kft."),
        tax_number: Some(String::from("12345678-2-42")),
        billing_type: BillingType::Contract,
        billing_cycle: Some(BillingCycle::Monthly),
        own_ladder: two_tier_ladder(),
        sub_ladder: two_tier_ladder(),
        is_active: true,
    }
}

/// Builds the audit event recorded when a record is created.
pub fn creation_audit(action: &str, after: String) -> AuditEvent {
    AuditEvent::new(
        create_test_actor(),
        create_test_cause(),
        Action::new(action.to_string(), None),
        StateSnapshot::new(String::from("none")),
        StateSnapshot::new(after),
        NETWORK_ID,
        AuditSubject::Pending,
    )
}

/// Seeds locations, a partner, and a 1000 HUF tractor price.
pub fn seed_network(persistence: &mut Persistence) -> TestNetwork {
    let own_location_id: i64 = persistence
        .create_location(&Location::new(NETWORK_ID, "M1-KM24", OperationType::Own))
        .expect("Create own location");
    let sub_location_id: i64 = persistence
        .create_location(&Location::new(
            NETWORK_ID,
            "M7-KM88",
            OperationType::Subcontractor,
        ))
        .expect("Create sub location");

    let partner: PartnerCompany = create_test_partner();
    let partner_company_id: i64 = persistence
        .create_partner(&partner, &creation_audit("CreatePartner", partner.code.to_string()))
        .expect("Create partner");

    persistence
        .upsert_service_price(&ServicePrice {
            service_price_id: None,
            network_id: NETWORK_ID,
            service_package_id: SERVICE_PACKAGE_ID,
            vehicle_type: VehicleType::Tractor,
            price: Money::new(1000, Currency::huf()).expect("Valid price"),
            is_active: true,
        })
        .expect("Upsert service price");

    TestNetwork {
        own_location_id,
        sub_location_id,
        partner_company_id,
    }
}

/// Creates a persisted wash event for the test partner.
pub fn create_wash(
    persistence: &mut Persistence,
    location_id: i64,
    partner_company_id: i64,
    entry_mode: EntryMode,
) -> i64 {
    let mut event: WashEvent = WashEvent::new(
        NETWORK_ID,
        location_id,
        entry_mode,
        SERVICE_PACKAGE_ID,
        VehicleType::Tractor,
        test_now(),
    );
    event.partner_company_id = Some(partner_company_id);
    event.tractor_plate = Some(String::from("ABC-123"));

    persistence
        .create_wash_event(&event, &creation_audit("CreateWash", event.snapshot()))
        .expect("Create wash event")
}

/// Loads the catalog and drives a created manual-operator wash to completed.
pub fn drive_to_completed(
    persistence: &mut Persistence,
    wash_event_id: i64,
    completed_at: OffsetDateTime,
) {
    let catalog: PriceCatalog = persistence
        .load_price_catalog(NETWORK_ID)
        .expect("Load catalog");

    for (command, at) in [
        (WashCommand::Authorize, completed_at),
        (WashCommand::Start, completed_at),
        (WashCommand::Complete, completed_at),
    ] {
        let event: WashEvent = persistence
            .get_wash_event(wash_event_id)
            .expect("Load wash event");
        let expected = event.status;
        let transition: WashTransition = apply_wash(
            &catalog,
            &event,
            command,
            create_test_actor(),
            create_test_cause(),
            at,
        )
        .expect("Apply wash command");
        persistence
            .commit_wash_transition(expected, &transition)
            .expect("Commit wash transition");
    }
}
