// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wash-event transition persistence tests.
//!
//! The compare-and-swap contract: a transition commits only if the stored
//! status still equals the status the caller read, and its audit event
//! commits in the same transaction.

use crate::tests::{
    NETWORK_ID, create_test_actor, create_test_cause, create_wash, drive_to_completed,
    seed_network, test_now,
};
use crate::{Persistence, PersistenceError};
use washnet::{WashCommand, WashTransition, apply_wash};
use washnet_audit::AuditSubject;
use washnet_domain::{EntryMode, PriceCatalog, WashEvent, WashStatus};

#[test]
fn test_transition_updates_status_and_audits() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::ManualOperator,
    );

    let catalog: PriceCatalog = persistence.load_price_catalog(NETWORK_ID).expect("Catalog");
    let event: WashEvent = persistence.get_wash_event(wash_event_id).expect("Load");
    let transition: WashTransition = apply_wash(
        &catalog,
        &event,
        WashCommand::Authorize,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("Authorize");

    persistence
        .commit_wash_transition(WashStatus::Created, &transition)
        .expect("Commit");

    let stored: WashEvent = persistence.get_wash_event(wash_event_id).expect("Reload");
    assert_eq!(stored.status, WashStatus::Authorized);
    assert!(stored.authorized_at.is_some());

    // Creation + authorization are both on the timeline
    let timeline = persistence
        .get_audit_timeline(NETWORK_ID, AuditSubject::WashEvent(wash_event_id))
        .expect("Timeline");
    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline[1].action.name, "AuthorizeWash");
}

#[test]
fn test_concurrent_authorize_one_wins() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::ManualOperator,
    );

    let catalog: PriceCatalog = persistence.load_price_catalog(NETWORK_ID).expect("Catalog");

    // Both "operators" read the same snapshot
    let snapshot: WashEvent = persistence.get_wash_event(wash_event_id).expect("Load");
    let first: WashTransition = apply_wash(
        &catalog,
        &snapshot,
        WashCommand::Authorize,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("First authorize");
    let second: WashTransition = apply_wash(
        &catalog,
        &snapshot,
        WashCommand::Authorize,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("Second authorize");

    assert!(
        persistence
            .commit_wash_transition(WashStatus::Created, &first)
            .is_ok()
    );

    // The second commit finds the status changed since its read
    match persistence.commit_wash_transition(WashStatus::Created, &second) {
        Err(PersistenceError::ConcurrentModification { record, id, .. }) => {
            assert_eq!(record, "wash_event");
            assert_eq!(id, wash_event_id);
        }
        other => panic!("Expected ConcurrentModification, got {other:?}"),
    }

    // Exactly one transition applied, exactly one authorization audit
    let timeline = persistence
        .get_audit_timeline(NETWORK_ID, AuditSubject::WashEvent(wash_event_id))
        .expect("Timeline");
    assert_eq!(timeline.len(), 2);
}

#[test]
fn test_failed_cas_writes_no_audit() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::ManualOperator,
    );

    let catalog: PriceCatalog = persistence.load_price_catalog(NETWORK_ID).expect("Catalog");
    let snapshot: WashEvent = persistence.get_wash_event(wash_event_id).expect("Load");
    let transition: WashTransition = apply_wash(
        &catalog,
        &snapshot,
        WashCommand::Authorize,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("Authorize");

    // Stale expectation: claim the event was already authorized
    assert!(
        persistence
            .commit_wash_transition(WashStatus::Authorized, &transition)
            .is_err()
    );

    let timeline = persistence
        .get_audit_timeline(NETWORK_ID, AuditSubject::WashEvent(wash_event_id))
        .expect("Timeline");
    assert_eq!(timeline.len(), 1, "only the creation audit may exist");

    let stored: WashEvent = persistence.get_wash_event(wash_event_id).expect("Reload");
    assert_eq!(stored.status, WashStatus::Created, "event left untouched");
}

#[test]
fn test_completion_stores_resolved_price() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::ManualOperator,
    );

    drive_to_completed(&mut persistence, wash_event_id, test_now());

    let stored: WashEvent = persistence.get_wash_event(wash_event_id).expect("Reload");
    assert_eq!(stored.status, WashStatus::Completed);
    let price = stored.total_price.expect("Completed wash has a price");
    assert_eq!(price.amount, 1000);
    assert_eq!(price.currency.code(), "HUF");
}

#[test]
fn test_driver_qr_start_self_authorizes() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::DriverQr,
    );

    let catalog: PriceCatalog = persistence.load_price_catalog(NETWORK_ID).expect("Catalog");
    let event: WashEvent = persistence.get_wash_event(wash_event_id).expect("Load");
    let transition: WashTransition = apply_wash(
        &catalog,
        &event,
        WashCommand::Start,
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("QR start from created");

    persistence
        .commit_wash_transition(WashStatus::Created, &transition)
        .expect("Commit");

    let stored: WashEvent = persistence.get_wash_event(wash_event_id).expect("Reload");
    assert_eq!(stored.status, WashStatus::InProgress);
    assert!(stored.authorized_at.is_some(), "start stamps authorization");
    assert!(stored.started_at.is_some());
}

#[test]
fn test_rejection_round_trips_reason() {
    let mut persistence: Persistence = Persistence::new_in_memory().expect("Database");
    let network = seed_network(&mut persistence);
    let wash_event_id: i64 = create_wash(
        &mut persistence,
        network.own_location_id,
        network.partner_company_id,
        EntryMode::ManualOperator,
    );

    let catalog: PriceCatalog = persistence.load_price_catalog(NETWORK_ID).expect("Catalog");
    let event: WashEvent = persistence.get_wash_event(wash_event_id).expect("Load");
    let transition: WashTransition = apply_wash(
        &catalog,
        &event,
        WashCommand::Reject {
            reason: String::from("Vehicle too dirty for the booked package"),
        },
        create_test_actor(),
        create_test_cause(),
        test_now(),
    )
    .expect("Reject");

    persistence
        .commit_wash_transition(WashStatus::Created, &transition)
        .expect("Commit");

    let stored: WashEvent = persistence.get_wash_event(wash_event_id).expect("Reload");
    assert_eq!(stored.status, WashStatus::Rejected);
    assert_eq!(
        stored.rejection_reason.as_deref(),
        Some("Vehicle too dirty for the booked package")
    );
}
