// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for API boundary tests.
//!
//! Tests run against an in-memory `SQLite` database seeded through the
//! same handlers production uses, with recording stand-ins for the
//! external collaborators.

use std::cell::{Cell, RefCell};
use time::macros::datetime;
use time::OffsetDateTime;
use washnet_audit::Cause;
use washnet_domain::{Currency, Invoice, InvoiceItem};
use washnet_persistence::Persistence;

use crate::auth::{AuthenticatedActor, Role};
use crate::handlers::{
    authorize_wash, complete_wash, create_location, create_wash_event, onboard_partner,
    start_wash, upsert_service_price,
};
use crate::ports::{
    ExternalInvoiceIssuer, IssuedDocument, Notification, NotificationSender, PortError,
    TaxNumberValidator, TaxValidation,
};
use crate::request_response::{
    AuthorizeWashRequest, CompleteWashRequest, CreateLocationRequest, CreateWashEventRequest,
    OnboardPartnerRequest, StartWashRequest, TierSpec, UpsertServicePriceRequest,
};
use crate::NetworkContext;

pub const NETWORK_ID: i64 = 1;
pub const SERVICE_PACKAGE_ID: i64 = 1;
pub const VAT_RATE: u8 = 27;
pub const DUE_DAYS: u16 = 15;

pub fn test_ctx() -> NetworkContext {
    NetworkContext::new(NETWORK_ID, VAT_RATE, Currency::huf(), DUE_DAYS)
}

pub fn admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-1"), Role::Admin)
}

pub fn operator() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("op-17"), Role::Operator)
}

pub fn driver() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("drv-5"), Role::Driver)
}

pub fn test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

pub fn test_now() -> OffsetDateTime {
    datetime!(2026-01-12 10:30 UTC)
}

/// Records every delivered notification for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: RefCell<Vec<Notification>>,
}

impl NotificationSender for RecordingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), PortError> {
        self.sent.borrow_mut().push(notification.clone());
        Ok(())
    }
}

/// A delivery channel that is always down.
pub struct FailingNotifier;

impl NotificationSender for FailingNotifier {
    fn notify(&self, _notification: &Notification) -> Result<(), PortError> {
        Err(PortError::new("notification_sender", "SMTP relay unreachable"))
    }
}

/// Issues deterministic numbers and counts provider calls.
#[derive(Default)]
pub struct RecordingIssuer {
    pub calls: Cell<u32>,
}

impl ExternalInvoiceIssuer for RecordingIssuer {
    fn issue(&self, invoice: &Invoice, _items: &[InvoiceItem]) -> Result<IssuedDocument, PortError> {
        self.calls.set(self.calls.get() + 1);
        let invoice_id: i64 = invoice.invoice_id.unwrap_or(0);
        Ok(IssuedDocument {
            external_id: format!("ext-{invoice_id}"),
            number: format!("WSH-2026-{invoice_id:04}"),
            pdf_url: format!("https://issuer.example/invoices/{invoice_id}.pdf"),
        })
    }
}

/// A provider that is always down.
pub struct FailingIssuer;

impl ExternalInvoiceIssuer for FailingIssuer {
    fn issue(
        &self,
        _invoice: &Invoice,
        _items: &[InvoiceItem],
    ) -> Result<IssuedDocument, PortError> {
        Err(PortError::new("external_invoice_issuer", "provider timeout"))
    }
}

/// A registry that accepts every tax number.
pub struct AcceptingTaxValidator;

impl TaxNumberValidator for AcceptingTaxValidator {
    fn validate(&self, tax_number: &str) -> Result<TaxValidation, PortError> {
        Ok(TaxValidation {
            valid: true,
            details: Some(format!("Registered company for {tax_number}")),
        })
    }
}

/// A registry that rejects every tax number.
pub struct RejectingTaxValidator;

impl TaxNumberValidator for RejectingTaxValidator {
    fn validate(&self, _tax_number: &str) -> Result<TaxValidation, PortError> {
        Ok(TaxValidation {
            valid: false,
            details: None,
        })
    }
}

/// A registry that cannot be reached.
pub struct OfflineTaxValidator;

impl TaxNumberValidator for OfflineTaxValidator {
    fn validate(&self, _tax_number: &str) -> Result<TaxValidation, PortError> {
        Err(PortError::new("tax_number_validator", "registry unreachable"))
    }
}

/// A seeded network: one own location, one subcontractor location, one
/// contract partner with two-tier ladders, and a 1000 HUF tractor price.
pub struct TestNetwork {
    pub own_location_id: i64,
    pub sub_location_id: i64,
    pub partner_company_id: i64,
}

pub fn two_tier_ladder() -> Vec<TierSpec> {
    vec![
        TierSpec {
            threshold: 10,
            percent: 5,
        },
        TierSpec {
            threshold: 50,
            percent: 10,
        },
    ]
}

/// Seeds the network through the production handlers.
pub fn seed_network(persistence: &mut Persistence) -> TestNetwork {
    let ctx: NetworkContext = test_ctx();

    let own_location_id: i64 = create_location(
        persistence,
        &ctx,
        CreateLocationRequest {
            code: String::from("M1-KM24"),
            operation_type: String::from("own"),
        },
        &admin(),
    )
    .expect("Create own location")
    .location_id;

    let sub_location_id: i64 = create_location(
        persistence,
        &ctx,
        CreateLocationRequest {
            code: String::from("M7-KM88"),
            operation_type: String::from("subcontractor"),
        },
        &admin(),
    )
    .expect("Create sub location")
    .location_id;

    let partner_company_id: i64 = onboard_partner(
        persistence,
        &ctx,
        OnboardPartnerRequest {
            code: String::from("HAULER-01"),
            name: String::from("Hauler Kft."),
            tax_number: Some(String::from("12345678-2-42")),
            billing_type: String::from("contract"),
            billing_cycle: Some(String::from("monthly")),
            own_ladder: two_tier_ladder(),
            sub_ladder: two_tier_ladder(),
        },
        &admin(),
        &AcceptingTaxValidator,
        test_cause(),
    )
    .expect("Onboard partner")
    .partner_company_id;

    upsert_service_price(
        persistence,
        &ctx,
        UpsertServicePriceRequest {
            service_package_id: SERVICE_PACKAGE_ID,
            vehicle_type: String::from("tractor"),
            price: 1000,
            currency: String::from("HUF"),
        },
        &admin(),
    )
    .expect("Upsert service price");

    TestNetwork {
        own_location_id,
        sub_location_id,
        partner_company_id,
    }
}

/// Records a manual-operator tractor wash for the partner.
pub fn create_manual_wash(
    persistence: &mut Persistence,
    location_id: i64,
    partner_company_id: i64,
) -> i64 {
    create_wash_event(
        persistence,
        &test_ctx(),
        CreateWashEventRequest {
            location_id,
            partner_company_id: Some(partner_company_id),
            driver_id: None,
            driver_name: Some(String::from("Kovacs Pal")),
            tractor_plate: Some(String::from("ABC-123")),
            trailer_plate: None,
            entry_mode: String::from("manual_operator"),
            service_package_id: SERVICE_PACKAGE_ID,
            vehicle_type: String::from("tractor"),
        },
        &operator(),
        test_cause(),
        test_now(),
    )
    .expect("Create wash event")
    .wash_event_id
}

/// Drives a manual wash from created to completed.
pub fn drive_to_completed(persistence: &mut Persistence, wash_event_id: i64) {
    let ctx: NetworkContext = test_ctx();
    let notifier: RecordingNotifier = RecordingNotifier::default();

    authorize_wash(
        persistence,
        &ctx,
        AuthorizeWashRequest { wash_event_id },
        &operator(),
        test_cause(),
        test_now(),
    )
    .expect("Authorize wash");
    start_wash(
        persistence,
        &ctx,
        StartWashRequest { wash_event_id },
        &operator(),
        test_cause(),
        test_now(),
    )
    .expect("Start wash");
    complete_wash(
        persistence,
        &ctx,
        CompleteWashRequest { wash_event_id },
        &operator(),
        &notifier,
        test_cause(),
        test_now(),
    )
    .expect("Complete wash");
}

/// Records and completes `count` manual washes at one location.
pub fn completed_washes(
    persistence: &mut Persistence,
    location_id: i64,
    partner_company_id: i64,
    count: u32,
) {
    for _ in 0..count {
        let wash_event_id: i64 =
            create_manual_wash(persistence, location_id, partner_company_id);
        drive_to_completed(persistence, wash_event_id);
    }
}
