// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every state-changing handler follows the same shape: authorize the
//! actor, load current state, apply the pure core transition, commit the
//! transition and its audit event atomically through persistence, then
//! fire best-effort notifications. Collaborator failure after the commit
//! never rolls a transition back.

use std::str::FromStr;
use time::OffsetDateTime;
use washnet::{
    BillableWash, InvoiceCommand, PreparedInvoice, WashCommand, WashTransition, apply_invoice,
    apply_wash, prepare_invoice,
};
use washnet_audit::{Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot};
use washnet_domain::{
    BillingCycle, BillingType, Currency, DiscountLadder, DiscountResult, DiscountTier, EntryMode,
    Invoice, InvoiceItem, InvoiceStatus, Location, Money, OperationType, PartnerCode,
    PartnerCompany, PartnerCustomPrice, PriceCatalog, ServicePrice, VehicleType, WashEvent,
    calculate_discount, resolve_price, validate_partner_fields,
};
use washnet_persistence::{Persistence, PersistenceError};

use crate::NetworkContext;
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::ports::{ExternalInvoiceIssuer, Notification, NotificationSender, TaxNumberValidator};
use crate::request_response::{
    AuditEntryInfo, AuditTimelineResponse, AuthorizeWashRequest, CancelInvoiceRequest,
    CancelInvoiceResponse, CompleteWashRequest, CreateLocationRequest, CreateLocationResponse,
    CreateWashEventRequest, CreateWashEventResponse, DeactivatePartnerRequest,
    DeactivatePartnerResponse, DiscountPartitionInfo, DiscountPreviewRequest,
    DiscountPreviewResponse, InvoiceInfo, InvoiceResponse, IssueInvoiceRequest,
    MarkInvoicePaidRequest, MarkInvoiceSentRequest, OnboardPartnerRequest, OnboardPartnerResponse,
    PrepareInvoiceRequest, PrepareInvoiceResponse, RejectWashRequest, StartWashRequest,
    SweepOverdueRequest, SweepOverdueResponse, TierSpec, UpdatePartnerLaddersRequest,
    UpdatePartnerLaddersResponse, UpsertPartnerPriceRequest, UpsertPartnerPriceResponse,
    UpsertServicePriceRequest, UpsertServicePriceResponse, WashEventInfo, WashEventResponse,
};

/// Delivers a notification, logging and swallowing any failure.
///
/// Notifications are strictly best-effort: the owning transition already
/// committed, and a delivery failure must not surface to the caller.
fn notify_best_effort(notifier: &dyn NotificationSender, notification: &Notification) {
    if let Err(err) = notifier.notify(notification) {
        tracing::warn!("Notification delivery failed: {err}");
    }
}

/// Loads a wash event and verifies it belongs to the caller's network.
///
/// Records of other networks are reported as not found, never as foreign.
fn load_scoped_wash(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    wash_event_id: i64,
) -> Result<WashEvent, ApiError> {
    let event: WashEvent = persistence
        .get_wash_event(wash_event_id)
        .map_err(translate_persistence_error)?;

    if event.network_id != ctx.network_id {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Wash event"),
            message: format!("Wash event {wash_event_id} does not exist"),
        });
    }

    Ok(event)
}

/// Loads an invoice and verifies it belongs to the caller's network.
fn load_scoped_invoice(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    invoice_id: i64,
) -> Result<Invoice, ApiError> {
    let invoice: Invoice = persistence
        .get_invoice(invoice_id)
        .map_err(translate_persistence_error)?;

    if invoice.network_id != ctx.network_id {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Invoice"),
            message: format!("Invoice {invoice_id} does not exist"),
        });
    }

    Ok(invoice)
}

/// Loads a partner and verifies it belongs to the caller's network.
fn load_scoped_partner(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    partner_company_id: i64,
) -> Result<PartnerCompany, ApiError> {
    let partner: PartnerCompany = persistence
        .get_partner(partner_company_id)
        .map_err(translate_persistence_error)?;

    if partner.network_id != ctx.network_id {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Partner company"),
            message: format!("Partner company {partner_company_id} does not exist"),
        });
    }

    Ok(partner)
}

/// Builds a validated discount ladder from requested tiers.
fn build_ladder(tiers: Vec<TierSpec>) -> Result<DiscountLadder, ApiError> {
    let tiers: Vec<DiscountTier> = tiers
        .into_iter()
        .map(|t| DiscountTier {
            threshold: t.threshold,
            percent: t.percent,
        })
        .collect();

    DiscountLadder::new(tiers).map_err(translate_domain_error)
}

/// Renders a ladder compactly for audit snapshots ("10:5,50:10").
fn ladder_summary(ladder: &DiscountLadder) -> String {
    if ladder.tiers().is_empty() {
        return String::from("none");
    }
    ladder
        .tiers()
        .iter()
        .map(|t| format!("{}:{}", t.threshold, t.percent))
        .collect::<Vec<String>>()
        .join(",")
}

// ============================================================================
// Wash Events
// ============================================================================

/// Records a new wash event via the API boundary with authorization.
///
/// The event starts its lifecycle in the created state; no pricing happens
/// here. Manual entries require an operator; QR entries may be recorded by
/// the driver themselves.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `ctx` - The tenant context
/// * `request` - The API request to record a wash
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The creation timestamp
///
/// # Errors
///
/// Returns an error if:
/// - The actor's role does not permit the entry mode
/// - The entry mode or vehicle type does not parse
/// - The location does not exist, is inactive, or the partner is unknown
pub fn create_wash_event(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: CreateWashEventRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CreateWashEventResponse, ApiError> {
    let entry_mode: EntryMode =
        EntryMode::from_str(&request.entry_mode).map_err(translate_domain_error)?;
    let vehicle_type: VehicleType =
        VehicleType::from_str(&request.vehicle_type).map_err(translate_domain_error)?;

    AuthorizationService::authorize_create_wash(authenticated_actor, entry_mode)?;

    let location: Location = persistence
        .get_location(request.location_id)
        .map_err(translate_persistence_error)?;
    if location.network_id != ctx.network_id {
        return Err(ApiError::ResourceNotFound {
            resource_type: String::from("Location"),
            message: format!("Location {} does not exist", request.location_id),
        });
    }
    if !location.is_active {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("active_location"),
            message: format!("Location '{}' no longer performs washes", location.code),
        });
    }

    if let Some(partner_company_id) = request.partner_company_id {
        let partner: PartnerCompany = load_scoped_partner(persistence, ctx, partner_company_id)?;
        if !partner.is_active {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("active_partner"),
                message: format!(
                    "Partner '{}' is deactivated and cannot accrue washes",
                    partner.code
                ),
            });
        }
    }

    let mut event: WashEvent = WashEvent::new(
        ctx.network_id,
        request.location_id,
        entry_mode,
        request.service_package_id,
        vehicle_type,
        now,
    );
    event.partner_company_id = request.partner_company_id;
    event.driver_id = request.driver_id;
    event.driver_name = request.driver_name;
    event.tractor_plate = request.tractor_plate;
    event.trailer_plate = request.trailer_plate;

    let audit_event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(),
        cause,
        Action::new(String::from("CreateWash"), None),
        StateSnapshot::new(String::from("none")),
        StateSnapshot::new(event.snapshot()),
        ctx.network_id,
        AuditSubject::Pending,
    );

    let wash_event_id: i64 = persistence
        .create_wash_event(&event, &audit_event)
        .map_err(translate_persistence_error)?;

    tracing::debug!("Recorded wash event {wash_event_id} at location {}", location.code);

    Ok(CreateWashEventResponse {
        wash_event_id,
        status: event.status.as_str().to_string(),
        message: format!("Recorded wash event {wash_event_id}"),
    })
}

/// Applies one wash command and commits the transition atomically.
///
/// The status the caller read acts as the compare-and-swap expectation:
/// a concurrent transition makes this commit fail with a conflict and the
/// event is left untouched.
fn commit_wash_command(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    event: &WashEvent,
    command: WashCommand,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashEvent, ApiError> {
    let catalog: PriceCatalog = persistence
        .load_price_catalog(ctx.network_id)
        .map_err(translate_persistence_error)?;

    let transition: WashTransition = apply_wash(&catalog, event, command, actor, cause, now)
        .map_err(translate_core_error)?;

    persistence
        .commit_wash_transition(event.status, &transition)
        .map_err(translate_persistence_error)?;

    Ok(transition.new_event)
}

/// Authorizes a created wash via the API boundary with authorization.
///
/// # Errors
///
/// Returns an error if the actor is a driver, the event is not in the
/// created state, or the event changed concurrently.
pub fn authorize_wash(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: AuthorizeWashRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashEventResponse, ApiError> {
    AuthorizationService::authorize_authorize_wash(authenticated_actor)?;

    let event: WashEvent = load_scoped_wash(persistence, ctx, request.wash_event_id)?;
    let new_event: WashEvent = commit_wash_command(
        persistence,
        ctx,
        &event,
        WashCommand::Authorize,
        authenticated_actor.to_audit_actor(),
        cause,
        now,
    )?;

    Ok(WashEventResponse {
        event: WashEventInfo::from_event(&new_event),
        message: format!("Authorized wash event {}", request.wash_event_id),
    })
}

/// Starts a wash via the API boundary with authorization.
///
/// Authorized events start normally; created events start only in the
/// driver QR flow, which self-authorizes. A manual-operator event in the
/// created state must be authorized first.
///
/// # Errors
///
/// Returns an error if the actor's role does not permit starting this
/// entry mode, the lifecycle forbids the start, or the event changed
/// concurrently.
pub fn start_wash(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: StartWashRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashEventResponse, ApiError> {
    let event: WashEvent = load_scoped_wash(persistence, ctx, request.wash_event_id)?;

    AuthorizationService::authorize_start_wash(authenticated_actor, event.entry_mode)?;

    let new_event: WashEvent = commit_wash_command(
        persistence,
        ctx,
        &event,
        WashCommand::Start,
        authenticated_actor.to_audit_actor(),
        cause,
        now,
    )?;

    Ok(WashEventResponse {
        event: WashEventInfo::from_event(&new_event),
        message: format!("Started wash event {}", request.wash_event_id),
    })
}

/// Completes a running wash via the API boundary with authorization.
///
/// Completion resolves the unit price from the current catalog and stamps
/// it on the event; a missing price fails the completion before any state
/// changes. The partner is notified best-effort after the commit.
///
/// # Errors
///
/// Returns an error if the actor is a driver, the event is not in
/// progress, no price is configured, or the event changed concurrently.
pub fn complete_wash(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: CompleteWashRequest,
    authenticated_actor: &AuthenticatedActor,
    notifier: &dyn NotificationSender,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashEventResponse, ApiError> {
    AuthorizationService::authorize_complete_wash(authenticated_actor)?;

    let event: WashEvent = load_scoped_wash(persistence, ctx, request.wash_event_id)?;
    let new_event: WashEvent = commit_wash_command(
        persistence,
        ctx,
        &event,
        WashCommand::Complete,
        authenticated_actor.to_audit_actor(),
        cause,
        now,
    )?;

    notify_best_effort(
        notifier,
        &Notification::WashCompleted {
            wash_event_id: request.wash_event_id,
        },
    );

    Ok(WashEventResponse {
        event: WashEventInfo::from_event(&new_event),
        message: format!("Completed wash event {}", request.wash_event_id),
    })
}

/// Rejects a wash that has not started via the API boundary.
///
/// Rejection requires a non-empty reason and is possible only before the
/// wash starts; completed and locked events can never be rejected.
///
/// # Errors
///
/// Returns an error if the actor is a driver, the reason is empty, the
/// lifecycle forbids the rejection, or the event changed concurrently.
pub fn reject_wash(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: RejectWashRequest,
    authenticated_actor: &AuthenticatedActor,
    notifier: &dyn NotificationSender,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashEventResponse, ApiError> {
    AuthorizationService::authorize_reject_wash(authenticated_actor)?;

    let event: WashEvent = load_scoped_wash(persistence, ctx, request.wash_event_id)?;
    let new_event: WashEvent = commit_wash_command(
        persistence,
        ctx,
        &event,
        WashCommand::Reject {
            reason: request.reason.clone(),
        },
        authenticated_actor.to_audit_actor(),
        cause,
        now,
    )?;

    notify_best_effort(
        notifier,
        &Notification::WashRejected {
            wash_event_id: request.wash_event_id,
            reason: request.reason,
        },
    );

    Ok(WashEventResponse {
        event: WashEventInfo::from_event(&new_event),
        message: format!("Rejected wash event {}", request.wash_event_id),
    })
}

/// Retrieves one wash event.
///
/// # Errors
///
/// Returns an error if the actor is a driver or the event does not exist
/// in the caller's network.
pub fn get_wash_event(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    wash_event_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<WashEventInfo, ApiError> {
    AuthorizationService::authorize_view_audit(authenticated_actor)?;

    let event: WashEvent = load_scoped_wash(persistence, ctx, wash_event_id)?;
    Ok(WashEventInfo::from_event(&event))
}

// ============================================================================
// Partner Companies
// ============================================================================

/// Onboards a new partner company via the API boundary with authorization.
///
/// The tax number is checked against the company registry when one is
/// supplied; an unreachable registry is logged and onboarding proceeds
/// unvalidated, but a number the registry rejects fails the request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - A field or ladder fails validation
/// - The code is already in use within the network
/// - The registry rejects the tax number
pub fn onboard_partner(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: OnboardPartnerRequest,
    authenticated_actor: &AuthenticatedActor,
    tax_validator: &dyn TaxNumberValidator,
    cause: Cause,
) -> Result<OnboardPartnerResponse, ApiError> {
    AuthorizationService::authorize_manage_partners(authenticated_actor)?;

    let billing_type: BillingType =
        BillingType::from_str(&request.billing_type).map_err(translate_domain_error)?;
    let billing_cycle: Option<BillingCycle> = match &request.billing_cycle {
        Some(cycle) => Some(BillingCycle::from_str(cycle).map_err(translate_domain_error)?),
        None => None,
    };

    let partner: PartnerCompany = PartnerCompany {
        partner_company_id: None,
        network_id: ctx.network_id,
        code: PartnerCode::new(&request.code),
        name: request.name,
        tax_number: request.tax_number,
        billing_type,
        billing_cycle,
        own_ladder: build_ladder(request.own_ladder)?,
        sub_ladder: build_ladder(request.sub_ladder)?,
        is_active: true,
    };

    validate_partner_fields(&partner).map_err(translate_domain_error)?;

    let existing: Option<i64> = persistence
        .find_partner_by_code(ctx.network_id, partner.code.value())
        .map_err(translate_persistence_error)?;
    if existing.is_some() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("unique_partner_code"),
            message: format!(
                "Partner with code '{}' already exists in network {}",
                partner.code, ctx.network_id
            ),
        });
    }

    let (tax_validated, tax_details): (bool, Option<String>) = match &partner.tax_number {
        None => (false, None),
        Some(tax_number) => match tax_validator.validate(tax_number) {
            Ok(validation) if validation.valid => (true, validation.details),
            Ok(_) => {
                return Err(ApiError::InvalidInput {
                    field: String::from("tax_number"),
                    message: format!("Tax number '{tax_number}' failed registry validation"),
                });
            }
            Err(err) => {
                tracing::warn!("Tax registry unavailable, onboarding unvalidated: {err}");
                (false, None)
            }
        },
    };

    let audit_event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("CreatePartner"),
            Some(format!("Onboarded partner '{}'", partner.code)),
        ),
        StateSnapshot::new(String::from("none")),
        StateSnapshot::new(format!(
            "partner={},billing={},own=[{}],sub=[{}]",
            partner.code,
            partner.billing_type.as_str(),
            ladder_summary(&partner.own_ladder),
            ladder_summary(&partner.sub_ladder),
        )),
        ctx.network_id,
        AuditSubject::Pending,
    );

    let partner_company_id: i64 = persistence
        .create_partner(&partner, &audit_event)
        .map_err(translate_persistence_error)?;

    tracing::info!("Onboarded partner {partner_company_id} ('{}')", partner.code);

    Ok(OnboardPartnerResponse {
        partner_company_id,
        code: partner.code.value().to_string(),
        tax_validated,
        tax_details,
        message: format!("Onboarded partner '{}'", partner.code),
    })
}

/// Replaces both discount ladders of a partner via the API boundary.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the partner does not
/// exist, or a ladder fails validation.
pub fn update_partner_ladders(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: UpdatePartnerLaddersRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<UpdatePartnerLaddersResponse, ApiError> {
    AuthorizationService::authorize_manage_partners(authenticated_actor)?;

    let partner: PartnerCompany =
        load_scoped_partner(persistence, ctx, request.partner_company_id)?;

    let own_ladder: DiscountLadder = build_ladder(request.own_ladder)?;
    let sub_ladder: DiscountLadder = build_ladder(request.sub_ladder)?;

    let audit_event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("ReplaceDiscountLadders"),
            Some(format!("Replaced ladders of partner '{}'", partner.code)),
        ),
        StateSnapshot::new(format!(
            "own=[{}],sub=[{}]",
            ladder_summary(&partner.own_ladder),
            ladder_summary(&partner.sub_ladder),
        )),
        StateSnapshot::new(format!(
            "own=[{}],sub=[{}]",
            ladder_summary(&own_ladder),
            ladder_summary(&sub_ladder),
        )),
        ctx.network_id,
        AuditSubject::PartnerCompany(request.partner_company_id),
    );

    persistence
        .replace_partner_ladders(
            request.partner_company_id,
            &own_ladder,
            &sub_ladder,
            &audit_event,
        )
        .map_err(translate_persistence_error)?;

    Ok(UpdatePartnerLaddersResponse {
        partner_company_id: request.partner_company_id,
        message: format!("Replaced discount ladders of partner '{}'", partner.code),
    })
}

/// Soft-deletes a partner company via the API boundary.
///
/// Deactivated partners keep their invoices and history; they only stop
/// accruing new washes.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the partner does not
/// exist.
pub fn deactivate_partner(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: DeactivatePartnerRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DeactivatePartnerResponse, ApiError> {
    AuthorizationService::authorize_manage_partners(authenticated_actor)?;

    let partner: PartnerCompany =
        load_scoped_partner(persistence, ctx, request.partner_company_id)?;

    let audit_event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(),
        cause,
        Action::new(
            String::from("DeactivatePartner"),
            Some(format!("Deactivated partner '{}'", partner.code)),
        ),
        StateSnapshot::new(String::from("active")),
        StateSnapshot::new(String::from("inactive")),
        ctx.network_id,
        AuditSubject::PartnerCompany(request.partner_company_id),
    );

    persistence
        .deactivate_partner(request.partner_company_id, &audit_event)
        .map_err(translate_persistence_error)?;

    Ok(DeactivatePartnerResponse {
        partner_company_id: request.partner_company_id,
        message: format!("Deactivated partner '{}'", partner.code),
    })
}

// ============================================================================
// Catalog
// ============================================================================

/// Registers a new wash location via the API boundary.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the operation type
/// does not parse.
pub fn create_location(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: CreateLocationRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CreateLocationResponse, ApiError> {
    AuthorizationService::authorize_manage_catalog(authenticated_actor)?;

    let operation_type: OperationType =
        OperationType::from_str(&request.operation_type).map_err(translate_domain_error)?;

    let code: String = request.code;
    let location: Location = Location::new(ctx.network_id, &code, operation_type);
    let location_id: i64 = persistence
        .create_location(&location)
        .map_err(translate_persistence_error)?;

    Ok(CreateLocationResponse {
        location_id,
        code: location.code,
        message: format!("Registered location {location_id}"),
    })
}

/// Sets the network-default price for one key via the API boundary.
///
/// Any previously active price for the key is superseded; the catalog
/// keeps at most one active price per key.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the price fields fail
/// validation.
pub fn upsert_service_price(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: UpsertServicePriceRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UpsertServicePriceResponse, ApiError> {
    AuthorizationService::authorize_manage_catalog(authenticated_actor)?;

    let vehicle_type: VehicleType =
        VehicleType::from_str(&request.vehicle_type).map_err(translate_domain_error)?;
    let currency: Currency = Currency::new(&request.currency).map_err(translate_domain_error)?;
    let price: Money = Money::new(request.price, currency).map_err(translate_domain_error)?;
    let vehicle_label: String = request.vehicle_type;

    let service_price: ServicePrice = ServicePrice {
        service_price_id: None,
        network_id: ctx.network_id,
        service_package_id: request.service_package_id,
        vehicle_type,
        price,
        is_active: true,
    };

    let service_price_id: i64 = persistence
        .upsert_service_price(&service_price)
        .map_err(translate_persistence_error)?;

    Ok(UpsertServicePriceResponse {
        service_price_id,
        message: format!(
            "Set price for service package {} / {vehicle_label}",
            request.service_package_id
        ),
    })
}

/// Sets a partner-specific price override for one key via the API boundary.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the partner does not
/// exist, or the price fields fail validation.
pub fn upsert_partner_price(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: UpsertPartnerPriceRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UpsertPartnerPriceResponse, ApiError> {
    AuthorizationService::authorize_manage_catalog(authenticated_actor)?;

    let partner: PartnerCompany =
        load_scoped_partner(persistence, ctx, request.partner_company_id)?;

    let vehicle_type: VehicleType =
        VehicleType::from_str(&request.vehicle_type).map_err(translate_domain_error)?;
    let currency: Currency = Currency::new(&request.currency).map_err(translate_domain_error)?;
    let price: Money = Money::new(request.price, currency).map_err(translate_domain_error)?;
    let vehicle_label: String = request.vehicle_type;

    let partner_price: PartnerCustomPrice = PartnerCustomPrice {
        partner_custom_price_id: None,
        network_id: ctx.network_id,
        partner_company_id: request.partner_company_id,
        service_package_id: request.service_package_id,
        vehicle_type,
        price,
        is_active: true,
    };

    let partner_custom_price_id: i64 = persistence
        .upsert_partner_price(&partner_price)
        .map_err(translate_persistence_error)?;

    Ok(UpsertPartnerPriceResponse {
        partner_custom_price_id,
        message: format!(
            "Set override for partner '{}', service package {} / {vehicle_label}",
            partner.code, request.service_package_id
        ),
    })
}

// ============================================================================
// Billing
// ============================================================================

/// Resolves prices for the billable washes of a period and partitions the
/// counts and subtotals by operation type.
fn partition_billables(
    catalog: &PriceCatalog,
    washes: &[BillableWash],
) -> Result<(u32, i64, u32, i64), ApiError> {
    let mut own_count: u32 = 0;
    let mut own_subtotal: i64 = 0;
    let mut sub_count: u32 = 0;
    let mut sub_subtotal: i64 = 0;

    for wash in washes {
        let event: &WashEvent = &wash.event;
        let price: Money = resolve_price(
            catalog,
            event.network_id,
            event.partner_company_id,
            event.service_package_id,
            event.vehicle_type,
        )
        .map_err(translate_domain_error)?;

        match wash.operation_type {
            OperationType::Own => {
                own_count += 1;
                own_subtotal += price.amount;
            }
            OperationType::Subcontractor => {
                sub_count += 1;
                sub_subtotal += price.amount;
            }
        }
    }

    Ok((own_count, own_subtotal, sub_count, sub_subtotal))
}

/// Previews a partner's volume discount over a period.
///
/// The preview is read-only and side-effect-free: it reflects the stored
/// wash events and current ladder configuration, and repeated calls with
/// unchanged state return the identical result.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the partner does not
/// exist, or a billable wash has no configured price.
pub fn preview_discount(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: DiscountPreviewRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DiscountPreviewResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let partner: PartnerCompany =
        load_scoped_partner(persistence, ctx, request.partner_company_id)?;

    let washes: Vec<BillableWash> = persistence
        .list_billable_washes(
            request.partner_company_id,
            request.period_start,
            request.period_end,
            None,
        )
        .map_err(translate_persistence_error)?;

    let catalog: PriceCatalog = persistence
        .load_price_catalog(ctx.network_id)
        .map_err(translate_persistence_error)?;

    let (own_count, own_subtotal, sub_count, sub_subtotal) =
        partition_billables(&catalog, &washes)?;

    let discount: DiscountResult =
        calculate_discount(&partner, own_count, own_subtotal, sub_count, sub_subtotal);

    Ok(DiscountPreviewResponse {
        partner_company_id: request.partner_company_id,
        period_start: request.period_start,
        period_end: request.period_end,
        own: DiscountPartitionInfo::from_partition(&discount.own),
        sub: DiscountPartitionInfo::from_partition(&discount.sub),
        total_discount: discount.total_discount,
    })
}

/// Prepares a draft invoice for a partner and period via the API boundary.
///
/// Preparation aggregates the partner's billable washes (completed or
/// locked, not linked to a non-cancelled invoice), resolves a price per
/// line, applies the volume discount and VAT, and persists the draft.
/// Re-running before issuance replaces the prior draft for the same
/// partner and period; issued invoices are never replaced. Wash events
/// themselves are never mutated.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The partner does not exist or is deactivated
/// - The period is invalid
/// - Any billable wash has no configured price
pub fn prepare_draft_invoice(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: PrepareInvoiceRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<PrepareInvoiceResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let partner: PartnerCompany =
        load_scoped_partner(persistence, ctx, request.partner_company_id)?;
    if !partner.is_active {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("active_partner"),
            message: format!("Partner '{}' is deactivated and cannot be invoiced", partner.code),
        });
    }

    // A draft being replaced keeps its washes billable for the new draft
    let replacing_draft: Option<i64> = persistence
        .find_draft_invoice(
            request.partner_company_id,
            request.period_start,
            request.period_end,
        )
        .map_err(translate_persistence_error)?
        .and_then(|draft| draft.invoice_id);

    let washes: Vec<BillableWash> = persistence
        .list_billable_washes(
            request.partner_company_id,
            request.period_start,
            request.period_end,
            replacing_draft,
        )
        .map_err(translate_persistence_error)?;

    let catalog: PriceCatalog = persistence
        .load_price_catalog(ctx.network_id)
        .map_err(translate_persistence_error)?;

    let due_days: u16 = request.due_days.unwrap_or(ctx.due_days);
    let prepared: PreparedInvoice = prepare_invoice(
        &catalog,
        &partner,
        &washes,
        request.period_start,
        request.period_end,
        ctx.vat_rate,
        ctx.currency.clone(),
        request.issue_date,
        due_days,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let invoice_id: i64 = persistence
        .replace_draft(&prepared)
        .map_err(translate_persistence_error)?;

    tracing::info!(
        "Prepared draft invoice {invoice_id} for partner '{}' over {}..{} ({} washes)",
        partner.code,
        request.period_start,
        request.period_end,
        prepared.items.len(),
    );

    let mut invoice: Invoice = prepared.invoice;
    invoice.invoice_id = Some(invoice_id);

    Ok(PrepareInvoiceResponse::from_parts(
        &invoice,
        &prepared.items,
        &prepared.discount,
        format!("Prepared draft invoice {invoice_id}"),
    ))
}

/// Issues an invoice via the API boundary with authorization.
///
/// Issuance commits locally first: the invoice moves to issued and every
/// referenced wash event locks, atomically with their audit events. Only
/// then is the external provider called, and only while no external
/// reference is stored; a provider failure leaves the invoice
/// issued-pending and safely retryable, never reverted to draft. Retrying
/// an invoice whose reference is already stored is a no-op success, so an
/// invoice can never be numbered twice.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The invoice does not exist or its lifecycle forbids issuance
/// - The local commit fails
/// - The external provider fails (the invoice stays retryable)
#[allow(clippy::too_many_arguments)]
pub fn issue_invoice(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: IssueInvoiceRequest,
    authenticated_actor: &AuthenticatedActor,
    issuer: &dyn ExternalInvoiceIssuer,
    notifier: &dyn NotificationSender,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<InvoiceResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let invoice: Invoice = load_scoped_invoice(persistence, ctx, request.invoice_id)?;

    if invoice.external_id.is_some() {
        // Already numbered: a retry must not reach the provider again
        return Ok(InvoiceResponse {
            invoice: InvoiceInfo::from_invoice(&invoice),
            message: format!(
                "Invoice {} is already issued as '{}'",
                request.invoice_id,
                invoice.external_number.as_deref().unwrap_or("?"),
            ),
        });
    }

    let actor: Actor = authenticated_actor.to_audit_actor();

    match invoice.status {
        InvoiceStatus::Draft => {
            let transition = apply_invoice(
                &invoice,
                InvoiceCommand::Issue {
                    issue_date: request.issue_date,
                },
                actor.clone(),
                cause.clone(),
            )
            .map_err(translate_core_error)?;

            let catalog: PriceCatalog = persistence
                .load_price_catalog(ctx.network_id)
                .map_err(translate_persistence_error)?;
            let washes: Vec<WashEvent> = persistence
                .list_wash_events_for_invoice(request.invoice_id)
                .map_err(translate_persistence_error)?;

            let mut locks: Vec<WashTransition> = Vec::with_capacity(washes.len());
            for event in &washes {
                let lock: WashTransition = apply_wash(
                    &catalog,
                    event,
                    WashCommand::Lock,
                    actor.clone(),
                    cause.clone(),
                    now,
                )
                .map_err(translate_core_error)?;
                locks.push(lock);
            }

            persistence
                .commit_invoice_issue(&transition, &locks)
                .map_err(translate_persistence_error)?;

            tracing::info!(
                "Issued invoice {} locally, locking {} wash event(s)",
                request.invoice_id,
                locks.len(),
            );
        }
        // A prior issuance committed locally but the provider call never
        // stored a reference; resume straight at the external step.
        InvoiceStatus::Issued | InvoiceStatus::Sent | InvoiceStatus::Overdue => {
            tracing::info!(
                "Resuming pending external issuance of invoice {}",
                request.invoice_id,
            );
        }
        InvoiceStatus::Paid | InvoiceStatus::Cancelled => {
            return Err(ApiError::DomainRuleViolation {
                rule: String::from("invoice_lifecycle"),
                message: format!(
                    "Cannot issue invoice {} in terminal status '{}'",
                    request.invoice_id,
                    invoice.status.as_str(),
                ),
            });
        }
    }

    let issued: Invoice = persistence
        .get_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;
    let items: Vec<InvoiceItem> = persistence
        .list_invoice_items(request.invoice_id)
        .map_err(translate_persistence_error)?;

    match issuer.issue(&issued, &items) {
        Ok(document) => {
            match persistence.set_external_reference(
                request.invoice_id,
                &document.external_id,
                &document.number,
            ) {
                Ok(()) => {}
                // A concurrent retry stored its reference first; the
                // invoice is numbered either way.
                Err(PersistenceError::ExternalReferenceAlreadySet { .. }) => {
                    tracing::debug!(
                        "Invoice {} was numbered by a concurrent retry",
                        request.invoice_id,
                    );
                }
                Err(err) => return Err(translate_persistence_error(err)),
            }
        }
        Err(err) => {
            tracing::warn!(
                "External issuance of invoice {} failed, leaving it retryable: {err}",
                request.invoice_id,
            );
            return Err(ApiError::ExternalIssuanceFailed {
                invoice_id: request.invoice_id,
                message: err.to_string(),
            });
        }
    }

    notify_best_effort(
        notifier,
        &Notification::InvoiceIssued {
            invoice_id: request.invoice_id,
            partner_company_id: issued.partner_company_id,
        },
    );

    let final_invoice: Invoice = persistence
        .get_invoice(request.invoice_id)
        .map_err(translate_persistence_error)?;

    Ok(InvoiceResponse {
        invoice: InvoiceInfo::from_invoice(&final_invoice),
        message: format!(
            "Issued invoice {} as '{}'",
            request.invoice_id,
            final_invoice.external_number.as_deref().unwrap_or("?"),
        ),
    })
}

/// Records delivery of an issued invoice via the API boundary.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the lifecycle forbids
/// the transition, or the invoice changed concurrently.
pub fn mark_invoice_sent(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: MarkInvoiceSentRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<InvoiceResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let invoice: Invoice = load_scoped_invoice(persistence, ctx, request.invoice_id)?;
    let transition = apply_invoice(
        &invoice,
        InvoiceCommand::MarkSent,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .commit_invoice_transition(invoice.status, &transition, false)
        .map_err(translate_persistence_error)?;

    Ok(InvoiceResponse {
        invoice: InvoiceInfo::from_invoice(&transition.new_invoice),
        message: format!("Marked invoice {} as sent", request.invoice_id),
    })
}

/// Records payment of an invoice via the API boundary.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the lifecycle forbids
/// the transition, or the invoice changed concurrently.
pub fn mark_invoice_paid(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: MarkInvoicePaidRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<InvoiceResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let invoice: Invoice = load_scoped_invoice(persistence, ctx, request.invoice_id)?;
    let transition = apply_invoice(
        &invoice,
        InvoiceCommand::MarkPaid {
            paid_date: request.paid_date,
        },
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    persistence
        .commit_invoice_transition(invoice.status, &transition, false)
        .map_err(translate_persistence_error)?;

    Ok(InvoiceResponse {
        invoice: InvoiceInfo::from_invoice(&transition.new_invoice),
        message: format!("Marked invoice {} as paid", request.invoice_id),
    })
}

/// Cancels an invoice via the API boundary.
///
/// Cancelling a draft deletes it outright: nothing was locked or numbered
/// yet. Cancelling an issued, sent, or overdue invoice records the
/// terminal transition and releases the wash-event linkage, making the
/// events billable again.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the invoice is already
/// terminal, or it changed concurrently.
pub fn cancel_invoice(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: CancelInvoiceRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<CancelInvoiceResponse, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let invoice: Invoice = load_scoped_invoice(persistence, ctx, request.invoice_id)?;

    if invoice.status == InvoiceStatus::Draft {
        let audit_event: AuditEvent = AuditEvent::new(
            authenticated_actor.to_audit_actor(),
            cause,
            Action::new(
                String::from("CancelDraftInvoice"),
                Some(format!("Deleted draft invoice {}", request.invoice_id)),
            ),
            StateSnapshot::new(invoice.snapshot()),
            StateSnapshot::new(String::from("deleted")),
            ctx.network_id,
            AuditSubject::Invoice(request.invoice_id),
        );

        persistence
            .delete_draft(request.invoice_id, &audit_event)
            .map_err(translate_persistence_error)?;

        return Ok(CancelInvoiceResponse {
            invoice_id: request.invoice_id,
            status: InvoiceStatus::Cancelled.as_str().to_string(),
            draft_deleted: true,
            message: format!("Deleted draft invoice {}", request.invoice_id),
        });
    }

    let transition = apply_invoice(
        &invoice,
        InvoiceCommand::Cancel,
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    // Cancellation releases the linkage: the events become billable again
    persistence
        .commit_invoice_transition(invoice.status, &transition, true)
        .map_err(translate_persistence_error)?;

    Ok(CancelInvoiceResponse {
        invoice_id: request.invoice_id,
        status: InvoiceStatus::Cancelled.as_str().to_string(),
        draft_deleted: false,
        message: format!("Cancelled invoice {}", request.invoice_id),
    })
}

/// Runs the overdue sweep: every issued or sent invoice past its due date
/// moves to overdue.
///
/// The sweep is a scheduled job, not a user action; it runs as the system
/// actor and touches only invoices, never wash events. A candidate that
/// changes concurrently is skipped and picked up by the next run.
///
/// # Errors
///
/// Returns an error only on persistence failure; per-invoice conflicts
/// are skipped, not propagated.
pub fn sweep_overdue(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    request: SweepOverdueRequest,
    notifier: &dyn NotificationSender,
    cause: Cause,
) -> Result<SweepOverdueResponse, ApiError> {
    let candidates: Vec<Invoice> = persistence
        .list_overdue_candidates(ctx.network_id, request.as_of)
        .map_err(translate_persistence_error)?;

    let mut moved_invoice_ids: Vec<i64> = Vec::new();
    let mut skipped: u32 = 0;

    for invoice in candidates {
        let Some(invoice_id) = invoice.invoice_id else {
            continue;
        };

        let transition = match apply_invoice(
            &invoice,
            InvoiceCommand::MarkOverdue {
                as_of: request.as_of,
            },
            Actor::system(),
            cause.clone(),
        ) {
            Ok(transition) => transition,
            Err(err) => {
                tracing::warn!("Overdue sweep skipped invoice {invoice_id}: {err}");
                skipped += 1;
                continue;
            }
        };

        match persistence.commit_invoice_transition(invoice.status, &transition, false) {
            Ok(_) => {
                notify_best_effort(
                    notifier,
                    &Notification::InvoiceOverdue {
                        invoice_id,
                        partner_company_id: invoice.partner_company_id,
                    },
                );
                moved_invoice_ids.push(invoice_id);
            }
            Err(PersistenceError::ConcurrentModification { .. }) => {
                tracing::warn!("Overdue sweep lost invoice {invoice_id} to a concurrent change");
                skipped += 1;
            }
            Err(err) => return Err(translate_persistence_error(err)),
        }
    }

    let message: String = format!(
        "Moved {} invoice(s) to overdue as of {}",
        moved_invoice_ids.len(),
        request.as_of,
    );
    tracing::info!("{message}");

    Ok(SweepOverdueResponse {
        moved_invoice_ids,
        skipped,
        message,
    })
}

/// Retrieves one invoice header.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the invoice does not
/// exist in the caller's network.
pub fn get_invoice(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    invoice_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<InvoiceInfo, ApiError> {
    AuthorizationService::authorize_billing(authenticated_actor)?;

    let invoice: Invoice = load_scoped_invoice(persistence, ctx, invoice_id)?;
    Ok(InvoiceInfo::from_invoice(&invoice))
}

// ============================================================================
// Audit
// ============================================================================

/// Retrieves the ordered audit timeline of one record.
///
/// # Errors
///
/// Returns an error if the actor is a driver or the timeline cannot be
/// read.
pub fn get_audit_timeline(
    persistence: &mut Persistence,
    ctx: &NetworkContext,
    subject: AuditSubject,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditTimelineResponse, ApiError> {
    AuthorizationService::authorize_view_audit(authenticated_actor)?;

    let events = persistence
        .get_audit_timeline(ctx.network_id, subject)
        .map_err(translate_persistence_error)?;

    let entries: Vec<AuditEntryInfo> = events
        .iter()
        .map(|event| AuditEntryInfo {
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            cause: event.cause.description.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
        })
        .collect();

    Ok(AuditTimelineResponse {
        subject_kind: subject.kind().to_string(),
        subject_id: subject.id().unwrap_or(0),
        entries,
    })
}
