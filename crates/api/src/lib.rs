// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod ports;
mod request_response;

#[cfg(test)]
mod tests;

use washnet_domain::Currency;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    authorize_wash, cancel_invoice, complete_wash, create_location, create_wash_event,
    deactivate_partner, get_audit_timeline, get_invoice, get_wash_event, issue_invoice,
    mark_invoice_paid, mark_invoice_sent, onboard_partner, prepare_draft_invoice, preview_discount,
    reject_wash, start_wash, sweep_overdue, update_partner_ladders, upsert_partner_price,
    upsert_service_price,
};
pub use ports::{
    ExternalInvoiceIssuer, IssuedDocument, Notification, NotificationSender, PortError,
    TaxNumberValidator, TaxValidation,
};
pub use request_response::{
    AuditEntryInfo, AuditTimelineResponse, AuthorizeWashRequest, CancelInvoiceRequest,
    CancelInvoiceResponse, CompleteWashRequest, CreateLocationRequest, CreateLocationResponse,
    CreateWashEventRequest, CreateWashEventResponse, DeactivatePartnerRequest,
    DeactivatePartnerResponse, DiscountPartitionInfo, DiscountPreviewRequest,
    DiscountPreviewResponse, InvoiceInfo, InvoiceItemInfo, InvoiceResponse, IssueInvoiceRequest,
    MarkInvoicePaidRequest, MarkInvoiceSentRequest, OnboardPartnerRequest, OnboardPartnerResponse,
    PrepareInvoiceRequest, PrepareInvoiceResponse, RejectWashRequest, StartWashRequest,
    SweepOverdueRequest, SweepOverdueResponse, TierSpec, UpdatePartnerLaddersRequest,
    UpdatePartnerLaddersResponse, UpsertPartnerPriceRequest, UpsertPartnerPriceResponse,
    UpsertServicePriceRequest, UpsertServicePriceResponse, WashEventInfo, WashEventResponse,
};

/// The tenant context every billing operation runs in.
///
/// There is no global network constant anywhere in the core: the embedding
/// transport resolves the tenant and passes this context explicitly, which
/// keeps the boundary layer testable without ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkContext {
    /// The network all operations are scoped to.
    pub network_id: i64,
    /// The network's configured VAT rate in whole percent.
    pub vat_rate: u8,
    /// The network's billing currency.
    pub currency: Currency,
    /// The default payment window in days for prepared invoices.
    pub due_days: u16,
}

impl NetworkContext {
    /// Creates a new network context.
    ///
    /// # Arguments
    ///
    /// * `network_id` - The network all operations are scoped to
    /// * `vat_rate` - The network's VAT rate in whole percent
    /// * `currency` - The network's billing currency
    /// * `due_days` - The default payment window in days
    #[must_use]
    pub const fn new(network_id: i64, vat_rate: u8, currency: Currency, due_days: u16) -> Self {
        Self {
            network_id,
            vat_rate,
            currency,
            due_days,
        }
    }
}
