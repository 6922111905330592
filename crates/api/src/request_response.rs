// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use time::{Date, OffsetDateTime};
use washnet_domain::{DiscountResult, Invoice, InvoiceItem, PartitionDiscount, WashEvent};

/// API request to record a new wash event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateWashEventRequest {
    /// The location performing the wash.
    pub location_id: i64,
    /// The partner being billed; `None` for walk-in washes.
    pub partner_company_id: Option<i64>,
    /// The driver, when known from the QR flow.
    pub driver_id: Option<i64>,
    /// Free-text driver name for manual entries.
    pub driver_name: Option<String>,
    /// Tractor plate, as a vehicle reference or free text.
    pub tractor_plate: Option<String>,
    /// Trailer plate, as a vehicle reference or free text.
    pub trailer_plate: Option<String>,
    /// How the event enters the system ("driver_qr" or "manual_operator").
    pub entry_mode: String,
    /// The service package to perform.
    pub service_package_id: i64,
    /// The washed vehicle's type.
    pub vehicle_type: String,
}

/// API response for a successfully recorded wash event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateWashEventResponse {
    /// The canonical numeric identifier.
    pub wash_event_id: i64,
    /// The event's status ("created").
    pub status: String,
    /// A success message.
    pub message: String,
}

/// API request to authorize a created wash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizeWashRequest {
    /// The wash event to authorize.
    pub wash_event_id: i64,
}

/// API request to start a wash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartWashRequest {
    /// The wash event to start.
    pub wash_event_id: i64,
}

/// API request to complete a running wash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteWashRequest {
    /// The wash event to complete.
    pub wash_event_id: i64,
}

/// API request to reject a wash that has not started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectWashRequest {
    /// The wash event to reject.
    pub wash_event_id: i64,
    /// The mandatory, non-empty rejection reason.
    pub reason: String,
}

/// A wash event as presented at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WashEventInfo {
    /// The canonical numeric identifier.
    pub wash_event_id: i64,
    /// The location that performed the wash.
    pub location_id: i64,
    /// The partner being billed, if any.
    pub partner_company_id: Option<i64>,
    /// How the event entered the system.
    pub entry_mode: String,
    /// The service package performed.
    pub service_package_id: i64,
    /// The washed vehicle's type.
    pub vehicle_type: String,
    /// The lifecycle status.
    pub status: String,
    /// When the event was recorded.
    pub created_at: OffsetDateTime,
    /// When the event was authorized, if it has been.
    pub authorized_at: Option<OffsetDateTime>,
    /// When the wash started, if it has.
    pub started_at: Option<OffsetDateTime>,
    /// When the wash completed, if it has.
    pub completed_at: Option<OffsetDateTime>,
    /// When the wash was rejected, if it was.
    pub rejected_at: Option<OffsetDateTime>,
    /// Why the wash was rejected, if it was.
    pub rejection_reason: Option<String>,
    /// The price computed at completion.
    pub total_price: Option<i64>,
    /// The currency of the computed price.
    pub currency: Option<String>,
    /// The non-cancelled invoice this event is billed on, if any.
    pub invoice_id: Option<i64>,
}

impl WashEventInfo {
    /// Builds the boundary representation of a wash event.
    #[must_use]
    pub fn from_event(event: &WashEvent) -> Self {
        Self {
            wash_event_id: event.wash_event_id.unwrap_or(0),
            location_id: event.location_id,
            partner_company_id: event.partner_company_id,
            entry_mode: event.entry_mode.as_str().to_string(),
            service_package_id: event.service_package_id,
            vehicle_type: event.vehicle_type.as_str().to_string(),
            status: event.status.as_str().to_string(),
            created_at: event.created_at,
            authorized_at: event.authorized_at,
            started_at: event.started_at,
            completed_at: event.completed_at,
            rejected_at: event.rejected_at,
            rejection_reason: event.rejection_reason.clone(),
            total_price: event.total_price.as_ref().map(|p| p.amount),
            currency: event
                .total_price
                .as_ref()
                .map(|p| p.currency.code().to_string()),
            invoice_id: event.invoice_id,
        }
    }
}

/// API response for a successful wash-event transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WashEventResponse {
    /// The wash event after the transition.
    pub event: WashEventInfo,
    /// A success message.
    pub message: String,
}

/// One requested discount tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpec {
    /// Minimum wash count (inclusive) for this tier to apply.
    pub threshold: u32,
    /// Discount percent granted by this tier.
    pub percent: u8,
}

/// API request to onboard a new partner company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardPartnerRequest {
    /// The partner code, unique per network.
    pub code: String,
    /// The partner's legal name.
    pub name: String,
    /// The partner's tax number, checked against the company registry.
    pub tax_number: Option<String>,
    /// How the partner is billed ("contract" or "cash").
    pub billing_type: String,
    /// Billing period length ("monthly" or "weekly"); required for contract.
    pub billing_cycle: Option<String>,
    /// Discount ladder for washes at network-owned locations.
    pub own_ladder: Vec<TierSpec>,
    /// Discount ladder for washes at subcontractor locations.
    pub sub_ladder: Vec<TierSpec>,
}

/// API response for a successful partner onboarding.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OnboardPartnerResponse {
    /// The canonical numeric identifier.
    pub partner_company_id: i64,
    /// The partner code (normalized).
    pub code: String,
    /// Whether the tax number was confirmed by the registry.
    pub tax_validated: bool,
    /// Registry details for a validated tax number.
    pub tax_details: Option<String>,
    /// A success message.
    pub message: String,
}

/// API request to replace both discount ladders of a partner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePartnerLaddersRequest {
    /// The partner to update.
    pub partner_company_id: i64,
    /// The new ladder for network-owned locations.
    pub own_ladder: Vec<TierSpec>,
    /// The new ladder for subcontractor locations.
    pub sub_ladder: Vec<TierSpec>,
}

/// API response for a successful ladder replacement.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdatePartnerLaddersResponse {
    /// The updated partner.
    pub partner_company_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to soft-delete a partner company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivatePartnerRequest {
    /// The partner to deactivate.
    pub partner_company_id: i64,
}

/// API response for a successful partner deactivation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeactivatePartnerResponse {
    /// The deactivated partner.
    pub partner_company_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to register a new wash location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateLocationRequest {
    /// The location code (e.g., "M1-KM24"), unique per network.
    pub code: String,
    /// Whether the location is network-owned or subcontracted
    /// ("own" or "subcontractor").
    pub operation_type: String,
}

/// API response for a successful location registration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateLocationResponse {
    /// The canonical numeric identifier.
    pub location_id: i64,
    /// The location code (normalized).
    pub code: String,
    /// A success message.
    pub message: String,
}

/// API request to set the network-default price for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertServicePriceRequest {
    /// The service package being priced.
    pub service_package_id: i64,
    /// The vehicle type being priced.
    pub vehicle_type: String,
    /// The unit price in the currency's major unit.
    pub price: i64,
    /// The price currency.
    pub currency: String,
}

/// API response for a successful network-default price upsert.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpsertServicePriceResponse {
    /// The canonical numeric identifier of the active price row.
    pub service_price_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to set a partner-specific price override for one key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertPartnerPriceRequest {
    /// The partner the override applies to.
    pub partner_company_id: i64,
    /// The service package being priced.
    pub service_package_id: i64,
    /// The vehicle type being priced.
    pub vehicle_type: String,
    /// The unit price in the currency's major unit.
    pub price: i64,
    /// The price currency.
    pub currency: String,
}

/// API response for a successful partner price upsert.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpsertPartnerPriceResponse {
    /// The canonical numeric identifier of the active override row.
    pub partner_custom_price_id: i64,
    /// A success message.
    pub message: String,
}

/// API request to preview a partner's discount over a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountPreviewRequest {
    /// The partner whose ladders apply.
    pub partner_company_id: i64,
    /// First day of the period (inclusive).
    pub period_start: Date,
    /// Last day of the period (inclusive).
    pub period_end: Date,
}

/// The discount outcome for one network-relation partition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiscountPartitionInfo {
    /// The partition ("own" or "subcontractor").
    pub operation_type: String,
    /// Billable wash count in the partition.
    pub wash_count: u32,
    /// Subtotal of the partition's line items.
    pub subtotal: i64,
    /// The selected tier's threshold, if any qualified.
    pub tier_threshold: Option<u32>,
    /// The applied discount percent (0 when no tier qualified).
    pub discount_percent: u8,
    /// The discount amount for this partition.
    pub discount_amount: i64,
}

impl DiscountPartitionInfo {
    /// Builds the boundary representation of one partition's discount.
    #[must_use]
    pub fn from_partition(partition: &PartitionDiscount) -> Self {
        Self {
            operation_type: partition.operation_type.as_str().to_string(),
            wash_count: partition.wash_count,
            subtotal: partition.subtotal,
            tier_threshold: partition.tier.map(|t| t.threshold),
            discount_percent: partition.tier.map_or(0, |t| t.percent),
            discount_amount: partition.discount_amount,
        }
    }
}

/// API response for a discount preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DiscountPreviewResponse {
    /// The partner previewed.
    pub partner_company_id: i64,
    /// First day of the period (inclusive).
    pub period_start: Date,
    /// Last day of the period (inclusive).
    pub period_end: Date,
    /// Discount for washes at network-owned locations.
    pub own: DiscountPartitionInfo,
    /// Discount for washes at subcontractor locations.
    pub sub: DiscountPartitionInfo,
    /// Sum of both partitions' discount amounts.
    pub total_discount: i64,
}

/// API request to prepare a draft invoice for a partner and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareInvoiceRequest {
    /// The partner being invoiced.
    pub partner_company_id: i64,
    /// First day of the period (inclusive).
    pub period_start: Date,
    /// Last day of the period (inclusive).
    pub period_end: Date,
    /// The provisional issuance date of the draft.
    pub issue_date: Date,
    /// The payment window in days; the network default applies when absent.
    pub due_days: Option<u16>,
}

/// One invoice line as presented at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceItemInfo {
    /// Human-readable line description.
    pub description: String,
    /// Number of units billed.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: i64,
    /// Line total.
    pub total_price: i64,
    /// The applied VAT rate in whole percent.
    pub vat_rate: u8,
    /// The wash event this line bills, when the line is a wash.
    pub wash_event_id: Option<i64>,
}

impl InvoiceItemInfo {
    /// Builds the boundary representation of an invoice line.
    #[must_use]
    pub fn from_item(item: &InvoiceItem) -> Self {
        Self {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            total_price: item.total_price,
            vat_rate: item.vat_rate,
            wash_event_id: item.wash_event_id,
        }
    }
}

/// An invoice header as presented at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceInfo {
    /// The canonical numeric identifier.
    pub invoice_id: i64,
    /// The partner being billed.
    pub partner_company_id: i64,
    /// First day of the billing period (inclusive).
    pub period_start: Date,
    /// Last day of the billing period (inclusive).
    pub period_end: Date,
    /// Sum of all line item totals before discount and VAT.
    pub subtotal: i64,
    /// Effective discount percent over the whole invoice.
    pub discount_percent: u8,
    /// Total discount amount across both partitions.
    pub discount_amount: i64,
    /// The applied VAT rate in whole percent.
    pub vat_rate: u8,
    /// VAT amount applied to (subtotal - discount).
    pub vat_amount: i64,
    /// Grand total.
    pub total: i64,
    /// The billing currency.
    pub currency: String,
    /// The lifecycle status.
    pub status: String,
    /// The issuance date.
    pub issue_date: Date,
    /// The payment deadline.
    pub due_date: Date,
    /// The date payment was recorded, once paid.
    pub paid_date: Option<Date>,
    /// The issuing provider's reference, set after external issuance.
    pub external_id: Option<String>,
    /// The issuing provider's invoice number.
    pub external_number: Option<String>,
}

impl InvoiceInfo {
    /// Builds the boundary representation of an invoice header.
    #[must_use]
    pub fn from_invoice(invoice: &Invoice) -> Self {
        Self {
            invoice_id: invoice.invoice_id.unwrap_or(0),
            partner_company_id: invoice.partner_company_id,
            period_start: invoice.period_start,
            period_end: invoice.period_end,
            subtotal: invoice.subtotal,
            discount_percent: invoice.discount_percent,
            discount_amount: invoice.discount_amount,
            vat_rate: invoice.vat_rate,
            vat_amount: invoice.vat_amount,
            total: invoice.total,
            currency: invoice.currency.code().to_string(),
            status: invoice.status.as_str().to_string(),
            issue_date: invoice.issue_date,
            due_date: invoice.due_date,
            paid_date: invoice.paid_date,
            external_id: invoice.external_id.clone(),
            external_number: invoice.external_number.clone(),
        }
    }
}

/// API response for a successfully prepared draft invoice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PrepareInvoiceResponse {
    /// The draft invoice header.
    pub invoice: InvoiceInfo,
    /// The line items, one per billed wash event.
    pub items: Vec<InvoiceItemInfo>,
    /// Discount for washes at network-owned locations.
    pub own_discount: DiscountPartitionInfo,
    /// Discount for washes at subcontractor locations.
    pub sub_discount: DiscountPartitionInfo,
    /// A success message.
    pub message: String,
}

impl PrepareInvoiceResponse {
    /// Builds the preparation response from the persisted draft.
    #[must_use]
    pub fn from_parts(
        invoice: &Invoice,
        items: &[InvoiceItem],
        discount: &DiscountResult,
        message: String,
    ) -> Self {
        Self {
            invoice: InvoiceInfo::from_invoice(invoice),
            items: items.iter().map(InvoiceItemInfo::from_item).collect(),
            own_discount: DiscountPartitionInfo::from_partition(&discount.own),
            sub_discount: DiscountPartitionInfo::from_partition(&discount.sub),
            message,
        }
    }
}

/// API request to issue a draft invoice through the external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssueInvoiceRequest {
    /// The draft invoice to issue.
    pub invoice_id: i64,
    /// The actual issuance date.
    pub issue_date: Date,
}

/// API request to record that an issued invoice was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkInvoiceSentRequest {
    /// The invoice that was delivered.
    pub invoice_id: i64,
}

/// API request to record payment of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkInvoicePaidRequest {
    /// The invoice that was paid.
    pub invoice_id: i64,
    /// The date payment was received.
    pub paid_date: Date,
}

/// API request to cancel an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelInvoiceRequest {
    /// The invoice to cancel.
    pub invoice_id: i64,
}

/// API response for a successful invoice transition.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct InvoiceResponse {
    /// The invoice after the transition.
    pub invoice: InvoiceInfo,
    /// A success message.
    pub message: String,
}

/// API response for a successful invoice cancellation.
///
/// A cancelled draft is deleted outright, so only the identifier survives.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CancelInvoiceResponse {
    /// The cancelled invoice.
    pub invoice_id: i64,
    /// The invoice's final status ("cancelled").
    pub status: String,
    /// Whether the draft row was deleted rather than retained.
    pub draft_deleted: bool,
    /// A success message.
    pub message: String,
}

/// API request to run the overdue sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOverdueRequest {
    /// The sweep's reference date.
    pub as_of: Date,
}

/// API response for one overdue sweep run.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SweepOverdueResponse {
    /// The invoices moved to overdue by this run.
    pub moved_invoice_ids: Vec<i64>,
    /// Candidates skipped because they changed concurrently.
    pub skipped: u32,
    /// A summary message.
    pub message: String,
}

/// One audit timeline entry as presented at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEntryInfo {
    /// The action that was performed.
    pub action: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
    /// The actor who initiated the change.
    pub actor_id: String,
    /// The actor's type.
    pub actor_type: String,
    /// A description of the cause.
    pub cause: String,
    /// The state before the transition.
    pub before: String,
    /// The state after the transition.
    pub after: String,
}

/// API response carrying the ordered audit timeline of one record.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditTimelineResponse {
    /// The kind of record the timeline belongs to.
    pub subject_kind: String,
    /// The record's canonical identifier.
    pub subject_id: i64,
    /// The entries in commit order.
    pub entries: Vec<AuditEntryInfo>,
}
