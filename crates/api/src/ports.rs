// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator ports consumed by the boundary layer.
//!
//! Everything behind these traits lives outside this repository: delivery
//! channels, the company-data lookup used for tax numbers, and the external
//! invoice issuing provider. None of them may block or roll back a
//! wash-event or invoice transition; notification failures are logged and
//! swallowed, and issuance failures leave the invoice retryable.

use washnet_domain::{Invoice, InvoiceItem};

/// An error raised by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{collaborator}: {message}")]
pub struct PortError {
    /// The collaborator that failed (e.g., "notification_sender").
    pub collaborator: String,
    /// A description of the failure.
    pub message: String,
}

impl PortError {
    /// Creates a new port error.
    ///
    /// # Arguments
    ///
    /// * `collaborator` - The collaborator that failed
    /// * `message` - A description of the failure
    #[must_use]
    pub fn new(collaborator: &str, message: &str) -> Self {
        Self {
            collaborator: collaborator.to_string(),
            message: message.to_string(),
        }
    }
}

/// A business event worth telling someone about.
///
/// Delivery channel (email, SMS, push) is the collaborator's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A wash completed; the partner's driver or dispatcher may care.
    WashCompleted {
        /// The completed wash event.
        wash_event_id: i64,
    },
    /// A wash was rejected with a reason.
    WashRejected {
        /// The rejected wash event.
        wash_event_id: i64,
        /// Why the wash was rejected.
        reason: String,
    },
    /// An invoice was issued to a partner.
    InvoiceIssued {
        /// The issued invoice.
        invoice_id: i64,
        /// The partner being billed.
        partner_company_id: i64,
    },
    /// An invoice went past due without payment.
    InvoiceOverdue {
        /// The overdue invoice.
        invoice_id: i64,
        /// The partner being billed.
        partner_company_id: i64,
    },
}

/// Best-effort notification delivery.
///
/// Failure is logged at warn level by the caller and never propagated:
/// a lost notification must not fail a committed transition.
pub trait NotificationSender {
    /// Delivers one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails; callers log and continue.
    fn notify(&self, notification: &Notification) -> Result<(), PortError>;
}

/// The outcome of a tax-number lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxValidation {
    /// Whether the tax number is valid.
    pub valid: bool,
    /// Registry details for a valid number (legal name, address).
    pub details: Option<String>,
}

/// Third-party company-data lookup, used only at partner onboarding.
///
/// Never called in the billing hot path.
pub trait TaxNumberValidator {
    /// Validates a tax number against the company registry.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry is unreachable; onboarding
    /// proceeds unvalidated in that case.
    fn validate(&self, tax_number: &str) -> Result<TaxValidation, PortError>;
}

/// The external issuing provider's reply for one invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedDocument {
    /// The provider's stable reference for the invoice.
    pub external_id: String,
    /// The legally assigned invoice number.
    pub number: String,
    /// Where the rendered document can be fetched.
    pub pdf_url: String,
}

/// External invoice numbering and rendering.
///
/// Called exactly once per invoice at the issued transition. The provider
/// must be idempotent on retry keyed by the invoice's local identifier;
/// the caller additionally guards with the stored external reference, so a
/// retried issuance can never double-number.
pub trait ExternalInvoiceIssuer {
    /// Issues one invoice through the provider.
    ///
    /// # Arguments
    ///
    /// * `invoice` - The locally issued invoice header
    /// * `items` - The invoice's line items
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails; the invoice stays
    /// issued-pending with no external reference and may be retried.
    fn issue(&self, invoice: &Invoice, items: &[InvoiceItem]) -> Result<IssuedDocument, PortError>;
}
