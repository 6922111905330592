// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice records and the invoice status lifecycle.
//!
//! A draft invoice is a mutable aggregation of a partner's billable wash
//! events over a period. Once issued it is append-only: only payment and
//! cancellation events may follow.

use crate::error::DomainError;
use crate::types::Currency;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::Date;

/// Invoice lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Mutable draft; may be edited, replaced, or deleted.
    Draft,
    /// Issued through the external provider; append-only from here.
    Issued,
    /// Delivered to the partner.
    Sent,
    /// Paid in full.
    Paid,
    /// Cancelled; referenced wash events become billable again.
    Cancelled,
    /// Past its due date without payment.
    Overdue,
}

impl InvoiceStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Issued => "issued",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
            Self::Overdue => "overdue",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInvoiceStatus` if the string is not a
    /// valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "draft" => Ok(Self::Draft),
            "issued" => Ok(Self::Issued),
            "sent" => Ok(Self::Sent),
            "paid" => Ok(Self::Paid),
            "cancelled" => Ok(Self::Cancelled),
            "overdue" => Ok(Self::Overdue),
            _ => Err(DomainError::InvalidInvoiceStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if this status is terminal.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Validates if a transition from this status to another is permitted.
    ///
    /// The overdue transition is reserved for the scheduled sweep; payment
    /// and cancellation remain reachable from overdue.
    ///
    /// # Errors
    ///
    /// Returns an error if the transition is not allowed.
    pub fn validate_transition(&self, new_status: Self) -> Result<(), DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidInvoiceTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "cannot transition from terminal state".to_string(),
            });
        }

        let valid = match self {
            Self::Draft => matches!(new_status, Self::Issued | Self::Cancelled),
            Self::Issued => matches!(
                new_status,
                Self::Sent | Self::Paid | Self::Cancelled | Self::Overdue
            ),
            Self::Sent => matches!(new_status, Self::Paid | Self::Cancelled | Self::Overdue),
            Self::Overdue => matches!(new_status, Self::Paid | Self::Cancelled),
            Self::Paid | Self::Cancelled => false,
        };

        if valid {
            Ok(())
        } else {
            Err(DomainError::InvalidInvoiceTransition {
                from: self.as_str().to_string(),
                to: new_status.as_str().to_string(),
                reason: "transition not permitted by invoice lifecycle rules".to_string(),
            })
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A partner invoice over one billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the invoice has not been persisted yet.
    pub invoice_id: Option<i64>,
    /// The network issuing the invoice.
    pub network_id: i64,
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
    /// Total discount amount across both network-relation partitions.
    pub discount_amount: i64,
    /// The applied VAT rate in whole percent.
    pub vat_rate: u8,
    /// VAT amount applied to (subtotal - discount).
    pub vat_amount: i64,
    /// Grand total: subtotal - discount + VAT.
    pub total: i64,
    /// The billing currency.
    pub currency: Currency,
    /// The lifecycle status.
    pub status: InvoiceStatus,
    /// The date the invoice was issued.
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

impl Invoice {
    /// Renders a compact state description for audit snapshots.
    #[must_use]
    pub fn snapshot(&self) -> String {
        format!(
            "invoice={},partner={},period={}..{},status={},total={} {}",
            self.invoice_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.partner_company_id,
            self.period_start,
            self.period_end,
            self.status.as_str(),
            self.total,
            self.currency,
        )
    }
}

/// One line of an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    /// The canonical numeric identifier assigned by the database.
    pub invoice_item_id: Option<i64>,
    /// Human-readable line description.
    pub description: String,
    /// Number of units billed.
    pub quantity: u32,
    /// Price per unit.
    pub unit_price: i64,
    /// Line total: quantity * unit price.
    pub total_price: i64,
    /// The applied VAT rate in whole percent.
    pub vat_rate: u8,
    /// The wash event this line bills, when the line is a wash.
    pub wash_event_id: Option<i64>,
}
