// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use washnet_domain::DomainError;

/// Errors that can occur during state transitions and invoice preparation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// A wash event offered for billing is not in a billable status.
    EventNotBillable {
        /// The wash event, if persisted.
        wash_event_id: Option<i64>,
        /// The event's current status.
        status: String,
    },
    /// A wash event is already linked to a non-cancelled invoice.
    EventAlreadyBilled {
        /// The wash event, if persisted.
        wash_event_id: Option<i64>,
        /// The invoice the event is already billed on.
        invoice_id: i64,
    },
    /// A wash event belongs to a different partner than the invoice.
    WrongPartner {
        /// The wash event, if persisted.
        wash_event_id: Option<i64>,
        /// The partner being invoiced.
        expected: i64,
        /// The partner on the wash event, if any.
        actual: Option<i64>,
    },
    /// A resolved price is in a different currency than the invoice.
    CurrencyMismatch {
        /// The invoice currency.
        expected: String,
        /// The resolved price's currency.
        actual: String,
    },
    /// A record that must be persisted has no canonical identifier.
    MissingIdentifier {
        /// The kind of record (e.g., "partner company").
        record: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::EventNotBillable {
                wash_event_id,
                status,
            } => write!(
                f,
                "Wash event {} is not billable in status '{status}'",
                format_id(*wash_event_id)
            ),
            Self::EventAlreadyBilled {
                wash_event_id,
                invoice_id,
            } => write!(
                f,
                "Wash event {} is already billed on invoice {invoice_id}",
                format_id(*wash_event_id)
            ),
            Self::WrongPartner {
                wash_event_id,
                expected,
                actual,
            } => write!(
                f,
                "Wash event {} belongs to partner {actual:?}, not {expected}",
                format_id(*wash_event_id)
            ),
            Self::CurrencyMismatch { expected, actual } => {
                write!(
                    f,
                    "Resolved price currency {actual} does not match invoice currency {expected}"
                )
            }
            Self::MissingIdentifier { record } => {
                write!(f, "Record has no canonical identifier: {record}")
            }
        }
    }
}

fn format_id(id: Option<i64>) -> String {
    id.map_or_else(|| String::from("(unsaved)"), |v| v.to_string())
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
