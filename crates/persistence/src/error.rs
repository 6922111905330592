// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// A database error occurred.
    DatabaseError(String),
    /// Database connection failed.
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    MigrationFailed(String),
    /// Query execution failed.
    QueryFailed(String),
    /// Initialization error.
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    ForeignKeyEnforcementNotEnabled,
    /// A stored record could not be turned back into a domain value.
    ReconstructionError(String),
    /// Serialization/deserialization error.
    SerializationError(String),
    /// The requested wash event was not found.
    WashEventNotFound(i64),
    /// The requested invoice was not found.
    InvoiceNotFound(i64),
    /// The requested partner company was not found.
    PartnerNotFound(i64),
    /// The requested audit event was not found.
    EventNotFound(i64),
    /// A status compare-and-swap found the record changed since it was read.
    ConcurrentModification {
        /// The kind of record (e.g., "wash_event", "invoice").
        record: String,
        /// The record's canonical identifier.
        id: i64,
        /// The status the caller expected to still hold.
        expected: String,
    },
    /// A wash event is already linked to a non-cancelled invoice.
    DuplicateBilling {
        /// The wash event that is already billed.
        wash_event_id: i64,
    },
    /// A draft already exists for the partner and period.
    DuplicateDraft {
        /// The partner being invoiced.
        partner_company_id: i64,
        /// The period start (ISO 8601).
        period_start: String,
    },
    /// An external reference is already stored for the invoice.
    ExternalReferenceAlreadySet {
        /// The invoice.
        invoice_id: i64,
    },
    /// The requested resource was not found.
    NotFound(String),
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatabaseError(msg) => write!(f, "Database error: {msg}"),
            Self::DatabaseConnectionFailed(msg) => {
                write!(f, "Database connection failed: {msg}")
            }
            Self::MigrationFailed(msg) => write!(f, "Migration failed: {msg}"),
            Self::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            Self::InitializationError(msg) => write!(f, "Initialization error: {msg}"),
            Self::ForeignKeyEnforcementNotEnabled => {
                write!(f, "Foreign key enforcement is not enabled")
            }
            Self::ReconstructionError(msg) => write!(f, "State reconstruction error: {msg}"),
            Self::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
            Self::WashEventNotFound(id) => write!(f, "Wash event not found: {id}"),
            Self::InvoiceNotFound(id) => write!(f, "Invoice not found: {id}"),
            Self::PartnerNotFound(id) => write!(f, "Partner company not found: {id}"),
            Self::EventNotFound(id) => write!(f, "Audit event not found: {id}"),
            Self::ConcurrentModification {
                record,
                id,
                expected,
            } => {
                write!(
                    f,
                    "Concurrent modification of {record} {id}: status is no longer '{expected}'"
                )
            }
            Self::DuplicateBilling { wash_event_id } => {
                write!(
                    f,
                    "Wash event {wash_event_id} is already billed on a non-cancelled invoice"
                )
            }
            Self::DuplicateDraft {
                partner_company_id,
                period_start,
            } => {
                write!(
                    f,
                    "A draft invoice already exists for partner {partner_company_id} and period starting {period_start}"
                )
            }
            Self::ExternalReferenceAlreadySet { invoice_id } => {
                write!(
                    f,
                    "Invoice {invoice_id} already carries an external reference"
                )
            }
            Self::NotFound(msg) => write!(f, "Not found: {msg}"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
