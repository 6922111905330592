// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use washnet::CoreError;
use washnet_domain::DomainError;
use washnet_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core/persistence errors and represent
/// the API contract; inner errors never leak to callers untranslated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The record changed since the caller read it; the caller retries.
    Conflict {
        /// A description of the conflicting change.
        message: String,
    },
    /// The external issuing provider failed.
    ///
    /// The invoice stays issued-pending with no external reference; the
    /// issuance may be retried safely.
    ExternalIssuanceFailed {
        /// The invoice whose issuance failed.
        invoice_id: i64,
        /// A description of the provider failure.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => {
                write!(f, "Conflict: {message}")
            }
            Self::ExternalIssuanceFailed {
                invoice_id,
                message,
            } => {
                write!(
                    f,
                    "External issuance failed for invoice {invoice_id}: {message}. The invoice remains issued and may be retried"
                )
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
#[allow(clippy::too_many_lines)]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidWashStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{status}' is not a valid wash event status"),
        },
        DomainError::InvalidInvoiceStatus { status } => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("'{status}' is not a valid invoice status"),
        },
        DomainError::InvalidStatusTransition { from, to, reason } => ApiError::DomainRuleViolation {
            rule: String::from("wash_lifecycle"),
            message: format!("Cannot move wash event from '{from}' to '{to}': {reason}"),
        },
        DomainError::InvalidInvoiceTransition { from, to, reason } => {
            ApiError::DomainRuleViolation {
                rule: String::from("invoice_lifecycle"),
                message: format!("Cannot move invoice from '{from}' to '{to}': {reason}"),
            }
        }
        DomainError::MissingRejectionReason => ApiError::InvalidInput {
            field: String::from("reason"),
            message: String::from("A non-empty rejection reason is required"),
        },
        DomainError::AuthorizationRequired { entry_mode } => ApiError::DomainRuleViolation {
            rule: String::from("authorization_required"),
            message: format!(
                "Wash events with entry mode '{entry_mode}' must be authorized before starting"
            ),
        },
        DomainError::PriceNotConfigured {
            network_id,
            partner_company_id,
            service_package_id,
            vehicle_type,
        } => ApiError::DomainRuleViolation {
            rule: String::from("price_not_configured"),
            message: match partner_company_id {
                Some(partner) => format!(
                    "No active price for network {network_id}, partner {partner}, service package {service_package_id}, vehicle type {vehicle_type}; billing never defaults to zero"
                ),
                None => format!(
                    "No active price for network {network_id}, service package {service_package_id}, vehicle type {vehicle_type}; billing never defaults to zero"
                ),
            },
        },
        DomainError::InvalidDiscountLadder { reason } => ApiError::InvalidInput {
            field: String::from("discount_ladder"),
            message: reason,
        },
        DomainError::InvalidEntryMode(msg) => ApiError::InvalidInput {
            field: String::from("entry_mode"),
            message: msg,
        },
        DomainError::InvalidVehicleType(msg) => ApiError::InvalidInput {
            field: String::from("vehicle_type"),
            message: msg,
        },
        DomainError::InvalidOperationType(msg) => ApiError::InvalidInput {
            field: String::from("operation_type"),
            message: msg,
        },
        DomainError::InvalidBillingType(msg) => ApiError::InvalidInput {
            field: String::from("billing_type"),
            message: msg,
        },
        DomainError::InvalidBillingCycle(msg) => ApiError::InvalidInput {
            field: String::from("billing_cycle"),
            message: msg,
        },
        DomainError::InvalidPartnerCode(msg) => ApiError::InvalidInput {
            field: String::from("code"),
            message: msg,
        },
        DomainError::InvalidPartnerName(msg) => ApiError::InvalidInput {
            field: String::from("name"),
            message: msg,
        },
        DomainError::MissingBillingCycle { code } => ApiError::InvalidInput {
            field: String::from("billing_cycle"),
            message: format!("Partner '{code}' is billed by contract and requires a billing cycle"),
        },
        DomainError::DuplicatePartnerCode { network_id, code } => ApiError::DomainRuleViolation {
            rule: String::from("unique_partner_code"),
            message: format!("Partner with code '{code}' already exists in network {network_id}"),
        },
        DomainError::InvalidCurrency(msg) => ApiError::InvalidInput {
            field: String::from("currency"),
            message: msg,
        },
        DomainError::InvalidAmount { amount } => ApiError::InvalidInput {
            field: String::from("price"),
            message: format!("Invalid amount: {amount}. Must not be negative"),
        },
        DomainError::InvalidPeriod { start, end } => ApiError::InvalidInput {
            field: String::from("period"),
            message: format!("Billing period end {end} precedes start {start}"),
        },
        DomainError::InvalidVatRate { rate } => ApiError::InvalidInput {
            field: String::from("vat_rate"),
            message: format!("Invalid VAT rate: {rate}. Must be between 0 and 100"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::EventNotBillable {
            wash_event_id,
            status,
        } => ApiError::DomainRuleViolation {
            rule: String::from("billable_status"),
            message: format!(
                "Wash event {} is not billable in status '{status}'",
                wash_event_id.map_or_else(|| String::from("(unsaved)"), |id| id.to_string())
            ),
        },
        CoreError::EventAlreadyBilled {
            wash_event_id,
            invoice_id,
        } => ApiError::DomainRuleViolation {
            rule: String::from("billed_at_most_once"),
            message: format!(
                "Wash event {} is already billed on invoice {invoice_id}",
                wash_event_id.map_or_else(|| String::from("(unsaved)"), |id| id.to_string())
            ),
        },
        CoreError::WrongPartner {
            wash_event_id,
            expected,
            actual,
        } => ApiError::DomainRuleViolation {
            rule: String::from("partner_scope"),
            message: format!(
                "Wash event {} belongs to partner {actual:?}, not {expected}",
                wash_event_id.map_or_else(|| String::from("(unsaved)"), |id| id.to_string())
            ),
        },
        CoreError::CurrencyMismatch { expected, actual } => ApiError::DomainRuleViolation {
            rule: String::from("single_currency"),
            message: format!(
                "Resolved price currency {actual} does not match invoice currency {expected}"
            ),
        },
        CoreError::MissingIdentifier { record } => ApiError::Internal {
            message: format!("Record has no canonical identifier: {record}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// This translation is explicit and ensures persistence errors are not leaked directly.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::WashEventNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Wash event"),
            message: format!("Wash event {id} does not exist"),
        },
        PersistenceError::InvoiceNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Invoice"),
            message: format!("Invoice {id} does not exist"),
        },
        PersistenceError::PartnerNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Partner company"),
            message: format!("Partner company {id} does not exist"),
        },
        PersistenceError::EventNotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: format!("Audit event {id} does not exist"),
        },
        PersistenceError::NotFound(msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message: msg,
        },
        PersistenceError::ConcurrentModification {
            record,
            id,
            expected,
        } => ApiError::Conflict {
            message: format!(
                "{record} {id} changed since it was read (expected status '{expected}'); retry with fresh state"
            ),
        },
        PersistenceError::DuplicateBilling { wash_event_id } => ApiError::DomainRuleViolation {
            rule: String::from("billed_at_most_once"),
            message: format!(
                "Wash event {wash_event_id} is already billed on a non-cancelled invoice"
            ),
        },
        PersistenceError::DuplicateDraft {
            partner_company_id,
            period_start,
        } => ApiError::Conflict {
            message: format!(
                "A draft invoice already exists for partner {partner_company_id} and period starting {period_start}"
            ),
        },
        PersistenceError::ExternalReferenceAlreadySet { invoice_id } => ApiError::Conflict {
            message: format!("Invoice {invoice_id} already carries an external reference"),
        },
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::ReconstructionError(_)
        | PersistenceError::SerializationError(_) => ApiError::Internal {
            message: format!("Persistence failure: {err}"),
        },
    }
}
