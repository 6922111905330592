// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::types::VehicleType;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A wash-event status string could not be parsed.
    InvalidWashStatus {
        /// The unparseable status value.
        status: String,
    },
    /// An invoice status string could not be parsed.
    InvalidInvoiceStatus {
        /// The unparseable status value.
        status: String,
    },
    /// A wash-event status transition is not permitted.
    InvalidStatusTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is not allowed.
        reason: String,
    },
    /// An invoice status transition is not permitted.
    InvalidInvoiceTransition {
        /// The current status.
        from: String,
        /// The requested status.
        to: String,
        /// Why the transition is not allowed.
        reason: String,
    },
    /// A rejection was requested without a reason.
    MissingRejectionReason,
    /// A manual-operator wash must be authorized before it can start.
    AuthorizationRequired {
        /// The wash event's entry mode.
        entry_mode: String,
    },
    /// No active price is configured for the requested key.
    PriceNotConfigured {
        /// The network the price was resolved for.
        network_id: i64,
        /// The partner the price was resolved for, if any.
        partner_company_id: Option<i64>,
        /// The service package.
        service_package_id: i64,
        /// The vehicle type.
        vehicle_type: VehicleType,
    },
    /// A discount ladder violates its structural rules.
    InvalidDiscountLadder {
        /// Description of the violation.
        reason: String,
    },
    /// An entry mode string could not be parsed.
    InvalidEntryMode(String),
    /// A vehicle type string could not be parsed.
    InvalidVehicleType(String),
    /// An operation type string could not be parsed.
    InvalidOperationType(String),
    /// A billing type string could not be parsed.
    InvalidBillingType(String),
    /// A billing cycle string could not be parsed.
    InvalidBillingCycle(String),
    /// Partner code is empty or invalid.
    InvalidPartnerCode(String),
    /// Partner name is empty or invalid.
    InvalidPartnerName(String),
    /// A contract partner is missing its billing cycle.
    MissingBillingCycle {
        /// The partner code.
        code: String,
    },
    /// Partner code already exists within the network.
    DuplicatePartnerCode {
        /// The network in which the duplicate was found.
        network_id: i64,
        /// The duplicate code.
        code: String,
    },
    /// A currency code is empty or invalid.
    InvalidCurrency(String),
    /// A monetary amount is invalid.
    InvalidAmount {
        /// The invalid amount value.
        amount: i64,
    },
    /// A billing period is invalid (end before start).
    InvalidPeriod {
        /// The period start (ISO 8601).
        start: String,
        /// The period end (ISO 8601).
        end: String,
    },
    /// A VAT rate is outside the permitted range.
    InvalidVatRate {
        /// The invalid rate value.
        rate: u8,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWashStatus { status } => {
                write!(f, "Invalid wash event status: {status}")
            }
            Self::InvalidInvoiceStatus { status } => {
                write!(f, "Invalid invoice status: {status}")
            }
            Self::InvalidStatusTransition { from, to, reason } => {
                write!(f, "Invalid wash status transition {from} -> {to}: {reason}")
            }
            Self::InvalidInvoiceTransition { from, to, reason } => {
                write!(f, "Invalid invoice transition {from} -> {to}: {reason}")
            }
            Self::MissingRejectionReason => {
                write!(f, "A rejection reason is required to reject a wash event")
            }
            Self::AuthorizationRequired { entry_mode } => {
                write!(
                    f,
                    "Wash events with entry mode '{entry_mode}' must be authorized before starting"
                )
            }
            Self::PriceNotConfigured {
                network_id,
                partner_company_id,
                service_package_id,
                vehicle_type,
            } => match partner_company_id {
                Some(partner) => write!(
                    f,
                    "No active price configured for network {network_id}, partner {partner}, service package {service_package_id}, vehicle type {vehicle_type}"
                ),
                None => write!(
                    f,
                    "No active price configured for network {network_id}, service package {service_package_id}, vehicle type {vehicle_type}"
                ),
            },
            Self::InvalidDiscountLadder { reason } => {
                write!(f, "Invalid discount ladder: {reason}")
            }
            Self::InvalidEntryMode(msg) => write!(f, "Invalid entry mode: {msg}"),
            Self::InvalidVehicleType(msg) => write!(f, "Invalid vehicle type: {msg}"),
            Self::InvalidOperationType(msg) => write!(f, "Invalid operation type: {msg}"),
            Self::InvalidBillingType(msg) => write!(f, "Invalid billing type: {msg}"),
            Self::InvalidBillingCycle(msg) => write!(f, "Invalid billing cycle: {msg}"),
            Self::InvalidPartnerCode(msg) => write!(f, "Invalid partner code: {msg}"),
            Self::InvalidPartnerName(msg) => write!(f, "Invalid partner name: {msg}"),
            Self::MissingBillingCycle { code } => {
                write!(
                    f,
                    "Partner '{code}' is billed by contract and requires a billing cycle"
                )
            }
            Self::DuplicatePartnerCode { network_id, code } => {
                write!(
                    f,
                    "Partner with code '{code}' already exists in network {network_id}"
                )
            }
            Self::InvalidCurrency(msg) => write!(f, "Invalid currency: {msg}"),
            Self::InvalidAmount { amount } => {
                write!(f, "Invalid amount: {amount}. Must not be negative")
            }
            Self::InvalidPeriod { start, end } => {
                write!(f, "Invalid billing period: end {end} precedes start {start}")
            }
            Self::InvalidVatRate { rate } => {
                write!(f, "Invalid VAT rate: {rate}. Must be between 0 and 100")
            }
        }
    }
}

impl std::error::Error for DomainError {}
