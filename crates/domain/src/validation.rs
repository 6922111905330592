// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{BillingType, PartnerCode, PartnerCompany};
use std::collections::HashSet;
use time::Date;

/// Validates that a partner company's basic field constraints are met.
///
/// This function checks field-level rules only. It does NOT check for
/// code uniqueness (that requires context).
///
/// # Arguments
///
/// * `partner` - The partner to validate
///
/// # Returns
///
/// * `Ok(())` if the partner's fields are valid
/// * `Err(DomainError)` if any field is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The partner code is empty
/// - The partner name is empty
/// - The partner is billed by contract but has no billing cycle
pub fn validate_partner_fields(partner: &PartnerCompany) -> Result<(), DomainError> {
    // Rule: code must not be empty
    if partner.code.value().is_empty() {
        return Err(DomainError::InvalidPartnerCode(String::from(
            "Partner code cannot be empty",
        )));
    }

    // Rule: name must not be empty
    if partner.name.is_empty() {
        return Err(DomainError::InvalidPartnerName(String::from(
            "Partner name cannot be empty",
        )));
    }

    // Rule: contract billing requires a billing cycle
    if partner.billing_type == BillingType::Contract && partner.billing_cycle.is_none() {
        return Err(DomainError::MissingBillingCycle {
            code: partner.code.value().to_string(),
        });
    }

    // Ladder structure is validated at construction via DiscountLadder::new()

    Ok(())
}

/// Validates that a partner code is unique within a network.
///
/// This function is pure, deterministic, and has no side effects.
///
/// # Arguments
///
/// * `network_id` - The network to check within
/// * `new_code` - The code to validate
/// * `existing_partners` - The collection of existing partners in the network
///
/// # Returns
///
/// * `Ok(())` if the code is unique
/// * `Err(DomainError::DuplicatePartnerCode)` if the code already exists
///
/// # Errors
///
/// Returns an error if the code is already in use within the network.
pub fn validate_partner_code_unique(
    network_id: i64,
    new_code: &PartnerCode,
    existing_partners: &[PartnerCompany],
) -> Result<(), DomainError> {
    // Build a set of existing codes for this network
    let existing_codes: HashSet<&PartnerCode> = existing_partners
        .iter()
        .filter(|partner| partner.network_id == network_id)
        .map(|partner| &partner.code)
        .collect();

    // Rule: within a network, partner codes must be unique
    if existing_codes.contains(new_code) {
        return Err(DomainError::DuplicatePartnerCode {
            network_id,
            code: new_code.value().to_string(),
        });
    }

    Ok(())
}

/// Validates that a billing period is well-formed.
///
/// # Arguments
///
/// * `period_start` - First day of the period (inclusive)
/// * `period_end` - Last day of the period (inclusive)
///
/// # Errors
///
/// Returns `DomainError::InvalidPeriod` if the end precedes the start.
pub fn validate_period(period_start: Date, period_end: Date) -> Result<(), DomainError> {
    if period_end < period_start {
        return Err(DomainError::InvalidPeriod {
            start: period_start.to_string(),
            end: period_end.to_string(),
        });
    }
    Ok(())
}

/// Validates that a VAT rate is a sensible whole percent.
///
/// # Arguments
///
/// * `rate` - The VAT rate in whole percent
///
/// # Errors
///
/// Returns `DomainError::InvalidVatRate` if the rate exceeds 100.
pub fn validate_vat_rate(rate: u8) -> Result<(), DomainError> {
    if rate > 100 {
        return Err(DomainError::InvalidVatRate { rate });
    }
    Ok(())
}
