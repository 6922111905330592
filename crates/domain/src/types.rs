// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::discount::DiscountLadder;
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a wash event entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMode {
    /// The driver scanned a location QR code and started the wash themselves.
    DriverQr,
    /// An operator recorded the wash at the location terminal.
    ManualOperator,
}

impl EntryMode {
    /// Returns the string representation of the entry mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DriverQr => "driver_qr",
            Self::ManualOperator => "manual_operator",
        }
    }
}

impl FromStr for EntryMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver_qr" => Ok(Self::DriverQr),
            "manual_operator" => Ok(Self::ManualOperator),
            _ => Err(DomainError::InvalidEntryMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Vehicle classification used for pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    /// Tractor unit of an articulated truck.
    Tractor,
    /// Trailer or semi-trailer.
    Trailer,
    /// Rigid truck.
    Truck,
    /// Van or light commercial vehicle.
    Van,
    /// Passenger car.
    Car,
}

impl VehicleType {
    /// Returns the string representation of the vehicle type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tractor => "tractor",
            Self::Trailer => "trailer",
            Self::Truck => "truck",
            Self::Van => "van",
            Self::Car => "car",
        }
    }
}

impl FromStr for VehicleType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tractor" => Ok(Self::Tractor),
            "trailer" => Ok(Self::Trailer),
            "truck" => Ok(Self::Truck),
            "van" => Ok(Self::Van),
            "car" => Ok(Self::Car),
            _ => Err(DomainError::InvalidVehicleType(s.to_string())),
        }
    }
}

impl std::fmt::Display for VehicleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a location is operated by the network or a subcontractor.
///
/// The two classes are billed under separate discount ladders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Location owned and operated by the network.
    Own,
    /// Location operated by a subcontractor.
    Subcontractor,
}

impl OperationType {
    /// Returns the string representation of the operation type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Own => "own",
            Self::Subcontractor => "subcontractor",
        }
    }
}

impl FromStr for OperationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "own" => Ok(Self::Own),
            "subcontractor" => Ok(Self::Subcontractor),
            _ => Err(DomainError::InvalidOperationType(s.to_string())),
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a partner company is billed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingType {
    /// Periodic invoicing under contract.
    Contract,
    /// Paid on the spot; no periodic invoice.
    Cash,
}

impl BillingType {
    /// Returns the string representation of the billing type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Cash => "cash",
        }
    }
}

impl FromStr for BillingType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "contract" => Ok(Self::Contract),
            "cash" => Ok(Self::Cash),
            _ => Err(DomainError::InvalidBillingType(s.to_string())),
        }
    }
}

/// Billing period length for contract partners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    /// One invoice per calendar month.
    Monthly,
    /// One invoice per week.
    Weekly,
}

impl BillingCycle {
    /// Returns the string representation of the billing cycle.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
        }
    }
}

impl FromStr for BillingCycle {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "weekly" => Ok(Self::Weekly),
            _ => Err(DomainError::InvalidBillingCycle(s.to_string())),
        }
    }
}

/// An ISO 4217 currency code.
///
/// Currency codes are normalized to uppercase. Amounts are never converted
/// between currencies; the code travels with every amount.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// The currency code (e.g., "HUF").
    code: String,
}

impl Currency {
    /// Creates a new `Currency`.
    ///
    /// # Arguments
    ///
    /// * `code` - The currency code (will be normalized to uppercase)
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCurrency` if the code is not three
    /// ASCII letters.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidCurrency(format!(
                "Currency code must be three letters, got '{code}'"
            )));
        }
        Ok(Self {
            code: code.to_uppercase(),
        })
    }

    /// Hungarian forint, the network's default billing currency.
    #[must_use]
    pub fn huf() -> Self {
        Self {
            code: String::from("HUF"),
        }
    }

    /// Returns the currency code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// A monetary amount in a currency's major unit.
///
/// All billing arithmetic is integer arithmetic; there is no floating
/// point anywhere in the billing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the currency's major unit.
    pub amount: i64,
    /// The currency of the amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new `Money` value.
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount in the currency's major unit
    /// * `currency` - The currency
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidAmount` if the amount is negative.
    pub fn new(amount: i64, currency: Currency) -> Result<Self, DomainError> {
        if amount < 0 {
            return Err(DomainError::InvalidAmount { amount });
        }
        Ok(Self { amount, currency })
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

/// A partner company code.
///
/// Codes identify a partner within a network and are unique per network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartnerCode {
    /// The code value, normalized to uppercase.
    value: String,
}

impl PartnerCode {
    /// Creates a new `PartnerCode`.
    ///
    /// Codes are normalized to uppercase to ensure case-insensitive
    /// uniqueness.
    ///
    /// # Arguments
    ///
    /// * `value` - The code value (will be normalized to uppercase)
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_uppercase(),
        }
    }

    /// Returns the code value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for PartnerCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A physical wash location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the location has not been persisted yet.
    pub location_id: Option<i64>,
    /// The network this location belongs to.
    pub network_id: i64,
    /// The location code (e.g., "M1-KM24"), unique per network.
    pub code: String,
    /// Whether the location is network-owned or subcontracted.
    pub operation_type: OperationType,
    /// Whether the location currently performs washes.
    pub is_active: bool,
}

impl Location {
    /// Creates a new active `Location` without a persisted ID.
    ///
    /// # Arguments
    ///
    /// * `network_id` - The owning network
    /// * `code` - The location code
    /// * `operation_type` - Own or subcontractor operation
    #[must_use]
    pub fn new(network_id: i64, code: &str, operation_type: OperationType) -> Self {
        Self {
            location_id: None,
            network_id,
            code: code.to_uppercase(),
            operation_type,
            is_active: true,
        }
    }
}

/// A partner company: the billing counterparty for contract washes.
///
/// Each partner carries two independent volume-discount ladders, one for
/// washes at network-owned locations and one for washes at subcontractor
/// locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerCompany {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the partner has not been persisted yet.
    pub partner_company_id: Option<i64>,
    /// The network this partner belongs to.
    pub network_id: i64,
    /// The partner code, unique per network.
    pub code: PartnerCode,
    /// The partner's legal name.
    pub name: String,
    /// The partner's tax number, validated at onboarding.
    pub tax_number: Option<String>,
    /// How the partner is billed.
    pub billing_type: BillingType,
    /// Billing period length; required iff `billing_type` is contract.
    pub billing_cycle: Option<BillingCycle>,
    /// Discount ladder applied to washes at network-owned locations.
    pub own_ladder: DiscountLadder,
    /// Discount ladder applied to washes at subcontractor locations.
    pub sub_ladder: DiscountLadder,
    /// Soft-delete flag; inactive partners keep their invoices.
    pub is_active: bool,
}

/// A network-default price for one (service package, vehicle type) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicePrice {
    /// The canonical numeric identifier assigned by the database.
    pub service_price_id: Option<i64>,
    /// The network the price belongs to.
    pub network_id: i64,
    /// The service package being priced.
    pub service_package_id: i64,
    /// The vehicle type being priced.
    pub vehicle_type: VehicleType,
    /// The unit price.
    pub price: Money,
    /// Whether this price is currently in effect.
    pub is_active: bool,
}

/// A partner-specific price override for one
/// (partner, service package, vehicle type) key.
///
/// When present and active, it takes precedence over the network default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerCustomPrice {
    /// The canonical numeric identifier assigned by the database.
    pub partner_custom_price_id: Option<i64>,
    /// The network the price belongs to.
    pub network_id: i64,
    /// The partner the override applies to.
    pub partner_company_id: i64,
    /// The service package being priced.
    pub service_package_id: i64,
    /// The vehicle type being priced.
    pub vehicle_type: VehicleType,
    /// The unit price.
    pub price: Money,
    /// Whether this override is currently in effect.
    pub is_active: bool,
}
