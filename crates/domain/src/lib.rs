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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod discount;
mod error;
mod invoice;
mod pricing;
mod types;
mod validation;
mod wash_event;
mod wash_status;

#[cfg(test)]
mod tests;

pub use discount::{
    DiscountLadder, DiscountResult, DiscountTier, MAX_TIERS, PartitionDiscount, apply_percent,
    calculate_discount,
};
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use pricing::{PriceCatalog, resolve_price};
pub use wash_event::WashEvent;
pub use wash_status::WashStatus;

// Re-export public types
pub use error::DomainError;
pub use types::{
    BillingCycle, BillingType, Currency, EntryMode, Location, Money, OperationType, PartnerCode,
    PartnerCompany, PartnerCustomPrice, ServicePrice, VehicleType,
};
pub use validation::{
    validate_partner_code_unique, validate_partner_fields, validate_period, validate_vat_rate,
};
