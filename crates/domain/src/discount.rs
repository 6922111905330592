// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Volume-discount ladders and the period discount calculation.
//!
//! This module provides the pure, deterministic discount calculation
//! applied to a partner's billing period: wash counts are partitioned by
//! the performing location's operation type, each partition selects the
//! highest qualifying tier of its own ladder, and each tier's percent is
//! applied to that partition's subtotal only.

use crate::error::DomainError;
use crate::types::{OperationType, PartnerCompany};
use serde::{Deserialize, Serialize};

/// The maximum number of tiers a ladder may carry.
pub const MAX_TIERS: usize = 5;

/// One volume-discount tier: a wash-count threshold and the percent
/// granted once the threshold is met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountTier {
    /// Minimum wash count (inclusive) for this tier to apply.
    pub threshold: u32,
    /// Discount percent granted by this tier.
    pub percent: u8,
}

/// An ordered ladder of at most five discount tiers.
///
/// Thresholds are strictly increasing; the effective discount for a wash
/// count is the percent of the highest tier whose threshold is met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DiscountLadder {
    /// The tiers in ascending threshold order.
    tiers: Vec<DiscountTier>,
}

impl DiscountLadder {
    /// Creates a new `DiscountLadder` from tiers in ascending threshold order.
    ///
    /// # Arguments
    ///
    /// * `tiers` - The tiers, ordered by ascending threshold
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDiscountLadder` if:
    /// - There are more than five tiers
    /// - Thresholds are not strictly increasing
    /// - Any percent exceeds 100
    pub fn new(tiers: Vec<DiscountTier>) -> Result<Self, DomainError> {
        if tiers.len() > MAX_TIERS {
            return Err(DomainError::InvalidDiscountLadder {
                reason: format!("At most {MAX_TIERS} tiers are allowed, got {}", tiers.len()),
            });
        }

        for window in tiers.windows(2) {
            if window[1].threshold <= window[0].threshold {
                return Err(DomainError::InvalidDiscountLadder {
                    reason: format!(
                        "Thresholds must be strictly increasing, got {} after {}",
                        window[1].threshold, window[0].threshold
                    ),
                });
            }
        }

        for tier in &tiers {
            if tier.percent > 100 {
                return Err(DomainError::InvalidDiscountLadder {
                    reason: format!("Discount percent must not exceed 100, got {}", tier.percent),
                });
            }
        }

        Ok(Self { tiers })
    }

    /// Creates an empty ladder (no discount at any volume).
    #[must_use]
    pub const fn empty() -> Self {
        Self { tiers: Vec::new() }
    }

    /// Returns the tiers in ascending threshold order.
    #[must_use]
    pub fn tiers(&self) -> &[DiscountTier] {
        &self.tiers
    }

    /// Selects the highest tier whose threshold is met by `wash_count`.
    ///
    /// The threshold comparison is inclusive: a count exactly equal to a
    /// threshold selects that tier. Returns `None` if no tier qualifies.
    #[must_use]
    pub fn select_tier(&self, wash_count: u32) -> Option<DiscountTier> {
        self.tiers
            .iter()
            .rev()
            .find(|tier| wash_count >= tier.threshold)
            .copied()
    }
}

/// The discount outcome for one network-relation partition of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDiscount {
    /// The partition this discount applies to.
    pub operation_type: OperationType,
    /// Completed/locked wash count in the partition.
    pub wash_count: u32,
    /// Subtotal of the partition's line items.
    pub subtotal: i64,
    /// The selected tier, if any qualified.
    pub tier: Option<DiscountTier>,
    /// The discount amount for this partition.
    pub discount_amount: i64,
}

/// Result of the discount calculation for one partner and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountResult {
    /// Discount for washes at network-owned locations.
    pub own: PartitionDiscount,
    /// Discount for washes at subcontractor locations.
    pub sub: PartitionDiscount,
    /// Sum of both partitions' discount amounts.
    pub total_discount: i64,
}

/// Calculates the volume discount for a partner over a billing period.
///
/// This is a pure, deterministic calculation: it depends only on the
/// partner's two ladders and the supplied per-partition wash counts and
/// subtotals. It is safe to call repeatedly as a preview before any
/// invoice exists; it has no side effects.
///
/// Each partition selects the highest tier of its own ladder whose
/// threshold is met (inclusive), and that tier's percent applies to that
/// partition's subtotal only. Discounts never mix across partitions.
/// Amounts use integer arithmetic with floor division.
///
/// # Arguments
///
/// * `partner` - The partner whose ladders apply
/// * `own_count` - Completed/locked washes at network-owned locations
/// * `own_subtotal` - Subtotal of the own-network line items
/// * `sub_count` - Completed/locked washes at subcontractor locations
/// * `sub_subtotal` - Subtotal of the subcontractor line items
///
/// # Returns
///
/// A `DiscountResult` with per-partition tiers and amounts. A partner with
/// zero washes in the period yields 0% on both ladders, not an error.
#[must_use]
pub fn calculate_discount(
    partner: &PartnerCompany,
    own_count: u32,
    own_subtotal: i64,
    sub_count: u32,
    sub_subtotal: i64,
) -> DiscountResult {
    let own: PartitionDiscount = partition_discount(
        &partner.own_ladder,
        OperationType::Own,
        own_count,
        own_subtotal,
    );
    let sub: PartitionDiscount = partition_discount(
        &partner.sub_ladder,
        OperationType::Subcontractor,
        sub_count,
        sub_subtotal,
    );

    DiscountResult {
        total_discount: own.discount_amount + sub.discount_amount,
        own,
        sub,
    }
}

/// Applies one ladder to one partition.
fn partition_discount(
    ladder: &DiscountLadder,
    operation_type: OperationType,
    wash_count: u32,
    subtotal: i64,
) -> PartitionDiscount {
    let tier: Option<DiscountTier> = ladder.select_tier(wash_count);
    let discount_amount: i64 =
        tier.map_or(0, |t| apply_percent(subtotal, t.percent));

    PartitionDiscount {
        operation_type,
        wash_count,
        subtotal,
        tier,
        discount_amount,
    }
}

/// Applies a whole percent to an amount using floor division.
#[must_use]
pub const fn apply_percent(amount: i64, percent: u8) -> i64 {
    amount * percent as i64 / 100
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BillingCycle, BillingType, PartnerCode};

    fn two_tier_ladder() -> DiscountLadder {
        DiscountLadder::new(vec![
            DiscountTier {
                threshold: 10,
                percent: 5,
            },
            DiscountTier {
                threshold: 50,
                percent: 10,
            },
        ])
        .unwrap()
    }

    fn make_partner(own_ladder: DiscountLadder, sub_ladder: DiscountLadder) -> PartnerCompany {
        PartnerCompany {
            partner_company_id: Some(1),
            network_id: 1,
            code: PartnerCode::new("HAULER-01"),
            name: String::from("Hauler Kft."),
            tax_number: Some(String::from("12345678-2-42")),
            billing_type: BillingType::Contract,
            billing_cycle: Some(BillingCycle::Monthly),
            own_ladder,
            sub_ladder,
            is_active: true,
        }
    }

    #[test]
    fn test_ladder_rejects_too_many_tiers() {
        let tiers: Vec<DiscountTier> = (1..=6)
            .map(|i| DiscountTier {
                threshold: i * 10,
                percent: 5,
            })
            .collect();

        assert!(DiscountLadder::new(tiers).is_err());
    }

    #[test]
    fn test_ladder_rejects_non_increasing_thresholds() {
        let result = DiscountLadder::new(vec![
            DiscountTier {
                threshold: 10,
                percent: 5,
            },
            DiscountTier {
                threshold: 10,
                percent: 10,
            },
        ]);

        assert!(result.is_err());
    }

    #[test]
    fn test_ladder_rejects_percent_over_100() {
        let result = DiscountLadder::new(vec![DiscountTier {
            threshold: 10,
            percent: 101,
        }]);

        assert!(result.is_err());
    }

    #[test]
    fn test_select_tier_none_below_first_threshold() {
        let ladder: DiscountLadder = two_tier_ladder();
        assert_eq!(ladder.select_tier(0), None);
        assert_eq!(ladder.select_tier(9), None);
    }

    #[test]
    fn test_select_tier_inclusive_threshold() {
        let ladder: DiscountLadder = two_tier_ladder();

        // A count exactly equal to a threshold selects that tier
        assert_eq!(ladder.select_tier(10).unwrap().percent, 5);
        assert_eq!(ladder.select_tier(50).unwrap().percent, 10);
    }

    #[test]
    fn test_select_tier_highest_qualifying() {
        let ladder: DiscountLadder = two_tier_ladder();

        assert_eq!(ladder.select_tier(12).unwrap().percent, 5);
        assert_eq!(ladder.select_tier(49).unwrap().percent, 5);
        assert_eq!(ladder.select_tier(60).unwrap().percent, 10);
        assert_eq!(ladder.select_tier(u32::MAX).unwrap().percent, 10);
    }

    #[test]
    fn test_select_tier_monotonic_in_wash_count() {
        let ladder: DiscountLadder = two_tier_ladder();

        let mut last_percent: u8 = 0;
        for count in 0..200 {
            let percent: u8 = ladder.select_tier(count).map_or(0, |t| t.percent);
            assert!(
                percent >= last_percent,
                "discount percent decreased at count {count}"
            );
            last_percent = percent;
        }
    }

    #[test]
    fn test_scenario_a_tier1_selected() {
        // 12 own-network washes at 1000 HUF each: subtotal 12000,
        // tier1 (10 @ 5%) selected, discount 600
        let partner: PartnerCompany = make_partner(two_tier_ladder(), DiscountLadder::empty());

        let result: DiscountResult = calculate_discount(&partner, 12, 12_000, 0, 0);

        assert_eq!(result.own.tier.unwrap().percent, 5);
        assert_eq!(result.own.discount_amount, 600);
        assert_eq!(result.sub.tier, None);
        assert_eq!(result.sub.discount_amount, 0);
        assert_eq!(result.total_discount, 600);
    }

    #[test]
    fn test_scenario_b_tier2_selected() {
        // 60 own-network washes at 1000 HUF each: subtotal 60000,
        // tier2 (50 @ 10%) selected, discount 6000
        let partner: PartnerCompany = make_partner(two_tier_ladder(), DiscountLadder::empty());

        let result: DiscountResult = calculate_discount(&partner, 60, 60_000, 0, 0);

        assert_eq!(result.own.tier.unwrap().percent, 10);
        assert_eq!(result.own.discount_amount, 6_000);
        assert_eq!(result.total_discount, 6_000);
    }

    #[test]
    fn test_zero_washes_yield_zero_discount() {
        let partner: PartnerCompany = make_partner(two_tier_ladder(), two_tier_ladder());

        let result: DiscountResult = calculate_discount(&partner, 0, 0, 0, 0);

        assert_eq!(result.own.discount_amount, 0);
        assert_eq!(result.sub.discount_amount, 0);
        assert_eq!(result.total_discount, 0);
    }

    #[test]
    fn test_partitions_never_mix() {
        // Own washes qualify for tier2, sub washes only for tier1; each
        // partition's percent applies to its own subtotal only
        let partner: PartnerCompany = make_partner(two_tier_ladder(), two_tier_ladder());

        let result: DiscountResult = calculate_discount(&partner, 50, 50_000, 10, 8_000);

        assert_eq!(result.own.tier.unwrap().percent, 10);
        assert_eq!(result.own.discount_amount, 5_000);
        assert_eq!(result.sub.tier.unwrap().percent, 5);
        assert_eq!(result.sub.discount_amount, 400);
        assert_eq!(result.total_discount, 5_400);
    }

    #[test]
    fn test_calculation_is_idempotent() {
        let partner: PartnerCompany = make_partner(two_tier_ladder(), two_tier_ladder());

        let first: DiscountResult = calculate_discount(&partner, 23, 19_500, 7, 6_300);
        let second: DiscountResult = calculate_discount(&partner, 23, 19_500, 7, 6_300);

        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_percent_floors() {
        assert_eq!(apply_percent(999, 5), 49);
        assert_eq!(apply_percent(12_000, 5), 600);
        assert_eq!(apply_percent(0, 10), 0);
    }
}
