// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::discount_tiers;

/// Insertable discount tier row.
///
/// Ladders are stored flattened: one row per tier, discriminated by the
/// `ladder` column and ordered by `tier_index`.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = discount_tiers)]
pub struct NewDiscountTier {
    pub partner_company_id: i64,
    pub ladder: String,
    pub tier_index: i32,
    pub threshold: i32,
    pub percent: i32,
}

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Type alias for one stored audit event row.
///
/// Columns: `event_id`, `network_id`, `subject_kind`, `subject_id`,
/// `actor_json`, `cause_json`, `action_json`, `before_snapshot_json`,
/// `after_snapshot_json`.
pub type AuditEventRow = (
    i64,
    i64,
    String,
    Option<i64>,
    String,
    String,
    String,
    String,
    String,
);

/// Type alias for one stored wash event row, in table column order.
pub type WashEventRow = (
    i64,
    i64,
    i64,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<i64>,
);

/// Type alias for one stored invoice row, in table column order.
pub type InvoiceRow = (
    i64,
    i64,
    i64,
    String,
    String,
    i64,
    i32,
    i64,
    i32,
    i64,
    i64,
    String,
    String,
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Type alias for one stored invoice item row, in table column order.
pub type InvoiceItemRow = (i64, i64, String, i32, i64, i64, i32, Option<i64>);

/// Type alias for one stored partner company row, in table column order.
pub type PartnerCompanyRow = (
    i64,
    i64,
    String,
    String,
    Option<String>,
    String,
    Option<String>,
    i32,
);
