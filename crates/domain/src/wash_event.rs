// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The wash event record.
//!
//! A wash event is one physical wash transaction. It is created by a
//! driver (QR flow) or an operator (manual flow), mutated only through
//! the state machine, and never hard-deleted.

use crate::types::{EntryMode, Money, VehicleType};
use crate::wash_status::WashStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One physical wash transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WashEvent {
    /// The canonical numeric identifier assigned by the database.
    /// `None` indicates the event has not been persisted yet.
    pub wash_event_id: Option<i64>,
    /// The network the wash was performed in.
    pub network_id: i64,
    /// The location that performed the wash.
    pub location_id: i64,
    /// The partner being billed; `None` for walk-in washes.
    pub partner_company_id: Option<i64>,
    /// The driver, when known from the QR flow.
    pub driver_id: Option<i64>,
    /// Free-text driver name for manual entries.
    pub driver_name: Option<String>,
    /// Tractor plate, as a vehicle reference or free text.
    pub tractor_plate: Option<String>,
    /// Trailer plate, as a vehicle reference or free text.
    pub trailer_plate: Option<String>,
    /// How the event entered the system.
    pub entry_mode: EntryMode,
    /// The service package performed.
    pub service_package_id: i64,
    /// The washed vehicle's type.
    pub vehicle_type: VehicleType,
    /// The lifecycle status.
    pub status: WashStatus,
    /// When the event was recorded.
    pub created_at: OffsetDateTime,
    /// When the event was authorized, if it has been.
    pub authorized_at: Option<OffsetDateTime>,
    /// When the wash started, if it has.
    pub started_at: Option<OffsetDateTime>,
    /// When the wash completed, if it has.
    pub completed_at: Option<OffsetDateTime>,
    /// When the wash was rejected, if it was.
    pub rejected_at: Option<OffsetDateTime>,
    /// Why the wash was rejected; set iff status is rejected.
    pub rejection_reason: Option<String>,
    /// The price computed at completion.
    pub total_price: Option<Money>,
    /// The non-cancelled invoice this event is billed on, if any.
    pub invoice_id: Option<i64>,
}

impl WashEvent {
    /// Creates a new wash event in the created state.
    ///
    /// # Arguments
    ///
    /// * `network_id` - The network the wash is performed in
    /// * `location_id` - The performing location
    /// * `entry_mode` - How the event entered the system
    /// * `service_package_id` - The service package performed
    /// * `vehicle_type` - The washed vehicle's type
    /// * `created_at` - When the event was recorded
    #[must_use]
    pub const fn new(
        network_id: i64,
        location_id: i64,
        entry_mode: EntryMode,
        service_package_id: i64,
        vehicle_type: VehicleType,
        created_at: OffsetDateTime,
    ) -> Self {
        Self {
            wash_event_id: None,
            network_id,
            location_id,
            partner_company_id: None,
            driver_id: None,
            driver_name: None,
            tractor_plate: None,
            trailer_plate: None,
            entry_mode,
            service_package_id,
            vehicle_type,
            status: WashStatus::Created,
            created_at,
            authorized_at: None,
            started_at: None,
            completed_at: None,
            rejected_at: None,
            rejection_reason: None,
            total_price: None,
            invoice_id: None,
        }
    }

    /// Renders a compact state description for audit snapshots.
    #[must_use]
    pub fn snapshot(&self) -> String {
        format!(
            "wash_event={},network={},location={},status={},price={}",
            self.wash_event_id.map_or_else(|| String::from("new"), |id| id.to_string()),
            self.network_id,
            self.location_id,
            self.status.as_str(),
            self.total_price
                .as_ref()
                .map_or_else(|| String::from("unset"), ToString::to_string),
        )
    }
}
