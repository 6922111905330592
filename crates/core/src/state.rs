// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use washnet_audit::AuditEvent;
use washnet_domain::{DiscountResult, Invoice, InvoiceItem, OperationType, WashEvent};

/// The result of a successful wash-event transition.
///
/// Transitions are atomic: the new event and its audit event must be
/// committed together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WashTransition {
    /// The wash event after the transition.
    pub new_event: WashEvent,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// The result of a successful invoice transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceTransition {
    /// The invoice after the transition.
    pub new_invoice: Invoice,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}

/// A wash event enriched with its location's operation type.
///
/// The discount partition depends on where the wash was performed; the
/// persistence layer joins that in when fetching billable events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillableWash {
    /// The billable wash event.
    pub event: WashEvent,
    /// The performing location's operation type.
    pub operation_type: OperationType,
}

/// A fully assembled draft invoice, ready to persist.
///
/// Preparation never mutates wash events; the draft only references them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInvoice {
    /// The draft invoice header.
    pub invoice: Invoice,
    /// The line items, one per billed wash event.
    pub items: Vec<InvoiceItem>,
    /// The per-partition discount breakdown behind the header figures.
    pub discount: DiscountResult,
    /// The wash events the draft bills, for linkage.
    pub wash_event_ids: Vec<i64>,
    /// The audit event recording the preparation.
    pub audit_event: AuditEvent,
}
