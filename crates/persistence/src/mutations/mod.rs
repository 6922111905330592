// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! This module contains all state-changing operations for the persistence layer.
//! Most mutations use Diesel DSL and are backend-agnostic, with minimal use of
//! backend-specific helpers (e.g., `last_insert_rowid()` for `SQLite`).
//!
//! ## Module Organization
//!
//! - `audit` — Audit event persistence
//! - `wash_events` — Wash event creation and compare-and-swap status updates
//! - `billing` — Invoice drafts, wash-event linkage, lifecycle updates, issuance guard
//! - `catalog` — Locations, partner companies, discount ladders, price catalog
//!
//! ## Atomicity
//!
//! These functions are building blocks. The transactional composition — a
//! status compare-and-swap plus its audit event committed together — lives in
//! the `Persistence` adapter, which wraps them in a single Diesel transaction.

pub mod audit;
pub mod billing;
pub mod catalog;
pub mod wash_events;

// Re-export backend-specific mutation functions used by lib.rs
pub use audit::{persist_audit_event_mysql, persist_audit_event_sqlite};
pub use billing::{
    cas_invoice_status_mysql, cas_invoice_status_sqlite, delete_draft_mysql, delete_draft_sqlite,
    insert_invoice_items_mysql, insert_invoice_items_sqlite, insert_invoice_mysql,
    insert_invoice_sqlite, link_wash_events_mysql, link_wash_events_sqlite,
    release_wash_events_mysql, release_wash_events_sqlite, set_external_reference_mysql,
    set_external_reference_sqlite,
};
pub use catalog::{
    create_location_mysql, create_location_sqlite, create_partner_mysql, create_partner_sqlite,
    deactivate_partner_mysql, deactivate_partner_sqlite, replace_partner_ladders_mysql,
    replace_partner_ladders_sqlite, upsert_partner_price_mysql, upsert_partner_price_sqlite,
    upsert_service_price_mysql, upsert_service_price_sqlite,
};
pub use wash_events::{
    cas_wash_status_mysql, cas_wash_status_sqlite, insert_wash_event_mysql,
    insert_wash_event_sqlite,
};
