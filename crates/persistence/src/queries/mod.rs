// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic query modules.
//!
//! Queries are read-only and side-effect free. All of them are generated in
//! backend-specific monomorphic versions (`_sqlite` and `_mysql` suffixes)
//! using the `backend_fn!` macro; dispatch happens in the `Persistence`
//! adapter.
//!
//! ## Module Organization
//!
//! - `audit` — Audit event retrieval and per-subject timelines
//! - `wash_events` — Wash event retrieval and reconstruction
//! - `billing` — Billable-event queries, drafts, invoices, overdue candidates
//! - `catalog` — Locations, partners with ladders, the price catalog

pub mod audit;
pub mod billing;
pub mod catalog;
pub mod wash_events;
