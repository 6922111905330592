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

mod apply;
mod billing;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{apply_invoice, apply_wash, due_date_for};
pub use billing::prepare_invoice;
pub use command::{InvoiceCommand, WashCommand};
pub use error::CoreError;
pub use state::{BillableWash, InvoiceTransition, PreparedInvoice, WashTransition};
