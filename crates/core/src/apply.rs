// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{InvoiceCommand, WashCommand};
use crate::error::CoreError;
use crate::state::{InvoiceTransition, WashTransition};
use time::{Date, Duration, OffsetDateTime};
use washnet_audit::{Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot};
use washnet_domain::{
    DomainError, EntryMode, Invoice, InvoiceStatus, Money, PriceCatalog, WashEvent, WashStatus,
    resolve_price,
};

/// Applies a command to a wash event, producing the new event and its
/// audit event.
///
/// This function is pure: it neither reads nor writes storage. The caller
/// commits the returned transition atomically (status compare-and-swap
/// plus audit insert in one transaction), so a failed command leaves the
/// event untouched.
///
/// # Arguments
///
/// * `catalog` - The price catalog snapshot (used by `Complete`)
/// * `event` - The current wash event (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The transition timestamp
///
/// # Returns
///
/// * `Ok(WashTransition)` containing the new event and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The status transition is not permitted by the lifecycle rules
/// - A manual-operator event is started without authorization
/// - A rejection has no reason
/// - Completion finds no configured price
pub fn apply_wash(
    catalog: &PriceCatalog,
    event: &WashEvent,
    command: WashCommand,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<WashTransition, CoreError> {
    match command {
        WashCommand::Authorize => {
            event
                .status
                .validate_transition(WashStatus::Authorized)
                .map_err(CoreError::DomainViolation)?;

            let mut new_event: WashEvent = event.clone();
            new_event.status = WashStatus::Authorized;
            new_event.authorized_at = Some(now);

            Ok(transition(
                event,
                new_event,
                actor,
                cause,
                "AuthorizeWash",
                None,
            ))
        }
        WashCommand::Start => {
            // Manual-operator events must pass through authorization; only
            // the driver QR flow self-authorizes at start.
            if event.status == WashStatus::Created && event.entry_mode == EntryMode::ManualOperator
            {
                return Err(CoreError::DomainViolation(
                    DomainError::AuthorizationRequired {
                        entry_mode: event.entry_mode.as_str().to_string(),
                    },
                ));
            }

            event
                .status
                .validate_transition(WashStatus::InProgress)
                .map_err(CoreError::DomainViolation)?;

            let mut new_event: WashEvent = event.clone();
            if new_event.status == WashStatus::Created {
                // QR self-service: starting implies authorization
                new_event.authorized_at = Some(now);
            }
            new_event.status = WashStatus::InProgress;
            new_event.started_at = Some(now);

            Ok(transition(event, new_event, actor, cause, "StartWash", None))
        }
        WashCommand::Complete => {
            event
                .status
                .validate_transition(WashStatus::Completed)
                .map_err(CoreError::DomainViolation)?;

            // Billing never defaults to zero: a missing price fails the
            // completion before any state changes.
            let price: Money = resolve_price(
                catalog,
                event.network_id,
                event.partner_company_id,
                event.service_package_id,
                event.vehicle_type,
            )
            .map_err(CoreError::DomainViolation)?;

            let details: String = format!("Completed at price {price}");

            let mut new_event: WashEvent = event.clone();
            new_event.status = WashStatus::Completed;
            new_event.completed_at = Some(now);
            new_event.total_price = Some(price);

            Ok(transition(
                event,
                new_event,
                actor,
                cause,
                "CompleteWash",
                Some(details),
            ))
        }
        WashCommand::Reject { reason } => {
            if reason.trim().is_empty() {
                return Err(CoreError::DomainViolation(
                    DomainError::MissingRejectionReason,
                ));
            }

            event
                .status
                .validate_transition(WashStatus::Rejected)
                .map_err(CoreError::DomainViolation)?;

            let details: String = format!("Rejected: {reason}");

            let mut new_event: WashEvent = event.clone();
            new_event.status = WashStatus::Rejected;
            new_event.rejected_at = Some(now);
            new_event.rejection_reason = Some(reason);

            Ok(transition(
                event,
                new_event,
                actor,
                cause,
                "RejectWash",
                Some(details),
            ))
        }
        WashCommand::Lock => {
            event
                .status
                .validate_transition(WashStatus::Locked)
                .map_err(CoreError::DomainViolation)?;

            let mut new_event: WashEvent = event.clone();
            new_event.status = WashStatus::Locked;

            Ok(transition(event, new_event, actor, cause, "LockWash", None))
        }
    }
}

/// Builds the transition result for a wash event.
fn transition(
    event: &WashEvent,
    new_event: WashEvent,
    actor: Actor,
    cause: Cause,
    action_name: &str,
    details: Option<String>,
) -> WashTransition {
    let before: StateSnapshot = StateSnapshot::new(event.snapshot());
    let after: StateSnapshot = StateSnapshot::new(new_event.snapshot());

    let subject: AuditSubject = new_event
        .wash_event_id
        .map_or(AuditSubject::Pending, AuditSubject::WashEvent);

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(action_name.to_string(), details),
        before,
        after,
        new_event.network_id,
        subject,
    );

    WashTransition {
        new_event,
        audit_event,
    }
}

/// Applies a command to an invoice, producing the new invoice and its
/// audit event.
///
/// Like `apply_wash`, this function is pure; the caller commits the
/// transition atomically. Side effects of issuance (external numbering,
/// wash-event locking) are orchestrated by the boundary layer after the
/// local transition committed.
///
/// # Arguments
///
/// * `invoice` - The current invoice (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(InvoiceTransition)` containing the new invoice and audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if the status transition is not permitted, or if an
/// overdue sweep targets an invoice that is not past due.
pub fn apply_invoice(
    invoice: &Invoice,
    command: InvoiceCommand,
    actor: Actor,
    cause: Cause,
) -> Result<InvoiceTransition, CoreError> {
    match command {
        InvoiceCommand::Issue { issue_date } => {
            invoice
                .status
                .validate_transition(InvoiceStatus::Issued)
                .map_err(CoreError::DomainViolation)?;

            // The payment window configured at preparation travels with
            // the invoice: the due date shifts with the issuance date.
            let due_days: Duration = invoice.due_date - invoice.issue_date;

            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.status = InvoiceStatus::Issued;
            new_invoice.issue_date = issue_date;
            new_invoice.due_date = issue_date + due_days;

            Ok(invoice_transition(
                invoice,
                new_invoice,
                actor,
                cause,
                "IssueInvoice",
                Some(format!("Issued on {issue_date}")),
            ))
        }
        InvoiceCommand::MarkSent => {
            invoice
                .status
                .validate_transition(InvoiceStatus::Sent)
                .map_err(CoreError::DomainViolation)?;

            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.status = InvoiceStatus::Sent;

            Ok(invoice_transition(
                invoice,
                new_invoice,
                actor,
                cause,
                "MarkInvoiceSent",
                None,
            ))
        }
        InvoiceCommand::MarkPaid { paid_date } => {
            invoice
                .status
                .validate_transition(InvoiceStatus::Paid)
                .map_err(CoreError::DomainViolation)?;

            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.status = InvoiceStatus::Paid;
            new_invoice.paid_date = Some(paid_date);

            Ok(invoice_transition(
                invoice,
                new_invoice,
                actor,
                cause,
                "MarkInvoicePaid",
                Some(format!("Paid on {paid_date}")),
            ))
        }
        InvoiceCommand::Cancel => {
            invoice
                .status
                .validate_transition(InvoiceStatus::Cancelled)
                .map_err(CoreError::DomainViolation)?;

            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.status = InvoiceStatus::Cancelled;

            Ok(invoice_transition(
                invoice,
                new_invoice,
                actor,
                cause,
                "CancelInvoice",
                None,
            ))
        }
        InvoiceCommand::MarkOverdue { as_of } => {
            invoice
                .status
                .validate_transition(InvoiceStatus::Overdue)
                .map_err(CoreError::DomainViolation)?;

            if invoice.due_date >= as_of {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidInvoiceTransition {
                        from: invoice.status.as_str().to_string(),
                        to: InvoiceStatus::Overdue.as_str().to_string(),
                        reason: format!(
                            "invoice is not past its due date {} as of {as_of}",
                            invoice.due_date
                        ),
                    },
                ));
            }

            let mut new_invoice: Invoice = invoice.clone();
            new_invoice.status = InvoiceStatus::Overdue;

            Ok(invoice_transition(
                invoice,
                new_invoice,
                actor,
                cause,
                "MarkInvoiceOverdue",
                Some(format!("Past due {} as of {as_of}", invoice.due_date)),
            ))
        }
    }
}

/// Builds the transition result for an invoice.
fn invoice_transition(
    invoice: &Invoice,
    new_invoice: Invoice,
    actor: Actor,
    cause: Cause,
    action_name: &str,
    details: Option<String>,
) -> InvoiceTransition {
    let before: StateSnapshot = StateSnapshot::new(invoice.snapshot());
    let after: StateSnapshot = StateSnapshot::new(new_invoice.snapshot());

    let subject: AuditSubject = new_invoice
        .invoice_id
        .map_or(AuditSubject::Pending, AuditSubject::Invoice);

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        Action::new(action_name.to_string(), details),
        before,
        after,
        new_invoice.network_id,
        subject,
    );

    InvoiceTransition {
        new_invoice,
        audit_event,
    }
}

/// Computes the date a prepared invoice falls due.
///
/// # Arguments
///
/// * `issue_date` - The (provisional) issuance date
/// * `due_days` - The partner's payment window in days
#[must_use]
pub fn due_date_for(issue_date: Date, due_days: u16) -> Date {
    issue_date + Duration::days(i64::from(due_days))
}
