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
    clippy::all
)]

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// an operator at a location terminal, a driver in the QR flow, or the
/// system itself (e.g., the overdue sweep).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "operator", "driver", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates the system actor used for scheduled jobs.
    #[must_use]
    pub fn system() -> Self {
        Self {
            id: String::from("system"),
            actor_type: String::from("system"),
        }
    }
}

/// Represents the reason or trigger for an action.
///
/// A cause describes why a state change was initiated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
///
/// An action describes what state change occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`AuthorizeWash`", "`IssueInvoice`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of a record's state at a point in time.
///
/// Snapshots capture the audited record before and after a transition
/// in a compact textual form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A string representation of the state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// The record a transition applies to.
///
/// Every audit event is scoped to one network and one subject record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditSubject {
    /// A wash event, by its canonical identifier.
    WashEvent(i64),
    /// An invoice, by its canonical identifier.
    Invoice(i64),
    /// A partner company, by its canonical identifier.
    PartnerCompany(i64),
    /// A subject not yet persisted (the creating transition assigns it).
    Pending,
}

impl AuditSubject {
    /// Returns the subject kind for persistence.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::WashEvent(_) => "wash_event",
            Self::Invoice(_) => "invoice",
            Self::PartnerCompany(_) => "partner_company",
            Self::Pending => "pending",
        }
    }

    /// Returns the subject's canonical identifier, if assigned.
    #[must_use]
    pub const fn id(&self) -> Option<i64> {
        match self {
            Self::WashEvent(id) | Self::Invoice(id) | Self::PartnerCompany(id) => Some(*id),
            Self::Pending => None,
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful state change must produce exactly one audit event,
/// committed in the same transaction as the change itself. Audit events
/// are immutable once created and capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before the transition (before)
/// - The state after the transition (after)
/// - The network and record the transition applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// The network the transition is scoped to.
    pub network_id: i64,
    /// The record the transition applies to.
    pub subject: AuditSubject,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// Once created, an audit event is immutable.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    /// * `network_id` - The network the transition is scoped to
    /// * `subject` - The record the transition applies to
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        network_id: i64,
        subject: AuditSubject,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            before,
            after,
            network_id,
            subject,
        }
    }

    /// Returns a copy of this event with its subject's identifier assigned.
    ///
    /// Used by creating transitions: the core builds the event with a
    /// pending subject, and the persistence layer fills in the id the
    /// database assigned, inside the same transaction.
    #[must_use]
    pub fn with_subject(&self, subject: AuditSubject) -> Self {
        let mut event = self.clone();
        event.subject = subject;
        event
    }
}
