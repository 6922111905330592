// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.
//!
//! Stored audit rows are deserialized back into `AuditEvent` values. The
//! timeline query is the basis of the per-record audit trail surfaced to
//! administrators.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use washnet_audit::{Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot};

use crate::data_models::{ActionData, ActorData, AuditEventRow, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Rebuilds an `AuditEvent` from one stored row.
fn reconstruct_audit_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let (
        _event_id,
        network_id,
        subject_kind,
        subject_id,
        actor_json,
        cause_json,
        action_json,
        before_json,
        after_json,
    ) = row;

    let actor_data: ActorData = serde_json::from_str(&actor_json)?;
    let cause_data: CauseData = serde_json::from_str(&cause_json)?;
    let action_data: ActionData = serde_json::from_str(&action_json)?;
    let before_data: StateSnapshotData = serde_json::from_str(&before_json)?;
    let after_data: StateSnapshotData = serde_json::from_str(&after_json)?;

    let subject: AuditSubject = reconstruct_subject(&subject_kind, subject_id)?;

    Ok(AuditEvent::new(
        Actor::new(actor_data.id, actor_data.actor_type),
        Cause::new(cause_data.id, cause_data.description),
        Action::new(action_data.name, action_data.details),
        StateSnapshot::new(before_data.data),
        StateSnapshot::new(after_data.data),
        network_id,
        subject,
    ))
}

/// Rebuilds the audit subject from its stored kind and identifier.
fn reconstruct_subject(
    kind: &str,
    subject_id: Option<i64>,
) -> Result<AuditSubject, PersistenceError> {
    match (kind, subject_id) {
        ("wash_event", Some(id)) => Ok(AuditSubject::WashEvent(id)),
        ("invoice", Some(id)) => Ok(AuditSubject::Invoice(id)),
        ("partner_company", Some(id)) => Ok(AuditSubject::PartnerCompany(id)),
        ("pending", None) => Ok(AuditSubject::Pending),
        _ => Err(PersistenceError::ReconstructionError(format!(
            "invalid stored audit subject: kind='{kind}', id={subject_id:?}"
        ))),
    }
}

/// Selects the full column tuple of the audit events table.
macro_rules! audit_columns {
    () => {
        (
            audit_events::event_id,
            audit_events::network_id,
            audit_events::subject_kind,
            audit_events::subject_id,
            audit_events::actor_json,
            audit_events::cause_json,
            audit_events::action_json,
            audit_events::before_snapshot_json,
            audit_events::after_snapshot_json,
        )
    };
}

backend_fn! {
/// Retrieves an audit event by ID.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event_id` - The event ID to retrieve
///
/// # Errors
///
/// Returns `EventNotFound` if no such event exists, or an error if the
/// stored row cannot be deserialized.
pub fn get_audit_event(
    conn: &mut _,
    event_id: i64,
) -> Result<AuditEvent, PersistenceError> {
    let row: Option<AuditEventRow> = audit_events::table
        .select(audit_columns!())
        .filter(audit_events::event_id.eq(event_id))
        .first::<AuditEventRow>(conn)
        .optional()?;

    match row {
        Some(row) => reconstruct_audit_event(row),
        None => Err(PersistenceError::EventNotFound(event_id)),
    }
}
}

backend_fn! {
/// Retrieves the ordered audit timeline for one subject record.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `network_id` - The network the subject belongs to
/// * `subject_kind` - The subject kind (e.g., `wash_event`, `invoice`)
/// * `subject_id` - The subject's canonical identifier
///
/// # Errors
///
/// Returns an error if rows cannot be retrieved or deserialized.
pub fn get_audit_timeline(
    conn: &mut _,
    network_id: i64,
    subject_kind: &str,
    subject_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .select(audit_columns!())
        .filter(audit_events::network_id.eq(network_id))
        .filter(audit_events::subject_kind.eq(subject_kind))
        .filter(audit_events::subject_id.eq(subject_id))
        .order(audit_events::event_id.asc())
        .load::<AuditEventRow>(conn)?;

    rows.into_iter().map(reconstruct_audit_event).collect()
}
}
