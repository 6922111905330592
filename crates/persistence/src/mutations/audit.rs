// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.
//!
//! Audit events are append-only: there is an insert here and no update or
//! delete anywhere in the crate. A transition's audit write happens in the
//! same transaction as the transition itself; the `Persistence` adapter
//! composes the two.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use washnet_audit::AuditEvent;

use crate::backend::PersistenceBackend;
use crate::data_models::{ActionData, ActorData, CauseData, StateSnapshotData};
use crate::diesel_schema;
use crate::error::PersistenceError;

backend_fn! {
/// Persists an audit event.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `event` - The audit event to persist
///
/// # Returns
///
/// The event ID assigned by the database.
///
/// # Errors
///
/// Returns an error if persistence or serialization fails.
pub fn persist_audit_event(
    conn: &mut _,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let actor_data: ActorData = ActorData {
        id: event.actor.id.clone(),
        actor_type: event.actor.actor_type.clone(),
    };

    let cause_data: CauseData = CauseData {
        id: event.cause.id.clone(),
        description: event.cause.description.clone(),
    };

    let action_data: ActionData = ActionData {
        name: event.action.name.clone(),
        details: event.action.details.clone(),
    };

    let before_data: StateSnapshotData = StateSnapshotData {
        data: event.before.data.clone(),
    };

    let after_data: StateSnapshotData = StateSnapshotData {
        data: event.after.data.clone(),
    };

    // Serialize JSON fields
    let actor_json: String = serde_json::to_string(&actor_data)?;
    let cause_json: String = serde_json::to_string(&cause_data)?;
    let action_json: String = serde_json::to_string(&action_data)?;
    let before_json: String = serde_json::to_string(&before_data)?;
    let after_json: String = serde_json::to_string(&after_data)?;

    diesel::insert_into(diesel_schema::audit_events::table)
        .values((
            diesel_schema::audit_events::network_id.eq(event.network_id),
            diesel_schema::audit_events::subject_kind.eq(event.subject.kind()),
            diesel_schema::audit_events::subject_id.eq(event.subject.id()),
            diesel_schema::audit_events::actor_json.eq(actor_json),
            diesel_schema::audit_events::cause_json.eq(cause_json),
            diesel_schema::audit_events::action_json.eq(action_json),
            diesel_schema::audit_events::before_snapshot_json.eq(before_json),
            diesel_schema::audit_events::after_snapshot_json.eq(after_json),
        ))
        .execute(conn)?;

    let event_id: i64 = conn.get_last_insert_rowid()?;

    Ok(event_id)
}
}
