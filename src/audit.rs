//! Append-only audit trail for account, menu and order changes.

use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, ConnectionTrait, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{entity::audit_logs, error::AppResult};

pub async fn write_entry<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) -> AppResult<audit_logs::Model> {
    let entry = audit_logs::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(actor),
        action: Set(action.to_string()),
        resource: Set(Some(resource.to_string())),
        metadata: Set(Some(metadata)),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    Ok(entry)
}

/// Best effort: a failed audit write never fails the request.
pub async fn record<C: ConnectionTrait>(
    conn: &C,
    actor: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    match write_entry(conn, actor, action, resource, metadata).await {
        Ok(entry) => tracing::debug!(audit_id = %entry.id, action, resource, "audit entry written"),
        Err(err) => tracing::warn!(error = %err, action, resource, "audit log failed"),
    }
}
