use serde_json::Value;
use uuid::Uuid;

use crate::db::DbPool;

/// Appends an audit row for a state-changing call. Audit failures never fail
/// the request; they are only logged.
pub async fn record(pool: &DbPool, actor: Uuid, action: &str, resource: &str, metadata: Value) {
    let inserted = sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(actor)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    match inserted {
        Ok(_) => tracing::debug!(%actor, action, resource, "audit recorded"),
        Err(err) => tracing::warn!(error = %err, %actor, action, "audit log failed"),
    }
}
