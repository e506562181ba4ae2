//! Best-effort operation log
//!
//! Recording is advisory: a failed insert is logged and swallowed, never
//! failing the operation that triggered it.

use sqlx::SqlitePool;

pub async fn log_operation(pool: &SqlitePool, operation_type: &str, target_id: i64, details: &str) {
    let result = sqlx::query(
        "INSERT INTO operation_logs (operation_type, target_id, details) VALUES (?, ?, ?)",
    )
    .bind(operation_type)
    .bind(target_id)
    .bind(details)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(
            operation_type,
            target_id,
            error = %e,
            "failed to record operation log"
        );
    }
}
