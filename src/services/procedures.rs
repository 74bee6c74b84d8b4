use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::db::{init_database_with_pool, schema_exists};
use crate::error::{AppError, AppResult};
use crate::services::StandingsEngine;

pub const RECALCULATE_STANDINGS: &str = "recalculate_standings";
pub const SCHEMA_EXISTS: &str = "schema_exists";
pub const CREATE_SCHEMA: &str = "create_schema";

/// Named server-side procedures. None of them take arguments today; `args`
/// is accepted so callers have one calling convention.
pub async fn invoke(
    pool: &SqlitePool,
    engine: &StandingsEngine,
    name: &str,
    args: &Value,
) -> AppResult<Value> {
    if !args.is_null() && args.as_object().is_some_and(|a| !a.is_empty()) {
        tracing::debug!("Procedure {} ignores its arguments: {}", name, args);
    }

    match name {
        RECALCULATE_STANDINGS => {
            let summary = engine.recalculate(pool).await?;
            Ok(serde_json::to_value(summary).map_err(anyhow::Error::from)?)
        }
        SCHEMA_EXISTS => Ok(json!({ "exists": schema_exists(pool).await? })),
        CREATE_SCHEMA => {
            init_database_with_pool(pool).await?;
            Ok(json!({ "exists": true }))
        }
        other => Err(AppError::not_found(format!("procedure {}", other))),
    }
}

/// Creates the schema on first use.
pub async fn ensure_schema(pool: &SqlitePool) -> AppResult<()> {
    if !schema_exists(pool).await? {
        tracing::info!("Schema missing, creating it");
        init_database_with_pool(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn bare_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_schema_procedures() {
        let pool = bare_pool().await;
        let engine = StandingsEngine::new();

        let before = invoke(&pool, &engine, SCHEMA_EXISTS, &Value::Null).await.unwrap();
        assert_eq!(before, json!({"exists": false}));

        ensure_schema(&pool).await.unwrap();
        let after = invoke(&pool, &engine, SCHEMA_EXISTS, &Value::Null).await.unwrap();
        assert_eq!(after, json!({"exists": true}));

        // Safe to call again.
        invoke(&pool, &engine, CREATE_SCHEMA, &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_recalculate_on_empty_store() {
        let pool = crate::db::test_pool().await;
        let engine = StandingsEngine::new();
        let out = invoke(&pool, &engine, RECALCULATE_STANDINGS, &Value::Null).await.unwrap();
        assert_eq!(out["scopes"], 0);
        assert_eq!(out["matches_folded"], 0);
    }

    #[tokio::test]
    async fn test_unknown_procedure() {
        let pool = crate::db::test_pool().await;
        let err = invoke(&pool, &StandingsEngine::new(), "drop_everything", &Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
