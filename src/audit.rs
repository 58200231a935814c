//! Activity reporting for successful lookups
//!
//! The lookup service emits one [`LookupActivity`] per successful upstream
//! fetch. The audit store itself is external; sink failures are logged and
//! swallowed by the caller, never surfaced as lookup failures.

use async_trait::async_trait;

/// Who performed the lookup. Carried for the audit event only; no lookup
/// behavior branches on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub tenant_id: String,
    pub user_id: String,
    pub user_name: String,
}

/// Activity event emitted after a successful upstream fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupActivity {
    pub company_number: String,
    pub company_name: String,
    pub actor: Actor,
}

impl LookupActivity {
    /// Human-readable description for the activity feed.
    pub fn description(&self) -> String {
        format!(
            "Looked up Companies House data for {} ({})",
            self.company_name, self.company_number
        )
    }
}

/// Sink for lookup activity events.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record_lookup(&self, activity: &LookupActivity) -> anyhow::Result<()>;
}

/// Sink that discards every event, for callers without an audit store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record_lookup(&self, _activity: &LookupActivity) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(feature = "database")]
pub use pg::PgActivityLog;

#[cfg(feature = "database")]
mod pg {
    use anyhow::{Context, Result};
    use async_trait::async_trait;
    use sqlx::PgPool;
    use uuid::Uuid;

    use super::{AuditSink, LookupActivity};

    /// Sink writing to the host application's `activity_logs` table.
    ///
    /// The table belongs to the host application; this sink only inserts.
    #[derive(Clone, Debug)]
    pub struct PgActivityLog {
        pool: PgPool,
    }

    impl PgActivityLog {
        pub fn new(pool: PgPool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl AuditSink for PgActivityLog {
        async fn record_lookup(&self, activity: &LookupActivity) -> Result<()> {
            let metadata = serde_json::json!({
                "company_number": activity.company_number,
                "company_name": activity.company_name,
            });

            sqlx::query(
                r#"
                INSERT INTO activity_logs
                    (tenant_id, entity_type, entity_id, action,
                     description, user_id, user_name, metadata)
                VALUES ($1, 'companies_house_lookup', $2, 'looked_up', $3, $4, $5, $6)
                "#,
            )
            .bind(&activity.actor.tenant_id)
            .bind(Uuid::new_v4())
            .bind(activity.description())
            .bind(&activity.actor.user_id)
            .bind(&activity.actor.user_name)
            .bind(metadata)
            .execute(&self.pool)
            .await
            .context("Failed to record lookup activity")?;

            Ok(())
        }
    }
}
