//! services/activity_service.rs
//! Bitácora de auditoría. `record` nunca falla ni bloquea al que llama:
//! la escritura corre en una tarea desacoplada y sus errores solo quedan
//! en el log del proceso.

use std::time::Duration;

use sqlx::{Pool, Sqlite};
use thiserror::Error;
use uuid::Uuid;

use crate::{models::activity_model::ActivityLogEntry, services::detached_task::DetachedTasks};

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("AuditWriteFailure: {0}")]
    AuditWriteFailure(#[from] sqlx::Error),
}

#[derive(Clone)]
pub struct ActivityService {
    db_pool: Pool<Sqlite>,
    tasks: DetachedTasks,
}

impl ActivityService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        Self {
            db_pool,
            tasks: DetachedTasks::new(),
        }
    }

    /// Fire-and-forget.
    pub fn record(&self, entry: ActivityLogEntry) {
        let db_pool = self.db_pool.clone();
        log::debug!(
            "(record) Encolando actividad action={} job_id={:?}",
            entry.action,
            entry.job_id
        );
        self.tasks.spawn("activity_log", async move {
            insert_entry(&db_pool, &entry).await
        });
    }

    pub fn attempted(&self) -> u64 {
        self.tasks.spawned()
    }

    pub fn failures(&self) -> u64 {
        self.tasks.failures()
    }

    /// Espera escrituras pendientes (apagado del proceso y tests).
    pub async fn drain(&self, wait: Duration) -> bool {
        let drained = self.tasks.drain(wait).await;
        log::info!(
            "(drain) Auditorías intentadas={} fallidas={}",
            self.attempted(),
            self.failures()
        );
        if !drained {
            log::warn!(
                "(drain) Quedaron {} escrituras de auditoría sin terminar",
                self.tasks.pending()
            );
        }
        drained
    }
}

async fn insert_entry(db_pool: &Pool<Sqlite>, entry: &ActivityLogEntry) -> Result<(), ActivityError> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO activity_log (
            id, actor_id, actor_name, action, module,
            detail, job_id, error, created_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&id)
    .bind(&entry.actor_id)
    .bind(&entry.actor_name)
    .bind(&entry.action)
    .bind(&entry.module)
    .bind(&entry.detail)
    .bind(&entry.job_id)
    .bind(&entry.error)
    .bind(entry.created_at.to_rfc3339())
    .execute(db_pool)
    .await?;

    Ok(())
}
