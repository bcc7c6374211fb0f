use anyhow::{Context, Result};
use sqlx::{Pool, Sqlite};

use crate::models::job_model::Job;

/// Lectura de trabajos agendados. Nunca modifica el registro.
#[derive(Clone, Debug)]
pub struct JobService {
    db_pool: Pool<Sqlite>,
}

impl JobService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        JobService { db_pool }
    }

    pub async fn find_job(&self, job_id: &str) -> Result<Option<Job>> {
        sqlx::query_as::<_, Job>(
            r#"
            SELECT id, customer_name, phone, email, service_address,
                   scheduled_date, time_window, status
            FROM jobs
            WHERE id = ?1
            "#,
        )
        .bind(job_id)
        .fetch_optional(&self.db_pool)
        .await
        .with_context(|| format!("Error leyendo job {}", job_id))
    }
}
