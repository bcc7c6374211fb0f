//! tests/support.rs
//! Adaptador de canal con guion y helpers de base de datos en memoria.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::{
    config::app_config::ChannelTimeouts,
    database,
    models::{
        confirmation_model::{ChannelErrorKind, ChannelFailure, ConfirmationChannel},
        job_model::Job,
    },
    services::{
        activity_service::ActivityService,
        channel_adapter::{ChannelAdapter, ChannelRegistry},
        confirmation_service::ConfirmationService,
        job_service::JobService,
    },
};

#[derive(Debug, Clone)]
pub enum Behavior {
    Succeed(&'static str),
    Fail(ChannelErrorKind, &'static str),
    /// Espera y luego responde con éxito
    Delay(Duration, &'static str),
    Panic,
}

/// Registro de llamadas compartido con el test.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    count: Arc<AtomicUsize>,
    targets: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

pub struct ScriptedAdapter {
    pub channel: ConfirmationChannel,
    behavior: Behavior,
    calls: CallLog,
}

impl ScriptedAdapter {
    pub fn new(channel: ConfirmationChannel, behavior: Behavior) -> (ChannelAdapter, CallLog) {
        let calls = CallLog::default();
        let adapter = ScriptedAdapter {
            channel,
            behavior,
            calls: calls.clone(),
        };
        (ChannelAdapter::Scripted(adapter), calls)
    }

    pub async fn attempt(&self, _job: &Job, target: &str) -> Result<String, ChannelFailure> {
        self.calls.count.fetch_add(1, Ordering::SeqCst);
        self.calls.targets.lock().unwrap().push(target.to_string());

        match &self.behavior {
            Behavior::Succeed(reference) => Ok(reference.to_string()),
            Behavior::Fail(kind, message) => Err(ChannelFailure::new(*kind, *message)),
            Behavior::Delay(wait, reference) => {
                tokio::time::sleep(*wait).await;
                Ok(reference.to_string())
            }
            Behavior::Panic => panic!("scripted {} adapter exploded", self.channel),
        }
    }
}

/// SQLite en memoria con las migraciones reales (una sola conexión).
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("no se pudo abrir sqlite en memoria");
    database::run_migrations(&pool)
        .await
        .expect("migraciones fallaron");
    pool
}

pub async fn insert_job(pool: &Pool<Sqlite>, id: &str, phone: Option<&str>, email: Option<&str>) {
    sqlx::query(
        r#"
        INSERT INTO jobs (id, customer_name, phone, email, service_address,
                          scheduled_date, time_window, status)
        VALUES (?1, 'Dana Ortiz', ?2, ?3, '42 Quarry Rd', '2026-10-20', '8am-10am', 'scheduled')
        "#,
    )
    .bind(id)
    .bind(phone)
    .bind(email)
    .execute(pool)
    .await
    .expect("insert job");
}

#[derive(Debug, sqlx::FromRow)]
pub struct ActivityRow {
    pub actor_id: String,
    pub action: String,
    pub module: String,
    pub detail: String,
    pub job_id: Option<String>,
    pub error: Option<String>,
}

pub async fn activity_rows(pool: &Pool<Sqlite>) -> Vec<ActivityRow> {
    sqlx::query_as::<_, ActivityRow>(
        "SELECT actor_id, action, module, detail, job_id, error FROM activity_log",
    )
    .fetch_all(pool)
    .await
    .expect("select activity_log")
}

pub fn build_service(
    pool: &Pool<Sqlite>,
    adapters: Vec<ChannelAdapter>,
    timeouts: ChannelTimeouts,
) -> (ConfirmationService, ActivityService) {
    let mut registry = ChannelRegistry::new();
    for adapter in adapters {
        registry.register(adapter);
    }
    let activity_service = ActivityService::new(pool.clone());
    let service = ConfirmationService::new(
        JobService::new(pool.clone()),
        registry,
        activity_service.clone(),
        timeouts,
    );
    (service, activity_service)
}

pub fn short_timeouts() -> ChannelTimeouts {
    ChannelTimeouts::uniform(Duration::from_millis(500))
}
