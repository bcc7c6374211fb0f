//! services/confirmation_service.rs
//! Orquestador de confirmaciones: carga el trabajo, lanza en paralelo todos
//! los canales aplicables, junta los resultados en orden y deja la auditoría.

use std::{future::Future, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

use crate::{
    config::app_config::ChannelTimeouts,
    models::{
        activity_model::ActivityLogEntry,
        confirmation_model::{
            ChannelErrorKind, ChannelFailure, ChannelOutcome, ConfirmationChannel, DispatchResult,
        },
        job_model::Job,
    },
    services::{
        activity_service::ActivityService,
        channel_adapter::{ChannelAdapter, ChannelRegistry},
        job_service::JobService,
    },
};

/// Margen sobre el timeout máximo para que las tareas reporten su propio timeout.
const JOIN_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Job not found: {0}")]
    JobNotFound(String),
    #[error("Failed to load job: {0:#}")]
    Storage(#[source] anyhow::Error),
    #[error("Dispatch task failed: {0}")]
    Internal(String),
}

#[derive(Clone)]
pub struct ConfirmationService {
    job_service: JobService,
    channels: Arc<ChannelRegistry>,
    activity_service: ActivityService,
    timeouts: ChannelTimeouts,
}

/// Un canal aplicable con su destino ya resuelto.
struct PlannedChannel {
    channel: ConfirmationChannel,
    adapter: Arc<ChannelAdapter>,
    target: String,
}

#[derive(Debug, Clone, Copy)]
enum GatherStop {
    Cancelled,
    Deadline,
    Closed,
}

impl ConfirmationService {
    pub fn new(
        job_service: JobService,
        channels: ChannelRegistry,
        activity_service: ActivityService,
        timeouts: ChannelTimeouts,
    ) -> Self {
        Self {
            job_service,
            channels: Arc::new(channels),
            activity_service,
            timeouts,
        }
    }

    /// Envía las confirmaciones de un trabajo.
    ///
    /// Solo falla si el trabajo no existe (o no se pudo leer); las fallas de
    /// cada canal quedan dentro del `DispatchResult`.
    pub async fn dispatch(&self, job_id: &str) -> Result<DispatchResult, DispatchError> {
        self.dispatch_with_cancel(job_id, std::future::pending::<()>())
            .await
    }

    /// Igual que `dispatch`, pero si `cancel` se resuelve se abortan los
    /// canales en vuelo. Lo que ya se envió se conserva y se audita.
    pub async fn dispatch_with_cancel<C>(
        &self,
        job_id: &str,
        cancel: C,
    ) -> Result<DispatchResult, DispatchError>
    where
        C: Future<Output = ()> + Send + 'static,
    {
        log::info!("(dispatch) Iniciando confirmaciones job_id={}", job_id);

        // 1) Resolver el trabajo; sin trabajo no hay intentos ni auditoría
        let job = self
            .job_service
            .find_job(job_id)
            .await
            .map_err(DispatchError::Storage)?
            .ok_or_else(|| DispatchError::JobNotFound(job_id.to_string()))?;

        // 2) Canales aplicables
        let plan = self.plan_channels(&job);
        log::info!(
            "(dispatch) job_id={} canales aplicables={:?}",
            job.id,
            plan.iter().map(|p| p.channel).collect::<Vec<_>>()
        );

        // 3..6) Fan-out, agregación y auditoría en una tarea propia, para que
        // si el llamador se va lo ya enviado igual quede registrado.
        let service = self.clone();
        let job = Arc::new(job);
        let handle = tokio::spawn(async move {
            let outcomes = service.fan_out(job.clone(), plan, cancel).await;
            let result = DispatchResult::new(job.id.clone(), outcomes);

            log::info!(
                "(dispatch) job_id={} overall_succeeded={} resultados={} fallidos={}",
                result.job_id,
                result.overall_succeeded,
                result.outcomes.len(),
                result.failures().count()
            );
            service
                .activity_service
                .record(ActivityLogEntry::for_dispatch(&result));
            result
        });

        handle
            .await
            .map_err(|e| DispatchError::Internal(e.to_string()))
    }

    fn plan_channels(&self, job: &Job) -> Vec<PlannedChannel> {
        ConfirmationChannel::ALL
            .iter()
            .filter_map(|&channel| {
                let adapter = self.channels.get(channel)?;
                match job.contact_target(channel) {
                    Some(target) => Some(PlannedChannel {
                        channel,
                        adapter: adapter.clone(),
                        target: target.to_string(),
                    }),
                    None => {
                        log::info!(
                            "(plan_channels) job_id={} sin destino para '{}', se omite",
                            job.id,
                            channel
                        );
                        None
                    }
                }
            })
            .collect()
    }

    /// Scatter/gather: una tarea por canal, resultados por índice de slot.
    async fn fan_out<C>(
        &self,
        job: Arc<Job>,
        plan: Vec<PlannedChannel>,
        cancel: C,
    ) -> Vec<ChannelOutcome>
    where
        C: Future<Output = ()> + Send + 'static,
    {
        if plan.is_empty() {
            return Vec::new();
        }

        let channels: Vec<ConfirmationChannel> = plan.iter().map(|p| p.channel).collect();
        let (tx, mut rx) = mpsc::channel::<(usize, ChannelOutcome)>(plan.len());

        let handles: Vec<JoinHandle<()>> = plan
            .into_iter()
            .enumerate()
            .map(|(slot, planned)| {
                let tx = tx.clone();
                let job = job.clone();
                let limit = self.timeouts.for_channel(planned.channel);
                tokio::spawn(async move {
                    let outcome =
                        attempt_channel(&planned.adapter, &job, &planned.target, limit).await;
                    // capacidad == nº de canales, nunca bloquea
                    let _ = tx.send((slot, outcome)).await;
                })
            })
            .collect();
        drop(tx);

        let mut slots: Vec<Option<ChannelOutcome>> = vec![None; channels.len()];
        let mut remaining = channels.len();
        let deadline = Instant::now() + self.timeouts.max() + JOIN_GRACE;
        let mut stop = None;

        tokio::pin!(cancel);
        while remaining > 0 {
            tokio::select! {
                received = rx.recv() => match received {
                    Some((slot, outcome)) => {
                        slots[slot] = Some(outcome);
                        remaining -= 1;
                    }
                    None => {
                        stop = Some(GatherStop::Closed);
                        break;
                    }
                },
                _ = &mut cancel => {
                    stop = Some(GatherStop::Cancelled);
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {
                    stop = Some(GatherStop::Deadline);
                    break;
                }
            }
        }

        if let Some(reason) = stop {
            log::warn!(
                "(fan_out) job_id={} se corta la espera ({:?}) con {} canales pendientes",
                job.id,
                reason,
                remaining
            );
            for handle in &handles {
                handle.abort();
            }
            // lo que llegó entre el corte y el abort también cuenta
            while let Ok((slot, outcome)) = rx.try_recv() {
                if slots[slot].is_none() {
                    slots[slot] = Some(outcome);
                }
            }
        }

        slots
            .into_iter()
            .zip(channels)
            .map(|(slot, channel)| {
                slot.unwrap_or_else(|| {
                    ChannelOutcome::failed(channel, unfinished_failure(channel, stop))
                })
            })
            .collect()
    }
}

/// Un intento aislado: timeout propio y un panic se convierte en falla.
async fn attempt_channel(
    adapter: &ChannelAdapter,
    job: &Job,
    target: &str,
    limit: Duration,
) -> ChannelOutcome {
    let channel = adapter.channel();
    let attempt = AssertUnwindSafe(adapter.attempt(job, target)).catch_unwind();

    let outcome = match tokio::time::timeout(limit, attempt).await {
        Ok(Ok(Ok(reference))) => ChannelOutcome::succeeded(channel, reference),
        Ok(Ok(Err(failure))) => ChannelOutcome::failed(channel, failure),
        Ok(Err(_panic)) => ChannelOutcome::failed(
            channel,
            ChannelFailure::provider(format!("{channel} adapter panicked")),
        ),
        Err(_elapsed) => ChannelOutcome::failed(
            channel,
            ChannelFailure::timeout(format!(
                "{channel} provider did not respond within {}ms",
                limit.as_millis()
            )),
        ),
    };

    if outcome.succeeded {
        log::info!("(attempt_channel) job_id={} {}", job.id, outcome.summary());
    } else {
        log::error!("(attempt_channel) job_id={} {}", job.id, outcome.summary());
    }
    outcome
}

fn unfinished_failure(channel: ConfirmationChannel, stop: Option<GatherStop>) -> ChannelFailure {
    match stop {
        Some(GatherStop::Cancelled) => ChannelFailure::new(
            ChannelErrorKind::Cancelled,
            format!("{channel} attempt cancelled before completion"),
        ),
        Some(GatherStop::Deadline) => ChannelFailure::timeout(format!(
            "{channel} attempt exceeded the dispatch deadline"
        )),
        _ => ChannelFailure::provider(format!("{channel} attempt ended without an outcome")),
    }
}
