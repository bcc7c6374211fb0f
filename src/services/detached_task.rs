//! services/detached_task.rs
//! Tareas "fire-and-forget": su vida no depende del request que las lanza.
//! Los errores se registran en el log y en un contador, nunca se devuelven.

use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::{sync::Notify, task::JoinHandle, time::Instant};

#[derive(Clone, Default)]
pub struct DetachedTasks {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    pending: AtomicUsize,
    spawned: AtomicU64,
    failures: AtomicU64,
    idle: Notify,
}

impl DetachedTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lanza `fut` sin esperarla. El handle se puede ignorar.
    pub fn spawn<F, E>(&self, label: &'static str, fut: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let inner = self.inner.clone();
        inner.pending.fetch_add(1, Ordering::SeqCst);
        inner.spawned.fetch_add(1, Ordering::SeqCst);

        tokio::spawn(async move {
            // se libera aunque la tarea haga panic
            let guard = PendingGuard(inner);
            if let Err(e) = fut.await {
                guard.0.failures.fetch_add(1, Ordering::SeqCst);
                log::error!("({}) Tarea en segundo plano falló: {}", label, e);
            }
        })
    }

    pub fn pending(&self) -> usize {
        self.inner.pending.load(Ordering::SeqCst)
    }

    pub fn spawned(&self) -> u64 {
        self.inner.spawned.load(Ordering::SeqCst)
    }

    pub fn failures(&self) -> u64 {
        self.inner.failures.load(Ordering::SeqCst)
    }

    /// Espera a que no queden tareas pendientes, como máximo `wait`.
    /// Devuelve `false` si se agotó el tiempo.
    pub async fn drain(&self, wait: Duration) -> bool {
        let deadline = Instant::now() + wait;
        loop {
            // registrar el waiter antes de leer el contador
            let notified = self.inner.idle.notified();
            if self.pending() == 0 {
                return true;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.pending() == 0;
            }
        }
    }
}

struct PendingGuard(Arc<Inner>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.pending.fetch_sub(1, Ordering::SeqCst);
        self.0.idle.notify_waiters();
    }
}
