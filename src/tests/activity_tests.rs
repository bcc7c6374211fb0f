//! tests/activity_tests.rs
//! Pruebas de la bitácora y de las tareas desacopladas.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use actix_rt::test;
    use anyhow::anyhow;

    use crate::models::activity_model::ActivityLogEntry;
    use crate::models::confirmation_model::{
        ChannelFailure, ChannelOutcome, ConfirmationChannel, DispatchResult,
    };
    use crate::services::activity_service::ActivityService;
    use crate::services::detached_task::DetachedTasks;
    use crate::tests::support::{activity_rows, test_pool};

    #[test]
    async fn test_spawn_does_not_wait_for_the_task() {
        let tasks = DetachedTasks::new();

        let start = Instant::now();
        tasks.spawn("slow", async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok::<(), anyhow::Error>(())
        });
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(tasks.pending(), 1);

        assert!(!tasks.drain(Duration::from_millis(10)).await);
        assert!(tasks.drain(Duration::from_secs(2)).await);
        assert_eq!(tasks.pending(), 0);
        assert_eq!(tasks.failures(), 0);
    }

    #[test]
    async fn test_failures_are_counted_not_returned() {
        let tasks = DetachedTasks::new();
        tasks.spawn("broken", async { Err::<(), _>(anyhow!("disk full")) });
        tasks.spawn("fine", async { Ok::<(), anyhow::Error>(()) });

        assert!(tasks.drain(Duration::from_secs(2)).await);
        assert_eq!(tasks.spawned(), 2);
        assert_eq!(tasks.failures(), 1);
    }

    #[test]
    async fn test_panicking_task_is_not_left_pending() {
        let tasks = DetachedTasks::new();
        #[allow(unreachable_code)]
        let task = async {
            panic!("boom");
            Ok::<(), anyhow::Error>(())
        };
        tasks.spawn("panics", task);

        assert!(tasks.drain(Duration::from_secs(2)).await);
        assert_eq!(tasks.pending(), 0);
        assert_eq!(tasks.spawned(), 1);
    }

    #[test]
    async fn test_record_writes_entry() {
        let pool = test_pool().await;
        let activity = ActivityService::new(pool.clone());

        let result = DispatchResult::new(
            "J30".to_string(),
            vec![
                ChannelOutcome::succeeded(ConfirmationChannel::Voice, "CA30".to_string()),
                ChannelOutcome::failed(
                    ConfirmationChannel::Sms,
                    ChannelFailure::invalid_destination("status 400: invalid To"),
                ),
            ],
        );
        activity.record(ActivityLogEntry::for_dispatch(&result));

        assert!(activity.drain(Duration::from_secs(2)).await);
        let rows = activity_rows(&pool).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].detail,
            "voice=ok(CA30); sms=InvalidDestination(status 400: invalid To)"
        );
        assert_eq!(rows[0].job_id.as_deref(), Some("J30"));
        assert!(rows[0].error.is_none());
        assert_eq!(activity.failures(), 0);
    }

    #[test]
    async fn test_entry_for_empty_dispatch() {
        let result = DispatchResult::new("J31".to_string(), vec![]);
        let entry = ActivityLogEntry::for_dispatch(&result);

        assert_eq!(entry.actor_id, "system");
        assert_eq!(entry.actor_name, "Confirmation Dispatcher");
        assert_eq!(entry.module, "confirmation");
        assert!(entry.detail.contains("no applicable channels"));
        assert_eq!(entry.error.as_deref(), Some("no confirmation channel attempted"));
    }
}
