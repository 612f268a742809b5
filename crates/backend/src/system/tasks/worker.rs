use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};
use uuid::Uuid;

use super::registry::TaskManagerRegistry;

/// Фоновый воркер: запускает все зарегистрированные задачи с фиксированным интервалом.
pub struct ScheduledTaskWorker {
    registry: Arc<TaskManagerRegistry>,
    interval_seconds: u64,
}

impl ScheduledTaskWorker {
    pub fn new(registry: Arc<TaskManagerRegistry>, interval_seconds: u64) -> Self {
        Self {
            registry,
            interval_seconds,
        }
    }

    /// Запускает цикл выполнения задач.
    /// Запуски ожидаются внутри цикла, поэтому один процесс не пересекается сам с собой.
    pub async fn run_loop(&self) {
        info!(
            "Scheduled task worker started with interval {} seconds",
            self.interval_seconds
        );
        let mut interval = time::interval(time::Duration::from_secs(self.interval_seconds.max(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.run_once().await;
        }
    }

    /// Один проход по всем задачам. Возвращает число упавших задач.
    pub async fn run_once(&self) -> usize {
        let mut failed = 0;
        for manager in self.registry.all() {
            let session_id = Uuid::new_v4().to_string();
            info!("Running task '{}' (session {})", manager.task_type(), session_id);
            match manager.run(&session_id).await {
                Ok(()) => info!(
                    "Task '{}' session {} completed successfully",
                    manager.task_type(),
                    session_id
                ),
                Err(e) => {
                    failed += 1;
                    error!(
                        "Task '{}' session {} failed: {:?}",
                        manager.task_type(),
                        session_id,
                        e
                    );
                }
            }
        }
        failed
    }
}
