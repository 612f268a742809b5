use anyhow::Result;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::shared::config::Config;

use super::{
    managers::P001RecomputeSummaryManager, registry::TaskManagerRegistry,
    worker::ScheduledTaskWorker,
};

/// Инициализирует реестр задач и фоновый воркер.
pub fn initialize_scheduled_tasks(db: &DatabaseConnection, config: &Config) -> Result<ScheduledTaskWorker> {
    let mut registry = TaskManagerRegistry::new();

    // Register P001 order summary recompute manager
    registry.register(P001RecomputeSummaryManager::new(
        db.clone(),
        config.aggregator.watermark_policy,
    ));

    if registry.is_empty() {
        anyhow::bail!("No scheduled task managers registered");
    }

    let worker = ScheduledTaskWorker::new(Arc::new(registry), config.aggregator.interval_seconds);
    Ok(worker)
}
