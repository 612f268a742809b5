use anyhow::Result;
use async_trait::async_trait;
use contracts::projections::p001_order_summary::WatermarkPolicy;
use sea_orm::DatabaseConnection;

use crate::projections::p001_order_summary::service;
use crate::system::tasks::manager::TaskManager;

/// Менеджер периодического пересчета сводки заказов (p001)
pub struct P001RecomputeSummaryManager {
    db: DatabaseConnection,
    policy: WatermarkPolicy,
}

impl P001RecomputeSummaryManager {
    pub fn new(db: DatabaseConnection, policy: WatermarkPolicy) -> Self {
        Self { db, policy }
    }
}

#[async_trait]
impl TaskManager for P001RecomputeSummaryManager {
    fn task_type(&self) -> &'static str {
        "p001_recompute_summary"
    }

    async fn run(&self, session_id: &str) -> Result<()> {
        let outcome = service::recompute(&self.db, self.policy).await?;
        tracing::debug!(
            "Session {}: summary now {} orders / {} units / {}",
            session_id,
            outcome.summary.total_orders,
            outcome.summary.total_units,
            outcome.summary.total_amount
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::testing::setup_db;

    #[tokio::test]
    async fn run_creates_and_advances_summary() {
        let db = setup_db().await;
        let manager = P001RecomputeSummaryManager::new(db.conn.clone(), WatermarkPolicy::default());

        manager.run("s1").await.unwrap();
        manager.run("s2").await.unwrap();

        let summary = service::get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.version, 2);
    }
}
