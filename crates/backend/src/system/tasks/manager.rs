use anyhow::Result;
use async_trait::async_trait;

/// Трейт для менеджеров периодических задач
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Возвращает тип задачи, который обрабатывает этот менеджер.
    fn task_type(&self) -> &'static str;

    /// Запускает выполнение задачи.
    /// `session_id`: Уникальный идентификатор текущей сессии выполнения.
    async fn run(&self, session_id: &str) -> Result<()>;
}
