use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecomputeError {
    #[error("store error: {0}")]
    Store(#[from] DbErr),

    /// Строку сводки успел переписать параллельный запуск
    #[error("order summary was updated concurrently (expected version {expected})")]
    ConcurrentUpdate { expected: i32 },

    #[error("corrupt monetary value in {source_table}: '{value}'")]
    CorruptAmount {
        source_table: &'static str,
        value: String,
    },

    #[error("order summary row is missing after initialization")]
    SummaryMissing,
}
