use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Текущий прогресс импорта (для real-time мониторинга)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportProgress {
    pub session_id: String,
    pub file_name: Option<String>,
    pub status: ImportStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Последнее обновление прогресса
    pub updated_at: DateTime<Utc>,

    pub processed: usize,
    pub inserted: usize,
    pub skipped: usize,

    /// Ошибки импорта
    pub errors: Vec<ImportErrorEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// Импорт запущен
    Running,

    /// Импорт завершен успешно
    Completed,

    /// Импорт провален (закоммиченные пачки остаются)
    Failed,
}

/// Ошибка импорта
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportErrorEntry {
    pub message: String,
    pub line: Option<u64>,
    pub occurred_at: DateTime<Utc>,
}

impl ImportProgress {
    pub fn new(session_id: String, file_name: Option<String>) -> Self {
        Self {
            session_id,
            file_name,
            status: ImportStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            updated_at: Utc::now(),
            processed: 0,
            inserted: 0,
            skipped: 0,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, message: String, line: Option<u64>) {
        self.errors.push(ImportErrorEntry {
            message,
            line,
            occurred_at: Utc::now(),
        });
    }
}
