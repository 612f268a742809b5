use contracts::usecases::u001_import_products_csv::{ImportProgress, ImportStatus};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Трекер прогресса импорта (in-memory, для real-time мониторинга)
#[derive(Clone)]
pub struct ProgressTracker {
    sessions: Arc<RwLock<HashMap<String, ImportProgress>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Создать новую сессию импорта
    pub fn create_session(&self, session_id: String, file_name: Option<String>) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(
                session_id.clone(),
                ImportProgress::new(session_id, file_name),
            );
        }
    }

    /// Получить текущий прогресс сессии
    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        let sessions = self.sessions.read().ok()?;
        sessions.get(session_id).cloned()
    }

    /// Обновить счетчики сессии
    pub fn update_counters(&self, session_id: &str, processed: usize, inserted: usize, skipped: usize) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(progress) = sessions.get_mut(session_id) {
                progress.processed = processed;
                progress.inserted = inserted;
                progress.skipped = skipped;
                progress.updated_at = chrono::Utc::now();
            }
        }
    }

    /// Добавить ошибку
    pub fn add_error(&self, session_id: &str, message: String, line: Option<u64>) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(progress) = sessions.get_mut(session_id) {
                progress.add_error(message, line);
                progress.updated_at = chrono::Utc::now();
            }
        }
    }

    /// Завершить сессию импорта
    pub fn complete_session(&self, session_id: &str, status: ImportStatus) {
        if let Ok(mut sessions) = self.sessions.write() {
            if let Some(progress) = sessions.get_mut(session_id) {
                progress.status = status;
                progress.completed_at = Some(chrono::Utc::now());
                progress.updated_at = chrono::Utc::now();
            }
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
