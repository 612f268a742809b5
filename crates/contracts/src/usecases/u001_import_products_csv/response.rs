use serde::{Deserialize, Serialize};

/// Почему строка CSV была пропущена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Пустой title после trim
    BlankTitle,
    /// (товар, цвет, размер) уже есть в БД или в текущей пачке
    DuplicateVariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Номер строки в файле (заголовок = 1)
    pub line: u64,
    pub reason: SkipReason,
}

/// Итог импорта (при ошибке - частичный, на момент остановки)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub rows_read: usize,
    pub products_created: usize,
    pub variants_created: usize,
    pub batches_committed: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn skipped_count(&self, reason: SkipReason) -> usize {
        self.skipped.iter().filter(|s| s.reason == reason).count()
    }
}
