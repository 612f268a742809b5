use serde::{Deserialize, Serialize};

/// Запрос на импорт товаров из CSV, уже сохраненного загрузчиком
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRequest {
    /// Путь к CSV файлу
    pub file_path: String,

    /// Размер пачки вариантов на одну транзакцию (None = значение из конфигурации)
    #[serde(default)]
    pub batch_size: Option<usize>,
}
