use contracts::usecases::u001_import_products_csv::ImportReport;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    /// В заголовке нет обязательных колонок (ни одна строка не обработана)
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("invalid value '{value}' in column '{column}' at line {line}")]
    InvalidValue {
        line: u64,
        column: &'static str,
        value: String,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] DbErr),
}

impl ImportError {
    /// Номер строки файла, на которой остановился импорт (если известен)
    pub fn line(&self) -> Option<u64> {
        match self {
            ImportError::InvalidValue { line, .. } => Some(*line),
            ImportError::Csv(e) => e.position().map(|p| p.line()),
            _ => None,
        }
    }
}

/// Ошибка импорта вместе с частичным отчетом: пачки, закоммиченные до ошибки, остаются в БД
#[derive(Debug, Error)]
#[error("{error}")]
pub struct ImportFailure {
    #[source]
    pub error: ImportError,
    pub report: ImportReport,
}
