use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - stdout (с цветами)
/// - `<log_dir>/backend.log` (без цветов)
///
/// `RUST_LOG` имеет приоритет над уровнем из конфигурации.
pub fn initialize(log_dir: &Path, default_level: &str) -> anyhow::Result<()> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        eprintln!("✗ ERROR: Cannot create log directory {}: {}", log_dir.display(), e);
        return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
    }

    let log_file_path = log_dir.join("backend.log");
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("✗ ERROR: Cannot open log file {}: {}", log_file_path.display(), e);
            return Err(anyhow::anyhow!("Cannot open log file: {}", e));
        }
    };

    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.to_string());

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(log_level))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .try_init()?;

    Ok(())
}
