use contracts::projections::p001_order_summary::WatermarkPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Переменная окружения, переопределяющая путь к БД
pub const DATABASE_PATH_ENV: &str = "ORDER_SUMMARY_DATABASE_PATH";

/// Максимальный размер пачки вариантов в одной транзакции
pub const MAX_BATCH_SIZE: usize = 1000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub importer: ImporterConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    #[serde(default)]
    pub watermark_policy: WatermarkPolicy,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            watermark_policy: WatermarkPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImporterConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            level: default_log_level(),
        }
    }
}

fn default_interval_seconds() -> u64 {
    120
}

fn default_batch_size() -> usize {
    100
}

fn default_log_dir() -> String {
    "target/logs".to_string()
}

fn default_log_level() -> String {
    "info,sqlx=warn,sea_orm=warn".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[aggregator]
interval_seconds = 120
watermark_policy = "max_created_at"

[importer]
batch_size = 100

[logging]
dir = "target/logs"
level = "info,sqlx=warn,sea_orm=warn"
"#;

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.database.path.trim().is_empty() {
            anyhow::bail!("database.path must not be empty");
        }
        if self.aggregator.interval_seconds == 0 {
            anyhow::bail!("aggregator.interval_seconds must be greater than 0");
        }
        validate_batch_size(self.importer.batch_size)?;
        Ok(())
    }
}

pub fn validate_batch_size(batch_size: usize) -> anyhow::Result<()> {
    if batch_size == 0 || batch_size > MAX_BATCH_SIZE {
        anyhow::bail!(
            "importer.batch_size must be in 1..={}, got {}",
            MAX_BATCH_SIZE,
            batch_size
        );
    }
    Ok(())
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration
///
/// Search order:
/// 1. Explicit path (`--config`)
/// 2. config.toml next to the executable
/// 3. Embedded default config
///
/// `ORDER_SUMMARY_DATABASE_PATH` overrides `database.path` in every case.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = match find_config_file(explicit)? {
        Some(config_path) => {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            parse_config(&contents)?
        }
        None => {
            tracing::info!("Using default embedded configuration");
            parse_config(DEFAULT_CONFIG)?
        }
    };

    if let Ok(path) = std::env::var(DATABASE_PATH_ENV) {
        if !path.trim().is_empty() {
            tracing::info!("Database path overridden by {}", DATABASE_PATH_ENV);
            config.database.path = path;
        }
    }

    Ok(config)
}

fn find_config_file(explicit: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }

    // Try to find config.toml next to the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");
            if config_path.exists() {
                return Ok(Some(config_path));
            }
            tracing::warn!("config.toml not found at: {}", config_path.display());
        }
    }

    Ok(None)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> PathBuf {
    let db_path = Path::new(&config.database.path);

    // If absolute path, use as is
    if db_path.is_absolute() {
        return db_path.to_path_buf();
    }

    // If relative path, resolve it relative to the executable directory
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(db_path);
        }
    }

    // Fallback: use relative to current directory
    PathBuf::from(&config.database.path)
}
