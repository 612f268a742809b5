use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Открывает (создает при необходимости) файл БД и приводит схему к актуальной
pub async fn connect(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Initialize the process-wide connection used by the binary
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<&'static DatabaseConnection> {
    let conn = connect(db_file).await?;
    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    get_connection()
}

pub fn get_connection() -> anyhow::Result<&'static DatabaseConnection> {
    DB_CONN
        .get()
        .ok_or_else(|| anyhow::anyhow!("Database connection has not been initialized"))
}

async fn table_exists<C: ConnectionTrait>(conn: &C, table_name: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
            [table_name.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

async fn ensure_table<C: ConnectionTrait>(
    conn: &C,
    table_name: &str,
    create_sql: &str,
) -> anyhow::Result<()> {
    if table_exists(conn, table_name).await? {
        return Ok(());
    }
    tracing::info!("Creating {} table", table_name);
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        create_sql.to_string(),
    ))
    .await?;
    Ok(())
}

/// Ensure required tables exist (idempotent schema bootstrap)
pub async fn bootstrap_schema<C: ConnectionTrait>(conn: &C) -> anyhow::Result<()> {
    // a001_product
    ensure_table(
        conn,
        "a001_product",
        r#"
            CREATE TABLE a001_product (
                id TEXT PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                status TEXT NOT NULL DEFAULT 'ACTIVE',
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    )
    .await?;

    // a002_product_variant: (product_id, color_name, size) уникален
    ensure_table(
        conn,
        "a002_product_variant",
        r#"
            CREATE TABLE a002_product_variant (
                id TEXT PRIMARY KEY NOT NULL,
                product_id TEXT NOT NULL REFERENCES a001_product(id),
                color_name TEXT NOT NULL DEFAULT '',
                color_code TEXT NOT NULL DEFAULT '',
                size TEXT NOT NULL DEFAULT '',
                stock INTEGER NOT NULL DEFAULT 0,
                price TEXT NOT NULL DEFAULT '0',
                image TEXT NOT NULL DEFAULT '',
                is_deleted INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
        "#,
    )
    .await?;

    // a003_order / a003_order_item: журнал продаж, только вставка
    ensure_table(
        conn,
        "a003_order",
        r#"
            CREATE TABLE a003_order (
                id TEXT PRIMARY KEY NOT NULL,
                user_id TEXT NOT NULL,
                total TEXT NOT NULL DEFAULT '0',
                created_at TEXT NOT NULL
            );
        "#,
    )
    .await?;

    ensure_table(
        conn,
        "a003_order_item",
        r#"
            CREATE TABLE a003_order_item (
                id TEXT PRIMARY KEY NOT NULL,
                order_id TEXT NOT NULL REFERENCES a003_order(id),
                qty INTEGER NOT NULL DEFAULT 0,
                price TEXT NOT NULL DEFAULT '0'
            );
        "#,
    )
    .await?;

    // p001_order_summary: не более одной строки
    ensure_table(
        conn,
        "p001_order_summary",
        r#"
            CREATE TABLE p001_order_summary (
                id INTEGER PRIMARY KEY NOT NULL CHECK (id = 1),
                total_orders INTEGER NOT NULL DEFAULT 0,
                total_units INTEGER NOT NULL DEFAULT 0,
                total_amount TEXT NOT NULL DEFAULT '0',
                last_updated TEXT NOT NULL,
                watermark TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 0
            );
        "#,
    )
    .await?;

    let indexes = [
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_a001_product_title ON a001_product (title);",
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_a002_variant_key \
         ON a002_product_variant (product_id, color_name, size);",
        "CREATE INDEX IF NOT EXISTS idx_a003_order_created_at ON a003_order (created_at);",
        "CREATE INDEX IF NOT EXISTS idx_a003_order_item_order_id ON a003_order_item (order_id);",
    ];
    for sql in indexes {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }

    Ok(())
}
