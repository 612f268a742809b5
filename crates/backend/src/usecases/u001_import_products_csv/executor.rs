use super::csv_row::{ColumnIndex, ProductRow};
use super::error::{ImportError, ImportFailure};
use super::pending_batch::PendingBatch;
use super::progress_tracker::ProgressTracker;
use crate::domain::{a001_product, a002_product_variant};
use crate::shared::config::MAX_BATCH_SIZE;
use contracts::domain::a001_product::ProductId;
use contracts::domain::a002_product_variant::ProductVariant;
use contracts::usecases::u001_import_products_csv::{
    ImportProgress, ImportReport, ImportRequest, ImportStatus, SkipReason, SkippedRow,
};
use csv::{ReaderBuilder, StringRecord, Trim};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Состояние одного запуска импорта
struct ImportRun {
    session_id: String,
    batch_size: usize,
    report: ImportReport,
    batch: PendingBatch,
    /// title -> product_id, товары, уже встреченные в этом файле
    products: HashMap<String, ProductId>,
}

impl ImportRun {
    fn new(session_id: String, batch_size: usize) -> Self {
        Self {
            session_id,
            batch_size,
            report: ImportReport::default(),
            batch: PendingBatch::new(),
            products: HashMap::new(),
        }
    }

    fn skip(&mut self, line: u64, reason: SkipReason) {
        tracing::debug!("Skipping line {}: {:?}", line, reason);
        self.report.skipped.push(SkippedRow { line, reason });
    }
}

/// Executor для UseCase импорта товаров из CSV
#[derive(Clone)]
pub struct ImportExecutor {
    db: DatabaseConnection,
    progress_tracker: Arc<ProgressTracker>,
    batch_size: usize,
}

impl ImportExecutor {
    pub fn new(
        db: DatabaseConnection,
        progress_tracker: Arc<ProgressTracker>,
        batch_size: usize,
    ) -> Self {
        Self {
            db,
            progress_tracker,
            batch_size: clamp_batch_size(batch_size),
        }
    }

    /// Получить текущий прогресс импорта
    pub fn get_progress(&self, session_id: &str) -> Option<ImportProgress> {
        self.progress_tracker.get_progress(session_id)
    }

    /// Запустить импорт в фоне, вернуть session_id для отслеживания прогресса
    pub fn start_import(&self, request: ImportRequest) -> String {
        let session_id = Uuid::new_v4().to_string();
        let executor = self.clone();
        let session_id_clone = session_id.clone();

        tokio::spawn(async move {
            if let Err(failure) = executor.execute_in_session(session_id_clone, &request).await {
                tracing::error!("Background import of {} failed: {}", request.file_path, failure);
            }
        });

        session_id
    }

    /// Выполнить импорт по запросу и дождаться результата
    pub async fn execute(&self, request: &ImportRequest) -> Result<ImportReport, ImportFailure> {
        self.execute_in_session(Uuid::new_v4().to_string(), request)
            .await
    }

    pub async fn import_file(&self, path: &Path) -> Result<ImportReport, ImportFailure> {
        self.execute(&ImportRequest {
            file_path: path.to_string_lossy().to_string(),
            batch_size: None,
        })
        .await
    }

    /// Импорт из произвольного источника (файл, буфер в памяти)
    pub async fn import_reader<R: Read>(&self, reader: R) -> Result<ImportReport, ImportFailure> {
        let session_id = Uuid::new_v4().to_string();
        self.run_session(session_id, None, self.batch_size, reader)
            .await
    }

    async fn execute_in_session(
        &self,
        session_id: String,
        request: &ImportRequest,
    ) -> Result<ImportReport, ImportFailure> {
        let path = Path::new(&request.file_path);
        let file_name = path.file_name().map(|n| n.to_string_lossy().to_string());
        let batch_size = request
            .batch_size
            .map(clamp_batch_size)
            .unwrap_or(self.batch_size);

        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) => {
                self.progress_tracker
                    .create_session(session_id.clone(), file_name);
                self.progress_tracker
                    .add_error(&session_id, format!("Cannot open file: {}", e), None);
                self.progress_tracker
                    .complete_session(&session_id, ImportStatus::Failed);
                tracing::error!("Cannot open {}: {}", request.file_path, e);
                return Err(ImportFailure {
                    error: ImportError::Io(e),
                    report: ImportReport::default(),
                });
            }
        };

        self.run_session(session_id, file_name, batch_size, file)
            .await
    }

    async fn run_session<R: Read>(
        &self,
        session_id: String,
        file_name: Option<String>,
        batch_size: usize,
        reader: R,
    ) -> Result<ImportReport, ImportFailure> {
        self.progress_tracker
            .create_session(session_id.clone(), file_name.clone());
        tracing::info!(
            "Starting product CSV import (session {}, file {}, batch size {})",
            session_id,
            file_name.as_deref().unwrap_or("<reader>"),
            batch_size
        );

        let mut run = ImportRun::new(session_id, batch_size);
        let result = self.run_import(reader, &mut run).await;
        self.report_progress(&run);

        match result {
            Ok(()) => {
                self.progress_tracker
                    .complete_session(&run.session_id, ImportStatus::Completed);
                tracing::info!(
                    "Import completed for session {}: rows={}, products_created={}, variants_created={}, batches={}, skipped={}",
                    run.session_id,
                    run.report.rows_read,
                    run.report.products_created,
                    run.report.variants_created,
                    run.report.batches_committed,
                    run.report.skipped.len()
                );
                Ok(run.report)
            }
            Err(error) => {
                if !run.batch.is_empty() {
                    tracing::warn!(
                        "Discarding {} staged variants of session {}",
                        run.batch.len(),
                        run.session_id
                    );
                    run.batch.clear();
                }
                tracing::error!("Import failed for session {}: {}", run.session_id, error);
                self.progress_tracker
                    .add_error(&run.session_id, error.to_string(), error.line());
                self.progress_tracker
                    .complete_session(&run.session_id, ImportStatus::Failed);
                Err(ImportFailure {
                    error,
                    report: run.report,
                })
            }
        }
    }

    async fn run_import<R: Read>(&self, reader: R, run: &mut ImportRun) -> Result<(), ImportError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

        let mut record = StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            run.report.rows_read += 1;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(run.report.rows_read as u64 + 1);

            let row = ProductRow::parse(&record, line, &columns)?;
            self.process_row(row, run).await?;

            if run.batch.len() >= run.batch_size {
                self.flush(run).await?;
            }
            self.report_progress(run);
        }

        self.flush(run).await
    }

    /// Обработать одну строку: товар -> вариант -> пачка
    async fn process_row(&self, row: ProductRow, run: &mut ImportRun) -> Result<(), ImportError> {
        if !row.has_title() {
            run.skip(row.line, SkipReason::BlankTitle);
            return Ok(());
        }

        let product_id = self.resolve_product(&row.title, run).await?;
        let variant = ProductVariant::new_for_insert(
            product_id,
            row.color_name,
            row.color_code,
            row.size,
            row.stock,
            row.price,
            row.image,
        );

        let key = variant.key();
        if run.batch.contains(&key)
            || a002_product_variant::repository::exists_by_key(&self.db, &key).await?
        {
            run.skip(row.line, SkipReason::DuplicateVariant);
            return Ok(());
        }

        run.batch.stage(variant);
        Ok(())
    }

    async fn resolve_product(&self, title: &str, run: &mut ImportRun) -> Result<ProductId, ImportError> {
        if let Some(id) = run.products.get(title) {
            return Ok(*id);
        }

        let resolved = a001_product::service::find_or_create_by_title(&self.db, title).await?;
        if resolved.created {
            run.report.products_created += 1;
        }
        run.products.insert(title.to_string(), resolved.product.id);
        Ok(resolved.product.id)
    }

    /// Вставить накопленную пачку одной транзакцией
    async fn flush(&self, run: &mut ImportRun) -> Result<(), ImportError> {
        if run.batch.is_empty() {
            return Ok(());
        }

        let txn = self.db.begin().await?;
        if let Err(e) = a002_product_variant::repository::insert_many(&txn, run.batch.variants()).await {
            txn.rollback().await?;
            return Err(e.into());
        }
        txn.commit().await?;

        run.report.variants_created += run.batch.len();
        run.report.batches_committed += 1;
        tracing::debug!(
            "Committed batch #{} ({} variants) for session {}",
            run.report.batches_committed,
            run.batch.len(),
            run.session_id
        );
        run.batch.clear();
        Ok(())
    }

    fn report_progress(&self, run: &ImportRun) {
        self.progress_tracker.update_counters(
            &run.session_id,
            run.report.rows_read,
            run.report.variants_created,
            run.report.skipped.len(),
        );
    }
}

fn clamp_batch_size(batch_size: usize) -> usize {
    let clamped = batch_size.clamp(1, MAX_BATCH_SIZE);
    if clamped != batch_size {
        tracing::warn!("Batch size {} is out of range, using {}", batch_size, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::testing::setup_db;
    use rust_decimal::Decimal;
    use std::fmt::Write as _;
    use std::time::Duration;

    const HEADER: &str = "title,colorName,colorCode,size,stock,price,image\n";

    fn executor(db: &DatabaseConnection, batch_size: usize) -> ImportExecutor {
        ImportExecutor::new(db.clone(), Arc::new(ProgressTracker::new()), batch_size)
    }

    /// `rows` строк с разными вариантами, 10 разных товаров
    fn catalog(rows: usize, bad_price_at: Option<usize>) -> String {
        let mut csv = HEADER.to_string();
        for i in 1..=rows {
            let price = if Some(i) == bad_price_at {
                "abc".to_string()
            } else {
                format!("{}.99", i)
            };
            let _ = writeln!(
                csv,
                "Product {},Black,#000000,S{},{},{},/img/{}.png",
                i % 10,
                i,
                i % 7,
                price,
                i
            );
        }
        csv
    }

    async fn variant_count(db: &DatabaseConnection) -> u64 {
        a002_product_variant::repository::count_all(db).await.unwrap()
    }

    #[tokio::test]
    async fn second_run_skips_everything() {
        let db = setup_db().await;
        let exec = executor(&db.conn, 100);
        let csv = catalog(25, None);

        let first = exec.import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(first.rows_read, 25);
        assert_eq!(first.products_created, 10);
        assert_eq!(first.variants_created, 25);
        assert_eq!(first.batches_committed, 1);
        assert!(first.skipped.is_empty());

        let second = exec.import_reader(csv.as_bytes()).await.unwrap();
        assert_eq!(second.products_created, 0);
        assert_eq!(second.variants_created, 0);
        assert_eq!(second.batches_committed, 0);
        assert_eq!(second.skipped_count(SkipReason::DuplicateVariant), 25);
        assert_eq!(variant_count(&db.conn).await, 25);
    }

    #[tokio::test]
    async fn duplicate_rows_in_one_batch_yield_one_variant() {
        let db = setup_db().await;
        let csv = format!(
            "{HEADER}Hoodie,Red,#f00,M,3,49.90,/r.png\nHoodie,Red,#f00,M,3,49.90,/r.png\nHoodie,Red,#f00,L,1,49.90,/r.png\n"
        );
        let report = executor(&db.conn, 100)
            .import_reader(csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.products_created, 1);
        assert_eq!(report.variants_created, 2);
        assert_eq!(
            report.skipped,
            vec![SkippedRow {
                line: 3,
                reason: SkipReason::DuplicateVariant
            }]
        );
    }

    #[tokio::test]
    async fn failed_run_keeps_committed_batches_and_resumes() {
        let db = setup_db().await;
        let exec = executor(&db.conn, 100);

        let failure = exec
            .import_reader(catalog(200, Some(150)).as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(
            failure.error,
            ImportError::InvalidValue { line: 151, column: "price", .. }
        ));
        assert_eq!(failure.report.rows_read, 150);
        assert_eq!(failure.report.variants_created, 100);
        assert_eq!(failure.report.batches_committed, 1);
        assert_eq!(variant_count(&db.conn).await, 100);

        let resumed = exec
            .import_reader(catalog(200, None).as_bytes())
            .await
            .unwrap();
        assert_eq!(resumed.skipped_count(SkipReason::DuplicateVariant), 100);
        assert_eq!(resumed.variants_created, 100);
        assert_eq!(resumed.products_created, 0);
        assert_eq!(variant_count(&db.conn).await, 200);
    }

    #[tokio::test]
    async fn missing_columns_abort_before_any_write() {
        let db = setup_db().await;
        let csv = "title,colorName,size,price\nShirt,Blue,M,10\n";
        let failure = executor(&db.conn, 100)
            .import_reader(csv.as_bytes())
            .await
            .unwrap_err();

        match &failure.error {
            ImportError::MissingColumns(missing) => {
                assert_eq!(missing, &vec!["colorCode", "stock", "image"])
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(failure.report, ImportReport::default());
        assert!(a001_product::repository::list_all(&db.conn)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn blank_titles_are_skipped_and_empty_numbers_default() {
        let db = setup_db().await;
        let csv = format!(
            "\u{feff}{HEADER}  ,Blue,#00f,M,1,1.00,/b.png\nScarf,Blue,#00f,,,,\n"
        );
        let report = executor(&db.conn, 100)
            .import_reader(csv.as_bytes())
            .await
            .unwrap();

        assert_eq!(report.rows_read, 2);
        assert_eq!(report.skipped_count(SkipReason::BlankTitle), 1);
        assert_eq!(report.variants_created, 1);

        let product = a001_product::repository::find_by_title(&db.conn, "Scarf")
            .await
            .unwrap()
            .unwrap();
        let variants = a002_product_variant::repository::list_by_product(&db.conn, product.id)
            .await
            .unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].stock, 0);
        assert_eq!(variants[0].price, Decimal::ZERO);
        assert_eq!(variants[0].size, "");
    }

    #[tokio::test]
    async fn negative_stock_stops_the_run() {
        let db = setup_db().await;
        let csv = format!("{HEADER}Belt,Brown,#840,90,-2,15.00,/belt.png\n");
        let failure = executor(&db.conn, 100)
            .import_reader(csv.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(
            failure.error,
            ImportError::InvalidValue { line: 2, column: "stock", .. }
        ));
        assert_eq!(variant_count(&db.conn).await, 0);
    }

    #[tokio::test]
    async fn small_batches_commit_separately() {
        let db = setup_db().await;
        let report = executor(&db.conn, 10)
            .import_reader(catalog(25, None).as_bytes())
            .await
            .unwrap();
        assert_eq!(report.batches_committed, 3);
        assert_eq!(report.variants_created, 25);
    }

    #[tokio::test]
    async fn background_import_reports_progress() {
        let db = setup_db().await;
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("products.csv");
        std::fs::write(&path, catalog(5, None)).unwrap();

        let exec = executor(&db.conn, 100);
        let session_id = exec.start_import(ImportRequest {
            file_path: path.to_string_lossy().to_string(),
            batch_size: Some(2),
        });

        let mut progress = None;
        for _ in 0..100 {
            match exec.get_progress(&session_id) {
                Some(p) if p.status != ImportStatus::Running => {
                    progress = Some(p);
                    break;
                }
                _ => tokio::time::sleep(Duration::from_millis(20)).await,
            }
        }

        let progress = progress.expect("import did not finish");
        assert_eq!(progress.status, ImportStatus::Completed);
        assert_eq!(progress.file_name.as_deref(), Some("products.csv"));
        assert_eq!(progress.processed, 5);
        assert_eq!(progress.inserted, 5);
        assert!(progress.errors.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let db = setup_db().await;
        let failure = executor(&db.conn, 100)
            .import_file(Path::new("/definitely/not/here.csv"))
            .await
            .unwrap_err();
        assert!(matches!(failure.error, ImportError::Io(_)));
    }
}
