use super::error::RecomputeError;
use super::projection_builder;
use super::repository::{self, LedgerWindow};
use chrono::{DateTime, Utc};
use contracts::projections::p001_order_summary::{
    OrderSummary, RecomputeOutcome, SummaryDelta, WatermarkPolicy,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, DatabaseTransaction, TransactionTrait};

fn to_summary(model: repository::Model) -> Result<OrderSummary, RecomputeError> {
    let raw = model.total_amount.clone();
    OrderSummary::try_from(model).map_err(|_| RecomputeError::CorruptAmount {
        source_table: "p001_order_summary",
        value: raw,
    })
}

async fn load_summary<C: ConnectionTrait>(conn: &C) -> Result<OrderSummary, RecomputeError> {
    let model = repository::load(conn)
        .await?
        .ok_or(RecomputeError::SummaryMissing)?;
    to_summary(model)
}

/// Текущая сводка (None, если агрегатор еще ни разу не запускался)
pub async fn get_summary(db: &DatabaseConnection) -> Result<Option<OrderSummary>, RecomputeError> {
    match repository::load(db).await? {
        Some(model) => Ok(Some(to_summary(model)?)),
        None => Ok(None),
    }
}

/// Гарантирует наличие строки сводки. Вставка коммитится сразу,
/// параллельные первые запуски сходятся на одной строке.
pub async fn ensure_summary(db: &DatabaseConnection) -> Result<OrderSummary, RecomputeError> {
    if let Some(summary) = get_summary(db).await? {
        return Ok(summary);
    }
    if repository::insert_initial(db).await? > 0 {
        tracing::info!("Initialized order summary row");
    }
    load_summary(db).await
}

/// Записать новую сводку с проверкой версии
async fn write_summary<C: ConnectionTrait>(
    conn: &C,
    updated: &OrderSummary,
    expected_version: i32,
) -> Result<(), RecomputeError> {
    let rows = repository::save_if_version(conn, updated, expected_version).await?;
    if rows == 0 {
        return Err(RecomputeError::ConcurrentUpdate {
            expected: expected_version,
        });
    }
    Ok(())
}

async fn read_delta<C: ConnectionTrait>(
    conn: &C,
    window: &LedgerWindow,
) -> Result<SummaryDelta, RecomputeError> {
    let counts = repository::window_counts(conn, window).await?;
    let items = repository::window_items(conn, window).await?;
    let amount = projection_builder::fold_amount(&items)?;
    Ok(projection_builder::build_delta(counts, amount))
}

async fn window_max<C: ConnectionTrait>(
    conn: &C,
    window: &LedgerWindow,
    policy: WatermarkPolicy,
    delta: &SummaryDelta,
) -> Result<Option<DateTime<Utc>>, RecomputeError> {
    if policy != WatermarkPolicy::MaxCreatedAt || delta.orders == 0 {
        return Ok(None);
    }
    Ok(repository::window_max_created_at(conn, window).await?)
}

/// Инкрементальный пересчет внутри уже открытой транзакции
async fn recompute_in<C: ConnectionTrait>(
    conn: &C,
    policy: WatermarkPolicy,
    now: DateTime<Utc>,
) -> Result<RecomputeOutcome, RecomputeError> {
    let current = load_summary(conn).await?;
    let window = LedgerWindow::since(current.watermark, now);

    let delta = read_delta(conn, &window).await?;
    let max_created_at = window_max(conn, &window, policy, &delta).await?;
    let updated = projection_builder::apply_delta(&current, &delta, policy, max_created_at, now);

    write_summary(conn, &updated, current.version).await?;
    Ok(RecomputeOutcome {
        delta,
        summary: updated,
    })
}

async fn rebuild_in<C: ConnectionTrait>(
    conn: &C,
    policy: WatermarkPolicy,
    now: DateTime<Utc>,
) -> Result<RecomputeOutcome, RecomputeError> {
    let current = load_summary(conn).await?;
    let window = LedgerWindow::everything(now);

    let totals = read_delta(conn, &window).await?;
    let max_created_at = window_max(conn, &window, policy, &totals).await?;
    let updated =
        projection_builder::replace_totals(&current, &totals, policy, max_created_at, now);

    write_summary(conn, &updated, current.version).await?;
    Ok(RecomputeOutcome {
        delta: totals,
        summary: updated,
    })
}

async fn finish(
    txn: DatabaseTransaction,
    result: Result<RecomputeOutcome, RecomputeError>,
) -> Result<RecomputeOutcome, RecomputeError> {
    match result {
        Ok(outcome) => {
            txn.commit().await?;
            Ok(outcome)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Failed to roll back order summary update: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Один запуск агрегатора: свернуть заказы после watermark в итоги
pub async fn recompute(
    db: &DatabaseConnection,
    policy: WatermarkPolicy,
) -> Result<RecomputeOutcome, RecomputeError> {
    recompute_at(db, policy, Utc::now()).await
}

pub async fn recompute_at(
    db: &DatabaseConnection,
    policy: WatermarkPolicy,
    now: DateTime<Utc>,
) -> Result<RecomputeOutcome, RecomputeError> {
    ensure_summary(db).await?;

    let txn = db.begin().await?;
    let result = recompute_in(&txn, policy, now).await;
    match finish(txn, result).await {
        Ok(outcome) => {
            tracing::info!(
                "Order summary recomputed: +{} orders, +{} units, +{} amount (watermark {})",
                outcome.delta.orders,
                outcome.delta.units,
                outcome.delta.amount,
                outcome.summary.watermark.to_rfc3339()
            );
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Order summary recompute failed: {}", e);
            Err(e)
        }
    }
}

/// Полный пересчет сводки по всему журналу (замена итогов)
pub async fn rebuild(
    db: &DatabaseConnection,
    policy: WatermarkPolicy,
) -> Result<RecomputeOutcome, RecomputeError> {
    rebuild_at(db, policy, Utc::now()).await
}

pub async fn rebuild_at(
    db: &DatabaseConnection,
    policy: WatermarkPolicy,
    now: DateTime<Utc>,
) -> Result<RecomputeOutcome, RecomputeError> {
    ensure_summary(db).await?;

    let txn = db.begin().await?;
    let result = rebuild_in(&txn, policy, now).await;
    match finish(txn, result).await {
        Ok(outcome) => {
            tracing::info!(
                "Order summary rebuilt: {} orders, {} units, {} amount",
                outcome.summary.total_orders,
                outcome.summary.total_units,
                outcome.summary.total_amount
            );
            Ok(outcome)
        }
        Err(e) => {
            tracing::error!("Order summary rebuild failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a003_order::service::record_order;
    use crate::shared::data::db::testing::setup_db;
    use chrono::TimeZone;
    use contracts::domain::a003_order::Order;
    use contracts::projections::p001_order_summary::epoch_sentinel;
    use rust_decimal::Decimal;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    async fn order(db: &DatabaseConnection, created_at: DateTime<Utc>, items: &[(i32, i64)]) {
        let mut order = Order::new("user-1", created_at);
        for (qty, cents) in items {
            order = order.with_item(*qty, money(*cents));
        }
        record_order(db, &order).await.unwrap();
    }

    #[tokio::test]
    async fn first_run_folds_example_orders() {
        let db = setup_db().await;
        order(&db.conn, at(1, 10), &[(2, 1000)]).await;
        order(&db.conn, at(1, 11), &[(1, 500)]).await;

        let outcome = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(1, 12))
            .await
            .unwrap();
        assert_eq!(outcome.delta.orders, 2);
        assert_eq!(outcome.delta.units, 3);
        assert_eq!(outcome.delta.amount, money(2500));

        let summary = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_units, 3);
        assert_eq!(summary.total_amount, money(2500));
        assert_eq!(summary.watermark, at(1, 11));
        assert_eq!(summary.last_updated, at(1, 12));
        assert_eq!(summary.version, 1);
    }

    #[tokio::test]
    async fn empty_ledger_only_touches_last_updated() {
        let db = setup_db().await;
        assert!(get_summary(&db.conn).await.unwrap().is_none());

        let outcome = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(2, 8))
            .await
            .unwrap();
        assert!(outcome.delta.is_empty());

        let summary = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.total_orders, 0);
        assert_eq!(summary.total_amount, Decimal::ZERO);
        assert_eq!(summary.watermark, epoch_sentinel());
        assert_eq!(summary.last_updated, at(2, 8));

        recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(2, 9))
            .await
            .unwrap();
        let again = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(again.total_orders, 0);
        assert_eq!(again.last_updated, at(2, 9));
    }

    #[tokio::test]
    async fn two_windows_add_up() {
        let db = setup_db().await;
        order(&db.conn, at(3, 9), &[(1, 1000)]).await;
        recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(3, 10))
            .await
            .unwrap();

        order(&db.conn, at(3, 11), &[(4, 250), (1, 199)]).await;
        let second = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(3, 12))
            .await
            .unwrap();
        assert_eq!(second.delta.orders, 1);
        assert_eq!(second.delta.units, 5);
        assert_eq!(second.delta.amount, money(1199));

        let summary = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.total_orders, 2);
        assert_eq!(summary.total_units, 6);
        assert_eq!(summary.total_amount, money(2199));
    }

    #[tokio::test]
    async fn repeated_run_does_not_double_count() {
        let db = setup_db().await;
        order(&db.conn, at(4, 9), &[(2, 1000)]).await;
        recompute_at(&db.conn, WatermarkPolicy::WallClock, at(4, 10))
            .await
            .unwrap();
        let retry = recompute_at(&db.conn, WatermarkPolicy::WallClock, at(4, 10))
            .await
            .unwrap();
        assert!(retry.delta.is_empty());
        let summary = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.total_orders, 1);
        assert_eq!(summary.total_amount, money(2000));
    }

    #[tokio::test]
    async fn rolled_back_run_leaves_summary_untouched() {
        let db = setup_db().await;
        order(&db.conn, at(5, 9), &[(2, 1000)]).await;
        let before = ensure_summary(&db.conn).await.unwrap();

        let txn = db.conn.begin().await.unwrap();
        let outcome = recompute_in(&txn, WatermarkPolicy::MaxCreatedAt, at(5, 10))
            .await
            .unwrap();
        assert_eq!(outcome.delta.orders, 1);
        txn.rollback().await.unwrap();

        let after = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(after, before);

        let rerun = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(5, 10))
            .await
            .unwrap();
        assert_eq!(rerun.delta, outcome.delta);
        assert_eq!(rerun.summary, outcome.summary);
    }

    #[tokio::test]
    async fn stale_version_is_rejected() {
        let db = setup_db().await;
        let initial = ensure_summary(&db.conn).await.unwrap();
        recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(6, 10))
            .await
            .unwrap();

        // Запуск, прочитавший сводку до чужого коммита
        let stale = projection_builder::apply_delta(
            &initial,
            &SummaryDelta::default(),
            WatermarkPolicy::MaxCreatedAt,
            None,
            at(6, 11),
        );
        let err = write_summary(&db.conn, &stale, initial.version)
            .await
            .unwrap_err();
        assert!(matches!(err, RecomputeError::ConcurrentUpdate { expected: 0 }));

        let summary = get_summary(&db.conn).await.unwrap().unwrap();
        assert_eq!(summary.last_updated, at(6, 10));
        assert_eq!(summary.version, 1);
    }

    #[tokio::test]
    async fn backdated_order_under_each_policy() {
        // max_created_at: заказ, закоммиченный позже, но со временем до запуска, подхватывается
        let db = setup_db().await;
        order(&db.conn, at(7, 10), &[(1, 100)]).await;
        recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(7, 12))
            .await
            .unwrap();
        order(&db.conn, at(7, 11), &[(1, 100)]).await;
        let picked = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(7, 13))
            .await
            .unwrap();
        assert_eq!(picked.delta.orders, 1);
        assert_eq!(picked.summary.total_orders, 2);

        // wall_clock: тот же сценарий теряет заказ до rebuild
        let db = setup_db().await;
        order(&db.conn, at(7, 10), &[(1, 100)]).await;
        recompute_at(&db.conn, WatermarkPolicy::WallClock, at(7, 12))
            .await
            .unwrap();
        order(&db.conn, at(7, 11), &[(1, 100)]).await;
        let missed = recompute_at(&db.conn, WatermarkPolicy::WallClock, at(7, 13))
            .await
            .unwrap();
        assert_eq!(missed.delta.orders, 0);
        assert_eq!(missed.summary.total_orders, 1);

        let repaired = rebuild_at(&db.conn, WatermarkPolicy::WallClock, at(7, 14))
            .await
            .unwrap();
        assert_eq!(repaired.summary.total_orders, 2);
        assert_eq!(repaired.summary.total_amount, money(200));
    }

    #[tokio::test]
    async fn future_orders_wait_for_their_window() {
        let db = setup_db().await;
        order(&db.conn, at(8, 15), &[(3, 100)]).await;
        let early = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(8, 12))
            .await
            .unwrap();
        assert_eq!(early.delta.orders, 0);

        let later = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(8, 16))
            .await
            .unwrap();
        assert_eq!(later.delta.units, 3);
    }

    #[tokio::test]
    async fn rebuild_matches_incremental_totals() {
        let db = setup_db().await;
        order(&db.conn, at(9, 8), &[(2, 1000), (1, 333)]).await;
        recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(9, 9))
            .await
            .unwrap();
        order(&db.conn, at(9, 10), &[(5, 120)]).await;
        order(&db.conn, at(9, 10), &[]).await;
        let incremental = recompute_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(9, 11))
            .await
            .unwrap()
            .summary;

        let rebuilt = rebuild_at(&db.conn, WatermarkPolicy::MaxCreatedAt, at(9, 11))
            .await
            .unwrap()
            .summary;
        assert_eq!(rebuilt.total_orders, incremental.total_orders);
        assert_eq!(rebuilt.total_units, incremental.total_units);
        assert_eq!(rebuilt.total_amount, incremental.total_amount);
        assert_eq!(rebuilt.watermark, incremental.watermark);
        assert_eq!(rebuilt.total_orders, 3);
        assert_eq!(rebuilt.total_units, 8);
        assert_eq!(rebuilt.total_amount, money(2933));
    }
}
