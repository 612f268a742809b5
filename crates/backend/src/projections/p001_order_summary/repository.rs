use chrono::{DateTime, Utc};
use contracts::projections::p001_order_summary::{OrderSummary, SUMMARY_ROW_ID};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, EntityTrait, FromQueryResult, NotSet,
    QueryFilter, QueryOrder, Set, Statement,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::a003_order::repository as order_repository;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "p001_order_summary")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub total_orders: i64,
    pub total_units: i64,
    pub total_amount: String,
    pub last_updated: DateTime<Utc>,
    pub watermark: DateTime<Utc>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for OrderSummary {
    type Error = rust_decimal::Error;

    fn try_from(m: Model) -> Result<Self, Self::Error> {
        Ok(OrderSummary {
            total_orders: m.total_orders,
            total_units: m.total_units,
            total_amount: Decimal::from_str(&m.total_amount)?,
            last_updated: m.last_updated,
            watermark: m.watermark,
            version: m.version,
        })
    }
}

pub async fn load<C: ConnectionTrait>(conn: &C) -> Result<Option<Model>, DbErr> {
    Entity::find_by_id(SUMMARY_ROW_ID).one(conn).await
}

/// Создать строку сводки в начальном состоянии.
/// Если строка уже есть (в т.ч. создана параллельным запуском), ничего не делает.
pub async fn insert_initial<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    let initial = OrderSummary::initial();
    let active = ActiveModel {
        id: Set(SUMMARY_ROW_ID),
        total_orders: Set(initial.total_orders),
        total_units: Set(initial.total_units),
        total_amount: Set(initial.total_amount.to_string()),
        last_updated: Set(initial.last_updated),
        watermark: Set(initial.watermark),
        version: Set(initial.version),
    };
    Entity::insert(active)
        .on_conflict(OnConflict::column(Column::Id).do_nothing().to_owned())
        .exec_without_returning(conn)
        .await
}

/// Записать сводку, только если версия в БД все еще `expected_version`.
/// Возвращает число обновленных строк (0 означает конфликт версий).
pub async fn save_if_version<C: ConnectionTrait>(
    conn: &C,
    summary: &OrderSummary,
    expected_version: i32,
) -> Result<u64, DbErr> {
    let active = ActiveModel {
        id: NotSet,
        total_orders: Set(summary.total_orders),
        total_units: Set(summary.total_units),
        total_amount: Set(summary.total_amount.to_string()),
        last_updated: Set(summary.last_updated),
        watermark: Set(summary.watermark),
        version: Set(summary.version),
    };
    let result = Entity::update_many()
        .set(active)
        .filter(Column::Id.eq(SUMMARY_ROW_ID))
        .filter(Column::Version.eq(expected_version))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

// ---------------------------------------------------------------------------
// Окно журнала заказов
// ---------------------------------------------------------------------------

/// Полуинтервал журнала `after < created_at <= up_to`.
/// `after = None` означает весь журнал до `up_to`.
#[derive(Debug, Clone, Copy)]
pub struct LedgerWindow {
    pub after: Option<DateTime<Utc>>,
    pub up_to: DateTime<Utc>,
}

impl LedgerWindow {
    pub fn since(watermark: DateTime<Utc>, up_to: DateTime<Utc>) -> Self {
        Self {
            after: Some(watermark),
            up_to,
        }
    }

    pub fn everything(up_to: DateTime<Utc>) -> Self {
        Self { after: None, up_to }
    }

    /// Условие на `o.created_at` и его параметры
    fn predicate(&self) -> (String, Vec<sea_orm::Value>) {
        match self.after {
            Some(after) => (
                "o.created_at > ? AND o.created_at <= ?".to_string(),
                vec![after.into(), self.up_to.into()],
            ),
            None => ("o.created_at <= ?".to_string(), vec![self.up_to.into()]),
        }
    }
}

#[derive(Debug, FromQueryResult)]
pub struct WindowCounts {
    pub orders: i64,
    pub units: i64,
}

#[derive(Debug, FromQueryResult)]
pub struct ItemAmountRow {
    pub qty: i32,
    pub price: String,
}

/// Количество заказов и сумма qty в окне. Пустое окно дает нули.
pub async fn window_counts<C: ConnectionTrait>(
    conn: &C,
    window: &LedgerWindow,
) -> Result<WindowCounts, DbErr> {
    let (predicate, params) = window.predicate();
    let sql = format!(
        r#"
        SELECT
            CAST(COUNT(*) AS INTEGER) AS orders,
            CAST(COALESCE((
                SELECT SUM(i.qty)
                FROM a003_order_item i
                JOIN a003_order o ON o.id = i.order_id
                WHERE {predicate}
            ), 0) AS INTEGER) AS units
        FROM a003_order o
        WHERE {predicate}
        "#
    );
    let mut values = params.clone();
    values.extend(params);

    let row = WindowCounts::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        values,
    ))
    .one(conn)
    .await?;
    Ok(row.unwrap_or(WindowCounts {
        orders: 0,
        units: 0,
    }))
}

/// Строки заказов окна (qty, price) для точного подсчета выручки
pub async fn window_items<C: ConnectionTrait>(
    conn: &C,
    window: &LedgerWindow,
) -> Result<Vec<ItemAmountRow>, DbErr> {
    let (predicate, values) = window.predicate();
    let sql = format!(
        r#"
        SELECT i.qty AS qty, i.price AS price
        FROM a003_order_item i
        JOIN a003_order o ON o.id = i.order_id
        WHERE {predicate}
        "#
    );
    ItemAmountRow::find_by_statement(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        &sql,
        values,
    ))
    .all(conn)
    .await
}

/// Максимальный `created_at` в окне
pub async fn window_max_created_at<C: ConnectionTrait>(
    conn: &C,
    window: &LedgerWindow,
) -> Result<Option<DateTime<Utc>>, DbErr> {
    let mut query = order_repository::Entity::find()
        .filter(order_repository::Column::CreatedAt.lte(window.up_to));
    if let Some(after) = window.after {
        query = query.filter(order_repository::Column::CreatedAt.gt(after));
    }
    let latest = query
        .order_by_desc(order_repository::Column::CreatedAt)
        .one(conn)
        .await?;
    Ok(latest.map(|m| m.created_at))
}
