use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Идентификатор единственной строки сводки
pub const SUMMARY_ROW_ID: i32 = 1;

/// Сводка по журналу заказов (singleton).
///
/// `watermark` - граница журнала: все заказы с `created_at <= watermark`
/// уже учтены в итогах. `last_updated` - время последнего успешного пересчета.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub total_orders: i64,
    pub total_units: i64,
    pub total_amount: Decimal,
    pub last_updated: DateTime<Utc>,
    pub watermark: DateTime<Utc>,
    /// Версия для optimistic locking
    pub version: i32,
}

impl OrderSummary {
    /// Начальное состояние: нули и сторожевая эпоха, старше любого заказа
    pub fn initial() -> Self {
        Self {
            total_orders: 0,
            total_units: 0,
            total_amount: Decimal::ZERO,
            last_updated: epoch_sentinel(),
            watermark: epoch_sentinel(),
            version: 0,
        }
    }
}

/// 1970-01-01T00:00:00Z
pub fn epoch_sentinel() -> DateTime<Utc> {
    DateTime::<Utc>::default()
}

/// Приращение, полученное из окна журнала
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryDelta {
    pub orders: i64,
    pub units: i64,
    pub amount: Decimal,
}

impl SummaryDelta {
    pub fn is_empty(&self) -> bool {
        self.orders == 0 && self.units == 0 && self.amount.is_zero()
    }
}

/// Как сдвигается watermark после успешного пересчета
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkPolicy {
    /// Максимальный `created_at` обработанного окна (пустое окно не двигает watermark)
    #[default]
    MaxCreatedAt,
    /// Время запуска пересчета
    WallClock,
}

/// Результат одного запуска агрегатора
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecomputeOutcome {
    pub delta: SummaryDelta,
    pub summary: OrderSummary,
}
