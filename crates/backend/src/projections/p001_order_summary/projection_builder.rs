use super::error::RecomputeError;
use super::repository::{ItemAmountRow, WindowCounts};
use chrono::{DateTime, Utc};
use contracts::projections::p001_order_summary::{
    epoch_sentinel, OrderSummary, SummaryDelta, WatermarkPolicy,
};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Сумма qty * price по строкам окна (точная десятичная арифметика)
pub fn fold_amount(rows: &[ItemAmountRow]) -> Result<Decimal, RecomputeError> {
    let mut total = Decimal::ZERO;
    for row in rows {
        let price = Decimal::from_str(row.price.trim()).map_err(|_| corrupt_item(&row.price))?;
        total = Decimal::from(row.qty)
            .checked_mul(price)
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| corrupt_item(&row.price))?;
    }
    Ok(total)
}

fn corrupt_item(value: &str) -> RecomputeError {
    RecomputeError::CorruptAmount {
        source_table: "a003_order_item",
        value: value.to_string(),
    }
}

pub fn build_delta(counts: WindowCounts, amount: Decimal) -> SummaryDelta {
    SummaryDelta {
        orders: counts.orders,
        units: counts.units,
        amount,
    }
}

fn next_watermark(
    policy: WatermarkPolicy,
    fallback: DateTime<Utc>,
    window_max: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match policy {
        WatermarkPolicy::MaxCreatedAt => window_max.map_or(fallback, |max| max.max(fallback)),
        WatermarkPolicy::WallClock => now,
    }
}

/// Прибавить приращение окна к текущим итогам.
///
/// `last_updated` всегда становится `now`; watermark двигается по политике
/// и никогда не уходит назад.
pub fn apply_delta(
    current: &OrderSummary,
    delta: &SummaryDelta,
    policy: WatermarkPolicy,
    window_max: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> OrderSummary {
    OrderSummary {
        total_orders: current.total_orders + delta.orders,
        total_units: current.total_units + delta.units,
        total_amount: current.total_amount + delta.amount,
        last_updated: now,
        watermark: next_watermark(policy, current.watermark, window_max, now),
        version: current.version + 1,
    }
}

/// Заменить итоги полным пересчетом журнала до `now`
pub fn replace_totals(
    current: &OrderSummary,
    totals: &SummaryDelta,
    policy: WatermarkPolicy,
    window_max: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> OrderSummary {
    OrderSummary {
        total_orders: totals.orders,
        total_units: totals.units,
        total_amount: totals.amount,
        last_updated: now,
        watermark: next_watermark(policy, epoch_sentinel(), window_max, now),
        version: current.version + 1,
    }
}
