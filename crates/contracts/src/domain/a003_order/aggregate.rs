use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Строка заказа. Неизменяемый факт журнала продаж.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub qty: i32,
    pub price: Decimal,
}

impl OrderItem {
    /// qty * price
    pub fn line_amount(&self) -> Decimal {
        Decimal::from(self.qty) * self.price
    }
}

/// Заказ журнала продаж (append-only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            total: Decimal::ZERO,
            created_at,
            items: Vec::new(),
        }
    }

    /// Добавляет строку и пересчитывает total
    pub fn with_item(mut self, qty: i32, price: Decimal) -> Self {
        self.items.push(OrderItem {
            id: Uuid::new_v4().to_string(),
            order_id: self.id.clone(),
            qty,
            price,
        });
        self.total = self.items.iter().map(OrderItem::line_amount).sum();
        self
    }

    pub fn units(&self) -> i64 {
        self.items.iter().map(|i| i64::from(i.qty)).sum()
    }
}
