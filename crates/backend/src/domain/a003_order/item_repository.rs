use contracts::domain::a003_order::OrderItem;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_order_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub order_id: String,
    pub qty: i32,
    pub price: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for OrderItem {
    fn from(m: Model) -> Self {
        OrderItem {
            id: m.id,
            order_id: m.order_id,
            qty: m.qty,
            price: Decimal::from_str(&m.price).unwrap_or_default(),
        }
    }
}

pub async fn insert_many<C: ConnectionTrait>(conn: &C, items: &[OrderItem]) -> Result<(), DbErr> {
    if items.is_empty() {
        return Ok(());
    }
    let models: Vec<ActiveModel> = items
        .iter()
        .map(|item| ActiveModel {
            id: Set(item.id.clone()),
            order_id: Set(item.order_id.clone()),
            qty: Set(item.qty),
            price: Set(item.price.to_string()),
        })
        .collect();
    Entity::insert_many(models).exec_without_returning(conn).await?;
    Ok(())
}

pub async fn list_by_order<C: ConnectionTrait>(
    conn: &C,
    order_id: &str,
) -> Result<Vec<OrderItem>, DbErr> {
    let items = Entity::find()
        .filter(Column::OrderId.eq(order_id))
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
