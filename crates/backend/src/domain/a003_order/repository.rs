use contracts::domain::a003_order::Order;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{ConnectionTrait, EntityTrait, Set};

/// Журнал заказов: строки только добавляются
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a003_order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub total: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Order {
    fn from(m: Model) -> Self {
        Order {
            id: m.id,
            user_id: m.user_id,
            total: Decimal::from_str(&m.total).unwrap_or_default(),
            created_at: m.created_at,
            items: Vec::new(),
        }
    }
}

pub async fn insert<C: ConnectionTrait>(conn: &C, order: &Order) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(order.id.clone()),
        user_id: Set(order.user_id.clone()),
        total: Set(order.total.to_string()),
        created_at: Set(order.created_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}
