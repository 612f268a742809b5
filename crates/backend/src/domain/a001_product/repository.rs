use contracts::domain::a001_product::{Product, ProductId, ProductStatus};
use contracts::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_product")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub status: String,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Product {
    fn from(m: Model) -> Self {
        Product {
            id: ProductId::from_string(&m.id).unwrap_or_else(|_| ProductId::new_v4()),
            title: m.title,
            status: ProductStatus::from_db(&m.status),
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
                is_deleted: m.is_deleted,
            },
        }
    }
}

/// Найти товар по названию (точное совпадение, title должен быть уже trimmed)
pub async fn find_by_title<C: ConnectionTrait>(
    conn: &C,
    title: &str,
) -> Result<Option<Product>, DbErr> {
    let result = Entity::find()
        .filter(Column::Title.eq(title))
        .order_by_asc(Column::CreatedAt)
        .one(conn)
        .await?;
    Ok(result.map(Into::into))
}

pub async fn list_all<C: ConnectionTrait>(conn: &C) -> Result<Vec<Product>, DbErr> {
    let items = Entity::find()
        .order_by_asc(Column::Title)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn insert<C: ConnectionTrait>(conn: &C, aggregate: &Product) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(aggregate.id.as_string()),
        title: Set(aggregate.title.clone()),
        status: Set(aggregate.status.as_str().to_string()),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(aggregate.metadata.created_at),
        updated_at: Set(aggregate.metadata.updated_at),
    };
    Entity::insert(active).exec_without_returning(conn).await?;
    Ok(())
}
