use contracts::domain::a001_product::ProductId;
use contracts::domain::a002_product_variant::{ProductVariant, ProductVariantId, VariantKey};
use contracts::domain::common::{AggregateId, EntityMetadata};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use sea_orm::entity::prelude::*;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_product_variant")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub product_id: String,
    pub color_name: String,
    pub color_code: String,
    pub size: String,
    pub stock: i32,
    /// Десятичная строка (SQLite не хранит точные decimal)
    pub price: String,
    pub image: String,
    pub is_deleted: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for ProductVariant {
    fn from(m: Model) -> Self {
        ProductVariant {
            id: ProductVariantId::from_string(&m.id).unwrap_or_else(|_| ProductVariantId::new_v4()),
            product_id: ProductId::from_string(&m.product_id).unwrap_or(ProductId(Default::default())),
            color_name: m.color_name,
            color_code: m.color_code,
            size: m.size,
            stock: m.stock,
            price: Decimal::from_str(&m.price).unwrap_or_default(),
            image: m.image,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
                is_deleted: m.is_deleted,
            },
        }
    }
}

fn to_active(aggregate: &ProductVariant) -> ActiveModel {
    ActiveModel {
        id: Set(aggregate.id.as_string()),
        product_id: Set(aggregate.product_id.as_string()),
        color_name: Set(aggregate.color_name.clone()),
        color_code: Set(aggregate.color_code.clone()),
        size: Set(aggregate.size.clone()),
        stock: Set(aggregate.stock),
        price: Set(aggregate.price.to_string()),
        image: Set(aggregate.image.clone()),
        is_deleted: Set(aggregate.metadata.is_deleted),
        created_at: Set(aggregate.metadata.created_at),
        updated_at: Set(aggregate.metadata.updated_at),
    }
}

/// Есть ли уже вариант с таким (товар, цвет, размер).
/// Мягко удаленные варианты тоже учитываются: уникальный индекс их не различает.
pub async fn exists_by_key<C: ConnectionTrait>(conn: &C, key: &VariantKey) -> Result<bool, DbErr> {
    let found = Entity::find()
        .filter(Column::ProductId.eq(key.product_id.as_string()))
        .filter(Column::ColorName.eq(key.color_name.as_str()))
        .filter(Column::Size.eq(key.size.as_str()))
        .one(conn)
        .await?;
    Ok(found.is_some())
}

/// Вставить пачку вариантов одним INSERT. Пустая пачка - no-op.
pub async fn insert_many<C: ConnectionTrait>(
    conn: &C,
    variants: &[ProductVariant],
) -> Result<u64, DbErr> {
    if variants.is_empty() {
        return Ok(0);
    }
    let models: Vec<ActiveModel> = variants.iter().map(to_active).collect();
    Entity::insert_many(models)
        .exec_without_returning(conn)
        .await
}

pub async fn list_by_product<C: ConnectionTrait>(
    conn: &C,
    product_id: ProductId,
) -> Result<Vec<ProductVariant>, DbErr> {
    let items = Entity::find()
        .filter(Column::ProductId.eq(product_id.as_string()))
        .order_by_asc(Column::ColorName)
        .order_by_asc(Column::Size)
        .all(conn)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn count_all<C: ConnectionTrait>(conn: &C) -> Result<u64, DbErr> {
    Entity::find().count(conn).await
}
