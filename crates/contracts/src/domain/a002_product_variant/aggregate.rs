use crate::domain::a001_product::ProductId;
use crate::domain::common::{AggregateId, EntityMetadata};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductVariantId(pub Uuid);

impl ProductVariantId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for ProductVariantId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductVariantId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Естественный ключ варианта: внутри товара вариант уникален по (цвет, размер)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantKey {
    pub product_id: ProductId,
    pub color_name: String,
    pub size: String,
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: ProductVariantId,
    pub product_id: ProductId,
    pub color_name: String,
    pub color_code: String,
    pub size: String,
    pub stock: i32,
    pub price: Decimal,
    pub image: String,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl ProductVariant {
    pub fn new_for_insert(
        product_id: ProductId,
        color_name: String,
        color_code: String,
        size: String,
        stock: i32,
        price: Decimal,
        image: String,
    ) -> Self {
        Self {
            id: ProductVariantId::new_v4(),
            product_id,
            color_name,
            color_code,
            size,
            stock,
            price,
            image,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn key(&self) -> VariantKey {
        VariantKey {
            product_id: self.product_id,
            color_name: self.color_name.clone(),
            size: self.size.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stock < 0 {
            return Err(format!("Остаток не может быть отрицательным: {}", self.stock));
        }
        if self.price < Decimal::ZERO {
            return Err(format!("Цена не может быть отрицательной: {}", self.price));
        }
        Ok(())
    }
}
