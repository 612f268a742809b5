use crate::domain::common::{AggregateId, EntityMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// ID Type
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub Uuid);

impl ProductId {
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

impl AggregateId for ProductId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }

    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(ProductId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "ACTIVE",
            ProductStatus::Inactive => "INACTIVE",
        }
    }

    /// Неизвестные значения из БД трактуются как ACTIVE
    pub fn from_db(value: &str) -> Self {
        match value {
            "INACTIVE" => ProductStatus::Inactive,
            _ => ProductStatus::Active,
        }
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    /// Ключ поиска при импорте (trimmed, с учетом регистра)
    pub title: String,

    #[serde(default)]
    pub status: ProductStatus,

    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

impl Product {
    pub fn new_for_insert(title: impl Into<String>) -> Self {
        Self {
            id: ProductId::new_v4(),
            title: title.into(),
            status: ProductStatus::Active,
            metadata: EntityMetadata::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Название товара не может быть пустым".into());
        }
        if self.title.trim() != self.title {
            return Err("Название товара должно быть без пробелов по краям".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_product_is_active_and_valid() {
        let product = Product::new_for_insert("Cargo Trousers");
        assert_eq!(product.status, ProductStatus::Active);
        assert!(product.validate().is_ok());
    }

    #[test]
    fn blank_or_untrimmed_title_is_rejected() {
        assert!(Product::new_for_insert("   ").validate().is_err());
        assert!(Product::new_for_insert(" Hoodie").validate().is_err());
    }

    #[test]
    fn status_round_trips_through_db_strings() {
        assert_eq!(ProductStatus::from_db("INACTIVE"), ProductStatus::Inactive);
        assert_eq!(ProductStatus::from_db("ACTIVE"), ProductStatus::Active);
        assert_eq!(ProductStatus::from_db("garbage"), ProductStatus::Active);
        assert_eq!(ProductStatus::Inactive.as_str(), "INACTIVE");
    }
}
