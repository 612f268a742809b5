use contracts::domain::a002_product_variant::{ProductVariant, VariantKey};
use std::collections::HashSet;

/// Варианты, ожидающие вставки одной транзакцией
#[derive(Debug, Default)]
pub struct PendingBatch {
    variants: Vec<ProductVariant>,
    keys: HashSet<VariantKey>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &VariantKey) -> bool {
        self.keys.contains(key)
    }

    /// Добавить вариант; false, если ключ уже в пачке
    pub fn stage(&mut self, variant: ProductVariant) -> bool {
        if !self.keys.insert(variant.key()) {
            return false;
        }
        self.variants.push(variant);
        true
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[ProductVariant] {
        &self.variants
    }

    pub fn clear(&mut self) {
        self.variants.clear();
        self.keys.clear();
    }
}
