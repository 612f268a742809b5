pub mod aggregate;

pub use aggregate::{ProductVariant, ProductVariantId, VariantKey};
