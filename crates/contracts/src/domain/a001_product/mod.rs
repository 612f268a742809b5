pub mod aggregate;

pub use aggregate::{Product, ProductId, ProductStatus};
