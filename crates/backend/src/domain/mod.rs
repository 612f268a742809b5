pub mod a001_product;
pub mod a002_product_variant;
pub mod a003_order;
