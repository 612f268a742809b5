pub mod p001_order_summary;
