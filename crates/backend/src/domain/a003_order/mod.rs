pub mod item_repository;
pub mod repository;
pub mod service;
