pub mod error;
pub mod projection_builder;
pub mod repository;
pub mod service;

pub use error::RecomputeError;
