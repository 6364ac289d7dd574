//! Remote content catalog: API types and HTTP client

pub mod client;
pub mod types;

pub use client::{CatalogApi, CatalogClient};
