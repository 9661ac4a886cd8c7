//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the SettingStore and RequirementRegistry ports
//! - In-memory maps for the same ports (embedding, tests)
//! - settings.json for the CurrencyCatalog and DiscountCatalog ports

pub mod catalog;
pub mod duckdb;
pub mod memory;
