//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The core domain
//! depends only on these traits, not on concrete implementations.

mod catalog;
mod registry;
mod setting_store;

pub use catalog::{CurrencyCatalog, DiscountCatalog};
pub use registry::RequirementRegistry;
pub use setting_store::{SettingEntry, SettingStore};
