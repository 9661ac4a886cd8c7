//! Catalog entities owned by the hosting store

use serde::{Deserialize, Serialize};

/// A currency the store can transact in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub id: i64,
    /// ISO 4217 code
    pub code: String,
    pub name: String,
}

/// A discount that requirements can be attached to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: i64,
    pub name: String,
}
