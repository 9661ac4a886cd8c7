//! Discount requirement registry entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::keys::SYSTEM_NAME;

/// One configured occurrence of a requirement rule, scoped to a discount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRequirement {
    pub id: i64,
    pub discount_id: i64,
    /// Rule type that owns this requirement (e.g. "DiscountRequirement.ItemCount")
    pub system_name: String,
    pub created_at: DateTime<Utc>,
}

impl DiscountRequirement {
    pub fn new(id: i64, discount_id: i64) -> Self {
        Self {
            id,
            discount_id,
            system_name: SYSTEM_NAME.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Whether this requirement belongs to the item-count rule
    pub fn is_item_count(&self) -> bool {
        self.system_name == SYSTEM_NAME
    }
}
