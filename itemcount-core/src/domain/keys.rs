//! Settings key naming scheme
//!
//! Every rule instance owns four keys in the generic key/value settings
//! store. The key strings are part of a stable contract with the store and
//! are only ever built here.

/// System name the discount engine uses to recognise this requirement type
pub const SYSTEM_NAME: &str = "DiscountRequirement.ItemCount";

/// Human-readable name shown in admin listings
pub const FRIENDLY_NAME: &str = "Item count discount requirement";

/// Prefix shared by every key this requirement writes
pub const KEY_PREFIX: &str = "DiscountRequirement.ItemCount.";

pub fn product_ids_key(requirement_id: i64) -> String {
    format!("{}ProductIds-{}", KEY_PREFIX, requirement_id)
}

pub fn min_qty_key(requirement_id: i64) -> String {
    format!("{}MinQty-{}", KEY_PREFIX, requirement_id)
}

pub fn max_qty_key(requirement_id: i64) -> String {
    format!("{}MaxQty-{}", KEY_PREFIX, requirement_id)
}

pub fn currency_ids_key(requirement_id: i64) -> String {
    format!("{}CurrencyIds-{}", KEY_PREFIX, requirement_id)
}

/// The four keys belonging to one rule instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementKeys {
    pub product_ids: String,
    pub min_qty: String,
    pub max_qty: String,
    pub currency_ids: String,
}

impl RequirementKeys {
    pub fn new(requirement_id: i64) -> Self {
        Self {
            product_ids: product_ids_key(requirement_id),
            min_qty: min_qty_key(requirement_id),
            max_qty: max_qty_key(requirement_id),
            currency_ids: currency_ids_key(requirement_id),
        }
    }

    /// All keys, in a fixed order
    pub fn all(&self) -> [&str; 4] {
        [
            &self.product_ids,
            &self.min_qty,
            &self.max_qty,
            &self.currency_ids,
        ]
    }
}
