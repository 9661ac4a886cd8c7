//! Requirement registry port

use crate::domain::result::Result;
use crate::domain::DiscountRequirement;

/// Registry of requirement instances attached to discounts
///
/// In a full store this is the discount service. The authoring path needs
/// it to resolve an existing requirement or create a new one.
pub trait RequirementRegistry: Send + Sync {
    /// Get a requirement by ID
    fn get_requirement(&self, id: i64) -> Result<Option<DiscountRequirement>>;

    /// Create a requirement for a discount and assign it a fresh positive ID
    fn insert_requirement(&self, discount_id: i64, system_name: &str) -> Result<DiscountRequirement>;

    /// Delete a requirement, returning whether it existed
    fn delete_requirement(&self, id: i64) -> Result<bool>;

    /// List requirements, optionally restricted to one discount
    fn list_requirements(&self, discount_id: Option<i64>) -> Result<Vec<DiscountRequirement>>;
}
