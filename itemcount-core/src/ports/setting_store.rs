//! Setting store port - generic key/value settings

use crate::domain::keys::{RequirementKeys, KEY_PREFIX};
use crate::domain::result::Result;
use crate::domain::RawSettings;

/// A single stored setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingEntry {
    pub key: String,
    pub value: String,
}

/// Key/value settings store
///
/// Implementations must make each individual write atomic. No cross-key
/// transaction is required: the four keys of a rule instance are
/// independent and a partial write still decodes to a well-defined
/// configuration.
pub trait SettingStore: Send + Sync {
    /// Look up a raw value. Absent keys return `Ok(None)`.
    fn get_setting(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace a raw value
    fn set_setting(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a key, returning whether it existed
    fn delete_setting(&self, key: &str) -> Result<bool>;

    /// All settings whose key starts with `prefix`, ordered by key
    fn list_settings(&self, prefix: &str) -> Result<Vec<SettingEntry>>;

    /// Delete all settings whose key starts with `prefix`, returning the count
    fn delete_settings(&self, prefix: &str) -> Result<usize>;

    /// Every setting written by the item-count requirement
    fn list_requirement_settings(&self) -> Result<Vec<SettingEntry>> {
        self.list_settings(KEY_PREFIX)
    }

    /// Delete every setting written by the item-count requirement
    fn purge_requirement_settings(&self) -> Result<usize> {
        self.delete_settings(KEY_PREFIX)
    }

    /// Read the four raw values of one rule instance
    fn load_requirement_settings(&self, requirement_id: i64) -> Result<RawSettings> {
        let keys = RequirementKeys::new(requirement_id);
        Ok(RawSettings {
            product_ids: self.get_setting(&keys.product_ids)?,
            min_qty: self.get_setting(&keys.min_qty)?,
            max_qty: self.get_setting(&keys.max_qty)?,
            currency_ids: self.get_setting(&keys.currency_ids)?,
        })
    }

    /// Write the four raw values of one rule instance
    ///
    /// `None` fields are left untouched.
    fn store_requirement_settings(&self, requirement_id: i64, raw: &RawSettings) -> Result<()> {
        let keys = RequirementKeys::new(requirement_id);
        let pairs = [
            (&keys.product_ids, &raw.product_ids),
            (&keys.min_qty, &raw.min_qty),
            (&keys.max_qty, &raw.max_qty),
            (&keys.currency_ids, &raw.currency_ids),
        ];
        for (key, value) in pairs {
            if let Some(value) = value {
                self.set_setting(key, value)?;
            }
        }
        Ok(())
    }

    /// Delete the four keys of one rule instance, returning how many existed
    fn delete_requirement_settings(&self, requirement_id: i64) -> Result<usize> {
        let keys = RequirementKeys::new(requirement_id);
        let mut deleted = 0;
        for key in keys.all() {
            if self.delete_setting(key)? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}
