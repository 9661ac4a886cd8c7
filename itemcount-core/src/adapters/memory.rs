//! In-memory settings store and requirement registry
//!
//! Used by hosts that keep settings in their own cache and by tests that do
//! not need a database file.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use crate::domain::result::{Error, Result};
use crate::domain::DiscountRequirement;
use crate::ports::{RequirementRegistry, SettingEntry, SettingStore};

#[derive(Debug, Default)]
struct Requirements {
    next_id: i64,
    by_id: BTreeMap<i64, DiscountRequirement>,
}

/// Map-backed implementation of the store ports
#[derive(Debug, Default)]
pub struct InMemoryStore {
    settings: Mutex<HashMap<String, String>>,
    requirements: Mutex<Requirements>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from raw key/value pairs
    pub fn with_settings<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let settings = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            settings: Mutex::new(settings),
            requirements: Mutex::default(),
        }
    }

    /// Number of stored settings
    pub fn len(&self) -> usize {
        self.settings.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn settings(&self) -> Result<MutexGuard<'_, HashMap<String, String>>> {
        self.settings
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }

    fn requirements(&self) -> Result<MutexGuard<'_, Requirements>> {
        self.requirements
            .lock()
            .map_err(|e| Error::database(format!("Lock poisoned: {}", e)))
    }
}

impl SettingStore for InMemoryStore {
    fn get_setting(&self, key: &str) -> Result<Option<String>> {
        Ok(self.settings()?.get(key).cloned())
    }

    fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.settings()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete_setting(&self, key: &str) -> Result<bool> {
        Ok(self.settings()?.remove(key).is_some())
    }

    fn list_settings(&self, prefix: &str) -> Result<Vec<SettingEntry>> {
        let mut entries: Vec<SettingEntry> = self
            .settings()?
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| SettingEntry {
                key: key.clone(),
                value: value.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn delete_settings(&self, prefix: &str) -> Result<usize> {
        let mut settings = self.settings()?;
        let before = settings.len();
        settings.retain(|key, _| !key.starts_with(prefix));
        Ok(before - settings.len())
    }
}

impl RequirementRegistry for InMemoryStore {
    fn get_requirement(&self, id: i64) -> Result<Option<DiscountRequirement>> {
        Ok(self.requirements()?.by_id.get(&id).cloned())
    }

    fn insert_requirement(&self, discount_id: i64, system_name: &str) -> Result<DiscountRequirement> {
        let mut requirements = self.requirements()?;
        requirements.next_id += 1;

        let mut requirement = DiscountRequirement::new(requirements.next_id, discount_id);
        requirement.system_name = system_name.to_string();
        requirements.by_id.insert(requirement.id, requirement.clone());

        Ok(requirement)
    }

    fn delete_requirement(&self, id: i64) -> Result<bool> {
        Ok(self.requirements()?.by_id.remove(&id).is_some())
    }

    fn list_requirements(&self, discount_id: Option<i64>) -> Result<Vec<DiscountRequirement>> {
        let requirements = self.requirements()?;
        Ok(requirements
            .by_id
            .values()
            .filter(|r| discount_id.map_or(true, |d| r.discount_id == d))
            .cloned()
            .collect())
    }
}
