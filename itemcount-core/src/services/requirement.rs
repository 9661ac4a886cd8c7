//! Requirement service - authoring path for item-count requirements
//!
//! Backs the admin "Configure" form: loads the current values for a
//! requirement and persists new ones, creating the requirement first when
//! it does not exist yet. Unlike evaluation, every problem here is reported
//! to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::configuration::{format_id_list, parse_id_list};
use crate::domain::keys::SYSTEM_NAME;
use crate::domain::result::{Error, Result};
use crate::domain::{Currency, DiscountRequirement, RawSettings, RuleConfiguration};
use crate::ports::{CurrencyCatalog, DiscountCatalog, RequirementRegistry, SettingEntry, SettingStore};

/// Admin path that hosts the configuration form
const CONFIGURE_PATH: &str = "/Admin/ItemCountConfig/Configure";

/// Values shown in, and submitted by, the configuration form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementModel {
    /// `0` when the requirement has not been created yet
    pub requirement_id: i64,
    pub discount_id: i64,
    /// Product IDs as comma-separated text, e.g. "12,15,18"
    pub product_ids_raw: String,
    /// Min 2 / Max 2 means exactly two; Min 3 / Max 0 means three or more
    pub min_quantity: i32,
    pub max_quantity: i32,
    pub selected_currency_ids: Vec<i64>,
    #[serde(default)]
    pub available_currencies: Vec<Currency>,
}

/// Result of saving a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveResult {
    pub new_requirement_id: i64,
    /// Whether the requirement was created by this save
    pub created: bool,
}

/// Result of removing a requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoveResult {
    pub requirement_id: i64,
    pub settings_deleted: usize,
    pub requirement_deleted: bool,
}

/// Result of removing every item-count requirement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UninstallResult {
    pub settings_deleted: usize,
    pub requirements_deleted: usize,
}

/// A requirement together with its decoded configuration
#[derive(Debug, Clone, Serialize)]
pub struct RequirementSummary {
    pub requirement: DiscountRequirement,
    pub configuration: RuleConfiguration,
}

/// Authoring service for requirement configuration
pub struct RequirementService {
    settings: Arc<dyn SettingStore>,
    registry: Arc<dyn RequirementRegistry>,
    currencies: Arc<dyn CurrencyCatalog>,
    discounts: Arc<dyn DiscountCatalog>,
}

impl RequirementService {
    pub fn new(
        settings: Arc<dyn SettingStore>,
        registry: Arc<dyn RequirementRegistry>,
        currencies: Arc<dyn CurrencyCatalog>,
        discounts: Arc<dyn DiscountCatalog>,
    ) -> Self {
        Self {
            settings,
            registry,
            currencies,
            discounts,
        }
    }

    /// Load the form model for a discount and an optional existing requirement
    ///
    /// A requirement that has never been configured yields default values.
    pub fn load_model(&self, discount_id: i64, requirement_id: Option<i64>) -> Result<RequirementModel> {
        if self.discounts.get_discount(discount_id)?.is_none() {
            return Err(Error::not_found(format!("Discount {} could not be loaded", discount_id)));
        }

        let raw = match requirement_id {
            Some(id) => {
                if self.registry.get_requirement(id)?.is_none() {
                    return Err(Error::not_found(format!("Failed to load requirement {}", id)));
                }
                self.settings.load_requirement_settings(id)?
            }
            None => RawSettings::default(),
        };

        let config = RuleConfiguration::decode(requirement_id.unwrap_or(0), &raw);

        Ok(RequirementModel {
            requirement_id: requirement_id.unwrap_or(0),
            discount_id,
            product_ids_raw: raw.product_ids.unwrap_or_default(),
            min_quantity: config.min_quantity,
            max_quantity: config.max_quantity,
            selected_currency_ids: config.currency_ids.into_iter().collect(),
            available_currencies: self.currencies.all_currencies()?,
        })
    }

    /// Like `load_model`, but an unknown requirement id yields default
    /// values carrying that id, so a following `save` creates it
    pub fn load_model_or_default(
        &self,
        discount_id: i64,
        requirement_id: Option<i64>,
    ) -> Result<RequirementModel> {
        match (self.load_model(discount_id, requirement_id), requirement_id) {
            (Err(Error::NotFound(_)), Some(id)) => {
                let mut model = self.load_model(discount_id, None)?;
                model.requirement_id = id;
                Ok(model)
            }
            (result, _) => result,
        }
    }

    /// Persist a submitted model
    ///
    /// Creates the requirement when `requirement_id` is `0` or unknown.
    /// Product IDs are normalized to canonical comma-joined integers.
    pub fn save(&self, model: &RequirementModel) -> Result<SaveResult> {
        validate(model)?;

        if self.discounts.get_discount(model.discount_id)?.is_none() {
            return Err(Error::not_found(format!(
                "Discount {} could not be loaded",
                model.discount_id
            )));
        }

        let existing = if model.requirement_id > 0 {
            self.registry.get_requirement(model.requirement_id)?
        } else {
            None
        };

        let (requirement, created) = match existing {
            Some(requirement) if !requirement.is_item_count() => {
                return Err(Error::validation(format!(
                    "Requirement {} belongs to rule {}",
                    requirement.id, requirement.system_name
                )));
            }
            Some(requirement) => (requirement, false),
            None => (
                self.registry.insert_requirement(model.discount_id, SYSTEM_NAME)?,
                true,
            ),
        };

        let raw = RawSettings {
            product_ids: Some(format_id_list(&parse_id_list(Some(&model.product_ids_raw)))),
            min_qty: Some(model.min_quantity.to_string()),
            max_qty: Some(model.max_quantity.to_string()),
            currency_ids: Some(format_id_list(&model.selected_currency_ids.iter().copied().collect())),
        };
        if let Err(e) = self.settings.store_requirement_settings(requirement.id, &raw) {
            if created {
                // Do not leave a requirement behind that was never configured
                let _ = self.settings.delete_requirement_settings(requirement.id);
                let _ = self.registry.delete_requirement(requirement.id);
            }
            return Err(e);
        }

        Ok(SaveResult {
            new_requirement_id: requirement.id,
            created,
        })
    }

    /// Decoded configuration for one requirement
    pub fn load_configuration(&self, requirement_id: i64) -> Result<RuleConfiguration> {
        let raw = self.settings.load_requirement_settings(requirement_id)?;
        Ok(RuleConfiguration::decode(requirement_id, &raw))
    }

    /// Item-count requirements, optionally for one discount
    pub fn list(&self, discount_id: Option<i64>) -> Result<Vec<RequirementSummary>> {
        self.registry
            .list_requirements(discount_id)?
            .into_iter()
            .filter(DiscountRequirement::is_item_count)
            .map(|requirement| {
                let configuration = self.load_configuration(requirement.id)?;
                Ok(RequirementSummary {
                    requirement,
                    configuration,
                })
            })
            .collect()
    }

    /// Delete a requirement and its four settings
    pub fn remove(&self, requirement_id: i64) -> Result<RemoveResult> {
        if requirement_id <= 0 {
            return Err(Error::validation(format!("Invalid requirement id {}", requirement_id)));
        }

        let settings_deleted = self.settings.delete_requirement_settings(requirement_id)?;
        let requirement_deleted = self.registry.delete_requirement(requirement_id)?;

        if settings_deleted == 0 && !requirement_deleted {
            return Err(Error::not_found(format!("Requirement {}", requirement_id)));
        }

        Ok(RemoveResult {
            requirement_id,
            settings_deleted,
            requirement_deleted,
        })
    }

    /// Every stored item-count setting, across all requirements
    pub fn installed_settings(&self) -> Result<Vec<SettingEntry>> {
        self.settings.list_requirement_settings()
    }

    /// Remove all item-count settings and requirements
    ///
    /// Requirements of other rule types are left alone.
    pub fn uninstall(&self) -> Result<UninstallResult> {
        let settings_deleted = self.settings.purge_requirement_settings()?;

        let mut requirements_deleted = 0;
        for requirement in self.registry.list_requirements(None)? {
            if requirement.is_item_count() && self.registry.delete_requirement(requirement.id)? {
                requirements_deleted += 1;
            }
        }

        Ok(UninstallResult {
            settings_deleted,
            requirements_deleted,
        })
    }

    /// URL of the admin configuration form
    pub fn configuration_url(discount_id: i64, requirement_id: Option<i64>) -> String {
        format!(
            "{}?discountId={}&discountRequirementId={}",
            CONFIGURE_PATH,
            discount_id,
            requirement_id.map(|id| id.to_string()).unwrap_or_default()
        )
    }
}

fn validate(model: &RequirementModel) -> Result<()> {
    if model.requirement_id < 0 {
        return Err(Error::validation(format!(
            "Invalid requirement id {}",
            model.requirement_id
        )));
    }
    if model.min_quantity < 0 {
        return Err(Error::validation("Minimum quantity must not be negative"));
    }
    if model.max_quantity < 0 {
        return Err(Error::validation("Maximum quantity must not be negative"));
    }
    if model.min_quantity > 0 && model.max_quantity > 0 && model.min_quantity > model.max_quantity {
        return Err(Error::validation(format!(
            "Minimum quantity {} exceeds maximum quantity {}",
            model.min_quantity, model.max_quantity
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::ConfigCatalog;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::keys::{currency_ids_key, product_ids_key};
    use crate::domain::Discount;

    /// Store whose settings and registry can be made to fail independently
    #[derive(Default)]
    struct FlakyStore {
        inner: InMemoryStore,
        fail_settings_writes: bool,
        fail_settings_reads: bool,
        fail_registry: bool,
    }

    impl FlakyStore {
        fn check(failing: bool) -> Result<()> {
            if failing {
                Err(Error::database("connection lost"))
            } else {
                Ok(())
            }
        }
    }

    impl SettingStore for FlakyStore {
        fn get_setting(&self, key: &str) -> Result<Option<String>> {
            Self::check(self.fail_settings_reads)?;
            self.inner.get_setting(key)
        }

        fn set_setting(&self, key: &str, value: &str) -> Result<()> {
            Self::check(self.fail_settings_writes)?;
            self.inner.set_setting(key, value)
        }

        fn delete_setting(&self, key: &str) -> Result<bool> {
            Self::check(self.fail_settings_writes)?;
            self.inner.delete_setting(key)
        }

        fn list_settings(&self, prefix: &str) -> Result<Vec<SettingEntry>> {
            Self::check(self.fail_settings_reads)?;
            self.inner.list_settings(prefix)
        }

        fn delete_settings(&self, prefix: &str) -> Result<usize> {
            Self::check(self.fail_settings_writes)?;
            self.inner.delete_settings(prefix)
        }
    }

    impl RequirementRegistry for FlakyStore {
        fn get_requirement(&self, id: i64) -> Result<Option<DiscountRequirement>> {
            Self::check(self.fail_registry)?;
            self.inner.get_requirement(id)
        }

        fn insert_requirement(&self, discount_id: i64, system_name: &str) -> Result<DiscountRequirement> {
            Self::check(self.fail_registry)?;
            self.inner.insert_requirement(discount_id, system_name)
        }

        fn delete_requirement(&self, id: i64) -> Result<bool> {
            Self::check(self.fail_registry)?;
            self.inner.delete_requirement(id)
        }

        fn list_requirements(&self, discount_id: Option<i64>) -> Result<Vec<DiscountRequirement>> {
            Self::check(self.fail_registry)?;
            self.inner.list_requirements(discount_id)
        }
    }

    fn catalog() -> Arc<ConfigCatalog> {
        Arc::new(ConfigCatalog::new(
            vec![Currency {
                id: 1,
                code: "USD".to_string(),
                name: "US Dollar".to_string(),
            }],
            vec![Discount {
                id: 7,
                name: "Bulk buy".to_string(),
            }],
        ))
    }

    fn service_with_store() -> (RequirementService, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let catalog = catalog();
        let service = RequirementService::new(store.clone(), store.clone(), catalog.clone(), catalog);
        (service, store)
    }

    fn service_with_flaky(store: FlakyStore) -> (RequirementService, Arc<FlakyStore>) {
        let store = Arc::new(store);
        let catalog = catalog();
        let service = RequirementService::new(store.clone(), store.clone(), catalog.clone(), catalog);
        (service, store)
    }

    fn model(product_ids: &str, min: i32, max: i32, currencies: &[i64]) -> RequirementModel {
        RequirementModel {
            discount_id: 7,
            product_ids_raw: product_ids.to_string(),
            min_quantity: min,
            max_quantity: max,
            selected_currency_ids: currencies.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_save_creates_requirement_and_writes_keys() {
        let (service, store) = service_with_store();

        let result = service.save(&model(" 12, 15,x,12 ", 2, 0, &[3, 1])).unwrap();
        assert!(result.created);
        assert_eq!(result.new_requirement_id, 1);

        let id = result.new_requirement_id;
        assert_eq!(store.get_setting(&product_ids_key(id)).unwrap().as_deref(), Some("12,15"));
        assert_eq!(store.get_setting(&currency_ids_key(id)).unwrap().as_deref(), Some("1,3"));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_save_updates_existing_requirement() {
        let (service, _store) = service_with_store();
        let first = service.save(&model("1", 1, 0, &[])).unwrap();

        let mut update = model("", 0, 5, &[]);
        update.requirement_id = first.new_requirement_id;
        let second = service.save(&update).unwrap();

        assert!(!second.created);
        assert_eq!(second.new_requirement_id, first.new_requirement_id);

        let config = service.load_configuration(first.new_requirement_id).unwrap();
        assert!(config.product_ids.is_empty());
        assert_eq!(config.max_quantity, 5);
    }

    #[test]
    fn test_save_with_unknown_requirement_creates_new_one() {
        let (service, _store) = service_with_store();
        let mut submitted = model("", 0, 0, &[]);
        submitted.requirement_id = 99;

        let result = service.save(&submitted).unwrap();
        assert!(result.created);
        assert_ne!(result.new_requirement_id, 99);
    }

    #[test]
    fn test_save_rejects_unknown_discount() {
        let (service, store) = service_with_store();
        let mut submitted = model("", 0, 0, &[]);
        submitted.discount_id = 8;

        assert!(matches!(service.save(&submitted), Err(Error::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_rejects_invalid_quantities() {
        let (service, _store) = service_with_store();
        assert!(matches!(service.save(&model("", -1, 0, &[])), Err(Error::Validation(_))));
        assert!(matches!(service.save(&model("", 0, -1, &[])), Err(Error::Validation(_))));
        assert!(matches!(service.save(&model("", 6, 5, &[])), Err(Error::Validation(_))));
        assert!(service.save(&model("", 5, 5, &[])).is_ok());
    }

    #[test]
    fn test_save_rejects_foreign_requirement() {
        let (service, store) = service_with_store();
        let foreign = store.insert_requirement(7, "DiscountRequirement.MustBeAssignedToCustomerRole").unwrap();

        let mut submitted = model("", 0, 0, &[]);
        submitted.requirement_id = foreign.id;
        assert!(matches!(service.save(&submitted), Err(Error::Validation(_))));
    }

    #[test]
    fn test_load_model_defaults_for_new_requirement() {
        let (service, _store) = service_with_store();
        let loaded = service.load_model(7, None).unwrap();

        assert_eq!(loaded.requirement_id, 0);
        assert_eq!(loaded.product_ids_raw, "");
        assert_eq!(loaded.min_quantity, 0);
        assert!(loaded.selected_currency_ids.is_empty());
        assert_eq!(loaded.available_currencies.len(), 1);
    }

    #[test]
    fn test_load_model_reflects_saved_values() {
        let (service, _store) = service_with_store();
        let saved = service.save(&model("4,5", 2, 3, &[1])).unwrap();

        let loaded = service.load_model(7, Some(saved.new_requirement_id)).unwrap();
        assert_eq!(loaded.product_ids_raw, "4,5");
        assert_eq!(loaded.min_quantity, 2);
        assert_eq!(loaded.max_quantity, 3);
        assert_eq!(loaded.selected_currency_ids, vec![1]);
    }

    #[test]
    fn test_load_model_errors() {
        let (service, _store) = service_with_store();
        assert!(matches!(service.load_model(8, None), Err(Error::NotFound(_))));
        assert!(matches!(service.load_model(7, Some(42)), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_list_and_remove() {
        let (service, store) = service_with_store();
        let kept = service.save(&model("1", 0, 0, &[])).unwrap();
        let removed = service.save(&model("2", 0, 0, &[])).unwrap();
        store.insert_requirement(7, "Other.Rule").unwrap();

        assert_eq!(service.list(Some(7)).unwrap().len(), 2);

        let result = service.remove(removed.new_requirement_id).unwrap();
        assert_eq!(result.settings_deleted, 4);
        assert!(result.requirement_deleted);

        let remaining = service.list(None).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].requirement.id, kept.new_requirement_id);

        assert!(matches!(service.remove(removed.new_requirement_id), Err(Error::NotFound(_))));
        assert!(matches!(service.remove(0), Err(Error::Validation(_))));
    }

    #[test]
    fn test_unreachable_store_is_reported() {
        let (service, _store) = service_with_flaky(FlakyStore {
            fail_settings_writes: true,
            fail_settings_reads: true,
            fail_registry: true,
            ..Default::default()
        });

        assert!(matches!(service.save(&model("1", 0, 0, &[])), Err(Error::Database(_))));
        assert!(matches!(service.load_model(7, Some(1)), Err(Error::Database(_))));
        assert!(matches!(service.list(None), Err(Error::Database(_))));
        assert!(matches!(service.remove(1), Err(Error::Database(_))));
        assert!(matches!(service.uninstall(), Err(Error::Database(_))));
    }

    #[test]
    fn test_settings_write_failure_after_insert_is_reported() {
        let (service, store) = service_with_flaky(FlakyStore {
            fail_settings_writes: true,
            ..Default::default()
        });

        let result = service.save(&model("1,2", 1, 3, &[]));
        assert!(matches!(result, Err(Error::Database(_))));

        // The freshly inserted requirement is rolled back
        assert!(store.inner.list_requirements(None).unwrap().is_empty());
        assert!(store.inner.is_empty());
    }

    #[test]
    fn test_settings_read_failure_on_existing_requirement() {
        let (service, store) = service_with_flaky(FlakyStore {
            fail_settings_reads: true,
            ..Default::default()
        });
        let existing = store.inner.insert_requirement(7, SYSTEM_NAME).unwrap();

        assert!(matches!(
            service.load_model(7, Some(existing.id)),
            Err(Error::Database(_))
        ));
        assert!(matches!(
            service.load_configuration(existing.id),
            Err(Error::Database(_))
        ));
    }

    #[test]
    fn test_load_model_or_default_for_unknown_requirement() {
        let (service, _store) = service_with_store();

        let loaded = service.load_model_or_default(7, Some(99)).unwrap();
        assert_eq!(loaded.requirement_id, 99);
        assert_eq!(loaded.min_quantity, 0);

        let saved = service.save(&loaded).unwrap();
        assert!(saved.created);

        // Known requirements load their stored values
        let mut update = service.load_model_or_default(7, Some(saved.new_requirement_id)).unwrap();
        assert_eq!(update.requirement_id, saved.new_requirement_id);
        update.min_quantity = 4;
        service.save(&update).unwrap();
        assert_eq!(
            service
                .load_model_or_default(7, Some(saved.new_requirement_id))
                .unwrap()
                .min_quantity,
            4
        );

        // An unknown discount is still an error
        assert!(matches!(
            service.load_model_or_default(8, Some(99)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_uninstall_removes_only_item_count_data() {
        let (service, store) = service_with_store();
        service.save(&model("1", 2, 0, &[])).unwrap();
        service.save(&model("", 0, 5, &[1])).unwrap();
        let foreign = store.insert_requirement(7, "Other.Rule").unwrap();
        store.set_setting("Other.Rule.Setting-3", "x").unwrap();

        assert_eq!(service.installed_settings().unwrap().len(), 8);

        let result = service.uninstall().unwrap();
        assert_eq!(result.settings_deleted, 8);
        assert_eq!(result.requirements_deleted, 2);

        assert!(service.installed_settings().unwrap().is_empty());
        assert_eq!(store.list_requirements(None).unwrap(), vec![foreign]);
        assert_eq!(store.get_setting("Other.Rule.Setting-3").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_configuration_url() {
        assert_eq!(
            RequirementService::configuration_url(3, Some(11)),
            "/Admin/ItemCountConfig/Configure?discountId=3&discountRequirementId=11"
        );
        assert_eq!(
            RequirementService::configuration_url(3, None),
            "/Admin/ItemCountConfig/Configure?discountId=3&discountRequirementId="
        );
    }
}
