//! Config-backed catalog adapter
//!
//! Serves the currency and discount lists declared in settings.json. A host
//! store would implement the catalog ports over its own services instead.

use crate::config::Config;
use crate::domain::result::Result;
use crate::domain::{Currency, Discount};
use crate::ports::{CurrencyCatalog, DiscountCatalog};

pub struct ConfigCatalog {
    currencies: Vec<Currency>,
    discounts: Vec<Discount>,
}

impl ConfigCatalog {
    pub fn new(currencies: Vec<Currency>, discounts: Vec<Discount>) -> Self {
        Self { currencies, discounts }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.currencies.clone(), config.discounts.clone())
    }
}

impl CurrencyCatalog for ConfigCatalog {
    fn all_currencies(&self) -> Result<Vec<Currency>> {
        Ok(self.currencies.clone())
    }
}

impl DiscountCatalog for ConfigCatalog {
    fn get_discount(&self, id: i64) -> Result<Option<Discount>> {
        Ok(self.discounts.iter().find(|d| d.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_discount() {
        let catalog = ConfigCatalog::new(
            vec![Currency {
                id: 1,
                code: "USD".to_string(),
                name: "US Dollar".to_string(),
            }],
            vec![Discount {
                id: 7,
                name: "Bulk buy".to_string(),
            }],
        );

        assert_eq!(catalog.get_discount(7).unwrap().unwrap().name, "Bulk buy");
        assert!(catalog.get_discount(8).unwrap().is_none());
        assert_eq!(catalog.all_currencies().unwrap().len(), 1);
    }
}
