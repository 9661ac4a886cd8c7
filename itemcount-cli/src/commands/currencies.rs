//! Currencies command - list currencies known to the catalog

use anyhow::Result;
use itemcount_core::OperationResult;

use super::{get_context, Logger};
use crate::output;

pub fn run(json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let currencies = &ctx.config.currencies;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(currencies))?);
        return Ok(());
    }

    if currencies.is_empty() {
        output::warning("No currencies configured. Add them to settings.json.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Code", "Name"]);
    for currency in currencies {
        table.add_row(vec![currency.id.to_string(), currency.code.clone(), currency.name.clone()]);
    }
    println!("{}", table);
    Ok(())
}
