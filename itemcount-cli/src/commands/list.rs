//! List command - show configured requirements

use anyhow::Result;
use colored::Colorize;
use itemcount_core::domain::configuration::format_id_list;
use itemcount_core::OperationResult;

use super::{get_context, Logger};
use crate::output;

pub fn run(discount_id: Option<i64>, json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let requirements = ctx.requirement_service.list(discount_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&requirements))?);
        return Ok(());
    }

    if requirements.is_empty() {
        output::info("No item-count requirements configured.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Discount", "Products", "Min", "Max", "Currencies", "Created"]);

    for summary in &requirements {
        let config = &summary.configuration;
        table.add_row(vec![
            summary.requirement.id.to_string(),
            summary.requirement.discount_id.to_string(),
            or_any(format_id_list(&config.product_ids)),
            config.min_quantity.to_string(),
            config.max_quantity.to_string(),
            or_any(format_id_list(&config.currency_ids)),
            summary.requirement.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }

    println!("{}", table);
    println!("{}", format!("{} requirement(s)", requirements.len()).dimmed());

    let unconstrained = requirements
        .iter()
        .filter(|s| s.configuration.is_unconstrained())
        .count();
    if unconstrained > 0 {
        output::warning(&format!(
            "{} requirement(s) have no constraints and accept any non-empty cart",
            unconstrained
        ));
    }
    Ok(())
}

fn or_any(list: String) -> String {
    if list.is_empty() {
        "any".to_string()
    } else {
        list
    }
}
