//! Configure command - show or edit a requirement's settings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use itemcount_core::domain::configuration::parse_id_list;
use itemcount_core::services::{RequirementModel, RequirementService};
use itemcount_core::{LogEvent, OperationResult};

use super::{get_context, log_event, Logger};
use crate::output;

#[derive(Subcommand)]
pub enum ConfigureCommands {
    /// Show the current configuration of a requirement
    Show {
        /// Discount the requirement belongs to
        #[arg(long)]
        discount_id: i64,
        /// Existing requirement (omit to see defaults for a new one)
        #[arg(long)]
        requirement_id: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create or update a requirement
    Set {
        /// Discount the requirement belongs to
        #[arg(long)]
        discount_id: i64,
        /// Existing requirement (omit to create a new one)
        #[arg(long)]
        requirement_id: Option<i64>,
        /// Comma-separated product IDs (empty for any product)
        #[arg(long)]
        product_ids: Option<String>,
        /// Minimum eligible quantity (0 for no minimum)
        #[arg(long)]
        min_qty: Option<i32>,
        /// Maximum eligible quantity (0 for no maximum)
        #[arg(long)]
        max_qty: Option<i32>,
        /// Comma-separated currency IDs (empty for any currency)
        #[arg(long)]
        currency_ids: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: ConfigureCommands, logger: &Logger) -> Result<()> {
    match command {
        ConfigureCommands::Show {
            discount_id,
            requirement_id,
            json,
        } => show(discount_id, requirement_id, json, logger),
        ConfigureCommands::Set {
            discount_id,
            requirement_id,
            product_ids,
            min_qty,
            max_qty,
            currency_ids,
            json,
        } => {
            let ctx = get_context(logger)?;
            // An unknown requirement id is created on save
            let mut model = ctx
                .requirement_service
                .load_model_or_default(discount_id, requirement_id)?;

            if let Some(raw) = product_ids {
                model.product_ids_raw = raw;
            }
            if let Some(min) = min_qty {
                model.min_quantity = min;
            }
            if let Some(max) = max_qty {
                model.max_quantity = max;
            }
            if let Some(raw) = currency_ids {
                model.selected_currency_ids = parse_id_list(Some(&raw)).into_iter().collect();
            }

            let result = match ctx.requirement_service.save(&model) {
                Ok(result) => result,
                Err(e) => {
                    log_event(
                        logger,
                        LogEvent::new("requirement_save_failed")
                            .with_command("configure set")
                            .with_error(e.to_string()),
                    );
                    return Err(e.into());
                }
            };
            log_event(
                logger,
                LogEvent::new("requirement_saved")
                    .with_requirement(result.new_requirement_id)
                    .with_command("configure set"),
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&result))?);
                return Ok(());
            }

            let verb = if result.created { "created" } else { "updated" };
            output::success(&format!(
                "\n✓ Requirement {} {}\n",
                result.new_requirement_id, verb
            ));
            println!(
                "  {}",
                RequirementService::configuration_url(discount_id, Some(result.new_requirement_id))
                    .dimmed()
            );
            Ok(())
        }
    }
}

fn show(discount_id: i64, requirement_id: Option<i64>, json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let model = ctx.requirement_service.load_model(discount_id, requirement_id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&model))?);
        return Ok(());
    }

    print_model(&model);
    Ok(())
}

fn print_model(model: &RequirementModel) {
    let title = if model.requirement_id == 0 {
        format!("New requirement for discount {}", model.discount_id)
    } else {
        format!("Requirement {} (discount {})", model.requirement_id, model.discount_id)
    };
    println!("\n{}\n", title.bold());

    let any = "any".dimmed().to_string();
    let unbounded = "-".dimmed().to_string();

    let mut table = output::create_table();
    table.add_row(vec![
        "Products".to_string(),
        if model.product_ids_raw.is_empty() {
            any.clone()
        } else {
            model.product_ids_raw.clone()
        },
    ]);
    table.add_row(vec![
        "Min quantity".to_string(),
        bound(model.min_quantity, &unbounded),
    ]);
    table.add_row(vec![
        "Max quantity".to_string(),
        bound(model.max_quantity, &unbounded),
    ]);

    let currencies = model
        .selected_currency_ids
        .iter()
        .map(|id| {
            model
                .available_currencies
                .iter()
                .find(|c| c.id == *id)
                .map(|c| c.code.clone())
                .unwrap_or_else(|| id.to_string())
        })
        .collect::<Vec<_>>();
    table.add_row(vec![
        "Currencies".to_string(),
        if currencies.is_empty() { any } else { currencies.join(", ") },
    ]);

    println!("{}", table);
    println!();
}

fn bound(value: i32, unbounded: &str) -> String {
    if value > 0 {
        value.to_string()
    } else {
        unbounded.to_string()
    }
}
