//! Uninstall command - remove every item-count requirement and setting

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use itemcount_core::{LogEvent, OperationResult};

use super::{get_context, log_event, Logger};
use crate::output;

pub fn run(force: bool, json: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;
    let installed = ctx.requirement_service.installed_settings()?;

    if installed.is_empty() && !json {
        output::info("No item-count settings stored.");
    }

    // Confirm unless --force (JSON callers must pass --force)
    if !installed.is_empty() && !force {
        if json {
            println!(
                "{}",
                serde_json::to_string_pretty(&OperationResult::<()>::fail(
                    "Refusing to uninstall without --force"
                ))?
            );
            return Ok(());
        }

        println!(
            "\n{}",
            format!("This will delete {} item-count settings:", installed.len()).yellow()
        );
        for entry in installed.iter().take(8) {
            println!("  {} = {}", entry.key.dimmed(), entry.value);
        }
        if installed.len() > 8 {
            println!("  {}", format!("... and {} more", installed.len() - 8).dimmed());
        }
        println!();

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let result = ctx.requirement_service.uninstall()?;
    log_event(logger, LogEvent::new("uninstalled").with_command("uninstall"));

    if json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&result))?);
        return Ok(());
    }

    println!(
        "\n{} Removed {} requirement(s) and {} setting(s)\n",
        "✓".green(),
        result.requirements_deleted,
        result.settings_deleted
    );
    Ok(())
}
