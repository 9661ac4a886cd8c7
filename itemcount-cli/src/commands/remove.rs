//! Remove command - delete a requirement and its settings

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use itemcount_core::LogEvent;

use super::{get_context, log_event, Logger};

pub fn run(requirement_id: i64, force: bool, logger: &Logger) -> Result<()> {
    let ctx = get_context(logger)?;

    // Confirm removal unless --force
    if !force {
        println!(
            "\n{}",
            format!("This will remove requirement {} and its settings.", requirement_id).yellow()
        );
        println!("{}\n", "The discount itself is not changed.".dimmed());

        if !Confirm::new()
            .with_prompt("Are you sure?")
            .default(false)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let result = ctx.requirement_service.remove(requirement_id)?;
    log_event(
        logger,
        LogEvent::new("requirement_removed")
            .with_requirement(requirement_id)
            .with_command("remove"),
    );

    println!(
        "\n{} Requirement {} removed ({} settings deleted)\n",
        "✓".green(),
        requirement_id,
        result.settings_deleted
    );

    Ok(())
}
