//! itemcount - admin CLI for the item-count discount requirement

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use itemcount_core::LogEvent;

mod commands;
mod output;

use commands::{check, configure, currencies, get_logger, list, log_event, logs, remove, uninstall, Logger};

/// itemcount - configure and test item-count discount requirements
#[derive(Parser)]
#[command(name = "itemcount", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit a requirement's configuration
    Configure {
        #[command(subcommand)]
        command: configure::ConfigureCommands,
    },

    /// Evaluate a cart against a requirement
    Check {
        /// Requirement to evaluate
        #[arg(long)]
        requirement_id: i64,
        /// Working currency ID
        #[arg(long)]
        currency: i64,
        /// Cart owner (omitted means no identifiable customer)
        #[arg(long)]
        customer_id: Option<i64>,
        /// Cart lines as product:qty pairs, e.g. 5:2,6:1
        #[arg(long, conflicts_with = "cart_file")]
        cart: Option<String>,
        /// Read cart lines from a JSON file
        #[arg(long)]
        cart_file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List configured requirements
    List {
        /// Only requirements of this discount
        #[arg(long)]
        discount_id: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Remove a requirement and its settings
    Remove {
        /// Requirement ID to remove
        requirement_id: i64,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Remove every item-count requirement and its settings
    Uninstall {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available currencies
    Currencies {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Configure { command } => match command {
                configure::ConfigureCommands::Show { .. } => "configure show",
                configure::ConfigureCommands::Set { .. } => "configure set",
            },
            Commands::Check { .. } => "check",
            Commands::List { .. } => "list",
            Commands::Remove { .. } => "remove",
            Commands::Uninstall { .. } => "uninstall",
            Commands::Currencies { .. } => "currencies",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let name = cli.command.name();

    // One logger for the whole invocation, shared with the context
    let logger = get_logger();
    let result = run(cli, &logger);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string()),
            );
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, logger: &Logger) -> Result<()> {
    if !matches!(cli.command, Commands::Logs { .. }) {
        log_event(
            logger,
            LogEvent::new("command_executed").with_command(cli.command.name()),
        );
    }

    match cli.command {
        Commands::Configure { command } => configure::run(command, logger),
        Commands::Check {
            requirement_id,
            currency,
            customer_id,
            cart,
            cart_file,
            json,
        } => check::run(
            check::CheckArgs {
                requirement_id,
                currency,
                customer_id,
                cart: cart.as_deref(),
                cart_file: cart_file.as_deref(),
                json,
            },
            logger,
        ),
        Commands::List { discount_id, json } => list::run(discount_id, json, logger),
        Commands::Remove {
            requirement_id,
            force,
        } => remove::run(requirement_id, force, logger),
        Commands::Uninstall { force, json } => uninstall::run(force, json, logger),
        Commands::Currencies { json } => currencies::run(json, logger),
        Commands::Logs { command } => logs::run(command, logger),
    }
}
