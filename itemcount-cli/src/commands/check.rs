//! Check command - evaluate a cart against a requirement

use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use itemcount_core::{CartLine, EvaluationContext, EvaluationRequest, LogEvent, OperationResult};

use super::{get_context, log_event, Logger};
use crate::output;

/// Arguments for a single evaluation
pub struct CheckArgs<'a> {
    pub requirement_id: i64,
    pub currency: i64,
    pub customer_id: Option<i64>,
    pub cart: Option<&'a str>,
    pub cart_file: Option<&'a Path>,
    pub json: bool,
}

pub fn run(args: CheckArgs<'_>, logger: &Logger) -> Result<()> {
    let cart_lines = read_cart(args.cart, args.cart_file)?;

    let ctx = get_context(logger)?;
    let request = EvaluationRequest::new(
        args.requirement_id,
        EvaluationContext {
            customer_id: args.customer_id,
            working_currency_id: args.currency,
            cart_lines,
        },
    );
    let verdict = ctx.check(&request);

    log_event(
        logger,
        LogEvent::new("requirement_checked")
            .with_requirement(args.requirement_id)
            .with_command("check"),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&OperationResult::ok(&verdict))?);
        return Ok(());
    }

    if verdict.is_satisfied {
        output::success(&format!(
            "\n✓ Requirement {} satisfied ({} eligible units)\n",
            args.requirement_id, verdict.eligible_quantity
        ));
    } else {
        let reason = verdict.reason.map(|r| r.as_str()).unwrap_or("unknown");
        output::warning(&format!(
            "\n✗ Requirement {} not satisfied: {}",
            args.requirement_id, reason
        ));
        println!("{}\n", format!("  {} eligible units", verdict.eligible_quantity).dimmed());
    }

    Ok(())
}

/// Cart from `--cart`, `--cart-file`, or piped stdin (in that order)
fn read_cart(cart: Option<&str>, cart_file: Option<&Path>) -> Result<Vec<CartLine>> {
    if let Some(raw) = cart {
        return parse_compact_cart(raw);
    }

    if let Some(path) = cart_file {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read cart file: {}", path.display()))?;
        return parse_cart_text(&content);
    }

    if atty::isnt(atty::Stream::Stdin) {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return parse_cart_text(&content);
    }

    Ok(Vec::new())
}

/// JSON array of lines, or the compact `product:qty,...` form
fn parse_cart_text(content: &str) -> Result<Vec<CartLine>> {
    let trimmed = content.trim();
    if trimmed.starts_with('[') {
        serde_json::from_str(trimmed).context("Invalid cart JSON")
    } else {
        parse_compact_cart(trimmed)
    }
}

/// Lines are separated by commas or newlines; spaces inside a line are allowed
fn parse_compact_cart(raw: &str) -> Result<Vec<CartLine>> {
    raw.split(|c: char| c == ',' || c == '\n')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| CartLine::parse(token).ok_or_else(|| anyhow!("Invalid cart line '{}'", token)))
        .collect()
}
