use crate::cli::CliContext;
use crate::core::audit_log;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::{Args, Subcommand};
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum AuditCommand {
    /// Display the audit trail
    Log(AuditLogArgs),
    /// Verify audit chain integrity
    Verify(AuditVerifyArgs),
}

#[derive(Args, Debug)]
pub struct AuditLogArgs {
    /// Maximum number of entries to display
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
}

#[derive(Args, Debug)]
pub struct AuditVerifyArgs {}

pub fn run(ctx: &CliContext, cmd: AuditCommand) -> Result<()> {
    let log_path = ctx
        .config
        .audit
        .log_path
        .as_deref()
        .context("no audit log configured (set [audit] log_path in the config file)")?;
    match cmd {
        AuditCommand::Log(args) => run_log(log_path, args),
        AuditCommand::Verify(_) => run_verify(log_path),
    }
}

fn run_log(log_path: &Path, args: AuditLogArgs) -> Result<()> {
    let entries = audit_log::read_log(log_path, Some(args.limit))?;

    if entries.is_empty() {
        println!("No audit entries found.");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Timestamp").add_attribute(Attribute::Bold),
        Cell::new("Action").add_attribute(Attribute::Bold),
        Cell::new("Artifact").add_attribute(Attribute::Bold),
        Cell::new("Records").add_attribute(Attribute::Bold),
        Cell::new("Actor").add_attribute(Attribute::Bold),
        Cell::new("Result").add_attribute(Attribute::Bold),
    ]);

    for entry in &entries {
        let local: DateTime<Local> = entry.timestamp.into();
        let result_str = match &entry.result {
            Some(r) if r.success => "OK".to_string(),
            Some(r) => format!("FAIL: {}", r.error.as_deref().unwrap_or("?")),
            None => "-".to_string(),
        };
        table.add_row(vec![
            local.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.action.clone(),
            entry.artifact.clone(),
            entry
                .records
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            entry.actor.clone(),
            result_str,
        ]);
    }

    println!("{}", table);
    Ok(())
}

fn run_verify(log_path: &Path) -> Result<()> {
    let (total, errors) = audit_log::verify_chain(log_path)?;
    if errors.is_empty() {
        println!("Audit chain OK: {} entries verified", total);
        return Ok(());
    }
    for e in &errors {
        println!("  [FAIL] {}", e);
    }
    bail!("audit chain broken: {} problem(s) in {} entries", errors.len(), total);
}
