use crate::cli::CliContext;
use crate::core::audit_log::AuditContext;
use crate::core::{artifact, provision};
use crate::models::config::IvMode;
use anyhow::{bail, Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Encrypted artifact produced by `seal`
    pub artifact: PathBuf,

    /// Output file for the decrypted roster (avoid stdout)
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Allow stdout output (dangerous: prints passwords)
    #[arg(long)]
    pub confirm: bool,

    /// Reason for stdout output (logged)
    #[arg(long)]
    pub reason: Option<String>,

    /// IV mode the artifact was sealed with
    #[arg(long, value_enum)]
    pub iv_mode: Option<IvMode>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Encrypted artifact produced by `seal`
    pub artifact: PathBuf,

    /// Output format: table|json
    #[arg(long, default_value = "table")]
    pub format: String,

    /// IV mode the artifact was sealed with
    #[arg(long, value_enum)]
    pub iv_mode: Option<IvMode>,
}

#[derive(Serialize)]
struct ListItem {
    username: String,
    name: String,
    role: String,
}

pub fn run_open(ctx: &CliContext, args: OpenArgs) -> Result<()> {
    let key = ctx.load_key()?;
    let iv_mode = ctx.iv_mode(args.iv_mode);

    if args.output.is_none() {
        if !args.confirm {
            bail!("refusing to print the decrypted roster to stdout without --confirm");
        }
        if args.reason.as_deref().unwrap_or("").trim().is_empty() {
            bail!("--reason is required when printing to stdout");
        }
    }

    let audit_ctx = AuditContext {
        action: "open".into(),
        artifact: args.artifact.display().to_string(),
        iv_mode: Some(iv_mode.to_string()),
        reason: args.reason.clone(),
        ..Default::default()
    };

    // Audited once the plaintext has actually been delivered.
    let outcome = provision::unseal(&key, &args.artifact, iv_mode)
        .with_context(|| format!("open {}", args.artifact.display()))
        .and_then(|plaintext| deliver(&plaintext, args.output.as_deref()));
    ctx.audit(audit_ctx, &outcome);
    outcome
}

fn deliver(plaintext: &[u8], output: Option<&Path>) -> Result<()> {
    if let Some(output) = output {
        artifact::write_private(output, plaintext)?;
        println!("Wrote {}", output.display());
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    stdout.write_all(plaintext).context("write to stdout")?;
    stdout.write_all(b"\n").context("write to stdout")?;
    stdout.flush().context("flush stdout")?;
    Ok(())
}

pub fn run_list(ctx: &CliContext, args: ListArgs) -> Result<()> {
    if args.format != "table" && args.format != "json" {
        bail!("invalid format: {} (use table|json)", args.format);
    }
    let key = ctx.load_key()?;
    let iv_mode = ctx.iv_mode(args.iv_mode);

    let users = provision::unseal_roster(&key, &args.artifact, iv_mode)
        .with_context(|| format!("open {}", args.artifact.display()))?;
    let items: Vec<ListItem> = users
        .into_iter()
        .map(|u| ListItem {
            username: u.username_text(),
            name: u.name_text(),
            role: u.role_text(),
        })
        .collect();

    if args.format == "json" {
        let json = serde_json::to_string_pretty(&items).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if items.is_empty() {
        println!("No users in {}", args.artifact.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("Username").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Role").add_attribute(Attribute::Bold),
    ]);
    for item in items {
        table.add_row(vec![item.username, item.name, item.role]);
    }

    println!("{}", table);
    Ok(())
}
