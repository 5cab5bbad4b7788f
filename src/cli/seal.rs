use crate::cli::CliContext;
use crate::core::audit_log::AuditContext;
use crate::core::provision::{self, SealReport};
use crate::core::key::EncryptionKey;
use crate::core::{artifact, roster};
use crate::models::config::IvMode;
use crate::models::user::UserRecord;
use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Input roster (JSON list of {username, name, role}); prompted when omitted
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Where to write the encrypted artifact; prompted when omitted
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// IV selection (key-prefix is the compatible default; random prepends a fresh IV)
    #[arg(long, value_enum)]
    pub iv_mode: Option<IvMode>,
}

pub fn run(ctx: &CliContext, args: SealArgs) -> Result<()> {
    // Key first: nothing is read when the secret is missing.
    let key = ctx.load_key()?;
    let iv_mode = ctx.iv_mode(args.iv_mode);
    if iv_mode == IvMode::KeyPrefix {
        tracing::info!("IV derived from the key; identical rosters produce identical artifacts");
    }

    let input = ctx.path_or_prompt(
        args.input,
        "--input",
        "Enter the full path to the input users.json file",
    )?;
    // Input failures are audited as well.
    let mut audit_ctx = AuditContext {
        action: "seal".into(),
        artifact: args
            .output
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        iv_mode: Some(iv_mode.to_string()),
        ..Default::default()
    };

    let outcome = load_and_seal(ctx, &key, &input, args.output, iv_mode, &mut audit_ctx);
    if let Ok(report) = &outcome {
        audit_ctx.records = Some(report.users.len());
    }
    ctx.audit(audit_ctx, &outcome);
    let report = outcome?;

    for user in &report.users {
        println!(
            "Generated password for {} (role: {})",
            user.username, user.role
        );
    }
    println!("Encrypted user list saved to: {}", report.output.display());
    Ok(())
}

fn load_and_seal(
    ctx: &CliContext,
    key: &EncryptionKey,
    input: &Path,
    output: Option<PathBuf>,
    iv_mode: IvMode,
    audit_ctx: &mut AuditContext,
) -> Result<SealReport> {
    println!("Validating JSON structure in {}...", input.display());
    let users = roster::load(input)?;
    println!("JSON structure validated.");

    let output = ctx.path_or_prompt(
        output,
        "--output",
        "Enter the full path to save the encrypted users.json file",
    )?;
    audit_ctx.artifact = output.display().to_string();

    seal_checked(key, users, &output, ctx, iv_mode)
}

fn seal_checked(
    key: &EncryptionKey,
    users: Vec<UserRecord>,
    output: &Path,
    ctx: &CliContext,
    iv_mode: IvMode,
) -> Result<SealReport> {
    artifact::check_output_dir(output)?;
    println!("Encrypting user data...");
    provision::seal(key, users, output, &ctx.config.policy, iv_mode)
        .with_context(|| format!("seal roster to {}", output.display()))
}
