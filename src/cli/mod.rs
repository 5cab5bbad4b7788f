//! CLI routing and command dispatch.

use crate::constants;
use crate::core::audit_log::{self, AuditContext};
use crate::core::config;
use crate::core::key::EncryptionKey;
use crate::error::ProvisionError;
use crate::models::config::{IvMode, ProvisionConfig};
use crate::util::journald;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::Input;
use std::path::PathBuf;

pub mod audit;
pub mod doctor;
pub mod open;
pub mod seal;
pub mod verify;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub config: ProvisionConfig,
    pub config_path: Option<PathBuf>,
    pub config_load_warning: Option<String>,
    pub non_interactive: bool,
}

impl CliContext {
    /// Load the encryption key from the environment. Fatal when absent.
    pub fn load_key(&self) -> Result<EncryptionKey> {
        Ok(EncryptionKey::from_env(constants::KEY_ENV_VAR)?)
    }

    /// IV mode from the command line, else from the config file.
    pub fn iv_mode(&self, arg: Option<IvMode>) -> IvMode {
        arg.unwrap_or(self.config.output.iv_mode)
    }

    /// Use `arg` if given, otherwise ask the operator.
    pub fn path_or_prompt(&self, arg: Option<PathBuf>, flag: &str, prompt: &str) -> Result<PathBuf> {
        if let Some(path) = arg {
            return Ok(path);
        }
        if self.non_interactive {
            bail!("--non-interactive requires {}", flag);
        }
        let answer: String = Input::new()
            .with_prompt(prompt)
            .interact_text()
            .context("read path from prompt")?;
        Ok(PathBuf::from(answer.trim()))
    }

    /// Record the outcome of a run in the audit log, if one is configured.
    /// Audit problems are reported but never fail the command.
    pub fn audit<T>(&self, ctx: AuditContext, outcome: &Result<T>) {
        let Some(log_path) = &self.config.audit.log_path else {
            return;
        };
        let error = outcome.as_ref().err().map(|e| format!("{:#}", e));
        match audit_log::log_with_result(log_path, ctx, outcome.is_ok(), error) {
            Ok(entry) => {
                if self.config.audit.journald {
                    journald::forward_line(constants::JOURNALD_TAG, &journald::summary_line(&entry));
                }
            }
            Err(e) => eprintln!("warning: audit log failed: {:#}", e),
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "roster-vault",
    version,
    about = "Provision user rosters with generated passwords as an encrypted artifact"
)]
pub struct Cli {
    /// Config file (TOML)
    #[arg(long, global = true, value_name = "PATH", env = "ROSTER_VAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run in non-interactive mode (no prompts, suitable for automation)
    #[arg(long, global = true, env = "ROSTER_VAULT_NON_INTERACTIVE")]
    pub non_interactive: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config_path = config::resolve_path(self.config);

        // Doctor reports a broken config instead of failing on it.
        let mut config_load_warning = None;
        let config = match config::load(config_path.as_deref()) {
            Ok(config) => config,
            Err(e) if matches!(self.command, Commands::Doctor(_)) => {
                config_load_warning = Some(e.to_string());
                ProvisionConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        let ctx = CliContext {
            config,
            config_path,
            config_load_warning,
            non_interactive: self.non_interactive,
        };

        match self.command {
            Commands::Seal(args) => seal::run(&ctx, args),
            Commands::Open(args) => open::run_open(&ctx, args),
            Commands::List(args) => open::run_list(&ctx, args),
            Commands::Verify(args) => verify::run(&ctx, args),
            Commands::Doctor(args) => doctor::run(&ctx, args),
            Commands::Audit { command } => audit::run(&ctx, command),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate passwords for a roster and write the encrypted artifact
    Seal(seal::SealArgs),
    /// Decrypt an artifact back to roster JSON
    Open(open::OpenArgs),
    /// List the users in an artifact (no passwords)
    List(open::ListArgs),
    /// Check that an artifact decrypts and matches the password policy
    Verify(verify::VerifyArgs),
    /// Diagnose key and configuration (safe, read-only)
    Doctor(doctor::DoctorArgs),
    /// View or verify the audit trail
    Audit {
        #[command(subcommand)]
        command: audit::AuditCommand,
    },
}

/// Process exit code for a failed command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|e| e.downcast_ref::<ProvisionError>())
        .map(|e| e.category().exit_code())
        .unwrap_or(1)
}
