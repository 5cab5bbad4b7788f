//! Diagnostics for key and configuration readiness.

use crate::cli::CliContext;
use crate::constants;
use crate::core::artifact;
use crate::core::key::EncryptionKey;
use crate::models::config::IvMode;
use crate::util::fs as vault_fs;
use anyhow::{bail, Result};
use clap::Args;
use std::env;

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Also check that an existing audit log can be opened for append
    #[arg(long)]
    pub audit: bool,
}

pub fn run(ctx: &CliContext, args: DoctorArgs) -> Result<()> {
    let mut ok = 0u32;
    let mut warn = 0u32;
    let mut fail = 0u32;

    println!("Doctor: roster-vault");

    // Config file
    match (&ctx.config_path, &ctx.config_load_warning) {
        (_, Some(w)) => {
            println!("  [FAIL] {}", w);
            fail += 1;
        }
        (Some(path), None) => {
            println!("  [PASS] config loaded: {}", path.display());
            ok += 1;
        }
        (None, None) => println!("  [INFO] no config file; using built-in defaults"),
    }

    // Encryption key
    match env::var(constants::KEY_ENV_VAR) {
        Ok(v) if !v.trim().is_empty() => {
            println!("  [PASS] {} is set", constants::KEY_ENV_VAR);
            ok += 1;
            match EncryptionKey::from_base64(constants::KEY_ENV_VAR, &v) {
                Ok(_) => {
                    println!("  [PASS] key decodes to {} bytes", constants::KEY_LEN);
                    ok += 1;
                }
                Err(e) => {
                    println!("  [FAIL] {}", e);
                    fail += 1;
                }
            }
        }
        _ => {
            println!("  [FAIL] {} is not set", constants::KEY_ENV_VAR);
            fail += 1;
        }
    }

    // IV mode
    match ctx.config.output.iv_mode {
        IvMode::KeyPrefix => {
            println!("  [WARN] iv_mode key-prefix: IV is derived from the key, identical rosters encrypt identically");
            warn += 1;
        }
        IvMode::Random => {
            println!("  [PASS] iv_mode random (consumers must strip the 16-byte IV prefix)");
            ok += 1;
        }
    }

    // Password policy
    let policy = &ctx.config.policy;
    println!(
        "  [INFO] password policy: {} chars for {}, {} chars otherwise",
        policy.privileged_length,
        policy.privileged_roles.join("/"),
        policy.default_length
    );

    // Audit log
    match &ctx.config.audit.log_path {
        Some(log_path) => {
            let dir = artifact::output_dir(log_path);
            if dir.is_dir() {
                println!("  [PASS] audit log directory exists: {}", dir.display());
                ok += 1;
            } else {
                println!("  [FAIL] audit log directory missing: {}", dir.display());
                fail += 1;
            }
            if args.audit && !log_path.exists() {
                println!("  [INFO] audit log not created yet: {}", log_path.display());
            } else if args.audit {
                #[cfg(unix)]
                {
                    if let Ok(mode) = vault_fs::mode_of(log_path) {
                        if mode == constants::AUDIT_LOG_MODE {
                            println!("  [PASS] audit log mode ok: {:04o}", mode);
                            ok += 1;
                        } else {
                            println!(
                                "  [WARN] audit log mode: {:04o} (expected {:04o})",
                                mode,
                                constants::AUDIT_LOG_MODE
                            );
                            warn += 1;
                        }
                    }
                }
                match std::fs::OpenOptions::new().append(true).open(log_path) {
                    Ok(_) => {
                        println!("  [PASS] audit log writable: {}", log_path.display());
                        ok += 1;
                    }
                    Err(e) => {
                        println!("  [FAIL] audit log not writable: {} ({})", log_path.display(), e);
                        fail += 1;
                    }
                }
            }
        }
        None => println!("  [INFO] audit log disabled"),
    }

    println!();
    println!("Doctor summary: {} pass, {} warn, {} fail", ok, warn, fail);
    if fail > 0 {
        bail!("doctor found {} failing check(s)", fail);
    }
    Ok(())
}
