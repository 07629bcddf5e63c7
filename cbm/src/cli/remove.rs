// cbm/src/cli/remove.rs
use cbm_common::config::Config;
use cbm_common::error::{CbmError, Result};
use cbm_core::BuildManager;
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;

use crate::cli::BuildArgs;

/// Delete an installed build and its record
#[derive(Args, Debug)]
pub struct Remove {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

impl Remove {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manager = BuildManager::from_config(config)?;
        let record = self.build.find_record(&manager)?;
        let folder = config.install_path(&record.version, record.arch, &record.locale);

        if !self.yes {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Permanently delete {}?",
                    folder.display()
                ))
                .default(false)
                .interact()
                .map_err(|e| CbmError::IoError(format!("Confirmation prompt failed: {e}")))?;
            if !confirmed {
                println!("Aborted.");
                return Ok(());
            }
        }

        if manager.remove_build(&record.version, record.arch, &record.locale)? {
            println!(
                "✓ Removed {} ({}, {})",
                record.version.clean().green(),
                record.arch,
                record.locale
            );
        }
        Ok(())
    }
}
