// cbm/src/cli/versions.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::BuildManager;
use clap::Args;
use colored::Colorize;

use crate::ui;

/// List candidate versions published on the archive
#[derive(Args, Debug)]
pub struct Versions {
    /// Show at most this many versions, newest first
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,
}

impl Versions {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let manager = BuildManager::from_config(config)?;
        let pb = ui::create_spinner(&format!("Listing {}", config.base_url));
        let versions = manager.available_versions().await;
        pb.finish_and_clear();
        let versions = versions?;

        if versions.is_empty() {
            println!("{}", "No candidate versions published".yellow());
            return Ok(());
        }
        for version in versions.iter().take(self.limit) {
            println!("{}", version.clean());
        }
        if versions.len() > self.limit {
            println!(
                "{}",
                format!("... and {} older", versions.len() - self.limit).dimmed()
            );
        }
        Ok(())
    }
}
