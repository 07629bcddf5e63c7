// cbm/src/cli/install.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::BuildManager;
use clap::Args;
use colored::Colorize;

use crate::cli::BuildArgs;
use crate::ui;

/// Download and install the newest build of a version
#[derive(Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Patch the update channel so the build does not update itself
    #[arg(long)]
    pub disable_updates: bool,

    /// Keep the downloaded archive in the downloads directory
    #[arg(long)]
    pub keep_download: bool,
}

impl InstallArgs {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let request = self.build.request()?;

        let mut config = config.clone();
        config.disable_updates |= self.disable_updates;
        config.keep_downloads |= self.keep_download;
        let manager = BuildManager::from_config(&config)?;

        let (pb, mut on_progress) = ui::download_progress(&format!(
            "{} ({}, {})",
            request.version.clean(),
            request.arch,
            request.locale
        ));
        let result = manager
            .resolve_and_install(&request, Some(&mut on_progress))
            .await;
        pb.finish_and_clear();
        let record = result?;

        println!(
            "✓ Installed {} ({}, {}) into {}",
            record.version.clean().green(),
            record.arch,
            record.locale,
            record.install_path.display()
        );
        Ok(())
    }
}
