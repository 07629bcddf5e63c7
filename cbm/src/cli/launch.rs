// cbm/src/cli/launch.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::BuildManager;
use clap::Args;

use crate::cli::BuildArgs;

/// Start an installed build
#[derive(Args, Debug)]
pub struct Launch {
    #[command(flatten)]
    pub build: BuildArgs,
}

impl Launch {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manager = BuildManager::from_config(config)?;
        let record = self.build.find_record(&manager)?;
        manager.launch(&record)?;
        println!("Started {} ({}, {})", record.version.clean(), record.arch, record.locale);
        Ok(())
    }
}
