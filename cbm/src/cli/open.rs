// cbm/src/cli/open.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::BuildManager;
use clap::Args;

use crate::cli::BuildArgs;

/// Open the install folder of a build in the file manager
#[derive(Args, Debug)]
pub struct Open {
    #[command(flatten)]
    pub build: BuildArgs,
}

impl Open {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manager = BuildManager::from_config(config)?;
        let record = self.build.find_record(&manager)?;
        manager.open_folder(&record)
    }
}
