// cbm/src/cli.rs
//! Defines the command-line argument structure using clap.
use cbm_common::error::{CbmError, Result};
use cbm_common::model::{InstallRecord, VersionId};
use cbm_common::Config;
use cbm_core::{BuildManager, InstallRequest};
use cbm_net::HttpDirectoryIndex;
use clap::{ArgAction, Args, Parser, Subcommand};

pub mod install;
pub mod launch;
pub mod list;
pub mod open;
pub mod reconcile;
pub mod remove;
pub mod versions;

use crate::cli::install::InstallArgs;
use crate::cli::launch::Launch;
use crate::cli::list::List;
use crate::cli::open::Open;
use crate::cli::reconcile::Reconcile;
use crate::cli::remove::Remove;
use crate::cli::versions::Versions;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "cbm", bin_name = "cbm")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Versions(Versions),
    Install(InstallArgs),
    List(List),
    Remove(Remove),
    Launch(Launch),
    Open(Open),
    Reconcile(Reconcile),
}

impl Command {
    pub async fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Versions(command) => command.run(config).await,
            Self::Install(command) => command.run(config).await,
            Self::List(command) => command.run(config),
            Self::Remove(command) => command.run(config),
            Self::Launch(command) => command.run(config),
            Self::Open(command) => command.run(config),
            Self::Reconcile(command) => command.run(config).await,
        }
    }
}

/// Identifies one build: version, architecture and locale.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Version, e.g. 128.0b3 (the -candidates suffix is optional)
    pub version: String,

    /// One of win64, win32, mac, linux-x86_64
    #[arg(short, long, default_value = "win64")]
    pub arch: String,

    /// Language code such as en-US or de
    #[arg(short, long, default_value = "en-US")]
    pub locale: String,
}

impl BuildArgs {
    pub fn request(&self) -> Result<InstallRequest> {
        InstallRequest::parse(&self.version, &self.arch, &self.locale)
    }

    /// Looks up the inventory record, accepting the version with or without
    /// the candidates suffix.
    pub fn find_record(
        &self,
        manager: &BuildManager<HttpDirectoryIndex>,
    ) -> Result<InstallRecord> {
        let request = self.request()?;
        let exact = VersionId::new(self.version.trim());
        for version in [&request.version, &exact] {
            if let Some(record) = manager.find_record(version, request.arch, &request.locale)? {
                return Ok(record);
            }
        }
        Err(CbmError::NotFound(format!(
            "no installed build {} ({}, {})",
            self.version, request.arch, request.locale
        )))
    }
}
