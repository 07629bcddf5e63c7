// cbm/src/cli/reconcile.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::{ProcessVersionProbe, Reconciler};
use clap::Args;
use colored::Colorize;

use crate::ui;

/// Drop records whose folder is gone and follow builds that updated themselves
#[derive(Args, Debug)]
pub struct Reconcile {}

impl Reconcile {
    pub async fn run(&self, config: &Config) -> Result<()> {
        let reconciler = Reconciler::new(config, ProcessVersionProbe::new(config.probe_timeout));
        let pb = ui::create_spinner("Checking installed builds");
        let report = reconciler.run().await;
        pb.finish_and_clear();
        let report = report?;

        for failure in &report.failures {
            println!(
                "{} {} ({}, {}): {}",
                "✖".red(),
                failure.record.version.clean(),
                failure.record.arch,
                failure.record.locale,
                failure.error
            );
        }
        if report.changed() {
            println!(
                "✓ {} removed, {} updated, {} duplicate(s) dropped, {} kept",
                report.removed.to_string().yellow(),
                report.updated.to_string().green(),
                report.duplicates,
                report.records.len()
            );
        } else {
            println!("✓ Inventory is up to date ({} builds)", report.records.len());
        }
        Ok(())
    }
}
