// cbm-core/src/reconcile.rs
//! Brings the inventory back in line with what is actually on disk.
//!
//! A missing install folder always wins over a stale record. A binary that
//! reports a different version than recorded has updated itself; its folder
//! is renamed to the path derived from the new version and the record follows.
use std::fs;

use cbm_common::config::Config;
use cbm_common::error::{CbmError, Result};
use cbm_common::model::InstallRecord;
use tracing::{debug, info, warn};

use crate::inventory::{self, Inventory};
use crate::probe::VersionProbe;

/// A record that could not be repaired. The record itself was kept unchanged.
#[derive(Debug, Clone)]
pub struct ReconcileFailure {
    pub record: InstallRecord,
    pub error: CbmError,
}

#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub records: Vec<InstallRecord>,
    pub removed: usize,
    pub updated: usize,
    /// Records dropped because another record had the same identity. Their
    /// folder may well exist, so they are not counted as removed.
    pub duplicates: usize,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        self.removed + self.updated + self.duplicates > 0
    }
}

enum Outcome {
    Removed,
    Kept(InstallRecord),
    Updated(InstallRecord),
    Failed(ReconcileFailure),
}

pub struct Reconciler<P> {
    config: Config,
    inventory: Inventory,
    probe: P,
}

impl<P: VersionProbe> Reconciler<P> {
    pub fn new(config: &Config, probe: P) -> Self {
        Self {
            inventory: Inventory::new(config.inventory_path()),
            config: config.clone(),
            probe,
        }
    }

    /// Loads the inventory, reconciles it and writes it back if anything
    /// was removed, updated or collapsed.
    pub async fn run(&self) -> Result<ReconcileReport> {
        let records = self.inventory.load()?;
        let report = self.reconcile(records).await;
        if report.changed() {
            self.inventory.save(&report.records)?;
        } else {
            debug!("Inventory is consistent, nothing to write");
        }
        Ok(report)
    }

    /// Processes each record in order. Per-record failures are collected in
    /// the report and never stop the pass.
    pub async fn reconcile(&self, records: Vec<InstallRecord>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let loaded = records.len();
        let records = collapse_duplicates(records);
        report.duplicates = loaded - records.len();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            match self.reconcile_record(record).await {
                Outcome::Removed => report.removed += 1,
                Outcome::Kept(record) => kept.push(record),
                Outcome::Updated(record) => {
                    report.updated += 1;
                    kept.push(record);
                }
                Outcome::Failed(failure) => {
                    warn!(
                        "Could not reconcile {} ({}, {}): {}",
                        failure.record.version, failure.record.arch, failure.record.locale, failure.error
                    );
                    kept.push(failure.record.clone());
                    report.failures.push(failure);
                }
            }
        }

        // A rename can land a record on an identity that is already present.
        let before = kept.len();
        report.records = collapse_duplicates(kept);
        report.duplicates += before - report.records.len();

        info!(
            "Reconciled inventory: {} kept, {} removed, {} updated, {} duplicate(s), {} failed",
            report.records.len(),
            report.removed,
            report.updated,
            report.duplicates,
            report.failures.len()
        );
        report
    }

    async fn reconcile_record(&self, record: InstallRecord) -> Outcome {
        let current_path = self
            .config
            .install_path(&record.version, record.arch, &record.locale);
        if !current_path.is_dir() {
            info!(
                "Install folder {} is gone, dropping {}",
                current_path.display(),
                record.version
            );
            return Outcome::Removed;
        }

        let executable = current_path.join(record.arch.executable_relpath());
        let Some(reported) = self.probe.probe(&executable).await else {
            debug!("Version of {} unknown, keeping record", executable.display());
            return Outcome::Kept(record);
        };
        if reported == record.version.clean() {
            return Outcome::Kept(record);
        }

        let new_version = record.version.with_clean_version(&reported);
        let new_path = self
            .config
            .install_path(&new_version, record.arch, &record.locale);
        info!(
            "{} reports version {}, moving {} to {}",
            executable.display(),
            reported,
            current_path.display(),
            new_path.display()
        );

        if new_path.symlink_metadata().is_ok() {
            let error = CbmError::Reconcile(format!(
                "Cannot move {} to {}: destination already exists",
                current_path.display(),
                new_path.display()
            ));
            return Outcome::Failed(ReconcileFailure { record, error });
        }
        if let Err(e) = fs::rename(&current_path, &new_path) {
            let error = CbmError::Reconcile(format!(
                "Failed to move {} to {}: {}",
                current_path.display(),
                new_path.display(),
                e
            ));
            return Outcome::Failed(ReconcileFailure { record, error });
        }

        Outcome::Updated(InstallRecord {
            version: new_version,
            install_path: new_path,
            ..record
        })
    }
}

/// Keeps one record per identity; a later record wins.
fn collapse_duplicates(records: Vec<InstallRecord>) -> Vec<InstallRecord> {
    records.into_iter().fold(Vec::new(), inventory::upsert)
}
