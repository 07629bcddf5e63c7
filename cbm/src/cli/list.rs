// cbm/src/cli/list.rs
use cbm_common::config::Config;
use cbm_common::error::Result;
use cbm_core::BuildManager;
use clap::Args;
use colored::Colorize;
use prettytable::{format, Cell, Row, Table};

/// Show installed builds
#[derive(Args, Debug)]
pub struct List {
    /// Only show builds whose folder is missing
    #[arg(long)]
    pub missing: bool,
}

impl List {
    pub fn run(&self, config: &Config) -> Result<()> {
        let manager = BuildManager::from_config(config)?;
        let mut entries = manager.list_inventory()?;
        if self.missing {
            entries.retain(|entry| !entry.present);
        }
        if entries.is_empty() {
            println!("{}", "0 builds installed".yellow());
            return Ok(());
        }
        entries.sort_by(|a, b| {
            b.record
                .version
                .natural_cmp(&a.record.version)
                .then(a.record.arch.as_str().cmp(b.record.arch.as_str()))
                .then(a.record.locale.as_str().cmp(b.record.locale.as_str()))
        });

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
        table.add_row(Row::new(vec![
            Cell::new("Version").style_spec("b"),
            Cell::new("Arch").style_spec("b"),
            Cell::new("Language").style_spec("b"),
            Cell::new("Status").style_spec("b"),
            Cell::new("Installed").style_spec("b"),
        ]));
        let mut missing = 0;
        for entry in &entries {
            let status = if entry.present {
                Cell::new("installed").style_spec("Fg")
            } else {
                missing += 1;
                Cell::new("missing").style_spec("Fr")
            };
            table.add_row(Row::new(vec![
                Cell::new(entry.record.version.clean()).style_spec("Fb"),
                Cell::new(entry.record.arch.as_str()),
                Cell::new(entry.record.locale.as_str()),
                status,
                Cell::new(&entry.record.installed_at.format("%Y-%m-%d %H:%M").to_string()),
            ]));
        }
        table.printstd();

        println!("{}", format!("{} builds", entries.len()).bold());
        if missing > 0 {
            println!(
                "{}",
                format!("{missing} missing, run `cbm reconcile` to drop them").yellow()
            );
        }
        Ok(())
    }
}
