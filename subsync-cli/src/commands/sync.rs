//! `subsync -c <channel> sync <name> [--dry-run]` — reconcile a project.

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use subsync_core::types::ChannelId;
use subsync_engine::{run_sync, Outcome, SyncOptions, SyncReport};

use super::{build_gateway, print_quota, project_dir};

/// Synchronize a project folder with the channel's caption tracks.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Name of the project to sync.
    pub name: String,

    /// Show what would be done without performing any remote write.
    #[arg(long)]
    pub dry_run: bool,
}

impl SyncArgs {
    pub fn run(self, nickname: &str, channel: &ChannelId) -> Result<()> {
        let gateway = build_gateway(nickname)?;
        let options = SyncOptions {
            dry_run: self.dry_run,
            ..SyncOptions::default()
        };

        let report = run_sync(&project_dir(&self.name), channel, &gateway, &options)?;
        print_report(&self.name, &report, self.dry_run);
        print_quota(&report.quota);

        if report.has_failures() {
            bail!("sync of '{}' completed with failures", self.name);
        }
        Ok(())
    }
}

fn print_report(name: &str, report: &SyncReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.actions.is_empty() {
        println!("{prefix}{} '{name}' — nothing to do", "✓".green());
    } else {
        let succeeded = report
            .actions
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Succeeded | Outcome::WouldRun))
            .count();
        println!(
            "{prefix}{} '{name}' — {succeeded}/{} action(s) {}",
            "✓".green(),
            report.actions.len(),
            if dry_run { "planned" } else { "succeeded" },
        );
        for r in &report.actions {
            let kind = r.action.kind.to_string();
            let line = match &r.outcome {
                Outcome::Succeeded => format!("  {} {kind} {}", "✎".green(), r.action.key),
                Outcome::WouldRun => format!("  {} {kind} {}", "~".cyan(), r.action.key),
                Outcome::Skipped(reason) => {
                    format!("  {} {kind} {} ({reason})", "·".dimmed(), r.action.key)
                }
                Outcome::Failed(reason) => format!(
                    "  {} {kind} {} — {}",
                    "✗".red(),
                    r.action.key,
                    reason.red()
                ),
            };
            match &r.action.note {
                Some(note) => println!("{line} [{note}]"),
                None => println!("{line}"),
            }
        }
    }

    for conflict in &report.conflicts {
        println!(
            "  {} conflict {}: {}",
            "⚠".yellow(),
            conflict.key,
            conflict.detail
        );
    }
    for skipped in &report.skipped_files {
        println!(
            "  {} skipped {}: {}",
            "⚠".yellow(),
            skipped.file_name,
            skipped.reason
        );
    }
    for failure in &report.listing_failures {
        println!(
            "  {} could not list captions for {}: {}",
            "✗".red(),
            failure.video,
            failure.error
        );
    }
}
