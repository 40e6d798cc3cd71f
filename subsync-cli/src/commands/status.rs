//! `subsync -c <channel> status <name>` — local view of a project.
//!
//! Compares the folder scan against the manifest only; no remote call, no
//! quota spent. "in sync" here means "unchanged since the last successful
//! sync", which a remote-side edit could still contradict — run `sync
//! --dry-run` for the authoritative three-way picture.

use std::collections::BTreeSet;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use subsync_core::manifest;
use subsync_core::types::SubtitleKey;
use subsync_engine::scan_project;

use super::project_dir;

/// Show local changes relative to the last synced state.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Name of the project to inspect.
    pub name: String,
}

#[derive(Tabled)]
struct StatusRow {
    #[tabled(rename = "subtitle")]
    key: String,
    #[tabled(rename = "state")]
    state: String,
    #[tabled(rename = "detail")]
    detail: String,
}

impl StatusArgs {
    pub fn run(self, _nickname: &str) -> Result<()> {
        let dir = project_dir(&self.name);
        let manifest = manifest::load(&dir)?;
        let scan = scan_project(&dir)?;

        let mut rows = Vec::new();
        let mut seen: BTreeSet<SubtitleKey> = BTreeSet::new();
        let mut in_sync = 0usize;

        for entry in &scan.entries {
            seen.insert(entry.key.clone());
            match manifest.entry(&entry.key) {
                None => rows.push(StatusRow {
                    key: entry.key.to_string(),
                    state: "new".to_string(),
                    detail: entry.file_path.display().to_string(),
                }),
                Some(m) if m.content_fingerprint != entry.content_fingerprint => {
                    rows.push(StatusRow {
                        key: entry.key.to_string(),
                        state: "modified".to_string(),
                        detail: format!("edited since {}", m.last_synced.format("%Y-%m-%d %H:%M")),
                    })
                }
                Some(_) => in_sync += 1,
            }
        }
        for key in manifest.subtitle_keys() {
            if !seen.contains(&key) {
                rows.push(StatusRow {
                    key: key.to_string(),
                    state: "deleted".to_string(),
                    detail: "local file removed; next sync deletes the remote track".to_string(),
                });
            }
        }
        for skipped in &scan.skipped {
            rows.push(StatusRow {
                key: skipped.file_name.clone(),
                state: "skipped".to_string(),
                detail: skipped.reason.clone(),
            });
        }

        println!(
            "Project '{}' — {} tracked, {} in sync, {} pending change(s)",
            self.name,
            manifest.len(),
            in_sync,
            rows.len()
        );
        if rows.is_empty() {
            println!("{} everything is in sync with the last run", "✓".green());
        } else {
            println!("{}", Table::new(rows).with(Style::sharp()));
        }
        Ok(())
    }
}
