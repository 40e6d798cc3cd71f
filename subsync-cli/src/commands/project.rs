//! `subsync -c <channel> project <name>` — create a new project.

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use subsync_core::types::ChannelId;
use subsync_engine::create_project;

use super::{build_gateway, print_quota, project_dir};

/// Create a project directory with an empty manifest.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Name of the project (directory under `projects/`).
    pub name: String,
}

impl ProjectArgs {
    pub fn run(self, nickname: &str, channel: &ChannelId) -> Result<()> {
        let dir = project_dir(&self.name);
        if dir.exists() {
            bail!("project '{}' already exists at {}", self.name, dir.display());
        }

        let gateway = build_gateway(nickname)?;
        let (_, videos) = create_project(&dir, channel, &gateway)
            .with_context(|| format!("failed to create project '{}'", self.name))?;

        println!(
            "{} project '{}' created at {}",
            "✓".green(),
            self.name,
            dir.display()
        );
        println!(
            "  channel has {} video(s); drop VIDEOID_LANGUAGE.srt files into the \
             project folder and run `subsync -c {nickname} sync {}`",
            videos.len(),
            self.name
        );
        print_quota(&gateway.quota_summary());
        Ok(())
    }
}
