//! `subsync -c <channel> upload --video-id … --language … --file-path …`
//!
//! One-shot caption upload, bypassing project/manifest bookkeeping.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use subsync_core::lang;
use subsync_core::types::{LanguageCode, VideoId};

use super::{build_gateway, print_quota};

/// Upload a single subtitle file to a video.
#[derive(Args, Debug)]
pub struct UploadArgs {
    #[arg(long)]
    pub video_id: String,

    #[arg(long)]
    pub language: String,

    #[arg(long)]
    pub file_path: PathBuf,
}

impl UploadArgs {
    pub fn run(self, nickname: &str) -> Result<()> {
        let language = lang::normalize(&self.language);
        if language != self.language {
            println!(
                "{} language code '{}' normalized to '{language}'",
                "ℹ".cyan(),
                self.language
            );
        }
        if !lang::is_supported(&language) {
            println!(
                "{} language code '{language}' may not be accepted by the platform",
                "⚠".yellow()
            );
        }

        let content = std::fs::read(&self.file_path)
            .with_context(|| format!("cannot read {}", self.file_path.display()))?;

        let gateway = build_gateway(nickname)?;
        let caption = gateway.upload_caption(
            &VideoId::from(self.video_id.as_str()),
            &LanguageCode::from(language),
            &content,
        )?;

        println!("{} uploaded caption track {caption}", "✓".green());
        print_quota(&gateway.quota_summary());
        Ok(())
    }
}
