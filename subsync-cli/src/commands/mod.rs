//! Command implementations and shared wiring.

pub mod project;
pub mod status;
pub mod sync;
pub mod upload;

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use subsync_gateway::{
    Gateway, HttpRemote, QuotaSummary, ResponseCache, DAILY_QUOTA_BUDGET,
};

use crate::credentials;

/// Session quota level at which the footer starts warning.
const QUOTA_WARN_THRESHOLD: u64 = 9_000;

/// `projects/<name>` relative to the working directory.
pub(crate) fn project_dir(name: &str) -> PathBuf {
    PathBuf::from("projects").join(name)
}

/// Build the live gateway for a channel nickname: credential, HTTP
/// transport, and the home-scoped response cache.
pub(crate) fn build_gateway(nickname: &str) -> Result<Gateway<HttpRemote>> {
    let token = credentials::load(nickname)?;
    let cache_dir = dirs::home_dir()
        .context("could not determine home directory")?
        .join(".subsync")
        .join("cache");
    let remote = HttpRemote::new(Box::new(token));
    Ok(Gateway::new(remote, ResponseCache::new(cache_dir)))
}

/// Print the session quota footer.
pub(crate) fn print_quota(summary: &QuotaSummary) {
    println!("\n{}", "API quota usage (estimated)".bold());
    if summary.by_kind.is_empty() {
        println!("  no metered calls this session");
        return;
    }
    for (kind, total) in &summary.by_kind {
        println!(
            "  {:<14} {} call(s), {} unit(s)",
            kind.to_string(),
            total.calls,
            total.cost
        );
    }
    let cost = summary.total_cost();
    println!(
        "  total: {cost} of ~{DAILY_QUOTA_BUDGET} daily unit(s)"
    );
    if cost > QUOTA_WARN_THRESHOLD {
        println!(
            "  {}",
            "warning: approaching or past the daily quota".yellow()
        );
    }
}
