//! Seam to the metadata extractor.
//!
//! Handlers only see the [`Extractor`] trait; production wires in [`YtDlp`],
//! which shells out to the yt-dlp binary and parses its single-JSON dump.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::config::RuntimeConfig;
use crate::info::VideoInfo;

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Fetches metadata for a canonical watch-page URL.
    async fn extract(&self, url: &str) -> Result<VideoInfo>;
}

/// Runs `yt-dlp --dump-single-json` for every request.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    cookies: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cookies: None,
        }
    }

    pub fn with_cookies(mut self, cookies: Option<PathBuf>) -> Self {
        self.cookies = cookies;
        self
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(config.ytdlp_path.clone()).with_cookies(config.ytdlp_cookies.clone())
    }

    fn command(&self, url: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("--dump-single-json")
            .arg("--skip-download")
            .arg("--no-warnings")
            .arg("--no-progress")
            .arg("--no-check-certificates")
            .arg("--concurrent-fragments")
            .arg("1");

        if let Some(cookies) = self.cookies.as_ref().filter(|path| path.exists()) {
            command.arg("--cookies").arg(cookies);
        }

        command
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        command
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(&self, url: &str) -> Result<VideoInfo> {
        debug!(program = %self.program, url, "running yt-dlp");
        let output = self
            .command(url)
            .output()
            .await
            .with_context(|| format!("running {} for {}", self.program, url))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no error output");
            bail!(
                "metadata command failed for {} ({}): {}",
                url,
                output.status,
                reason.trim()
            );
        }

        let raw_json =
            String::from_utf8(output.stdout).context("parsing metadata JSON response as UTF-8")?;
        serde_json::from_str(&raw_json).context("deserializing metadata JSON")
    }
}
