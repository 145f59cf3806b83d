//! Command-line access to the same operations the HTTP API exposes.
//!
//! `ytinfo info <ID>` prints the simplified format listing as JSON and
//! `ytinfo command <ID>` prints a ready-to-run yt-dlp invocation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use ytinfo::{
    command::{generate_command, watch_url},
    config::load_runtime_config,
    extractor::{Extractor, YtDlp},
    info::serialize_info,
    telemetry::init_tracing,
};

#[derive(Parser)]
#[command(name = "ytinfo", about = "Inspect YouTube formats via yt-dlp")]
struct Cli {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Fetch metadata and print the simplified format listing.
    Info {
        id: String,
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },
    /// Print a yt-dlp command line for the video.
    Command {
        id: String,
        /// `audio` selects the best audio stream and converts it to mp3.
        #[arg(long = "type", default_value = "video")]
        media_type: String,
        /// Explicit yt-dlp format id (letters, digits, `_`, `+`, `-`).
        #[arg(long)]
        format_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.action {
        Action::Info { id, pretty } => {
            let config = load_runtime_config().context("loading configuration")?;
            let extractor = YtDlp::from_config(&config);
            let url = watch_url(&id);
            debug!(%url, "fetching metadata");
            let info = extractor
                .extract(&url)
                .await
                .with_context(|| format!("fetching metadata for {id}"))?;
            print_json(&serialize_info(&id, &info), pretty)?;
        }
        Action::Command {
            id,
            media_type,
            format_id,
        } => {
            let descriptor = generate_command(&id, &media_type, format_id.as_deref())?;
            print_json(&descriptor, true)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .context("serializing output")?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn command_defaults_to_video() {
        let cli = Cli::try_parse_from(["ytinfo", "command", "abc"]).unwrap();
        match cli.action {
            Action::Command {
                media_type,
                format_id,
                ..
            } => {
                assert_eq!(media_type, "video");
                assert_eq!(format_id, None);
            }
            Action::Info { .. } => panic!("expected command action"),
        }
    }

    #[test]
    fn command_accepts_type_and_format_id() {
        let cli = Cli::try_parse_from([
            "ytinfo",
            "command",
            "abc",
            "--type",
            "audio",
            "--format-id",
            "140",
        ])
        .unwrap();
        match cli.action {
            Action::Command {
                media_type,
                format_id,
                ..
            } => {
                assert_eq!(media_type, "audio");
                assert_eq!(format_id.as_deref(), Some("140"));
            }
            Action::Info { .. } => panic!("expected command action"),
        }
    }
}
