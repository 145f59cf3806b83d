//! Builds ready-to-run yt-dlp command lines for the `/api/command` endpoint.
//!
//! The generated string is meant to be pasted into a shell, so the only
//! client-supplied values that reach it are a whitelisted format id and the
//! percent-encoded video id inside the watch URL.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

pub const WATCH_URL_BASE: &str = "https://www.youtube.com/watch?v=";
pub const AUDIO_TARGET_CODEC: &str = "mp3";

static FORMAT_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_+-]+$").expect("format id pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub command: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid format_id")]
    InvalidFormatId,
}

/// Canonical watch-page URL for a video id.
pub fn watch_url(video_id: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(video_id.as_bytes()).collect();
    format!("{WATCH_URL_BASE}{encoded}")
}

pub fn is_safe_format_id(format_id: &str) -> bool {
    FORMAT_ID_PATTERN.is_match(format_id)
}

/// Picks one of three templates: an explicit format id, best audio extracted
/// to mp3 when `media_type` is `"audio"`, or best video+audio otherwise. An
/// empty `format_id` counts as absent.
pub fn generate_command(
    video_id: &str,
    media_type: &str,
    format_id: Option<&str>,
) -> Result<CommandDescriptor, CommandError> {
    let url = watch_url(video_id);

    if let Some(format_id) = format_id.filter(|id| !id.is_empty()) {
        if !is_safe_format_id(format_id) {
            return Err(CommandError::InvalidFormatId);
        }
        return Ok(CommandDescriptor {
            command: format!(r#"yt-dlp -f "{format_id}" {url}"#),
            note: "custom format_id".into(),
        });
    }

    if media_type == "audio" {
        return Ok(CommandDescriptor {
            command: format!(
                r#"yt-dlp -f "bestaudio" --extract-audio --audio-format {AUDIO_TARGET_CODEC} {url}"#
            ),
            note: "audio only".into(),
        });
    }

    Ok(CommandDescriptor {
        command: format!(r#"yt-dlp -f "bestvideo+bestaudio/best" {url}"#),
        note: "best quality (video+audio)".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_format_id_is_quoted_verbatim() {
        let cmd = generate_command("abc123", "video", Some("144p60")).unwrap();
        assert_eq!(
            cmd.command,
            r#"yt-dlp -f "144p60" https://www.youtube.com/watch?v=abc123"#
        );
        assert_eq!(cmd.note, "custom format_id");
    }

    #[test]
    fn format_id_wins_over_audio_type() {
        let cmd = generate_command("abc", "audio", Some("251+140")).unwrap();
        assert!(cmd.command.contains(r#"-f "251+140""#));
        assert!(!cmd.command.contains("--extract-audio"));
        assert_eq!(cmd.note, "custom format_id");
    }

    #[test]
    fn unsafe_format_ids_are_rejected() {
        for bad in ["bad;id", "a b", "\"x\"", "$(rm)", "x\n", "137/best", "a&b", "ü"] {
            assert_eq!(
                generate_command("abc", "video", Some(bad)),
                Err(CommandError::InvalidFormatId),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn audio_type_extracts_mp3() {
        let cmd = generate_command("abc", "audio", None).unwrap();
        assert_eq!(
            cmd.command,
            r#"yt-dlp -f "bestaudio" --extract-audio --audio-format mp3 https://www.youtube.com/watch?v=abc"#
        );
        assert_eq!(cmd.note, "audio only");
    }

    #[test]
    fn default_is_best_video_plus_audio() {
        for media_type in ["video", "", "whatever"] {
            let cmd = generate_command("abc", media_type, None).unwrap();
            assert!(cmd.command.contains(r#"-f "bestvideo+bestaudio/best""#));
            assert_eq!(cmd.note, "best quality (video+audio)");
        }
    }

    #[test]
    fn empty_format_id_counts_as_absent() {
        let cmd = generate_command("abc", "audio", Some("")).unwrap();
        assert_eq!(cmd.note, "audio only");
    }

    #[test]
    fn watch_url_encodes_shell_metacharacters() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert_eq!(
            watch_url("x; rm -rf ~"),
            "https://www.youtube.com/watch?v=x%3B+rm+-rf+%7E"
        );
        let cmd = generate_command("a\"$(id)`", "video", None).unwrap();
        assert!(!cmd.command.contains(['$', '`', '(']));
    }
}
