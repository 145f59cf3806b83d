//! Server-rendered HTML for the `/` route.

use chrono::NaiveDate;
use serde_json::Number;

use crate::formats::SimpleFormat;
use crate::info::InfoView;

/// Render the info page for a serialized view.
pub fn render_info_page(view: &InfoView) -> String {
    let title = html_escape(view.title.as_deref().unwrap_or(&view.id));
    let uploader = view.uploader.as_deref().map(html_escape).unwrap_or_default();

    let mut facts = Vec::new();
    if let Some(date) = view.upload_date.as_deref() {
        facts.push(html_escape(&upload_date_to_iso(date).unwrap_or_else(|| date.to_string())));
    }
    if let Some(duration) = view.duration.as_ref().and_then(Number::as_f64) {
        facts.push(format_duration(duration));
    }
    if let Some(views) = view.view_count.as_ref().and_then(Number::as_f64) {
        facts.push(format!("{} views", group_thousands(views.round() as i64)));
    }

    let thumb_html = match view.thumbnail.as_deref() {
        Some(url) if !url.is_empty() => format!(
            r#"<img class="thumb" src="{}" alt="{}" loading="lazy">"#,
            html_escape(url),
            title
        ),
        _ => String::new(),
    };

    let source_html = match view.webpage_url.as_deref() {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" rel="noopener">Open on YouTube</a>"#,
            html_escape(url)
        ),
        None => String::new(),
    };

    let description_html = match view.description.as_deref() {
        Some(text) if !text.is_empty() => {
            format!(r#"<pre class="description">{}</pre>"#, html_escape(text))
        }
        _ => String::new(),
    };

    let best_html = format!(
        "<ul class=\"best\"><li>Best video: {}</li><li>Best audio: {}</li></ul>",
        best_label(view.best_video.as_ref()),
        best_label(view.best_audio.as_ref()),
    );

    let presets = format!(
        r#"<p class="presets"><a href="{}">best video+audio command</a> · <a href="{}">audio only command</a></p>"#,
        html_escape(&command_link(&view.id, None, None)),
        html_escape(&command_link(&view.id, Some("audio"), None)),
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>
body{{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;max-width:960px;margin:0 auto;padding:20px;color:#222}}
.thumb{{max-width:480px;width:100%;border-radius:8px;display:block;margin-bottom:12px}}
.meta{{color:#666;margin:4px 0 12px}}
.description{{white-space:pre-wrap;background:#f6f6f6;padding:12px;border-radius:6px;max-height:240px;overflow:auto}}
table{{border-collapse:collapse;width:100%;margin-bottom:24px;font-size:.9rem}}
th,td{{border-bottom:1px solid #ddd;padding:4px 8px;text-align:left}}
</style>
</head>
<body>
{thumb_html}
<h1>{title}</h1>
<p class="meta">{uploader}</p>
<p class="meta">{facts}</p>
<p>{source_html}</p>
{best_html}
{presets}
<h2>Video formats ({video_count})</h2>
{video_table}
<h2>Audio formats ({audio_count})</h2>
{audio_table}
{description_html}
</body>
</html>"#,
        facts = facts.join(" · "),
        video_count = view.formats.len(),
        video_table = render_format_table(&view.id, &view.formats),
        audio_count = view.audio_formats.len(),
        audio_table = render_format_table(&view.id, &view.audio_formats),
    )
}

fn render_format_table(video_id: &str, formats: &[SimpleFormat]) -> String {
    let mut rows = String::new();
    for format in formats {
        let format_id = format.format_id.as_deref().unwrap_or("");
        let command = if format_id.is_empty() {
            String::new()
        } else {
            format!(
                r#"<a href="{}">command</a>"#,
                html_escape(&command_link(video_id, None, Some(format_id)))
            )
        };
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(format_id),
            opt_text(format.ext.as_deref()),
            opt_text(format.resolution.as_deref()),
            opt_number(format.fps.as_ref()),
            opt_text(format.vcodec.as_deref()),
            opt_text(format.acodec.as_deref()),
            opt_number(format.tbr.as_ref().or(format.abr.as_ref())),
            format_size(format.filesize.as_ref().or(format.filesize_approx.as_ref())),
            command,
        ));
    }

    format!(
        "<table>\n<tr><th>id</th><th>ext</th><th>resolution</th><th>fps</th><th>vcodec</th><th>acodec</th><th>kbps</th><th>size</th><th></th></tr>\n{rows}</table>"
    )
}

fn best_label(format: Option<&SimpleFormat>) -> String {
    match format {
        Some(format) => format!(
            "{} ({}, {})",
            opt_text(format.format_id.as_deref()),
            opt_text(format.ext.as_deref()),
            opt_text(format.resolution.as_deref()),
        ),
        None => "none".to_string(),
    }
}

fn command_link(video_id: &str, media_type: Option<&str>, format_id: Option<&str>) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("id", video_id);
    if let Some(media_type) = media_type {
        query.append_pair("type", media_type);
    }
    if let Some(format_id) = format_id {
        query.append_pair("format_id", format_id);
    }
    format!("/api/command?{}", query.finish())
}

fn opt_text(value: Option<&str>) -> String {
    value.map(html_escape).unwrap_or_else(|| "-".to_string())
}

fn opt_number(value: Option<&Number>) -> String {
    value.map(Number::to_string).unwrap_or_else(|| "-".to_string())
}

/// Converts yt-dlp's `YYYYMMDD` upload date format into ISO-8601.
fn upload_date_to_iso(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .ok()
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn format_duration(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as i64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

fn format_size(bytes: Option<&Number>) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let Some(bytes) = bytes.and_then(Number::as_f64) else {
        return "-".to_string();
    };
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::{VideoInfo, serialize_info};
    use serde_json::json;

    fn sample_view() -> InfoView {
        let info: VideoInfo = serde_json::from_value(json!({
            "title": "<b>Tom & Jerry</b>",
            "uploader": "Uploader",
            "duration": 3725,
            "view_count": 1234567,
            "upload_date": "20240102",
            "thumbnail": "https://img/1.jpg",
            "description": "line one\n<script>alert(1)</script>",
            "formats": [
                {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 130.2, "filesize": 3500000},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none", "height": 1080, "resolution": "1920x1080", "fps": 30}
            ]
        }))
        .unwrap();
        serialize_info("abc_123", &info)
    }

    #[test]
    fn page_escapes_untrusted_text() {
        let html = render_info_page(&sample_view());
        assert!(html.contains("&lt;b&gt;Tom &amp; Jerry&lt;/b&gt;"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn page_lists_formats_with_command_links() {
        let html = render_info_page(&sample_view());
        assert!(html.contains("Video formats (1)"));
        assert!(html.contains("Audio formats (1)"));
        assert!(html.contains("/api/command?id=abc_123&amp;format_id=137"));
        assert!(html.contains("/api/command?id=abc_123&amp;type=audio"));
        assert!(html.contains("1920x1080"));
        assert!(html.contains("3.3 MiB"));
    }

    #[test]
    fn page_renders_facts() {
        let html = render_info_page(&sample_view());
        assert!(html.contains("2024-01-02"));
        assert!(html.contains("1:02:05"));
        assert!(html.contains("1,234,567 views"));
    }

    #[test]
    fn page_handles_empty_view() {
        let view = serialize_info("only-id", &VideoInfo::default());
        let html = render_info_page(&view);
        assert!(html.contains("<title>only-id</title>"));
        assert!(html.contains("Best video: none"));
        assert!(html.contains("Video formats (0)"));
    }

    #[test]
    fn helpers_cover_edge_cases() {
        assert_eq!(upload_date_to_iso("20240230"), None);
        assert_eq!(format_duration(59.6), "1:00");
        assert_eq!(format_duration(0.0), "0:00");
        assert_eq!(format_size(Some(&Number::from(512))), "512 B");
        assert_eq!(format_size(Number::from_f64(123456.7).as_ref()), "120.6 KiB");
        assert_eq!(format_size(None), "-");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
    }
}
