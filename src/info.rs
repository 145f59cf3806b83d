//! Video metadata as returned by `yt-dlp --dump-single-json` and the response
//! shape served by `/api` and rendered by the HTML page.

use serde::{Deserialize, Serialize};
use serde_json::Number;

use crate::formats::{
    FormatRecord, SimpleFormat, best_audio, best_video, partition_formats, simplify_format,
};

/// Subset of the yt-dlp info dict this service reads. Everything besides
/// `formats` is passed through to clients untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoInfo {
    pub id: Option<String>,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<Number>,
    pub view_count: Option<Number>,
    pub upload_date: Option<String>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub formats: Vec<FormatRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoView {
    pub id: String,
    pub title: Option<String>,
    pub uploader: Option<String>,
    pub duration: Option<Number>,
    pub view_count: Option<Number>,
    pub upload_date: Option<String>,
    pub thumbnail: Option<String>,
    pub webpage_url: Option<String>,
    pub description: Option<String>,
    pub formats: Vec<SimpleFormat>,
    pub audio_formats: Vec<SimpleFormat>,
    pub best_video: Option<SimpleFormat>,
    pub best_audio: Option<SimpleFormat>,
}

/// Builds the public view. `video_id` is the identifier the client asked for,
/// which is echoed back even if the extractor normalized it.
pub fn serialize_info(video_id: &str, info: &VideoInfo) -> InfoView {
    let (video, audio) = partition_formats(&info.formats);

    InfoView {
        id: video_id.to_owned(),
        title: info.title.clone(),
        uploader: info.uploader.clone(),
        duration: info.duration.clone(),
        view_count: info.view_count.clone(),
        upload_date: info.upload_date.clone(),
        thumbnail: info.thumbnail.clone(),
        webpage_url: info.webpage_url.clone(),
        description: info.description.clone(),
        best_video: best_video(&video).map(simplify_format),
        best_audio: best_audio(&audio).map(simplify_format),
        formats: video.into_iter().map(simplify_format).collect(),
        audio_formats: audio.into_iter().map(simplify_format).collect(),
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<FormatRecord>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<FormatRecord>>::deserialize(deserializer)?.unwrap_or_default())
}
