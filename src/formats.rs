//! Format records as reported by yt-dlp, plus the helpers that reduce them to
//! the public shape and pick the best video and audio streams.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Marker yt-dlp uses in `vcodec`/`acodec` when a stream is absent.
pub const CODEC_NONE: &str = "none";

/// One entry of yt-dlp's `formats` array.
///
/// Every field is optional because extractors fill in what they know. Numbers
/// are kept as [`Number`] whatever their documented type: yt-dlp emits
/// `720.0` or `123456.7` for some extractors, and values must serialize back
/// exactly as they arrived.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatRecord {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub filesize: Option<Number>,
    pub filesize_approx: Option<Number>,
    pub resolution: Option<String>,
    pub fps: Option<Number>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub vbr: Option<Number>,
    pub abr: Option<Number>,
    pub tbr: Option<Number>,
    pub height: Option<Number>,
}

impl FormatRecord {
    /// Audio-only records carry the `"none"` sentinel in `vcodec`. A missing
    /// `vcodec` counts as video.
    pub fn is_audio_only(&self) -> bool {
        self.vcodec.as_deref() == Some(CODEC_NONE)
    }

    fn video_rank(&self) -> (f64, f64) {
        (
            number_or_zero(self.height.as_ref()),
            number_or_zero(self.tbr.as_ref()),
        )
    }

    fn audio_rank(&self) -> f64 {
        number_or_zero(self.abr.as_ref())
    }
}

/// Public projection of a [`FormatRecord`]. Absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub filesize: Option<Number>,
    pub filesize_approx: Option<Number>,
    pub resolution: Option<String>,
    pub fps: Option<Number>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
    pub vbr: Option<Number>,
    pub abr: Option<Number>,
    pub tbr: Option<Number>,
}

pub fn simplify_format(record: &FormatRecord) -> SimpleFormat {
    SimpleFormat {
        format_id: record.format_id.clone(),
        ext: record.ext.clone(),
        filesize: record.filesize.clone(),
        filesize_approx: record.filesize_approx.clone(),
        resolution: record.resolution.clone(),
        fps: record.fps.clone(),
        vcodec: record.vcodec.clone(),
        acodec: record.acodec.clone(),
        vbr: record.vbr.clone(),
        abr: record.abr.clone(),
        tbr: record.tbr.clone(),
    }
}

/// Splits formats into (video, audio), keeping the original relative order.
pub fn partition_formats(formats: &[FormatRecord]) -> (Vec<&FormatRecord>, Vec<&FormatRecord>) {
    formats.iter().partition(|format| !format.is_audio_only())
}

/// Highest (height, tbr) pair wins. The first of several equal candidates is
/// returned.
pub fn best_video<'a>(candidates: &[&'a FormatRecord]) -> Option<&'a FormatRecord> {
    first_max_by(candidates, |a, b| {
        let (a_height, a_tbr) = a.video_rank();
        let (b_height, b_tbr) = b.video_rank();
        a_height
            .total_cmp(&b_height)
            .then(a_tbr.total_cmp(&b_tbr))
    })
}

/// Highest `abr` wins, first one on ties.
pub fn best_audio<'a>(candidates: &[&'a FormatRecord]) -> Option<&'a FormatRecord> {
    first_max_by(candidates, |a, b| a.audio_rank().total_cmp(&b.audio_rank()))
}

// `Iterator::max_by` keeps the last of equal elements; we want the first.
fn first_max_by<'a, F>(candidates: &[&'a FormatRecord], compare: F) -> Option<&'a FormatRecord>
where
    F: Fn(&FormatRecord, &FormatRecord) -> Ordering,
{
    candidates.iter().copied().reduce(|best, candidate| {
        if compare(candidate, best) == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

fn number_or_zero(value: Option<&Number>) -> f64 {
    value.and_then(Number::as_f64).unwrap_or(0.0)
}
