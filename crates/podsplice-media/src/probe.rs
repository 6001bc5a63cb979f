//! FFprobe media information.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;

use crate::command::{check_ffprobe, FfmpegRunner};
use crate::error::{MediaError, MediaResult, Stage};

/// Whether the source carries a video track alongside its audio.
///
/// Resolved once per run from the probe; the assembler never looks at
/// file extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaMode {
    AudioOnly,
    AudioWithVideo,
}

/// Media file information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Duration in seconds
    pub duration: f64,
    /// Whether at least one audio stream exists
    pub has_audio: bool,
    /// Whether at least one video stream exists (cover art excluded)
    pub has_video: bool,
    /// Codec of the first audio stream
    pub audio_codec: Option<String>,
    /// Sample rate of the first audio stream in Hz
    pub sample_rate: Option<u32>,
    /// Channel count of the first audio stream
    pub channels: Option<u32>,
    /// File size in bytes
    pub size: u64,
}

impl MediaInfo {
    pub fn mode(&self) -> MediaMode {
        if self.has_video {
            MediaMode::AudioWithVideo
        } else {
            MediaMode::AudioOnly
        }
    }
}

/// FFprobe JSON output format.
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: String,
    codec_name: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    #[serde(default)]
    disposition: FfprobeDisposition,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeDisposition {
    #[serde(default)]
    attached_pic: u8,
}

/// Probe a media file for information.
pub async fn probe_media(runner: &FfmpegRunner, path: impl AsRef<Path>) -> MediaResult<MediaInfo> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    check_ffprobe()?;

    let mut command = Command::new("ffprobe");
    command
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ])
        .arg(path);

    let output = runner.run_raw(command, Stage::Probe).await?;
    parse_probe_output(&output.stdout)
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_probe_output(json: &str) -> MediaResult<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;

    let audio = probe.streams.iter().find(|s| s.codec_type == "audio");
    // Embedded cover art shows up as a video stream; it is not video
    let has_video = probe
        .streams
        .iter()
        .any(|s| s.codec_type == "video" && s.disposition.attached_pic == 0);

    let duration = probe
        .format
        .duration
        .as_ref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::input("probe reported no duration"))?;

    let size = probe
        .format
        .size
        .as_ref()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);

    Ok(MediaInfo {
        duration,
        has_audio: audio.is_some(),
        has_video,
        audio_codec: audio.and_then(|s| s.codec_name.clone()),
        sample_rate: audio
            .and_then(|s| s.sample_rate.as_ref())
            .and_then(|r| r.parse().ok()),
        channels: audio.and_then(|s| s.channels),
        size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_audio_only() {
        let json = r#"{
            "streams": [{"codec_type": "audio", "codec_name": "mp3", "sample_rate": "44100", "channels": 2}],
            "format": {"duration": "3601.254000", "size": "28810000"}
        }"#;
        let info = parse_probe_output(json).unwrap();

        assert!((info.duration - 3601.254).abs() < 1e-9);
        assert_eq!(info.mode(), MediaMode::AudioOnly);
        assert_eq!(info.sample_rate, Some(44100));
        assert_eq!(info.audio_codec.as_deref(), Some("mp3"));
    }

    #[test]
    fn test_cover_art_is_not_video() {
        let json = r#"{
            "streams": [
                {"codec_type": "audio", "codec_name": "mp3"},
                {"codec_type": "video", "codec_name": "mjpeg", "disposition": {"attached_pic": 1}}
            ],
            "format": {"duration": "10.0"}
        }"#;
        assert_eq!(parse_probe_output(json).unwrap().mode(), MediaMode::AudioOnly);
    }

    #[test]
    fn test_video_container() {
        let json = r#"{
            "streams": [
                {"codec_type": "video", "codec_name": "h264"},
                {"codec_type": "audio", "codec_name": "aac"}
            ],
            "format": {"duration": "12.5"}
        }"#;
        assert_eq!(parse_probe_output(json).unwrap().mode(), MediaMode::AudioWithVideo);
    }

    #[test]
    fn test_missing_duration_is_input_error() {
        let json = r#"{"streams": [], "format": {}}"#;
        assert!(parse_probe_output(json).unwrap_err().is_input_error());
    }
}
