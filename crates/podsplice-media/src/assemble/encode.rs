//! Delivery formats, chosen from the output file's extension.

use serde::Serialize;
use std::path::Path;

use crate::error::{MediaError, MediaResult};

/// Default MP3 bitrate.
pub const DEFAULT_MP3_BITRATE: &str = "64k";

/// Final encode settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryFormat {
    /// Lower-case extension without the dot.
    pub extension: String,
    pub codec: &'static str,
    /// Only set for lossy codecs.
    pub bitrate: Option<String>,
}

impl DeliveryFormat {
    /// Resolve the format from the output path's extension.
    pub fn from_path(path: &Path) -> MediaResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| {
                MediaError::input(format!("output {} has no file extension", path.display()))
            })?;

        let (codec, bitrate) = match extension.as_str() {
            "mp3" => ("libmp3lame", Some(DEFAULT_MP3_BITRATE.to_string())),
            "m4a" | "aac" => ("aac", None),
            "wav" => ("pcm_s16le", None),
            "flac" => ("flac", None),
            "ogg" | "opus" => ("libopus", None),
            other => {
                return Err(MediaError::input(format!(
                    "unsupported output format: .{}",
                    other
                )))
            }
        };

        Ok(Self {
            extension,
            codec,
            bitrate,
        })
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self.codec, "pcm_s16le" | "flac")
    }

    /// Override the bitrate. Ignored for lossless formats.
    pub fn with_bitrate(mut self, bitrate: impl Into<String>) -> Self {
        if !self.is_lossless() {
            self.bitrate = Some(bitrate.into());
        }
        self
    }

    /// File name of the encoded output inside the scratch directory.
    pub fn staged_file_name(&self) -> String {
        format!("output.{}", self.extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mp3_defaults() {
        let format = DeliveryFormat::from_path(Path::new("/out/Episode.MP3")).unwrap();
        assert_eq!(format.codec, "libmp3lame");
        assert_eq!(format.bitrate.as_deref(), Some("64k"));
        assert_eq!(format.staged_file_name(), "output.mp3");
    }

    #[test]
    fn test_bitrate_override() {
        let mp3 = DeliveryFormat::from_path(Path::new("a.mp3")).unwrap().with_bitrate("128k");
        assert_eq!(mp3.bitrate.as_deref(), Some("128k"));

        let flac = DeliveryFormat::from_path(Path::new("a.flac")).unwrap().with_bitrate("128k");
        assert_eq!(flac.bitrate, None);
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(DeliveryFormat::from_path(Path::new("a.m4a")).unwrap().codec, "aac");
        assert_eq!(DeliveryFormat::from_path(Path::new("a.wav")).unwrap().codec, "pcm_s16le");
        assert_eq!(DeliveryFormat::from_path(Path::new("a.opus")).unwrap().codec, "libopus");
    }

    #[test]
    fn test_unknown_extension_is_input_error() {
        assert!(DeliveryFormat::from_path(Path::new("a.mkv")).unwrap_err().is_input_error());
        assert!(DeliveryFormat::from_path(Path::new("noext")).unwrap_err().is_input_error());
    }
}
