//! FFmpeg command builder and runner.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult, Stage};
use crate::metrics;

/// Number of stderr lines kept on a failed invocation.
const STDERR_TAIL_LINES: usize = 20;

/// Builder for FFmpeg commands.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    /// Input file path
    input: PathBuf,
    /// Output file path, `-` for the null muxer
    output: PathBuf,
    /// Input arguments (before -i)
    input_args: Vec<String>,
    /// Output arguments (after -i)
    output_args: Vec<String>,
    /// Whether to overwrite output
    overwrite: bool,
    /// Log level
    log_level: String,
}

impl FfmpegCommand {
    /// Create a new FFmpeg command.
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            overwrite: true,
            log_level: "error".to_string(),
        }
    }

    /// Create a command whose output is discarded (`-f null -`).
    ///
    /// Used for analysis filters that report on stderr.
    pub fn analysis(input: impl AsRef<Path>) -> Self {
        Self::new(input, "-").log_level("info")
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add multiple input arguments.
    pub fn input_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set seek position (before input).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format_secs(seconds))
    }

    /// Set duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format_secs(seconds))
    }

    /// Set decode-side seek (after input). Sample accurate on PCM.
    pub fn output_seek(self, seconds: f64) -> Self {
        self.output_arg("-ss").output_arg(format_secs(seconds))
    }

    /// Set stop position (after input).
    pub fn until(self, seconds: f64) -> Self {
        self.output_arg("-to").output_arg(format_secs(seconds))
    }

    /// Force the input demuxer.
    pub fn input_format(self, format: impl Into<String>) -> Self {
        self.input_arg("-f").input_arg(format)
    }

    /// Set audio filter chain.
    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    /// Set audio codec.
    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    /// Set audio bitrate.
    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Copy all streams without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    /// Drop video streams.
    pub fn no_video(self) -> Self {
        self.output_arg("-vn")
    }

    /// Select an input stream.
    pub fn map(self, spec: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(spec)
    }

    /// Set log level.
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        // Overwrite flag
        if self.overwrite {
            args.push("-y".to_string());
        }

        args.push("-hide_banner".to_string());
        args.push("-v".to_string());
        args.push(self.log_level.clone());

        // Input args
        args.extend(self.input_args.clone());

        // Input file
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().to_string());

        // Output args
        args.extend(self.output_args.clone());

        // Null muxer needs an explicit format
        if self.output.as_os_str() == "-" && !self.output_args.iter().any(|a| a == "-f") {
            args.push("-f".to_string());
            args.push("null".to_string());
        }

        // Output file
        args.push(self.output.to_string_lossy().to_string());

        args
    }
}

/// Captured output of a finished tool invocation.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runner for FFmpeg commands with stderr capture and an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct FfmpegRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl FfmpegRunner {
    /// Create a new runner.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }

    /// Run an FFmpeg command to completion.
    ///
    /// A non-zero exit becomes [`MediaError::ToolFailure`] carrying the
    /// tail of stderr.
    pub async fn run(&self, cmd: &FfmpegCommand, stage: Stage) -> MediaResult<ToolOutput> {
        check_ffmpeg()?;

        let args = cmd.build_args();
        debug!(stage = %stage, "Running FFmpeg: ffmpeg {}", args.join(" "));

        let mut command = Command::new("ffmpeg");
        command.args(&args);
        self.execute(command, stage).await
    }

    /// Run an arbitrary tool command (ffprobe) under the same policy.
    pub async fn run_raw(&self, command: Command, stage: Stage) -> MediaResult<ToolOutput> {
        self.execute(command, stage).await
    }

    async fn execute(&self, mut command: Command, stage: Stage) -> MediaResult<ToolOutput> {
        let started = Instant::now();

        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let output = match self.timeout_secs {
            Some(secs) => {
                match tokio::time::timeout(Duration::from_secs(secs), child.wait_with_output())
                    .await
                {
                    Ok(result) => result?,
                    Err(_) => {
                        // Dropping the future kills the child
                        warn!(stage = %stage, "Tool timed out after {} seconds, killing process", secs);
                        metrics::record_tool_invocation(
                            stage.as_str(),
                            started.elapsed().as_secs_f64(),
                            false,
                        );
                        return Err(MediaError::Timeout { stage, secs });
                    }
                }
            }
            None => child.wait_with_output().await?,
        };

        let success = output.status.success();
        metrics::record_tool_invocation(stage.as_str(), started.elapsed().as_secs_f64(), success);

        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !success {
            return Err(MediaError::tool_failed(
                stage,
                "process exited with non-zero status",
                Some(stderr_tail(&stderr, STDERR_TAIL_LINES)),
                output.status.code(),
            ));
        }

        Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr,
        })
    }
}

/// Format seconds the way every command in this crate passes them.
pub fn format_secs(seconds: f64) -> String {
    format!("{:.6}", seconds)
}

/// Last `lines` non-empty lines of a tool's stderr.
pub fn stderr_tail(stderr: &str, lines: usize) -> String {
    let kept: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let skip = kept.len().saturating_sub(lines);
    kept[skip..].join("\n")
}

/// Check if FFmpeg is available.
pub fn check_ffmpeg() -> MediaResult<PathBuf> {
    which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)
}

/// Check if FFprobe is available.
pub fn check_ffprobe() -> MediaResult<PathBuf> {
    which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder() {
        let cmd = FfmpegCommand::new("source.wav", "seg_0001.wav")
            .seek(10.0)
            .duration(30.0)
            .audio_filter("volume=2.00dB");

        let args = cmd.build_args();
        let seek = args.iter().position(|a| a == "-ss").unwrap();
        let input = args.iter().position(|a| a == "-i").unwrap();
        let filter = args.iter().position(|a| a == "-af").unwrap();

        assert!(seek < input, "input seek must precede -i");
        assert!(filter > input);
        assert_eq!(args[seek + 1], "10.000000");
        assert_eq!(args.last().unwrap(), "seg_0001.wav");
        assert_eq!(args[0], "-y");
    }

    #[test]
    fn test_output_seek_follows_input() {
        let args = FfmpegCommand::new("in.wav", "out.wav")
            .output_seek(1.5)
            .until(4.25)
            .stream_copy()
            .build_args();
        let input = args.iter().position(|a| a == "-i").unwrap();
        let seek = args.iter().position(|a| a == "-ss").unwrap();
        let to = args.iter().position(|a| a == "-to").unwrap();

        assert!(seek > input && to > seek);
        assert_eq!(args[to + 1], "4.250000");
        assert!(args.windows(2).any(|w| w[0] == "-c" && w[1] == "copy"));
    }

    #[test]
    fn test_analysis_uses_null_muxer() {
        let args = FfmpegCommand::analysis("in.wav")
            .audio_filter("volumedetect")
            .build_args();
        let n = args.len();
        assert_eq!(&args[n - 3..], &["-f", "null", "-"]);
        assert!(args.windows(2).any(|w| w[0] == "-v" && w[1] == "info"));
    }

    #[test]
    fn test_concat_input_format() {
        let args = FfmpegCommand::new("concat.txt", "joined.wav")
            .input_format("concat")
            .input_args(["-safe", "0"])
            .stream_copy()
            .build_args();
        let input = args.iter().position(|a| a == "-i").unwrap();
        let format = args.iter().position(|a| a == "-f").unwrap();
        assert!(format < input);
        assert_eq!(args[format + 1], "concat");
    }

    #[test]
    fn test_stderr_tail() {
        let stderr = "line1\n\nline2\nline3\n";
        assert_eq!(stderr_tail(stderr, 2), "line2\nline3");
        assert_eq!(stderr_tail(stderr, 10), "line1\nline2\nline3");
        assert_eq!(stderr_tail("", 3), "");
    }
}
