//! Codec normalization via an external ffmpeg child process.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use vidnorm_core::Config;

/// Cap on captured stderr carried into error details.
const STDERR_DETAIL_LIMIT: usize = 2048;

/// Transcoding failure kinds.
///
/// `ToolUnavailable` is a deployment fault (missing binary) and is kept
/// distinct from `ToolFailed` (the tool ran and rejected the input) so
/// operators can alert on the two separately.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("transcoding tool not found at '{path}'")]
    ToolUnavailable { path: String },

    #[error("transcoding tool exited with {exit_code:?}: {stderr}")]
    ToolFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("transcode timed out after {limit:?}")]
    TimedOut { limit: Duration },

    #[error("transcoding tool reported success but produced no output at {}", path.display())]
    EmptyOutput { path: PathBuf },

    #[error("failed to run transcoding tool: {0}")]
    Unexpected(#[from] io::Error),
}

/// Converts one media file into the canonical codec/container.
///
/// The pipeline depends on this trait rather than ffmpeg directly; tests
/// substitute their own implementations. No retries happen at this level;
/// retry policy belongs to whatever sits above the pipeline.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError>;
}

/// Encoding settings for the canonical output.
#[derive(Clone, Debug)]
pub struct TranscoderConfig {
    pub ffmpeg_path: String,
    pub video_codec: String,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub timeout: Duration,
}

impl From<&Config> for TranscoderConfig {
    fn from(config: &Config) -> Self {
        Self {
            ffmpeg_path: config.ffmpeg_path.clone(),
            video_codec: config.video_codec.clone(),
            video_bitrate: config.video_bitrate.clone(),
            audio_codec: config.audio_codec.clone(),
            timeout: Duration::from_secs(config.transcode_timeout_secs),
        }
    }
}

pub struct FfmpegTranscoder {
    config: TranscoderConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscoderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output: &Path) -> Result<(), TranscodeError> {
        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-c:v")
            .arg(&self.config.video_codec)
            .arg("-b:v")
            .arg(&self.config.video_bitrate)
            .arg("-c:a")
            .arg(&self.config.audio_codec)
            .arg(output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = std::time::Instant::now();

        let waited = tokio::time::timeout(self.config.timeout, command.output()).await;

        let spawned = match waited {
            Ok(spawned) => spawned,
            Err(_elapsed) => {
                // Dropping the output future kills the child (kill_on_drop).
                tracing::warn!(
                    input = %input.display(),
                    limit_secs = self.config.timeout.as_secs(),
                    "Transcode timed out, child process killed"
                );
                return Err(TranscodeError::TimedOut {
                    limit: self.config.timeout,
                });
            }
        };

        let process_output = match spawned {
            Ok(out) => out,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TranscodeError::ToolUnavailable {
                    path: self.config.ffmpeg_path.clone(),
                });
            }
            Err(e) => return Err(TranscodeError::Unexpected(e)),
        };

        if !process_output.status.success() {
            let stderr =
                truncate_detail(String::from_utf8_lossy(&process_output.stderr).into_owned());
            return Err(TranscodeError::ToolFailed {
                exit_code: process_output.status.code(),
                stderr,
            });
        }

        // Exit code 0 alone is not trusted: the output must exist and be non-empty.
        let len = tokio::fs::metadata(output).await.map(|m| m.len()).unwrap_or(0);
        if len == 0 {
            return Err(TranscodeError::EmptyOutput {
                path: output.to_path_buf(),
            });
        }

        tracing::info!(
            input = %input.display(),
            output = %output.display(),
            output_bytes = len,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Transcode completed"
        );

        Ok(())
    }
}

fn truncate_detail(s: String) -> String {
    if s.len() <= STDERR_DETAIL_LIMIT {
        return s;
    }
    let mut end = STDERR_DETAIL_LIMIT;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s[..end].to_string()
}
