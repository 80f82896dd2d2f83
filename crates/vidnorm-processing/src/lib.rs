//! Vidnorm Processing Library
//!
//! Upload validation, codec normalization via ffmpeg, and the ingestion
//! pipeline that orchestrates validate → persist → transcode.

pub mod pipeline;
pub mod transcoder;
pub mod validator;

// Re-export commonly used types
pub use pipeline::{IngestError, IngestionPipeline, IngestionReceipt};
pub use transcoder::{FfmpegTranscoder, TranscodeError, Transcoder, TranscoderConfig};
pub use validator::{FormatValidator, ValidationError};
