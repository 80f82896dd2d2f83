//! Configuration module
//!
//! One `Config` is built from the environment at process start and passed into
//! constructors; nothing reads configuration ambiently per request.

use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_STORAGE_ROOT: &str = "storage";
const DEFAULT_MAX_VIDEO_SIZE_MB: usize = 512;
const DEFAULT_MAX_CONCURRENT_TRANSCODES: usize = 4;
const DEFAULT_TRANSCODE_TIMEOUT_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Root directory for all stored assets; created at startup if absent.
    pub storage_root: PathBuf,
    pub ffmpeg_path: String,
    pub video_codec: String,
    pub video_bitrate: String,
    pub audio_codec: String,
    pub max_video_size_bytes: usize,
    pub max_concurrent_transcodes: usize,
    pub transcode_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Load .env if present; real environment wins.
        dotenvy::dotenv().ok();

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let cors_origins = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_video_size_mb = env::var("MAX_VIDEO_SIZE_MB")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_VIDEO_SIZE_MB);

        Ok(Config {
            server_port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            cors_origins,
            environment: env::var("ENVIRONMENT")
                .or_else(|_| env::var("APP_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
            storage_root: env::var("STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_ROOT)),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            video_codec: env::var("VIDEO_CODEC").unwrap_or_else(|_| "libx264".to_string()),
            video_bitrate: env::var("VIDEO_BITRATE").unwrap_or_else(|_| "2000k".to_string()),
            audio_codec: env::var("AUDIO_CODEC").unwrap_or_else(|_| "aac".to_string()),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            max_concurrent_transcodes: env::var("MAX_CONCURRENT_TRANSCODES")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|n: usize| n.max(1))
                .unwrap_or(DEFAULT_MAX_CONCURRENT_TRANSCODES),
            transcode_timeout_secs: env::var("TRANSCODE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TRANSCODE_TIMEOUT_SECS),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
