//! Application setup and wiring

pub mod routes;
pub mod server;

use std::sync::Arc;

use vidnorm_core::Config;
use vidnorm_processing::{
    FfmpegTranscoder, FormatValidator, IngestionPipeline, Transcoder, TranscoderConfig,
};
use vidnorm_storage::{AssetStore, StorageLayout};

use crate::state::AppState;

/// Build the storage, pipeline, and router for the configured environment.
///
/// Storage root creation happens here, once: a failure is fatal at startup
/// rather than surfacing per request.
pub async fn initialize_app(
    config: Config,
) -> Result<(Arc<AppState>, axum::Router), anyhow::Error> {
    let store = Arc::new(AssetStore::new(&config.storage_root).await?);
    let layout = StorageLayout::new(&config.storage_root);

    let transcoder: Arc<dyn Transcoder> =
        Arc::new(FfmpegTranscoder::new(TranscoderConfig::from(&config)));
    let validator = FormatValidator::new(config.max_video_size_bytes);

    let pipeline = IngestionPipeline::new(
        store,
        layout,
        transcoder,
        validator,
        config.max_concurrent_transcodes,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        pipeline,
    });

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
