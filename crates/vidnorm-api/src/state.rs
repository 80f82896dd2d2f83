use vidnorm_core::Config;
use vidnorm_processing::IngestionPipeline;

/// Shared per-process state handed to every handler.
///
/// The pipeline owns the transcode semaphore, so cloning the `Arc<AppState>`
/// across request tasks shares one bounded worker pool.
pub struct AppState {
    pub config: Config,
    pub pipeline: IngestionPipeline,
}
