//! Ingestion pipeline: validate → persist original → transcode → receipt.
//!
//! Per-request state machine: Received → Validated → OriginalPersisted →
//! Transcoding → {Succeeded, Failed}. A request never transcodes before its
//! original is durably on disk, and every Failed outcome removes whatever
//! that request created (never another request's assets; paths are
//! partitioned by identifier).

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tokio::sync::Semaphore;

use vidnorm_core::{ContainerFormat, StorageRole, VideoId};
use vidnorm_storage::{AssetStore, StorageError, StorageLayout, UploadedAsset};

use crate::transcoder::{TranscodeError, Transcoder};
use crate::validator::{FormatValidator, ValidationError};

/// Failure kinds for one ingestion attempt, ordered roughly by pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("ingestion task aborted: {0}")]
    TaskAborted(String),
}

/// Everything a successful ingestion leaves behind.
#[derive(Debug, Clone)]
pub struct IngestionReceipt {
    pub video_id: VideoId,
    pub input_format: ContainerFormat,
    pub original: UploadedAsset,
    pub normalized: UploadedAsset,
    pub ingested_at: DateTime<Utc>,
}

pub struct IngestionPipeline {
    store: Arc<AssetStore>,
    layout: StorageLayout,
    transcoder: Arc<dyn Transcoder>,
    validator: FormatValidator,
    transcode_permits: Arc<Semaphore>,
}

impl IngestionPipeline {
    pub fn new(
        store: Arc<AssetStore>,
        layout: StorageLayout,
        transcoder: Arc<dyn Transcoder>,
        validator: FormatValidator,
        max_concurrent_transcodes: usize,
    ) -> Self {
        Self {
            store,
            layout,
            transcoder,
            validator,
            transcode_permits: Arc::new(Semaphore::new(max_concurrent_transcodes.max(1))),
        }
    }

    /// Run one upload through the full pipeline.
    ///
    /// Validation happens inline, before an identifier exists, so rejected
    /// uploads leave zero filesystem trace. Everything after validation runs
    /// on a spawned task whose handle this method awaits: a client that
    /// disconnects mid-transcode drops the request future, not the work, so
    /// every accepted ingestion reaches a terminal state and cleanup always
    /// runs (run-to-completion-and-discard).
    pub async fn ingest(
        &self,
        data: Bytes,
        claimed_filename: &str,
    ) -> Result<IngestionReceipt, IngestError> {
        let format = self.validator.validate(claimed_filename, data.len())?;
        let video_id = VideoId::allocate();

        tracing::info!(
            video_id = %video_id,
            filename = %claimed_filename,
            format = %format,
            size_bytes = data.len(),
            "Ingestion accepted"
        );

        let store = self.store.clone();
        let layout = self.layout.clone();
        let transcoder = self.transcoder.clone();
        let permits = self.transcode_permits.clone();

        let task = tokio::spawn(async move {
            Self::persist_and_transcode(store, layout, transcoder, permits, video_id, format, data)
                .await
        });

        match task.await {
            Ok(result) => result,
            Err(e) => Err(IngestError::TaskAborted(e.to_string())),
        }
    }

    async fn persist_and_transcode(
        store: Arc<AssetStore>,
        layout: StorageLayout,
        transcoder: Arc<dyn Transcoder>,
        permits: Arc<Semaphore>,
        video_id: VideoId,
        format: ContainerFormat,
        data: Bytes,
    ) -> Result<IngestionReceipt, IngestError> {
        let original_path = layout.path_for(video_id, StorageRole::Original, format);

        // A failed write can still leave a partial file, so it cleans up too.
        let original = match store.write(&original_path, &data).await {
            Ok(asset) => asset,
            Err(e) => {
                tracing::error!(video_id = %video_id, error = %e, "Failed to persist original");
                Self::cleanup(&store, &layout, video_id, "original write failed").await;
                return Err(e.into());
            }
        };

        let normalized_path = layout.path_for(video_id, StorageRole::Normalized, format);

        // The bounded resource is child-process fan-out: take a permit only
        // once the original is durable, right before the transcoder runs.
        let _permit = match permits.acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                Self::cleanup(&store, &layout, video_id, "transcoder pool closed").await;
                return Err(IngestError::TaskAborted("transcoder pool closed".to_string()));
            }
        };

        tracing::debug!(video_id = %video_id, output = %normalized_path.display(), "Transcoding started");

        if let Err(e) = transcoder.transcode(&original.path, &normalized_path).await {
            tracing::warn!(video_id = %video_id, error = %e, "Transcode failed, removing original");
            Self::cleanup(&store, &layout, video_id, "transcode failed").await;
            return Err(e.into());
        }

        // Receipt carries verified on-disk sizes, not the tool's word.
        let normalized_len = match store.len(&normalized_path).await {
            Ok(len) if len > 0 => len,
            Ok(_) | Err(_) => {
                Self::cleanup(&store, &layout, video_id, "normalized output missing").await;
                return Err(IngestError::Transcode(TranscodeError::EmptyOutput {
                    path: normalized_path,
                }));
            }
        };

        let normalized = UploadedAsset {
            path: normalized_path,
            len: normalized_len,
        };

        tracing::info!(
            video_id = %video_id,
            original_bytes = original.len,
            normalized_bytes = normalized.len,
            "Ingestion succeeded"
        );

        Ok(IngestionReceipt {
            video_id,
            input_format: format,
            original,
            normalized,
            ingested_at: Utc::now(),
        })
    }

    /// Best-effort removal of everything this request created. Idempotent;
    /// a cleanup failure is logged and never replaces the causal error.
    async fn cleanup(store: &AssetStore, layout: &StorageLayout, video_id: VideoId, reason: &str) {
        let dir = layout.request_dir(video_id);
        if let Err(e) = store.remove_request_dir(&dir).await {
            tracing::warn!(
                video_id = %video_id,
                dir = %dir.display(),
                error = %e,
                reason,
                "Cleanup failed"
            );
        }
    }
}
