//! End-to-end ingestion against a real child process standing in for ffmpeg.

#![cfg(unix)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tempfile::tempdir;

use vidnorm_core::{ContainerFormat, StorageRole};
use vidnorm_processing::{
    FfmpegTranscoder, FormatValidator, IngestError, IngestionPipeline, TranscodeError,
    TranscoderConfig,
};
use vidnorm_storage::{AssetStore, StorageLayout};

fn write_stub_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

async fn pipeline_with_tool(root: &Path, tool: &Path) -> (IngestionPipeline, StorageLayout) {
    let store = Arc::new(AssetStore::new(root).await.unwrap());
    let layout = StorageLayout::new(root);
    let transcoder = FfmpegTranscoder::new(TranscoderConfig {
        ffmpeg_path: tool.to_string_lossy().into_owned(),
        video_codec: "libx264".to_string(),
        video_bitrate: "2000k".to_string(),
        audio_codec: "aac".to_string(),
        timeout: Duration::from_secs(10),
    });
    let pipeline = IngestionPipeline::new(
        store,
        layout.clone(),
        Arc::new(transcoder),
        FormatValidator::new(10 * 1024 * 1024),
        2,
    );
    (pipeline, layout)
}

#[tokio::test]
async fn test_upload_clip_mp4_end_to_end() {
    let tools = tempdir().unwrap();
    let storage = tempdir().unwrap();
    // Copies the input ($3 after -y -i) to the final argument, like a
    // transcode that preserves content.
    let tool = write_stub_tool(
        tools.path(),
        "ffmpeg",
        "#!/bin/sh\nfor last; do :; done\ncp \"$3\" \"$last\"\n",
    );
    let (pipeline, layout) = pipeline_with_tool(storage.path(), &tool).await;

    let data = Bytes::from(vec![0x42u8; 500 * 1024]);
    let receipt = pipeline.ingest(data, "clip.mp4").await.unwrap();

    let id = receipt.video_id;
    assert_eq!(id.to_string().len(), 32);
    assert!(id.to_string().chars().all(|c| c.is_ascii_hexdigit()));

    let original = layout.path_for(id, StorageRole::Original, ContainerFormat::Mp4);
    let normalized = layout.path_for(id, StorageRole::Normalized, ContainerFormat::Mp4);
    assert!(original.exists());
    assert!(normalized.exists());
    assert!(std::fs::metadata(&original).unwrap().len() > 0);
    assert!(std::fs::metadata(&normalized).unwrap().len() > 0);
    assert_eq!(normalized.extension().unwrap(), "mp4");
}

#[tokio::test]
async fn test_failing_tool_removes_original_mov() {
    let tools = tempdir().unwrap();
    let storage = tempdir().unwrap();
    let tool = write_stub_tool(
        tools.path(),
        "ffmpeg",
        "#!/bin/sh\necho 'moov atom not found' >&2\nexit 1\n",
    );
    let (pipeline, _layout) = pipeline_with_tool(storage.path(), &tool).await;

    let err = pipeline
        .ingest(Bytes::from(vec![0x13u8; 4096]), "clip.mov")
        .await
        .unwrap_err();

    match err {
        IngestError::Transcode(TranscodeError::ToolFailed { exit_code, stderr }) => {
            assert_eq!(exit_code, Some(1));
            assert!(stderr.contains("moov atom"));
        }
        other => panic!("Expected ToolFailed, got {:?}", other),
    }
    assert_eq!(std::fs::read_dir(storage.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_many_concurrent_ingestions_respect_isolation() {
    let tools = tempdir().unwrap();
    let storage = tempdir().unwrap();
    let tool = write_stub_tool(
        tools.path(),
        "ffmpeg",
        "#!/bin/sh\nfor last; do :; done\ncp \"$3\" \"$last\"\n",
    );
    let (pipeline, _layout) = pipeline_with_tool(storage.path(), &tool).await;
    let pipeline = Arc::new(pipeline);

    let mut handles = Vec::new();
    for i in 0..8u8 {
        let pipeline = pipeline.clone();
        handles.push(tokio::spawn(async move {
            pipeline
                .ingest(Bytes::from(vec![i; 1024 + i as usize]), "clip.webm")
                .await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        assert!(ids.insert(receipt.video_id));
        assert_eq!(
            std::fs::metadata(&receipt.original.path).unwrap().len(),
            receipt.original.len
        );
    }
    assert_eq!(std::fs::read_dir(storage.path()).unwrap().count(), 8);
}
