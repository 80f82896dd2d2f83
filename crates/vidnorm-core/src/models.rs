//! Domain models for video ingestion.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;

/// Opaque identifier correlating an original upload, its normalized form, and
/// any derived artifacts. Minted once per ingestion, never reused.
///
/// Rendered everywhere in simple (dashless, 32 hex chars) form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
#[schema(value_type = String, example = "9f1c2b4a8e6d4f0b9a3c5d7e1f2a4b6c")]
pub struct VideoId(Uuid);

impl VideoId {
    /// Mint a fresh identifier. 122 bits of v4 randomness make path
    /// collisions under the storage layout effectively impossible, so no
    /// registry lookup is needed.
    pub fn allocate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Display for VideoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0.simple())
    }
}

impl Serialize for VideoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.simple())
    }
}

impl<'de> Deserialize<'de> for VideoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uuid::parse_str(&s).map(Self).map_err(serde::de::Error::custom)
    }
}

/// Supported upload containers. The allow-list is fixed: uploads with any
/// other extension are rejected before a byte touches the filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Webm,
    Mp4,
    Mov,
    Avi,
    Mkv,
}

impl ContainerFormat {
    /// Every normalized output uses this container, regardless of input.
    pub const CANONICAL: ContainerFormat = ContainerFormat::Mp4;

    pub const ALLOWED_EXTENSIONS: &'static [&'static str] =
        &["webm", "mp4", "mov", "avi", "mkv"];

    /// Parse a lowercased file extension. Returns `None` for anything outside
    /// the allow-list.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "webm" => Some(ContainerFormat::Webm),
            "mp4" => Some(ContainerFormat::Mp4),
            "mov" => Some(ContainerFormat::Mov),
            "avi" => Some(ContainerFormat::Avi),
            "mkv" => Some(ContainerFormat::Mkv),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContainerFormat::Webm => "webm",
            ContainerFormat::Mp4 => "mp4",
            ContainerFormat::Mov => "mov",
            ContainerFormat::Avi => "avi",
            ContainerFormat::Mkv => "mkv",
        }
    }
}

impl Display for ContainerFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.extension())
    }
}

/// Which artifact of an ingestion a path refers to.
///
/// Each `(VideoId, StorageRole)` pair maps to exactly one path under the
/// storage root; see `vidnorm-storage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageRole {
    Original,
    Normalized,
    DerivedFrame,
}

impl StorageRole {
    pub fn marker(&self) -> &'static str {
        match self {
            StorageRole::Original => "original",
            StorageRole::Normalized => "normalized",
            StorageRole::DerivedFrame => "frames",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum IngestionStatus {
    Succeeded,
    Failed,
}

impl Display for IngestionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IngestionStatus::Succeeded => write!(f, "succeeded"),
            IngestionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Externally visible outcome of one ingestion request.
///
/// Not persisted anywhere: the filesystem state under the identifier's paths
/// is the durable record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IngestionResult {
    /// Absent when the request was rejected before an identifier was
    /// allocated (e.g. unsupported format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<VideoId>,
    pub status: IngestionStatus,
    pub message: String,
}

impl IngestionResult {
    pub fn succeeded(video_id: VideoId, message: impl Into<String>) -> Self {
        Self {
            video_id: Some(video_id),
            status: IngestionStatus::Succeeded,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            video_id: None,
            status: IngestionStatus::Failed,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_video_id_display_is_32_lowercase_hex() {
        let id = VideoId::allocate();
        let s = id.to_string();
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_video_id_serde_round_trip() {
        let id = VideoId::allocate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: VideoId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_video_id_parse_accepts_simple_and_hyphenated() {
        let id = VideoId::allocate();
        assert_eq!(VideoId::parse(&id.to_string()).unwrap(), id);
        assert_eq!(VideoId::parse(&id.as_uuid().to_string()).unwrap(), id);
        assert!(VideoId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_video_id_uniqueness_one_million_allocations() {
        let mut seen = HashSet::with_capacity(1_000_000);
        for _ in 0..1_000_000 {
            assert!(seen.insert(VideoId::allocate()));
        }
    }

    #[test]
    fn test_container_format_from_extension() {
        assert_eq!(ContainerFormat::from_extension("mp4"), Some(ContainerFormat::Mp4));
        assert_eq!(ContainerFormat::from_extension("WEBM"), Some(ContainerFormat::Webm));
        assert_eq!(ContainerFormat::from_extension("MoV"), Some(ContainerFormat::Mov));
        assert_eq!(ContainerFormat::from_extension("txt"), None);
        assert_eq!(ContainerFormat::from_extension(""), None);
    }

    #[test]
    fn test_canonical_format_is_mp4() {
        assert_eq!(ContainerFormat::CANONICAL.extension(), "mp4");
    }

    #[test]
    fn test_ingestion_result_serialization() {
        let id = VideoId::allocate();
        let ok = IngestionResult::succeeded(id, "ready");
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["video_id"], id.to_string());

        let failed = IngestionResult::failed("unsupported format");
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert!(json.get("video_id").is_none());
    }
}
