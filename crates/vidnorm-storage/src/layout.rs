//! Deterministic path mapping for stored assets.

use std::path::{Path, PathBuf};

use vidnorm_core::{ContainerFormat, StorageRole, VideoId};

/// Pure mapping from `(identifier, role, format)` to a filesystem path.
///
/// No lookup table: paths are computed from the identifier and role alone,
/// and the identifier's entropy guarantees two requests never collide.
#[derive(Clone, Debug)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every artifact of one ingestion.
    pub fn request_dir(&self, id: VideoId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// The single path for one `(identifier, role)` pair.
    ///
    /// Normalized assets always carry the canonical container extension; the
    /// input format only determines the original's extension. `DerivedFrame`
    /// maps to the per-identifier frame directory the downstream stage
    /// populates.
    pub fn path_for(&self, id: VideoId, role: StorageRole, format: ContainerFormat) -> PathBuf {
        let dir = self.request_dir(id);
        match role {
            StorageRole::Original => {
                dir.join(format!("{}.{}", role.marker(), format.extension()))
            }
            StorageRole::Normalized => dir.join(format!(
                "{}.{}",
                role.marker(),
                ContainerFormat::CANONICAL.extension()
            )),
            StorageRole::DerivedFrame => dir.join(role.marker()),
        }
    }

    /// Directory the downstream feedback stage writes frame files into.
    pub fn frame_dir(&self, id: VideoId) -> PathBuf {
        self.path_for(id, StorageRole::DerivedFrame, ContainerFormat::CANONICAL)
    }
}
