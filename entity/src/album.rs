use serde::{Deserialize, Serialize};

/// One album as the master builder sees it: where its lyrics come from and
/// which workspace / pull-bucket folders it lands in under `{sku}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumSpec {
    pub sku: String,
    pub album_code: String,
    /// Relative to the base directory.
    pub import_dir: String,
    pub workspace_album: String,
    pub pull_album: String,
}

/// One album as the lyrics sync tool sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAlbum {
    /// Display name written into the pull-bucket metadata.
    pub name: String,
    pub sku: String,
    /// Workspace album folder; also used as the pull-bucket album folder.
    pub workspace_album: String,
    /// Relative to the sync import root.
    pub import_subdir: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookCopy {
    pub source: String,
    pub destination: String,
}
