use serde::{Deserialize, Serialize};

/// `data/metadata.json` inside a workspace track folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub sku: String,
    pub album: String,
    pub track_number: u32,
    pub slug: String,
    pub raw_slug: String,
    pub title: String,
}

/// `{NN}_{slug}.json` next to the flattened lyrics in the pull-bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullBucketMetadata {
    pub sku: String,
    pub album: String,
    pub album_code: String,
    pub track_number: u32,
    pub slug: String,
    pub raw_slug: String,
    pub title: String,
    pub source_import: String,
    pub workspace_track_dir: String,
}

/// Pull-bucket metadata as rewritten by the lyrics sync tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncMetadata {
    pub sku: String,
    pub album: String,
    pub album_dir: String,
    pub track_folder: String,
    pub source_import_md: String,
}
