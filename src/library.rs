use std::fs;
use std::path::{Path, PathBuf};

use entity::prelude::*;
use serde::Serialize;

use crate::error::{IoContext, Result};
use crate::slug::title_case;

/// A track discovered in an import folder during one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub track_number: String,
    pub number: u32,
    pub raw_slug: String,
    pub canonical_slug: String,
    pub source_path: PathBuf,
    pub workspace_dir: PathBuf,
    pub lyrics_path: PathBuf,
}

impl Track {
    pub fn folder_name(&self) -> String {
        format!("{}_{}", self.track_number, self.canonical_slug)
    }

    pub fn title(&self) -> String {
        title_case(&self.raw_slug)
    }

    pub fn metadata(&self, spec: &AlbumSpec) -> TrackMetadata {
        TrackMetadata {
            sku: spec.sku.clone(),
            album: spec.workspace_album.clone(),
            track_number: self.number,
            slug: self.canonical_slug.clone(),
            raw_slug: self.raw_slug.clone(),
            title: self.title(),
        }
    }

    pub fn pull_bucket_metadata(&self, spec: &AlbumSpec, import_dir: &Path) -> PullBucketMetadata {
        PullBucketMetadata {
            sku: spec.sku.clone(),
            album: spec.workspace_album.clone(),
            album_code: spec.album_code.clone(),
            track_number: self.number,
            slug: self.canonical_slug.clone(),
            raw_slug: self.raw_slug.clone(),
            title: self.title(),
            source_import: import_dir.display().to_string(),
            workspace_track_dir: self.workspace_dir.display().to_string(),
        }
    }
}

/// Writes `value` as JSON with two-space indentation.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).at(path)
}

/// Reads a text file, dropping invalid UTF-8 sequences rather than failing.
pub fn read_text_lossy(path: &Path) -> Result<String> {
    let bytes = fs::read(path).at(path)?;
    Ok(bytes.utf8_chunks().map(|chunk| chunk.valid()).collect())
}
