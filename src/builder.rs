//! Workspace and pull-bucket construction from the import folders.

use std::fs;
use std::path::{Path, PathBuf};

use entity::prelude::*;
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{IoContext, Result};
use crate::library::{write_json, Track};
use crate::slug::{is_checkpoint, TrackFileName};
use crate::template::{apply_template, copy_preserving_mtime};

pub const WORKSPACE_DIR: &str = "_workspace";
pub const PULL_BUCKET_DIR: &str = "_pull-bucket";

pub fn workspace_album_dir(base_dir: &Path, sku: &str, album: &str) -> PathBuf {
    base_dir.join(sku).join(WORKSPACE_DIR).join(album)
}

pub fn pull_album_dir(base_dir: &Path, sku: &str, album: &str) -> PathBuf {
    base_dir.join(sku).join(PULL_BUCKET_DIR).join(album)
}

/// Every `*.md` under `import_dir`, sorted by path, checkpoints excluded.
fn import_markdown_files(import_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(import_dir).min_depth(1).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_markdown = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if is_markdown && !is_checkpoint(&entry.file_name().to_string_lossy()) {
            files.push(path.to_path_buf());
        }
    }
    files.sort();
    Ok(files)
}

/// Builds one workspace track folder per track file found in the album's
/// import directory and returns the tracks in path order.
///
/// A missing import directory is not an error: the album is reported and
/// skipped so the other albums still get built.
pub fn build_workspaces_for_album(
    spec: &AlbumSpec,
    base_dir: &Path,
    template_root: &Path,
) -> Result<Vec<Track>> {
    let import_dir = base_dir.join(&spec.import_dir);
    let workspace_dir = workspace_album_dir(base_dir, &spec.sku, &spec.workspace_album);
    let pull_dir = pull_album_dir(base_dir, &spec.sku, &spec.pull_album);
    fs::create_dir_all(&workspace_dir).at(&workspace_dir)?;
    fs::create_dir_all(&pull_dir).at(&pull_dir)?;

    let mut tracks = Vec::new();
    if !import_dir.exists() {
        warn!("Import directory not found: {}", import_dir.display());
        return Ok(tracks);
    }

    for md_path in import_markdown_files(&import_dir)? {
        let file_name = md_path.file_name().unwrap_or_default().to_string_lossy().into_owned();
        let Some(name) = TrackFileName::parse(&file_name) else {
            debug!("Not a track file: {}", md_path.display());
            continue;
        };

        let folder_name = name.folder_name();
        let track_dir = workspace_dir.join(&folder_name);
        fs::create_dir_all(&track_dir).at(&track_dir)?;
        apply_template(&track_dir, template_root)?;

        let data_dir = track_dir.join("data");
        fs::create_dir_all(&data_dir).at(&data_dir)?;
        let lyrics_path = data_dir.join("lyrics.md");
        let lyrics = fs::read(&md_path).at(&md_path)?;
        fs::write(&lyrics_path, lyrics).at(&lyrics_path)?;

        let notebook = md_path.with_extension("ipynb");
        if notebook.exists() {
            copy_preserving_mtime(&notebook, &track_dir.join(format!("{folder_name}.ipynb")))?;
        }

        let track = Track {
            track_number: name.track_number.clone(),
            number: name.number,
            canonical_slug: name.canonical_slug(),
            raw_slug: name.raw_slug,
            source_path: md_path,
            workspace_dir: track_dir,
            lyrics_path,
        };
        write_json(&data_dir.join("metadata.json"), &track.metadata(spec))?;
        tracks.push(track);
    }

    Ok(tracks)
}

/// Flattens `tracks` into `{NN}_{slug}.md` / `.json` pairs in the album's
/// pull-bucket. Lyrics are re-read from the workspace copy.
pub fn build_pull_bucket_for_album(spec: &AlbumSpec, base_dir: &Path, tracks: &[Track]) -> Result<()> {
    let pull_dir = pull_album_dir(base_dir, &spec.sku, &spec.pull_album);
    fs::create_dir_all(&pull_dir).at(&pull_dir)?;
    let import_dir = base_dir.join(&spec.import_dir);

    for track in tracks {
        let file_root = track.folder_name();
        let lyrics = fs::read(&track.lyrics_path).at(&track.lyrics_path)?;

        let md_path = pull_dir.join(format!("{file_root}.md"));
        fs::write(&md_path, lyrics).at(&md_path)?;
        write_json(
            &pull_dir.join(format!("{file_root}.json")),
            &track.pull_bucket_metadata(spec, &import_dir),
        )?;

        info!(
            target: "TRACK",
            "{} -> created workspace + pull-bucket (from {})",
            file_root,
            track.source_path.display()
        );
    }
    Ok(())
}

/// Copies one notebook into place, replacing whatever is there.
/// Returns `false` when the source notebook does not exist.
pub fn copy_notebook(copy: &NotebookCopy, base_dir: &Path) -> Result<bool> {
    let source = base_dir.join(&copy.source);
    let destination = base_dir.join(&copy.destination);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).at(parent)?;
    }
    if !source.exists() {
        warn!("Notebook not found at {}", source.display());
        return Ok(false);
    }
    copy_preserving_mtime(&source, &destination)?;
    info!(target: "SPECIAL", "Copied {} to {}", copy.source, destination.display());
    Ok(true)
}
