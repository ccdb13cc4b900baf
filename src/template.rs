//! Track scaffolding copied from a template folder.

use std::fs::{self, File};
use std::path::Path;

use log::debug;
use walkdir::WalkDir;

use crate::error::{IoContext, Result};

/// Copies `source` to `destination`, carrying over the modification time.
pub fn copy_preserving_mtime(source: &Path, destination: &Path) -> Result<()> {
    fs::copy(source, destination).at(destination)?;
    let modified = fs::metadata(source).at(source)?.modified().at(source)?;
    File::options()
        .write(true)
        .open(destination)
        .at(destination)?
        .set_modified(modified)
        .at(destination)?;
    Ok(())
}

/// Mirrors `template_root` into `track_dir`. Files already present in
/// `track_dir` are never overwritten, so re-running keeps manual edits.
///
/// Returns how many files were copied. A missing template root copies nothing.
pub fn apply_template(track_dir: &Path, template_root: &Path) -> Result<usize> {
    if !template_root.is_dir() {
        debug!("No track template at {}", template_root.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(template_root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(template_root) else {
            continue;
        };
        let target = track_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).at(&target)?;
        } else if !target.exists() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).at(parent)?;
            }
            copy_preserving_mtime(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
