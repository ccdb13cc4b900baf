//! Three-way comparison of the import, workspace and pull-bucket trees of one album.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::builder::{pull_album_dir, workspace_album_dir};
use crate::error::{IoContext, Result};
use crate::slug::CHECKPOINT_MARKER;

/// The three directories compared for one album.
#[derive(Debug, Clone)]
pub struct AlbumTree {
    pub import_dir: PathBuf,
    pub workspace_dir: PathBuf,
    pub pull_dir: PathBuf,
}

impl AlbumTree {
    pub fn new(root: &Path, sku: &str, album: &str) -> Self {
        Self {
            import_dir: root.join("_imports").join(sku).join(album),
            workspace_dir: workspace_album_dir(root, sku, album),
            pull_dir: pull_album_dir(root, sku, album),
        }
    }
}

/// Header naming the three roots, followed by two blank lines.
impl fmt::Display for AlbumTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[IMPORT ROOT] {}", self.import_dir.display())?;
        writeln!(f, "[WORKSPACE]   {}", self.workspace_dir.display())?;
        writeln!(f, "[PULL-BUCKET] {}", self.pull_dir.display())?;
        writeln!(f)?;
        writeln!(f)
    }
}

/// Sorted entries of `dir`, or nothing if it does not exist.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).at(dir)? {
        entries.push(entry.at(dir)?.path());
    }
    entries.sort();
    Ok(entries)
}

/// Stems of the entries in `dir` carrying one of `extensions`, with the
/// checkpoint marker removed so autosaves collapse onto their track.
fn track_stems(dir: &Path, extensions: &[&str]) -> Result<BTreeSet<String>> {
    let mut stems = BTreeSet::new();
    for path in sorted_entries(dir)? {
        let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
            continue;
        };
        if !extensions.contains(&ext) {
            continue;
        }
        if let Some(stem) = path.file_stem() {
            stems.insert(stem.to_string_lossy().replace(CHECKPOINT_MARKER, ""));
        }
    }
    Ok(stems)
}

/// Workspace track folders, keyed by folder name. Only folders holding a
/// `data/lyrics.md` count as tracks.
pub fn list_workspace_tracks(workspace_dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    let mut tracks = BTreeMap::new();
    for path in sorted_entries(workspace_dir)? {
        if path.is_dir() && path.join("data").join("lyrics.md").exists() {
            let name = path.file_name().unwrap_or_default().to_string_lossy().into_owned();
            tracks.insert(name, path);
        }
    }
    Ok(tracks)
}

pub fn load_import_tracks(import_dir: &Path) -> Result<BTreeSet<String>> {
    track_stems(import_dir, &["ipynb", "md"])
}

pub fn list_pull_bucket_tracks(pull_dir: &Path) -> Result<BTreeSet<String>> {
    track_stems(pull_dir, &["json", "md"])
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteTrack {
    pub name: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffReport {
    pub missing_in_workspace: Vec<String>,
    pub missing_in_pull_bucket: Vec<String>,
    pub extra_in_workspace: Vec<String>,
    pub extra_in_pull_bucket: Vec<String>,
    pub incomplete: Vec<IncompleteTrack>,
}

impl DiffReport {
    pub fn is_clean(&self) -> bool {
        self.missing_in_workspace.is_empty()
            && self.missing_in_pull_bucket.is_empty()
            && self.extra_in_workspace.is_empty()
            && self.extra_in_pull_bucket.is_empty()
            && self.incomplete.is_empty()
    }
}

fn difference(left: &BTreeSet<String>, right: &BTreeSet<String>) -> Vec<String> {
    left.difference(right).cloned().collect()
}

/// Compares the three scans. Every category is filled independently.
pub fn diff(
    imports: &BTreeSet<String>,
    workspace: &BTreeMap<String, PathBuf>,
    pull_bucket: &BTreeSet<String>,
) -> DiffReport {
    let workspace_names: BTreeSet<String> = workspace.keys().cloned().collect();

    let mut incomplete = Vec::new();
    for name in imports {
        let Some(track_dir) = workspace.get(name) else {
            continue;
        };
        let expected = [
            ("lyrics.md".to_string(), track_dir.join("data").join("lyrics.md")),
            ("metadata.json".to_string(), track_dir.join("data").join("metadata.json")),
            (format!("{name}.ipynb"), track_dir.join(format!("{name}.ipynb"))),
        ];
        let missing: Vec<String> = expected
            .into_iter()
            .filter(|(_, path)| !path.exists())
            .map(|(label, _)| label)
            .collect();
        if !missing.is_empty() {
            incomplete.push(IncompleteTrack {
                name: name.clone(),
                missing,
            });
        }
    }

    DiffReport {
        missing_in_workspace: difference(imports, &workspace_names),
        missing_in_pull_bucket: difference(imports, pull_bucket),
        extra_in_workspace: difference(&workspace_names, imports),
        extra_in_pull_bucket: difference(pull_bucket, imports),
        incomplete,
    }
}

pub fn diff_album(tree: &AlbumTree) -> Result<DiffReport> {
    let imports = load_import_tracks(&tree.import_dir)?;
    let workspace = list_workspace_tracks(&tree.workspace_dir)?;
    let pull_bucket = list_pull_bucket_tracks(&tree.pull_dir)?;
    Ok(diff(&imports, &workspace, &pull_bucket))
}

fn write_section(f: &mut fmt::Formatter<'_>, heading: &str, names: &[String]) -> fmt::Result {
    if names.is_empty() {
        return Ok(());
    }
    writeln!(f, "{heading}")?;
    for name in names {
        writeln!(f, "   - {name}")?;
    }
    writeln!(f)
}

impl fmt::Display for DiffReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "No differences found; album is clean.");
        }
        write_section(f, "Missing in WORKSPACE:", &self.missing_in_workspace)?;
        write_section(f, "Missing in PULL-BUCKET:", &self.missing_in_pull_bucket)?;
        write_section(f, "Extra tracks in WORKSPACE (not in imports):", &self.extra_in_workspace)?;
        write_section(f, "Extra tracks in PULL-BUCKET (not in imports):", &self.extra_in_pull_bucket)?;
        for track in &self.incomplete {
            writeln!(f, "Incomplete WORKSPACE for {}:", track.name)?;
            for file in &track.missing {
                writeln!(f, "   - missing {file}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn complete_track(workspace_dir: &Path, name: &str) -> PathBuf {
        let track = workspace_dir.join(name);
        fs::create_dir_all(track.join("data")).unwrap();
        fs::write(track.join("data/lyrics.md"), "lyrics").unwrap();
        fs::write(track.join("data/metadata.json"), "{}").unwrap();
        fs::write(track.join(format!("{name}.ipynb")), "{}").unwrap();
        track
    }

    #[test]
    fn reports_only_real_differences() {
        let dir = tempfile::tempdir().unwrap();
        let mut workspace = BTreeMap::new();
        workspace.insert("01_a".to_string(), complete_track(dir.path(), "01_a"));

        let report = diff(&names(&["01_a", "02_b"]), &workspace, &names(&["01_a", "02_b", "03_c"]));

        assert_eq!(
            report,
            DiffReport {
                missing_in_workspace: vec!["02_b".to_string()],
                extra_in_pull_bucket: vec!["03_c".to_string()],
                ..DiffReport::default()
            }
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn flags_incomplete_workspace_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let track = dir.path().join("01_a");
        fs::create_dir_all(track.join("data")).unwrap();
        fs::write(track.join("data/lyrics.md"), "lyrics").unwrap();
        let mut workspace = BTreeMap::new();
        workspace.insert("01_a".to_string(), track);

        let report = diff(&names(&["01_a"]), &workspace, &names(&["01_a"]));

        assert_eq!(
            report.incomplete,
            vec![IncompleteTrack {
                name: "01_a".to_string(),
                missing: vec!["metadata.json".to_string(), "01_a.ipynb".to_string()],
            }]
        );
        let text = report.to_string();
        assert!(text.contains("Incomplete WORKSPACE for 01_a:"));
        assert!(text.contains("   - missing 01_a.ipynb"));
    }

    #[test]
    fn scans_collapse_pairs_and_checkpoints() {
        let dir = tempfile::tempdir().unwrap();
        let tree = AlbumTree::new(dir.path(), "HAWK-ARS-02", "03_MiLabs");
        fs::create_dir_all(&tree.import_dir).unwrap();
        for file in ["01_soft_disclosure.md", "01_soft_disclosure.ipynb", "02_abreactions-checkpoint.ipynb", "cover.png"] {
            fs::write(tree.import_dir.join(file), "").unwrap();
        }
        fs::create_dir_all(&tree.pull_dir).unwrap();
        for file in ["01_soft_disclosure.md", "01_soft_disclosure.json", "notes.txt"] {
            fs::write(tree.pull_dir.join(file), "").unwrap();
        }
        fs::create_dir_all(tree.workspace_dir.join("scratch")).unwrap();
        complete_track(&tree.workspace_dir, "01_soft_disclosure");

        assert_eq!(load_import_tracks(&tree.import_dir).unwrap(), names(&["01_soft_disclosure", "02_abreactions"]));
        assert_eq!(list_pull_bucket_tracks(&tree.pull_dir).unwrap(), names(&["01_soft_disclosure"]));
        let workspace = list_workspace_tracks(&tree.workspace_dir).unwrap();
        assert_eq!(workspace.keys().cloned().collect::<Vec<_>>(), ["01_soft_disclosure"]);

        let report = diff_album(&tree).unwrap();
        assert_eq!(report.missing_in_workspace, ["02_abreactions"]);
        assert_eq!(report.missing_in_pull_bucket, ["02_abreactions"]);
        assert!(report.extra_in_workspace.is_empty());
        assert!(report.incomplete.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn header_is_followed_by_two_blank_lines() {
        let tree = AlbumTree::new(Path::new("/music"), "HAWK-ARS-02", "03_MiLabs");

        assert_eq!(
            tree.to_string(),
            "[IMPORT ROOT] /music/_imports/HAWK-ARS-02/03_MiLabs\n\
             [WORKSPACE]   /music/HAWK-ARS-02/_workspace/03_MiLabs\n\
             [PULL-BUCKET] /music/HAWK-ARS-02/_pull-bucket/03_MiLabs\n\n\n"
        );
    }

    #[test]
    fn empty_album_is_clean() {
        let dir = tempfile::tempdir().unwrap();
        let report = diff_album(&AlbumTree::new(dir.path(), "HAWK-ARS-09", "none")).unwrap();

        assert!(report.is_clean());
        assert_eq!(report.to_string(), "No differences found; album is clean.\n");
    }
}
