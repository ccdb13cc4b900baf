//! Re-propagates lyrics from the import folders into existing workspace
//! track folders and their pull-bucket copies.

use std::fs;
use std::path::{Path, PathBuf};

use entity::prelude::*;
use log::{info, warn};

use crate::builder::{pull_album_dir, workspace_album_dir};
use crate::error::{IoContext, Result};
use crate::library::{read_text_lossy, write_json};

/// What happens to one workspace track folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Folder name marks an autosave checkpoint.
    Skip,
    /// No import file carries the folder's track number.
    Miss,
    Sync { source: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDecision {
    pub track_folder: String,
    pub action: SyncAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumSync {
    WorkspaceMissing,
    ImportMissing,
    Processed(Vec<TrackDecision>),
}

/// `{head}*.md` match against a bare file name. Dotfiles are not hidden.
fn matches_glob(file_name: &str, head: &str) -> bool {
    file_name.len() >= head.len() + ".md".len() && file_name.starts_with(head) && file_name.ends_with(".md")
}

fn candidates(import_dir: &Path, head: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(import_dir).at(import_dir)? {
        let entry = entry.at(import_dir)?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if matches_glob(&file_name, head) && entry.path().is_file() {
            found.push(entry.path());
        }
    }
    found.sort();
    Ok(found)
}

/// Picks the import `.md` for a workspace folder like `05_return-of-kings`
/// by its leading track number. `{NN}_*.md` wins over `{NN}*.md`, and a
/// `_web` variant is only used when nothing else matches.
pub fn choose_import_md(import_dir: &Path, track_folder: &str) -> Result<Option<PathBuf>> {
    let prefix = track_folder.split('_').next().unwrap_or(track_folder);
    let mut found = candidates(import_dir, &format!("{prefix}_"))?;
    if found.is_empty() {
        found = candidates(import_dir, prefix)?;
    }

    let is_web = |path: &PathBuf| {
        path.file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with("_web"))
    };
    let preferred = found.iter().find(|path| !is_web(*path)).cloned();
    Ok(preferred.or_else(|| found.into_iter().next()))
}

fn sync_track(
    album: &SyncAlbum,
    base_dir: &Path,
    track_dir: &Path,
    pull_dir: &Path,
    track_folder: &str,
    source: &Path,
) -> Result<()> {
    let lyrics = read_text_lossy(source)?;

    let data_dir = track_dir.join("data");
    fs::create_dir_all(&data_dir).at(&data_dir)?;
    let ws_lyrics = data_dir.join("lyrics.md");
    fs::write(&ws_lyrics, &lyrics).at(&ws_lyrics)?;

    fs::create_dir_all(pull_dir).at(pull_dir)?;
    let pb_lyrics = pull_dir.join(format!("{track_folder}.md"));
    fs::write(&pb_lyrics, &lyrics).at(&pb_lyrics)?;

    let relative_source = source.strip_prefix(base_dir).unwrap_or(source);
    let metadata = SyncMetadata {
        sku: album.sku.clone(),
        album: album.name.clone(),
        album_dir: album.workspace_album.clone(),
        track_folder: track_folder.to_string(),
        source_import_md: relative_source.display().to_string(),
    };
    write_json(&pull_dir.join(format!("{track_folder}.json")), &metadata)?;

    info!(target: "OK", "{} <- {}", track_folder, source.file_name().unwrap_or_default().to_string_lossy());
    Ok(())
}

/// Syncs every track folder of one album. Decisions are the same with or
/// without `dry_run`; only the writes are skipped.
pub fn sync_album(album: &SyncAlbum, base_dir: &Path, import_root: &Path, dry_run: bool) -> Result<AlbumSync> {
    let workspace_dir = workspace_album_dir(base_dir, &album.sku, &album.workspace_album);
    let pull_dir = pull_album_dir(base_dir, &album.sku, &album.workspace_album);
    let import_dir = import_root.join(&album.import_subdir);

    info!(target: "ALBUM", "{} :: {}", album.sku, album.name);
    info!("workspace: {}", workspace_dir.display());
    info!("imports:   {}", import_dir.display());

    if !workspace_dir.exists() {
        warn!("Workspace album missing, skipping: {}", workspace_dir.display());
        return Ok(AlbumSync::WorkspaceMissing);
    }
    if !import_dir.exists() {
        warn!("Import dir missing, skipping: {}", import_dir.display());
        return Ok(AlbumSync::ImportMissing);
    }

    let mut track_dirs = Vec::new();
    for entry in fs::read_dir(&workspace_dir).at(&workspace_dir)? {
        let path = entry.at(&workspace_dir)?.path();
        if path.is_dir() {
            track_dirs.push(path);
        }
    }
    track_dirs.sort();

    let mut decisions = Vec::with_capacity(track_dirs.len());
    for track_dir in track_dirs {
        let track_folder = track_dir.file_name().unwrap_or_default().to_string_lossy().into_owned();

        let action = if track_folder.contains("checkpoint") {
            warn!(target: "SKIP", "{} (checkpoint)", track_folder);
            SyncAction::Skip
        } else {
            match choose_import_md(&import_dir, &track_folder)? {
                None => {
                    warn!(target: "MISS", "{} -> no matching .md found in imports", track_folder);
                    SyncAction::Miss
                }
                Some(source) if dry_run => {
                    info!(
                        target: "DRY",
                        "{} <- {} (ws {}, pb {})",
                        track_folder,
                        source.display(),
                        track_dir.join("data").join("lyrics.md").display(),
                        pull_dir.join(format!("{track_folder}.md")).display()
                    );
                    SyncAction::Sync { source }
                }
                Some(source) => {
                    sync_track(album, base_dir, &track_dir, &pull_dir, &track_folder, &source)?;
                    SyncAction::Sync { source }
                }
            }
        };
        decisions.push(TrackDecision { track_folder, action });
    }
    Ok(AlbumSync::Processed(decisions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use entity::metadata::SyncMetadata;

    fn album() -> SyncAlbum {
        SyncAlbum {
            name: "Malicious EP".to_string(),
            sku: "HAWK-ARS-03".to_string(),
            workspace_album: "01_Malicious_EP".to_string(),
            import_subdir: "03_phase2/04_malicious".to_string(),
        }
    }

    fn touch(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    /// Base dir with imports under `_imports/HAWK-ARS-00` and two workspace folders.
    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let imports = base.join("_imports/HAWK-ARS-00/03_phase2/04_malicious");
        touch(&imports.join("01_malicious.md"), "new lyrics one");
        touch(&imports.join("02_ghost_web.md"), "web two");
        touch(&imports.join("02_ghost.md"), "canon two");
        let ws = workspace_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");
        touch(&ws.join("01_malicious/data/lyrics.md"), "old lyrics");
        touch(&ws.join("01_malicious/notes.md"), "scaffold");
        fs::create_dir_all(ws.join("02_ghost")).unwrap();
        fs::create_dir_all(ws.join("03_missing")).unwrap();
        fs::create_dir_all(ws.join(".ipynb_checkpoints")).unwrap();
        dir
    }

    #[test]
    fn prefers_non_web_candidate() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("07_song_web.md"), "");
        touch(&dir.path().join("07_song.md"), "");

        let chosen = choose_import_md(dir.path(), "07_song").unwrap().unwrap();
        assert_eq!(chosen.file_name().unwrap(), "07_song.md");
    }

    #[test]
    fn falls_back_to_web_and_unseparated_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("03_only_web.md"), "");
        touch(&dir.path().join("01swordfish.md"), "");
        touch(&dir.path().join("01swordfish.txt"), "");

        let chosen = choose_import_md(dir.path(), "03_only").unwrap().unwrap();
        assert_eq!(chosen.file_name().unwrap(), "03_only_web.md");
        let chosen = choose_import_md(dir.path(), "01_swordfish").unwrap().unwrap();
        assert_eq!(chosen.file_name().unwrap(), "01swordfish.md");
        assert!(choose_import_md(dir.path(), "09_nothing").unwrap().is_none());
    }

    #[test]
    fn unprefixed_folders_can_pick_dotfiles() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".draft.md"), "");

        let chosen = choose_import_md(dir.path(), "_intro").unwrap().unwrap();
        assert_eq!(chosen.file_name().unwrap(), ".draft.md");
    }

    #[test]
    fn glob_semantics() {
        assert!(matches_glob("05_.md", "05_"));
        assert!(matches_glob("05_x.md", "05_"));
        assert!(!matches_glob("05_x.markdown", "05_"));
        assert!(!matches_glob("05.md", "05_"));
        assert!(matches_glob(".draft.md", ""));
    }

    #[test]
    fn syncs_lyrics_into_workspace_and_pull_bucket() {
        let dir = fixture();
        let base = dir.path();
        let import_root = base.join("_imports/HAWK-ARS-00");

        let result = sync_album(&album(), base, &import_root, false).unwrap();

        let AlbumSync::Processed(decisions) = result else {
            panic!("album should be processed");
        };
        let actions: Vec<(&str, &SyncAction)> =
            decisions.iter().map(|d| (d.track_folder.as_str(), &d.action)).collect();
        assert_eq!(actions.len(), 4);
        assert_eq!(actions[0], (".ipynb_checkpoints", &SyncAction::Skip));
        assert_eq!(actions[3], ("03_missing", &SyncAction::Miss));

        let ws = workspace_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");
        let pb = pull_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");
        assert_eq!(fs::read_to_string(ws.join("01_malicious/data/lyrics.md")).unwrap(), "new lyrics one");
        assert_eq!(fs::read_to_string(ws.join("01_malicious/notes.md")).unwrap(), "scaffold");
        assert_eq!(fs::read_to_string(ws.join("02_ghost/data/lyrics.md")).unwrap(), "canon two");
        assert_eq!(fs::read_to_string(pb.join("02_ghost.md")).unwrap(), "canon two");
        assert!(!pb.join("03_missing.md").exists());

        let metadata: SyncMetadata =
            serde_json::from_str(&fs::read_to_string(pb.join("01_malicious.json")).unwrap()).unwrap();
        assert_eq!(metadata.album, "Malicious EP");
        assert_eq!(metadata.album_dir, "01_Malicious_EP");
        assert_eq!(metadata.track_folder, "01_malicious");
        assert_eq!(
            Path::new(&metadata.source_import_md),
            Path::new("_imports/HAWK-ARS-00/03_phase2/04_malicious/01_malicious.md")
        );
    }

    #[test]
    fn dry_run_decides_the_same_and_writes_nothing() {
        let dir = fixture();
        let base = dir.path();
        let import_root = base.join("_imports/HAWK-ARS-00");
        let ws = workspace_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");

        let dry = sync_album(&album(), base, &import_root, true).unwrap();

        assert_eq!(fs::read_to_string(ws.join("01_malicious/data/lyrics.md")).unwrap(), "old lyrics");
        assert!(!ws.join("02_ghost/data").exists());
        assert!(!pull_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP").exists());

        let real = sync_album(&album(), base, &import_root, false).unwrap();
        assert_eq!(dry, real);
    }

    #[test]
    fn invalid_utf8_in_imports_is_dropped_on_sync() {
        let dir = fixture();
        let base = dir.path();
        let imports = base.join("_imports/HAWK-ARS-00/03_phase2/04_malicious");
        fs::write(imports.join("01_malicious.md"), b"ab\xffcd").unwrap();

        sync_album(&album(), base, &base.join("_imports/HAWK-ARS-00"), false).unwrap();

        let ws = workspace_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");
        let pb = pull_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP");
        assert_eq!(fs::read(ws.join("01_malicious/data/lyrics.md")).unwrap(), b"abcd");
        assert_eq!(fs::read(pb.join("01_malicious.md")).unwrap(), b"abcd");
    }

    #[test]
    fn missing_directories_skip_the_album() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path();
        let import_root = base.join("_imports/HAWK-ARS-00");

        assert_eq!(sync_album(&album(), base, &import_root, false).unwrap(), AlbumSync::WorkspaceMissing);

        fs::create_dir_all(workspace_album_dir(base, "HAWK-ARS-03", "01_Malicious_EP")).unwrap();
        assert_eq!(sync_album(&album(), base, &import_root, false).unwrap(), AlbumSync::ImportMissing);
    }
}
