use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};

use entity::prelude::*;
use serde::Deserialize;

use crate::error::{Error, IoContext, Result};

pub const BASE_DIR_ENV: &str = "ARS_BASE_DIR";
pub const CONFIG_ENV: &str = "ARS_CONFIG";
pub const CONFIG_FILE_NAME: &str = "albums.toml";

/// Album lists compiled in, used when no `albums.toml` is found.
const BUNDLED_ALBUMS: &str = include_str!("../albums.toml");

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlbumConfig {
    pub build: BuildConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default = "default_template_dir")]
    pub template_dir: String,
    #[serde(default, rename = "album")]
    pub albums: Vec<AlbumSpec>,
    #[serde(default, rename = "notebook")]
    pub notebooks: Vec<NotebookCopy>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub import_root: String,
    #[serde(default, rename = "album")]
    pub albums: Vec<SyncAlbum>,
}

fn default_template_dir() -> String {
    "_templates/track".to_string()
}

fn invalid(message: String) -> Error {
    Error::Config(message)
}

/// A single folder name: no separators, no `.`/`..`.
fn require_name(value: &str, field: &str) -> Result<()> {
    let mut components = Path::new(value).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid(format!("{field} must be a single folder name, got {value:?}"))),
    }
}

/// A non-empty relative path that stays below the directory it is joined to.
fn require_relative(value: &str, field: &str) -> Result<()> {
    let stays_below = Path::new(value)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if value.is_empty() || !stays_below {
        return Err(invalid(format!("{field} must be a relative path below the base directory, got {value:?}")));
    }
    Ok(())
}

impl AlbumConfig {
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|source| Error::ConfigParse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_ALBUMS, Path::new(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<()> {
        require_relative(&self.build.template_dir, "build.template_dir")?;

        let mut seen = HashSet::new();
        for spec in &self.build.albums {
            require_name(&spec.sku, "build.album.sku")?;
            if spec.album_code.trim().is_empty() {
                return Err(invalid(format!("build.album.album_code is empty for {}", spec.sku)));
            }
            require_relative(&spec.import_dir, "build.album.import_dir")?;
            require_name(&spec.workspace_album, "build.album.workspace_album")?;
            require_name(&spec.pull_album, "build.album.pull_album")?;
            if !seen.insert((spec.sku.as_str(), spec.workspace_album.as_str())) {
                return Err(invalid(format!("album {}/{} is listed twice", spec.sku, spec.workspace_album)));
            }
        }

        for notebook in &self.build.notebooks {
            require_relative(&notebook.source, "build.notebook.source")?;
            require_relative(&notebook.destination, "build.notebook.destination")?;
        }

        require_relative(&self.sync.import_root, "sync.import_root")?;
        for album in &self.sync.albums {
            if album.name.trim().is_empty() {
                return Err(invalid(format!("sync.album.name is empty for {}", album.sku)));
            }
            require_name(&album.sku, "sync.album.sku")?;
            require_name(&album.workspace_album, "sync.album.workspace_album")?;
            require_relative(&album.import_subdir, "sync.album.import_subdir")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Bundled,
}

pub struct Config {
    pub base_dir: PathBuf,
    pub albums: AlbumConfig,
    pub source: ConfigSource,
}

/// `{base}/albums.toml`, then the per-user config directory.
fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("ars-layout").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

impl Config {
    /// Command-line values win over `ARS_BASE_DIR` / `ARS_CONFIG` (a `.env`
    /// file is honoured). The base directory defaults to the current one.
    pub fn from_env(base_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        dotenv::dotenv().ok();

        let base_dir = base_dir
            .or_else(|| env::var_os(BASE_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."));
        let base_dir = fs::canonicalize(&base_dir).at(&base_dir)?;
        let config_path = config_path.or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        Self::load(base_dir, config_path)
    }

    pub fn load(base_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let source = match config_path.or_else(|| find_config_file(&base_dir)) {
            Some(path) => ConfigSource::File(path),
            None => ConfigSource::Bundled,
        };
        let albums = match &source {
            ConfigSource::File(path) => {
                let text = fs::read_to_string(path).at(path)?;
                AlbumConfig::parse(&text, path)?
            }
            ConfigSource::Bundled => AlbumConfig::bundled()?,
        };
        Ok(Self {
            base_dir,
            albums,
            source,
        })
    }

    pub fn template_root(&self) -> PathBuf {
        self.base_dir.join(&self.albums.build.template_dir)
    }

    pub fn sync_import_root(&self) -> PathBuf {
        self.base_dir.join(&self.albums.sync.import_root)
    }
}
