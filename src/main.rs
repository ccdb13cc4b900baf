use std::path::PathBuf;

use clap::Parser;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::info;

use ars_layout::builder::{build_pull_bucket_for_album, build_workspaces_for_album, copy_notebook};
use ars_layout::config::{Config, ConfigSource};
use ars_layout::{logger, Error};

/// Builds workspace and pull-bucket track structures from the import folders.
#[derive(Parser, Debug)]
#[command(name = "ars-build", version)]
struct Args {
    /// Album list to use instead of the discovered albums.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root holding `_imports/` and the SKU folders
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    let multi = MultiProgress::new();
    logger::init_with_progress(multi.clone())?;

    let config = Config::from_env(args.base_dir, args.config)?;
    if let ConfigSource::File(path) = &config.source {
        info!("Album list: {}", path.display());
    }
    let template_root = config.template_root();
    let albums = &config.albums.build.albums;

    let progress = multi.add(ProgressBar::new(albums.len() as u64));
    progress.set_style(ProgressStyle::with_template("[{pos}/{len}] {bar:30} {msg}")?);

    let mut track_count = 0;
    for spec in albums {
        progress.set_message(format!("{} / {}", spec.sku, spec.workspace_album));
        info!(target: "ALBUM", "{} / {}", spec.sku, spec.workspace_album);
        let tracks = build_workspaces_for_album(spec, &config.base_dir, &template_root)?;
        build_pull_bucket_for_album(spec, &config.base_dir, &tracks)?;
        track_count += tracks.len();
        progress.inc(1);
    }
    progress.finish_and_clear();

    for notebook in &config.albums.build.notebooks {
        copy_notebook(notebook, &config.base_dir)?;
    }

    info!("{} tracks built across {} albums", track_count, albums.len());
    Ok(())
}
