use std::path::PathBuf;

use clap::Parser;
use log::info;

use ars_layout::config::Config;
use ars_layout::sync::{sync_album, AlbumSync, SyncAction};
use ars_layout::{logger, Error};

/// Syncs lyrics from the import folders into the workspace and pull-bucket.
#[derive(Parser, Debug)]
#[command(name = "ars-sync", version)]
struct Args {
    /// Print actions without writing files
    #[arg(long)]
    dry_run: bool,

    /// Album list to use instead of the discovered albums.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root holding `_imports/` and the SKU folders
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

#[derive(Default)]
struct Summary {
    synced: usize,
    missed: usize,
    skipped: usize,
    albums_skipped: usize,
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    logger::init()?;

    let config = Config::from_env(args.base_dir, args.config)?;
    let import_root = config.sync_import_root();

    let mut summary = Summary::default();
    for album in &config.albums.sync.albums {
        match sync_album(album, &config.base_dir, &import_root, args.dry_run)? {
            AlbumSync::Processed(decisions) => {
                for decision in decisions {
                    match decision.action {
                        SyncAction::Sync { .. } => summary.synced += 1,
                        SyncAction::Miss => summary.missed += 1,
                        SyncAction::Skip => summary.skipped += 1,
                    }
                }
            }
            AlbumSync::WorkspaceMissing | AlbumSync::ImportMissing => summary.albums_skipped += 1,
        }
    }

    let verb = if args.dry_run { "would sync" } else { "synced" };
    info!(
        "{} {} tracks; {} without a match, {} skipped, {} albums skipped",
        verb, summary.synced, summary.missed, summary.skipped, summary.albums_skipped
    );
    Ok(())
}
