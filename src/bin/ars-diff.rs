use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ars_layout::diff::{diff_album, AlbumTree};
use ars_layout::{logger, Error};

/// Compares an album's import, workspace and pull-bucket trees.
#[derive(Parser, Debug)]
#[command(name = "ars-diff", version)]
struct Args {
    #[arg(long)]
    sku: String,

    #[arg(long)]
    album: String,

    /// Project root; defaults to the current directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Exit with a failure status when the album is not clean
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<ExitCode, Error> {
    let args = Args::parse();
    logger::init()?;

    let tree = AlbumTree::new(&args.root, &args.sku, &args.album);
    print!("{tree}");

    let report = diff_album(&tree)?;
    print!("{report}");

    if args.strict && !report.is_clean() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
