mod args;
mod filemanager;

use args::{Args, Command};
use clap::Parser;
use filemanager::{CliError, FsSink, FsSource};
use lib_pak::pack::ResourcePack;
use lib_pak::{BatchOutcome, Listing, PackConfig, Packer, Palette};
use log::{debug, error, info};
use std::fs;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();
    lib_pak::init_logging(args.log_level());

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let palette: Option<Palette> = args
        .palette
        .as_deref()
        .map(filemanager::load_palette)
        .transpose()?;
    let config = match args.config.as_deref() {
        Some(path) => filemanager::load_config(path)?,
        None => PackConfig::default(),
    };

    match args.command {
        Command::Sprites { dir, out } => {
            let source = FsSource::new(&dir);
            let sink = FsSink::new(out.as_ref().unwrap_or(&dir));
            let packer = Packer::new(&palette, &source, &sink, config);
            debug!("Pack settings: {:?}", packer.config());
            let listing = Listing::new("", filemanager::list_files(&dir)?);
            report(&packer.export_sprites(&listing)?);
        }
        Command::Packs { root } => {
            let source = FsSource::new(&root);
            let sink = FsSink::new(&root);
            let packer = Packer::new(&palette, &source, &sink, config);
            debug!("Pack settings: {:?}", packer.config());
            let listings = filemanager::pack_listings(&root)?;
            let mut failed = 0;
            for (_, result) in packer.pack_directories(&listings) {
                match result {
                    Ok(outcome) => report(&outcome),
                    // Already logged by the packer
                    Err(_) => failed += 1,
                }
            }
            if failed > 0 {
                return Err(CliError::BatchesFailed(failed));
            }
        }
        Command::Backgrounds { root } => {
            let source = FsSource::new(&root);
            let sink = FsSink::new(&root);
            let packer = Packer::new(&palette, &source, &sink, config);
            for listing in filemanager::background_listings(&root)? {
                report(&packer.convert_backgrounds(&listing)?);
            }
        }
        Command::Inspect { file } => inspect(&file)?,
    }
    Ok(())
}

fn report(outcome: &BatchOutcome) {
    if let BatchOutcome::Written(files) = outcome {
        for (name, len) in files {
            info!("{}: {} bytes", name, len);
        }
    }
}

fn inspect(path: &Path) -> Result<(), CliError> {
    let data = fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let pack = ResourcePack::parse(&data)?;

    println!("{}: {} keys, {} bytes", path.display(), pack.len(), data.len());
    for (key, offset, payload) in pack.entries() {
        println!("{:#010x} @ {:>8} {:>8} bytes", key, offset, payload.len());
    }
    Ok(())
}
