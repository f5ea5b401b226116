use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pinepak", version, about = "Packs palette-indexed assets for the device")]
pub struct Args {
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON array of [r, g, b] entries; index 0 is the transparent slot
    #[arg(long, global = true)]
    pub palette: Option<PathBuf>,

    /// JSON pack settings overriding the defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build assets.bin and assets.h from the PNG files of a directory
    Sprites {
        dir: PathBuf,
        /// Where to write the table, defaults to the source directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Turn every <root>/<project>/<pack>/ directory into <pack>.res
    Packs { root: PathBuf },
    /// Convert every <root>/<project>/*.png to RGB565
    Backgrounds { root: PathBuf },
    /// List the index of a resource pack
    Inspect { file: PathBuf },
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}
