pub mod compression;
pub mod config;
pub mod constants;
pub mod hash;
pub mod image;
pub mod pack;
pub mod pipeline;
pub mod ports;

use log::*;
use std::io::Write;

pub use crate::compression::palette::{Palette, Rgb};
pub use crate::config::PackConfig;
pub use crate::hash::hash_name;
pub use crate::image::format::{BitDepth, EncodedImage, IndexedImage, RasterImage, Region};
pub use crate::image::{decode, encode, encode_indexed};
pub use crate::pipeline::{BatchOutcome, Listing, Packer, PipelineError};

/// Installs the logger for this library and the command line front end.
pub fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter(Some("lib_pak"), level)
        .filter(Some("pinepak"), level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}
