pub mod decoder;
pub mod encoder;
pub mod format;
pub mod rgb565;

pub use decoder::decode;
pub use encoder::{encode, encode_indexed};
