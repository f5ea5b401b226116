//! Content addressing for asset names.
//!
//! Keys are a DJB2 variant computed over the name prefixed with a double quote,
//! which is how the device firmware hashes string literals. The hash is stable
//! but not collision free, so batches check every key before inserting it.

/// Derives the 32-bit key for an asset name.
///
/// Characters are consumed as UTF-16 code units so that names outside the
/// basic plane hash the same way the editor tooling hashes them.
pub fn hash_name(name: &str) -> u32 {
    std::iter::once(u16::from(b'"'))
        .chain(name.encode_utf16())
        .fold(5381u32, |v, unit| v.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

/// Returns the file name up to its first `.`, the logical name of an image asset.
pub fn asset_stem(file: &str) -> &str {
    match file.find('.') {
        Some(dot) => &file[..dot],
        None => file,
    }
}
