//! Flat sprite table linked into the firmware image.
//!
//! ```plain
//! [u32 count]
//! { pad to 4 | [u32 hash][u16 0][u8 w][u8 h][w*h indices] } * count
//! ```

use std::collections::HashMap;

use log::{error, info};

use super::{read_u32, PackError};
use crate::image::format::IndexedImage;

const RECORD_HEADER: usize = 6;

/// One sprite in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteRecord {
    pub key: u32,
    pub name: String,
    pub image: IndexedImage,
}

/// Serializes the records in the order given.
///
/// Two records with the same key fail the table.
pub fn assemble(records: &[SpriteRecord]) -> Result<Vec<u8>, PackError> {
    let mut seen: HashMap<u32, &str> = HashMap::with_capacity(records.len());
    for record in records {
        if let Some(existing) = seen.insert(record.key, &record.name) {
            error!("Collision: {:#010x} {} {}", record.key, record.name, existing);
            return Err(PackError::HashCollision {
                key: record.key,
                existing: existing.to_string(),
                incoming: record.name.clone(),
            });
        }
    }

    let count = u32::try_from(records.len()).map_err(|_| PackError::TooLarge)?;
    let capacity = 4 + records
        .iter()
        .map(|r| 4 + RECORD_HEADER + r.image.indices.len())
        .sum::<usize>();
    let mut out = Vec::with_capacity(capacity);
    out.extend_from_slice(&count.to_le_bytes());

    for record in records {
        while out.len() % 4 != 0 {
            out.push(0);
        }
        out.extend_from_slice(&record.key.to_le_bytes());
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&record.image.to_bytes());
    }

    info!("Assembled sprite table: {} sprites, {} bytes", count, out.len());
    Ok(out)
}

/// C header that links the table into the firmware under `symbol`.
pub fn c_header(symbol: &str, bin_file: &str) -> String {
    format!(
        r#"
extern "C" {{
    extern const char {symbol}[];
}}

__asm__(".global {symbol}\n.align\n{symbol}:\n.incbin \"{bin_file}\"");
"#
    )
}

/// Read-only view of an assembled sprite table.
#[derive(Debug, Clone)]
pub struct SpriteTable<'a> {
    /// `(hash, offset of [w][h][indices])` per record.
    records: Vec<(u32, usize)>,
    data: &'a [u8],
}

impl<'a> SpriteTable<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, PackError> {
        let count = read_u32(data, 0)? as usize;
        let mut records = Vec::with_capacity(count.min(data.len() / 8));
        let mut pos: usize = 4;

        for _ in 0..count {
            pos = pos.next_multiple_of(4);
            let key = read_u32(data, pos)?;
            let image_at = pos + RECORD_HEADER;
            let (w, h) = match data.get(image_at..image_at + 2) {
                Some(&[w, h]) => (w as usize, h as usize),
                _ => {
                    return Err(PackError::Truncated {
                        needed: image_at + 2,
                        actual: data.len(),
                    })
                }
            };
            let end = image_at + 2 + w * h;
            if end > data.len() {
                return Err(PackError::Truncated {
                    needed: end,
                    actual: data.len(),
                });
            }
            records.push((key, image_at));
            pos = end;
        }

        Ok(Self { records, data })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn image_at(&self, at: usize) -> &'a [u8] {
        let size = self.data[at] as usize * self.data[at + 1] as usize;
        &self.data[at..at + 2 + size]
    }

    /// `[w][h][indices]` of the first sprite stored under `hash`.
    pub fn get(&self, hash: u32) -> Option<&'a [u8]> {
        self.records
            .iter()
            .find(|(key, _)| *key == hash)
            .map(|&(_, at)| self.image_at(at))
    }

    /// `[w][h][indices]` of the sprite at ordinal `index`.
    pub fn get_index(&self, index: usize) -> Option<&'a [u8]> {
        self.records.get(index).map(|&(_, at)| self.image_at(at))
    }

    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.records.iter().map(|&(key, _)| key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: u32, name: &str, width: u8, height: u8, fill: u8) -> SpriteRecord {
        SpriteRecord {
            key,
            name: name.to_string(),
            image: IndexedImage::new(width, height, vec![fill; width as usize * height as usize])
                .unwrap(),
        }
    }

    #[test]
    fn test_assemble_aligns_records() {
        let records = vec![record(0x11223344, "a", 3, 1, 5), record(0xAABBCCDD, "b", 1, 1, 9)];
        let bytes = assemble(&records).unwrap();
        let expected = vec![
            2, 0, 0, 0, // count
            0x44, 0x33, 0x22, 0x11, 0, 0, 3, 1, 5, 5, 5, // first record, 11 bytes
            0, // pad to 16
            0xDD, 0xCC, 0xBB, 0xAA, 0, 0, 1, 1, 9,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_assemble_empty() {
        assert_eq!(assemble(&[]).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_assemble_rejects_collision() {
        let records = vec![record(1, "Aa", 1, 1, 1), record(1, "BB", 1, 1, 2)];
        assert_eq!(
            assemble(&records).unwrap_err(),
            PackError::HashCollision {
                key: 1,
                existing: "Aa".into(),
                incoming: "BB".into(),
            }
        );
    }

    #[test]
    fn test_parse_lookup() {
        let records = vec![
            record(10, "a", 3, 1, 5),
            record(20, "b", 2, 3, 6),
            record(30, "c", 1, 1, 7),
        ];
        let bytes = assemble(&records).unwrap();
        let table = SpriteTable::parse(&bytes).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(20), Some(&[2u8, 3, 6, 6, 6, 6, 6, 6][..]));
        assert_eq!(table.get_index(2), Some(&[1u8, 1, 7][..]));
        assert_eq!(table.get(40), None);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec![10, 20, 30]);
    }

    #[test]
    fn test_parse_truncated() {
        let bytes = assemble(&[record(10, "a", 4, 4, 1)]).unwrap();
        assert!(matches!(
            SpriteTable::parse(&bytes[..bytes.len() - 1]),
            Err(PackError::Truncated { .. })
        ));
    }

    #[test]
    fn test_c_header() {
        let header = c_header("assets", "assets.bin");
        assert!(header.contains("extern const char assets[];"));
        assert!(header.contains(r#".incbin \"assets.bin\""#));
        assert!(header.contains(r#".global assets\n.align\nassets:\n"#));
    }
}
