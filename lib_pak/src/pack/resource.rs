//! Hash-indexed resource pack.
//!
//! ```plain
//! [u32 count]
//! [u32 hash][u32 offset] * count      sorted by hash
//! [u32 length][bytes]    * payloads   sorted by length
//! ```
//!
//! Offsets point at the length prefix. Aliased keys share one payload.

use log::{debug, error, info};

use super::{read_u32, PackError, ResourceBatch};

const COUNT_SIZE: usize = 4;
const RECORD_SIZE: usize = 8;
const LENGTH_SIZE: usize = 4;

/// Where every payload of a batch lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    /// Entry positions in payload order (ascending length, then key).
    pub order: Vec<usize>,
    /// Byte offset of each entry's length prefix, indexed by entry position.
    pub offsets: Vec<u32>,
    pub total_len: usize,
}

/// First pass: sizes every payload and assigns offsets after the index table.
pub fn layout(batch: &ResourceBatch) -> Result<PackLayout, PackError> {
    let entries = batch.entries();
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by_key(|&i| (entries[i].bytes.len(), entries[i].key));

    let mut offsets = vec![0u32; entries.len()];
    let mut pos = COUNT_SIZE + batch.len() * RECORD_SIZE;
    for &i in &order {
        offsets[i] = u32::try_from(pos).map_err(|_| PackError::TooLarge)?;
        pos += LENGTH_SIZE + entries[i].bytes.len();
    }

    Ok(PackLayout {
        order,
        offsets,
        total_len: pos,
    })
}

/// Serializes the batch. The output depends only on the set of entries.
pub fn assemble(batch: &ResourceBatch) -> Result<Vec<u8>, PackError> {
    let layout = layout(batch)?;
    let count = u32::try_from(batch.len()).map_err(|_| PackError::TooLarge)?;
    let entries = batch.entries();

    let mut out = Vec::with_capacity(layout.total_len);
    out.extend_from_slice(&count.to_le_bytes());

    // Second pass: index table, then payloads
    for (key, i) in batch.key_indices() {
        debug!(
            "{:#010x} {} @ {}",
            key, entries[i].name, layout.offsets[i]
        );
        out.extend_from_slice(&key.to_le_bytes());
        out.extend_from_slice(&layout.offsets[i].to_le_bytes());
    }
    for &i in &layout.order {
        let bytes = &entries[i].bytes;
        let len = u32::try_from(bytes.len()).map_err(|_| PackError::TooLarge)?;
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(bytes);
    }

    info!(
        "Assembled pack: {} keys, {} payloads, {} bytes",
        count,
        entries.len(),
        out.len()
    );
    Ok(out)
}

/// Read-only view of an assembled pack.
#[derive(Debug, Clone, Copy)]
pub struct ResourcePack<'a> {
    data: &'a [u8],
    count: usize,
}

impl<'a> ResourcePack<'a> {
    /// Validates the index table and every payload it points at.
    pub fn parse(data: &'a [u8]) -> Result<Self, PackError> {
        let count = read_u32(data, 0)? as usize;
        let index_end = count
            .checked_mul(RECORD_SIZE)
            .and_then(|n| n.checked_add(COUNT_SIZE))
            .ok_or(PackError::TooLarge)?;
        if data.len() < index_end {
            error!("Index table of {} records overruns the pack", count);
            return Err(PackError::Truncated {
                needed: index_end,
                actual: data.len(),
            });
        }

        let pack = Self { data, count };
        let mut previous = None;
        for i in 0..count {
            let (key, offset) = pack.record(i)?;
            if previous.is_some_and(|p| p >= key) {
                error!("Index record {} ({:#010x}) is out of order", i, key);
                return Err(PackError::UnsortedIndex(i));
            }
            previous = Some(key);
            pack.payload_at(offset as usize)?;
        }
        Ok(pack)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The `(hash, offset)` record at position `i` of the index table.
    pub fn record(&self, i: usize) -> Result<(u32, u32), PackError> {
        let at = COUNT_SIZE + i * RECORD_SIZE;
        Ok((read_u32(self.data, at)?, read_u32(self.data, at + 4)?))
    }

    fn payload_at(&self, offset: usize) -> Result<&'a [u8], PackError> {
        let len = read_u32(self.data, offset)? as usize;
        let start = offset + LENGTH_SIZE;
        self.data
            .get(start..start + len)
            .ok_or(PackError::Truncated {
                needed: start + len,
                actual: self.data.len(),
            })
    }

    /// Binary search over the index table, as the device loader does it.
    pub fn get(&self, hash: u32) -> Option<&'a [u8]> {
        let (mut low, mut high) = (0usize, self.count);
        while low < high {
            let mid = low + (high - low) / 2;
            let (pivot, offset) = self.record(mid).ok()?;
            match pivot.cmp(&hash) {
                std::cmp::Ordering::Equal => return self.payload_at(offset as usize).ok(),
                std::cmp::Ordering::Less => low = mid + 1,
                std::cmp::Ordering::Greater => high = mid,
            }
        }
        None
    }

    /// Hashes in index order.
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.count).filter_map(move |i| self.record(i).ok().map(|(key, _)| key))
    }

    /// Every record with its payload, in index order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32, &'a [u8])> + '_ {
        (0..self.count).filter_map(move |i| {
            let (key, offset) = self.record(i).ok()?;
            let payload = self.payload_at(offset as usize).ok()?;
            Some((key, offset, payload))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::AssetEntry;

    fn sample_batch() -> ResourceBatch {
        let mut batch = ResourceBatch::new();
        batch
            .insert(AssetEntry::new(0x30, "big", vec![7; 5]).with_alias(0x05))
            .unwrap();
        batch.insert(AssetEntry::new(0x20, "small", vec![1])).unwrap();
        batch.insert(AssetEntry::new(0x10, "mid", vec![2, 3])).unwrap();
        batch
    }

    #[test]
    fn test_layout_offsets() {
        let batch = sample_batch();
        let layout = layout(&batch).unwrap();
        // 4 keys -> payloads start at 4 + 4 * 8
        assert_eq!(layout.order, vec![1, 2, 0]);
        assert_eq!(layout.offsets, vec![36 + 5 + 6, 36, 36 + 5]);
        assert_eq!(layout.total_len, 36 + 5 + 6 + 9);
    }

    #[test]
    fn test_assemble_bytes() {
        let bytes = assemble(&sample_batch()).unwrap();
        let mut expected = vec![4, 0, 0, 0];
        for (key, offset) in [(0x05u32, 47u32), (0x10, 41), (0x20, 36), (0x30, 47)] {
            expected.extend_from_slice(&key.to_le_bytes());
            expected.extend_from_slice(&offset.to_le_bytes());
        }
        expected.extend_from_slice(&[1, 0, 0, 0, 1]);
        expected.extend_from_slice(&[2, 0, 0, 0, 2, 3]);
        expected.extend_from_slice(&[5, 0, 0, 0, 7, 7, 7, 7, 7]);
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_equal_lengths_order_by_key() {
        let mut batch = ResourceBatch::new();
        batch.insert(AssetEntry::new(9, "b", vec![9, 9])).unwrap();
        batch.insert(AssetEntry::new(3, "a", vec![3, 3])).unwrap();
        let layout = layout(&batch).unwrap();
        assert_eq!(layout.order, vec![1, 0]);
    }

    #[test]
    fn test_empty_batch() {
        let bytes = assemble(&ResourceBatch::new()).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        let pack = ResourcePack::parse(&bytes).unwrap();
        assert!(pack.is_empty());
        assert_eq!(pack.get(1), None);
    }

    #[test]
    fn test_lookup() {
        let bytes = assemble(&sample_batch()).unwrap();
        let pack = ResourcePack::parse(&bytes).unwrap();
        assert_eq!(pack.len(), 4);
        assert_eq!(pack.get(0x20), Some(&[1u8][..]));
        assert_eq!(pack.get(0x10), Some(&[2u8, 3][..]));
        assert_eq!(pack.get(0x30), pack.get(0x05));
        assert_eq!(pack.get(0x31), None);
        assert_eq!(pack.get(0), None);
        assert_eq!(pack.keys().collect::<Vec<_>>(), vec![0x05, 0x10, 0x20, 0x30]);
        let offsets: Vec<u32> = pack.entries().map(|(_, offset, _)| offset).collect();
        assert_eq!(offsets, vec![47, 41, 36, 47]);
    }

    #[test]
    fn test_parse_rejects_truncation() {
        let bytes = assemble(&sample_batch()).unwrap();
        assert!(matches!(
            ResourcePack::parse(&bytes[..bytes.len() - 1]),
            Err(PackError::Truncated { .. })
        ));
        assert!(matches!(
            ResourcePack::parse(&bytes[..20]),
            Err(PackError::Truncated { needed: 36, .. })
        ));
    }

    #[test]
    fn test_parse_rejects_unsorted_index() {
        let mut bytes = assemble(&sample_batch()).unwrap();
        // Swap the first two records
        let (first, second) = (bytes[4..12].to_vec(), bytes[12..20].to_vec());
        bytes[4..12].copy_from_slice(&second);
        bytes[12..20].copy_from_slice(&first);
        assert_eq!(
            ResourcePack::parse(&bytes).unwrap_err(),
            PackError::UnsortedIndex(1)
        );
    }
}
