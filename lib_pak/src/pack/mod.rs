//! Binary containers: the flat sprite table and the hash-indexed resource pack.

pub mod resource;
pub mod sprite_table;

use std::collections::BTreeMap;

use log::{debug, error};
use thiserror::Error;

pub use resource::ResourcePack;
pub use sprite_table::{SpriteRecord, SpriteTable};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PackError {
    #[error("Hash collision on {key:#010x}: {incoming} collides with {existing}")]
    HashCollision {
        key: u32,
        existing: String,
        incoming: String,
    },
    #[error("Pack exceeds the 32-bit offset range")]
    TooLarge,
    #[error("Truncated pack: needed {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("Index table is not sorted at record {0}")]
    UnsortedIndex(usize),
}

/// One payload of a resource pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    /// Address of the payload.
    pub key: u32,
    /// Secondary address pointing at this same payload.
    pub alias: Option<u32>,
    /// Where the payload came from, for diagnostics.
    pub name: String,
    pub bytes: Vec<u8>,
}

impl AssetEntry {
    pub fn new(key: u32, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            key,
            alias: None,
            name: name.into(),
            bytes,
        }
    }

    pub fn with_alias(mut self, alias: u32) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Every address of this entry, primary first.
    pub fn keys(&self) -> impl Iterator<Item = u32> {
        std::iter::once(self.key).chain(self.alias)
    }
}

/// The entries of one pack, addressable by every key.
///
/// Insertion rejects any key that is already taken, so no entry is ever
/// silently replaced.
#[derive(Debug, Default)]
pub struct ResourceBatch {
    entries: Vec<AssetEntry>,
    keys: BTreeMap<u32, usize>,
}

impl ResourceBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entry: AssetEntry) -> Result<(), PackError> {
        if entry.alias == Some(entry.key) {
            error!("{} hashes to {:#010x} under both of its keys", entry.name, entry.key);
            return Err(PackError::HashCollision {
                key: entry.key,
                existing: entry.name.clone(),
                incoming: entry.name,
            });
        }
        let taken = entry
            .keys()
            .find_map(|key| self.keys.get(&key).map(|&i| (key, i)));
        if let Some((key, existing)) = taken {
            let existing = self.entries[existing].name.clone();
            error!("Collision: {:#010x} {} {}", key, entry.name, existing);
            return Err(PackError::HashCollision {
                key,
                existing,
                incoming: entry.name,
            });
        }

        debug!("{} => {:#010x} (alias {:?})", entry.name, entry.key, entry.alias);
        let index = self.entries.len();
        for key in entry.keys() {
            self.keys.insert(key, index);
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Number of addresses, aliases included. This is the pack's record count.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Distinct payloads in insertion order.
    pub fn entries(&self) -> &[AssetEntry] {
        &self.entries
    }

    pub fn get(&self, key: u32) -> Option<&AssetEntry> {
        self.keys.get(&key).map(|&i| &self.entries[i])
    }

    /// Addresses in ascending order with the position of the entry each resolves to.
    pub fn key_indices(&self) -> impl Iterator<Item = (u32, usize)> + '_ {
        self.keys.iter().map(|(&key, &i)| (key, i))
    }
}

#[inline]
pub(crate) fn read_u32(data: &[u8], at: usize) -> Result<u32, PackError> {
    data.get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or(PackError::Truncated {
            needed: at + 4,
            actual: data.len(),
        })
}
