//! Component B — the string store (SSTORE).
//!
//! An append-only file of length-prefixed byte strings, deduplicated by
//! content. Every other store references text (identifiers, string and
//! float literals, symbol names) by a [`StringPos`] into this one file
//! rather than embedding bytes inline, which is what keeps the other
//! records fixed-size.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use cc_util::FxHashMap;

use crate::error::StoreError;

/// Byte offset of a string's length-prefixed record within the SSTORE file.
/// Position `0` is reserved for the empty string, written by [`SStore::init`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringPos(pub u16);

impl StringPos {
    pub const EMPTY: StringPos = StringPos(0);
}

const MAX_POS: u64 = u16::MAX as u64;

pub struct SStore {
    file: File,
    read_only: bool,
    next_pos: u64,
    by_hash: FxHashMap<u64, Vec<StringPos>>,
}

impl SStore {
    /// Create a fresh store at `path`, truncating anything already there,
    /// and seed it with the empty-string sentinel at position 0.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        let mut store = Self { file, read_only: false, next_pos: 0, by_hash: FxHashMap::default() };
        let empty_pos = store.write_record(&[])?;
        debug_assert_eq!(empty_pos, StringPos::EMPTY);
        store.by_hash.entry(cc_util::fnv1a64(&[])).or_default().push(empty_pos);
        Ok(store)
    }

    /// Attach to an existing store read-only; [`SStore::intern`] fails on a
    /// store opened this way.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut file = OpenOptions::new().read(true).open(path)?;
        let len = file.seek(SeekFrom::End(0))?;
        let mut store = Self { file, read_only: true, next_pos: len, by_hash: FxHashMap::default() };
        store.rebuild_index()?;
        Ok(store)
    }

    fn rebuild_index(&mut self) -> Result<(), StoreError> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut pos = 0u64;
        let mut buf = Vec::new();
        loop {
            let mut len_bytes = [0u8; 2];
            match self.file.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }
            let len = u16::from_le_bytes(len_bytes) as usize;
            buf.resize(len, 0);
            self.file.read_exact(&mut buf)?;
            let hash = cc_util::fnv1a64(&buf);
            self.by_hash.entry(hash).or_default().push(StringPos(pos as u16));
            pos += 2 + len as u64;
        }
        Ok(())
    }

    /// Idempotent no-op kept for symmetry with the other stores' lifecycle.
    pub fn close(&mut self) -> Result<(), StoreError> {
        self.file.flush()?;
        Ok(())
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn write_record(&mut self, bytes: &[u8]) -> Result<StringPos, StoreError> {
        if self.next_pos + 2 + bytes.len() as u64 > MAX_POS + 1 {
            return Err(StoreError::StringCapacityExceeded { len: bytes.len(), cap: u16::MAX as usize });
        }
        let pos = self.next_pos as u16;
        self.file.seek(SeekFrom::Start(self.next_pos))?;
        self.file.write_all(&(bytes.len() as u16).to_le_bytes())?;
        self.file.write_all(bytes)?;
        self.next_pos += 2 + bytes.len() as u64;
        Ok(StringPos(pos))
    }

    /// Return the bytes stored at `pos`, appending into `buf` (cleared
    /// first). Out-of-range positions are an I/O-level corruption, not a
    /// normal "not found" — every live position originates from a
    /// successful `intern`.
    pub fn get(&mut self, pos: StringPos, buf: &mut Vec<u8>) -> Result<(), StoreError> {
        buf.clear();
        self.file.seek(SeekFrom::Start(pos.0 as u64))?;
        let mut len_bytes = [0u8; 2];
        self.file.read_exact(&mut len_bytes).map_err(|_| {
            StoreError::Corrupt(format!("no string record at position {}", pos.0))
        })?;
        let len = u16::from_le_bytes(len_bytes) as usize;
        buf.resize(len, 0);
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Intern `bytes`, returning the position of an existing equal string
    /// if one is already stored, or appending a new record otherwise.
    pub fn intern(&mut self, bytes: &[u8]) -> Result<StringPos, StoreError> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }
        let hash = cc_util::fnv1a64(bytes);
        let mut scratch = Vec::new();
        if let Some(candidates) = self.by_hash.get(&hash) {
            for &candidate in candidates {
                self.get(candidate, &mut scratch)?;
                if scratch == bytes {
                    return Ok(candidate);
                }
            }
        }
        let pos = self.write_record(bytes)?;
        self.by_hash.entry(hash).or_default().push(pos);
        Ok(pos)
    }

    pub fn byte_len(&self) -> u64 {
        self.next_pos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SStore::init(dir.path().join("s.sstore")).unwrap();
        (dir, store)
    }

    #[test]
    fn empty_string_lives_at_position_zero() {
        let (_dir, mut store) = temp_store();
        let mut buf = Vec::new();
        store.get(StringPos::EMPTY, &mut buf).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn equal_strings_dedup_to_the_same_position() {
        let (_dir, mut store) = temp_store();
        let a = store.intern(b"hello").unwrap();
        let b = store.intern(b"hello").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_get_distinct_positions() {
        let (_dir, mut store) = temp_store();
        let a = store.intern(b"foo").unwrap();
        let b = store.intern(b"bar").unwrap();
        assert_ne!(a, b);
        let mut buf = Vec::new();
        store.get(a, &mut buf).unwrap();
        assert_eq!(buf, b"foo");
        store.get(b, &mut buf).unwrap();
        assert_eq!(buf, b"bar");
    }

    #[test]
    fn reopening_read_only_rebuilds_the_dedup_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.sstore");
        {
            let mut store = SStore::init(&path).unwrap();
            store.intern(b"identifier").unwrap();
            store.close().unwrap();
        }
        let mut store = SStore::open(&path).unwrap();
        assert!(store.intern(b"x").is_err());
        let mut buf = Vec::new();
        store.get(StringPos(2), &mut buf).unwrap();
        assert_eq!(buf, b"identifier");
    }

    #[test]
    fn writing_past_u16_capacity_is_rejected() {
        let (_dir, mut store) = temp_store();
        let big = vec![b'x'; u16::MAX as usize];
        assert!(store.intern(&big).is_err());
    }

    proptest::proptest! {
        /// Interning the same bytes twice, anywhere in a sequence of
        /// distinct strings, always returns the same position both times
        /// and reads back the original bytes.
        #[test]
        fn intern_dedups_and_round_trips(strings in proptest::collection::vec(proptest::collection::vec(proptest::prelude::any::<u8>(), 0..32), 1..16)) {
            let (_dir, mut store) = temp_store();
            let mut positions = Vec::new();
            for s in &strings {
                positions.push(store.intern(s).unwrap());
            }
            for (i, s) in strings.iter().enumerate() {
                let again = store.intern(s).unwrap();
                proptest::prop_assert_eq!(again, positions[i]);
                let mut buf = Vec::new();
                store.get(again, &mut buf).unwrap();
                proptest::prop_assert_eq!(&buf, s);
            }
        }
    }
}
