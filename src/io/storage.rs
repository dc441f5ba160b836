//! Non-volatile byte storage and the persisted alarm flag.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{trace, warn};

/// Errors opening a host-side storage image.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read storage image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Byte-addressed non-volatile storage.
///
/// Addresses never written read as `0`. Writes are assumed to succeed; an
/// implementation that can fail reports it out of band.
pub trait NvStorage {
    fn nv_read(&self, address: u16) -> u8;

    /// Write `value` only if it differs from what is stored, sparing the
    /// medium a write cycle otherwise.
    fn nv_write_if_changed(&mut self, address: u16, value: u8);
}

/// In-memory storage. Cloning it models a power cycle: the clone sees
/// exactly what had been written.
#[derive(Clone, Debug, Default)]
pub struct MemoryNv {
    cells: HashMap<u16, u8>,
    writes: u64,
}

impl MemoryNv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of physical writes performed so far.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl NvStorage for MemoryNv {
    fn nv_read(&self, address: u16) -> u8 {
        self.cells.get(&address).copied().unwrap_or(0)
    }

    fn nv_write_if_changed(&mut self, address: u16, value: u8) {
        if self.nv_read(address) == value {
            return;
        }
        self.cells.insert(address, value);
        self.writes += 1;
    }
}

/// EEPROM image backed by a file on the host.
///
/// The whole image is loaded on open and rewritten on every effective
/// write. A missing file is an empty (all zero) image. The in-memory copy
/// mirrors the file: a write that fails to reach disk is not remembered.
#[derive(Debug)]
pub struct FileNv {
    path: PathBuf,
    image: Vec<u8>,
}

impl FileNv {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let image = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        Ok(Self { path, image })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NvStorage for FileNv {
    fn nv_read(&self, address: u16) -> u8 {
        self.image.get(usize::from(address)).copied().unwrap_or(0)
    }

    fn nv_write_if_changed(&mut self, address: u16, value: u8) {
        if self.nv_read(address) == value {
            return;
        }
        let index = usize::from(address);
        let mut image = self.image.clone();
        if image.len() <= index {
            image.resize(index + 1, 0);
        }
        image[index] = value;
        // Only what reached the file counts as stored, so a failed write is
        // retried by the next one.
        match fs::write(&self.path, &image) {
            Ok(()) => self.image = image,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "failed to persist storage image")
            }
        }
    }
}

/// Durable single-bit record of whether the alarm was sounding.
///
/// Stored as one byte: `0` is false, any other value is true.
#[derive(Debug)]
pub struct FlagStore<N: NvStorage> {
    nv: N,
    address: u16,
}

impl<N: NvStorage> FlagStore<N> {
    pub fn new(nv: N, address: u16) -> Self {
        Self { nv, address }
    }

    pub fn load(&self) -> bool {
        self.nv.nv_read(self.address) != 0
    }

    /// Persist `value`; a no-op on the medium when it is already stored.
    pub fn store(&mut self, value: bool) {
        trace!(address = self.address, value, "storing alarm flag");
        self.nv.nv_write_if_changed(self.address, u8::from(value));
    }

    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn nv(&self) -> &N {
        &self.nv
    }

    pub fn into_inner(self) -> N {
        self.nv
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_flag_loads_false() {
        let store = FlagStore::new(MemoryNv::new(), 0);
        assert!(!store.load());
    }

    #[test]
    fn flag_survives_power_cycle() {
        let mut store = FlagStore::new(MemoryNv::new(), 0);
        store.store(true);

        let rebooted = FlagStore::new(store.into_inner().clone(), 0);
        assert!(rebooted.load());
    }

    #[test]
    fn any_nonzero_byte_is_true() {
        let mut nv = MemoryNv::new();
        nv.nv_write_if_changed(9, 0x5a);

        assert!(FlagStore::new(nv, 9).load());
    }

    #[test]
    fn unchanged_value_does_not_wear_medium() {
        let mut store = FlagStore::new(MemoryNv::new(), 3);
        store.store(false);
        assert_eq!(store.nv().writes(), 0);

        store.store(true);
        store.store(true);
        store.store(true);
        assert_eq!(store.nv().writes(), 1);

        store.store(false);
        assert_eq!(store.nv().writes(), 2);
    }

    #[test]
    fn file_image_round_trips_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("eeprom.bin");

        let mut store = FlagStore::new(FileNv::open(&path).unwrap(), 5);
        assert!(!store.load());
        store.store(true);
        drop(store);

        let reopened = FlagStore::new(FileNv::open(&path).unwrap(), 5);
        assert!(reopened.load());
        assert_eq!(fs::read(&path).unwrap(), vec![0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn failed_file_write_is_retried() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nv");
        fs::create_dir(&dir).unwrap();
        let path = dir.join("eeprom.bin");
        let mut store = FlagStore::new(FileNv::open(&path).unwrap(), 0);

        fs::remove_dir_all(&dir).unwrap();
        store.store(true);
        assert!(!store.load());

        fs::create_dir(&dir).unwrap();
        store.store(true);
        assert!(store.load());

        let reopened = FlagStore::new(FileNv::open(&path).unwrap(), 0);
        assert!(reopened.load());
    }

    #[test]
    fn missing_file_reads_zero() {
        let temp_dir = TempDir::new().unwrap();
        let nv = FileNv::open(temp_dir.path().join("absent.bin")).unwrap();

        assert_eq!(nv.nv_read(0), 0);
        assert_eq!(nv.nv_read(u16::MAX), 0);
    }
}
