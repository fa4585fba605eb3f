//! Append-only log file with truncation support.
//!
//! `FileLog<T>` stores any serializable item using the format:
//! ```text
//! [u32 length][bincode serialized T]
//! [u32 length][bincode serialized T]
//! ...
//! ```
//! The byte offset of every entry is cached when the file is opened, so
//! truncating to `n` entries is a single `set_len` call.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::{Serialize, de::DeserializeOwned};

use crate::repository::{RepositoryError, Result};

pub struct FileLog<T> {
    path: PathBuf,
    file: File,
    /// Start offset of each entry.
    offsets: Vec<u64>,
    /// Offset one past the last entry.
    end: u64,
    _phantom: PhantomData<T>,
}

impl<T> FileLog<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Opens `path`, creating it (and its parent directories) if missing.
    ///
    /// Every existing entry is decoded once to build the offset index; a
    /// trailing partial record is reported as corruption.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        let offsets = Self::index(&path, &bytes)?;
        let end = bytes.len() as u64;

        tracing::debug!(
            target: "runtime::repository",
            path = %path.display(),
            entries = offsets.len(),
            "opened log"
        );

        Ok(Self {
            path,
            file,
            offsets,
            end,
            _phantom: PhantomData,
        })
    }

    fn index(path: &Path, bytes: &[u8]) -> Result<Vec<u64>> {
        Ok(Self::decode(path, bytes)?
            .into_iter()
            .map(|(offset, _)| offset)
            .collect())
    }

    /// Decodes every record in `bytes`, pairing each with its relative offset.
    fn decode(path: &Path, bytes: &[u8]) -> Result<Vec<(u64, T)>> {
        let mut items = Vec::new();
        let mut cursor = 0usize;
        while cursor < bytes.len() {
            let header = bytes.get(cursor..cursor + 4).ok_or_else(|| {
                RepositoryError::CorruptedData(format!(
                    "{}: truncated length prefix at offset {}",
                    path.display(),
                    cursor
                ))
            })?;
            let mut len_bytes = [0u8; 4];
            len_bytes.copy_from_slice(header);
            let len = u32::from_le_bytes(len_bytes) as usize;

            let body = bytes.get(cursor + 4..cursor + 4 + len).ok_or_else(|| {
                RepositoryError::CorruptedData(format!(
                    "{}: partial entry at offset {} (expected {} bytes)",
                    path.display(),
                    cursor,
                    len
                ))
            })?;
            let item = bincode::deserialize::<T>(body).map_err(|e| {
                RepositoryError::CorruptedData(format!(
                    "{}: undecodable entry at offset {}: {}",
                    path.display(),
                    cursor,
                    e
                ))
            })?;

            items.push((cursor as u64, item));
            cursor += 4 + len;
        }
        Ok(items)
    }

    /// Number of entries in the log.
    pub fn len(&self) -> u64 {
        self.offsets.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Appends `item` and syncs it to disk. Returns the entry's byte offset.
    pub fn append(&mut self, item: &T) -> Result<u64> {
        let offset = self.end;
        let bytes = bincode::serialize(item)?;
        let len = u32::try_from(bytes.len()).map_err(|_| {
            RepositoryError::Serialization(format!("entry of {} bytes is too large", bytes.len()))
        })?;

        let mut record = Vec::with_capacity(4 + bytes.len());
        record.extend_from_slice(&len.to_le_bytes());
        record.extend_from_slice(&bytes);

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&record)?;
        self.file.sync_data()?;

        self.offsets.push(offset);
        self.end = offset + record.len() as u64;
        Ok(offset)
    }

    /// Reads every entry from index `skip` (0-based) to the end.
    pub fn read_from(&mut self, skip: u64) -> Result<Vec<T>> {
        let Some(&start) = self.offsets.get(skip as usize) else {
            return Ok(Vec::new());
        };

        let mut bytes = vec![0u8; (self.end - start) as usize];
        self.file.seek(SeekFrom::Start(start))?;
        self.file.read_exact(&mut bytes)?;

        Ok(Self::decode(&self.path, &bytes)?
            .into_iter()
            .map(|(_, item)| item)
            .collect())
    }

    /// Keeps the first `len` entries and discards the rest.
    pub fn truncate(&mut self, len: u64) -> Result<()> {
        let Some(&cut) = self.offsets.get(len as usize) else {
            return Ok(());
        };
        self.file.set_len(cut)?;
        self.file.sync_data()?;
        self.offsets.truncate(len as usize);
        self.end = cut;

        tracing::debug!(
            target: "runtime::repository",
            path = %self.path.display(),
            entries = len,
            "truncated log"
        );
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestItem {
        id: u64,
        name: String,
    }

    fn item(id: u64) -> TestItem {
        TestItem {
            id,
            name: format!("item-{id}"),
        }
    }

    #[test]
    fn append_read_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("test.log");

        let mut log = FileLog::<TestItem>::open_or_create(&path).unwrap();
        assert_eq!(log.append(&item(1)).unwrap(), 0);
        log.append(&item(2)).unwrap();
        log.append(&item(3)).unwrap();
        drop(log);

        let mut reopened = FileLog::<TestItem>::open_or_create(&path).unwrap();
        assert_eq!(reopened.len(), 3);
        assert_eq!(reopened.read_from(1).unwrap(), vec![item(2), item(3)]);
        assert!(reopened.read_from(3).unwrap().is_empty());
    }

    #[test]
    fn truncate_then_append_overwrites_tail() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.log");

        let mut log = FileLog::<TestItem>::open_or_create(&path).unwrap();
        for id in 1..=4 {
            log.append(&item(id)).unwrap();
        }
        log.truncate(2).unwrap();
        log.append(&item(9)).unwrap();
        drop(log);

        let mut reopened = FileLog::<TestItem>::open_or_create(&path).unwrap();
        assert_eq!(
            reopened.read_from(0).unwrap(),
            vec![item(1), item(2), item(9)]
        );
    }

    #[test]
    fn partial_trailing_record_is_corruption() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.log");

        let mut log = FileLog::<TestItem>::open_or_create(&path).unwrap();
        log.append(&item(1)).unwrap();
        drop(log);

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[40, 0, 0, 0, 1, 2]).unwrap();
        drop(file);

        assert!(matches!(
            FileLog::<TestItem>::open_or_create(&path),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
