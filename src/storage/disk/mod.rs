//! Disk-backed [`StorageBackend`]: pages laid out contiguously in a single
//! flat file, page `n` at byte offset `n * page_size`. No header, no magic,
//! no metadata; the file length is always a multiple of `page_size` after
//! a clean session.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, error, warn};

use crate::common::config::PageId;
use crate::common::error::Error;
use crate::storage::backend::StorageBackend;

/// Disk-backed storage for fixed-size pages.
///
/// Page ids begin at **0** (unlike [`MemoryStorageBackend`], which begins
/// at 1); the two backends are numbered independently by design. Opening
/// an existing file resumes numbering from `file_length / page_size`.
///
/// [`MemoryStorageBackend`]: crate::storage::MemoryStorageBackend
#[derive(Debug)]
pub struct DiskStorageBackend {
    path: PathBuf,
    file: Option<File>,
    page_size: usize,
    next_page_id: PageId,
}

impl DiskStorageBackend {
    /// Opens `path` create-or-existing, read/write, and resumes the page-id
    /// counter from the file's current length. Rejects a `page_size` of 0.
    /// The one operation in this crate that returns a structured [`Error`]
    /// directly, since there is no sensible fallback value to hand back
    /// from a failed open.
    pub fn new<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self, Error> {
        if page_size == 0 {
            return Err(Error::InvalidConfig("page_size must be greater than 0".into()));
        }
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .map_err(|source| Error::IoOpenFailed {
                path: path.display().to_string(),
                source,
            })?;

        let len = file
            .metadata()
            .map_err(|source| Error::IoOpenFailed {
                path: path.display().to_string(),
                source,
            })?
            .len();
        let next_page_id = (len / page_size as u64) as PageId;

        debug!(path = %path.display(), next_page_id, "opened disk backend");
        Ok(Self {
            path,
            file: Some(file),
            page_size,
            next_page_id,
        })
    }

    fn file_mut(&mut self) -> Result<&mut File, Error> {
        self.file.as_mut().ok_or(Error::AlreadyClosed)
    }

    fn offset(&self, page_id: PageId) -> u64 {
        page_id as u64 * self.page_size as u64
    }

    fn try_create_new_page(&mut self) -> Result<PageId, Error> {
        let page_id = self.next_page_id;
        let page_size = self.page_size;
        let file = self.file_mut()?;

        file.seek(SeekFrom::End(0))
            .map_err(|source| Error::IoSeekFailed { page_id, source })?;
        let zeros = vec![0u8; page_size];
        file.write_all(&zeros)
            .map_err(|source| Error::IoWriteFailed { page_id, source })?;
        file.flush()
            .map_err(|source| Error::IoWriteFailed { page_id, source })?;

        self.next_page_id += 1;
        Ok(page_id)
    }

    fn try_read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<(), Error> {
        let offset = self.offset(page_id);
        let page_size = self.page_size;
        let file = self.file_mut()?;

        if buf.len() != page_size {
            return Err(Error::IoShortRead {
                page_id,
                expected: page_size,
                actual: buf.len(),
            });
        }
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| Error::IoSeekFailed { page_id, source })?;
        let n = file
            .read(buf)
            .map_err(|source| Error::IoReadFailed { page_id, source })?;
        if n != page_size {
            return Err(Error::IoShortRead {
                page_id,
                expected: page_size,
                actual: n,
            });
        }
        Ok(())
    }

    fn try_write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<(), Error> {
        let offset = self.offset(page_id);
        let page_size = self.page_size;
        let file = self.file_mut()?;

        if buf.len() != page_size {
            return Err(Error::IoShortWrite {
                page_id,
                expected: page_size,
                actual: buf.len(),
            });
        }
        file.seek(SeekFrom::Start(offset))
            .map_err(|source| Error::IoSeekFailed { page_id, source })?;
        file.write_all(buf)
            .map_err(|source| Error::IoWriteFailed { page_id, source })?;
        file.flush()
            .map_err(|source| Error::IoWriteFailed { page_id, source })?;
        Ok(())
    }
}

impl StorageBackend for DiskStorageBackend {
    fn create_new_page(&mut self) -> Option<PageId> {
        match self.try_create_new_page() {
            Ok(page_id) => {
                debug!(page_id, "created new disk page");
                Some(page_id)
            }
            Err(err) => {
                error!(%err, "create_new_page failed");
                None
            }
        }
    }

    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> bool {
        match self.try_read_page(page_id, buf) {
            Ok(()) => true,
            Err(err) => {
                debug!(page_id, %err, "read_page failed");
                false
            }
        }
    }

    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> bool {
        match self.try_write_page(page_id, buf) {
            Ok(()) => true,
            Err(err) => {
                error!(page_id, %err, "write_page failed");
                false
            }
        }
    }

    fn delete_page(&mut self, page_id: PageId) -> bool {
        let zeros = vec![0u8; self.page_size];
        self.write_page(page_id, &zeros)
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn close(&mut self) -> bool {
        if self.file.is_none() {
            warn!(path = %self.path.display(), "close called twice on disk backend");
            return true;
        }
        if let Some(file) = self.file.take() {
            drop(file);
        }
        debug!(path = %self.path.display(), "closed disk backend");
        true
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use tempdir::TempDir;

    use super::*;

    fn fresh_backend(page_size: usize) -> (TempDir, DiskStorageBackend) {
        let dir = TempDir::new("pagecache-disk-test").unwrap();
        let path = dir.path().join("test.db");
        let backend = DiskStorageBackend::new(&path, page_size).unwrap();
        (dir, backend)
    }

    #[test]
    fn page_ids_start_at_zero() {
        let (_dir, mut backend) = fresh_backend(64);
        assert_eq!(backend.create_new_page(), Some(0));
        assert_eq!(backend.create_new_page(), Some(1));
    }

    #[test]
    fn fresh_pages_are_zero() {
        let (_dir, mut backend) = fresh_backend(64);
        let id = backend.create_new_page().unwrap();
        let mut buf = vec![0xAAu8; 64];
        assert!(backend.read_page(id, &mut buf));
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn round_trip() {
        let (_dir, mut backend) = fresh_backend(64);
        let id = backend.create_new_page().unwrap();
        let data: Vec<u8> = (0..64).map(|i| (i % 256) as u8).collect();
        assert!(backend.write_page(id, &data));
        let mut out = vec![0u8; 64];
        assert!(backend.read_page(id, &mut out));
        assert_eq!(out, data);
    }

    #[test]
    fn delete_zeroes_without_reclaiming() {
        let (_dir, mut backend) = fresh_backend(64);
        let p1 = backend.create_new_page().unwrap();
        let p2 = backend.create_new_page().unwrap();
        backend.write_page(p1, &vec![1u8; 64]);
        backend.write_page(p2, &vec![2u8; 64]);

        assert!(backend.delete_page(p1));

        let mut buf = vec![0u8; 64];
        assert!(backend.read_page(p1, &mut buf));
        assert!(buf.iter().all(|&b| b == 0));
        assert!(backend.read_page(p2, &mut buf));
        assert!(buf.iter().all(|&b| b == 2));

        // deleted space is not reclaimed: the next page still gets a fresh id
        let p3 = backend.create_new_page().unwrap();
        assert_eq!(p3, 2);
    }

    #[test]
    fn persists_across_sessions() {
        let dir = TempDir::new("pagecache-disk-test").unwrap();
        let path = dir.path().join("test.db");

        let (p1, p2) = {
            let mut backend = DiskStorageBackend::new(&path, 4096).unwrap();
            let p1 = backend.create_new_page().unwrap();
            let p2 = backend.create_new_page().unwrap();
            let b1: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();
            let b2: Vec<u8> = (0..4096).map(|i| ((3 * i) % 256) as u8).collect();
            assert!(backend.write_page(p1, &b1));
            assert!(backend.write_page(p2, &b2));
            assert!(backend.close());
            (p1, p2)
        };

        let mut backend = DiskStorageBackend::new(&path, 4096).unwrap();
        let mut buf = vec![0u8; 4096];
        assert!(backend.read_page(p1, &mut buf));
        assert!(buf.iter().enumerate().all(|(i, &b)| b == (i % 256) as u8));
        assert!(backend.read_page(p2, &mut buf));
        assert!(buf.iter().enumerate().all(|(i, &b)| b == ((3 * i) % 256) as u8));
    }

    #[test]
    fn operations_after_close_fail() {
        let (_dir, mut backend) = fresh_backend(64);
        assert!(backend.close());
        assert!(backend.close(), "close is idempotent");
        let mut buf = vec![0u8; 64];
        assert!(!backend.read_page(0, &mut buf));
    }

    #[test]
    fn random_pages_round_trip() {
        let (_dir, mut backend) = fresh_backend(256);
        let mut rng = rand::thread_rng();
        let mut written = Vec::new();
        for _ in 0..16 {
            let id = backend.create_new_page().unwrap();
            let data: Vec<u8> = (0..256).map(|_| rng.gen()).collect();
            assert!(backend.write_page(id, &data));
            written.push((id, data));
        }
        for (id, data) in &written {
            let mut out = vec![0u8; 256];
            assert!(backend.read_page(*id, &mut out));
            assert_eq!(&out, data);
        }
    }
}
