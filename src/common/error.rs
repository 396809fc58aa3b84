//! Structured error taxonomy for the storage backend and buffer pool.
//!
//! Every kind here is surfaced internally (and logged via `tracing`) so the
//! crate can compose with `?`, but the public contract of [`crate::storage`]
//! and [`crate::buffer`] stays boolean/`Option`-shaped at runtime: only the
//! construction paths ([`crate::storage::DiskStorageBackend::new`],
//! [`crate::buffer::BufferPoolManager::new`]) return an `Error` directly,
//! since a bad configuration is the one class of failure this crate treats
//! as fatal to construct around.

use std::io;

use thiserror::Error;

use crate::common::config::PageId;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not open backend at {path}: {source}")]
    IoOpenFailed { path: String, #[source] source: io::Error },

    #[error("failed to read page {page_id}: {source}")]
    IoReadFailed { page_id: PageId, #[source] source: io::Error },

    #[error("short read for page {page_id}: expected {expected} bytes, got {actual}")]
    IoShortRead { page_id: PageId, expected: usize, actual: usize },

    #[error("failed to write page {page_id}: {source}")]
    IoWriteFailed { page_id: PageId, #[source] source: io::Error },

    #[error("short write for page {page_id}: expected {expected} bytes, wrote {actual}")]
    IoShortWrite { page_id: PageId, expected: usize, actual: usize },

    #[error("failed to seek to page {page_id}: {source}")]
    IoSeekFailed { page_id: PageId, #[source] source: io::Error },

    #[error("page {0} does not exist")]
    NoSuchPage(PageId),

    #[error("no evictable frame available")]
    NoFreeFrame,

    #[error("page {0} is not mapped to a frame")]
    NotMapped(PageId),

    #[error("backend is already closed")]
    AlreadyClosed,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
