//! Storage and buffering core of a paged-heap embedded database engine.
//!
//! Two layers, bottom-up:
//!
//! - [`storage`]: a [`storage::StorageBackend`] abstraction over
//!   fixed-size, dense-integer-addressed pages, with a disk-backed
//!   ([`storage::DiskStorageBackend`]) and an in-memory
//!   ([`storage::MemoryStorageBackend`]) implementation.
//! - [`buffer`]: a [`buffer::BufferPoolManager`] that maps a bounded set of
//!   in-memory frames onto backend pages, resolving faults through the
//!   backend and evictions through a pluggable [`buffer::Replacer`]
//!   (shipped: [`buffer::LruReplacer`]).
//!
//! Concurrency control, write-ahead logging, crash recovery beyond what the
//! OS provides on flush, and free-page reuse are explicitly out of scope.

pub mod buffer;
pub mod common;
pub mod storage;

pub use buffer::BufferPoolManager;
pub use common::config::{FrameId, PageId, DEFAULT_PAGE_SIZE};
pub use common::error::Error;
pub use common::logging::init_logging;
pub use storage::{DiskStorageBackend, MemoryStorageBackend, StorageBackend};
