use std::collections::HashMap;

use tracing::{debug, warn};

use crate::common::config::PageId;
use crate::common::error::Error;
use crate::storage::backend::StorageBackend;

/// Transient, non-persisted [`StorageBackend`]: pages live only in a
/// `HashMap` for the process lifetime of this value.
///
/// Page ids begin at **1** and increment, unlike [`DiskStorageBackend`]
/// (starts at 0 at fresh-file creation). The two backends are numbered
/// independently by design.
///
/// [`DiskStorageBackend`]: crate::storage::DiskStorageBackend
#[derive(Debug)]
pub struct MemoryStorageBackend {
    page_size: usize,
    next_page_id: PageId,
    pages: HashMap<PageId, Vec<u8>>,
    closed: bool,
}

impl MemoryStorageBackend {
    /// Creates an empty backend with the given page size. Page ids are
    /// handed out starting at 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size,
            next_page_id: 0,
            pages: HashMap::new(),
            closed: false,
        }
    }
}

impl StorageBackend for MemoryStorageBackend {
    fn create_new_page(&mut self) -> Option<PageId> {
        if self.closed {
            warn!("create_new_page on closed in-memory backend");
            return None;
        }
        self.next_page_id += 1;
        let page_id = self.next_page_id;
        self.pages.insert(page_id, vec![0u8; self.page_size]);
        debug!(page_id, "created new in-memory page");
        Some(page_id)
    }

    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> bool {
        if self.closed {
            warn!("read_page on closed in-memory backend");
            return false;
        }
        match self.pages.get(&page_id) {
            Some(data) if data.len() == buf.len() => {
                buf.copy_from_slice(data);
                true
            }
            Some(_) => false,
            None => {
                let err = Error::NoSuchPage(page_id);
                debug!(%err);
                false
            }
        }
    }

    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> bool {
        if self.closed {
            warn!("write_page on closed in-memory backend");
            return false;
        }
        if buf.len() != self.page_size {
            return false;
        }
        match self.pages.get_mut(&page_id) {
            Some(data) => {
                data.copy_from_slice(buf);
                true
            }
            None => false,
        }
    }

    fn delete_page(&mut self, page_id: PageId) -> bool {
        if self.closed {
            warn!("delete_page on closed in-memory backend");
            return false;
        }
        self.pages.remove(&page_id).is_some()
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn close(&mut self) -> bool {
        if self.closed {
            warn!("close called twice on in-memory backend");
        }
        self.closed = true;
        self.pages.clear();
        true
    }
}
