//! RAII sugar over the buffer pool's pin/dirty/unpin primitives. Since the
//! pool isn't internally synchronized, there's no separate read/write latch
//! to upgrade between, so a single guard type covers both access patterns.

use crate::buffer::pool::BufferPoolManager;
use crate::common::config::PageId;

/// Borrows a [`BufferPoolManager`] exclusively for as long as `page_id`
/// should stay pinned. Pins on construction, unpins on drop, and marks the
/// page dirty automatically if [`PageGuard::data_mut`] was ever called.
///
/// This is sugar over the primitive operations (`pin_page`, `set_dirty`,
/// `unpin_page`); every one of them remains directly callable on the
/// pool, and nothing here replaces that boolean/`Option`-returning surface.
pub struct PageGuard<'a> {
    pool: &'a mut BufferPoolManager,
    page_id: PageId,
    touched: bool,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(pool: &'a mut BufferPoolManager, page_id: PageId) -> Self {
        pool.pin_page(page_id);
        Self {
            pool,
            page_id,
            touched: false,
        }
    }

    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    /// Read-only view of the page's bytes.
    pub fn data(&self) -> &[u8] {
        self.pool
            .frame_slice_for(self.page_id)
            .expect("page unmapped while guarded")
    }

    /// Mutable view of the page's bytes. Marks the page dirty when the
    /// guard is dropped.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.touched = true;
        self.pool
            .frame_slice_for_mut(self.page_id)
            .expect("page unmapped while guarded")
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        if self.touched {
            self.pool.set_dirty(self.page_id);
        }
        self.pool.unpin_page(self.page_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorageBackend;

    #[test]
    fn guard_unpins_on_drop() {
        // The guard holds the pool borrowed exclusively for its lifetime,
        // so the "pinning blocks eviction" property itself is exercised
        // directly against `pin_page`/`unpin_page` in `buffer::pool`'s test
        // module; this test only checks that dropping the guard releases
        // the pin.
        let mut bpm = BufferPoolManager::with_lru(1, Box::new(MemoryStorageBackend::new(64))).unwrap();
        let p1 = bpm.new_page().unwrap();
        let guard = bpm.fetch_page_guard(p1).unwrap();
        drop(guard);
        assert!(bpm.new_page().is_some());
    }

    #[test]
    fn data_mut_marks_dirty_on_drop() {
        let mut bpm = BufferPoolManager::with_lru(1, Box::new(MemoryStorageBackend::new(64))).unwrap();
        let p1 = bpm.new_page().unwrap();
        {
            let mut guard = bpm.fetch_page_guard(p1).unwrap();
            guard.data_mut()[0] = b'Z';
        }
        // guard dropped (unpinned) without an explicit set_dirty call;
        // forcing an eviction (only one frame) proves the dirty bit was
        // set and the byte reached the backend before the mapping dropped.
        let p2 = bpm.new_page().unwrap();
        assert_eq!(bpm.fetch_page(p1).unwrap()[0], b'Z');
        let _ = p2;
    }

    #[test]
    fn read_only_guard_never_marks_dirty() {
        let mut bpm = BufferPoolManager::with_lru(2, Box::new(MemoryStorageBackend::new(64))).unwrap();
        let p1 = bpm.new_page().unwrap();
        {
            let guard = bpm.fetch_page_guard(p1).unwrap();
            let _ = guard.data();
        }
        // clean flush issues no backend write; true either way, but this
        // also exercises that the guard didn't panic looking up the page.
        assert!(bpm.flush_page(p1));
    }
}
