//! The buffer pool: a bounded, in-memory view over a [`StorageBackend`]'s
//! pages, with pin/dirty/flush semantics and a pluggable [`Replacer`].

use std::collections::{HashMap, VecDeque};

use tracing::{debug, warn};

use crate::buffer::page_guard::PageGuard;
use crate::buffer::replacer::{LruReplacer, Replacer};
use crate::common::config::{FrameId, PageId};
use crate::common::error::Error;
use crate::storage::backend::StorageBackend;

/// Owns one contiguous `number_of_frames * page_size` byte allocation and
/// mediates all access to it through page ids.
pub struct BufferPoolManager {
    num_frames: usize,
    page_size: usize,
    buffer: Vec<u8>,
    backend: Box<dyn StorageBackend>,
    replacer: Box<dyn Replacer>,
    page_to_frame: HashMap<PageId, FrameId>,
    frame_to_page: HashMap<FrameId, PageId>,
    dirty: Vec<bool>,
    free_frames: VecDeque<FrameId>,
}

impl std::fmt::Debug for BufferPoolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferPoolManager")
            .field("num_frames", &self.num_frames)
            .field("page_size", &self.page_size)
            .field("mapped_pages", &self.page_to_frame.len())
            .field("free_frames", &self.free_frames.len())
            .finish()
    }
}

impl BufferPoolManager {
    /// Creates a pool of `num_frames` frames over `backend`, using `replacer`
    /// as the eviction policy. The replacer capability is injected rather
    /// than hard-coded so alternative policies can be substituted without
    /// touching this type. Rejects `num_frames == 0` and a backend with
    /// `page_size() == 0`.
    pub fn new(
        num_frames: usize,
        backend: Box<dyn StorageBackend>,
        replacer: Box<dyn Replacer>,
    ) -> Result<Self, Error> {
        if num_frames == 0 {
            return Err(Error::InvalidConfig("number_of_frames must be greater than 0".into()));
        }
        let page_size = backend.page_size();
        if page_size == 0 {
            return Err(Error::InvalidConfig("page_size must be greater than 0".into()));
        }
        Ok(Self {
            num_frames,
            page_size,
            buffer: vec![0u8; num_frames * page_size],
            backend,
            replacer,
            page_to_frame: HashMap::with_capacity(num_frames),
            frame_to_page: HashMap::with_capacity(num_frames),
            dirty: vec![false; num_frames],
            free_frames: (0..num_frames).collect(),
        })
    }

    /// Convenience constructor wiring up the one concrete replacement
    /// policy this crate ships: [`LruReplacer`].
    pub fn with_lru(num_frames: usize, backend: Box<dyn StorageBackend>) -> Result<Self, Error> {
        Self::new(num_frames, backend, Box::new(LruReplacer::new(num_frames)))
    }

    /// Number of frames this pool was constructed with. Fixed for the
    /// pool's lifetime.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn frame_range(&self, frame_id: FrameId) -> std::ops::Range<usize> {
        let start = frame_id * self.page_size;
        start..start + self.page_size
    }

    fn frame_slice(&self, frame_id: FrameId) -> &[u8] {
        let range = self.frame_range(frame_id);
        &self.buffer[range]
    }

    fn frame_slice_mut(&mut self, frame_id: FrameId) -> &mut [u8] {
        let range = self.frame_range(frame_id);
        &mut self.buffer[range]
    }

    fn install(&mut self, page_id: PageId, frame_id: FrameId) {
        self.page_to_frame.insert(page_id, frame_id);
        self.frame_to_page.insert(frame_id, page_id);
    }

    /// Returns a free frame, evicting via the replacer if none is free.
    /// `None` if eviction was required and no frame was evictable.
    fn acquire_frame(&mut self) -> Option<FrameId> {
        if let Some(frame_id) = self.free_frames.pop_front() {
            return Some(frame_id);
        }
        self.evict_one()
    }

    /// Asks the replacer for a victim, writes it back if dirty, then hands
    /// the frame back. A write-back failure is logged and the eviction
    /// proceeds anyway.
    fn evict_one(&mut self) -> Option<FrameId> {
        let frame_id = self.replacer.evict()?;
        let page_id = self
            .frame_to_page
            .remove(&frame_id)
            .expect("replacer tracked a frame with no mapped page");
        self.page_to_frame.remove(&page_id);

        if self.dirty[frame_id] {
            let range = self.frame_range(frame_id);
            let slice = &self.buffer[range];
            if !self.backend.write_page(page_id, slice) {
                warn!(
                    page_id,
                    frame_id, "eviction write-back failed; proceeding anyway"
                );
            }
            self.dirty[frame_id] = false;
        }

        debug!(page_id, frame_id, "evicted page");
        Some(frame_id)
    }

    /// Allocates a fresh page. Runs the eviction protocol if no frame is
    /// free; returns `None` without touching the backend if eviction is
    /// impossible.
    pub fn new_page(&mut self) -> Option<PageId> {
        let frame_id = self.acquire_frame()?;
        let page_id = match self.backend.create_new_page() {
            Some(id) => id,
            None => {
                self.free_frames.push_back(frame_id);
                return None;
            }
        };

        self.frame_slice_mut(frame_id).fill(0);
        self.install(page_id, frame_id);
        self.replacer.access(frame_id);
        debug!(page_id, frame_id, "allocated new page");
        Some(page_id)
    }

    /// Returns the bytes for `page_id`, faulting it in through the backend
    /// if it isn't resident. `None` if eviction is impossible or the
    /// backend read fails; in the read-failure case the frame is returned
    /// to the free list and no mapping is installed.
    pub fn fetch_page(&mut self, page_id: PageId) -> Option<&mut [u8]> {
        if let Some(&frame_id) = self.page_to_frame.get(&page_id) {
            self.replacer.access(frame_id);
            return Some(self.frame_slice_mut(frame_id));
        }

        let frame_id = self.acquire_frame()?;
        let ok = {
            let range = self.frame_range(frame_id);
            let slice = &mut self.buffer[range];
            self.backend.read_page(page_id, slice)
        };
        if !ok {
            self.free_frames.push_back(frame_id);
            debug!(page_id, "fetch_page: backend read failed");
            return None;
        }

        self.install(page_id, frame_id);
        self.replacer.access(frame_id);
        Some(self.frame_slice_mut(frame_id))
    }

    /// Pins `page_id` and fetches it, returning an RAII [`PageGuard`] that
    /// unpins (and flushes the dirty bit) on drop. Sugar over
    /// [`BufferPoolManager::fetch_page`]/[`pin_page`]/[`unpin_page`], not a
    /// replacement for them.
    ///
    /// [`pin_page`]: BufferPoolManager::pin_page
    /// [`unpin_page`]: BufferPoolManager::unpin_page
    pub fn fetch_page_guard(&mut self, page_id: PageId) -> Option<PageGuard<'_>> {
        self.fetch_page(page_id)?;
        Some(PageGuard::new(self, page_id))
    }

    /// Allocates a fresh page and returns it already wrapped in a
    /// [`PageGuard`].
    pub fn new_page_guard(&mut self) -> Option<PageGuard<'_>> {
        let page_id = self.new_page()?;
        Some(PageGuard::new(self, page_id))
    }

    pub(crate) fn frame_slice_for(&self, page_id: PageId) -> Option<&[u8]> {
        self.page_to_frame.get(&page_id).map(|&f| self.frame_slice(f))
    }

    pub(crate) fn frame_slice_for_mut(&mut self, page_id: PageId) -> Option<&mut [u8]> {
        let frame_id = *self.page_to_frame.get(&page_id)?;
        Some(self.frame_slice_mut(frame_id))
    }

    /// Removes `page_id` from the pool (buffer-side cleanup happens even
    /// if the backend call below fails) and asks the backend to delete it.
    pub fn delete_page(&mut self, page_id: PageId) -> bool {
        if let Some(frame_id) = self.page_to_frame.remove(&page_id) {
            self.frame_to_page.remove(&frame_id);
            self.dirty[frame_id] = false;
            self.replacer.reset(frame_id);
            self.free_frames.push_back(frame_id);
        }
        self.backend.delete_page(page_id)
    }

    /// Writes `page_id` through to the backend if dirty; a no-op I/O-wise
    /// if clean. `false` if `page_id` isn't mapped.
    pub fn flush_page(&mut self, page_id: PageId) -> bool {
        let frame_id = match self.page_to_frame.get(&page_id) {
            Some(&f) => f,
            None => return false,
        };
        if !self.dirty[frame_id] {
            return true;
        }
        self.dirty[frame_id] = false;
        self.replacer.access(frame_id);
        let range = self.frame_range(frame_id);
        let slice = &self.buffer[range];
        self.backend.write_page(page_id, slice)
    }

    /// Flushes every dirty mapped page. No ordering guarantee among pages;
    /// a page whose flush fails is logged but does not abort the sweep.
    pub fn flush_all(&mut self) {
        let page_ids: Vec<PageId> = self.page_to_frame.keys().copied().collect();
        for page_id in page_ids {
            if !self.flush_page(page_id) {
                warn!(page_id, "flush_all: failed to flush page");
            }
        }
    }

    /// The only way a frame becomes dirty. `false` if `page_id` isn't
    /// mapped.
    pub fn set_dirty(&mut self, page_id: PageId) -> bool {
        match self.page_to_frame.get(&page_id) {
            Some(&frame_id) => {
                self.dirty[frame_id] = true;
                true
            }
            None => false,
        }
    }

    /// Marks the frame mapped to `page_id` non-evictable. `false` if
    /// `page_id` isn't mapped.
    pub fn pin_page(&mut self, page_id: PageId) -> bool {
        match self.page_to_frame.get(&page_id) {
            Some(&frame_id) => {
                self.replacer.set_evictable(frame_id, false);
                true
            }
            None => false,
        }
    }

    /// Marks the frame mapped to `page_id` evictable again. `false` if
    /// `page_id` isn't mapped.
    pub fn unpin_page(&mut self, page_id: PageId) -> bool {
        match self.page_to_frame.get(&page_id) {
            Some(&frame_id) => {
                self.replacer.set_evictable(frame_id, true);
                true
            }
            None => false,
        }
    }
}
