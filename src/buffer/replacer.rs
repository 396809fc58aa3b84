//! Cache replacement policy, expressed as a small capability trait so the
//! pool never hard-codes LRU into its own logic.

use std::collections::{HashMap, VecDeque};

use crate::common::config::FrameId;

/// Bookkeeping over a bounded set of frame ids: records accesses, tracks
/// evictability, and chooses a victim. The pool holds one of these behind
/// a trait object and never assumes a particular policy.
pub trait Replacer: std::fmt::Debug {
    /// Records a use of `frame_id` and marks it evictable.
    fn access(&mut self, frame_id: FrameId);

    /// Chooses and removes a victim, or `None` if nothing is evictable.
    fn evict(&mut self) -> Option<FrameId>;

    /// Removes `frame_id` from tracking unconditionally.
    fn reset(&mut self, frame_id: FrameId);

    /// Sets the evictable bit for `frame_id`. If `frame_id` is untracked
    /// and `evictable` is `true`, this behaves like [`Replacer::access`].
    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool);
}

/// LRU cache replacer: among tracked, evictable frames, the one least
/// recently accessed is evicted first.
///
/// A frame found non-evictable during a victim scan is dropped from
/// tracking rather than skipped.
#[derive(Debug)]
pub struct LruReplacer {
    capacity: usize,
    /// Least-recently-accessed frame at the front, most-recent at the back.
    order: VecDeque<FrameId>,
    evictable: HashMap<FrameId, bool>,
}

impl LruReplacer {
    /// Creates a replacer tracking at most `capacity` distinct frame ids.
    /// The pool guarantees this bound holds, since the number of distinct
    /// frames is fixed at construction.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            evictable: HashMap::with_capacity(capacity),
        }
    }
}

impl Replacer for LruReplacer {
    fn access(&mut self, frame_id: FrameId) {
        if let Some(pos) = self.order.iter().position(|&f| f == frame_id) {
            self.order.remove(pos);
        } else {
            debug_assert!(
                self.order.len() < self.capacity,
                "LruReplacer exceeded its configured capacity"
            );
        }
        self.order.push_back(frame_id);
        self.evictable.insert(frame_id, true);
    }

    fn evict(&mut self) -> Option<FrameId> {
        while let Some(&front) = self.order.front() {
            let is_evictable = *self.evictable.get(&front).unwrap_or(&false);
            self.order.pop_front();
            self.evictable.remove(&front);
            if is_evictable {
                return Some(front);
            }
        }
        None
    }

    fn reset(&mut self, frame_id: FrameId) {
        if let Some(pos) = self.order.iter().position(|&f| f == frame_id) {
            self.order.remove(pos);
        }
        self.evictable.remove(&frame_id);
    }

    fn set_evictable(&mut self, frame_id: FrameId, evictable: bool) {
        if evictable && !self.evictable.contains_key(&frame_id) {
            self.access(frame_id);
            return;
        }
        if let Some(flag) = self.evictable.get_mut(&frame_id) {
            *flag = evictable;
        }
    }
}
