use crate::common::config::PageId;

/// A page store: creates, reads, writes, and deletes fixed-size pages
/// addressed by dense integer ids. Implementations know nothing about page
/// contents; every page is an opaque, `page_size()`-byte blob.
///
/// All fallible operations report failure through `bool`/`Option` rather
/// than `Result`; structured reasons are logged internally (see
/// [`crate::common::error::Error`]) but never cross this trait boundary,
/// matching the "no exceptions cross the boundary" contract.
pub trait StorageBackend: std::fmt::Debug {
    /// Appends a new, zero-filled page and returns its id, or `None` on
    /// I/O failure. On failure the store is left without the new page.
    fn create_new_page(&mut self) -> Option<PageId>;

    /// Copies `page_size()` bytes of `page_id` into `buf`. `buf` must be
    /// exactly `page_size()` bytes long. Returns `false` if `page_id`
    /// doesn't exist, the read was short, or the underlying I/O failed.
    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> bool;

    /// Overwrites `page_id` with the `page_size()` bytes in `buf`. Returns
    /// `false` on error or short write.
    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> bool;

    /// Logically removes `page_id`. Disk-backed implementations zero the
    /// page's bytes in place without reclaiming the space; in-memory
    /// implementations drop the entry outright.
    fn delete_page(&mut self, page_id: PageId) -> bool;

    /// The fixed page size this backend was constructed with.
    fn page_size(&self) -> usize;

    /// Releases the underlying resource. Idempotent: a second call
    /// returns `true` but is logged as a warning. Any operation after
    /// `close` is invalid and reports failure.
    fn close(&mut self) -> bool;
}
