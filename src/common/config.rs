//! Shared type aliases and constants for page/frame addressing.

/// Dense, monotonically increasing identifier for a page within a single
/// storage backend. Signed to preserve the `-1`-as-failure convention used
/// at the original C-ABI boundary this crate is modeled on; in Rust the
/// failure case is expressed as `Option<PageId>`/`bool` rather than by
/// inspecting the value, so `-1` itself is never produced by this crate.
pub type PageId = i32;

/// Index of a slot inside the buffer pool's backing byte buffer, in
/// `[0, number_of_frames)`. Frame ids have no failure sentinel of their
/// own; callers use `Option<FrameId>` where "no frame" is possible.
pub type FrameId = usize;

/// Default page size in bytes: the conventional 4 KiB page.
pub const DEFAULT_PAGE_SIZE: usize = 4096;
