pub mod page_guard;
pub mod pool;
pub mod replacer;

pub use page_guard::PageGuard;
pub use pool::BufferPoolManager;
pub use replacer::{LruReplacer, Replacer};
