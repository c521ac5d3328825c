//! # MRP Cache
//!
//! 以內容雜湊為鍵的載入快取

pub mod memo;

// Re-export 主要類型
pub use memo::{memoize, CacheStats, ContentKey, LoadCache, MemoryCache, NoopCache};
