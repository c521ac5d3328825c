//! 載入快取
//!
//! 相同內容的輸入只解析一次。快取由呼叫端建立並傳入。

use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;

/// 輸入內容的 SHA-256 雜湊
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey([u8; 32]);

impl ContentKey {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self(key)
    }

    /// 前 8 位十六進位（日誌用）
    pub fn short(&self) -> String {
        self.to_string()[..8].to_string()
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// 載入結果快取
pub trait LoadCache<V> {
    fn get(&mut self, key: &ContentKey) -> Option<V>;

    fn put(&mut self, key: ContentKey, value: V);
}

/// 命中統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

/// 記憶體快取
#[derive(Debug, Clone)]
pub struct MemoryCache<V> {
    entries: HashMap<ContentKey, V>,
    stats: CacheStats,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> LoadCache<V> for MemoryCache<V> {
    fn get(&mut self, key: &ContentKey) -> Option<V> {
        match self.entries.get(key) {
            Some(value) => {
                self.stats.hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    fn put(&mut self, key: ContentKey, value: V) {
        self.entries.insert(key, value);
    }
}

/// 不快取
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl<V> LoadCache<V> for NoopCache {
    fn get(&mut self, _key: &ContentKey) -> Option<V> {
        None
    }

    fn put(&mut self, _key: ContentKey, _value: V) {}
}

/// 以內容雜湊查詢快取，未命中時呼叫 `loader` 並寫回
///
/// 載入失敗不寫入快取。
pub fn memoize<V, E, C, F>(cache: &mut C, bytes: &[u8], loader: F) -> Result<V, E>
where
    V: Clone,
    C: LoadCache<V> + ?Sized,
    F: FnOnce(&[u8]) -> Result<V, E>,
{
    let key = ContentKey::from_bytes(bytes);
    if let Some(value) = cache.get(&key) {
        tracing::debug!("載入快取命中: {}", key.short());
        return Ok(value);
    }

    tracing::debug!("載入快取未命中: {}，重新解析 {} bytes", key.short(), bytes.len());
    let value = loader(bytes)?;
    cache.put(key, value.clone());
    Ok(value)
}
