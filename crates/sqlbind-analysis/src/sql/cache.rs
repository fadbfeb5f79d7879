//! Command-text cache: Moka in-memory, keyed by the xxh3 hash of the
//! resolved text. Identical text at many call sites is lexed once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use moka::sync::Cache;
use xxhash_rust::xxh3::xxh3_64;

use super::types::TextAnalysis;

#[derive(Debug)]
struct CachedText {
    /// Kept to rule out hash collisions.
    text: Box<str>,
    analysis: Arc<TextAnalysis>,
}

pub struct CommandTextCache {
    inner: Cache<u64, Arc<CachedText>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CommandTextCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: Cache::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Lex and classify `text`, or return the shared earlier result.
    /// Concurrent callers with the same text wait for a single analysis.
    pub fn analyze(&self, text: &str) -> Arc<TextAnalysis> {
        let key = xxh3_64(text.as_bytes());
        let entry = self.inner.entry(key).or_insert_with(|| {
            Arc::new(CachedText {
                text: text.into(),
                analysis: Arc::new(super::analyze_text(text)),
            })
        });
        let fresh = entry.is_fresh();
        let cached = entry.into_value();

        if &*cached.text != text {
            tracing::debug!(key, "command text hash collision, analyzing uncached");
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Arc::new(super::analyze_text(text));
        }
        if fresh {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Arc::clone(&cached.analysis)
    }

    pub fn hit_count(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Approximate; Moka applies writes lazily.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

impl Default for CommandTextCache {
    fn default() -> Self {
        Self::new(4096)
    }
}
