/*!
 * Translation caching functionality.
 *
 * Entries are keyed by source text, both languages and the provider id,
 * so switching services never serves another service's output. Only
 * successful, non-empty translations are stored.
 */

use log::debug;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Cache key combining source text, languages and provider
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    source_text: String,
    source_language: String,
    target_language: String,
    provider_id: String,
}

impl CacheKey {
    fn new(source_text: &str, source_language: &str, target_language: &str, provider_id: &str) -> Self {
        Self {
            source_text: source_text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            provider_id: provider_id.to_string(),
        }
    }
}

/// Cache hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 { self.hits as f64 / total as f64 } else { 0.0 }
    }
}

/// Translation cache shared between concurrent translation tasks.
///
/// Clones share storage and counters.
#[derive(Debug, Clone)]
pub struct TranslationCache {
    cache: Arc<RwLock<HashMap<CacheKey, String>>>,
    stats: Arc<RwLock<CacheStats>>,
    enabled: bool,
}

impl TranslationCache {
    /// Create a new translation cache
    pub fn new(enabled: bool) -> Self {
        Self {
            cache: Arc::new(RwLock::new(HashMap::new())),
            stats: Arc::new(RwLock::new(CacheStats::default())),
            enabled,
        }
    }

    /// Get a translation from the cache
    pub fn get(&self, source_text: &str, source_language: &str, target_language: &str, provider_id: &str) -> Option<String> {
        if !self.enabled {
            return None;
        }

        let key = CacheKey::new(source_text, source_language, target_language, provider_id);
        let found = self.cache.read().get(&key).cloned();

        let mut stats = self.stats.write();
        match found {
            Some(translation) => {
                stats.hits += 1;
                debug!(
                    "Cache hit for '{}' ({} -> {}, {})",
                    truncate_text(source_text, 30),
                    source_language,
                    target_language,
                    provider_id
                );
                Some(translation)
            }
            None => {
                stats.misses += 1;
                None
            }
        }
    }

    /// Store a translation; empty translations are ignored
    pub fn store(&self, source_text: &str, source_language: &str, target_language: &str, provider_id: &str, translation: &str) {
        if !self.enabled || translation.trim().is_empty() {
            return;
        }

        let key = CacheKey::new(source_text, source_language, target_language, provider_id);
        self.cache.write().insert(key, translation.to_string());

        debug!(
            "Cached translation for '{}' ({} -> {}, {})",
            truncate_text(source_text, 30),
            source_language,
            target_language,
            provider_id
        );
    }

    /// Hit/miss counters
    pub fn stats(&self) -> CacheStats {
        *self.stats.read()
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Truncate text to a maximum number of characters with ellipsis
pub(crate) fn truncate_text(text: &str, max_length: usize) -> String {
    match text.char_indices().nth(max_length) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
