/*!
 * Tests for translation cache functionality
 */

use subtitle_translator::translation::cache::{CacheStats, TranslationCache};

/// Test that a disabled cache never returns anything
#[test]
fn test_cache_new_withDisabled_shouldNeverHit() {
    let cache = TranslationCache::new(false);
    cache.store("hello", "en", "fr", "mock", "bonjour");

    assert!(cache.get("hello", "en", "fr", "mock").is_none());
    assert!(cache.is_empty());
    assert!(!cache.is_enabled());
}

/// Test that every part of the key matters
#[test]
fn test_cache_get_withDifferentKeyParts_shouldMiss() {
    let cache = TranslationCache::new(true);
    cache.store("hello", "en", "fr", "mock", "bonjour");

    assert_eq!(cache.get("hello", "en", "fr", "mock"), Some("bonjour".to_string()));
    assert!(cache.get("hello", "de", "fr", "mock").is_none());
    assert!(cache.get("hello", "en", "es", "mock").is_none());
    assert!(cache.get("hello", "en", "fr", "deepl").is_none());
    assert!(cache.get("Hello", "en", "fr", "mock").is_none());
}

/// Test hit and miss counting
#[test]
fn test_cache_stats_withHitsAndMisses_shouldCountBoth() {
    let cache = TranslationCache::new(true);
    cache.store("one", "en", "fr", "mock", "un");

    cache.get("one", "en", "fr", "mock");
    cache.get("one", "en", "fr", "mock");
    cache.get("two", "en", "fr", "mock");

    let stats = cache.stats();
    assert_eq!(stats, CacheStats { hits: 2, misses: 1 });
    assert!((stats.hit_rate() - 2.0 / 3.0).abs() < f64::EPSILON);
}

/// Test that clones share storage
#[test]
fn test_cache_clone_withSharedStorage_shouldSeeStores() {
    let cache = TranslationCache::new(true);
    let clone = cache.clone();
    clone.store("yes", "en", "de", "mock", "ja");

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get("yes", "en", "de", "mock"), Some("ja".to_string()));
    assert_eq!(clone.stats(), CacheStats { hits: 1, misses: 0 });
}
