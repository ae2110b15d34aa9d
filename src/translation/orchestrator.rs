/*!
 * Batched translation of extracted subtitle text.
 *
 * Texts are split into groups of `batch_size`. Each group is translated
 * with at most `parallelism` provider calls in flight, then the translator
 * waits `inter_batch_delay` before the next group. A failed or empty
 * provider answer keeps the original text for that entry only; the batch
 * itself never fails because of a provider.
 */

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::cache::{TranslationCache, truncate_text};
use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;

/// Batching knobs
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    // @field: Entries per group
    pub batch_size: usize,
    // @field: Provider calls in flight within a group
    pub parallelism: usize,
    // @field: Pause between groups
    pub inter_batch_delay: Duration,
    // @field: Stop scheduling groups once this much time has passed
    pub budget: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 5,
            parallelism: 3,
            inter_batch_delay: Duration::from_millis(1000),
            budget: None,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            parallelism: config.parallelism.max(1),
            inter_batch_delay: config.inter_batch_delay(),
            budget: config.run_budget_secs.map(Duration::from_secs),
        }
    }
}

/// Counters for one translator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub provider_calls: usize,
    pub cache_hits: usize,
    pub skipped: usize,
    pub failures: usize,
    pub untranslated_by_budget: usize,
}

/// Translates text batches through one provider with a shared cache
#[derive(Debug)]
pub struct BatchTranslator {
    provider: Arc<dyn Provider>,
    cache: TranslationCache,
    options: BatchOptions,
    stats: Mutex<TranslationStats>,
}

impl BatchTranslator {
    pub fn new(provider: Arc<dyn Provider>, options: BatchOptions) -> Self {
        Self::with_cache(provider, options, TranslationCache::default())
    }

    pub fn with_cache(provider: Arc<dyn Provider>, options: BatchOptions, cache: TranslationCache) -> Self {
        Self {
            provider,
            cache,
            options,
            stats: Mutex::new(TranslationStats::default()),
        }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    /// Counters accumulated since construction
    pub fn stats(&self) -> TranslationStats {
        *self.stats.lock()
    }

    /// Translate every text; output has the same length and order as input
    pub async fn translate_batch(
        &self,
        content: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<Vec<String>, TranslationError> {
        self.translate_batch_with_progress(content, source_language, target_language, |_, _| {})
            .await
    }

    /// Like [`Self::translate_batch`], reporting `(completed, total)` after each group
    pub async fn translate_batch_with_progress(
        &self,
        content: &[String],
        source_language: &str,
        target_language: &str,
        progress: impl Fn(usize, usize),
    ) -> Result<Vec<String>, TranslationError> {
        let total = content.len();
        let batch_size = self.options.batch_size.max(1);
        let parallelism = self.options.parallelism.max(1);
        let started = Instant::now();

        let mut results: Vec<Option<String>> = vec![None; total];
        let group_count = total.div_ceil(batch_size);

        for (group_index, group) in content.chunks(batch_size).enumerate() {
            let offset = group_index * batch_size;

            if self.budget_exhausted(started) {
                let remaining = total - offset;
                warn!(
                    "Run budget exhausted after {:.1}s, {} entries left untranslated",
                    started.elapsed().as_secs_f64(),
                    remaining
                );
                for (index, text) in content.iter().enumerate().skip(offset) {
                    results[index] = Some(text.clone());
                }
                self.stats.lock().untranslated_by_budget += remaining;
                progress(total, total);
                break;
            }

            debug!("Translating group {}/{} ({} entries)", group_index + 1, group_count, group.len());

            // identical texts in one group share a single provider call
            let mut unique: Vec<&str> = Vec::new();
            let mut slots: Vec<usize> = Vec::with_capacity(group.len());
            for text in group {
                let slot = match unique.iter().position(|known| *known == text.as_str()) {
                    Some(slot) => slot,
                    None => {
                        unique.push(text.as_str());
                        unique.len() - 1
                    }
                };
                slots.push(slot);
            }

            let translated: Vec<(usize, String)> = stream::iter(unique.iter().copied().enumerate())
                .map(|(slot, text)| async move {
                    (slot, self.translate_entry(text, source_language, target_language).await)
                })
                .buffer_unordered(parallelism)
                .collect()
                .await;

            let mut by_slot: Vec<Option<String>> = vec![None; unique.len()];
            for (slot, text) in translated {
                by_slot[slot] = Some(text);
            }
            for (position, slot) in slots.into_iter().enumerate() {
                results[offset + position] = by_slot[slot].clone();
            }

            let completed = offset + group.len();
            progress(completed, total);

            if completed < total && !self.options.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.options.inter_batch_delay).await;
            }
        }

        let output: Vec<String> = results.into_iter().flatten().collect();
        if output.len() != total {
            return Err(TranslationError::ResultCountMismatch {
                expected: total,
                actual: output.len(),
            });
        }

        let stats = self.stats();
        info!(
            "Translated {} entries with {} ({} calls, {} cached, {} skipped, {} failed)",
            total,
            self.provider.id(),
            stats.provider_calls,
            stats.cache_hits,
            stats.skipped,
            stats.failures
        );

        Ok(output)
    }

    fn budget_exhausted(&self, started: Instant) -> bool {
        self.options.budget.is_some_and(|budget| started.elapsed() >= budget)
    }

    async fn translate_entry(&self, text: &str, source_language: &str, target_language: &str) -> String {
        if text.trim().is_empty() || same_language(source_language, target_language) {
            self.stats.lock().skipped += 1;
            return text.to_string();
        }

        let provider_id = self.provider.id();
        if let Some(cached) = self.cache.get(text, source_language, target_language, provider_id) {
            self.stats.lock().cache_hits += 1;
            return cached;
        }

        self.stats.lock().provider_calls += 1;
        match self.provider.translate(text, source_language, target_language).await {
            Ok(translation) if !translation.trim().is_empty() => {
                self.cache
                    .store(text, source_language, target_language, provider_id, &translation);
                translation
            }
            Ok(_) => {
                warn!("Empty translation for '{}', keeping original", truncate_text(text, 40));
                self.stats.lock().failures += 1;
                text.to_string()
            }
            Err(e) => {
                warn!("Translation failed for '{}': {}", truncate_text(text, 40), e);
                self.stats.lock().failures += 1;
                text.to_string()
            }
        }
    }
}

/// Source and target name the same language, so there is nothing to do
fn same_language(source_language: &str, target_language: &str) -> bool {
    source_language.trim().eq_ignore_ascii_case(target_language.trim())
        || language_utils::language_codes_match(source_language, target_language)
}
