/*!
 * Batch translation processing.
 *
 * This module splits a source language map into fixed-size batches, runs a
 * retrying translator for each of them (with its own outer retry layer) and
 * merges the fragments into the target map. Batches are processed one at a
 * time, in key order, and any batch that cannot be translated fails the
 * whole map: nothing partial is returned.
 */

use log::{debug, error, info, warn};
use std::time::Instant;

use crate::errors::{BatchError, TranslationError};
use crate::providers::Provider;

use super::translator::RetryingTranslator;
use super::LanguageMap;

/// Characters the model tends to mangle
pub const SPECIAL_CHARACTERS: [char; 3] = ['\\', '§', '\n'];

/// Default number of keys per batch
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// Default number of fresh translator runs per batch
pub const DEFAULT_MAX_BATCH_ATTEMPTS: u32 = 3;

/// Check whether a source value needs an authoritative overwrite on merge
pub fn contains_special_characters(value: &str) -> bool {
    value.chars().any(|c| SPECIAL_CHARACTERS.contains(&c))
}

/// A contiguous chunk of the source map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// 0-based position of the batch
    pub index: usize,
    /// Source entries of the batch
    pub entries: LanguageMap,
}

impl Batch {
    /// Keys of the batch, in order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON object sent as the first user turn
    pub fn to_json(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self.entries.iter()
            .map(|(key, value)| (key.clone(), serde_json::Value::String(value.clone())))
            .collect();
        format!("{:#}", serde_json::Value::Object(object))
    }

    /// Batch keys the fragment does not contain
    pub fn missing_keys(&self, fragment: &LanguageMap) -> Vec<String> {
        self.keys()
            .filter(|key| !fragment.contains_key(*key))
            .cloned()
            .collect()
    }
}

/// Split a source map into ordered batches of at most `batch_size` keys
pub fn split_batches(source: &LanguageMap, batch_size: usize) -> Vec<Batch> {
    let batch_size = batch_size.max(1);
    let mut batches: Vec<Batch> = Vec::with_capacity(source.len().div_ceil(batch_size));

    for (position, (key, value)) in source.iter().enumerate() {
        if position % batch_size == 0 {
            batches.push(Batch {
                index: batches.len(),
                entries: LanguageMap::new(),
            });
        }
        if let Some(batch) = batches.last_mut() {
            batch.entries.insert(key.clone(), value.clone());
        }
    }

    batches
}

/// Merge a successfully parsed fragment into the target map
///
/// Only keys belonging to the batch are taken from the fragment. Values whose
/// source contains a special character are then written again from the
/// fragment, so they always hold exactly what the parsed reply said.
pub fn merge_fragment(target: &mut LanguageMap, batch: &Batch, fragment: &LanguageMap) {
    for (key, value) in fragment {
        if batch.entries.contains_key(key) {
            target.insert(key.clone(), value.clone());
        } else {
            debug!("Ignoring key '{}' that is not part of batch {}", key, batch.index + 1);
        }
    }

    for (key, source_value) in &batch.entries {
        if contains_special_characters(source_value) {
            if let Some(value) = fragment.get(key) {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Progress notifications emitted while translating a map
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Translation of a map begins
    Started {
        total_batches: usize,
        total_keys: usize,
    },
    /// A batch is about to be sent (1-based)
    BatchStarted {
        batch: usize,
        total_batches: usize,
    },
    /// A translator run for the batch failed and a fresh one follows
    BatchRetrying {
        batch: usize,
        attempt: u32,
        error: String,
    },
    /// The batch was merged into the target map
    BatchCompleted {
        batch: usize,
        total_batches: usize,
    },
}

/// Batch orchestrator for translating a whole language map
#[derive(Debug)]
pub struct BatchOrchestrator<P: Provider> {
    /// Translator used for every batch
    translator: RetryingTranslator<P>,

    /// Keys per batch
    batch_size: usize,

    /// Fresh translator runs per batch before giving up
    max_batch_attempts: u32,
}

impl<P: Provider> BatchOrchestrator<P> {
    /// Create a new orchestrator
    pub fn new(translator: RetryingTranslator<P>, batch_size: usize) -> Self {
        Self {
            translator,
            batch_size: batch_size.max(1),
            max_batch_attempts: DEFAULT_MAX_BATCH_ATTEMPTS,
        }
    }

    /// Set the number of outer attempts per batch
    pub fn with_max_batch_attempts(mut self, max_batch_attempts: u32) -> Self {
        self.max_batch_attempts = max_batch_attempts.max(1);
        self
    }

    /// The translator used for every batch
    pub fn translator(&self) -> &RetryingTranslator<P> {
        &self.translator
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Translate a full source map
    ///
    /// # Arguments
    /// * `source` - The source language map
    /// * `system_prompt` - Rendered system instructions
    /// * `on_progress` - Receives a `ProgressEvent` at each step
    ///
    /// # Returns
    /// * The target map with exactly the source's keys, or the first batch failure
    pub async fn translate_map(
        &self,
        source: &LanguageMap,
        system_prompt: &str,
        mut on_progress: impl FnMut(ProgressEvent),
    ) -> Result<LanguageMap, BatchError> {
        let batches = split_batches(source, self.batch_size);
        let total_batches = batches.len();
        on_progress(ProgressEvent::Started {
            total_batches,
            total_keys: source.len(),
        });

        let mut target = LanguageMap::new();
        for batch in &batches {
            on_progress(ProgressEvent::BatchStarted {
                batch: batch.index + 1,
                total_batches,
            });

            let start_time = Instant::now();
            let fragment = self.translate_batch(batch, system_prompt, total_batches, &mut on_progress).await?;
            merge_fragment(&mut target, batch, &fragment);
            debug!("Batch {} completed in {:?}", batch.index + 1, start_time.elapsed());

            on_progress(ProgressEvent::BatchCompleted {
                batch: batch.index + 1,
                total_batches,
            });
        }

        info!("Translated {} key(s) in {} batch(es)", target.len(), total_batches);
        Ok(target)
    }

    /// Obtain a fragment covering every key of the batch
    async fn translate_batch(
        &self,
        batch: &Batch,
        system_prompt: &str,
        total_batches: usize,
        on_progress: &mut impl FnMut(ProgressEvent),
    ) -> Result<LanguageMap, BatchError> {
        let batch_json = batch.to_json();
        let mut attempt = 1;

        loop {
            let outcome = self.translator.translate(system_prompt, &batch_json).await
                .and_then(|fragment| {
                    let missing = batch.missing_keys(&fragment);
                    if missing.is_empty() {
                        Ok(fragment)
                    } else {
                        Err(TranslationError::MissingKeys(missing))
                    }
                });

            match outcome {
                Ok(fragment) => return Ok(fragment),
                Err(error) if attempt < self.max_batch_attempts => {
                    warn!("Batch {}/{} failed: {}. Retrying...", batch.index + 1, total_batches, error);
                    on_progress(ProgressEvent::BatchRetrying {
                        batch: batch.index + 1,
                        attempt,
                        error: error.to_string(),
                    });
                    attempt += 1;
                }
                Err(error) => {
                    error!("Batch {}/{} failed after {} attempt(s): {}", batch.index + 1, total_batches, attempt, error);
                    return Err(BatchError::AttemptsExhausted {
                        batch: batch.index + 1,
                        total_batches,
                        attempts: attempt,
                        last_error: error,
                    });
                }
            }
        }
    }
}
