/*!
 * Retrying translator: drives one conversation to a parsed fragment.
 *
 * Each run starts a fresh conversation and walks this state machine:
 *
 * - send the conversation; a transport or API failure ends the run
 * - extract the JSON payload from the reply
 *   - parsed: the run succeeds with the fragment
 *   - no boundaries: extend the conversation with a continuation request and
 *     send again, or fail with `NoJsonFound` once the ceiling is reached
 *   - malformed: fail with `InvalidJson` right away
 */

use log::{debug, warn};

use crate::errors::{ExtractError, TranslationError};
use crate::providers::Provider;

use super::conversation::ConversationBuilder;
use super::extractor::ResponseExtractor;
use super::LanguageMap;

/// Default attempt ceiling of one run
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Result of one translator run for a batch
pub type TranslationOutcome = Result<LanguageMap, TranslationError>;

/// Sends a batch to the model, continuing truncated answers
#[derive(Debug)]
pub struct RetryingTranslator<P: Provider> {
    /// Chat model client
    provider: P,
    /// Exclusive attempt ceiling; requests sent per run are `max_attempts - 1`
    max_attempts: u32,
}

impl<P: Provider> RetryingTranslator<P> {
    /// Create a translator with the default attempt ceiling
    pub fn new(provider: P) -> Self {
        Self::with_max_attempts(provider, DEFAULT_MAX_ATTEMPTS)
    }

    /// Create a translator with a custom attempt ceiling
    ///
    /// The ceiling is exclusive: with the default of 3 a run sends at most
    /// two requests and appends at most one continuation turn.
    pub fn with_max_attempts(provider: P, max_attempts: u32) -> Self {
        Self {
            provider,
            max_attempts,
        }
    }

    /// The underlying provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Translate one batch
    ///
    /// # Arguments
    /// * `system_prompt` - Rendered system instructions
    /// * `batch_json` - The batch's source map encoded as JSON
    pub async fn translate(&self, system_prompt: &str, batch_json: &str) -> TranslationOutcome {
        let mut conversation = ConversationBuilder::build(system_prompt, batch_json);

        for attempt in 1..self.max_attempts {
            let response = self.provider.complete(&conversation).await?;
            let reply = P::extract_text(&response)?;
            debug!("Model reply (attempt {}): {}", attempt, reply);

            match ResponseExtractor::extract(&reply) {
                Ok(fragment) => return Ok(fragment),
                Err(ExtractError::Incomplete) if attempt + 1 < self.max_attempts => {
                    warn!("Reply contained no JSON object, asking the model to continue (attempt {})", attempt);
                    conversation = ConversationBuilder::extend(&conversation, &reply);
                }
                Err(error) => return Err(error.into()),
            }
        }

        Err(TranslationError::AttemptsExhausted {
            attempts: self.max_attempts,
        })
    }
}
