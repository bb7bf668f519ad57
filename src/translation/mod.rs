/*!
 * Translation of language maps using a chat model.
 *
 * This module contains the core of the application, split into:
 *
 * - `conversation`: Conversation values and the builder that extends them
 * - `extractor`: Locating and parsing the JSON payload of a model reply
 * - `translator`: The retrying translator driving one conversation
 * - `batch`: Batch splitting, outer retries and fragment merging
 * - `prompts`: System prompt templates
 */

use std::collections::BTreeMap;

/// Flat mapping from translation key to text, kept in key order
pub type LanguageMap = BTreeMap<String, String>;

// Re-export main types for easier usage
pub use self::batch::{BatchOrchestrator, ProgressEvent};
pub use self::conversation::{Conversation, ConversationBuilder};
pub use self::extractor::ResponseExtractor;
pub use self::prompts::PromptTemplate;
pub use self::translator::{RetryingTranslator, TranslationOutcome};

// Submodules
pub mod batch;
pub mod conversation;
pub mod extractor;
pub mod prompts;
pub mod translator;
