/*!
 * # modlingo - Minecraft mod language file translator
 *
 * A Rust library for translating the JSON language files shipped inside
 * Minecraft mod jars with a chat model.
 *
 * ## Features
 *
 * - Batch translation of flat key/value language maps
 * - Recovery from truncated model replies by continuing the conversation
 * - Tolerant extraction of the JSON payload from chatty replies
 * - Outer retries per batch with all-or-nothing results per mod
 * - Authoritative overwrite of values containing `\`, `§` or line breaks
 * - Timestamped backups and in-place jar rewriting
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `translation`: The translation core:
 *   - `translation::conversation`: Conversation values and their builder
 *   - `translation::extractor`: JSON payload extraction
 *   - `translation::translator`: The retrying translator
 *   - `translation::batch`: Batching, outer retries and merging
 *   - `translation::prompts`: System prompt templates
 * - `mod_archive`: Reading and rewriting mod jars
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `language_utils`: Minecraft locale code utilities
 * - `providers`: Chat model clients:
 *   - `providers::openai`: OpenAI API client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod mod_archive;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use translation::{BatchOrchestrator, LanguageMap, RetryingTranslator};
pub use errors::{AppError, BatchError, ExtractError, ProviderError, TranslationError};
