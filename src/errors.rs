/*!
 * Error types for the modlingo application.
 *
 * Each layer of the translation pipeline has its own error enum, built with
 * the thiserror crate, so failure reasons stay inspectable all the way up to
 * the controller:
 * - `ProviderError`: transport and remote API failures
 * - `ExtractError`: locating the JSON payload inside a model reply
 * - `TranslationError`: one retrying translator run for a batch
 * - `BatchError`: the orchestrator giving up on a batch
 * - `ModError` / `AppError`: archive, file and application level failures
 */

use thiserror::Error;

/// Errors that can occur when working with provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),
}

/// Why a model reply could not be turned into a fragment
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// No `{ ... }` boundaries were found in the reply
    #[error("no JSON object boundaries found in the reply")]
    Incomplete,

    /// Boundaries were found but the enclosed text is not a JSON string map
    #[error("reply contains malformed JSON: {0}")]
    Malformed(String),
}

/// Terminal failure reasons of one retrying translator run
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Transport failure or non-success HTTP status
    #[error("Provider error: {0}")]
    Api(#[from] ProviderError),

    /// The model never produced JSON boundaries within the attempt budget
    #[error("the expected JSON object was not obtained")]
    NoJsonFound,

    /// The model produced JSON boundaries around unparsable content
    #[error("the reply is not in JSON format: {0}")]
    InvalidJson(String),

    /// The attempt budget allowed no request at all
    #[error("the maximum number of attempts ({attempts}) has been reached")]
    AttemptsExhausted {
        /// Configured attempt ceiling
        attempts: u32,
    },

    /// The fragment parsed but does not cover every key of the batch
    #[error("the reply is missing {} key(s): {}", .0.len(), .0.join(", "))]
    MissingKeys(Vec<String>),
}

impl From<ExtractError> for TranslationError {
    fn from(error: ExtractError) -> Self {
        match error {
            ExtractError::Incomplete => Self::NoJsonFound,
            ExtractError::Malformed(message) => Self::InvalidJson(message),
        }
    }
}

/// The orchestrator could not obtain a fragment for a batch
#[derive(Error, Debug)]
pub enum BatchError {
    /// Every outer attempt for the batch failed
    #[error("batch {batch}/{total_batches} failed after {attempts} attempt(s): {last_error}")]
    AttemptsExhausted {
        /// 1-based batch number
        batch: usize,
        /// Number of batches for the mod
        total_batches: usize,
        /// Outer attempts made
        attempts: u32,
        /// Failure of the final attempt
        last_error: TranslationError,
    },
}

/// Errors raised while reading or rewriting a mod archive
#[derive(Error, Debug)]
pub enum ModError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The archive itself is unreadable
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A language file is not a flat JSON string map
    #[error("invalid language file {path}: {message}")]
    InvalidLanguageFile {
        /// Entry path inside the archive
        path: String,
        /// Parser message
        message: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a mod archive
    #[error("Mod error: {0}")]
    Mod(#[from] ModError),

    /// Translation of a mod failed fatally
    #[error("Translation of mod '{mod_name}' failed: {source}")]
    Translation {
        /// Jar file stem of the failing mod
        mod_name: String,
        /// Orchestrator failure
        #[source]
        source: BatchError,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
