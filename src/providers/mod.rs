/*!
 * Provider implementations for chat model services.
 *
 * This module contains the client used to reach the remote model:
 * - OpenAI: OpenAI-compatible chat completions API
 * - Mock: scripted replies for exercising the retry logic without a network
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;
use crate::translation::conversation::Conversation;

/// Common trait for chat model providers
///
/// The translator only needs one thing from a provider: send the whole
/// conversation and hand back the assistant's message text.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// The response type for this provider
    type Response: Send + Sync;

    /// Send a conversation using this provider
    ///
    /// # Arguments
    /// * `conversation` - The turns to send, in order
    ///
    /// # Returns
    /// * `Result<Self::Response, ProviderError>` - The response envelope or an error
    async fn complete(&self, conversation: &Conversation) -> Result<Self::Response, ProviderError>;

    /// Extract the assistant's message text from the response
    ///
    /// # Returns
    /// * `Result<String, ProviderError>` - The text, or a parse error when the envelope has none
    fn extract_text(response: &Self::Response) -> Result<String, ProviderError>;
}

pub mod mock;
pub mod openai;
