//! Provider trait for LLM implementations

use async_trait::async_trait;

use super::{
    error::LlmError,
    types::{GenerateRequest, GenerateResponse},
};

/// Main interface that all LLM provider implementations must satisfy
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one request and wait for the complete reply
    ///
    /// # Arguments
    /// * `request` - The generation request with messages and config
    ///
    /// # Returns
    /// The reply text with whatever metadata the provider reports, or an
    /// error if the call fails or the response has no usable text
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, LlmError>;
}
