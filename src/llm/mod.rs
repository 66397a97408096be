//! LLM Abstraction Layer
//!
//! This module provides a provider-neutral interface for sending a prompt to
//! a hosted model and reading back the reply, plus a Gemini implementation.

pub mod core;
pub mod gemini;

// Re-export commonly used types
pub use self::core::{
    config::GenerationConfig,
    error::LlmError,
    provider::LlmProvider,
    types::{
        FinishReason, GenerateRequest, GenerateResponse, Message, MessageRole, UsageMetadata,
    },
};

pub use gemini::{GeminiClient, GeminiModel};
