//! Gemini provider implementation
//!
//! This module provides a client for Google's Gemini models through the
//! Generative Language API, implementing the LlmProvider trait.

pub mod client;
pub mod mapper;
pub mod types;

// Re-export main types for convenience
pub use client::{GeminiClient, GeminiModel, DEFAULT_BASE_URL};
