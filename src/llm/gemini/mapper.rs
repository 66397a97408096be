//! Mapping between abstraction types and Gemini types

use crate::llm::core::{
    config::GenerationConfig,
    error::LlmError,
    types::{FinishReason, GenerateRequest, GenerateResponse, Message, MessageRole, UsageMetadata},
};

use super::types::{
    Content, GeminiGenerationConfig, GenerateContentRequest, GenerateContentResponse, Part,
};

/// Convert our abstraction request to Gemini's request format
pub fn to_gemini_request(request: GenerateRequest) -> GenerateContentRequest {
    let generation_config = if request.config.is_empty() {
        None
    } else {
        Some(to_gemini_generation_config(request.config))
    };

    GenerateContentRequest {
        contents: request.messages.into_iter().map(to_gemini_content).collect(),
        generation_config,
    }
}

/// Convert a message to Gemini's content format
fn to_gemini_content(message: Message) -> Content {
    let role = match message.role {
        MessageRole::User => "user",
        MessageRole::Assistant => "model",
    };

    Content {
        role: role.to_string(),
        parts: vec![Part::text(message.text)],
    }
}

/// Convert generation config to Gemini's format
fn to_gemini_generation_config(config: GenerationConfig) -> GeminiGenerationConfig {
    GeminiGenerationConfig {
        max_output_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

/// Take the first candidate's first text part as the reply
pub fn from_gemini_response(response: GenerateContentResponse) -> Result<GenerateResponse, LlmError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("response has no candidates".to_string()))?;

    let text = candidate
        .content
        .parts
        .into_iter()
        .next()
        .and_then(|part| part.text)
        .ok_or_else(|| {
            LlmError::InvalidResponse(format!(
                "first candidate has no text part (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

    Ok(GenerateResponse {
        text,
        finish_reason: candidate.finish_reason.as_deref().map(map_finish_reason),
        usage: response.usage_metadata.map(|usage| UsageMetadata {
            input_tokens: usage.prompt_token_count,
            output_tokens: usage.candidates_token_count,
            total_tokens: usage.total_token_count,
        }),
    })
}

/// Map Gemini's finish reason to our abstraction
fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::MaxTokens,
        "SAFETY" => FinishReason::Safety,
        other => FinishReason::Other(other.to_string()),
    }
}
