//! Chat-with-attachment flow
//!
//! `ChatService::send` validates the input, stores and extracts an optional
//! upload, builds the prompt, calls the model and records the exchange.
//! The store is only touched after the model has replied, so any failure
//! leaves the session table unchanged.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::extract::{self, extension_of, DocumentKind, ExtractError};
use crate::llm::{GenerateRequest, GenerationConfig, LlmError, LlmProvider};
use crate::prompt;
use crate::store::{ChatStore, Exchange};
use crate::uploads::UploadDir;

/// Errors from the chat flow
#[derive(Debug, Error)]
pub enum ChatError {
    /// Neither text nor a file was supplied
    #[error("no input or file received")]
    InvalidInput,

    /// The upload's extension has no extractor
    #[error("unsupported file type {extension:?} ({file})")]
    UnsupportedFileType { file: String, extension: String },

    /// The upload could not be written to the downloads directory
    #[error("failed to store upload: {0}")]
    Upload(#[from] std::io::Error),

    #[error(transparent)]
    Extraction(#[from] ExtractError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// A file attached to a chat message
#[derive(Debug, Clone)]
pub struct Upload {
    /// File name as sent by the client
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One chat submission
#[derive(Debug, Clone, Default)]
pub struct SendMessage {
    pub text: String,
    /// Session to continue; empty or absent starts a new one
    pub chat_id: Option<String>,
    pub file: Option<Upload>,
}

/// Reply to a chat submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
    pub chat_id: String,
}

/// Chat flow over an injected store and model provider
pub struct ChatService {
    store: Arc<dyn ChatStore>,
    provider: Arc<dyn LlmProvider>,
    uploads: UploadDir,
    generation: GenerationConfig,
}

impl ChatService {
    pub fn new(
        store: Arc<dyn ChatStore>,
        provider: Arc<dyn LlmProvider>,
        uploads: UploadDir,
    ) -> Self {
        Self {
            store,
            provider,
            uploads,
            generation: GenerationConfig::default(),
        }
    }

    /// Set the generation parameters sent with every request
    pub fn with_generation_config(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub async fn send(&self, input: SendMessage) -> Result<ChatReply, ChatError> {
        if input.text.is_empty() && input.file.is_none() {
            return Err(ChatError::InvalidInput);
        }

        let mut combined = input.text;
        let mut file_name = None;

        if let Some(upload) = input.file {
            let saved = self.uploads.save(&upload.filename, &upload.bytes).await?;

            let Some(kind) = DocumentKind::from_path(&saved.name) else {
                // The stored file is left in place
                warn!(file = %saved.name, "rejected upload with unsupported file type");
                return Err(ChatError::UnsupportedFileType {
                    extension: extension_of(&saved.name),
                    file: saved.name,
                });
            };

            let text = extract::extract_file(saved.path.clone(), kind).await?;
            combined.push_str(&format!("\n\nFile Content ({}): {}", saved.name, text));
            file_name = Some(saved.name);
        }

        let kind = prompt::classify(&combined);
        debug!(?kind, chars = combined.len(), "built prompt");

        let request = GenerateRequest::from_prompt(prompt::build_prompt(&combined))
            .with_config(self.generation.clone());
        let response = self.provider.generate(request).await?;

        if let Some(usage) = response.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "model usage"
            );
        }

        let chat_id = self.store.append_exchange(Exchange {
            chat_id: input.chat_id.filter(|id| !id.is_empty()),
            user_text: combined,
            reply_text: response.text.clone(),
            file_name,
        });
        info!(%chat_id, "recorded chat exchange");

        Ok(ChatReply {
            reply: response.text,
            chat_id,
        })
    }
}
