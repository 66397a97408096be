// HTTP server modules
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;

// Chat flow and its collaborators
pub mod config;
pub mod extract;
pub mod prompt;
pub mod service;
pub mod store;
pub mod uploads;

// LLM abstraction layer
pub mod llm;
