//! examforge-providers — generative-text backend integrations.
//!
//! Implements the `TextCompletion` trait for OpenAI-compatible APIs, plus a
//! mock backend for testing the engine without network calls.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, ExamforgeConfig, ProviderConfig};
pub use error::ProviderError;
