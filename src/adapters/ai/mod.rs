//! LLM field classifier adapters.
//!
//! Implementation of the `FieldClassifier` port backed by a chat model.
//!
//! ## Available Providers
//!
//! - OpenAI chat completions (`response_format: json_object`)
//! - Anthropic messages

mod llm_field_classifier;

pub use llm_field_classifier::{ClassifierProvider, LlmClassifierConfig, LlmFieldClassifier};
