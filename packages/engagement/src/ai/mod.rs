//! Generative-text provider implementations.

pub mod openai;

pub use openai::OpenAI;
