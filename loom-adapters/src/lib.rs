//! Provider model adapters used by the textloom runtime.
//!
//! Each module exposes one provider implementation behind the shared
//! [`traits::ModelAdapter`] contract: `generate(prompt) -> text` and
//! `chat(messages) -> text`.

#![warn(missing_docs, clippy::pedantic)]

pub mod gemini;
pub mod openai;
pub mod replicate;
pub mod traits;

mod http_client;
