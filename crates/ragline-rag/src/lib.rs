//! Retrieval-augmented question answering over the three gateways.

mod engine;
pub mod prompt;

pub use engine::{Answer, RagEngine};
pub use prompt::FALLBACK_ANSWER;
