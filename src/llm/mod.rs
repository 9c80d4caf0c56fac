//! Model backends for commit message completion.

pub mod backend;
pub mod openai;

pub use backend::{CompletionBackend, CompletionRequest};
pub use openai::OpenAiBackend;
