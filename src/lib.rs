//! edgecommit - generate conventional commit messages from staged changes.
//!
//! # Overview
//!
//! edgecommit reads the staged diff, drops ignored files, masks probable
//! secrets, classifies the change and asks an OpenAI-compatible model for a
//! commit message that fits a token budget. When generation fails the user
//! writes the message in their editor instead.

pub mod commit;
pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use commit::{ChangeSummary, ChangeType, FileSummary};
pub use config::Config;
pub use error::{
    AnalysisError, ConfigError, EditorError, FilterError, GenerationError, GitError, LlmError,
    PipelineError, RedactionError,
};
pub use git::{FileChangeStat, GitRepository, VersionControl};
pub use pipeline::{Collaborators, Outcome, Prompter, TerminalPrompter};
