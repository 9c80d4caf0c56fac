//! Error types for edgecommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading configuration out of the environment.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: '{value}' ({reason})")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to load tokenizer for model '{model}': {reason}")]
    Tokenizer { model: String, reason: String },
}

/// Errors from the ignore-pattern file filter.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error(
        "{} file not found. Create it in the repository root with one glob pattern per line.",
        .0.display()
    )]
    IgnoreFileMissing(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Bare repositories are not supported")]
    BareRepository,

    #[error("Failed to collect staged diff: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("No staged changes to commit")]
    NoStagedChanges,

    #[error("Commit message cannot be empty")]
    EmptyMessage,

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },

    #[error("Failed to run git {operation}: {source}")]
    SpawnFailed {
        operation: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from turning staged stats into a change summary.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("No changes to analyze")]
    NoChanges,

    #[error("No non-binary files to analyze")]
    NoTextFiles,
}

/// Errors from building the secret redactor.
#[derive(Error, Debug)]
pub enum RedactionError {
    #[error("Secret pattern '{name}' failed to compile: {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex_lite::Error,
    },

    #[error(
        "Secret pattern '{name}' must have exactly one capture group around the secret, found {groups}"
    )]
    MissingCaptureGroup { name: &'static str, groups: usize },
}

/// Errors from the language-model backend.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("OpenAI API key not found. Set OPENAI_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Request to model backend failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("Model backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Model backend returned an unexpected response: {0}")]
    InvalidResponse(String),
}

/// Errors from commit message generation.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Model backend unavailable: {0}")]
    BackendUnavailable(#[source] LlmError),

    #[error("Prompt still too long: {tokens} tokens > {ceiling}")]
    PromptTooLong { tokens: usize, ceiling: usize },

    #[error("Failed to generate commit message: {0}")]
    Failed(#[source] LlmError),

    #[error("Failed to generate commit message: empty response from model backend")]
    EmptyCompletion,
}

/// Errors from the editor fallback.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Editor '{0}' not found. Set the EDITOR environment variable.")]
    NotFound(String),

    #[error("Failed to prepare commit message file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor '{editor}' exited with {}", code.map_or("a signal".to_string(), |c| format!("code {c}")))]
    EditorFailed { editor: String, code: Option<i32> },

    #[error("Empty commit message")]
    EmptyMessage,
}

/// Errors that end a pipeline run with a non-zero exit code.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Configuration error: {0}")]
    Filter(#[from] FilterError),

    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Nothing to analyze: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Secret redaction unavailable: {0}")]
    Redaction(#[from] RedactionError),

    #[error("Editor fallback failed: {0}")]
    Editor(#[from] EditorError),

    #[error("Confirmation prompt failed: {0}")]
    Prompt(#[source] std::io::Error),

    #[error("Interrupted by user")]
    Interrupted,
}

impl PipelineError {
    /// Whether the run should still end in a hand-written commit.
    ///
    /// Configuration, input and interrupt errors are for the user to fix and
    /// abort the run. Git and redaction failures are unexpected here and fall
    /// back to the editor.
    pub fn falls_back_to_editor(&self) -> bool {
        matches!(self, PipelineError::Git(_) | PipelineError::Redaction(_))
    }
}
