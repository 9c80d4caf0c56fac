//! Staged-change analysis and AI commit message generation.

pub mod analysis;
pub mod filter;
pub mod message;
pub mod prompt;
pub mod redaction;
pub mod tokens;

pub use analysis::{
    CLASSIFICATION_RULES, ChangeSummary, ChangeType, ClassificationRule, FileChangeKind,
    FileSummary, analyze, classify, classify_with,
};
pub use filter::{FileFilter, clamp_file_hunk};
pub use message::{CommitMessageGenerator, clean_commit_message, trim_to_budget};
pub use prompt::build_prompt;
pub use redaction::SecretRedactor;
pub use tokens::{TiktokenCounter, TokenCounter, truncate_to_token_ceiling};
