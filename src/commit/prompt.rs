//! Prompt construction for AI-generated commit messages.

use std::fmt::Write;

use crate::commit::analysis::{ChangeSummary, FileChangeKind, FileSummary};

/// Significant files listed individually before the rest are summarized.
const MAX_LISTED_FILES: usize = 10;

/// Stands in for the diff once a summary has been trimmed to fit the budget.
pub const DIFF_OMITTED_NOTICE: &str = "(omitted: too large for the prompt budget)";

/// System instruction sent alongside every prompt.
pub const SYSTEM_PROMPT: &str = "You are a git commit message generator. Generate concise, \
clear commit messages following Conventional Commits specification. \
Return only the commit message, no explanations or markdown.";

/// Build the user prompt for `summary`.
///
/// Output depends only on the summary, so identical input always renders
/// byte-identical prompts.
pub fn build_prompt(summary: &ChangeSummary) -> String {
    let diff = summary
        .raw_diff_text
        .as_deref()
        .unwrap_or(DIFF_OMITTED_NOTICE);

    let mut prompt = format!(
        "Generate a conventional commit message for these changes:

Type: {change_type}
Files: {files} files changed
Stats: +{added}/-{removed} lines
Diff Patch: {diff}
Files changed:
",
        change_type = summary.change_type,
        files = summary.total_files(),
        added = summary.total_added,
        removed = summary.total_removed,
    );

    let significant = summary.significant_files();
    for file in significant.iter().take(MAX_LISTED_FILES) {
        let _ = writeln!(
            prompt,
            "- {}: +{}/-{}{}",
            file.path,
            file.added,
            file.removed,
            change_note(file)
        );
    }

    let minor = summary.total_files() - significant.len();
    if minor > 0 {
        let _ = writeln!(prompt, "- ... and {} other files with minor changes", minor);
    }

    prompt.push_str(
        "
Generate a conventional commit message:
- Format: <type>(<scope>): <subject>
- Body: explain what and why (2-3 lines max)
Return only the commit message.",
    );

    prompt
}

fn change_note(file: &FileSummary) -> String {
    match file.change_kind {
        FileChangeKind::Added => " (new)".to_string(),
        FileChangeKind::Deleted => " (deleted)".to_string(),
        FileChangeKind::Renamed => format!(
            " (renamed from {})",
            file.old_path.as_deref().unwrap_or("unknown")
        ),
        FileChangeKind::Modified => String::new(),
    }
}
