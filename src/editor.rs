//! Manual commit message entry through the user's editor.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::process::Command;

use tracing::debug;

use crate::commit::ChangeSummary;
use crate::error::EditorError;

const DEFAULT_EDITOR: &str = "nano";
const MAX_TEMPLATE_FILES: usize = 5;

/// Template for failures that happen before a change summary exists.
pub const FALLBACK_TEMPLATE: &str = "# Auto-commit fallback - please edit this commit message
#
# Staged changes detected but could not generate AI commit message.
# Please write a conventional commit message:
#
# Format: <type>(<scope>): <subject>
#
# Types: feat, fix, docs, style, refactor, perf, test, chore
#
# Example:
# feat(auth): add user login validation
#
# Body can be added below (optional):

";

/// Comment-only template describing why generation failed and what changed.
pub fn failure_template(error: &str, summary: &ChangeSummary) -> String {
    let mut template = format!(
        "# Auto-commit fallback - AI generation failed
#
# Error: {error}
#
# Analyzed changes:
# Type: {change_type}
# Files: {files} files changed
# Stats: +{added}/-{removed} lines
#
# Files changed:
",
        error = error.replace('\n', " "),
        change_type = summary.change_type,
        files = summary.total_files(),
        added = summary.total_added,
        removed = summary.total_removed,
    );

    for file in summary.significant_files().iter().take(MAX_TEMPLATE_FILES) {
        let _ = writeln!(template, "# - {}: +{}/-{}", file.path, file.added, file.removed);
    }

    template.push_str(
        "#
# Please write a conventional commit message:
# Format: <type>(<scope>): <subject>
#
# Types: feat, fix, docs, style, refactor, perf, test, chore

",
    );

    template
}

/// Drop `#` comment lines and surrounding blank lines.
pub fn strip_comment_lines(content: &str) -> Result<String, EditorError> {
    let message = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    let message = message.trim();
    if message.is_empty() {
        return Err(EditorError::EmptyMessage);
    }
    Ok(message.to_string())
}

/// Open `template` in `$EDITOR` (default `nano`) and return the edited message.
pub fn edit_in_editor(template: &str) -> Result<String, EditorError> {
    let editor = env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());
    edit_with(&editor, template)
}

/// Open `template` with an explicit editor command line.
///
/// The command is split on whitespace so values like `code --wait` work.
pub fn edit_with(editor: &str, template: &str) -> Result<String, EditorError> {
    let mut parts = editor.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| EditorError::NotFound(editor.to_string()))?;

    if which::which(program).is_err() {
        return Err(EditorError::NotFound(program.to_string()));
    }

    let mut file = tempfile::Builder::new()
        .prefix("edgecommit-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(template.as_bytes())?;
    file.flush()?;

    debug!("Opening {} with {}", file.path().display(), editor);

    let status = Command::new(program).args(parts).arg(file.path()).status()?;
    if !status.success() {
        return Err(EditorError::EditorFailed {
            editor: editor.to_string(),
            code: status.code(),
        });
    }

    let content = fs::read_to_string(file.path())?;
    strip_comment_lines(&content)
}
