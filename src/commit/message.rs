//! Commit message generation within a prompt token budget.

use tracing::debug;

use crate::commit::analysis::{ChangeSummary, FileSummary};
use crate::commit::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::commit::tokens::TokenCounter;
use crate::error::GenerationError;
use crate::llm::{CompletionBackend, CompletionRequest};

const TEMPERATURE: f32 = 0.7;
const MAX_COMPLETION_TOKENS: u32 = 300;

/// Used when the model's reply cleans down to nothing.
pub const FALLBACK_MESSAGE: &str = "chore: update files";
const MAX_SUBJECT_CHARS: usize = 72;
const TRUNCATED_SUBJECT_CHARS: usize = 69;
const MAX_MESSAGE_LINES: usize = 4;

/// Turns a [`ChangeSummary`] into a commit message through a model backend.
pub struct CommitMessageGenerator<'a> {
    backend: &'a dyn CompletionBackend,
    tokens: &'a dyn TokenCounter,
    max_prompt_tokens: usize,
}

impl<'a> CommitMessageGenerator<'a> {
    pub fn new(
        backend: &'a dyn CompletionBackend,
        tokens: &'a dyn TokenCounter,
        max_prompt_tokens: usize,
    ) -> Self {
        Self {
            backend,
            tokens,
            max_prompt_tokens,
        }
    }

    /// Generate a cleaned commit message for `summary`.
    pub async fn generate(&self, summary: &ChangeSummary) -> Result<String, GenerationError> {
        let trimmed = trim_to_budget(summary, self.tokens, self.max_prompt_tokens);
        let prompt = build_prompt(&trimmed);

        let tokens = self.tokens.count(&prompt);
        if tokens > self.max_prompt_tokens {
            return Err(GenerationError::PromptTooLong {
                tokens,
                ceiling: self.max_prompt_tokens,
            });
        }

        debug!(
            "Prompt uses {} of {} tokens ({} files)",
            tokens,
            self.max_prompt_tokens,
            trimmed.total_files()
        );

        let completion = self
            .backend
            .complete(CompletionRequest {
                system: SYSTEM_PROMPT.to_string(),
                prompt,
                temperature: TEMPERATURE,
                max_tokens: MAX_COMPLETION_TOKENS,
            })
            .await
            .map_err(GenerationError::Failed)?;

        if completion.trim().is_empty() {
            return Err(GenerationError::EmptyCompletion);
        }

        Ok(clean_commit_message(&completion))
    }
}

/// Shrink `summary` until its prompt fits `max_tokens`.
///
/// A summary that already fits is returned unchanged. Otherwise files are
/// ranked by lines changed (ties keep input order) and the longest fitting
/// prefix of that ranking is kept, never fewer than one file. The result may
/// still exceed the budget when the single largest file does.
pub fn trim_to_budget(
    summary: &ChangeSummary,
    tokens: &dyn TokenCounter,
    max_tokens: usize,
) -> ChangeSummary {
    let fits = |s: &ChangeSummary| tokens.count(&build_prompt(s)) <= max_tokens;

    if fits(summary) {
        return summary.clone();
    }

    let mut ranked: Vec<FileSummary> = summary.files.clone();
    ranked.sort_by_key(|f| std::cmp::Reverse(f.lines_changed()));

    let mut best = 1;
    let (mut lo, mut hi) = (1, ranked.len());
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        if fits(&summary.with_files(ranked[..mid].to_vec())) {
            best = mid;
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }

    debug!(
        "Trimmed prompt from {} to {} files to fit {} tokens",
        ranked.len(),
        best,
        max_tokens
    );

    ranked.truncate(best);
    summary.with_files(ranked)
}

/// Normalize a raw completion into a commit message.
pub fn clean_commit_message(raw: &str) -> String {
    let mut lines: Vec<String> = raw.split('\n').map(clean_line).collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        return FALLBACK_MESSAGE.to_string();
    }

    if lines[0].chars().count() > MAX_SUBJECT_CHARS {
        let subject: String = lines[0].chars().take(TRUNCATED_SUBJECT_CHARS).collect();
        lines[0] = format!("{}...", subject);
    }

    lines.truncate(MAX_MESSAGE_LINES);
    lines.join("\n")
}

fn clean_line(line: &str) -> String {
    let line = line.trim_matches('`').trim();
    let unquoted = line
        .strip_prefix('"')
        .and_then(|l| l.strip_suffix('"'))
        .or_else(|| line.strip_prefix('\'').and_then(|l| l.strip_suffix('\'')));
    unquoted.unwrap_or(line).trim().to_string()
}
