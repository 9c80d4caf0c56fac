//! Commit pipeline: staged changes in, confirmed commit out.
//!
//! Runs filtering, redaction, analysis and generation over the staged diff,
//! falls back to the editor when generation fails, then asks before
//! committing. Git and redaction failures anywhere in the run also end in
//! the editor, with a generic template.

use std::io;
use std::time::Instant;

use dialoguer::Confirm;
use tracing::debug;

use crate::commit::{
    ChangeSummary, CommitMessageGenerator, FileFilter, SecretRedactor, TokenCounter, analyze,
    clamp_file_hunk, truncate_to_token_ceiling,
};
use crate::config::Config;
use crate::editor::{FALLBACK_TEMPLATE, edit_in_editor, failure_template};
use crate::error::{EditorError, GenerationError, LlmError, PipelineError};
use crate::git::{FileChangeStat, VersionControl};
use crate::llm::CompletionBackend;

/// How a run ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Committed,
    DryRun,
    Cancelled,
    /// Every staged file matched an ignore pattern.
    NothingToCommit,
    NoStagedChanges,
}

impl Outcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Outcome::NoStagedChanges => 1,
            Outcome::Committed | Outcome::DryRun | Outcome::Cancelled | Outcome::NothingToCommit => 0,
        }
    }
}

/// User interaction points of the pipeline.
pub trait Prompter {
    /// Ask a yes/no question. An aborted prompt is [`PipelineError::Interrupted`].
    fn confirm(&self, prompt: &str) -> Result<bool, PipelineError>;

    /// Let the user write a message, starting from `template`.
    fn edit(&self, template: &str) -> Result<String, EditorError>;
}

/// Interactive terminal prompts and `$EDITOR`.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool, PipelineError> {
        Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(confirmation_error)
    }

    fn edit(&self, template: &str) -> Result<String, EditorError> {
        edit_in_editor(template)
    }
}

/// Everything the pipeline talks to outside its own logic.
pub struct Collaborators<'a> {
    pub vcs: &'a dyn VersionControl,
    pub tokens: &'a dyn TokenCounter,
    pub prompter: &'a dyn Prompter,
    /// Builds the completion backend once a summary is ready.
    pub connect: &'a dyn Fn(&Config) -> Result<Box<dyn CompletionBackend>, LlmError>,
}

/// Ctrl-C at the prompt is an interrupt; any other terminal failure is not.
fn confirmation_error(err: dialoguer::Error) -> PipelineError {
    let dialoguer::Error::IO(err) = err;
    if err.kind() == io::ErrorKind::Interrupted {
        PipelineError::Interrupted
    } else {
        PipelineError::Prompt(err)
    }
}

/// Run the pipeline once over the currently staged changes.
pub async fn run(
    config: &Config,
    deps: &Collaborators<'_>,
    dry_run: bool,
) -> Result<Outcome, PipelineError> {
    match run_staged(config, deps, dry_run).await {
        Err(e) if e.falls_back_to_editor() => recover(deps, &e, dry_run),
        result => result,
    }
}

/// Let the user write the message by hand after an unexpected failure.
///
/// Errors from here are returned as they are, so a failing fallback exits
/// non-zero instead of retrying.
fn recover(
    deps: &Collaborators<'_>,
    error: &PipelineError,
    dry_run: bool,
) -> Result<Outcome, PipelineError> {
    eprintln!("✗ {}", error);
    eprintln!("→ Falling back to editor...");

    let message = deps.prompter.edit(FALLBACK_TEMPLATE)?;

    if dry_run {
        println!("\n{}\n", message);
        println!("ℹ Dry run mode - no commit created");
        return Ok(Outcome::DryRun);
    }

    deps.vcs.commit(&message)?;
    println!("✓ Commit created via editor!");
    Ok(Outcome::Committed)
}

async fn run_staged(
    config: &Config,
    deps: &Collaborators<'_>,
    dry_run: bool,
) -> Result<Outcome, PipelineError> {
    let start = Instant::now();
    debug!("Telemetry enabled: {}", config.telemetry_enabled);

    if !deps.vcs.has_staged_changes()? {
        eprintln!("✗ No staged changes found. Run 'git add' first.");
        return Ok(Outcome::NoStagedChanges);
    }

    let stats = deps.vcs.staged_numstat()?;
    if stats.is_empty() {
        eprintln!("✗ No changes found in staged files.");
        return Ok(Outcome::NoStagedChanges);
    }

    let filter = FileFilter::load(config)?;
    let kept: Vec<FileChangeStat> = stats
        .into_iter()
        .filter(|s| !filter.should_skip(&s.path))
        .collect();

    if kept.is_empty() {
        eprintln!("⚠ All changed files are ignored. Nothing to commit.");
        return Ok(Outcome::NothingToCommit);
    }

    let redactor = SecretRedactor::new()?;
    let diff = prepare_diff(config, deps.tokens, &filter, &redactor, &deps.vcs.staged_diff()?);
    let summary = analyze(&kept, diff)?;

    debug!(
        "Analyzed {} files as {} (+{}/-{})",
        summary.total_files(),
        summary.change_type,
        summary.total_added,
        summary.total_removed
    );

    let message = match generate(config, deps, &summary).await {
        Ok(message) if redactor.has_potential_secrets(&message) => {
            debug!("Generated message contains probable secrets, redacting");
            redactor.redact_message(&message)
        }
        Ok(message) => message,
        Err(e) => {
            eprintln!("⚠ AI generation failed: {}", e);
            eprintln!("→ Falling back to editor...");
            deps.prompter.edit(&failure_template(&e.to_string(), &summary))?
        }
    };

    println!(
        "\nGenerated commit message: ({:.2}s)",
        start.elapsed().as_secs_f64()
    );
    println!("{}\n", message);

    if summary.total_files() > 1 {
        println!(
            "Files: {} changed (+{}/-{})",
            summary.total_files(),
            summary.total_added,
            summary.total_removed
        );
    }

    if dry_run {
        println!("ℹ Dry run mode - no commit created");
        return Ok(Outcome::DryRun);
    }

    if !deps.prompter.confirm("Create commit with this message?")? {
        println!("ℹ Commit cancelled");
        return Ok(Outcome::Cancelled);
    }

    deps.vcs.commit(&message)?;
    println!("✓ Commit created successfully!");
    Ok(Outcome::Committed)
}

/// Filter, clamp, redact and truncate the raw staged diff for prompting.
fn prepare_diff(
    config: &Config,
    tokens: &dyn TokenCounter,
    filter: &FileFilter,
    redactor: &SecretRedactor,
    raw_diff: &str,
) -> String {
    let filtered = filter.filter_diff_text(raw_diff);
    let clamped = clamp_file_hunk(&filtered, config.max_lines_per_file);
    let redacted = redactor.redact(&clamped);
    truncate_to_token_ceiling(tokens, &redacted, config.max_diff_tokens)
}

async fn generate(
    config: &Config,
    deps: &Collaborators<'_>,
    summary: &ChangeSummary,
) -> Result<String, GenerationError> {
    let backend = (deps.connect)(config).map_err(GenerationError::BackendUnavailable)?;
    CommitMessageGenerator::new(backend.as_ref(), deps.tokens, config.max_prompt_tokens)
        .generate(summary)
        .await
}
