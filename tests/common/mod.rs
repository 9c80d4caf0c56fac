//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use edgecommit::commit::TokenCounter;
use edgecommit::config::Config;
use edgecommit::error::{EditorError, GitError, LlmError, PipelineError};
use edgecommit::git::{FileChangeStat, VersionControl};
use edgecommit::llm::{CompletionBackend, CompletionRequest};
use edgecommit::pipeline::Prompter;

/// Get the path to test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Get the path to a diff fixture.
pub fn diff_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("diffs").join(name)
}

/// The sample ignore file shipped with the fixtures.
pub fn ignore_fixture() -> PathBuf {
    fixtures_dir().join("commitpilotignore")
}

/// Read a fixture file as a string.
pub fn read_fixture(path: PathBuf) -> String {
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// Create a temporary directory for test output.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Config pointing at the fixture ignore file, with no API key.
pub fn test_config() -> Config {
    Config {
        ignore_file: ignore_fixture(),
        ..Config::default()
    }
}

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    ///
    /// Sets a local identity so `git commit` works without global config.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
            config
                .set_bool("commit.gpgsign", false)
                .expect("Failed to set commit.gpgsign");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write a file relative to the repository root, creating directories.
    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directories");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
    }

    /// Add a path to the index.
    pub fn stage(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Remove a path from the index.
    pub fn stage_removal(&self, name: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.remove_path(Path::new(name)).expect("Failed to remove file");
        index.write().expect("Failed to write index");
    }

    /// Write and stage a file in one step.
    pub fn write_staged(&self, name: &str, content: impl AsRef<[u8]>) {
        self.write(name, content);
        self.stage(name);
    }

    /// Commit whatever is in the index. Returns the commit OID.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points at.
    pub fn head_message(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        commit.message().map(|m| m.trim_end().to_string())
    }
}

/// Counts whitespace-separated words, so budgets in tests are predictable.
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn head(&self, text: &str, n: usize) -> String {
        text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
    }
}

/// In-memory staged state with a record of commits made.
#[derive(Default)]
pub struct FakeVcs {
    pub stats: Vec<FileChangeStat>,
    pub diff: String,
    pub commits: RefCell<Vec<String>>,
    pub diff_fails: bool,
    pub commit_fails: bool,
}

impl FakeVcs {
    pub fn new(stats: Vec<FileChangeStat>, diff: impl Into<String>) -> Self {
        Self {
            stats,
            diff: diff.into(),
            ..Self::default()
        }
    }

    /// Reading the staged diff fails like a broken `git diff`.
    pub fn with_failing_diff(mut self) -> Self {
        self.diff_fails = true;
        self
    }

    /// Every commit is rejected, as by a failing hook.
    pub fn with_failing_commit(mut self) -> Self {
        self.commit_fails = true;
        self
    }
}

fn command_failed(operation: &str) -> GitError {
    GitError::CommandFailed {
        operation: operation.to_string(),
        stderr: format!("fatal: {operation} failed"),
    }
}

impl VersionControl for FakeVcs {
    fn has_staged_changes(&self) -> Result<bool, GitError> {
        Ok(!self.stats.is_empty())
    }

    fn staged_numstat(&self) -> Result<Vec<FileChangeStat>, GitError> {
        Ok(self.stats.clone())
    }

    fn staged_diff(&self) -> Result<String, GitError> {
        if self.diff_fails {
            return Err(command_failed("diff"));
        }
        Ok(self.diff.clone())
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        if self.commit_fails {
            return Err(command_failed("commit"));
        }
        self.commits.borrow_mut().push(message.to_string());
        Ok(())
    }
}

/// Answers confirmations from a fixed value and records editor templates.
pub struct ScriptedPrompter {
    pub answer: Option<bool>,
    pub edited_message: Option<String>,
    pub templates: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    /// Confirms with `answer`; `None` simulates an aborted prompt.
    pub fn answering(answer: Option<bool>) -> Self {
        Self {
            answer,
            edited_message: None,
            templates: RefCell::new(Vec::new()),
        }
    }

    pub fn with_edit(mut self, message: &str) -> Self {
        self.edited_message = Some(message.to_string());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, _prompt: &str) -> Result<bool, PipelineError> {
        self.answer.ok_or(PipelineError::Interrupted)
    }

    fn edit(&self, template: &str) -> Result<String, EditorError> {
        self.templates.borrow_mut().push(template.to_string());
        self.edited_message.clone().ok_or(EditorError::EmptyMessage)
    }
}

/// Returns a canned reply and keeps every request it receives.
#[derive(Clone)]
pub struct RecordingBackend {
    pub reply: Result<String, u16>,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl RecordingBackend {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fails every request with an HTTP error status.
    pub fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.prompt.clone())
            .collect()
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(status) => Err(LlmError::Api {
                status: *status,
                body: "mock failure".to_string(),
            }),
        }
    }
}
