//! Change analysis: classify staged files and the overall change type.

use std::fmt;

use crate::error::AnalysisError;
use crate::git::FileChangeStat;

/// Files with more changed lines than this get per-file detail in the prompt.
pub const SIGNIFICANT_LINES_THRESHOLD: usize = 5;

/// Conventional commit type inferred for a changeset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Feat,
    Fix,
    Refactor,
    Style,
    Docs,
    Test,
    Chore,
    Perf,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Feat => "feat",
            ChangeType::Fix => "fix",
            ChangeType::Refactor => "refactor",
            ChangeType::Style => "style",
            ChangeType::Docs => "docs",
            ChangeType::Test => "test",
            ChangeType::Chore => "chore",
            ChangeType::Perf => "perf",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileChangeKind {
    Added,
    Deleted,
    Modified,
    Renamed,
}

/// A staged text file classified for prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub path: String,
    pub added: usize,
    pub removed: usize,
    pub change_kind: FileChangeKind,
    pub old_path: Option<String>,
}

impl FileSummary {
    pub fn from_stat(stat: &FileChangeStat) -> Self {
        let change_kind = match (stat.added, stat.removed) {
            (0, 0) if stat.is_renamed => FileChangeKind::Renamed,
            (0, 0) => FileChangeKind::Modified,
            (_, 0) => FileChangeKind::Added,
            (0, _) => FileChangeKind::Deleted,
            _ => FileChangeKind::Modified,
        };

        Self {
            path: stat.path.clone(),
            added: stat.added,
            removed: stat.removed,
            change_kind,
            old_path: stat.old_path.clone(),
        }
    }

    pub fn lines_changed(&self) -> usize {
        self.added + self.removed
    }

    pub fn is_significant(&self) -> bool {
        self.lines_changed() > SIGNIFICANT_LINES_THRESHOLD
    }
}

/// Aggregate view of the staged changes handed to prompting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    pub files: Vec<FileSummary>,
    pub total_added: usize,
    pub total_removed: usize,
    pub change_type: ChangeType,
    /// Diff text; `None` on copies trimmed down to a file list.
    pub raw_diff_text: Option<String>,
}

impl ChangeSummary {
    /// A copy holding only `files`, with totals recomputed and no diff text.
    pub fn with_files(&self, files: Vec<FileSummary>) -> Self {
        Self {
            total_added: files.iter().map(|f| f.added).sum(),
            total_removed: files.iter().map(|f| f.removed).sum(),
            files,
            change_type: self.change_type,
            raw_diff_text: None,
        }
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }

    pub fn significant_files(&self) -> Vec<&FileSummary> {
        self.files.iter().filter(|f| f.is_significant()).collect()
    }
}

/// One entry of the ordered classification table.
#[derive(Clone, Copy)]
pub struct ClassificationRule {
    pub change_type: ChangeType,
    /// Tested against each lower-cased path; any hit selects `change_type`.
    pub matches: fn(&str) -> bool,
}

/// Path heuristics, evaluated top to bottom; the first rule with a hit wins.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        change_type: ChangeType::Test,
        matches: |p| p.contains("test"),
    },
    ClassificationRule {
        change_type: ChangeType::Docs,
        matches: |p| p.contains("docs") || p.contains("readme") || p.ends_with(".md"),
    },
    ClassificationRule {
        change_type: ChangeType::Style,
        matches: |p| p.contains(".css") || p.contains(".scss") || p.contains("style"),
    },
    ClassificationRule {
        change_type: ChangeType::Perf,
        matches: |p| p.contains("perf") || p.contains("optim"),
    },
    ClassificationRule {
        change_type: ChangeType::Fix,
        matches: |p| p.contains("fix") || p.contains("bug"),
    },
    ClassificationRule {
        change_type: ChangeType::Feat,
        matches: |p| p.contains("feat") || p.contains("feature"),
    },
];

/// Classify with the built-in rule table.
pub fn classify(files: &[FileSummary]) -> ChangeType {
    classify_with(CLASSIFICATION_RULES, files)
}

/// Classify with a custom rule table, falling back to change size.
pub fn classify_with(rules: &[ClassificationRule], files: &[FileSummary]) -> ChangeType {
    let paths: Vec<String> = files.iter().map(|f| f.path.to_lowercase()).collect();

    if let Some(rule) = rules
        .iter()
        .find(|rule| paths.iter().any(|p| (rule.matches)(p)))
    {
        return rule.change_type;
    }

    let total: usize = files.iter().map(FileSummary::lines_changed).sum();
    match total {
        0..10 => ChangeType::Chore,
        10..50 => ChangeType::Refactor,
        _ => ChangeType::Feat,
    }
}

/// Build a [`ChangeSummary`] from staged stats and the prepared diff text.
///
/// Binary stats are dropped. Fails when there are no stats at all, or when
/// nothing but binaries remains.
pub fn analyze(stats: &[FileChangeStat], diff_text: String) -> Result<ChangeSummary, AnalysisError> {
    if stats.is_empty() {
        return Err(AnalysisError::NoChanges);
    }

    let files: Vec<FileSummary> = stats
        .iter()
        .filter(|s| !s.is_binary)
        .map(FileSummary::from_stat)
        .collect();

    if files.is_empty() {
        return Err(AnalysisError::NoTextFiles);
    }

    Ok(ChangeSummary {
        total_added: files.iter().map(|f| f.added).sum(),
        total_removed: files.iter().map(|f| f.removed).sum(),
        change_type: classify(&files),
        files,
        raw_diff_text: Some(diff_text),
    })
}
