//! Ignore-pattern filtering of changed files and diff sections.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use glob::Pattern;
use regex_lite::Regex;
use tracing::debug;

use crate::config::Config;
use crate::error::FilterError;

const FILE_HEADER_PREFIX: &str = "diff --git";

/// Decides which changed paths are left out of analysis.
#[derive(Debug)]
pub struct FileFilter {
    patterns: Vec<Pattern>,
    header_re: Regex,
}

impl FileFilter {
    /// Load the ignore file named in `config` plus its extra patterns.
    ///
    /// The ignore file is mandatory: a missing file is an error, never an
    /// empty pattern list.
    pub fn load(config: &Config) -> Result<Self, FilterError> {
        let mut lines = read_ignore_file(&config.ignore_file)?;
        lines.extend(config.extra_ignore_patterns.iter().cloned());
        Self::from_patterns(&lines)
    }

    /// Build a filter from glob patterns directly.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, FilterError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|source| FilterError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Loaded {} ignore patterns", patterns.len());

        Ok(Self {
            patterns,
            header_re: Regex::new(r"^diff --git a/(.*) b/(.*)").expect("Invalid regex"),
        })
    }

    /// Whether `path` matches any ignore pattern.
    pub fn should_skip(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }

    /// Drop every diff section whose file is ignored.
    ///
    /// Each `diff --git` header resets the skip decision; lines before the
    /// first header are kept.
    pub fn filter_diff_text(&self, raw_diff: &str) -> String {
        if raw_diff.is_empty() {
            return String::new();
        }

        let mut skipping = false;
        let mut kept = Vec::new();

        for line in raw_diff.split('\n') {
            if line.starts_with(FILE_HEADER_PREFIX) {
                skipping = match self.header_re.captures(line).and_then(|c| c.get(2)) {
                    Some(new_path) => self.should_skip(new_path.as_str()),
                    None => false,
                };
                if skipping {
                    debug!("Skipping diff section: {}", line);
                }
            }

            if !skipping {
                kept.push(line);
            }
        }

        kept.join("\n")
    }
}

/// Cap each file section at `max_lines_per_file` lines, header included.
///
/// Lines past the cap are dropped until the next `diff --git` header. Text
/// before the first header is not capped.
pub fn clamp_file_hunk(diff_text: &str, max_lines_per_file: usize) -> String {
    let mut result = Vec::new();
    let mut in_file = false;
    let mut count = 0usize;

    for line in diff_text.split('\n') {
        let is_header = line.starts_with(FILE_HEADER_PREFIX);
        if is_header {
            in_file = true;
            count = 0;
        }

        if in_file && count >= max_lines_per_file && !is_header {
            continue;
        }

        result.push(line);
        if in_file {
            count += 1;
        }
    }

    result.join("\n")
}

/// Read glob lines from the ignore file, skipping blanks and `#` comments.
fn read_ignore_file(path: &Path) -> Result<Vec<String>, FilterError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => FilterError::IgnoreFileMissing(path.to_path_buf()),
        _ => FilterError::ReadFailed {
            path: path.to_path_buf(),
            source,
        },
    })?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect())
}
