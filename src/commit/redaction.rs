//! Secret detection and masking for diff text and generated messages.
//!
//! In diff text only addition lines (`+`, but not the `+++` file header) are
//! rewritten. Removed and context lines describe content that already exists
//! in history and pass through untouched.

use regex_lite::{Captures, Regex};

use crate::error::RedactionError;

/// Words that mark a line as likely to carry credentials.
const SECRET_KEYWORDS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "api_key",
    "apikey",
    "auth",
    "credential",
    "private",
    "priv",
    "access_key",
    "session",
    "cookie",
    "jwt",
    "bearer",
    "oauth",
];

/// High-confidence secret shapes. Group 1 is the span to mask.
const SECRET_PATTERNS: &[(&str, &str)] = &[
    ("base64", r#"(?i)["']([a-z0-9+/=]{40,})["']"#),
    ("hex", r#"(?i)["']([a-f0-9]{32,})["']"#),
    ("url-safe", r#"(?i)["']([a-z0-9_-]{50,})["']"#),
    ("openai", r#"(?i)["'](sk-[a-z0-9]{48})["']"#),
    ("github-pat", r#"(?i)["'](ghp_[a-z0-9]{36})["']"#),
    ("github-app", r#"(?i)["'](ghs_[a-z0-9]{36})["']"#),
    ("aws-access-key", r#"(?i)["'](AKIA[0-9A-Z]{16})["']"#),
    ("google-oauth", r#"(?i)["'](ya29\.[a-z0-9_-]{100,})["']"#),
];

/// Quoted strings long enough to be checked against the keyword list when masking.
const DOUBLE_QUOTED_LONG: &str = r#""([^"']{40,})""#;
const SINGLE_QUOTED_LONG: &str = r#"'([^"']{40,})'"#;

/// Quoted strings long enough to flag a keyword line as suspicious.
const QUOTED_SUSPICIOUS: &str = r#"["'][^"']{30,}["']"#;

/// Values at or below this length are left readable.
const MIN_MASK_LENGTH: usize = 8;

/// A compiled secret pattern whose capture group 1 is the secret body.
#[derive(Debug)]
pub struct SecretPattern {
    pub name: &'static str,
    regex: Regex,
}

impl SecretPattern {
    /// Compile `pattern`, requiring exactly one capture group.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, RedactionError> {
        let regex =
            Regex::new(pattern).map_err(|source| RedactionError::InvalidPattern { name, source })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != 1 {
            return Err(RedactionError::MissingCaptureGroup { name, groups });
        }

        Ok(Self { name, regex })
    }

    fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    fn mask_all(&self, line: &str) -> String {
        self.regex
            .replace_all(line, |caps: &Captures<'_>| {
                mask_group(caps, mask_value)
            })
            .into_owned()
    }
}

/// Rebuild the whole match with group 1 replaced by `replace(group 1)`.
fn mask_group(caps: &Captures<'_>, replace: impl Fn(&str) -> String) -> String {
    let whole = caps.get(0).map_or("", |m| m.as_str());
    match (caps.get(0), caps.get(1)) {
        (Some(all), Some(secret)) => {
            let start = secret.start() - all.start();
            let end = secret.end() - all.start();
            format!(
                "{}{}{}",
                &whole[..start],
                replace(secret.as_str()),
                &whole[end..]
            )
        }
        _ => whole.to_string(),
    }
}

/// Mask a secret value as `abcd...wxyz`, leaving short values unchanged.
pub fn mask_value(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= MIN_MASK_LENGTH {
        return value.to_string();
    }

    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

fn contains_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    SECRET_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Whether `line` is a diff addition (and not the `+++` file header).
pub fn is_added_line(line: &str) -> bool {
    line.starts_with('+') && !line.starts_with("+++")
}

/// Detects and masks probable secrets.
#[derive(Debug)]
pub struct SecretRedactor {
    patterns: Vec<SecretPattern>,
    quoted_long: [Regex; 2],
    quoted_suspicious: Regex,
}

impl SecretRedactor {
    /// Build a redactor from the built-in pattern table.
    pub fn new() -> Result<Self, RedactionError> {
        Self::with_patterns(SECRET_PATTERNS)
    }

    /// Build a redactor from a custom `(name, regex)` table.
    ///
    /// Fails if any pattern lacks exactly one capture group, so a bad table is
    /// caught at construction instead of on the first match.
    pub fn with_patterns(table: &[(&'static str, &str)]) -> Result<Self, RedactionError> {
        let patterns = table
            .iter()
            .map(|&(name, pattern)| SecretPattern::new(name, pattern))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            patterns,
            quoted_long: [
                compile_internal("double-quoted", DOUBLE_QUOTED_LONG)?,
                compile_internal("single-quoted", SINGLE_QUOTED_LONG)?,
            ],
            quoted_suspicious: compile_internal("quoted-suspicious", QUOTED_SUSPICIOUS)?,
        })
    }

    /// Whether `text` contains anything that looks like a secret.
    ///
    /// Any literal pattern match counts. An added line also counts when it
    /// contains a secret keyword next to a quoted string of 30+ characters.
    pub fn has_potential_secrets(&self, text: &str) -> bool {
        if self.patterns.iter().any(|p| p.is_match(text)) {
            return true;
        }

        text.lines().any(|line| {
            is_added_line(line) && contains_keyword(line) && self.quoted_suspicious.is_match(line)
        })
    }

    /// Mask secrets on added lines; every other line is returned verbatim.
    pub fn redact(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| {
                if is_added_line(line) {
                    self.redact_line(line)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mask secrets on every line of free text such as a commit message.
    pub fn redact_message(&self, text: &str) -> String {
        text.split('\n')
            .map(|line| self.redact_line(line))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mask every secret on a single line, regardless of its diff prefix.
    pub fn redact_line(&self, line: &str) -> String {
        let mut redacted = self
            .patterns
            .iter()
            .fold(line.to_string(), |acc, p| p.mask_all(&acc));

        for quoted in &self.quoted_long {
            redacted = quoted
                .replace_all(&redacted, |caps: &Captures<'_>| {
                    mask_group(caps, |content| {
                        if contains_keyword(content) {
                            mask_value(content)
                        } else {
                            content.to_string()
                        }
                    })
                })
                .into_owned();
        }

        redacted
    }
}

fn compile_internal(name: &'static str, pattern: &str) -> Result<Regex, RedactionError> {
    Regex::new(pattern).map_err(|source| RedactionError::InvalidPattern { name, source })
}
