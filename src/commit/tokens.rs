//! Model-token counting and truncation.
//!
//! Budgets are enforced in the target model's own tokens, so counting goes
//! through the same BPE encoding the backend uses.

use tiktoken_rs::CoreBPE;
use tracing::warn;

use crate::error::ConfigError;

/// Longest run of trailing tokens to give back when a cut lands inside a
/// multi-byte character.
const MAX_DECODE_BACKOFF: usize = 4;

/// Counts and slices text in model tokens.
pub trait TokenCounter: Send + Sync {
    /// Number of tokens in `text`.
    fn count(&self, text: &str) -> usize;

    /// Decode at most the first `n` tokens of `text`.
    fn head(&self, text: &str, n: usize) -> String;
}

/// BPE tokenizer matching an OpenAI model family.
pub struct TiktokenCounter {
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// Tokenizer for `model`, falling back to `cl100k_base` for unknown names.
    pub fn for_model(model: &str) -> Result<Self, ConfigError> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(e) => {
                warn!("No tokenizer for model '{}' ({}), using cl100k_base", model, e);
                tiktoken_rs::cl100k_base().map_err(|e| ConfigError::Tokenizer {
                    model: model.to_string(),
                    reason: e.to_string(),
                })?
            }
        };
        Ok(Self { bpe })
    }
}

impl TokenCounter for TiktokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    fn head(&self, text: &str, n: usize) -> String {
        let tokens = self.bpe.encode_ordinary(text);
        if tokens.len() <= n {
            return text.to_string();
        }

        let mut end = n;
        loop {
            match self.bpe.decode(tokens[..end].to_vec()) {
                Ok(decoded) => return decoded,
                Err(_) if end > 0 && n - end < MAX_DECODE_BACKOFF => end -= 1,
                Err(e) => {
                    warn!("Failed to decode truncated tokens: {}", e);
                    return String::new();
                }
            }
        }
    }
}

/// Cut `text` to `ceiling` tokens, appending a note with the dropped count.
pub fn truncate_to_token_ceiling(tokens: &dyn TokenCounter, text: &str, ceiling: usize) -> String {
    let total = tokens.count(text);
    if total <= ceiling {
        return text.to_string();
    }

    let mut truncated = tokens.head(text, ceiling);
    truncated.push_str(&format!(
        "\n# …truncated by edgecommit ({} tokens)\n",
        total - ceiling
    ));
    truncated
}

/// Whitespace-word counter for deterministic tests.
#[cfg(test)]
pub(crate) struct WordCounter;

#[cfg(test)]
impl TokenCounter for WordCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn head(&self, text: &str, n: usize) -> String {
        text.split_whitespace().take(n).collect::<Vec<_>>().join(" ")
    }
}
