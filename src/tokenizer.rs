//! Token counting for chunk size decisions
//!
//! The public `chunk()` entry point takes no tokenizer path or model
//! identifier, so this engine self-initializes a single BPE table process-wide
//! the first time a count is requested, rather than asking the caller to load
//! one up front the way `HuggingFaceTokenizer::from_file` did.

use once_cell::sync::OnceCell;
use tiktoken_rs::CoreBPE;

static BPE: OnceCell<CoreBPE> = OnceCell::new();

fn bpe() -> Result<&'static CoreBPE, String> {
    BPE.get_or_try_init(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()))
}

/// Estimate the token count of `text`.
///
/// Falls back to a byte-length/4 heuristic if the BPE table fails to
/// initialize (e.g. its bundled rank data can't be decoded), so a transient
/// init failure degrades chunk sizing rather than aborting the whole call.
/// A later call retries initialization, since `get_or_try_init` leaves the
/// cell unset on error.
pub fn count_tokens(text: &str) -> usize {
    match bpe() {
        Ok(bpe) => bpe.encode_ordinary(text).len(),
        Err(_) => text.len() / 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_zero_tokens() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn longer_text_has_more_tokens() {
        let short = count_tokens("hello");
        let long = count_tokens("hello ".repeat(50).trim());
        assert!(long > short);
    }

    #[test]
    fn repeated_calls_are_deterministic() {
        let text = "The quick brown fox jumps over the lazy dog.";
        assert_eq!(count_tokens(text), count_tokens(text));
    }
}
