use once_cell::sync::Lazy;
use tiktoken_rs::CoreBPE;

/// Lazily-initialized `cl100k_base` encoder (spec.md §4.4 "token
/// accounting"). Initialization can fail if the bundled rank file is
/// unavailable; callers fall back to the length-based estimate in that
/// case rather than panicking.
static ENCODER: Lazy<Option<CoreBPE>> = Lazy::new(|| tiktoken_rs::cl100k_base().ok());

/// Count tokens in `text` using the `cl100k_base` BPE, falling back to
/// `ceil(length / 4)` when the encoder could not be initialized (spec.md
/// §4.4: "fall back to a length-based estimate").
pub fn count_tokens(text: &str) -> u64 {
    match ENCODER.as_ref() {
        Some(bpe) => bpe.encode_ordinary(text).len() as u64,
        None => estimate_tokens(text),
    }
}

/// `ceil(length / 4)` character-based fallback estimate.
pub fn estimate_tokens(text: &str) -> u64 {
    ((text.len() as u64) + 3) / 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn count_tokens_is_nonzero_for_nonempty_text() {
        assert!(count_tokens("hello world") > 0);
    }
}
