//! Tokenizers for token-level accuracy.

use regex::Regex;
use std::sync::OnceLock;

/// Splits text into a token sequence. Tokens borrow from the input.
pub trait Tokenizer: Send + Sync {
    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str>;
}

/// Word runs (`\w+`) plus single non-space punctuation characters.
///
/// `x=foo(a,b)` tokenizes as `x = foo ( a , b )`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeTokenizer;

fn code_token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+|[^\w\s]").expect("static token pattern"))
}

impl Tokenizer for CodeTokenizer {
    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        code_token_pattern()
            .find_iter(text)
            .map(|m| m.as_str())
            .collect()
    }
}

/// Whitespace-separated chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize<'t>(&self, text: &'t str) -> Vec<&'t str> {
        text.split_whitespace().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_tokenizer_splits_punctuation() {
        let tokens = CodeTokenizer.tokenize("x=foo(a, b_2)");
        assert_eq!(tokens, vec!["x", "=", "foo", "(", "a", ",", "b_2", ")"]);
    }

    #[test]
    fn test_code_tokenizer_multichar_operators_are_split() {
        assert_eq!(CodeTokenizer.tokenize("a==b"), vec!["a", "=", "=", "b"]);
    }

    #[test]
    fn test_code_tokenizer_empty() {
        assert!(CodeTokenizer.tokenize("  \n\t").is_empty());
    }

    #[test]
    fn test_whitespace_tokenizer() {
        assert_eq!(
            WhitespaceTokenizer.tokenize(" if x:\n  return y "),
            vec!["if", "x:", "return", "y"]
        );
    }
}
