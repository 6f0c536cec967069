use lazy_static::lazy_static;
use regex::Regex;

/// Tokens must be longer than this many characters to be scored.
pub const MIN_TOKEN_CHARS: usize = 3;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^\w\s]").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Lowercase, replace punctuation with spaces, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&stripped, " ").trim().to_string()
}

/// Split normalized `text` into qualifying tokens, in corpus order, repeats included.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|t| t.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}
