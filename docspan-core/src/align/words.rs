//! Word tokenization for the fuzzy word-run strategy

use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\s+")]
enum WordToken {
    #[regex(r"[^\s]+")]
    Word,
}

/// A word of normalized text with its comparison key and byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// Lowercased word with leading/trailing punctuation removed
    pub key: String,
    pub range: Range<usize>,
}

/// Split `text` into comparable words. Tokens made only of punctuation are dropped.
pub fn words(text: &str) -> Vec<Word> {
    let mut lexer = WordToken::lexer(text);
    let mut out = Vec::new();
    while let Some(token) = lexer.next() {
        if token.is_err() {
            continue;
        }
        let key = lexer
            .slice()
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        if key.is_empty() {
            continue;
        }
        out.push(Word {
            key,
            range: lexer.span(),
        });
    }
    out
}

/// Longest run of consecutive equal keys shared by `needle` and `haystack`.
///
/// Returns `(haystack_start, run_len)` in word indices. On equal lengths the earliest
/// haystack position wins.
pub fn longest_common_run(needle: &[Word], haystack: &[Word]) -> Option<(usize, usize)> {
    if needle.is_empty() || haystack.is_empty() {
        return None;
    }

    let mut previous = vec![0usize; needle.len() + 1];
    let mut current = vec![0usize; needle.len() + 1];
    let mut best: Option<(usize, usize)> = None;

    for (h, hay_word) in haystack.iter().enumerate() {
        for (n, needle_word) in needle.iter().enumerate() {
            current[n + 1] = if hay_word.key == needle_word.key {
                previous[n] + 1
            } else {
                0
            };
            let run = current[n + 1];
            if run > best.map_or(0, |(_, len)| len) {
                best = Some((h + 1 - run, run));
            }
        }
        std::mem::swap(&mut previous, &mut current);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(text: &str) -> Vec<String> {
        words(text).into_iter().map(|w| w.key).collect()
    }

    #[test]
    fn words_are_lowercased_and_trimmed() {
        assert_eq!(keys("The Vendor, shall (deliver)."), ["the", "vendor", "shall", "deliver"]);
    }

    #[test]
    fn punctuation_only_tokens_are_dropped() {
        assert_eq!(keys("a - b -- c"), ["a", "b", "c"]);
    }

    #[test]
    fn word_ranges_point_into_text() {
        let text = "alpha  beta";
        let found = words(text);
        assert_eq!(&text[found[1].range.clone()], "beta");
    }

    #[test]
    fn longest_run_prefers_longer_then_earlier() {
        let hay = words("x a b y a b c z");
        let needle = words("a b c");
        assert_eq!(longest_common_run(&needle, &hay), Some((4, 3)));

        let needle = words("a b");
        assert_eq!(longest_common_run(&needle, &hay), Some((1, 2)));
    }

    #[test]
    fn no_shared_words_yields_none() {
        assert_eq!(longest_common_run(&words("a b"), &words("c d")), None);
    }
}
