//! Fragment location
//!
//!     The locator turns one fragment into a best-guess span of the original document. It runs
//!     an ordered list of strategies and the first one that produces a span wins. The order is
//!     a trust hierarchy: verbatim text is most reliable, an anchored phrase recovers
//!     formatting drift, and the last strategy is an approximation.
//!
//!     1. Exact: the first `anchor_chars` characters of the raw description, verbatim.
//!     2. Anchored: the directive keyword plus a few surrounding words, matched with flexible
//!        separators, then widened to the surrounding statement boundaries.
//!     3. Fallback, chosen by the caller:
//!        - Window: the first `anchor_chars` normalized characters in the normalized
//!          document, followed by a fixed window of `fallback_window_chars`.
//!        - FuzzyWords: the longest run of at least `min_fuzzy_run` equal words.
//!
//!     Every search runs over a bounded window or through the linear-time `regex` engine, so
//!     no fragment can make location blow up.

use crate::align::fragment::Fragment;
use crate::align::normalize::{normalize, Normalized};
use crate::align::position_map::{advance_chars, char_prefix, retreat_chars};
use crate::align::words::{longest_common_run, words, Word};
use once_cell::unsync::OnceCell;
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};

/// Compiled-size ceiling for anchored phrase patterns.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Tunable thresholds of the matching strategies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Characters of the description used as the search anchor
    pub anchor_chars: usize,
    /// How far the anchored strategy looks for statement boundaries, each way
    pub boundary_chars: usize,
    /// Span length produced by the normalized-window fallback
    pub fallback_window_chars: usize,
    /// Minimum run of equal words accepted by the fuzzy fallback
    pub min_fuzzy_run: usize,
    /// Fragments whose normalized description is shorter are skipped
    pub min_description_chars: usize,
    /// Words kept before the directive keyword in the anchored pattern
    pub words_before: usize,
    /// Words kept after the directive keyword in the anchored pattern
    pub words_after: usize,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            anchor_chars: 80,
            boundary_chars: 200,
            fallback_window_chars: 400,
            min_fuzzy_run: 3,
            min_description_chars: 10,
            words_before: 1,
            words_after: 3,
        }
    }
}

/// The strategy that produced a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Exact,
    Anchored,
    Window,
    FuzzyWords,
}

/// Last-resort strategy used when exact and anchored matching both miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fallback {
    /// Fixed window after a normalized anchor hit (flat documents)
    #[default]
    Window,
    /// Longest shared word run (structured documents)
    FuzzyWords,
}

/// A span found for one fragment, in original byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub start: usize,
    pub end: usize,
    pub strategy: Strategy,
}

/// Why a fragment was not searched for at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Header,
    NoDescription,
    TooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Located(Located),
    Unmatched,
    Skipped(SkipReason),
}

/// Locates fragments inside one document.
pub struct Locator<'a> {
    original: &'a str,
    normalized: &'a Normalized,
    config: &'a LocatorConfig,
    fallback: Fallback,
    document_words: OnceCell<Vec<Word>>,
}

impl<'a> Locator<'a> {
    /// `normalized` must be the normalization of `original`.
    pub fn new(original: &'a str, normalized: &'a Normalized, config: &'a LocatorConfig) -> Self {
        Self {
            original,
            normalized,
            config,
            fallback: Fallback::default(),
            document_words: OnceCell::new(),
        }
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn original(&self) -> &'a str {
        self.original
    }

    pub fn config(&self) -> &'a LocatorConfig {
        self.config
    }

    /// Run the strategies for `fragment` in order.
    pub fn locate(&self, fragment: &Fragment) -> Outcome {
        if fragment.is_header {
            return Outcome::Skipped(SkipReason::Header);
        }
        let description = fragment.text();
        if description.trim().is_empty() {
            return Outcome::Skipped(SkipReason::NoDescription);
        }
        let normalized_description = normalize(description, self.normalized.mode());
        let normalized_text = normalized_description.text();
        if normalized_text.chars().count() < self.config.min_description_chars {
            return Outcome::Skipped(SkipReason::TooShort);
        }

        let located = self
            .exact(description)
            .or_else(|| {
                fragment
                    .directive
                    .as_deref()
                    .and_then(|keyword| self.anchored(normalized_text, keyword))
            })
            .or_else(|| match self.fallback {
                Fallback::Window => self.window(normalized_text),
                Fallback::FuzzyWords => self.fuzzy_words(normalized_text),
            });

        match located {
            Some(located) => {
                tracing::debug!(
                    id = %fragment.id,
                    strategy = ?located.strategy,
                    start = located.start,
                    end = located.end,
                    "located fragment"
                );
                Outcome::Located(located)
            }
            None => {
                tracing::debug!(id = %fragment.id, "no strategy located fragment");
                Outcome::Unmatched
            }
        }
    }

    /// Strategy 1: verbatim anchor; the span covers the whole description length.
    pub fn exact(&self, description: &str) -> Option<Located> {
        let anchor = char_prefix(description, self.config.anchor_chars);
        if anchor.is_empty() {
            return None;
        }
        let start = self.original.find(anchor)?;
        let end = advance_chars(self.original, start, description.chars().count());
        located(start, end, Strategy::Exact)
    }

    /// Strategy 2: directive keyword with neighbouring words, widened to statement
    /// boundaries.
    pub fn anchored(&self, normalized_description: &str, keyword: &str) -> Option<Located> {
        let phrase = anchor_phrase(
            normalized_description,
            keyword,
            self.config.words_before,
            self.config.words_after,
        )?;

        let pattern = phrase
            .iter()
            .map(|word| regex::escape(word))
            .collect::<Vec<_>>()
            .join(r"[\s|]+");

        let regex = match RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
        {
            Ok(regex) => regex,
            Err(err) => {
                tracing::debug!(%err, "anchored pattern rejected");
                return None;
            }
        };

        let hit = regex.find(self.original)?;
        let start = expand_backward(self.original, hit.start(), self.config.boundary_chars);
        let end = expand_forward(self.original, hit.end(), self.config.boundary_chars);
        located(start, end, Strategy::Anchored)
    }

    /// Strategy 3 for flat documents: normalized anchor plus a fixed window.
    pub fn window(&self, normalized_description: &str) -> Option<Located> {
        let anchor = char_prefix(normalized_description, self.config.anchor_chars);
        if anchor.is_empty() {
            return None;
        }
        let hit = self.normalized.text().find(anchor)?;
        let start = self.normalized.map().to_original(hit);
        let end = advance_chars(self.original, start, self.config.fallback_window_chars);
        located(start, end, Strategy::Window)
    }

    /// Strategy 3 for structured documents: longest shared run of words.
    pub fn fuzzy_words(&self, normalized_description: &str) -> Option<Located> {
        let needle = words(normalized_description);
        let haystack = self
            .document_words
            .get_or_init(|| words(self.normalized.text()));

        let (first, run) = longest_common_run(&needle, haystack)?;
        if run < self.config.min_fuzzy_run {
            return None;
        }
        let normalized_range = haystack[first].range.start..haystack[first + run - 1].range.end;
        let range = self
            .normalized
            .map()
            .original_range(self.original, normalized_range);
        located(range.start, range.end, Strategy::FuzzyWords)
    }
}

fn located(start: usize, end: usize, strategy: Strategy) -> Option<Located> {
    (start < end).then_some(Located {
        start,
        end,
        strategy,
    })
}

/// Words of the description around the first occurrence of `keyword`.
fn anchor_phrase<'d>(
    description: &'d str,
    keyword: &str,
    before: usize,
    after: usize,
) -> Option<Vec<&'d str>> {
    let keyword: Vec<String> = keyword.split_whitespace().map(comparable).collect();
    if keyword.is_empty() {
        return None;
    }

    let description_words: Vec<&str> = description.split_whitespace().collect();
    let found = description_words.windows(keyword.len()).position(|window| {
        window
            .iter()
            .zip(&keyword)
            .all(|(word, key)| comparable(word) == *key)
    })?;

    let from = found.saturating_sub(before);
    let to = (found + keyword.len() + after).min(description_words.len());
    Some(description_words[from..to].to_vec())
}

fn comparable(word: &str) -> String {
    word.trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

fn is_backward_boundary(ch: char) -> bool {
    matches!(ch, '\n' | '*' | '_')
}

/// Start of the statement containing `from`: just after the nearest line break or emphasis
/// marker within `limit` characters, skipping leading whitespace. Without a boundary the
/// hit start is kept.
fn expand_backward(text: &str, from: usize, limit: usize) -> usize {
    let window_start = retreat_chars(text, from, limit);
    let boundary = text[window_start..from]
        .char_indices()
        .rev()
        .find(|&(_, ch)| is_backward_boundary(ch))
        .map(|(offset, ch)| window_start + offset + ch.len_utf8());

    let Some(mut start) = boundary else {
        return from;
    };
    while let Some(ch) = text[start..from].chars().next() {
        if !ch.is_whitespace() {
            break;
        }
        start += ch.len_utf8();
    }
    start
}

/// End of the statement containing `from`: the nearest line break (excluded) or sentence
/// end (included) within `limit` characters. Without a boundary the hit end is kept.
fn expand_forward(text: &str, from: usize, limit: usize) -> usize {
    let window_end = advance_chars(text, from, limit);
    for (offset, ch) in text[from..window_end].char_indices() {
        let at = from + offset;
        match ch {
            '\n' => return at,
            '.' | '!' | '?' => {
                let after = at + ch.len_utf8();
                let next = text[after..].chars().next();
                if next.map_or(true, char::is_whitespace) {
                    return after;
                }
            }
            _ => {}
        }
    }
    from
}
