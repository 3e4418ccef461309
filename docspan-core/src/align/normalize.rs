//! Text normalization
//!
//!     Extraction pipelines and rendered documents disagree about formatting: table pipes,
//!     line wrapping, emphasis markers, heading markers and horizontal rules. Normalization
//!     removes that noise so both sides can be compared, and records a [`PositionMap`] so a
//!     hit in normalized text can be reported in original coordinates.
//!
//!     Plain mode
//!         Runs of whitespace and `|` collapse to one space; leading and trailing separators
//!         are dropped.
//!
//!     Structured mode (plain mode, plus)
//!         - `*` and `_` emphasis markers are removed entirely,
//!         - `#` to `######` followed by a gap before anything else on the line is removed
//!           along with that gap,
//!         - runs of three or more identical rule characters (`-`, `=`, `*`, `_`) collapse to
//!           one space.
//!
//!     Heading and rule runs are measured through the emphasis markers that would be removed
//!     from them (`-_--` is a rule, `#*# ` a heading), so the result is a fixed point: a second
//!     pass changes nothing. The whole transform is a single pass over the input.

use crate::align::position_map::PositionMap;

/// Which set of collapsing rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NormalizeMode {
    #[default]
    Plain,
    Structured,
}

/// Normalized text together with its offset map back into the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    text: String,
    map: PositionMap,
    mode: NormalizeMode,
}

impl Normalized {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn map(&self) -> &PositionMap {
        &self.map
    }

    pub fn mode(&self) -> NormalizeMode {
        self.mode
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

const MAX_HEADING_LEVEL: usize = 6;
const MIN_RULE_RUN: usize = 3;

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || ch == '|'
}

fn is_emphasis_marker(ch: char) -> bool {
    matches!(ch, '*' | '_')
}

fn is_rule_char(ch: char) -> bool {
    matches!(ch, '-' | '=' | '*' | '_')
}

/// Normalize `input` under `mode`.
pub fn normalize(input: &str, mode: NormalizeMode) -> Normalized {
    let structured = mode == NormalizeMode::Structured;
    let chars: Vec<(usize, char)> = input.char_indices().collect();

    let mut text = String::with_capacity(input.len());
    let mut map = PositionMap::with_capacity(input.len(), input.len());
    let mut gap_start: Option<usize> = None;
    let mut at_line_start = true;
    let mut emitted_end = 0;

    let mut i = 0;
    while i < chars.len() {
        let (pos, ch) = chars[i];

        if structured {
            if at_line_start && ch == '#' {
                let (hashes, end) = marker_stretch(&chars, i, '#');
                if hashes <= MAX_HEADING_LEVEL && opens_gap(&chars, end) {
                    gap_start.get_or_insert(pos);
                    i = end;
                    continue;
                }
            }

            if is_rule_char(ch) {
                let (run, end) = if is_emphasis_marker(ch) {
                    let run = run_length(&chars, i, ch);
                    (run, i + run)
                } else {
                    marker_stretch(&chars, i, ch)
                };
                if run >= MIN_RULE_RUN {
                    gap_start.get_or_insert(pos);
                    i = end;
                    continue;
                }
            }

            if is_emphasis_marker(ch) {
                i += 1;
                continue;
            }
        }

        if is_separator(ch) {
            gap_start.get_or_insert(pos);
            if ch == '\n' {
                at_line_start = true;
            }
            i += 1;
            continue;
        }

        if let Some(run_start) = gap_start.take() {
            if !text.is_empty() {
                text.push(' ');
                map.push_collapsed(run_start);
            }
        }

        text.push(ch);
        map.push_char(pos, ch.len_utf8());
        emitted_end = pos + ch.len_utf8();
        at_line_start = false;
        i += 1;
    }

    map.finish(emitted_end);
    Normalized { text, map, mode }
}

fn run_length(chars: &[(usize, char)], from: usize, ch: char) -> usize {
    chars[from..].iter().take_while(|&&(_, c)| c == ch).count()
}

/// Count `target` from `from`, looking through emphasis markers that would be removed anyway.
/// Returns the count and the index just past the stretch. Runs of three or more identical
/// markers are rules, so they end the stretch.
fn marker_stretch(chars: &[(usize, char)], from: usize, target: char) -> (usize, usize) {
    let mut count = 0;
    let mut j = from;
    while let Some(&(_, c)) = chars.get(j) {
        if c == target {
            count += 1;
            j += 1;
        } else if is_emphasis_marker(c) {
            let run = run_length(chars, j, c);
            if run >= MIN_RULE_RUN {
                break;
            }
            j += run;
        } else {
            break;
        }
    }
    (count, j)
}

/// Whether the character at `index` starts a run that normalizes to a gap.
fn opens_gap(chars: &[(usize, char)], index: usize) -> bool {
    match chars.get(index) {
        Some(&(_, c)) if is_separator(c) => true,
        // Only reachable right after a stretch, where a marker always begins a rule.
        Some(&(_, c)) if is_emphasis_marker(c) => true,
        Some(&(_, c)) if is_rule_char(c) => marker_stretch(chars, index, c).0 >= MIN_RULE_RUN,
        _ => false,
    }
}

/// Single-slot memo for the most recently normalized document.
///
/// The slot is keyed by the exact input text and mode. Looking up different text replaces
/// the slot; callers that know the document changed should still call
/// [`invalidate`](Self::invalidate) so the previous result is released immediately.
#[derive(Debug, Default)]
pub struct NormalizationCache {
    slot: Option<CacheSlot>,
    hits: usize,
    misses: usize,
}

#[derive(Debug)]
struct CacheSlot {
    source: String,
    normalized: Normalized,
}

impl CacheSlot {
    fn matches(&self, text: &str, mode: NormalizeMode) -> bool {
        self.normalized.mode == mode && self.source == text
    }
}

impl NormalizationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `text`, normalizing it first if the slot holds
    /// something else.
    pub fn get_or_normalize(&mut self, text: &str, mode: NormalizeMode) -> &Normalized {
        let reusable = self
            .slot
            .as_ref()
            .is_some_and(|slot| slot.matches(text, mode));

        if reusable {
            self.hits += 1;
        } else {
            self.misses += 1;
            self.slot = None;
        }

        &self
            .slot
            .get_or_insert_with(|| CacheSlot {
                source: text.to_string(),
                normalized: normalize(text, mode),
            })
            .normalized
    }

    /// Drop the cached document.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    pub fn is_cached(&self, text: &str, mode: NormalizeMode) -> bool {
        self.slot
            .as_ref()
            .is_some_and(|slot| slot.matches(text, mode))
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }
}
