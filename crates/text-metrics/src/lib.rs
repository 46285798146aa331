
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Tokens longer than this many characters count as a grammar mistake.
pub const LONG_TOKEN_CHARS: usize = 20;
/// Points taken off the grammar score per mistake.
pub const MISTAKE_PENALTY: u32 = 5;
/// Grammar score of a text with no overlong tokens.
pub const GRAMMAR_MAX: u32 = 100;

const READABILITY_BASE: f64 = 206.835;
const READABILITY_PER_WORD: f64 = 1.015;

/// The four scores produced for one (reference, candidate) pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Share of the reference's unique tokens found in the candidate, 0..=1
    pub similarity: f64,
    /// 0..=100
    pub grammar_score: u32,
    pub word_count: usize,
    /// Unbounded, goes negative past ~203 words
    pub readability: f64,
}

/// Split on runs of ` \t \n \x0B \x0C \r` only. Other Unicode spaces
/// (NBSP, EM SPACE, ...) stay inside the token. Never yields "".
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r'))
        .filter(|t| !t.is_empty())
}

/// Unique lowercase tokens, split on whitespace runs.
/// Blank text gives an empty set (never a lone "" token).
pub fn tokenize(text: &str) -> HashSet<String> {
    words(text).map(str::to_lowercase).collect()
}

/// Fraction of `reference` tokens that also occur in `candidate`.
///
/// The denominator is always the reference's token count, so swapping the
/// arguments generally changes the answer. An empty reference scores 0.
pub fn similarity(reference: &str, candidate: &str) -> f64 {
    let ref_words = tokenize(reference);
    if ref_words.is_empty() {
        return 0.0;
    }
    let cand_words = tokenize(candidate);
    let common = ref_words.intersection(&cand_words).count();
    common as f64 / ref_words.len() as f64
}

/// Raw tokens (case and duplicates kept) longer than [`LONG_TOKEN_CHARS`].
pub fn overlong_tokens(text: &str) -> Vec<&str> {
    words(text)
        .filter(|w| w.chars().count() > LONG_TOKEN_CHARS)
        .collect()
}

/// Length-threshold stand-in for a grammar check: 100 minus 5 per overlong token, floored at 0.
pub fn grammar_score(text: &str) -> u32 {
    let mistakes = overlong_tokens(text).len();
    let penalty = u32::try_from(mistakes)
        .unwrap_or(u32::MAX)
        .saturating_mul(MISTAKE_PENALTY);
    GRAMMAR_MAX.saturating_sub(penalty)
}

pub fn word_count(text: &str) -> usize {
    words(text).count()
}

/// `206.835 - 1.015 * words`, or 0 when there are no words.
/// Not a real Flesch score: there is no sentence or syllable term.
pub fn readability_for_words(words: usize) -> f64 {
    if words == 0 {
        return 0.0;
    }
    READABILITY_BASE - READABILITY_PER_WORD * words as f64
}

pub fn readability(text: &str) -> f64 {
    readability_for_words(word_count(text))
}

/// Score `candidate` against `reference`.
/// Only similarity looks at the reference; the other three describe the candidate.
pub fn analyze(reference: &str, candidate: &str) -> AnalysisResult {
    let words = word_count(candidate);
    let result = AnalysisResult {
        similarity: similarity(reference, candidate),
        grammar_score: grammar_score(candidate),
        word_count: words,
        readability: readability_for_words(words),
    };
    tracing::debug!(
        reference_len = reference.len(),
        candidate_len = candidate.len(),
        similarity = result.similarity,
        grammar = result.grammar_score,
        words,
        "analyzed text pair"
    );
    result
}
