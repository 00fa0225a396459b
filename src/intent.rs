//! Query-intent classification.
//!
//! Decides whether a free-text query looks like a song-title/artist lookup
//! ("Havana", "Taylor Swift") or a lyric fragment in natural language
//! ("i wanna be with you"). Two independent triggers, either of which is
//! sufficient to declare lyric intent:
//!
//! 1. **Length** — lyric fragments tend to be long phrases; titles are
//!    usually 1–3 words.
//! 2. **Stopword density** — natural language is dense in function words
//!    and filler ("the", "you", "oh", "baby"); titles and artist names
//!    rarely are.
//!
//! The classifier is total over all string inputs: empty and
//! punctuation-only queries classify as [`Intent::TitleArtist`]. It is
//! deterministic, side-effect free, and performs no I/O. The tokenization
//! here is a deliberately crude punctuation-strip + whitespace split, not
//! the backend's linguistic analyzer.

use crate::config::SearchConfig;

/// How a query should be interpreted when selecting a scoring profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Short, stopword-light query: a title or artist lookup.
    TitleArtist,
    /// Natural-language phrase, most likely a lyric fragment.
    Lyric,
    /// Caller override: weight the artist field heavily. Never produced by
    /// [`classify`]; only selected explicitly by the caller.
    ArtistBoost,
}

/// Function words and song-lyric filler. A query whose tokens are mostly
/// drawn from this set reads as natural language rather than a title.
const STOPWORDS: &[&str] = &[
    "the", "be", "you", "i", "to", "and", "we", "me", "a", "in", "on", "of", "my", "our", "your",
    "at", "is", "it", "that", "for", "with", "this", "are", "was", "im", "so", "oh", "baby",
    "yeah",
];

/// Classify a raw query string using the thresholds in `config`.
pub fn classify(query: &str, config: &SearchConfig) -> Intent {
    classify_with(query, config.lyric_token_threshold, config.stopword_ratio)
}

/// Classify with explicit thresholds.
///
/// `token_threshold` is the token count at or above which a query is
/// treated as a lyric phrase; `stopword_ratio` is the stopword fraction
/// above which a shorter query still is.
pub fn classify_with(query: &str, token_threshold: usize, stopword_ratio: f64) -> Intent {
    let tokens = tokenize(query);

    if tokens.is_empty() {
        return Intent::TitleArtist;
    }

    if tokens.len() >= token_threshold {
        return Intent::Lyric;
    }

    let stopword_count = tokens
        .iter()
        .filter(|t| STOPWORDS.contains(&t.as_str()))
        .count();
    if stopword_count as f64 / tokens.len() as f64 > stopword_ratio {
        return Intent::Lyric;
    }

    Intent::TitleArtist
}

/// Strip punctuation, lowercase, and split on whitespace.
fn tokenize(query: &str) -> Vec<String> {
    query
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}
