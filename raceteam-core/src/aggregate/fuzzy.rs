//! Typo-tolerant event name search.
//!
//! Every word of the query must match some word of the name, either as a
//! prefix or within a small Levenshtein distance that grows with the
//! length of the query word.

fn words(s: &str) -> Vec<String> {
    s.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Edits tolerated for a query word of `len` characters.
fn max_edits(len: usize) -> usize {
    match len {
        0..=2 => 0,
        3..=5 => 1,
        _ => 2,
    }
}

fn word_matches(query: &str, candidate: &str) -> bool {
    if candidate.starts_with(query) {
        return true;
    }
    strsim::levenshtein(query, candidate) <= max_edits(query.chars().count())
}

/// Does `name` approximately match `query`? An empty query matches
/// everything.
pub fn matches(query: &str, name: &str) -> bool {
    let query_words = words(query);
    if query_words.is_empty() {
        return true;
    }
    let name_words = words(name);

    query_words
        .iter()
        .all(|q| name_words.iter().any(|n| word_matches(q, n)))
}
