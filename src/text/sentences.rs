//! Sentence segmentation

use std::collections::HashSet;

/// Capitalised words that usually start a sentence rather than continue a name.
const SENTENCE_OPENERS: &[&str] = &[
    "a", "after", "all", "also", "an", "and", "as", "at", "but", "for", "he", "her", "his",
    "how", "i", "if", "in", "it", "its", "my", "no", "not", "now", "on", "our", "she", "so",
    "that", "the", "then", "there", "these", "they", "this", "those", "we", "what", "when",
    "where", "which", "who", "why", "yes", "you", "your",
];

fn is_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing(c: char) -> bool {
    matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}')
}

/// Word immediately before byte offset `end`, without leading punctuation.
fn word_before(text: &str, end: usize) -> &str {
    let head = &text[..end];
    let start = head
        .rfind(|c: char| c.is_whitespace())
        .map(|i| i + head[i..].chars().next().map_or(1, char::len_utf8))
        .unwrap_or(0);
    head[start..].trim_start_matches(|c: char| !c.is_alphanumeric())
}

/// Word starting after byte offset `start`, without leading punctuation.
fn word_after(text: &str, start: usize) -> &str {
    text[start..]
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric())
}

/// An uppercase letter other than the pronoun `I`, followed by a capitalised
/// word that continues a name (`J. Jones`).
fn is_initial(word: &str, next: &str) -> bool {
    let mut chars = word.chars();
    if !matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase() && c != 'I') {
        return false;
    }
    let next_lower = next.to_lowercase();
    let next_word = next_lower.trim_end_matches(|c: char| !c.is_alphanumeric());
    next.chars().next().is_some_and(char::is_uppercase) && !SENTENCE_OPENERS.contains(&next_word)
}

/// A period after an abbreviation or an initial does not end a sentence.
fn is_abbreviation(word: &str, next: &str, abbreviations: &HashSet<String>) -> bool {
    abbreviations.contains(&word.to_lowercase()) || is_initial(word, next)
}

/// Split `text` into trimmed sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus any closing quotes) followed by
/// whitespace or the end of text. Fragments without alphanumerics are dropped.
pub fn split_sentences<'a>(text: &'a str, abbreviations: &HashSet<String>) -> Vec<&'a str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !is_terminal(c) {
            i += 1;
            continue;
        }

        let mut j = i;
        while j + 1 < chars.len() && (is_terminal(chars[j + 1].1) || is_closing(chars[j + 1].1)) {
            j += 1;
        }
        let end = chars.get(j + 1).map_or(text.len(), |&(p, _)| p);
        let at_boundary = chars.get(j + 1).is_none_or(|&(_, next)| next.is_whitespace());
        let single_period = c == '.' && j == i;

        let continues = single_period
            && is_abbreviation(word_before(text, pos), word_after(text, end), abbreviations);
        if at_boundary && !continues {
            sentences.push(&text[start..end]);
            start = end;
        }
        i = j + 1;
    }
    sentences.push(&text[start..]);

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .collect()
}
