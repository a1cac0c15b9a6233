//! Word tokenization

use unicode_segmentation::UnicodeSegmentation;

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

/// Stem kept for a contraction: `don't` -> `do`, `it's` -> `it`.
fn contraction_stem(stem: &str, suffix: &str) -> String {
    if suffix != "t" || !stem.ends_with('n') {
        return stem.to_string();
    }
    match stem {
        "can" => "can".to_string(),
        "won" => "will".to_string(),
        "shan" => "shall".to_string(),
        "ain" => "is".to_string(),
        _ => stem[..stem.len() - 1].to_string(),
    }
}

/// A word glued to the previous one by an apostrophe that UAX #29 does not
/// join, as in `90's`.
fn is_detached_suffix(text: &str, start: usize) -> bool {
    let mut before = text[..start].chars().rev();
    matches!(
        (before.next(), before.next()),
        (Some(a), Some(c)) if is_apostrophe(a) && c.is_alphanumeric()
    )
}

/// Lowercase word tokens from Unicode word boundaries.
///
/// Hyphens and other punctuation split words. For contractions only the stem
/// before the apostrophe is kept and the suffix is dropped.
pub fn tokenize_words(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut tokens = Vec::new();

    for (start, word) in lower.unicode_word_indices() {
        if is_detached_suffix(&lower, start) {
            continue;
        }
        for part in word.split(|c: char| !c.is_alphanumeric() && !is_apostrophe(c)) {
            let mut pieces = part.split(is_apostrophe);
            let stem = pieces.next().unwrap_or("");
            if stem.is_empty() {
                continue;
            }
            let kept = match pieces.next() {
                Some(suffix) => contraction_stem(stem, suffix),
                None => stem.to_string(),
            };
            if !kept.is_empty() {
                tokens.push(kept);
            }
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            tokenize_words("Hello, World! It costs 42 dollars."),
            vec!["hello", "world", "it", "costs", "42", "dollars"]
        );
    }

    #[test]
    fn test_hyphens_split() {
        assert_eq!(tokenize_words("well-known long-term"), vec!["well", "known", "long", "term"]);
    }

    #[test]
    fn test_contractions_keep_stem() {
        assert_eq!(tokenize_words("don't"), vec!["do"]);
        assert_eq!(tokenize_words("It's"), vec!["it"]);
        assert_eq!(tokenize_words("we'll they’re"), vec!["we", "they"]);
        assert_eq!(tokenize_words("can't won't"), vec!["can", "will"]);
        assert_eq!(tokenize_words("isn't"), vec!["is"]);
    }

    #[test]
    fn test_quotes_and_empty() {
        assert!(tokenize_words("").is_empty());
        assert!(tokenize_words("... !!! --").is_empty());
        assert_eq!(tokenize_words("'quoted' words'"), vec!["quoted", "words"]);
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(tokenize_words("Café naïve Zoë"), vec!["café", "naïve", "zoë"]);
        assert_eq!(tokenize_words("the 90's e.g. 3.5"), vec!["the", "90", "e", "g", "3", "5"]);
        assert_eq!(tokenize_words("rock 'n' roll"), vec!["rock", "n", "roll"]);
    }
}
