//! Readability formulas with a heuristic syllable counter

use serde::{Deserialize, Serialize};

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Approximate syllable count of one word: vowel groups, minus silent endings.
pub fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if letters.is_empty() {
        return usize::from(word.chars().any(|c| c.is_numeric()));
    }
    if letters.len() <= 3 {
        return 1;
    }

    let mut groups = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            groups += 1;
        }
        prev_vowel = vowel;
    }

    let n = letters.len();
    let last = letters[n - 1];
    let before = letters[n - 2];
    let consonant_before = |k: usize| n > k && !is_vowel(letters[n - k - 1]);

    if last == 'e' && before != 'l' && consonant_before(1) {
        // silent e: "make"
        groups -= 1;
    } else if last == 'e' && before == 'l' && !consonant_before(2) {
        // "-ale", "-ole" endings are silent too
        groups -= 1;
    } else if before == 'e' && last == 'd' && n > 3 && !matches!(letters[n - 3], 't' | 'd') && consonant_before(2) {
        // "liked" but not "tested"
        groups -= 1;
    } else if before == 'e' && last == 's' && n > 3 && !matches!(letters[n - 3], 's' | 'x' | 'z' | 'c' | 'g' | 'h') && consonant_before(2) {
        // "makes" but not "boxes"
        groups -= 1;
    }

    groups.max(1)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScores {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub gunning_fog: f64,
}

impl ReadabilityScores {
    /// Scores for `words` spread over `sentence_count` sentences; all 0 when either is empty.
    pub fn compute<S: AsRef<str>>(words: &[S], sentence_count: usize) -> Self {
        if words.is_empty() || sentence_count == 0 {
            return Self::default();
        }

        let n_words = words.len() as f64;
        let syllables: Vec<usize> = words.iter().map(|w| count_syllables(w.as_ref())).collect();
        let total_syllables = syllables.iter().sum::<usize>() as f64;
        let complex_words = syllables.iter().filter(|&&s| s >= 3).count() as f64;

        let asl = n_words / sentence_count as f64;
        let asw = total_syllables / n_words;

        Self {
            flesch_reading_ease: 206.835 - 1.015 * asl - 84.6 * asw,
            flesch_kincaid_grade: 0.39 * asl + 11.8 * asw - 15.59,
            gunning_fog: 0.4 * (asl + 100.0 * complex_words / n_words),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_syllables() {
        let cases = [
            ("cat", 1), ("the", 1), ("make", 1), ("table", 2), ("happy", 2),
            ("liked", 1), ("tested", 2), ("makes", 1), ("boxes", 2),
            ("interesting", 4), ("analysis", 4), ("positive", 3), ("42", 1), ("", 0),
        ];
        for (word, expected) in cases {
            assert_eq!(count_syllables(word), expected, "{}", word);
        }
    }

    #[test]
    fn test_empty_scores() {
        let none: [&str; 0] = [];
        assert_eq!(ReadabilityScores::compute(&none, 3), ReadabilityScores::default());
        assert_eq!(ReadabilityScores::compute(&["word"], 0), ReadabilityScores::default());
    }

    #[test]
    fn test_formula_constants() {
        // one sentence, two one-syllable words: ASL 2, ASW 1
        let scores = ReadabilityScores::compute(&["the", "cat"], 1);
        assert!((scores.flesch_reading_ease - (206.835 - 2.03 - 84.6)).abs() < 1e-9);
        assert!((scores.flesch_kincaid_grade - (0.78 + 11.8 - 15.59)).abs() < 1e-9);
        assert!((scores.gunning_fog - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_complex_words_raise_fog() {
        let simple = ReadabilityScores::compute(&["we", "ran", "home"], 1);
        let complex = ReadabilityScores::compute(&["we", "investigated", "everything"], 1);
        assert!(complex.gunning_fog > simple.gunning_fog);
        assert!(complex.flesch_reading_ease < simple.flesch_reading_ease);
    }
}
