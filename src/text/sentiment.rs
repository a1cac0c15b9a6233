//! Lexicon and rule based sentiment scoring (VADER style)

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use super::resources::LanguageResources;

/// Emphasis added for an ALL-CAPS sentiment word among mixed-case text.
pub const C_INCR: f64 = 0.733;
/// Valence scaling applied by a preceding negation.
pub const N_SCALAR: f64 = -0.74;
const ALPHA: f64 = 15.0;
const EXCLAMATION_WEIGHT: f64 = 0.292;
const QUESTION_WEIGHT: f64 = 0.18;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    pub neg: f64,
    pub neu: f64,
    pub pos: f64,
    pub compound: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Map an unbounded valence sum into [-1, 1].
pub fn normalize(score: f64) -> f64 {
    (score / (score * score + ALPHA).sqrt()).clamp(-1.0, 1.0)
}

fn is_all_caps(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word.chars().filter(|c| c.is_alphabetic()).all(char::is_uppercase)
}

/// Whitespace tokens with edge punctuation stripped; tokens of one character are dropped.
fn sentiment_tokens(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| {
            let stripped = raw.trim_matches(|c: char| c.is_ascii_punctuation());
            if stripped.chars().count() <= 2 { raw } else { stripped }
        })
        .filter(|t| t.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

fn punctuation_emphasis(text: &str) -> f64 {
    let exclamations = text.matches('!').count().min(4) as f64 * EXCLAMATION_WEIGHT;
    let questions = match text.matches('?').count() {
        0 | 1 => 0.0,
        n if n <= 3 => n as f64 * QUESTION_WEIGHT,
        _ => 0.96,
    };
    exclamations + questions
}

/// Tokens of one text with the casing context needed by the rules.
struct SentiText {
    words: Vec<String>,
    lower: Vec<String>,
    cap_differential: bool,
}

impl SentiText {
    fn new(text: &str) -> Self {
        let words = sentiment_tokens(text);
        let lower = words.iter().map(|w| w.to_lowercase()).collect();
        let caps = words.iter().filter(|w| is_all_caps(w)).count();
        Self {
            cap_differential: caps > 0 && caps < words.len(),
            words,
            lower,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    resources: Arc<LanguageResources>,
}

impl SentimentAnalyzer {
    pub fn new(resources: Arc<LanguageResources>) -> Self {
        Self { resources }
    }

    /// Polarity scores for `text`; all zero when nothing is scored.
    pub fn polarity_scores(&self, text: &str) -> SentimentScores {
        let senti = SentiText::new(text);
        let mut sentiments = Vec::with_capacity(senti.words.len());

        for i in 0..senti.words.len() {
            let lower = &senti.lower[i];
            let kind_of = lower == "kind" && senti.lower.get(i + 1).is_some_and(|w| w == "of");
            if self.resources.booster(lower).is_some() || kind_of {
                sentiments.push(0.0);
                continue;
            }
            sentiments.push(self.valence_at(&senti, i));
        }

        but_shift(&senti.lower, &mut sentiments);
        score_valence(&sentiments, text)
    }

    fn valence_at(&self, senti: &SentiText, i: usize) -> f64 {
        let Some(mut valence) = self.resources.valence(&senti.lower[i]) else {
            return 0.0;
        };

        if senti.cap_differential && is_all_caps(&senti.words[i]) {
            valence += if valence > 0.0 { C_INCR } else { -C_INCR };
        }

        for start in 0..3 {
            if i <= start {
                break;
            }
            let prev = i - (start + 1);
            if self.resources.valence(&senti.lower[prev]).is_some() {
                continue;
            }
            let mut scalar = self.booster_scalar(senti, prev, valence);
            if scalar != 0.0 {
                scalar *= [1.0, 0.95, 0.9][start];
            }
            valence += scalar;
            valence = self.negation_check(valence, &senti.lower, start, i);
        }

        self.least_check(valence, &senti.lower, i)
    }

    fn booster_scalar(&self, senti: &SentiText, index: usize, valence: f64) -> f64 {
        let Some(mut scalar) = self.resources.booster(&senti.lower[index]) else {
            return 0.0;
        };
        if valence < 0.0 {
            scalar = -scalar;
        }
        if senti.cap_differential && is_all_caps(&senti.words[index]) {
            scalar += if valence > 0.0 { C_INCR } else { -C_INCR };
        }
        scalar
    }

    fn negation_check(&self, valence: f64, lower: &[String], start: usize, i: usize) -> f64 {
        let word = |back: usize| lower[i - back].as_str();
        match start {
            0 if self.resources.is_negation(word(1)) => valence * N_SCALAR,
            1 => {
                if word(2) == "never" && matches!(word(1), "so" | "this") {
                    valence * 1.25
                } else if word(2) == "without" && word(1) == "doubt" {
                    valence
                } else if self.resources.is_negation(word(2)) {
                    valence * N_SCALAR
                } else {
                    valence
                }
            }
            2 => {
                if word(3) == "never" && (matches!(word(2), "so" | "this") || matches!(word(1), "so" | "this")) {
                    valence * 1.25
                } else if word(3) == "without" && (word(2) == "doubt" || word(1) == "doubt") {
                    valence
                } else if self.resources.is_negation(word(3)) {
                    valence * N_SCALAR
                } else {
                    valence
                }
            }
            _ => valence,
        }
    }

    fn least_check(&self, valence: f64, lower: &[String], i: usize) -> f64 {
        if i > 1
            && lower[i - 1] == "least"
            && lower[i - 2] != "at"
            && lower[i - 2] != "very"
            && self.resources.valence("least").is_none()
        {
            valence * N_SCALAR
        } else if i == 1 && lower[0] == "least" && self.resources.valence("least").is_none() {
            valence * N_SCALAR
        } else {
            valence
        }
    }
}

/// Sentiment before "but" is damped, sentiment after it emphasised.
fn but_shift(lower: &[String], sentiments: &mut [f64]) {
    if let Some(but) = lower.iter().position(|w| w == "but") {
        for (i, s) in sentiments.iter_mut().enumerate() {
            if i < but {
                *s *= 0.5;
            } else if i > but {
                *s *= 1.5;
            }
        }
    }
}

fn score_valence(sentiments: &[f64], text: &str) -> SentimentScores {
    if sentiments.is_empty() {
        return SentimentScores::default();
    }

    let emphasis = punctuation_emphasis(text);
    let mut total: f64 = sentiments.iter().sum();
    if total > 0.0 {
        total += emphasis;
    } else if total < 0.0 {
        total -= emphasis;
    }
    let compound = normalize(total);

    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut neu_count = 0.0;
    for &s in sentiments {
        if s > 0.0 {
            pos_sum += s + 1.0;
        } else if s < 0.0 {
            neg_sum += s - 1.0;
        } else {
            neu_count += 1.0;
        }
    }
    if pos_sum > neg_sum.abs() {
        pos_sum += emphasis;
    } else if pos_sum < neg_sum.abs() {
        neg_sum -= emphasis;
    }

    let denom = pos_sum + neg_sum.abs() + neu_count;
    SentimentScores {
        neg: round_to((neg_sum / denom).abs(), 3),
        neu: round_to((neu_count / denom).abs(), 3),
        pos: round_to((pos_sum / denom).abs(), 3),
        compound: round_to(compound, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> SentimentAnalyzer {
        SentimentAnalyzer::new(LanguageResources::english().shared())
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(analyzer().polarity_scores(""), SentimentScores::default());
        assert_eq!(analyzer().polarity_scores("a I ."), SentimentScores::default());
    }

    #[test]
    fn test_neutral_text() {
        let scores = analyzer().polarity_scores("The table stands near the window.");
        assert_eq!(scores.compound, 0.0);
        assert_eq!(scores.neu, 1.0);
    }

    #[test]
    fn test_single_word() {
        // 2.7 / sqrt(2.7^2 + 15)
        let scores = analyzer().polarity_scores("happy");
        assert!((scores.compound - 0.5719).abs() < 1e-4);
        assert_eq!(scores.pos, 1.0);
    }

    #[test]
    fn test_proportions_sum_to_one() {
        let scores = analyzer().polarity_scores("The food was good but the service was terrible.");
        let sum = scores.neg + scores.neu + scores.pos;
        assert!((sum - 1.0).abs() < 0.01);
        assert!(scores.compound < 0.0);
    }

    #[test]
    fn test_negation_flips() {
        let plain = analyzer().polarity_scores("This movie is good");
        let negated = analyzer().polarity_scores("This movie is not good");
        assert!(plain.compound > 0.0);
        assert!(negated.compound < 0.0);
    }

    #[test]
    fn test_booster_increases_magnitude() {
        let plain = analyzer().polarity_scores("The talk was good");
        let boosted = analyzer().polarity_scores("The talk was very good");
        let damped = analyzer().polarity_scores("The talk was slightly good");
        assert!(boosted.compound > plain.compound);
        assert!(damped.compound < plain.compound);
    }

    #[test]
    fn test_caps_and_exclamation_emphasis() {
        let plain = analyzer().polarity_scores("The result is great");
        let caps = analyzer().polarity_scores("The result is GREAT");
        let bang = analyzer().polarity_scores("The result is great!!");
        assert!(caps.compound > plain.compound);
        assert!(bang.compound > plain.compound);
    }

    #[test]
    fn test_but_shifts_weight() {
        let scores = analyzer().polarity_scores("I was sad but now I am happy");
        assert!(scores.compound > 0.0);
    }

    #[test]
    fn test_strong_polarity() {
        assert!(analyzer().polarity_scores("I love this wonderful day!").compound >= 0.5);
        assert!(analyzer().polarity_scores("I hate this terrible mess.").compound <= -0.5);
    }

    #[test]
    fn test_question_marks() {
        assert_eq!(punctuation_emphasis("why?"), 0.0);
        assert!((punctuation_emphasis("why??") - 0.36).abs() < 1e-12);
        assert!((punctuation_emphasis("why?????") - 0.96).abs() < 1e-12);
        assert!((punctuation_emphasis("wow!!!!!!") - 4.0 * 0.292).abs() < 1e-12);
    }
}
