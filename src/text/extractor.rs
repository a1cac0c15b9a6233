//! Text feature extraction

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;
use log::{debug, info};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::config::TextConfig;
use crate::error::Result;
use super::entities::{Entity, EntityRecognizer, count_by_label};
use super::readability::ReadabilityScores;
use super::resources::LanguageResources;
use super::sentences::split_sentences;
use super::sentiment::{SentimentAnalyzer, SentimentScores};
use super::tokenize::tokenize_words;

/// Most frequent words, highest count first. Serialized as an ordered object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopWords(pub Vec<(String, usize)>);

impl TopWords {
    /// At most `limit` words by count, ties broken by first occurrence.
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S], limit: usize) -> Self {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (index, token) in tokens.iter().enumerate() {
            counts.entry(token.as_ref()).or_insert((0, index)).0 += 1;
        }
        let mut ranked: Vec<(&str, usize, usize)> =
            counts.into_iter().map(|(w, (count, first))| (w, count, first)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
        ranked.truncate(limit);
        Self(ranked.into_iter().map(|(w, c, _)| (w.to_string(), c)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<usize> {
        self.0.iter().find(|(w, _)| w == word).map(|&(_, c)| c)
    }
}

impl Serialize for TopWords {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (word, count) in &self.0 {
            map.serialize_entry(word, count)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionBuckets {
    pub very_positive: usize,
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub very_negative: usize,
}

impl EmotionBuckets {
    /// Count one sentence by its compound score.
    pub fn add(&mut self, compound: f64) {
        if compound >= 0.5 {
            self.very_positive += 1;
        } else if compound >= 0.1 {
            self.positive += 1;
        } else if compound > -0.1 {
            self.neutral += 1;
        } else if compound > -0.5 {
            self.negative += 1;
        } else {
            self.very_negative += 1;
        }
    }

    pub fn total(&self) -> usize {
        self.very_positive + self.positive + self.neutral + self.negative + self.very_negative
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentenceAnalysis {
    pub sentence_count: usize,
    /// Mean words per sentence.
    pub avg_sentence_length: f64,
    pub complex_sentence_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedEntities {
    pub entity_count: usize,
    pub entity_types: BTreeMap<String, usize>,
    pub entities: Vec<Entity>,
}

impl NamedEntities {
    pub fn from_entities(entities: Vec<Entity>) -> Self {
        Self {
            entity_count: entities.len(),
            entity_types: count_by_label(&entities),
            entities,
        }
    }
}

/// Linguistic summary of one transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextFeatureSet {
    pub sentiment: SentimentScores,
    /// All word tokens, stopwords included.
    pub word_count: usize,
    /// Distinct tokens after stopword removal.
    pub unique_words: usize,
    pub top_words: TopWords,
    pub emotion_buckets: EmotionBuckets,
    pub readability_scores: ReadabilityScores,
    pub sentence_analysis: SentenceAnalysis,
    pub named_entities: NamedEntities,
    pub lexical_diversity: f64,
}

#[derive(Debug, Clone)]
pub struct TextFeatureExtractor {
    config: TextConfig,
    resources: Arc<LanguageResources>,
    sentiment: SentimentAnalyzer,
    entities: EntityRecognizer,
}

impl TextFeatureExtractor {
    /// Build with resources loaded from `config`.
    pub fn new(config: TextConfig) -> Result<Self> {
        let resources = LanguageResources::from_config(&config)?.shared();
        Ok(Self::with_resources(config, resources))
    }

    /// Build around already loaded resources.
    pub fn with_resources(config: TextConfig, resources: Arc<LanguageResources>) -> Self {
        Self {
            sentiment: SentimentAnalyzer::new(Arc::clone(&resources)),
            entities: EntityRecognizer::new(Arc::clone(&resources)),
            config,
            resources,
        }
    }

    pub fn resources(&self) -> &Arc<LanguageResources> {
        &self.resources
    }

    pub fn extract(&self, transcript: &str) -> Result<TextFeatureSet> {
        let start_time = Instant::now();
        self.resources.validate()?;

        let words = tokenize_words(transcript);
        let filtered: Vec<&str> = words
            .iter()
            .map(String::as_str)
            .filter(|w| !self.resources.is_stopword(w))
            .collect();
        let sentences = split_sentences(transcript, &self.resources.abbreviations);
        debug!(
            "Transcript: {} words, {} content words, {} sentences",
            words.len(), filtered.len(), sentences.len()
        );

        let ((sentiment, emotion_buckets), (named_entities, sentence_analysis)) = rayon::join(
            || {
                let mut buckets = EmotionBuckets::default();
                for sentence in &sentences {
                    buckets.add(self.sentiment.polarity_scores(sentence).compound);
                }
                (self.sentiment.polarity_scores(transcript), buckets)
            },
            || {
                (
                    NamedEntities::from_entities(self.entities.recognize(transcript)),
                    self.sentence_analysis(&sentences),
                )
            },
        );

        let mut distinct = filtered.clone();
        distinct.sort_unstable();
        distinct.dedup();
        let unique_words = distinct.len();
        let lexical_diversity = if filtered.is_empty() {
            0.0
        } else {
            unique_words as f64 / filtered.len() as f64
        };

        let features = TextFeatureSet {
            sentiment,
            word_count: words.len(),
            unique_words,
            top_words: TopWords::from_tokens(&filtered, self.config.top_words),
            emotion_buckets,
            readability_scores: ReadabilityScores::compute(&words, sentences.len()),
            sentence_analysis,
            named_entities,
            lexical_diversity,
        };

        info!(
            "Text features extracted in {:.1}ms ({} words, compound {:.3})",
            start_time.elapsed().as_secs_f64() * 1000.0,
            features.word_count, features.sentiment.compound
        );
        Ok(features)
    }

    fn sentence_analysis(&self, sentences: &[&str]) -> SentenceAnalysis {
        if sentences.is_empty() {
            return SentenceAnalysis::default();
        }
        let lengths: Vec<usize> = sentences.iter().map(|s| tokenize_words(s).len()).collect();
        let count = sentences.len() as f64;
        let complex = lengths
            .iter()
            .filter(|&&len| len > self.config.complex_sentence_words)
            .count();

        SentenceAnalysis {
            sentence_count: sentences.len(),
            avg_sentence_length: lengths.iter().sum::<usize>() as f64 / count,
            complex_sentence_ratio: complex as f64 / count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "This is a very happy and positive test sentence. It contains several \
        different words and expressions. Testing the text analysis module should yield interesting results.";

    fn extractor() -> TextFeatureExtractor {
        TextFeatureExtractor::new(TextConfig::default()).unwrap()
    }

    #[test]
    fn test_sample_transcript() {
        let features = extractor().extract(SAMPLE).unwrap();

        assert_eq!(features.sentence_analysis.sentence_count, 3);
        assert_eq!(features.word_count, 25);
        assert!(features.sentiment.pos > features.sentiment.neg);
        assert!(features.unique_words > 0);
        assert!(!features.top_words.is_empty());
        assert!(features.top_words.len() <= 10);
        assert!(features.lexical_diversity > 0.0 && features.lexical_diversity <= 1.0);
        assert_eq!(features.emotion_buckets.total(), 3);
        assert!((features.sentence_analysis.avg_sentence_length - 25.0 / 3.0).abs() < 1e-9);
        assert_eq!(features.sentence_analysis.complex_sentence_ratio, 0.0);
        assert!(features.readability_scores.flesch_reading_ease.is_finite());
    }

    #[test]
    fn test_empty_transcript() {
        let features = extractor().extract("").unwrap();

        assert_eq!(features.word_count, 0);
        assert_eq!(features.unique_words, 0);
        assert_eq!(features.lexical_diversity, 0.0);
        assert!(features.top_words.is_empty());
        assert_eq!(features.named_entities.entity_count, 0);
        assert_eq!(features.sentence_analysis.sentence_count, 0);
        assert_eq!(features.sentiment, SentimentScores::default());
        assert_eq!(features.readability_scores, ReadabilityScores::default());
        assert_eq!(features.emotion_buckets.total(), 0);
    }

    #[test]
    fn test_only_stopwords() {
        let features = extractor().extract("the a an").unwrap();

        assert_eq!(features.word_count, 3);
        assert_eq!(features.unique_words, 0);
        assert_eq!(features.lexical_diversity, 0.0);
        assert!(features.top_words.is_empty());
        assert_eq!(features.sentence_analysis.sentence_count, 1);
    }

    #[test]
    fn test_emotion_buckets_polar_sentences() {
        let features = extractor()
            .extract("I love this wonderful day! I hate this terrible mess.")
            .unwrap();
        assert_eq!(
            features.emotion_buckets,
            EmotionBuckets { very_positive: 1, very_negative: 1, ..EmotionBuckets::default() }
        );
    }

    #[test]
    fn test_bucket_thresholds() {
        let mut buckets = EmotionBuckets::default();
        for compound in [0.6, 0.5, 0.1, 0.09, -0.09, -0.1, -0.5, -0.6] {
            buckets.add(compound);
        }
        assert_eq!(
            buckets,
            EmotionBuckets { very_positive: 2, positive: 1, neutral: 2, negative: 1, very_negative: 2 }
        );
    }

    #[test]
    fn test_top_words_order() {
        let tokens = ["beta", "alpha", "beta", "gamma", "alpha", "delta"];
        let top = TopWords::from_tokens(&tokens, 3);
        assert_eq!(
            top.0,
            vec![("beta".to_string(), 2), ("alpha".to_string(), 2), ("gamma".to_string(), 1)]
        );
        assert_eq!(
            serde_json::to_string(&top).unwrap(),
            r#"{"beta":2,"alpha":2,"gamma":1}"#
        );
        assert_eq!(top.get("alpha"), Some(2));
        assert_eq!(top.get("delta"), None);
    }

    #[test]
    fn test_stopwords_excluded_from_diversity() {
        let features = extractor().extract("the cat and the cat and the dog").unwrap();
        assert_eq!(features.word_count, 8);
        assert_eq!(features.unique_words, 2);
        assert!((features.lexical_diversity - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(features.top_words.get("cat"), Some(2));
        assert_eq!(features.top_words.get("the"), None);
    }

    #[test]
    fn test_complex_sentences() {
        let long = vec!["word"; 21].join(" ");
        let text = format!("{}. Short one.", long);
        let features = extractor().extract(&text).unwrap();
        assert_eq!(features.sentence_analysis.sentence_count, 2);
        assert!((features.sentence_analysis.complex_sentence_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_entities_counted() {
        let features = extractor()
            .extract("Alice moved from Paris to London in 2020.")
            .unwrap();
        assert_eq!(features.named_entities.entity_count, 4);
        assert_eq!(features.named_entities.entity_types.get("GPE"), Some(&2));
        assert_eq!(features.named_entities.entity_types.get("PERSON"), Some(&1));
        assert_eq!(features.named_entities.entity_types.get("DATE"), Some(&1));
    }
}
