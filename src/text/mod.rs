//! Transcript analysis: sentiment, lexical, readability, sentence and entity features

pub mod resources;
pub mod tokenize;
pub mod sentiment;
pub mod sentences;
pub mod readability;
pub mod entities;
pub mod extractor;

pub use resources::LanguageResources;
pub use sentiment::{SentimentAnalyzer, SentimentScores};
pub use entities::{Entity, EntityLabel, EntityRecognizer};
pub use readability::ReadabilityScores;
pub use extractor::{
    EmotionBuckets, NamedEntities, SentenceAnalysis, TextFeatureExtractor, TextFeatureSet, TopWords,
};
