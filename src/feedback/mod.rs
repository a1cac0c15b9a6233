//! Feedback: insight service boundary and rule-based synthesis

pub mod insight;
pub mod synthesizer;

pub use insight::{InsightProvider, QualitativeAnalysis, parse_insight, render_prompt, request_insight};
pub use synthesizer::{EmpathyLevel, Feedback, FeedbackSynthesizer};
