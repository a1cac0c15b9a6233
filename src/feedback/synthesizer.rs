//! Rule-based feedback over a profile and optional qualitative analysis

use log::debug;
use serde::{Deserialize, Serialize};
use crate::processing::CommunicationProfile;
use super::insight::QualitativeAnalysis;

/// Onsets per minute above which slowing down is suggested.
const FAST_SPEECH_PER_MINUTE: f64 = 150.0;
/// Fewer pauses than this triggers the pausing suggestion.
const MIN_PAUSES: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmpathyLevel {
    High,
    Medium,
    Low,
}

impl EmpathyLevel {
    /// Classify a free-form empathy description; empty means medium.
    pub fn classify(description: &str) -> Self {
        let lower = description.trim().to_lowercase();
        if lower.is_empty() || lower.starts_with("medium") || lower.starts_with("moderate") {
            EmpathyLevel::Medium
        } else if lower.starts_with("high") {
            EmpathyLevel::High
        } else if lower.contains("high") && !lower.contains("low") {
            EmpathyLevel::High
        } else if lower.contains("moderate") || lower.contains("medium") {
            EmpathyLevel::Medium
        } else {
            EmpathyLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub empathy: String,
    pub tone: String,
    pub communication_style: String,
    pub suggestions: Vec<String>,
}

pub struct FeedbackSynthesizer;

impl FeedbackSynthesizer {
    /// Feedback from the insight service's judgments, refined by the profile when given.
    pub fn from_analysis(analysis: &QualitativeAnalysis, profile: Option<&CommunicationProfile>) -> Feedback {
        let empathy = EmpathyLevel::classify(&analysis.empathy_level);
        let tone = match analysis.tone_analysis.trim() {
            "" => "neutral",
            tone => tone,
        };

        let mut suggestions = Vec::new();
        if empathy != EmpathyLevel::High {
            suggestions.push(
                "Practice active listening and try to understand the other person's perspective.".to_string(),
            );
        }
        if let Some(profile) = profile {
            suggestions.extend(Self::delivery_suggestions(profile));
        }
        for area in &analysis.improvement_areas {
            if !area.trim().is_empty() && !suggestions.contains(area) {
                suggestions.push(area.clone());
            }
        }

        let feedback = Feedback {
            empathy: Self::empathy_message(empathy).to_string(),
            tone: format!(
                "Your tone appears to be {}. Consider if this aligns with your intended message and audience.",
                tone
            ),
            communication_style: Self::style_message(profile),
            suggestions,
        };
        debug!("Synthesized feedback with {} suggestions", feedback.suggestions.len());
        feedback
    }

    /// Feedback from the profile alone; tone is read from the sentiment compound score.
    pub fn from_profile(profile: &CommunicationProfile) -> Feedback {
        let compound = profile
            .field("text_features", "sentiment")
            .and_then(|s| s.get("compound"))
            .and_then(|c| c.as_f64());
        let tone = match compound {
            Some(c) if c >= 0.5 => "enthusiastic",
            Some(c) if c >= 0.05 => "positive",
            Some(c) if c <= -0.5 => "strongly negative",
            Some(c) if c <= -0.05 => "negative",
            _ => "neutral",
        };
        let analysis = QualitativeAnalysis {
            tone_analysis: tone.to_string(),
            ..QualitativeAnalysis::default()
        };
        Self::from_analysis(&analysis, Some(profile))
    }

    fn empathy_message(level: EmpathyLevel) -> &'static str {
        match level {
            EmpathyLevel::High => {
                "Your communication shows a high level of empathy. Great job connecting with others!"
            }
            EmpathyLevel::Medium => {
                "You're showing a moderate level of empathy. There's room for improvement in connecting more deeply with others."
            }
            EmpathyLevel::Low => {
                "Your communication could benefit from expressing more empathy. Try to put yourself in the other person's shoes."
            }
        }
    }

    fn style_message(profile: Option<&CommunicationProfile>) -> String {
        let base = "Consider varying your approach based on your audience and context.";
        let counts = profile.and_then(|p| {
            let words = p.field("text_features", "word_count")?.as_u64()?;
            let unique = p.field("text_features", "unique_words")?.as_u64()?;
            Some((words, unique))
        });
        match counts {
            Some((words, unique)) if words >= 20 && (unique as f64) < 0.25 * words as f64 => {
                format!("Your wording is fairly repetitive; a broader vocabulary would add clarity. {}", base)
            }
            Some((words, _)) if words > 0 && words < 20 => {
                format!("Your message is brief and direct. {}", base)
            }
            _ => format!("Your communication style is clear and direct. {}", base),
        }
    }

    fn delivery_suggestions(profile: &CommunicationProfile) -> Vec<String> {
        let mut suggestions = Vec::new();
        let Some(audio) = profile.audio_features.as_ref() else {
            return suggestions;
        };

        let per_minute = audio.get("speech_rate").and_then(|v| v.as_f64()).unwrap_or(0.0) * 60.0;
        if per_minute > FAST_SPEECH_PER_MINUTE {
            suggestions.push("Consider slowing down your speech rate for better clarity.".to_string());
        }
        let pauses = audio.get("pause_count").and_then(|v| v.as_u64()).unwrap_or(0);
        if pauses < MIN_PAUSES {
            suggestions.push(
                "Try incorporating more pauses in your speech. This can help emphasize key points \
                 and allow your audience to process information."
                    .to_string(),
            );
        }
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::AudioFeatureSet;
    use crate::processing::ProfileIntegrator;
    use crate::text::{SentimentScores, TextFeatureSet};

    fn profile(speech_rate: f64, pause_count: usize, compound: f64) -> CommunicationProfile {
        let audio = AudioFeatureSet {
            speech_rate,
            pause_count,
            ..AudioFeatureSet::zeroed(13, 4)
        };
        let text = TextFeatureSet {
            sentiment: SentimentScores { compound, ..SentimentScores::default() },
            word_count: 30,
            unique_words: 20,
            ..TextFeatureSet::default()
        };
        ProfileIntegrator::integrate(&audio, &text).unwrap()
    }

    #[test]
    fn test_empathy_classification() {
        assert_eq!(EmpathyLevel::classify("high"), EmpathyLevel::High);
        assert_eq!(EmpathyLevel::classify("High - the speaker acknowledges feelings"), EmpathyLevel::High);
        assert_eq!(EmpathyLevel::classify(""), EmpathyLevel::Medium);
        assert_eq!(EmpathyLevel::classify("Moderate"), EmpathyLevel::Medium);
        assert_eq!(EmpathyLevel::classify("low"), EmpathyLevel::Low);
        assert_eq!(EmpathyLevel::classify("not determinable"), EmpathyLevel::Low);
    }

    #[test]
    fn test_high_empathy_without_profile() {
        let analysis = QualitativeAnalysis {
            tone_analysis: "warm".to_string(),
            empathy_level: "high".to_string(),
            ..QualitativeAnalysis::default()
        };
        let feedback = FeedbackSynthesizer::from_analysis(&analysis, None);
        assert!(feedback.empathy.contains("high level of empathy"));
        assert!(feedback.tone.contains("warm"));
        assert!(feedback.suggestions.is_empty());
    }

    #[test]
    fn test_delivery_rules() {
        let fast = FeedbackSynthesizer::from_profile(&profile(3.0, 1, 0.0));
        assert!(fast.suggestions.iter().any(|s| s.contains("slowing down")));
        assert!(fast.suggestions.iter().any(|s| s.contains("more pauses")));
        assert!(fast.suggestions.iter().any(|s| s.contains("active listening")));

        let calm = FeedbackSynthesizer::from_profile(&profile(1.0, 6, 0.0));
        assert!(!calm.suggestions.iter().any(|s| s.contains("slowing down")));
        assert!(!calm.suggestions.iter().any(|s| s.contains("more pauses")));
    }

    #[test]
    fn test_tone_from_sentiment() {
        assert!(FeedbackSynthesizer::from_profile(&profile(0.0, 0, 0.7)).tone.contains("enthusiastic"));
        assert!(FeedbackSynthesizer::from_profile(&profile(0.0, 0, -0.2)).tone.contains("negative"));
        assert!(FeedbackSynthesizer::from_profile(&profile(0.0, 0, 0.0)).tone.contains("neutral"));
    }

    #[test]
    fn test_improvement_areas_appended_once() {
        let analysis = QualitativeAnalysis {
            empathy_level: "high".to_string(),
            improvement_areas: vec!["Use shorter sentences.".to_string(), "Use shorter sentences.".to_string()],
            ..QualitativeAnalysis::default()
        };
        let feedback = FeedbackSynthesizer::from_analysis(&analysis, None);
        assert_eq!(feedback.suggestions, vec!["Use shorter sentences."]);
    }
}
