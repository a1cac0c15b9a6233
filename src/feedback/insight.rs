//! Boundary to an external insight service
//!
//! The service itself is out of process. This module renders the request
//! prompt for a profile and parses the JSON object embedded in the reply.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use crate::error::{ProfileError, Result};
use crate::processing::CommunicationProfile;

/// Qualitative judgments returned by the insight service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualitativeAnalysis {
    pub tone_analysis: String,
    pub sentiment_analysis: String,
    pub empathy_level: String,
    pub key_points: Vec<String>,
    pub improvement_areas: Vec<String>,
}

/// Anything that turns a prompt into a free-form reply.
pub trait InsightProvider {
    fn analyze(&self, prompt: &str) -> Result<String>;
}

const FEATURE_GUIDE: &str = "\
Audio features:
1. MFCCs: short-term power spectrum shape.
2. Spectral centroid: centre of mass of the spectrum (Hz).
3. Spectral rolloff: frequency below which 85% of the spectral energy lies (Hz).
4. Tempo: pace of the speech rhythm (beats per minute).
5. Pitch mean and variability: average pitch and its spread (Hz).
6. Energy mean and variability: loudness and its changes (RMS).
7. Speech rate: detected onsets per second.
8. Pauses: number and mean duration (s) of silent stretches.
9. Voice quality (HNR): harmonic to percussive energy ratio.
10. Formants: resonant frequencies characterising vowels (Hz).
11. Chroma: energy across the 12 pitch classes.

Text features:
1. Sentiment: negative, neutral and positive proportions plus a compound score in [-1, 1].
2. Word count and unique words: length and vocabulary size of the transcript.
3. Top words: most frequent content words.";

const RESPONSE_FORMAT: &str = r#"{
  "tone_analysis": "String describing the overall tone",
  "sentiment_analysis": "String describing the sentiment",
  "empathy_level": "high, medium or low, with a short justification",
  "key_points": ["Array of strings, each representing a key point"],
  "improvement_areas": ["Array of strings, each suggesting an area for improvement"]
}"#;

/// Prompt asking the insight service to judge `profile`.
pub fn render_prompt(profile: &CommunicationProfile) -> Result<String> {
    let data = profile.to_json()?;
    Ok(format!(
        "You are analyzing communication data extracted from an audio recording and its transcript:\n\n\
         {data}\n\n\
         {FEATURE_GUIDE}\n\n\
         Review the data and:\n\
         1. Describe the speaker's tone.\n\
         2. Assess the sentiment.\n\
         3. Gauge the level of empathy.\n\
         4. List the key points.\n\
         5. As a speech coach, suggest areas for improvement.\n\n\
         Respond with a JSON object of this shape:\n\n\
         {RESPONSE_FORMAT}\n\n\
         Base the analysis only on the data above. Say so when something cannot be determined."
    ))
}

/// Parse the first `{` to last `}` of `reply` as a [`QualitativeAnalysis`].
pub fn parse_insight(reply: &str) -> Result<QualitativeAnalysis> {
    let (start, end) = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => (start, end),
        _ => return Err(ProfileError::insight("Reply contains no JSON object")),
    };

    serde_json::from_str(&reply[start..=end]).map_err(|e| {
        warn!("Unparseable insight reply: {}", e);
        ProfileError::insight(format!("Failed to parse insight reply: {}", e))
    })
}

/// Render the prompt, ask `provider` and parse its reply.
pub fn request_insight(provider: &dyn InsightProvider, profile: &CommunicationProfile) -> Result<QualitativeAnalysis> {
    let prompt = render_prompt(profile)?;
    debug!("Requesting insight ({} prompt bytes)", prompt.len());
    let reply = provider.analyze(&prompt)?;
    parse_insight(&reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::ProfileIntegrator;
    use crate::text::TextFeatureSet;

    struct CannedProvider(&'static str);

    impl InsightProvider for CannedProvider {
        fn analyze(&self, prompt: &str) -> Result<String> {
            assert!(prompt.contains("\"schema_version\""));
            Ok(self.0.to_string())
        }
    }

    struct FailingProvider;

    impl InsightProvider for FailingProvider {
        fn analyze(&self, _prompt: &str) -> Result<String> {
            Err(ProfileError::insight("service unavailable"))
        }
    }

    fn profile() -> CommunicationProfile {
        ProfileIntegrator::integrate_text_only(&TextFeatureSet::default()).unwrap()
    }

    #[test]
    fn test_parse_embedded_object() {
        let reply = "Here is my analysis:\n{\"tone_analysis\": \"friendly\", \"empathy_level\": \"high\", \
                     \"key_points\": [\"greeting\"], \"improvement_areas\": []}\nThanks!";
        let analysis = parse_insight(reply).unwrap();
        assert_eq!(analysis.tone_analysis, "friendly");
        assert_eq!(analysis.empathy_level, "high");
        assert_eq!(analysis.key_points, vec!["greeting"]);
        assert_eq!(analysis.sentiment_analysis, "");
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(parse_insight("no json here"), Err(ProfileError::Insight { .. })));
        assert!(matches!(parse_insight("} backwards {"), Err(ProfileError::Insight { .. })));
        assert!(matches!(parse_insight("{not: valid}"), Err(ProfileError::Insight { .. })));
    }

    #[test]
    fn test_prompt_contains_profile() {
        let prompt = render_prompt(&profile()).unwrap();
        assert!(prompt.contains("\"modality\": \"text_only\""));
        assert!(prompt.contains("improvement_areas"));
    }

    #[test]
    fn test_request_insight() {
        let provider = CannedProvider(r#"{"tone_analysis": "calm", "empathy_level": "low"}"#);
        let analysis = request_insight(&provider, &profile()).unwrap();
        assert_eq!(analysis.tone_analysis, "calm");

        assert!(request_insight(&FailingProvider, &profile()).is_err());
    }
}
