//! Merge of audio and text features into one communication profile

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::error::{ProfileError, Result};
use crate::features::AudioFeatureSet;
use crate::text::TextFeatureSet;

pub const SCHEMA_VERSION: u32 = 1;

const AUDIO_SECTION: &str = "audio_features";
const TEXT_SECTION: &str = "text_features";

const AUDIO_KEYS: &[&str] = &[
    "tempo",
    "spectral_centroid",
    "spectral_rolloff",
    "mfccs",
    "pitch_mean",
    "pitch_variability",
    "energy_mean",
    "energy_variability",
    "speech_rate",
    "pause_count",
    "pause_duration_mean",
    "voice_quality_hnr",
    "formants",
    "chroma",
];

const TEXT_KEYS: &[&str] = &["sentiment", "word_count", "unique_words"];

/// Fields holding counts; integral floats there become integers.
const COUNT_KEYS: &[&str] = &["pause_count", "word_count", "unique_words", "top_words"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Full,
    AudioOnly,
    TextOnly,
}

/// Canonical merged record; plain JSON values only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationProfile {
    pub schema_version: u32,
    pub modality: Modality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_features: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_features: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_words: Option<Map<String, Value>>,
}

impl CommunicationProfile {
    /// Pretty JSON; identical profiles give identical bytes.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up `section.key`, e.g. `("audio_features", "pause_count")`.
    pub fn field(&self, section: &str, key: &str) -> Option<&Value> {
        let map = match section {
            AUDIO_SECTION => self.audio_features.as_ref(),
            TEXT_SECTION => self.text_features.as_ref(),
            "top_words" => self.top_words.as_ref(),
            _ => None,
        }?;
        map.get(key)
    }
}

/// Recursively checks numbers and lowers integral count floats to integers.
fn normalize(value: &Value, path: &str, count: bool) -> Result<Value> {
    match value {
        Value::Null => Err(ProfileError::integration(format!(
            "Missing or non-finite value at {}", path
        ))),
        Value::Number(n) => match n.as_f64() {
            Some(f) if !f.is_finite() => Err(ProfileError::integration(format!(
                "Non-finite value at {}", path
            ))),
            Some(f) if count && n.is_f64() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
                Ok(Value::from(f as u64))
            }
            _ => Ok(value.clone()),
        },
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| normalize(item, &format!("{}[{}]", path, i), count))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(key, item)| Ok((key.clone(), normalize(item, &format!("{}.{}", path, key), count)?)))
            .collect::<Result<Map<_, _>>>()
            .map(Value::Object),
        _ => Ok(value.clone()),
    }
}

fn as_object<'a>(section: &str, source: &'a Value) -> Result<&'a Map<String, Value>> {
    source.as_object().ok_or_else(|| {
        ProfileError::integration(format!("{} must be a JSON object", section))
    })
}

/// Required `keys` of `source`, normalised, in `keys` order.
fn select(section: &str, source: &Value, keys: &[&str]) -> Result<Map<String, Value>> {
    let object = as_object(section, source)?;
    let mut selected = Map::new();
    for &key in keys {
        let value = object
            .get(key)
            .ok_or_else(|| ProfileError::missing_field(section, key))?;
        let path = format!("{}.{}", section, key);
        selected.insert(key.to_string(), normalize(value, &path, COUNT_KEYS.contains(&key))?);
    }
    Ok(selected)
}

fn top_words(text: &Value) -> Result<Map<String, Value>> {
    let value = as_object(TEXT_SECTION, text)?
        .get("top_words")
        .ok_or_else(|| ProfileError::missing_field(TEXT_SECTION, "top_words"))?;
    match normalize(value, "top_words", true)? {
        Value::Object(map) => Ok(map),
        _ => Err(ProfileError::integration("top_words must be a JSON object")),
    }
}

pub struct ProfileIntegrator;

impl ProfileIntegrator {
    pub fn integrate(audio: &AudioFeatureSet, text: &TextFeatureSet) -> Result<CommunicationProfile> {
        Self::integrate_values(&serde_json::to_value(audio)?, &serde_json::to_value(text)?)
    }

    /// Integrate feature sets already lowered to JSON values.
    pub fn integrate_values(audio: &Value, text: &Value) -> Result<CommunicationProfile> {
        let audio_features = select(AUDIO_SECTION, audio, AUDIO_KEYS)?;
        let text_features = select(TEXT_SECTION, text, TEXT_KEYS)?;
        let top_words = top_words(text)?;
        debug!(
            "Integrated profile: {} audio fields, {} text fields, {} top words",
            audio_features.len(), text_features.len(), top_words.len()
        );

        Ok(CommunicationProfile {
            schema_version: SCHEMA_VERSION,
            modality: Modality::Full,
            audio_features: Some(audio_features),
            text_features: Some(text_features),
            top_words: Some(top_words),
        })
    }

    pub fn integrate_audio_only(audio: &AudioFeatureSet) -> Result<CommunicationProfile> {
        let audio_features = select(AUDIO_SECTION, &serde_json::to_value(audio)?, AUDIO_KEYS)?;
        Ok(CommunicationProfile {
            schema_version: SCHEMA_VERSION,
            modality: Modality::AudioOnly,
            audio_features: Some(audio_features),
            text_features: None,
            top_words: None,
        })
    }

    pub fn integrate_text_only(text: &TextFeatureSet) -> Result<CommunicationProfile> {
        let value = serde_json::to_value(text)?;
        Ok(CommunicationProfile {
            schema_version: SCHEMA_VERSION,
            modality: Modality::TextOnly,
            audio_features: None,
            text_features: Some(select(TEXT_SECTION, &value, TEXT_KEYS)?),
            top_words: Some(top_words(&value)?),
        })
    }
}
