//! Immutable language resources shared by the text analyzers

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::{debug, info};
use crate::config::TextConfig;
use crate::error::{ProfileError, Result};
use super::entities::EntityLabel;

/// Intensity added or removed by a booster word.
pub const B_INCR: f64 = 0.293;
pub const B_DECR: f64 = -0.293;

/// NLTK English stopword list.
const STOPWORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his", "himself",
    "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself", "they", "them",
    "their", "theirs", "themselves", "what", "which", "who", "whom", "this", "that", "that'll",
    "these", "those", "am", "is", "are", "was", "were", "be", "been", "being", "have", "has",
    "had", "having", "do", "does", "did", "doing", "a", "an", "the", "and", "but", "if", "or",
    "because", "as", "until", "while", "of", "at", "by", "for", "with", "about", "against",
    "between", "into", "through", "during", "before", "after", "above", "below", "to", "from",
    "up", "down", "in", "out", "on", "off", "over", "under", "again", "further", "then", "once",
    "here", "there", "when", "where", "why", "how", "all", "any", "both", "each", "few", "more",
    "most", "other", "some", "such", "no", "nor", "not", "only", "own", "same", "so", "than",
    "too", "very", "s", "t", "can", "will", "just", "don", "don't", "should", "should've", "now",
    "d", "ll", "m", "o", "re", "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn",
    "didn't", "doesn", "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn",
    "isn't", "ma", "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
    "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
    "wouldn't",
];

/// Valence lexicon subset in VADER format (word, mean valence).
const LEXICON: &[(&str, f64)] = &[
    ("abandon", -1.9), ("abuse", -3.2), ("accept", 1.6), ("accepted", 1.1), ("accomplish", 1.8),
    ("accomplished", 1.9), ("ache", -1.6), ("admire", 2.1), ("adorable", 2.2), ("advantage", 1.0),
    ("afraid", -2.2), ("aggressive", -0.6), ("agree", 1.5), ("alarm", -1.4), ("alone", -1.0),
    ("amazing", 2.8), ("angry", -2.3), ("annoy", -1.9), ("annoyed", -1.6), ("annoying", -1.8),
    ("anxious", -1.0), ("apologize", 0.4), ("appreciate", 1.7), ("appreciated", 2.3),
    ("approve", 1.8), ("awesome", 3.1), ("awful", -2.0), ("awkward", -0.6), ("bad", -2.5),
    ("beautiful", 2.9), ("benefit", 2.0), ("best", 3.2), ("better", 1.9), ("bitter", -1.8),
    ("blame", -1.4), ("bless", 1.8), ("bored", -1.1), ("boring", -1.3), ("brave", 2.4),
    ("brilliant", 2.8), ("broken", -2.1), ("calm", 1.3), ("care", 2.2), ("careful", 0.6),
    ("celebrate", 2.7), ("chaos", -2.7), ("cheer", 2.3), ("cheerful", 2.5), ("clean", 1.7),
    ("clear", 1.6), ("clever", 2.0), ("comfort", 1.5), ("comfortable", 2.3), ("complain", -1.5),
    ("concern", -0.3), ("concerned", -0.9), ("confident", 2.2), ("confused", -1.3),
    ("confusing", -0.9), ("congrats", 2.4), ("cool", 1.3), ("crap", -1.6), ("crazy", -1.4),
    ("crisis", -3.1), ("cruel", -2.8), ("cry", -2.1), ("damage", -2.2), ("danger", -2.4),
    ("dead", -3.3), ("defeat", -2.0), ("delight", 2.9), ("delighted", 2.3), ("depressed", -2.3),
    ("desire", 1.7), ("despair", -2.9), ("destroy", -2.8), ("difficult", -1.5),
    ("disappoint", -1.7), ("disappointed", -1.9), ("disaster", -3.1), ("dislike", -1.6),
    ("disturbing", -2.3), ("doubt", -1.5), ("dread", -2.4), ("dumb", -2.3), ("eager", 1.5),
    ("easy", 1.9), ("effective", 2.1), ("efficient", 1.8), ("embarrassed", -1.5),
    ("encourage", 2.3), ("energetic", 1.9), ("enjoy", 2.2), ("enjoyed", 2.3),
    ("enthusiastic", 1.9), ("excellent", 2.7), ("excited", 1.4), ("exciting", 2.2),
    ("fail", -2.5), ("failed", -2.3), ("failure", -2.3), ("fair", 1.3), ("fake", -2.1),
    ("fantastic", 2.6), ("fault", -1.7), ("favorite", 2.0), ("fear", -2.2), ("fine", 0.8),
    ("fool", -1.9), ("free", 2.3), ("friendly", 2.2), ("frustrated", -2.4),
    ("frustrating", -1.9), ("fun", 2.3), ("funny", 1.9), ("furious", -2.7), ("glad", 2.0),
    ("good", 1.9), ("gorgeous", 3.0), ("grateful", 2.0), ("great", 3.1), ("grief", -2.2),
    ("guilty", -1.8), ("happiness", 2.6), ("happy", 2.7), ("hard", -0.4), ("harm", -2.5),
    ("hate", -2.7), ("hated", -3.2), ("hell", -3.6), ("help", 1.7), ("helpful", 1.8),
    ("hero", 2.6), ("honest", 2.3), ("hope", 1.9), ("hopeful", 1.6), ("horrible", -2.5),
    ("hostile", -2.2), ("hurt", -2.4), ("ideal", 2.4), ("ignore", -1.5), ("ill", -1.8),
    ("important", 0.8), ("impressed", 2.1), ("impressive", 2.3), ("improve", 1.9),
    ("inspire", 2.7), ("inspired", 2.2), ("interest", 2.0), ("interested", 1.7),
    ("interesting", 1.7), ("joy", 2.8), ("kind", 2.4), ("kill", -3.7), ("lame", -1.8),
    ("laugh", 2.6), ("lazy", -1.5), ("like", 1.5), ("liked", 1.8), ("lonely", -1.5),
    ("lose", -1.6), ("loss", -1.3), ("lost", -1.3), ("love", 3.2), ("loved", 2.9),
    ("lovely", 2.8), ("lucky", 1.8), ("mad", -2.2), ("mess", -1.5), ("miserable", -2.2),
    ("miss", -0.6), ("mistake", -1.4), ("nasty", -2.6), ("nervous", -1.1), ("nice", 1.8),
    ("offended", -1.8), ("ok", 1.2), ("okay", 0.9), ("optimistic", 1.3), ("pain", -2.3),
    ("panic", -2.3), ("perfect", 2.7), ("pleasant", 2.3), ("please", 1.3), ("pleased", 1.9),
    ("poor", -2.1), ("positive", 2.6), ("problem", -1.7), ("problems", -1.7), ("proud", 2.1),
    ("rage", -2.6), ("regret", -1.8), ("reject", -1.7), ("relax", 1.9), ("relief", 2.1),
    ("respect", 2.1), ("rich", 2.6), ("ridiculous", -1.5), ("risk", -1.1), ("rude", -2.0),
    ("sad", -2.1), ("safe", 1.9), ("satisfied", 1.8), ("scared", -1.9), ("shame", -2.1),
    ("shock", -1.6), ("sick", -2.3), ("silly", 0.1), ("smart", 1.7), ("smile", 1.5),
    ("sorry", -0.3), ("strong", 2.3), ("stupid", -2.4), ("success", 2.7), ("successful", 2.8),
    ("suffer", -2.5), ("super", 2.9), ("support", 1.7), ("supportive", 1.2), ("sure", 1.3),
    ("surprise", 1.1), ("sweet", 2.0), ("terrible", -2.1), ("terrific", 3.0), ("thank", 1.5),
    ("thanks", 1.9), ("threat", -2.4), ("tired", -1.9), ("trouble", -1.7), ("trust", 2.3),
    ("ugly", -2.3), ("unfair", -2.1), ("unhappy", -1.8), ("upset", -1.6), ("useful", 1.9),
    ("useless", -1.8), ("valuable", 2.1), ("warm", 0.9), ("weak", -1.9), ("welcome", 2.0),
    ("win", 2.8), ("wonderful", 2.7), ("worried", -1.2), ("worry", -1.9), ("worse", -2.1),
    ("worst", -3.1), ("worthless", -1.9), ("wow", 2.8), ("wrong", -2.1), ("yes", 1.7),
];

/// Words that scale the intensity of the following sentiment word.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", B_INCR), ("amazingly", B_INCR), ("awfully", B_INCR), ("completely", B_INCR),
    ("considerably", B_INCR), ("decidedly", B_INCR), ("deeply", B_INCR), ("enormously", B_INCR),
    ("entirely", B_INCR), ("especially", B_INCR), ("exceptionally", B_INCR),
    ("extremely", B_INCR), ("fabulously", B_INCR), ("fully", B_INCR), ("greatly", B_INCR),
    ("highly", B_INCR), ("hugely", B_INCR), ("incredibly", B_INCR), ("intensely", B_INCR),
    ("majorly", B_INCR), ("more", B_INCR), ("most", B_INCR), ("particularly", B_INCR),
    ("purely", B_INCR), ("quite", B_INCR), ("really", B_INCR), ("remarkably", B_INCR),
    ("so", B_INCR), ("substantially", B_INCR), ("thoroughly", B_INCR), ("totally", B_INCR),
    ("tremendously", B_INCR), ("unbelievably", B_INCR), ("unusually", B_INCR),
    ("utterly", B_INCR), ("very", B_INCR),
    ("almost", B_DECR), ("barely", B_DECR), ("hardly", B_DECR), ("kinda", B_DECR),
    ("less", B_DECR), ("little", B_DECR), ("marginally", B_DECR), ("occasionally", B_DECR),
    ("partly", B_DECR), ("scarcely", B_DECR), ("slightly", B_DECR), ("somewhat", B_DECR),
    ("sorta", B_DECR),
];

const NEGATIONS: &[&str] = &[
    "aint", "arent", "cannot", "cant", "couldnt", "darent", "didnt", "doesnt", "ain't",
    "aren't", "can't", "couldn't", "daren't", "didn't", "doesn't", "dont", "hadnt", "hasnt",
    "havent", "isnt", "mightnt", "mustnt", "neither", "don't", "hadn't", "hasn't", "haven't",
    "isn't", "mightn't", "mustn't", "neednt", "needn't", "never", "none", "nope", "nor", "not",
    "nothing", "nowhere", "oughtnt", "shant", "shouldnt", "uhuh", "wasnt", "werent",
    "oughtn't", "shan't", "shouldn't", "uh-uh", "wasn't", "weren't", "without", "wont",
    "wouldnt", "won't", "wouldn't", "rarely", "seldom", "despite",
];

/// Tokens ending in '.' that do not close a sentence.
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "vs", "etc", "e.g", "i.e", "inc",
    "ltd", "co", "corp", "dept", "est", "approx", "fig", "no", "vol", "jan", "feb", "mar",
    "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "u.s", "u.k", "a.m", "p.m",
];

const GAZETTEER: &[(&str, EntityLabel)] = &[
    // places
    ("america", EntityLabel::Gpe), ("united states", EntityLabel::Gpe),
    ("united kingdom", EntityLabel::Gpe), ("england", EntityLabel::Gpe),
    ("britain", EntityLabel::Gpe), ("canada", EntityLabel::Gpe), ("mexico", EntityLabel::Gpe),
    ("france", EntityLabel::Gpe), ("germany", EntityLabel::Gpe), ("spain", EntityLabel::Gpe),
    ("italy", EntityLabel::Gpe), ("china", EntityLabel::Gpe), ("japan", EntityLabel::Gpe),
    ("india", EntityLabel::Gpe), ("brazil", EntityLabel::Gpe), ("australia", EntityLabel::Gpe),
    ("russia", EntityLabel::Gpe), ("ireland", EntityLabel::Gpe), ("europe", EntityLabel::Gpe),
    ("london", EntityLabel::Gpe), ("paris", EntityLabel::Gpe), ("berlin", EntityLabel::Gpe),
    ("tokyo", EntityLabel::Gpe), ("beijing", EntityLabel::Gpe), ("new york", EntityLabel::Gpe),
    ("los angeles", EntityLabel::Gpe), ("san francisco", EntityLabel::Gpe),
    ("chicago", EntityLabel::Gpe), ("boston", EntityLabel::Gpe), ("seattle", EntityLabel::Gpe),
    ("toronto", EntityLabel::Gpe), ("sydney", EntityLabel::Gpe), ("california", EntityLabel::Gpe),
    ("texas", EntityLabel::Gpe), ("florida", EntityLabel::Gpe), ("washington", EntityLabel::Gpe),
    // nationalities, religious and political groups
    ("american", EntityLabel::Norp), ("americans", EntityLabel::Norp),
    ("british", EntityLabel::Norp), ("english", EntityLabel::Norp),
    ("canadian", EntityLabel::Norp), ("french", EntityLabel::Norp),
    ("german", EntityLabel::Norp), ("spanish", EntityLabel::Norp),
    ("italian", EntityLabel::Norp), ("chinese", EntityLabel::Norp),
    ("japanese", EntityLabel::Norp), ("indian", EntityLabel::Norp),
    ("european", EntityLabel::Norp), ("christian", EntityLabel::Norp),
    ("muslim", EntityLabel::Norp), ("jewish", EntityLabel::Norp),
    ("buddhist", EntityLabel::Norp), ("democrat", EntityLabel::Norp),
    ("democrats", EntityLabel::Norp), ("republican", EntityLabel::Norp),
    ("republicans", EntityLabel::Norp),
    // organisations
    ("google", EntityLabel::Org), ("microsoft", EntityLabel::Org),
    ("apple", EntityLabel::Org), ("amazon", EntityLabel::Org), ("facebook", EntityLabel::Org),
    ("meta", EntityLabel::Org), ("netflix", EntityLabel::Org), ("tesla", EntityLabel::Org),
    ("ibm", EntityLabel::Org), ("intel", EntityLabel::Org), ("nasa", EntityLabel::Org),
    ("fbi", EntityLabel::Org), ("cia", EntityLabel::Org), ("un", EntityLabel::Org),
    ("united nations", EntityLabel::Org), ("congress", EntityLabel::Org),
    ("senate", EntityLabel::Org), ("harvard", EntityLabel::Org), ("stanford", EntityLabel::Org),
    ("mit", EntityLabel::Org), ("oxford", EntityLabel::Org), ("bbc", EntityLabel::Org),
    ("cnn", EntityLabel::Org), ("reuters", EntityLabel::Org),
    // given names
    ("john", EntityLabel::Person), ("james", EntityLabel::Person),
    ("robert", EntityLabel::Person), ("michael", EntityLabel::Person),
    ("william", EntityLabel::Person), ("david", EntityLabel::Person),
    ("richard", EntityLabel::Person), ("joseph", EntityLabel::Person),
    ("thomas", EntityLabel::Person), ("charles", EntityLabel::Person),
    ("daniel", EntityLabel::Person), ("peter", EntityLabel::Person),
    ("paul", EntityLabel::Person), ("mark", EntityLabel::Person),
    ("george", EntityLabel::Person), ("steven", EntityLabel::Person),
    ("mary", EntityLabel::Person), ("patricia", EntityLabel::Person),
    ("jennifer", EntityLabel::Person), ("linda", EntityLabel::Person),
    ("elizabeth", EntityLabel::Person), ("barbara", EntityLabel::Person),
    ("susan", EntityLabel::Person), ("jessica", EntityLabel::Person),
    ("sarah", EntityLabel::Person), ("karen", EntityLabel::Person),
    ("emma", EntityLabel::Person), ("olivia", EntityLabel::Person),
    ("anna", EntityLabel::Person), ("alice", EntityLabel::Person),
    ("maria", EntityLabel::Person), ("emily", EntityLabel::Person),
];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "company", "co", "university", "college",
    "bank", "institute", "foundation", "association", "group", "agency", "department",
    "ministry", "council", "committee", "party", "school", "hospital",
];

const PERSON_TITLES: &[&str] = &["mr", "mrs", "ms", "dr", "prof", "sir", "madam", "president"];

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const RELATIVE_DATES: &[&str] = &["today", "yesterday", "tomorrow", "tonight"];

const NUMBER_WORDS: &[&str] = &[
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety", "hundred",
    "thousand", "million", "billion", "dozen",
];

const MAGNITUDES: &[&str] = &["hundred", "thousand", "million", "billion", "trillion"];

const CURRENCY_WORDS: &[&str] = &[
    "dollar", "dollars", "euro", "euros", "pound", "pounds", "cent", "cents", "yen", "bucks",
];

fn word_set(words: &[&str]) -> HashSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Word lists, valence lexicon and gazetteer used by the text extractor.
///
/// Built once and shared read-only; nothing mutates it after construction.
#[derive(Debug, Clone)]
pub struct LanguageResources {
    pub stopwords: HashSet<String>,
    pub lexicon: HashMap<String, f64>,
    pub boosters: HashMap<String, f64>,
    pub negations: HashSet<String>,
    pub abbreviations: HashSet<String>,
    pub gazetteer: HashMap<String, EntityLabel>,
    pub org_suffixes: HashSet<String>,
    pub person_titles: HashSet<String>,
    pub months: HashSet<String>,
    pub weekdays: HashSet<String>,
    pub relative_dates: HashSet<String>,
    pub number_words: HashSet<String>,
    pub magnitudes: HashSet<String>,
    pub currency_words: HashSet<String>,
}

impl LanguageResources {
    /// Embedded English resources.
    pub fn english() -> Self {
        Self {
            stopwords: word_set(STOPWORDS),
            lexicon: LEXICON.iter().map(|&(w, v)| (w.to_string(), v)).collect(),
            boosters: BOOSTERS.iter().map(|&(w, v)| (w.to_string(), v)).collect(),
            negations: word_set(NEGATIONS),
            abbreviations: word_set(ABBREVIATIONS),
            gazetteer: GAZETTEER.iter().map(|&(w, l)| (w.to_string(), l)).collect(),
            org_suffixes: word_set(ORG_SUFFIXES),
            person_titles: word_set(PERSON_TITLES),
            months: word_set(MONTHS),
            weekdays: word_set(WEEKDAYS),
            relative_dates: word_set(RELATIVE_DATES),
            number_words: word_set(NUMBER_WORDS),
            magnitudes: word_set(MAGNITUDES),
            currency_words: word_set(CURRENCY_WORDS),
        }
    }

    /// English resources adjusted by the text configuration.
    pub fn from_config(config: &TextConfig) -> Result<Self> {
        let mut resources = Self::english();
        resources
            .stopwords
            .extend(config.extra_stopwords.iter().map(|w| w.to_lowercase()));

        if let Some(path) = &config.lexicon_path {
            resources.lexicon = load_lexicon(path)?;
            info!("Loaded {} lexicon entries from {}", resources.lexicon.len(), path.display());
        }

        resources.validate()?;
        debug!(
            "Language resources: {} stopwords, {} lexicon entries, {} gazetteer entries",
            resources.stopwords.len(), resources.lexicon.len(), resources.gazetteer.len()
        );
        Ok(resources)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lexicon.is_empty() {
            return Err(ProfileError::text_analysis("Sentiment lexicon is empty"));
        }
        if let Some((word, _)) = self.lexicon.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ProfileError::text_analysis(format!(
                "Non-finite valence for lexicon entry '{}'", word
            )));
        }
        Ok(())
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    pub fn valence(&self, word: &str) -> Option<f64> {
        self.lexicon.get(word).copied()
    }

    pub fn booster(&self, word: &str) -> Option<f64> {
        self.boosters.get(word).copied()
    }

    /// Negation word or any `n't` contraction.
    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word) || word.contains("n't")
    }
}

impl Default for LanguageResources {
    fn default() -> Self {
        Self::english()
    }
}

/// Parse a VADER-format lexicon: `word<TAB>mean valence[<TAB>...]` per line.
pub fn parse_lexicon(content: &str) -> Result<HashMap<String, f64>> {
    let mut lexicon = HashMap::new();
    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split('\t');
        let word = fields.next().unwrap_or_default().trim();
        let valence = fields
            .next()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
            .ok_or_else(|| ProfileError::text_analysis(format!(
                "Invalid lexicon entry on line {}: '{}'", line_no + 1, line
            )))?;
        if !word.is_empty() {
            lexicon.insert(word.to_lowercase(), valence);
        }
    }
    if lexicon.is_empty() {
        return Err(ProfileError::text_analysis("Lexicon file contains no entries"));
    }
    Ok(lexicon)
}

pub fn load_lexicon<P: AsRef<Path>>(path: P) -> Result<HashMap<String, f64>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        ProfileError::text_analysis(format!("Failed to read lexicon {}: {}", path.display(), e))
    })?;
    parse_lexicon(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_english_resources() {
        let resources = LanguageResources::english();
        assert_eq!(resources.stopwords.len(), 179);
        assert!(resources.is_stopword("the"));
        assert!(!resources.is_stopword("happy"));
        assert_eq!(resources.valence("happy"), Some(2.7));
        assert_eq!(resources.booster("very"), Some(B_INCR));
        assert!(resources.is_negation("not"));
        assert!(resources.is_negation("shouldn't"));
        assert!(resources.validate().is_ok());
    }

    #[test]
    fn test_extra_stopwords() {
        let config = TextConfig {
            extra_stopwords: vec!["Um".to_string(), "uh".to_string()],
            ..TextConfig::default()
        };
        let resources = LanguageResources::from_config(&config).unwrap();
        assert!(resources.is_stopword("um"));
        assert!(resources.is_stopword("uh"));
    }

    #[test]
    fn test_parse_lexicon() {
        let lexicon = parse_lexicon("good\t1.9\t0.9\t[2, 2]\nbad\t-2.5\n\n").unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon["bad"], -2.5);

        assert!(parse_lexicon("").unwrap_err().to_string().contains("no entries"));
        assert!(parse_lexicon("good\tvery\n").is_err());
    }

    #[test]
    fn test_lexicon_override_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "splendid\t3.0\t0.5").unwrap();
        let config = TextConfig {
            lexicon_path: Some(file.path().to_path_buf()),
            ..TextConfig::default()
        };
        let resources = LanguageResources::from_config(&config).unwrap();
        assert_eq!(resources.valence("splendid"), Some(3.0));
        assert_eq!(resources.valence("happy"), None);
    }

    #[test]
    fn test_empty_lexicon_is_rejected() {
        let mut resources = LanguageResources::english();
        resources.lexicon.clear();
        let err = resources.validate().unwrap_err();
        assert!(matches!(err, ProfileError::TextAnalysis { .. }));
    }

    #[test]
    fn test_missing_lexicon_file() {
        let config = TextConfig {
            lexicon_path: Some("/nonexistent/lexicon.txt".into()),
            ..TextConfig::default()
        };
        assert!(LanguageResources::from_config(&config).is_err());
    }
}
