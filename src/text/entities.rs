//! Rule and gazetteer based named entity recognition

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use super::resources::LanguageResources;
use super::sentences::split_sentences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Norp,
    Date,
    Cardinal,
    Money,
    Percent,
    Misc,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::Person => "PERSON",
            EntityLabel::Org => "ORG",
            EntityLabel::Gpe => "GPE",
            EntityLabel::Norp => "NORP",
            EntityLabel::Date => "DATE",
            EntityLabel::Cardinal => "CARDINAL",
            EntityLabel::Money => "MONEY",
            EntityLabel::Percent => "PERCENT",
            EntityLabel::Misc => "MISC",
        }
    }
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

/// Entity totals per label.
pub fn count_by_label(entities: &[Entity]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for entity in entities {
        *counts.entry(entity.label.to_string()).or_insert(0) += 1;
    }
    counts
}

struct Token<'a> {
    text: &'a str,
    lower: String,
    /// Punctuation after the token ends any multi-word span.
    breaks: bool,
}

impl Token<'_> {
    fn is_capitalized(&self) -> bool {
        self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn is_number(&self) -> bool {
        is_number(self.text)
    }
}

fn is_number(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit()) && s.chars().all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn is_year(s: &str) -> bool {
    s.len() == 4 && s.parse::<u32>().is_ok_and(|y| (1000..=2999).contains(&y))
}

fn is_day(s: &str) -> bool {
    let digits = s.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    digits.parse::<u32>().is_ok_and(|d| (1..=31).contains(&d))
}

fn tokens(sentence: &str) -> Vec<Token<'_>> {
    sentence
        .split_whitespace()
        .filter_map(|raw| {
            let core = raw.trim_matches(|c: char| !(c.is_alphanumeric() || c == '$' || c == '%'));
            let core = core
                .strip_suffix("'s")
                .or_else(|| core.strip_suffix("\u{2019}s"))
                .unwrap_or(core);
            if core.is_empty() {
                return None;
            }
            let breaks = raw
                .trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | '\u{201d}'))
                .ends_with(|c: char| matches!(c, ',' | ';' | ':' | '.' | '!' | '?'));
            Some(Token { text: core, lower: core.to_lowercase(), breaks })
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct EntityRecognizer {
    resources: Arc<LanguageResources>,
}

impl EntityRecognizer {
    pub fn new(resources: Arc<LanguageResources>) -> Self {
        Self { resources }
    }

    pub fn recognize(&self, text: &str) -> Vec<Entity> {
        let mut entities = Vec::new();
        for sentence in split_sentences(text, &self.resources.abbreviations) {
            self.recognize_sentence(&tokens(sentence), &mut entities);
        }
        entities
    }

    fn recognize_sentence(&self, tokens: &[Token<'_>], out: &mut Vec<Entity>) {
        let mut i = 0;
        while i < tokens.len() {
            let matched = self
                .numeric_entity(tokens, i)
                .or_else(|| self.date_entity(tokens, i))
                .or_else(|| self.name_entity(tokens, i));
            match matched {
                Some((entity, next)) => {
                    if let Some(entity) = entity {
                        out.push(entity);
                    }
                    i = next;
                }
                None => i += 1,
            }
        }
    }

    /// Money, percentages and cardinal numbers.
    fn numeric_entity(&self, tokens: &[Token<'_>], i: usize) -> Option<(Option<Entity>, usize)> {
        let res = &self.resources;
        let token = &tokens[i];
        let next = tokens.get(i + 1).filter(|_| !token.breaks);

        if let Some(amount) = token.text.strip_prefix('$') {
            if !is_number(amount) {
                return None;
            }
            let end = match next {
                Some(n) if res.magnitudes.contains(&n.lower) => i + 2,
                _ => i + 1,
            };
            return Some((Some(span_entity(tokens, i, end, EntityLabel::Money)), end));
        }

        if let Some(value) = token.text.strip_suffix('%') {
            return is_number(value)
                .then(|| (Some(span_entity(tokens, i, i + 1, EntityLabel::Percent)), i + 1));
        }

        let numeric = token.is_number() || res.number_words.contains(&token.lower);
        if !numeric || (is_year(token.text) && i > 0 && self.is_date_context(&tokens[i - 1])) {
            return None;
        }

        let mut end = i + 1;
        while end < tokens.len()
            && !tokens[end - 1].breaks
            && (tokens[end].is_number() || res.number_words.contains(&tokens[end].lower))
        {
            end += 1;
        }
        let label = match tokens.get(end).filter(|_| !tokens[end - 1].breaks) {
            Some(t) if t.lower == "percent" => {
                end += 1;
                EntityLabel::Percent
            }
            Some(t) if res.currency_words.contains(&t.lower) => {
                end += 1;
                EntityLabel::Money
            }
            _ => EntityLabel::Cardinal,
        };
        Some((Some(span_entity(tokens, i, end, label)), end))
    }

    fn is_date_context(&self, prev: &Token<'_>) -> bool {
        matches!(prev.lower.as_str(), "in" | "since" | "by" | "until" | "from" | "during")
            || self.resources.months.contains(&prev.lower)
    }

    /// Month names with optional day and year, weekdays, relative days and years after a preposition.
    fn date_entity(&self, tokens: &[Token<'_>], i: usize) -> Option<(Option<Entity>, usize)> {
        let res = &self.resources;
        let token = &tokens[i];

        if res.weekdays.contains(&token.lower) || res.relative_dates.contains(&token.lower) {
            return Some((Some(span_entity(tokens, i, i + 1, EntityLabel::Date)), i + 1));
        }

        if is_year(token.text) && i > 0 && self.is_date_context(&tokens[i - 1]) {
            return Some((Some(span_entity(tokens, i, i + 1, EntityLabel::Date)), i + 1));
        }

        if token.is_capitalized() && res.months.contains(&token.lower) {
            let mut end = i + 1;
            if end < tokens.len() && !tokens[end - 1].breaks && is_day(tokens[end].text) {
                end += 1;
            }
            if end < tokens.len() && (!tokens[end - 1].breaks || end > i + 1) && is_year(tokens[end].text) {
                end += 1;
            }
            return Some((Some(span_entity(tokens, i, end, EntityLabel::Date)), end));
        }
        None
    }

    /// Capitalised spans classified by gazetteer, titles and organisation suffixes.
    fn name_entity(&self, tokens: &[Token<'_>], i: usize) -> Option<(Option<Entity>, usize)> {
        let res = &self.resources;
        if !tokens[i].is_capitalized() {
            return None;
        }

        let mut start = i;
        let mut titled = false;
        if res.person_titles.contains(&tokens[i].lower)
            && tokens.get(i + 1).is_some_and(Token::is_capitalized)
        {
            titled = true;
            start = i + 1;
        }

        let mut end = start + 1;
        while end < tokens.len() && !tokens[end - 1].breaks {
            let t = &tokens[end];
            if t.is_capitalized() && !res.months.contains(&t.lower) && !res.weekdays.contains(&t.lower) {
                end += 1;
            } else if matches!(t.lower.as_str(), "of" | "and" | "&" | "de")
                && !t.breaks
                && tokens.get(end + 1).is_some_and(Token::is_capitalized)
            {
                end += 2;
            } else {
                break;
            }
        }

        if !titled && start == 0 && res.gazetteer.get(&tokens[0].lower).is_none() {
            if end - start == 1 || res.is_stopword(&tokens[0].lower) {
                start += 1;
            }
        }
        if end <= start || (end - start == 1 && tokens[start].text == "I") {
            return Some((None, end));
        }

        let span_lower = tokens[start..end]
            .iter()
            .map(|t| t.lower.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let len = end - start;
        let label = if let Some(&label) = res.gazetteer.get(&span_lower) {
            label
        } else if titled {
            EntityLabel::Person
        } else if res.org_suffixes.contains(&tokens[end - 1].lower) && len > 1 {
            EntityLabel::Org
        } else if res.gazetteer.get(&tokens[start].lower) == Some(&EntityLabel::Person) {
            EntityLabel::Person
        } else if (2..=3).contains(&len) && tokens[start..end].iter().all(|t| t.text.chars().all(char::is_alphabetic)) {
            EntityLabel::Person
        } else {
            EntityLabel::Misc
        };

        Some((Some(span_entity(tokens, start, end, label)), end))
    }
}

fn span_entity(tokens: &[Token<'_>], start: usize, end: usize, label: EntityLabel) -> Entity {
    let text = tokens[start..end]
        .iter()
        .map(|t| t.text)
        .collect::<Vec<_>>()
        .join(" ");
    Entity { text, label }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognize(text: &str) -> Vec<(String, EntityLabel)> {
        EntityRecognizer::new(LanguageResources::english().shared())
            .recognize(text)
            .into_iter()
            .map(|e| (e.text, e.label))
            .collect()
    }

    fn entity(text: &str, label: EntityLabel) -> (String, EntityLabel) {
        (text.to_string(), label)
    }

    #[test]
    fn test_people_and_places() {
        assert_eq!(
            recognize("Dr. Smith flew from London to Paris on Monday."),
            vec![
                entity("Smith", EntityLabel::Person),
                entity("London", EntityLabel::Gpe),
                entity("Paris", EntityLabel::Gpe),
                entity("Monday", EntityLabel::Date),
            ]
        );
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(
            recognize("Google paid $5 million, roughly 12% more than in 2019."),
            vec![
                entity("Google", EntityLabel::Org),
                entity("$5 million", EntityLabel::Money),
                entity("12%", EntityLabel::Percent),
                entity("2019", EntityLabel::Date),
            ]
        );
        assert_eq!(
            recognize("We sold three hundred units for 40 dollars."),
            vec![
                entity("three hundred", EntityLabel::Cardinal),
                entity("40 dollars", EntityLabel::Money),
            ]
        );
    }

    #[test]
    fn test_multiword_names() {
        assert_eq!(
            recognize("The United Nations met three American officials."),
            vec![
                entity("United Nations", EntityLabel::Org),
                entity("three", EntityLabel::Cardinal),
                entity("American", EntityLabel::Norp),
            ]
        );
        assert_eq!(
            recognize("I think Jane Doe works at Acme Corp."),
            vec![
                entity("Jane Doe", EntityLabel::Person),
                entity("Acme Corp", EntityLabel::Org),
            ]
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(
            recognize("The launch is on March 3rd, 2021 and ends tomorrow."),
            vec![
                entity("March 3rd 2021", EntityLabel::Date),
                entity("tomorrow", EntityLabel::Date),
            ]
        );
    }

    #[test]
    fn test_sentence_initial_words_are_not_entities() {
        assert!(recognize("This is a test. Testing the module should work.").is_empty());
        assert!(recognize("").is_empty());
    }

    #[test]
    fn test_count_by_label() {
        let entities = vec![
            Entity { text: "Paris".into(), label: EntityLabel::Gpe },
            Entity { text: "Rome".into(), label: EntityLabel::Gpe },
            Entity { text: "2".into(), label: EntityLabel::Cardinal },
        ];
        let counts = count_by_label(&entities);
        assert_eq!(counts.get("GPE"), Some(&2));
        assert_eq!(counts.get("CARDINAL"), Some(&1));
        assert_eq!(counts.keys().cloned().collect::<Vec<_>>(), vec!["CARDINAL", "GPE"]);
    }
}
