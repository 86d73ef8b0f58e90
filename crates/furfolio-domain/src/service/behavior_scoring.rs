//! Keyword classification of groomer behavior notes

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::model::PetBehaviorLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorCategory {
    Aggressive,
    Anxious,
    Hyperactive,
    Calm,
    Neutral,
}

impl BehaviorCategory {
    /// Default priority order, most severe first
    pub const ALL: [BehaviorCategory; 5] = [
        BehaviorCategory::Aggressive,
        BehaviorCategory::Anxious,
        BehaviorCategory::Hyperactive,
        BehaviorCategory::Calm,
        BehaviorCategory::Neutral,
    ];

    pub fn severity(&self) -> u8 {
        match self {
            BehaviorCategory::Aggressive => 3,
            BehaviorCategory::Anxious => 2,
            BehaviorCategory::Hyperactive => 1,
            BehaviorCategory::Calm | BehaviorCategory::Neutral => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BehaviorCategory::Aggressive => "aggressive",
            BehaviorCategory::Anxious => "anxious",
            BehaviorCategory::Hyperactive => "hyperactive",
            BehaviorCategory::Calm => "calm",
            BehaviorCategory::Neutral => "neutral",
        }
    }
}

/// Keywords that put a note into `category`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub category: BehaviorCategory,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn new(category: BehaviorCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

fn default_rules() -> Vec<KeywordRule> {
    vec![
        KeywordRule::new(
            BehaviorCategory::Aggressive,
            &[
                "aggressive", "aggression", "bite", "bites", "bit", "biting", "bitten", "nip",
                "nipped", "nipping", "snap", "snapped", "snapping", "growl", "growled",
                "growling", "lunge", "lunged", "lunging", "snarl", "snarled", "attack",
                "attacked", "muzzle", "muzzled",
            ],
        ),
        KeywordRule::new(
            BehaviorCategory::Anxious,
            &[
                "anxious", "anxiety", "nervous", "scared", "afraid", "fearful", "shaking",
                "shook", "trembling", "shivering", "whining", "whined", "cowering", "panting",
                "stressed", "panic", "panicked", "hiding",
            ],
        ),
        KeywordRule::new(
            BehaviorCategory::Hyperactive,
            &[
                "hyper", "hyperactive", "energetic", "jumpy", "jumping", "restless", "wiggly",
                "squirmy", "squirming", "zoomies", "excited", "barking",
            ],
        ),
        KeywordRule::new(
            BehaviorCategory::Calm,
            &[
                "calm", "relaxed", "gentle", "friendly", "sweet", "cooperative", "patient",
                "easygoing", "good boy", "good girl", "well behaved", "sleepy",
            ],
        ),
    ]
}

/// Lowercased alphanumeric tokens; apostrophes are dropped so "won't" is
/// one token
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace(['\'', '\u{2019}'], "")
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Ordered keyword table. The first rule with a matching keyword decides
/// the category; notes matching nothing get `fallback`.
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    /// (category, tokenized keyword phrases) in priority order
    rules: Vec<(BehaviorCategory, Vec<Vec<String>>)>,
    fallback: BehaviorCategory,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl KeywordClassifier {
    /// Build from rules in priority order. Keywords may be phrases; they
    /// match whole consecutive words, case-insensitively.
    pub fn new(rules: Vec<KeywordRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let phrases = rule
                    .keywords
                    .iter()
                    .map(|k| tokenize(k))
                    .filter(|p| !p.is_empty())
                    .collect();
                (rule.category, phrases)
            })
            .collect();
        Self {
            rules,
            fallback: BehaviorCategory::Neutral,
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn classify(&self, note: &str) -> BehaviorCategory {
        let tokens = tokenize(note);
        if tokens.is_empty() {
            return self.fallback;
        }
        for (category, phrases) in &self.rules {
            let hit = phrases.iter().any(|phrase| {
                tokens
                    .windows(phrase.len())
                    .any(|window| window == phrase.as_slice())
            });
            if hit {
                return *category;
            }
        }
        self.fallback
    }
}

fn default_classifier() -> &'static KeywordClassifier {
    static DEFAULT: OnceLock<KeywordClassifier> = OnceLock::new();
    DEFAULT.get_or_init(KeywordClassifier::default)
}

/// Classify with the built-in keyword table
pub fn classify_note(note: &str) -> BehaviorCategory {
    default_classifier().classify(note)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: BehaviorCategory,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSummary {
    pub total_logs: usize,
    /// One entry per category, most severe first
    pub counts: Vec<CategoryCount>,
    pub average_severity: f64,
    /// Most frequent category; ties go to the more severe one
    pub dominant: Option<BehaviorCategory>,
    pub latest: Option<BehaviorCategory>,
    pub latest_at: Option<NaiveDateTime>,
    pub needs_attention: bool,
}

/// Summarize a set of notes (usually one dog's)
pub fn score_logs(logs: &[PetBehaviorLog], classifier: &KeywordClassifier) -> BehaviorSummary {
    let mut counts: HashMap<BehaviorCategory, usize> = HashMap::new();
    let mut severity_sum = 0u64;
    let mut latest: Option<(NaiveDateTime, BehaviorCategory)> = None;

    for log in logs {
        let category = classifier.classify(&log.note);
        *counts.entry(category).or_insert(0) += 1;
        severity_sum += u64::from(category.severity());
        if latest.map_or(true, |(at, _)| log.timestamp >= at) {
            latest = Some((log.timestamp, category));
        }
    }

    let counts: Vec<CategoryCount> = BehaviorCategory::ALL
        .iter()
        .map(|&category| CategoryCount {
            category,
            count: counts.get(&category).copied().unwrap_or(0),
        })
        .collect();

    // ALL is most-severe-first, so keeping the first maximum breaks ties upward
    let dominant = counts
        .iter()
        .filter(|c| c.count > 0)
        .fold(None::<CategoryCount>, |best, c| match best {
            Some(b) if b.count >= c.count => Some(b),
            _ => Some(*c),
        })
        .map(|c| c.category);

    let average_severity = if logs.is_empty() {
        0.0
    } else {
        severity_sum as f64 / logs.len() as f64
    };
    let attention_level = f64::from(BehaviorCategory::Anxious.severity());
    let needs_attention = average_severity >= attention_level
        || latest.is_some_and(|(_, c)| f64::from(c.severity()) >= attention_level);

    BehaviorSummary {
        total_logs: logs.len(),
        counts,
        average_severity,
        dominant,
        latest: latest.map(|(_, c)| c),
        latest_at: latest.map(|(at, _)| at),
        needs_attention,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DogBehavior {
    pub dog_id: String,
    pub summary: BehaviorSummary,
}

/// Group notes by dog and summarize each, ordered by dog id
pub fn score_by_dog(logs: &[PetBehaviorLog], classifier: &KeywordClassifier) -> Vec<DogBehavior> {
    let mut by_dog: HashMap<&str, Vec<PetBehaviorLog>> = HashMap::new();
    for log in logs {
        by_dog.entry(log.dog_id.as_str()).or_default().push(log.clone());
    }
    let mut dogs: Vec<DogBehavior> = by_dog
        .into_iter()
        .map(|(dog_id, logs)| DogBehavior {
            dog_id: dog_id.to_string(),
            summary: score_logs(&logs, classifier),
        })
        .collect();
    dogs.sort_by(|a, b| a.dog_id.cmp(&b.dog_id));
    dogs
}
