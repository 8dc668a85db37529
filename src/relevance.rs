use crate::error::{ClockError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Keyword lists for one topic.
///
/// `phrases` are matched as case-insensitive substrings anywhere in the text.
/// `acronyms` are short tokens that only count on word boundaries, so that
/// `AI` does not fire inside `AVAILABILITY`. A list left out of a config
/// section keeps the AI/ML default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordConfig {
    pub phrases: Vec<String>,
    pub acronyms: Vec<String>,
}

impl KeywordConfig {
    /// The AI/ML keyword set used by the cyber incident clock.
    pub fn ai_ml() -> Self {
        let phrases = [
            "artificial intelligence",
            "machine learning",
            "neural network",
            "deep learning",
            "ai-powered",
            "ai-assisted",
            "large language model",
            "generative ai",
            "computer vision",
            "autonomous",
            "deepfake",
            "chatbot",
        ];
        Self {
            phrases: phrases.iter().map(|s| s.to_string()).collect(),
            acronyms: vec!["AI".into(), "LLM".into(), "GPT".into()],
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self::ai_ml()
    }
}

#[derive(Debug, Clone)]
pub struct RelevanceClassifier {
    phrases: Vec<String>,
    acronyms: Option<Regex>,
}

impl RelevanceClassifier {
    pub fn new(config: &KeywordConfig) -> Result<Self> {
        let phrases = config
            .phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let alternatives: Vec<String> = config
            .acronyms
            .iter()
            .map(|a| a.trim())
            .filter(|a| !a.is_empty())
            .map(regex::escape)
            .collect();
        let acronyms = if alternatives.is_empty() {
            None
        } else {
            let pattern = RegexBuilder::new(&format!(r"\b(?:{})\b", alternatives.join("|")))
                .case_insensitive(true)
                .build()
                .map_err(|e| ClockError::Config(format!("Invalid acronym keywords: {}", e)))?;
            Some(pattern)
        };

        Ok(Self { phrases, acronyms })
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        if self.phrases.iter().any(|p| lower.contains(p.as_str())) {
            return true;
        }
        self.acronyms
            .as_ref()
            .map_or(false, |re| re.is_match(text))
    }
}

impl Default for RelevanceClassifier {
    fn default() -> Self {
        Self::new(&KeywordConfig::default()).expect("built-in acronym pattern")
    }
}
