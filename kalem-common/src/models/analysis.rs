//! Structured output of the writing analysis, in the shape the model is asked
//! to produce it.
//!
//! Field names on the wire follow the instruction contract (`type`,
//! `explanation_de`, `suggested_deyimler`, ...). The camelCase names used by
//! older clients are accepted as aliases on input.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Treats an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Correction / mistake category. Unknown labels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Grammar,
    Vocabulary,
    WordChoice,
    Style,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Category::Grammar => "grammar",
            Category::Vocabulary => "vocabulary",
            Category::WordChoice => "word_choice",
            Category::Style => "style",
            Category::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "grammar" => Category::Grammar,
            "vocabulary" => Category::Vocabulary,
            "word_choice" => Category::WordChoice,
            "style" => Category::Style,
            _ => Category::Other(s),
        }
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::from(s.to_string())
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        match c {
            Category::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    #[serde(default, deserialize_with = "null_as_default")]
    pub original: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub corrected: String,
    #[serde(rename = "type", alias = "category", default, deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(rename = "explanation_de", alias = "explanation", default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

/// The three registers every analysis rewrites the text into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Formal,
    Colloquial,
    Sophisticated,
}

impl Register {
    pub const ALL: [Register; 3] = [Register::Formal, Register::Colloquial, Register::Sophisticated];

    pub fn wire_key(&self) -> &'static str {
        match self {
            Register::Formal => "business_formal",
            Register::Colloquial => "colloquial_smart",
            Register::Sophisticated => "c1_sophisticated",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variants {
    #[serde(alias = "formal", default, deserialize_with = "null_as_default")]
    pub business_formal: String,
    #[serde(alias = "colloquial", default, deserialize_with = "null_as_default")]
    pub colloquial_smart: String,
    #[serde(alias = "sophisticated", default, deserialize_with = "null_as_default")]
    pub c1_sophisticated: String,
}

impl Variants {
    /// The rewrite for `register`, or `None` when the model left it empty.
    pub fn get(&self, register: Register) -> Option<&str> {
        let text = match register {
            Register::Formal => &self.business_formal,
            Register::Colloquial => &self.colloquial_smart,
            Register::Sophisticated => &self.c1_sophisticated,
        };
        if text.trim().is_empty() { None } else { Some(text.as_str()) }
    }

    pub fn missing_registers(&self) -> Vec<Register> {
        Register::ALL
            .into_iter()
            .filter(|r| self.get(*r).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedIdiom {
    #[serde(rename = "deyim", alias = "idiom", default, deserialize_with = "null_as_default")]
    pub idiom: String,
    #[serde(rename = "meaning_de", alias = "meaningInNativeLanguage", alias = "meaning", default, deserialize_with = "null_as_default")]
    pub meaning: String,
    #[serde(rename = "usage", alias = "usageNote", default, deserialize_with = "null_as_default")]
    pub usage_note: String,
    #[serde(alias = "exampleInContext", default, deserialize_with = "null_as_default")]
    pub example_in_context: String,
}

/// A recurring error the model spotted. Only used to update mistake statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MistakePattern {
    #[serde(rename = "pattern", alias = "patternDescription", default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", alias = "category", default, deserialize_with = "null_as_default")]
    pub category: Category,
    #[serde(alias = "exampleWrong", default, deserialize_with = "null_as_default")]
    pub example_wrong: String,
    #[serde(alias = "exampleCorrect", default, deserialize_with = "null_as_default")]
    pub example_correct: String,
}

/// A validated analysis, as returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub corrections: Vec<Correction>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub variants: Variants,
    #[serde(rename = "suggested_deyimler", alias = "suggestedIdioms", default, deserialize_with = "null_as_default")]
    pub suggested_idioms: Vec<SuggestedIdiom>,
    #[serde(alias = "mistakePatterns", default, deserialize_with = "null_as_default")]
    pub mistake_patterns: Vec<MistakePattern>,
}

/// The stored form of an [`Analysis`]. Mistake patterns are not kept here;
/// they live on as mistake statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub analysis_id: Uuid,
    pub exercise_id: Uuid,
    pub corrections: Vec<Correction>,
    pub variants: Variants,
    pub suggested_idioms: Vec<SuggestedIdiom>,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn from_analysis(exercise_id: Uuid, analysis: &Analysis, created_at: DateTime<Utc>) -> Self {
        Self {
            analysis_id: Uuid::new_v4(),
            exercise_id,
            corrections: analysis.corrections.clone(),
            variants: analysis.variants.clone(),
            suggested_idioms: analysis.suggested_idioms.clone(),
            created_at,
        }
    }
}
