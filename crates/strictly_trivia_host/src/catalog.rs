//! Question catalog shapes and lookup.
//!
//! Rounds only carry a [`QuestionRef`]. The catalog owns the question
//! content and resolves ids for the registry.

use crate::HostError;
use derive_getters::Getters;
use derive_new::new;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strictly_trivia::QuestionRef;
use strum::{Display, EnumIter, FromRepr};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Kind of question asked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionType {
    /// Pick one of several choices.
    MultipleChoice,
    /// Pick true or false.
    TrueOrFalse,
    /// Type any answer.
    FreeForm,
}

/// How hard a question is, from 1 to 5.
///
/// Stored as the bare level number.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
#[serde(try_from = "u8", into = "u8")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionDifficultyLevel {
    /// Level 1.
    VeryEasy = 1,
    /// Level 2.
    Easy = 2,
    /// Level 3.
    #[default]
    Medium = 3,
    /// Level 4.
    Hard = 4,
    /// Level 5.
    VeryHard = 5,
}

impl QuestionDifficultyLevel {
    /// Numeric level, 1 through 5.
    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for QuestionDifficultyLevel {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_repr(level)
            .ok_or_else(|| format!("difficulty level must be 1 to 5, got {}", level))
    }
}

impl From<QuestionDifficultyLevel> for u8 {
    fn from(difficulty: QuestionDifficultyLevel) -> Self {
        difficulty.level()
    }
}

/// Media type of question or choice content.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    /// Plain text.
    #[default]
    Text,
    /// Image reference.
    Image,
    /// Audio reference.
    Audio,
    /// Video reference.
    Video,
}

/// Reusable grouping for questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct QuestionCategory {
    id: Uuid,
    name: String,
}

/// Reusable label for questions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct QuestionTag {
    name: String,
}

/// One selectable answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct AnswerChoice {
    id: Uuid,
    /// Short key such as "A" or "B".
    label: String,
    answer: String,
    content_type: ContentType,
    content: String,
    question_id: Uuid,
}

/// A trivia question with its choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Question {
    id: Uuid,
    text: String,
    question_type: QuestionType,
    difficulty: QuestionDifficultyLevel,
    content: String,
    content_type: ContentType,
    category_id: Uuid,
    #[new(default)]
    #[serde(default)]
    tags: Vec<QuestionTag>,
    #[new(default)]
    #[serde(default)]
    choices: Vec<AnswerChoice>,
}

impl Question {
    /// Adds a tag.
    pub fn with_tag(mut self, tag: QuestionTag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Adds a choice, linking it to this question.
    pub fn with_choice(mut self, label: impl Into<String>, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        self.choices.push(AnswerChoice::new(
            Uuid::new_v4(),
            label.into(),
            answer.clone(),
            ContentType::Text,
            answer,
            self.id,
        ));
        self
    }

    /// Reference carried by rounds that ask this question.
    pub fn question_ref(&self) -> QuestionRef {
        QuestionRef::new(self.id)
    }
}

/// Resolves question ids for new rounds.
pub trait QuestionProvider {
    /// Returns a reference to the question, or `UnknownQuestion`.
    fn resolve(&self, question_id: Uuid) -> Result<QuestionRef, HostError>;
}

/// Catalog held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    questions: HashMap<Uuid, Question>,
    categories: HashMap<Uuid, QuestionCategory>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a question, replacing any with the same id.
    #[instrument(skip_all, fields(question_id = %question.id()))]
    pub fn insert(&mut self, question: Question) {
        debug!("Adding question to catalog");
        self.questions.insert(*question.id(), question);
    }

    /// Adds a category, replacing any with the same id.
    pub fn insert_category(&mut self, category: QuestionCategory) {
        self.categories.insert(*category.id(), category);
    }

    /// Category the question is filed under, if the catalog knows it.
    pub fn category_of(&self, question: &Question) -> Option<&QuestionCategory> {
        self.categories.get(question.category_id())
    }

    /// Looks up a question.
    pub fn get(&self, question_id: &Uuid) -> Option<&Question> {
        self.questions.get(question_id)
    }

    /// Number of questions held.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// True when the catalog holds no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl FromIterator<Question> for InMemoryCatalog {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for question in iter {
            catalog.insert(question);
        }
        catalog
    }
}

impl QuestionProvider for InMemoryCatalog {
    fn resolve(&self, question_id: Uuid) -> Result<QuestionRef, HostError> {
        self.questions
            .get(&question_id)
            .map(Question::question_ref)
            .ok_or(HostError::UnknownQuestion(question_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn capital_question() -> Question {
        Question::new(
            Uuid::new_v4(),
            "What is the capital of France?".to_string(),
            QuestionType::MultipleChoice,
            QuestionDifficultyLevel::Easy,
            "What is the capital of France?".to_string(),
            ContentType::Text,
            Uuid::new_v4(),
        )
        .with_tag(QuestionTag::new("geography".to_string()))
        .with_choice("A", "Paris")
        .with_choice("B", "Lyon")
    }

    #[test]
    fn test_difficulty_levels_are_one_through_five() {
        let levels: Vec<u8> = QuestionDifficultyLevel::iter().map(|d| d.level()).collect();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_choices_link_back_to_question() {
        let question = capital_question();
        assert_eq!(question.choices().len(), 2);
        assert!(question.choices().iter().all(|c| c.question_id() == question.id()));
    }

    #[test]
    fn test_catalog_resolves_known_question() {
        let question = capital_question();
        let id = *question.id();
        let catalog: InMemoryCatalog = [question].into_iter().collect();
        assert_eq!(catalog.resolve(id).unwrap(), QuestionRef::new(id));
    }

    #[test]
    fn test_catalog_rejects_unknown_question() {
        let catalog = InMemoryCatalog::new();
        let id = Uuid::new_v4();
        assert_eq!(catalog.resolve(id), Err(HostError::UnknownQuestion(id)));
    }

    #[test]
    fn test_category_lookup() {
        let question = capital_question();
        let mut catalog = InMemoryCatalog::new();
        assert!(catalog.category_of(&question).is_none());

        catalog.insert_category(QuestionCategory::new(
            *question.category_id(),
            "Geography".to_string(),
        ));
        assert_eq!(catalog.category_of(&question).unwrap().name(), "Geography");
    }

    #[test]
    fn test_question_serializes_enums() {
        let json = serde_json::to_value(capital_question()).unwrap();
        assert_eq!(json["question_type"], "multiple_choice");
        assert_eq!(json["difficulty"], 2);
    }

    #[test]
    fn test_difficulty_reads_level_number() {
        let hard: QuestionDifficultyLevel = serde_json::from_str("4").unwrap();
        assert_eq!(hard, QuestionDifficultyLevel::Hard);
        assert!(serde_json::from_str::<QuestionDifficultyLevel>("6").is_err());
        assert!(serde_json::from_str::<QuestionDifficultyLevel>("\"hard\"").is_err());
        assert_eq!(QuestionDifficultyLevel::default(), QuestionDifficultyLevel::Medium);
    }
}
