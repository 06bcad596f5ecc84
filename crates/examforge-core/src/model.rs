//! Core data model types for examforge.
//!
//! These are the fundamental types that the entire examforge system uses to
//! represent questions, papers, and learner submissions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
#[error("unknown question type: {0}")]
pub struct ParseQuestionTypeError(String);

#[derive(Debug, Error)]
#[error("unknown difficulty: {0}")]
pub struct ParseDifficultyError(String);

/// The kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    ShortAnswer,
    Descriptive,
}

impl QuestionType {
    /// Free-text questions are scored with partial credit; single-choice
    /// questions are all-or-nothing.
    pub fn is_free_text(self) -> bool {
        matches!(self, QuestionType::ShortAnswer | QuestionType::Descriptive)
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::SingleChoice => write!(f, "single_choice"),
            QuestionType::ShortAnswer => write!(f, "short_answer"),
            QuestionType::Descriptive => write!(f, "descriptive"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = ParseQuestionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single_choice" | "mcq" => Ok(QuestionType::SingleChoice),
            "short_answer" => Ok(QuestionType::ShortAnswer),
            "descriptive" | "essay" => Ok(QuestionType::Descriptive),
            other => Err(ParseQuestionTypeError(other.to_string())),
        }
    }
}

/// Difficulty tier of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ParseDifficultyError(other.to_string())),
        }
    }
}

/// Where a question came from, kept for audit and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Hand-authored question from the static content bank.
    Bank,
    /// Deterministic template fallback.
    Template,
    /// Produced by the generative-text capability.
    Generated,
}

/// A single exam question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// The question text shown to the learner.
    pub text: String,
    /// Answer format.
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    /// Point value. Overwritten at assembly time by the section's
    /// `marks_per_question`.
    pub marks: u32,
    /// Choice key → choice text. Present only for single-choice questions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, String>,
    /// Key of the correct option. Present only for single-choice questions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_choice: Option<String>,
    /// Model answer for free-text questions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sample_answer: String,
    /// Points the answer is expected to cover, for free-text questions.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key_points: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub provenance: Provenance,
}

impl Question {
    /// Checks the structural invariant for this question's type: a
    /// single-choice question carries at least two options and a correct key
    /// that is one of them; free-text questions carry no options.
    pub fn is_well_formed(&self) -> bool {
        if self.text.trim().is_empty() {
            return false;
        }
        match self.question_type {
            QuestionType::SingleChoice => {
                self.options.len() >= 2
                    && self
                        .correct_choice
                        .as_ref()
                        .is_some_and(|key| self.options.contains_key(key))
            }
            QuestionType::ShortAnswer | QuestionType::Descriptive => self.options.is_empty(),
        }
    }
}

/// A titled group of questions within a paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    pub questions: Vec<Question>,
    /// Uniform point value applied to every question in this section.
    pub marks_per_question: u32,
    /// Always `questions.len() * marks_per_question`.
    pub total_marks: u32,
}

impl Section {
    /// True when assembly collected fewer questions than the section config
    /// requested. Assembly never fails on a shortfall; callers that need a
    /// strict count check this themselves.
    pub fn is_short(&self, requested: usize) -> bool {
        self.questions.len() < requested
    }
}

/// An assembled question paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    /// Exam duration in minutes.
    pub duration_minutes: u32,
    #[serde(default)]
    pub instructions: Vec<String>,
    pub language: String,
    pub sections: Vec<Section>,
    /// Always recomputed as the sum of section totals, never supplied.
    pub total_marks: u32,
    pub created_at: DateTime<Utc>,
}

/// Configuration for assembling one paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperConfig {
    pub title: String,
    pub subject: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    pub sections: Vec<SectionConfig>,
}

/// Configuration for one section of a paper.
///
/// Either `questions` supplies a pre-built list (pre-selected from the bank
/// or pre-generated), or the assembler blends bank and generated questions
/// according to `ai_ratio`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionConfig {
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub count: usize,
    #[serde(default = "default_marks")]
    pub marks_per_question: u32,
    /// Fraction of `count` to source from the generator, in [0.0, 1.0].
    #[serde(default = "default_ai_ratio")]
    pub ai_ratio: f64,
    /// Pre-built question list; bypasses the blend step entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<Question>>,
}

fn default_duration() -> u32 {
    60
}

fn default_language() -> String {
    "en".to_string()
}

fn default_marks() -> u32 {
    1
}

fn default_ai_ratio() -> f64 {
    0.5
}

/// Builds the stable per-question identifier used by submissions.
pub fn question_key(section_index: usize, question_index: usize) -> String {
    format!("section_{section_index}_question_{question_index}")
}

/// A learner's submitted answers, keyed by [`question_key`].
///
/// Created once per exam attempt and treated as immutable by the evaluator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    answers: HashMap<String, String>,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, section_index: usize, question_index: usize, answer: &str) {
        self.answers
            .insert(question_key(section_index, question_index), answer.to_string());
    }

    /// Returns the raw answer for a question, or `""` when unanswered.
    pub fn answer(&self, section_index: usize, question_index: usize) -> &str {
        self.answers
            .get(&question_key(section_index, question_index))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl FromIterator<(String, String)> for Submission {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            answers: iter.into_iter().collect(),
        }
    }
}
