//! Static content bank: TOML-backed, read-only question store.
//!
//! The built-in bank ships inside the crate; additional banks can be loaded
//! from TOML files or directories and merged in before the bank is shared.
//! Once constructed the bank is never mutated, so concurrent queries need no
//! locking.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::model::{Difficulty, Provenance, Question, QuestionType};

const BUILTIN_BANK: &str = include_str!("../bank/questions.toml");

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    #[serde(default)]
    questions: Vec<TomlBankQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankQuestion {
    subject: String,
    topic: String,
    difficulty: String,
    #[serde(rename = "type")]
    question_type: String,
    text: String,
    #[serde(default)]
    options: BTreeMap<String, String>,
    #[serde(default)]
    correct_choice: Option<String>,
    #[serde(default)]
    sample_answer: String,
    #[serde(default)]
    key_points: String,
    #[serde(default)]
    explanation: String,
    #[serde(default = "default_marks")]
    marks: u32,
    #[serde(default)]
    tags: Vec<String>,
}

fn default_marks() -> u32 {
    1
}

/// Conjunctive filter set for [`ContentBank::query`]. Omitted filters pass
/// everything.
#[derive(Debug, Clone, Default)]
pub struct BankQuery {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub question_type: Option<QuestionType>,
    pub tags: Option<Vec<String>>,
    /// When more questions match than `limit`, a uniform random sample of
    /// exactly `limit` is returned.
    pub limit: Option<usize>,
}

/// Breakdown counts returned by [`ContentBank::stats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankStats {
    pub total: usize,
    pub by_subject: HashMap<String, usize>,
    pub by_difficulty: HashMap<String, usize>,
    pub by_type: HashMap<String, usize>,
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// Text of the offending question.
    pub question: String,
    pub message: String,
}

/// In-memory, read-only store of hand-authored questions.
#[derive(Debug, Clone)]
pub struct ContentBank {
    questions: Vec<Question>,
}

/// Maps a display subject name to its internal key. The five known subjects
/// have a fixed mapping; anything else falls back to the lower-cased literal.
pub fn normalize_subject(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    if lower == "computer science" {
        return "computer_science".to_string();
    }
    lower
}

impl ContentBank {
    /// The bank shipped with the crate.
    pub fn builtin() -> Self {
        Self::from_toml_str(BUILTIN_BANK).expect("built-in question bank is valid TOML")
    }

    /// Parse a bank from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let parsed: TomlBankFile = toml::from_str(content).context("failed to parse bank TOML")?;

        let questions = parsed
            .questions
            .into_iter()
            .map(|q| {
                let difficulty: Difficulty = q.difficulty.parse()?;
                let question_type: QuestionType = q.question_type.parse()?;

                Ok(Question {
                    text: q.text,
                    question_type,
                    subject: normalize_subject(&q.subject),
                    topic: q.topic.to_lowercase(),
                    difficulty,
                    marks: q.marks,
                    options: q.options,
                    correct_choice: q.correct_choice,
                    sample_answer: q.sample_answer,
                    key_points: q.key_points,
                    explanation: q.explanation,
                    tags: q.tags,
                    provenance: Provenance::Bank,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { questions })
    }

    /// Load a bank from a single TOML file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read bank file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse bank file: {}", path.display()))
    }

    /// Recursively load and merge all `.toml` bank files from a directory.
    /// Files that fail to parse are skipped with a warning.
    pub fn load_directory(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("not a directory: {}", dir.display());
        }

        let mut questions = Vec::new();
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_dir() {
                questions.extend(Self::load_directory(&path)?.questions);
            } else if path.extension().is_some_and(|ext| ext == "toml") {
                match Self::load_file(&path) {
                    Ok(bank) => questions.extend(bank.questions),
                    Err(e) => {
                        tracing::warn!("skipping {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(Self { questions })
    }

    /// Merge another bank's questions into this one. Only useful before the
    /// bank is shared; queries never mutate.
    pub fn merge(&mut self, other: ContentBank) {
        self.questions.extend(other.questions);
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Retrieve questions matching the query. Filters are conjunctive; when
    /// `limit` is set and more questions match, a uniform random sample of
    /// exactly `limit` questions is returned, so repeated calls may differ.
    pub fn query(&self, query: &BankQuery) -> Vec<Question> {
        let subject = query.subject.as_deref().map(normalize_subject);

        let matches: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| {
                if let Some(subject) = &subject {
                    if !q.subject.eq_ignore_ascii_case(subject) {
                        return false;
                    }
                }
                if let Some(topic) = &query.topic {
                    if !q.topic.eq_ignore_ascii_case(topic) {
                        return false;
                    }
                }
                if let Some(difficulty) = query.difficulty {
                    if q.difficulty != difficulty {
                        return false;
                    }
                }
                if let Some(question_type) = query.question_type {
                    if q.question_type != question_type {
                        return false;
                    }
                }
                if let Some(tags) = &query.tags {
                    let matched = tags.iter().any(|tag| {
                        q.tags.iter().any(|have| have.eq_ignore_ascii_case(tag))
                    });
                    if !matched {
                        return false;
                    }
                }
                true
            })
            .collect();

        match query.limit {
            Some(limit) if matches.len() > limit => {
                let mut rng = rand::thread_rng();
                matches
                    .choose_multiple(&mut rng, limit)
                    .map(|q| (*q).clone())
                    .collect()
            }
            _ => matches.into_iter().cloned().collect(),
        }
    }

    /// Total count and breakdowns by subject, difficulty, and type. Derived
    /// by full traversal on every call; the dataset is tiny.
    pub fn stats(&self) -> BankStats {
        let mut stats = BankStats {
            total: self.questions.len(),
            by_subject: HashMap::new(),
            by_difficulty: HashMap::new(),
            by_type: HashMap::new(),
        };

        for q in &self.questions {
            *stats.by_subject.entry(q.subject.clone()).or_default() += 1;
            *stats
                .by_difficulty
                .entry(q.difficulty.to_string())
                .or_default() += 1;
            *stats
                .by_type
                .entry(q.question_type.to_string())
                .or_default() += 1;
        }

        stats
    }

    /// Check every question against its structural invariant.
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for q in &self.questions {
            if !q.is_well_formed() {
                let message = match q.question_type {
                    QuestionType::SingleChoice => {
                        "single-choice question needs at least two options and a correct key among them"
                    }
                    _ => "free-text question must not carry options",
                };
                warnings.push(ValidationWarning {
                    question: q.text.clone(),
                    message: message.into(),
                });
            }
            if q.marks == 0 {
                warnings.push(ValidationWarning {
                    question: q.text.clone(),
                    message: "question has zero marks".into(),
                });
            }
        }

        warnings
    }
}
