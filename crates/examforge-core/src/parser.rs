//! Line-prefix parsers for generative-text responses.
//!
//! Both parsers are best-effort: malformed blocks are dropped or yield
//! empty-string fields rather than failing the whole batch, and a line that
//! matches no recognized prefix continues the previously opened field.

use std::collections::BTreeMap;

use crate::model::{Difficulty, Provenance, Question, QuestionType};

/// Shared metadata stamped onto every question parsed from one response.
#[derive(Debug, Clone)]
pub struct QuestionContext {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub provenance: Provenance,
}

/// The field currently accepting continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    /// No field opened yet; unrecognized lines extend the question text.
    QuestionText,
    Option(String),
    CorrectAnswer,
    Explanation,
    SampleAnswer,
    KeyPoints,
}

#[derive(Debug)]
struct QuestionDraft {
    text: String,
    question_type: QuestionType,
    options: BTreeMap<String, String>,
    correct_choice: String,
    explanation: String,
    sample_answer: String,
    key_points: String,
    field: Field,
}

impl QuestionDraft {
    fn new(text: String, question_type: QuestionType) -> Self {
        Self {
            text,
            question_type,
            options: BTreeMap::new(),
            correct_choice: String::new(),
            explanation: String::new(),
            sample_answer: String::new(),
            key_points: String::new(),
            field: Field::QuestionText,
        }
    }

    fn append_to_open_field(&mut self, line: &str) {
        let target = match &self.field {
            Field::QuestionText => &mut self.text,
            Field::Option(key) => match self.options.get_mut(key.as_str()) {
                Some(value) => value,
                None => return,
            },
            Field::CorrectAnswer => &mut self.correct_choice,
            Field::Explanation => &mut self.explanation,
            Field::SampleAnswer => &mut self.sample_answer,
            Field::KeyPoints => &mut self.key_points,
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(line);
    }

    fn finish(self, ctx: &QuestionContext) -> Question {
        let is_choice = self.question_type == QuestionType::SingleChoice;
        Question {
            text: self.text,
            question_type: self.question_type,
            subject: ctx.subject.clone(),
            topic: ctx.topic.clone(),
            difficulty: ctx.difficulty,
            marks: 1,
            options: if is_choice { self.options } else { BTreeMap::new() },
            correct_choice: if is_choice && !self.correct_choice.is_empty() {
                Some(self.correct_choice)
            } else {
                None
            },
            sample_answer: self.sample_answer,
            key_points: self.key_points,
            explanation: self.explanation,
            tags: vec![],
            provenance: ctx.provenance,
        }
    }
}

/// Does this line open a new question block (`Q<n>:` marker)?
fn question_marker(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('Q')?;
    let colon = rest.find(':')?;
    if colon == 0 || !rest[..colon].chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(rest[colon + 1..].trim_start())
}

/// Does this line introduce a choice option (`A)`, `b)`, ...)? Returns the
/// lower-cased key and the option text.
fn option_marker(line: &str) -> Option<(String, &str)> {
    let mut chars = line.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_alphabetic() || chars.next()? != ')' {
        return None;
    }
    Some((
        letter.to_ascii_lowercase().to_string(),
        line[2..].trim_start(),
    ))
}

fn field_value<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix).map(str::trim_start)
}

/// Parse a batch of generated questions.
///
/// When `fixed_type` is set, every block is read as that type. When it is
/// `None` (title-driven generation), each block's `Type:` line decides, with
/// single-choice as the default. Malformed blocks are dropped; the caller
/// falls back to templates when nothing well-formed survives.
pub fn parse_question_batch(
    text: &str,
    fixed_type: Option<QuestionType>,
    ctx: &QuestionContext,
) -> Vec<Question> {
    let mut questions = Vec::new();
    let mut draft: Option<QuestionDraft> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line == "---" {
            continue;
        }

        if let Some(question_text) = question_marker(line) {
            if let Some(done) = draft.take() {
                questions.push(done);
            }
            draft = Some(QuestionDraft::new(
                question_text.to_string(),
                fixed_type.unwrap_or(QuestionType::SingleChoice),
            ));
            continue;
        }

        let Some(current) = draft.as_mut() else {
            // Prose before the first question marker.
            continue;
        };

        if fixed_type.is_none() {
            if let Some(type_text) = field_value(line, "Type:") {
                current.question_type = detect_type(type_text);
                continue;
            }
        }

        if let Some(value) = field_value(line, "Correct Answer:") {
            current.correct_choice = value.trim().to_lowercase();
            current.field = Field::CorrectAnswer;
        } else if let Some(value) = field_value(line, "Explanation:") {
            current.explanation = value.to_string();
            current.field = Field::Explanation;
        } else if let Some(value) = field_value(line, "Sample Answer:") {
            current.sample_answer = value.to_string();
            current.field = Field::SampleAnswer;
        } else if let Some(value) = field_value(line, "Key Points:") {
            current.key_points = value.to_string();
            current.field = Field::KeyPoints;
        } else if let Some((key, value)) = option_marker(line) {
            current.options.insert(key.clone(), value.to_string());
            current.field = Field::Option(key);
        } else {
            current.append_to_open_field(line);
        }
    }

    if let Some(done) = draft.take() {
        questions.push(done);
    }

    questions
        .into_iter()
        .map(|d| d.finish(ctx))
        .filter(Question::is_well_formed)
        .collect()
}

fn detect_type(type_text: &str) -> QuestionType {
    let lower = type_text.to_lowercase();
    if lower.contains("short") {
        QuestionType::ShortAnswer
    } else if lower.contains("descriptive") || lower.contains("essay") {
        QuestionType::Descriptive
    } else {
        QuestionType::SingleChoice
    }
}

/// A parsed free-text scoring response.
#[derive(Debug, Clone, Default)]
pub struct ParsedEvaluation {
    pub score: f64,
    pub feedback: String,
    pub suggestions: String,
    pub hints: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EvalField {
    None,
    Feedback,
    Suggestions,
    Hints,
}

/// Parse a `SCORE:` / `FEEDBACK:` / `SUGGESTIONS:` / `HINTS:` response.
/// The score is the first numeric token on the score line, clamped to
/// `[0, max_marks]`; a missing or unreadable score yields 0.
pub fn parse_evaluation(text: &str, max_marks: u32) -> ParsedEvaluation {
    let mut parsed = ParsedEvaluation::default();
    let mut field = EvalField::None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(value) = field_value(line, "SCORE:") {
            parsed.score = extract_number(value)
                .unwrap_or(0.0)
                .clamp(0.0, f64::from(max_marks));
            field = EvalField::None;
        } else if let Some(value) = field_value(line, "FEEDBACK:") {
            parsed.feedback = value.to_string();
            field = EvalField::Feedback;
        } else if let Some(value) = field_value(line, "SUGGESTIONS:") {
            parsed.suggestions = value.to_string();
            field = EvalField::Suggestions;
        } else if let Some(value) = field_value(line, "HINTS:") {
            parsed.hints = value.to_string();
            field = EvalField::Hints;
        } else {
            let target = match field {
                EvalField::Feedback => &mut parsed.feedback,
                EvalField::Suggestions => &mut parsed.suggestions,
                EvalField::Hints => &mut parsed.hints,
                EvalField::None => continue,
            };
            if !target.is_empty() {
                target.push(' ');
            }
            target.push_str(line);
        }
    }

    parsed
}

/// First decimal number appearing in the string (e.g. "4.5 / 5" → 4.5).
fn extract_number(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let mut end = start;
    let mut seen_dot = false;
    for (i, c) in s[start..].char_indices() {
        if c.is_ascii_digit() {
            end = start + i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            end = start + i + 1;
        } else {
            break;
        }
    }
    s[start..end].trim_end_matches('.').parse().ok()
}
