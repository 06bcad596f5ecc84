//! Evaluation report types: grading bands, per-question feedback, and JSON
//! persistence.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Letter grade derived from the overall percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "E")]
    E,
    #[serde(rename = "F")]
    F,
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::CPlus => "C+",
            Grade::C => "C",
            Grade::DPlus => "D+",
            Grade::D => "D",
            Grade::E => "E",
            Grade::F => "F",
        };
        write!(f, "{letter}")
    }
}

/// Map a percentage to its letter grade. Bands are first-match in 5-point
/// steps from 90 down to the pass mark at 50.
pub fn letter_grade(percentage: f64) -> Grade {
    if percentage >= 90.0 {
        Grade::APlus
    } else if percentage >= 85.0 {
        Grade::A
    } else if percentage >= 80.0 {
        Grade::BPlus
    } else if percentage >= 75.0 {
        Grade::B
    } else if percentage >= 70.0 {
        Grade::CPlus
    } else if percentage >= 65.0 {
        Grade::C
    } else if percentage >= 60.0 {
        Grade::DPlus
    } else if percentage >= 55.0 {
        Grade::D
    } else if percentage >= 50.0 {
        Grade::E
    } else {
        Grade::F
    }
}

/// Canned overall feedback keyed by 10-point performance bands.
pub fn overall_feedback(percentage: f64) -> &'static str {
    if percentage >= 90.0 {
        "Excellent performance! You have demonstrated a strong understanding of the subject matter."
    } else if percentage >= 80.0 {
        "Good work! You have a solid grasp of most concepts with room for minor improvements."
    } else if percentage >= 70.0 {
        "Satisfactory performance. Focus on strengthening your understanding of key concepts."
    } else if percentage >= 60.0 {
        "You're on the right track, but need to work on several areas for better understanding."
    } else if percentage >= 50.0 {
        "Below average performance. Consider reviewing the material and seeking additional help."
    } else {
        "Significant improvement needed. Please review all topics thoroughly and consider additional study resources."
    }
}

/// Round to one decimal place, the precision used for all reported scores.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Feedback for one question of one submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionFeedback {
    /// 1-based position within the section.
    pub question_number: usize,
    pub question_text: String,
    pub submitted_answer: String,
    /// Set only for single-choice questions; free-text scoring has no
    /// binary notion of correctness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    pub score: f64,
    pub max_score: u32,
    pub feedback: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub suggestions: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,
}

/// Per-section score breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFeedback {
    pub title: String,
    pub score: f64,
    pub max_score: u32,
    pub questions: Vec<QuestionFeedback>,
}

/// Full evaluation of one submission against one paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub total_score: f64,
    pub max_score: u32,
    /// `total_score / max_score` as a percentage, one decimal place. Zero
    /// when the paper carries no marks.
    pub percentage: f64,
    pub grade: Grade,
    pub overall_feedback: String,
    pub sections: Vec<SectionFeedback>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// Save the report as pretty-printed JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        serde_json::from_str(&content).context("failed to parse report JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_bands_are_first_match() {
        assert_eq!(letter_grade(100.0), Grade::APlus);
        assert_eq!(letter_grade(90.0), Grade::APlus);
        assert_eq!(letter_grade(89.9), Grade::A);
        assert_eq!(letter_grade(85.0), Grade::A);
        assert_eq!(letter_grade(80.0), Grade::BPlus);
        assert_eq!(letter_grade(75.0), Grade::B);
        assert_eq!(letter_grade(70.0), Grade::CPlus);
        assert_eq!(letter_grade(65.0), Grade::C);
        assert_eq!(letter_grade(60.0), Grade::DPlus);
        assert_eq!(letter_grade(55.0), Grade::D);
        assert_eq!(letter_grade(50.0), Grade::E);
        assert_eq!(letter_grade(49.9), Grade::F);
        assert_eq!(letter_grade(0.0), Grade::F);
    }

    #[test]
    fn grades_serialize_as_letters() {
        assert_eq!(serde_json::to_string(&Grade::APlus).unwrap(), "\"A+\"");
        assert_eq!(serde_json::to_string(&Grade::F).unwrap(), "\"F\"");
        let back: Grade = serde_json::from_str("\"B+\"").unwrap();
        assert_eq!(back, Grade::BPlus);
    }

    #[test]
    fn feedback_bands_cover_the_range() {
        assert!(overall_feedback(95.0).starts_with("Excellent"));
        assert!(overall_feedback(85.0).starts_with("Good work"));
        assert!(overall_feedback(75.0).starts_with("Satisfactory"));
        assert!(overall_feedback(65.0).starts_with("You're on the right track"));
        assert!(overall_feedback(55.0).starts_with("Below average"));
        assert!(overall_feedback(10.0).starts_with("Significant improvement"));
    }

    #[test]
    fn rounding_is_one_decimal() {
        assert_eq!(round1(3.14), 3.1);
        assert_eq!(round1(3.15), 3.2);
        assert_eq!(round1(2.0), 2.0);
    }

    #[test]
    fn json_roundtrip() {
        let report = EvaluationReport {
            total_score: 15.0,
            max_score: 20,
            percentage: 75.0,
            grade: letter_grade(75.0),
            overall_feedback: overall_feedback(75.0).to_string(),
            sections: vec![SectionFeedback {
                title: "Section A".into(),
                score: 15.0,
                max_score: 20,
                questions: vec![QuestionFeedback {
                    question_number: 1,
                    question_text: "What is inertia?".into(),
                    submitted_answer: "Resistance to change in motion".into(),
                    is_correct: None,
                    score: 15.0,
                    max_score: 20,
                    feedback: "Good answer.".into(),
                    suggestions: String::new(),
                    hints: vec![],
                }],
            }],
            evaluated_at: Utc::now(),
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_json(&path).unwrap();
        let loaded = EvaluationReport::load_json(&path).unwrap();

        assert_eq!(loaded.grade, Grade::B);
        assert_eq!(loaded.total_score, 15.0);
        assert_eq!(loaded.sections.len(), 1);
        assert_eq!(loaded.sections[0].questions[0].question_number, 1);
    }
}
