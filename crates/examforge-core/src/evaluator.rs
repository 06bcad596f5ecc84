//! Response evaluation: scores a [`Submission`] against a [`Paper`] and
//! produces an [`EvaluationReport`].
//!
//! Single-choice questions are scored all-or-nothing by exact key match.
//! Free-text questions go through the generative-text capability when one is
//! configured; any failure drops to a deterministic keyword heuristic, so
//! evaluation itself never fails.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;

use crate::model::{Paper, Question, QuestionType, Submission};
use crate::parser;
use crate::report::{
    letter_grade, overall_feedback, round1, EvaluationReport, QuestionFeedback, SectionFeedback,
};
use crate::traits::{
    CompletionRequest, TextCompletion, EVALUATION_SYSTEM_PROMPT, HINT_SYSTEM_PROMPT,
};

const EVALUATION_MAX_TOKENS: u32 = 500;
const EVALUATION_TEMPERATURE: f64 = 0.3;
const HINT_MAX_TOKENS: u32 = 300;
const HINT_TEMPERATURE: f64 = 0.7;
/// Hints attached to one question are capped at this count.
const MAX_HINTS: usize = 3;
/// Token count at which a free-text answer earns the 30% effort credit.
const EFFORT_TOKEN_THRESHOLD: usize = 10;
const EFFORT_CREDIT: f64 = 0.3;
/// Keyword overlap contributes at most this fraction of the maximum marks.
const KEYWORD_CREDIT_CAP: f64 = 0.7;

/// Outcome of scoring one question, before report assembly.
struct Scored {
    score: f64,
    is_correct: Option<bool>,
    feedback: String,
    suggestions: String,
    hints: Vec<String>,
    /// Hints already chosen by the scoring path (model output or the
    /// no-answer stub). The low-score hint pass must not replace them.
    hints_settled: bool,
}

/// Scores submissions. Construct once and share.
pub struct ResponseEvaluator {
    completion: Option<Arc<dyn TextCompletion>>,
}

impl ResponseEvaluator {
    pub fn new(completion: Option<Arc<dyn TextCompletion>>) -> Self {
        Self { completion }
    }

    /// Evaluator without a generative-text capability; free-text answers are
    /// scored by the keyword heuristic only.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Evaluate a full submission. Questions the submission does not answer
    /// are scored as empty answers.
    pub async fn evaluate(&self, paper: &Paper, submission: &Submission) -> EvaluationReport {
        let mut total_score = 0.0;
        let mut total_max: u32 = 0;
        let mut sections = Vec::with_capacity(paper.sections.len());

        for (section_index, section) in paper.sections.iter().enumerate() {
            let mut section_score = 0.0;
            let mut section_max: u32 = 0;
            let mut questions = Vec::with_capacity(section.questions.len());

            for (question_index, question) in section.questions.iter().enumerate() {
                let answer = submission.answer(section_index, question_index);
                let scored = self.evaluate_question(question, answer).await;

                section_score += scored.score;
                section_max += question.marks;
                questions.push(QuestionFeedback {
                    question_number: question_index + 1,
                    question_text: question.text.clone(),
                    submitted_answer: answer.to_string(),
                    is_correct: scored.is_correct,
                    score: scored.score,
                    max_score: question.marks,
                    feedback: scored.feedback,
                    suggestions: scored.suggestions,
                    hints: scored.hints,
                });
            }

            total_score += section_score;
            total_max += section_max;
            sections.push(SectionFeedback {
                title: section.title.clone(),
                score: round1(section_score),
                max_score: section_max,
                questions,
            });
        }

        let percentage = if total_max > 0 {
            round1(total_score / f64::from(total_max) * 100.0)
        } else {
            0.0
        };

        EvaluationReport {
            total_score: round1(total_score),
            max_score: total_max,
            percentage,
            grade: letter_grade(percentage),
            overall_feedback: overall_feedback(percentage).to_string(),
            sections,
            evaluated_at: Utc::now(),
        }
    }

    async fn evaluate_question(&self, question: &Question, answer: &str) -> Scored {
        if question.question_type == QuestionType::SingleChoice && !question.is_well_formed() {
            tracing::warn!(question = %question.text, "malformed single-choice question");
            return Scored {
                score: 0.0,
                is_correct: None,
                feedback: "Error occurred during evaluation.".to_string(),
                suggestions: "Please try again or contact support.".to_string(),
                hints: vec![],
                hints_settled: true,
            };
        }

        let mut scored = match question.question_type {
            QuestionType::SingleChoice => score_single_choice(question, answer),
            QuestionType::ShortAnswer | QuestionType::Descriptive => {
                self.score_free_text(question, answer).await
            }
        };

        // Low scorers get study hints. The heuristic's generic pointer does
        // not count as hints; only model output or the no-answer stub do.
        if scored.score < f64::from(question.marks) * 0.5 && !scored.hints_settled {
            scored.hints = self.study_hints(question, answer).await;
        }
        scored.hints.truncate(MAX_HINTS);
        scored
    }

    async fn score_free_text(&self, question: &Question, answer: &str) -> Scored {
        if let Some(provider) = &self.completion {
            let request = CompletionRequest {
                prompt: build_evaluation_prompt(question, answer),
                system_prompt: Some(EVALUATION_SYSTEM_PROMPT.to_string()),
                max_tokens: EVALUATION_MAX_TOKENS,
                temperature: EVALUATION_TEMPERATURE,
            };
            match provider.complete(&request).await {
                Ok(response) => {
                    let parsed = parser::parse_evaluation(&response.content, question.marks);
                    let hints_settled = !parsed.hints.is_empty();
                    return Scored {
                        score: parsed.score,
                        is_correct: None,
                        feedback: parsed.feedback,
                        suggestions: parsed.suggestions,
                        hints: if hints_settled {
                            vec![parsed.hints]
                        } else {
                            vec![]
                        },
                        hints_settled,
                    };
                }
                Err(e) => {
                    tracing::warn!(
                        question = %question.text,
                        "free-text evaluation failed ({e:#}), using keyword heuristic"
                    );
                }
            }
        }
        heuristic_score(question, answer)
    }

    async fn study_hints(&self, question: &Question, answer: &str) -> Vec<String> {
        if let Some(provider) = &self.completion {
            let request = CompletionRequest {
                prompt: build_hint_prompt(question, answer),
                system_prompt: Some(HINT_SYSTEM_PROMPT.to_string()),
                max_tokens: HINT_MAX_TOKENS,
                temperature: HINT_TEMPERATURE,
            };
            match provider.complete(&request).await {
                Ok(response) => {
                    let hints: Vec<String> = response
                        .content
                        .lines()
                        .map(str::trim)
                        .filter(|line| !line.is_empty())
                        .map(String::from)
                        .take(MAX_HINTS)
                        .collect();
                    if !hints.is_empty() {
                        return hints;
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        question = %question.text,
                        "hint generation failed ({e:#}), using canned hints"
                    );
                }
            }
        }
        fallback_hints(question)
    }
}

/// All-or-nothing scoring by case-insensitive key comparison. Assumes a
/// well-formed question.
fn score_single_choice(question: &Question, answer: &str) -> Scored {
    let correct = question
        .correct_choice
        .as_deref()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    let submitted = answer.trim().to_lowercase();
    let is_correct = !correct.is_empty() && submitted == correct;

    let mut feedback = if is_correct {
        "Correct!".to_string()
    } else {
        format!(
            "Incorrect. The correct answer is {}.",
            correct.to_uppercase()
        )
    };
    if !is_correct && !question.explanation.is_empty() {
        feedback.push(' ');
        feedback.push_str(&question.explanation);
    }

    Scored {
        score: if is_correct {
            f64::from(question.marks)
        } else {
            0.0
        },
        is_correct: Some(is_correct),
        feedback,
        suggestions: String::new(),
        hints: vec![],
        hints_settled: false,
    }
}

/// Deterministic keyword heuristic for free-text answers: 30% effort credit
/// for ten or more tokens, plus up to 70% for keyword overlap with the
/// reference text (sample answer and key points), capped at the maximum.
fn heuristic_score(question: &Question, answer: &str) -> Scored {
    let max_marks = f64::from(question.marks);

    if answer.trim().is_empty() {
        return Scored {
            score: 0.0,
            is_correct: None,
            feedback: "No answer provided.".to_string(),
            suggestions: "Please provide an answer to receive marks.".to_string(),
            hints: vec!["Review the topic and try to answer the question.".to_string()],
            hints_settled: true,
        };
    }

    let mut score = 0.0;
    if answer.split_whitespace().count() >= EFFORT_TOKEN_THRESHOLD {
        score += max_marks * EFFORT_CREDIT;
    }

    let reference_text =
        format!("{} {}", question.sample_answer, question.key_points).to_lowercase();
    let reference_words: HashSet<&str> = reference_text.split_whitespace().collect();
    if !reference_words.is_empty() {
        let answer_text = answer.to_lowercase();
        let answer_words: HashSet<&str> = answer_text.split_whitespace().collect();
        let common = reference_words.intersection(&answer_words).count();
        if common > 0 {
            let keyword_share =
                (common as f64 / reference_words.len() as f64).min(KEYWORD_CREDIT_CAP);
            score += max_marks * keyword_share;
        }
    }

    let score = round1(score.min(max_marks));

    Scored {
        score,
        is_correct: None,
        feedback: format!(
            "Basic evaluation completed. Score: {score}/{max}",
            max = question.marks
        ),
        suggestions: "For detailed feedback, ensure AI evaluation is available.".to_string(),
        hints: vec!["Review the topic materials and sample answers.".to_string()],
        hints_settled: false,
    }
}

/// Canned study hints: two topic pointers plus one tip for the question's
/// answer format.
fn fallback_hints(question: &Question) -> Vec<String> {
    let topic = &question.topic;
    let subject = &question.subject;

    vec![
        format!("Review the fundamental concepts of {topic} in {subject}"),
        format!("Practice more questions related to {topic} to improve understanding"),
        match question.question_type {
            QuestionType::SingleChoice => {
                "For multiple choice questions, eliminate obviously wrong options first".to_string()
            }
            QuestionType::Descriptive => {
                "Structure your answers with clear introduction, main points, and conclusion"
                    .to_string()
            }
            QuestionType::ShortAnswer => {
                "Be concise but include all key points in your answer".to_string()
            }
        },
    ]
}

fn build_evaluation_prompt(question: &Question, answer: &str) -> String {
    let mut prompt = format!(
        "Evaluate the following student response:\n\n\
         Question: {text}\n\
         Question Type: {qtype}\n\
         Maximum Marks: {marks}\n\n\
         Student Answer: {answer}\n",
        text = question.text,
        qtype = question.question_type,
        marks = question.marks,
    );

    if !question.sample_answer.is_empty() {
        prompt.push_str(&format!("Sample Answer: {}\n", question.sample_answer));
    }
    if !question.key_points.is_empty() {
        prompt.push_str(&format!("Key Points to Cover: {}\n", question.key_points));
    }

    prompt.push_str(&format!(
        "\nPlease evaluate this response and provide:\n\
         1. Score out of {marks} (as a number)\n\
         2. Detailed feedback explaining the score\n\
         3. Specific suggestions for improvement\n\
         4. Hints for better understanding (if score is low)\n\n\
         Format your response as:\n\
         SCORE: [number]\n\
         FEEDBACK: [detailed feedback]\n\
         SUGGESTIONS: [improvement suggestions]\n\
         HINTS: [helpful hints]\n",
        marks = question.marks,
    ));

    prompt
}

fn build_hint_prompt(question: &Question, answer: &str) -> String {
    format!(
        "Generate 3 helpful study hints for a student who answered this question incorrectly:\n\n\
         Question: {text}\n\
         Student Answer: {answer}\n\
         Topic: {topic}\n\
         Subject: {subject}\n\n\
         Provide specific, actionable hints that will help the student understand the concept better.\n\
         Format as a simple list.",
        text = question.text,
        topic = question.topic,
        subject = question.subject,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Paper, Provenance, Section};
    use crate::report::Grade;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    struct CannedCompletion(String);

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(
            &self,
            _: &CompletionRequest,
        ) -> anyhow::Result<crate::traits::CompletionResponse> {
            Ok(crate::traits::CompletionResponse {
                content: self.0.clone(),
                model: "canned".into(),
                latency_ms: 1,
            })
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl TextCompletion for FailingCompletion {
        fn name(&self) -> &str {
            "failing"
        }

        async fn complete(
            &self,
            _: &CompletionRequest,
        ) -> anyhow::Result<crate::traits::CompletionResponse> {
            anyhow::bail!("provider unavailable")
        }
    }

    fn choice_question(marks: u32) -> Question {
        Question {
            text: "What is the unit of electric current?".into(),
            question_type: QuestionType::SingleChoice,
            subject: "physics".into(),
            topic: "electricity".into(),
            difficulty: Difficulty::Easy,
            marks,
            options: [("a", "Volt"), ("b", "Ampere"), ("c", "Ohm")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            correct_choice: Some("b".into()),
            sample_answer: String::new(),
            key_points: String::new(),
            explanation: "The unit of electric current is Ampere (A).".into(),
            tags: vec![],
            provenance: Provenance::Bank,
        }
    }

    fn free_text_question(marks: u32, sample_answer: &str, key_points: &str) -> Question {
        Question {
            text: "Explain kinetic energy.".into(),
            question_type: QuestionType::ShortAnswer,
            subject: "physics".into(),
            topic: "mechanics".into(),
            difficulty: Difficulty::Medium,
            marks,
            options: BTreeMap::new(),
            correct_choice: None,
            sample_answer: sample_answer.into(),
            key_points: key_points.into(),
            explanation: String::new(),
            tags: vec![],
            provenance: Provenance::Bank,
        }
    }

    fn paper(sections: Vec<Section>) -> Paper {
        let total_marks = sections.iter().map(|s| s.total_marks).sum();
        Paper {
            id: Uuid::new_v4(),
            title: "Test Paper".into(),
            subject: "physics".into(),
            duration_minutes: 60,
            instructions: vec![],
            language: "en".into(),
            sections,
            total_marks,
            created_at: Utc::now(),
        }
    }

    fn single_section(questions: Vec<Question>) -> Paper {
        let marks_per_question = questions.first().map(|q| q.marks).unwrap_or(1);
        let total_marks = questions.iter().map(|q| q.marks).sum();
        paper(vec![Section {
            title: "Section A".into(),
            instructions: String::new(),
            questions,
            marks_per_question,
            total_marks,
        }])
    }

    #[tokio::test]
    async fn correct_choice_is_case_insensitive() {
        let paper = single_section(vec![choice_question(2)]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, " B ");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.is_correct, Some(true));
        assert_eq!(q.score, 2.0);
        assert_eq!(q.feedback, "Correct!");
        assert!(q.hints.is_empty());
        assert_eq!(report.total_score, 2.0);
        assert_eq!(report.percentage, 100.0);
        assert_eq!(report.grade, Grade::APlus);
    }

    #[tokio::test]
    async fn wrong_choice_gets_explanation_and_hints() {
        let paper = single_section(vec![choice_question(2)]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "a");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.is_correct, Some(false));
        assert_eq!(q.score, 0.0);
        assert_eq!(
            q.feedback,
            "Incorrect. The correct answer is B. The unit of electric current is Ampere (A)."
        );
        assert_eq!(q.hints.len(), 3);
        assert!(q.hints[0].contains("electricity"));
        assert!(q.hints[2].contains("multiple choice"));
    }

    #[tokio::test]
    async fn single_choice_scores_are_binary() {
        let paper = single_section(vec![choice_question(5)]);
        for (answer, expected) in [("b", 5.0), ("B", 5.0), ("a", 0.0), ("", 0.0), ("bb", 0.0)] {
            let mut submission = Submission::new();
            submission.set_answer(0, 0, answer);
            let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;
            assert_eq!(report.sections[0].questions[0].score, expected);
        }
    }

    #[tokio::test]
    async fn empty_free_text_scores_zero_with_canned_feedback() {
        let paper = single_section(vec![free_text_question(3, "sample", "points")]);
        let report = ResponseEvaluator::offline()
            .evaluate(&paper, &Submission::new())
            .await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.score, 0.0);
        assert_eq!(q.feedback, "No answer provided.");
        assert_eq!(q.suggestions, "Please provide an answer to receive marks.");
        assert_eq!(
            q.hints,
            vec!["Review the topic and try to answer the question.".to_string()]
        );
    }

    #[tokio::test]
    async fn low_scoring_free_text_gets_type_specific_hints() {
        // The heuristic's generic pointer must give way to real study hints
        // below the 50% mark, including the answer-format tip.
        let paper = single_section(vec![free_text_question(10, "reference material", "")]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "wrong answer");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.score, 0.0);
        assert_eq!(q.hints.len(), 3);
        assert!(q.hints[0].contains("mechanics"));
        assert!(q.hints[2].contains("concise"));

        let mut descriptive = free_text_question(10, "reference material", "");
        descriptive.question_type = QuestionType::Descriptive;
        let paper = single_section(vec![descriptive]);
        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;
        assert!(report.sections[0].questions[0].hints[2].contains("introduction"));
    }

    #[tokio::test]
    async fn keyword_overlap_earns_proportional_credit() {
        // Reference set has 8 distinct words; the answer shares 4 of them and
        // is under the effort threshold: 4/8 * 6 marks = 3.0 exactly.
        let question = free_text_question(
            6,
            "energy motion velocity mass speed force work power",
            "",
        );
        let paper = single_section(vec![question]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "energy motion velocity mass");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.score, 3.0);
        assert_eq!(q.feedback, "Basic evaluation completed. Score: 3/6");
        // Exactly half the marks: not a low scorer, heuristic hint stays.
        assert_eq!(
            q.hints,
            vec!["Review the topic materials and sample answers.".to_string()]
        );
    }

    #[tokio::test]
    async fn effort_plus_capped_overlap_reaches_full_marks() {
        // Eleven tokens earn the 30% effort credit; 3 of 4 reference words
        // hit, and 0.75 is capped at 0.7: 0.9 + 2.1 = 3.0, the maximum.
        let question = free_text_question(3, "energy motion velocity mass", "");
        let paper = single_section(vec![question]);
        let mut submission = Submission::new();
        submission.set_answer(
            0,
            0,
            "the object has kinetic energy due to its velocity and mass",
        );

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;
        assert_eq!(report.sections[0].questions[0].score, 3.0);
    }

    #[tokio::test]
    async fn long_answer_earns_effort_credit() {
        // Ten tokens, none matching the reference: 30% of 10 marks.
        let question = free_text_question(10, "unrelated reference words", "");
        let paper = single_section(vec![question]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "one two three four five six seven eight nine ten");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;
        assert_eq!(report.sections[0].questions[0].score, 3.0);
    }

    #[tokio::test]
    async fn heuristic_score_never_exceeds_max() {
        // Full overlap plus effort credit would exceed the cap.
        let reference = "a b c d e f g h i j";
        let question = free_text_question(4, reference, "");
        let paper = single_section(vec![question]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, reference);

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;
        assert_eq!(report.sections[0].questions[0].score, 4.0);
    }

    #[tokio::test]
    async fn malformed_single_choice_scores_zero() {
        let mut question = choice_question(2);
        question.correct_choice = None;
        let paper = single_section(vec![question]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "a");

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.score, 0.0);
        assert_eq!(q.feedback, "Error occurred during evaluation.");
        assert!(q.hints.is_empty());
    }

    #[tokio::test]
    async fn totals_aggregate_across_sections() {
        // Section A: two choice questions worth 5 each, one answered right.
        // Section B: one free-text worth 10, scored 10 by full overlap plus
        // effort... capped at 10. Total 15/20 = 75% = grade B.
        let section_a = Section {
            title: "Section A".into(),
            instructions: String::new(),
            questions: vec![choice_question(5), choice_question(5)],
            marks_per_question: 5,
            total_marks: 10,
        };
        let reference = "a b c d e f g h i j";
        let section_b = Section {
            title: "Section B".into(),
            instructions: String::new(),
            questions: vec![free_text_question(10, reference, "")],
            marks_per_question: 10,
            total_marks: 10,
        };
        let paper = paper(vec![section_a, section_b]);

        let mut submission = Submission::new();
        submission.set_answer(0, 0, "b");
        submission.set_answer(0, 1, "c");
        submission.set_answer(1, 0, reference);

        let report = ResponseEvaluator::offline().evaluate(&paper, &submission).await;

        assert_eq!(report.sections[0].score, 5.0);
        assert_eq!(report.sections[1].score, 10.0);
        assert_eq!(report.total_score, 15.0);
        assert_eq!(report.max_score, 20);
        assert_eq!(report.percentage, 75.0);
        assert_eq!(report.grade, Grade::B);
        assert!(report.overall_feedback.starts_with("Satisfactory"));
    }

    #[tokio::test]
    async fn zero_mark_paper_is_graded_f() {
        let report = ResponseEvaluator::offline()
            .evaluate(&single_section(vec![]), &Submission::new())
            .await;
        assert_eq!(report.max_score, 0);
        assert_eq!(report.percentage, 0.0);
        assert_eq!(report.grade, Grade::F);
    }

    #[tokio::test]
    async fn offline_evaluation_is_deterministic() {
        let paper = single_section(vec![
            choice_question(2),
            free_text_question(5, "energy is conserved", "conservation"),
        ]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "a");
        submission.set_answer(0, 1, "energy stays the same");

        let evaluator = ResponseEvaluator::offline();
        let first = evaluator.evaluate(&paper, &submission).await;
        let second = evaluator.evaluate(&paper, &submission).await;

        assert_eq!(first.total_score, second.total_score);
        assert_eq!(first.percentage, second.percentage);
        for (a, b) in first.sections[0]
            .questions
            .iter()
            .zip(&second.sections[0].questions)
        {
            assert_eq!(a.score, b.score);
            assert_eq!(a.feedback, b.feedback);
            assert_eq!(a.hints, b.hints);
        }
    }

    #[tokio::test]
    async fn ai_evaluation_is_parsed_into_feedback() {
        let response = "\
SCORE: 4
FEEDBACK: Solid answer covering the main idea.
SUGGESTIONS: Mention the formula next time.
HINTS: Relate kinetic energy to mass and velocity.
";
        let evaluator =
            ResponseEvaluator::new(Some(Arc::new(CannedCompletion(response.into()))));
        let paper = single_section(vec![free_text_question(5, "half m v squared", "")]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "Energy of motion.");

        let report = evaluator.evaluate(&paper, &submission).await;

        let q = &report.sections[0].questions[0];
        assert_eq!(q.score, 4.0);
        assert_eq!(q.feedback, "Solid answer covering the main idea.");
        assert_eq!(q.suggestions, "Mention the formula next time.");
        assert_eq!(
            q.hints,
            vec!["Relate kinetic energy to mass and velocity.".to_string()]
        );
    }

    #[tokio::test]
    async fn provider_failure_matches_offline_scoring() {
        let paper = single_section(vec![free_text_question(6, "alpha beta gamma delta", "")]);
        let mut submission = Submission::new();
        submission.set_answer(0, 0, "alpha beta");

        let failing = ResponseEvaluator::new(Some(Arc::new(FailingCompletion)));
        let offline = ResponseEvaluator::offline();

        let a = failing.evaluate(&paper, &submission).await;
        let b = offline.evaluate(&paper, &submission).await;
        assert_eq!(a.total_score, b.total_score);
        assert_eq!(
            a.sections[0].questions[0].feedback,
            b.sections[0].questions[0].feedback
        );
    }
}
