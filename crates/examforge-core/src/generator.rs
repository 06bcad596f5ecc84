//! Question generation: generative-text primary path with a deterministic
//! template fallback.
//!
//! The generator never fails: when the completion capability is absent,
//! errors, or produces nothing well-formed, it falls back to the fixed
//! per-subject template table (repeats are acceptable on the fallback path).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::model::{Difficulty, Provenance, Question, QuestionType};
use crate::parser::{self, QuestionContext};
use crate::traits::{CompletionRequest, TextCompletion, GENERATION_SYSTEM_PROMPT};

const GENERATION_MAX_TOKENS: u32 = 2000;
const TITLE_GENERATION_MAX_TOKENS: u32 = 2500;
const GENERATION_TEMPERATURE: f64 = 0.7;

/// Parameters for one generation request.
#[derive(Debug, Clone)]
pub struct GenerationSpec {
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    pub question_type: QuestionType,
    pub count: usize,
    /// ISO language code; only names the language inside the prompt.
    pub language: String,
}

/// Parameters for title-driven generation.
#[derive(Debug, Clone)]
pub struct TitleGenerationSpec {
    pub quiz_title: String,
    pub subject: String,
    pub difficulty: Difficulty,
    pub count: usize,
    /// Question types cycled round-robin across the batch. Empty means
    /// single-choice plus short-answer.
    pub allowed_types: Vec<QuestionType>,
}

/// Stateless question-generation service. Construct once and share.
pub struct QuestionGenerator {
    completion: Option<Arc<dyn TextCompletion>>,
}

impl QuestionGenerator {
    pub fn new(completion: Option<Arc<dyn TextCompletion>>) -> Self {
        Self { completion }
    }

    /// Generator without a generative-text capability; every call takes the
    /// deterministic template path.
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Generate `spec.count` questions. Best effort: the result may be
    /// shorter than requested only on the primary path; the fallback always
    /// fills the count by cycling templates.
    pub async fn generate(&self, spec: &GenerationSpec) -> Vec<Question> {
        let Some(provider) = &self.completion else {
            return self.fallback_questions(spec);
        };

        let request = CompletionRequest {
            prompt: build_generation_prompt(spec),
            system_prompt: Some(GENERATION_SYSTEM_PROMPT.to_string()),
            max_tokens: GENERATION_MAX_TOKENS,
            temperature: GENERATION_TEMPERATURE,
        };

        match provider.complete(&request).await {
            Ok(response) => {
                let ctx = QuestionContext {
                    subject: spec.subject.clone(),
                    topic: spec.topic.clone(),
                    difficulty: spec.difficulty,
                    provenance: Provenance::Generated,
                };
                let parsed =
                    parser::parse_question_batch(&response.content, Some(spec.question_type), &ctx);
                if parsed.is_empty() {
                    tracing::warn!(
                        subject = %spec.subject,
                        topic = %spec.topic,
                        "no well-formed questions in generated output, using templates"
                    );
                    self.fallback_questions(spec)
                } else {
                    parsed.into_iter().take(spec.count).collect()
                }
            }
            Err(e) => {
                tracing::warn!(
                    subject = %spec.subject,
                    topic = %spec.topic,
                    "question generation failed ({e:#}), using templates"
                );
                self.fallback_questions(spec)
            }
        }
    }

    /// Generate questions keyed off a free-text quiz title.
    pub async fn generate_from_title(&self, spec: &TitleGenerationSpec) -> Vec<Question> {
        let Some(provider) = &self.completion else {
            return self.contextual_questions(spec);
        };

        let request = CompletionRequest {
            prompt: build_title_prompt(spec),
            system_prompt: Some(GENERATION_SYSTEM_PROMPT.to_string()),
            max_tokens: TITLE_GENERATION_MAX_TOKENS,
            temperature: GENERATION_TEMPERATURE,
        };

        match provider.complete(&request).await {
            Ok(response) => {
                let ctx = QuestionContext {
                    subject: spec.subject.clone(),
                    topic: "AI Generated".to_string(),
                    difficulty: spec.difficulty,
                    provenance: Provenance::Generated,
                };
                let mut parsed = parser::parse_question_batch(&response.content, None, &ctx);
                if parsed.is_empty() {
                    tracing::warn!(title = %spec.quiz_title, "no well-formed quiz questions parsed, using templates");
                    return self.contextual_questions(spec);
                }
                for q in &mut parsed {
                    if q.question_type == QuestionType::SingleChoice {
                        q.marks = 2;
                    } else {
                        q.marks = 5;
                        if q.key_points.is_empty() {
                            q.key_points = "Key concepts and explanations".to_string();
                        }
                    }
                }
                parsed.truncate(spec.count);
                parsed
            }
            Err(e) => {
                tracing::warn!(title = %spec.quiz_title, "quiz generation failed ({e:#}), using templates");
                self.contextual_questions(spec)
            }
        }
    }

    /// Deterministic template fallback: cycle the template pool with
    /// wraparound until `count` questions exist.
    fn fallback_questions(&self, spec: &GenerationSpec) -> Vec<Question> {
        let pool = template_pool(spec);
        (0..spec.count)
            .map(|i| pool[i % pool.len()].clone())
            .collect()
    }

    /// Deterministic title-driven fallback: round-robin the allowed types
    /// over extracted topics, phrasing and marks keyed by difficulty.
    fn contextual_questions(&self, spec: &TitleGenerationSpec) -> Vec<Question> {
        let types: &[QuestionType] = if spec.allowed_types.is_empty() {
            &[QuestionType::SingleChoice, QuestionType::ShortAnswer]
        } else {
            &spec.allowed_types
        };
        let topics = extract_topics(&spec.quiz_title, &spec.subject);

        (0..spec.count)
            .map(|i| {
                let question_type = types[i % types.len()];
                let topic = &topics[i % topics.len()];
                match question_type {
                    QuestionType::SingleChoice => contextual_choice(spec, topic),
                    _ => contextual_free_text(spec, topic, question_type),
                }
            })
            .collect()
    }
}

fn language_name(code: &str) -> &'static str {
    match code {
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "hi" => "Hindi",
        "ar" => "Arabic",
        _ => "English",
    }
}

fn build_generation_prompt(spec: &GenerationSpec) -> String {
    let mut prompt = format!(
        "Generate {count} {difficulty} level {qtype} questions about {topic} in {subject}.\n\
         Language: {language}\n\n\
         Requirements:\n\
         - Questions should be appropriate for {difficulty} difficulty level\n\
         - Focus specifically on the topic: {topic}\n\
         - Subject area: {subject}\n",
        count = spec.count,
        difficulty = spec.difficulty,
        qtype = spec.question_type,
        topic = spec.topic,
        subject = spec.subject,
        language = language_name(&spec.language),
    );

    match spec.question_type {
        QuestionType::SingleChoice => prompt.push_str(
            "- Format: Multiple Choice Questions with 4 options (A, B, C, D)\n\
             - Clearly indicate the correct answer\n\
             - Include brief explanations for the correct answer\n\n\
             Format each question as:\n\
             Q1: [Question text]\n\
             A) [Option A]\n\
             B) [Option B]\n\
             C) [Option C]\n\
             D) [Option D]\n\
             Correct Answer: [Letter]\n\
             Explanation: [Brief explanation]\n",
        ),
        QuestionType::ShortAnswer => prompt.push_str(
            "- Format: Short answer questions (1-3 sentences expected)\n\
             - Include sample answers or key points\n\n\
             Format each question as:\n\
             Q1: [Question text]\n\
             Sample Answer: [Expected answer or key points]\n",
        ),
        QuestionType::Descriptive => prompt.push_str(
            "- Format: Descriptive/Essay questions requiring detailed answers\n\
             - Include key points that should be covered in the answer\n\n\
             Format each question as:\n\
             Q1: [Question text]\n\
             Key Points: [Main points that should be covered]\n",
        ),
    }

    prompt
}

fn build_title_prompt(spec: &TitleGenerationSpec) -> String {
    let types: Vec<String> = if spec.allowed_types.is_empty() {
        vec!["single_choice".into(), "short_answer".into()]
    } else {
        spec.allowed_types.iter().map(|t| t.to_string()).collect()
    };

    format!(
        "Create a {difficulty} level quiz titled \"{title}\" for the subject {subject}.\n\
         Generate {count} high-quality educational questions.\n\n\
         Question types to include: {types}\n\n\
         Requirements:\n\
         - Questions should be relevant to the quiz title \"{title}\"\n\
         - Appropriate for {difficulty} difficulty level\n\
         - Subject area: {subject}\n\
         - Include a mix of the specified question types\n\n\
         For Multiple Choice Questions (MCQ):\n\
         - Provide 4 options (A, B, C, D)\n\
         - Clearly indicate the correct answer\n\
         - Include brief explanations\n\n\
         For Short Answer Questions:\n\
         - Expect 1-3 sentence responses\n\
         - Include sample answers or key points\n\n\
         Format each question as:\n\n\
         Q1: [Question text]\n\
         Type: [MCQ/Short Answer]\n\
         A) [Option A]\n\
         B) [Option B]\n\
         C) [Option C]\n\
         D) [Option D]\n\
         Correct Answer: [Letter]\n\
         Explanation: [Brief explanation]\n\
         Sample Answer: [Expected answer or key points]\n",
        difficulty = spec.difficulty,
        title = spec.quiz_title,
        subject = spec.subject,
        count = spec.count,
        types = types.join(", "),
    )
}

/// Fixed subject→topic vocabulary used by title-driven topic extraction.
fn topic_vocabulary(subject: &str) -> &'static [&'static str] {
    match crate::bank::normalize_subject(subject).as_str() {
        "mathematics" => &["algebra", "calculus", "geometry", "statistics", "trigonometry"],
        "physics" => &["mechanics", "thermodynamics", "electromagnetism", "optics", "quantum"],
        "chemistry" => &[
            "organic chemistry",
            "inorganic chemistry",
            "physical chemistry",
            "biochemistry",
        ],
        "biology" => &["cell biology", "genetics", "ecology", "evolution", "anatomy"],
        "computer_science" => &["programming", "algorithms", "data structures", "databases", "networks"],
        _ => &[],
    }
}

/// Extract candidate topics by intersecting title tokens with the subject's
/// topic vocabulary (substring match either direction). No match means the
/// subject itself is the sole topic.
fn extract_topics(quiz_title: &str, subject: &str) -> Vec<String> {
    let vocabulary = topic_vocabulary(subject);
    let mut matched = Vec::new();

    for word in quiz_title.to_lowercase().split_whitespace() {
        for topic in vocabulary {
            if topic.contains(word) || word.contains(topic) {
                matched.push((*topic).to_string());
            }
        }
    }

    if matched.is_empty() {
        vec![subject.to_string()]
    } else {
        matched
    }
}

fn options(entries: [(&str, String); 4]) -> BTreeMap<String, String> {
    entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Difficulty strictly maps to a fixed {phrasing, correct option, marks}
/// tuple for contextual single-choice questions.
fn contextual_choice(spec: &TitleGenerationSpec, topic: &str) -> Question {
    let title = &spec.quiz_title;
    let (text, opts, correct, explanation, marks) = match spec.difficulty {
        Difficulty::Easy => (
            format!("In the context of '{title}', what is a fundamental concept in {topic}?"),
            options([
                ("a", format!("Basic principle of {topic}")),
                ("b", format!("Advanced theory in {topic}")),
                ("c", "Unrelated concept".to_string()),
                ("d", "Complex application".to_string()),
            ]),
            "a",
            format!(
                "The basic principle is fundamental to understanding {topic} in the context of {title}."
            ),
            1,
        ),
        Difficulty::Medium => (
            format!("In '{title}', how does {topic} relate to the main subject matter?"),
            options([
                ("a", "It's completely unrelated".to_string()),
                ("b", "It provides foundational understanding".to_string()),
                ("c", "It's only for advanced students".to_string()),
                ("d", "It's optional knowledge".to_string()),
            ]),
            "b",
            format!("{topic} provides essential foundational understanding for {title}."),
            2,
        ),
        Difficulty::Hard => (
            format!("Considering '{title}', which advanced concept in {topic} is most critical?"),
            options([
                ("a", format!("Elementary concept in {topic}")),
                ("b", format!("Advanced application of {topic}")),
                ("c", "Basic definition".to_string()),
                ("d", "Simple example".to_string()),
            ]),
            "b",
            format!("Advanced applications are crucial for mastering {topic} as covered in {title}."),
            3,
        ),
    };

    Question {
        text,
        question_type: QuestionType::SingleChoice,
        subject: spec.subject.clone(),
        topic: topic.to_string(),
        difficulty: spec.difficulty,
        marks,
        options: opts,
        correct_choice: Some(correct.to_string()),
        sample_answer: String::new(),
        key_points: String::new(),
        explanation,
        tags: vec![],
        provenance: Provenance::Template,
    }
}

/// Difficulty-keyed phrasing and marks for contextual free-text questions.
fn contextual_free_text(
    spec: &TitleGenerationSpec,
    topic: &str,
    question_type: QuestionType,
) -> Question {
    let title = &spec.quiz_title;
    let (text, sample_answer, key_points, marks) = match spec.difficulty {
        Difficulty::Easy => (
            format!("Briefly explain how {topic} relates to '{title}'."),
            format!(
                "{topic} is fundamental to {title} because it provides the basic concepts needed for understanding."
            ),
            format!("Definition of {topic}, connection to quiz topic, basic importance"),
            3,
        ),
        Difficulty::Medium => (
            format!(
                "Describe the importance of {topic} in the context of '{title}' and give one example."
            ),
            format!(
                "{topic} is important in {title} because it helps understand key concepts. For example, [specific example]."
            ),
            "Importance explanation, specific example, clear connection to quiz topic".to_string(),
            5,
        ),
        Difficulty::Hard => (
            format!(
                "Analyze the complex relationship between {topic} and the concepts covered in '{title}'. Provide specific examples."
            ),
            format!(
                "{topic} plays a crucial role in {title} through multiple interconnected concepts and practical applications."
            ),
            "Complex analysis, specific examples, interconnections, practical applications"
                .to_string(),
            8,
        ),
    };

    Question {
        text,
        question_type,
        subject: spec.subject.clone(),
        topic: topic.to_string(),
        difficulty: spec.difficulty,
        marks,
        options: BTreeMap::new(),
        correct_choice: None,
        sample_answer,
        key_points,
        explanation: String::new(),
        tags: vec![],
        provenance: Provenance::Template,
    }
}

struct ChoiceTemplate {
    text: &'static str,
    options: [(&'static str, &'static str); 4],
    correct: &'static str,
    explanation: &'static str,
    marks: u32,
}

struct FreeTextTemplate {
    text: &'static str,
    sample_answer: &'static str,
    key_points: &'static str,
    marks: u32,
}

/// Canned question skeletons per subject and type. Unmatched pairs fall
/// through to a generic parametrized question embedding topic and subject.
fn template_pool(spec: &GenerationSpec) -> Vec<Question> {
    let subject_key = crate::bank::normalize_subject(&spec.subject);

    let choice_templates: &[ChoiceTemplate] = match (subject_key.as_str(), spec.question_type) {
        ("mathematics", QuestionType::SingleChoice) => &[
            ChoiceTemplate {
                text: "What is the derivative of x² with respect to x?",
                options: [("a", "x"), ("b", "2x"), ("c", "x²"), ("d", "2x²")],
                correct: "b",
                explanation: "The derivative of x² is 2x using the power rule.",
                marks: 2,
            },
            ChoiceTemplate {
                text: "Which of the following is the quadratic formula?",
                options: [
                    ("a", "x = -b ± √(b² - 4ac) / 2a"),
                    ("b", "x = b ± √(b² + 4ac) / 2a"),
                    ("c", "x = -b ± √(b² + 4ac) / 2a"),
                    ("d", "x = b ± √(b² - 4ac) / 2a"),
                ],
                correct: "a",
                explanation: "The quadratic formula is x = (-b ± √(b² - 4ac)) / 2a",
                marks: 3,
            },
        ],
        ("physics", QuestionType::SingleChoice) => &[
            ChoiceTemplate {
                text: "What is Newton's second law of motion?",
                options: [("a", "F = ma"), ("b", "E = mc²"), ("c", "v = u + at"), ("d", "P = mv")],
                correct: "a",
                explanation: "Newton's second law states that Force equals mass times acceleration (F = ma).",
                marks: 2,
            },
            ChoiceTemplate {
                text: "The unit of electric current is:",
                options: [("a", "Volt"), ("b", "Ampere"), ("c", "Ohm"), ("d", "Watt")],
                correct: "b",
                explanation: "The unit of electric current is Ampere (A).",
                marks: 1,
            },
        ],
        ("chemistry", QuestionType::SingleChoice) => &[
            ChoiceTemplate {
                text: "What is the chemical symbol for Gold?",
                options: [("a", "Go"), ("b", "Gd"), ("c", "Au"), ("d", "Ag")],
                correct: "c",
                explanation: "Gold's chemical symbol is Au, from the Latin word \"aurum\".",
                marks: 1,
            },
            ChoiceTemplate {
                text: "Which gas is most abundant in Earth's atmosphere?",
                options: [
                    ("a", "Oxygen"),
                    ("b", "Carbon Dioxide"),
                    ("c", "Nitrogen"),
                    ("d", "Hydrogen"),
                ],
                correct: "c",
                explanation: "Nitrogen makes up about 78% of Earth's atmosphere.",
                marks: 2,
            },
        ],
        ("biology", QuestionType::SingleChoice) => &[ChoiceTemplate {
            text: "What is the powerhouse of the cell?",
            options: [
                ("a", "Nucleus"),
                ("b", "Mitochondria"),
                ("c", "Ribosome"),
                ("d", "Chloroplast"),
            ],
            correct: "b",
            explanation: "Mitochondria are called the powerhouse of the cell because they produce ATP.",
            marks: 2,
        }],
        ("computer_science", QuestionType::SingleChoice) => &[
            ChoiceTemplate {
                text: "Which of the following is a programming language?",
                options: [("a", "HTML"), ("b", "CSS"), ("c", "Python"), ("d", "SQL")],
                correct: "c",
                explanation: "Python is a high-level programming language.",
                marks: 1,
            },
            ChoiceTemplate {
                text: "What does CPU stand for?",
                options: [
                    ("a", "Central Processing Unit"),
                    ("b", "Computer Processing Unit"),
                    ("c", "Central Program Unit"),
                    ("d", "Computer Program Unit"),
                ],
                correct: "a",
                explanation: "CPU stands for Central Processing Unit.",
                marks: 1,
            },
        ],
        _ => &[],
    };

    if !choice_templates.is_empty() {
        return choice_templates
            .iter()
            .map(|t| Question {
                text: t.text.to_string(),
                question_type: QuestionType::SingleChoice,
                subject: spec.subject.clone(),
                topic: spec.topic.clone(),
                difficulty: spec.difficulty,
                marks: t.marks,
                options: t
                    .options
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                correct_choice: Some(t.correct.to_string()),
                sample_answer: String::new(),
                key_points: String::new(),
                explanation: t.explanation.to_string(),
                tags: vec![],
                provenance: Provenance::Template,
            })
            .collect();
    }

    let free_text_templates: &[FreeTextTemplate] =
        match (subject_key.as_str(), spec.question_type) {
            ("mathematics", QuestionType::ShortAnswer) => &[FreeTextTemplate {
                text: "Solve the equation 2x + 5 = 13 and show your work.",
                sample_answer: "2x + 5 = 13, 2x = 8, x = 4",
                key_points: "Subtract 5 from both sides, divide by 2, final answer x = 4",
                marks: 3,
            }],
            _ => &[],
        };

    if !free_text_templates.is_empty() {
        return free_text_templates
            .iter()
            .map(|t| Question {
                text: t.text.to_string(),
                question_type: spec.question_type,
                subject: spec.subject.clone(),
                topic: spec.topic.clone(),
                difficulty: spec.difficulty,
                marks: t.marks,
                options: BTreeMap::new(),
                correct_choice: None,
                sample_answer: t.sample_answer.to_string(),
                key_points: t.key_points.to_string(),
                explanation: String::new(),
                tags: vec![],
                provenance: Provenance::Template,
            })
            .collect();
    }

    vec![generic_template(spec)]
}

/// Generic parametrized question for subject/type pairs with no canned
/// skeleton.
fn generic_template(spec: &GenerationSpec) -> Question {
    let topic = &spec.topic;
    let subject = &spec.subject;

    match spec.question_type {
        QuestionType::SingleChoice => Question {
            text: format!("What is the main concept of {topic} in {subject}?"),
            question_type: QuestionType::SingleChoice,
            subject: subject.clone(),
            topic: topic.clone(),
            difficulty: spec.difficulty,
            marks: 2,
            options: options([
                ("a", format!("Primary concept of {topic}")),
                ("b", format!("Secondary aspect of {topic}")),
                ("c", format!("Related field to {topic}")),
                ("d", format!("Opposite of {topic}")),
            ]),
            correct_choice: Some("a".to_string()),
            sample_answer: String::new(),
            key_points: String::new(),
            explanation: format!("The primary concept is fundamental to understanding {topic}."),
            tags: vec![],
            provenance: Provenance::Template,
        },
        _ => Question {
            text: format!("Explain the concept of {topic} in {subject}."),
            question_type: spec.question_type,
            subject: subject.clone(),
            topic: topic.clone(),
            difficulty: spec.difficulty,
            marks: 5,
            options: BTreeMap::new(),
            correct_choice: None,
            sample_answer: format!(
                "The concept of {topic} involves understanding the fundamental principles and applications in {subject}."
            ),
            key_points: "Definition, principles, applications, examples".to_string(),
            explanation: String::new(),
            tags: vec![],
            provenance: Provenance::Template,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::traits::CompletionResponse;

    struct CannedCompletion(String);

    #[async_trait]
    impl TextCompletion for CannedCompletion {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            Ok(CompletionResponse {
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

        async fn complete(&self, _: &CompletionRequest) -> anyhow::Result<CompletionResponse> {
            anyhow::bail!("provider unavailable")
        }
    }

    fn spec(subject: &str, question_type: QuestionType, count: usize) -> GenerationSpec {
        GenerationSpec {
            subject: subject.into(),
            topic: "general".into(),
            difficulty: Difficulty::Medium,
            question_type,
            count,
            language: "en".into(),
        }
    }

    #[tokio::test]
    async fn offline_generator_cycles_templates_with_wraparound() {
        let generator = QuestionGenerator::offline();
        let questions = generator
            .generate(&spec("mathematics", QuestionType::SingleChoice, 5))
            .await;

        assert_eq!(questions.len(), 5);
        // Two math MCQ templates cycle: 0, 1, 0, 1, 0.
        assert_eq!(questions[0].text, questions[2].text);
        assert_eq!(questions[1].text, questions[3].text);
        assert_ne!(questions[0].text, questions[1].text);
        assert!(questions.iter().all(|q| q.provenance == Provenance::Template));
        assert!(questions.iter().all(Question::is_well_formed));
    }

    #[tokio::test]
    async fn unknown_subject_gets_generic_parametrized_template() {
        let generator = QuestionGenerator::offline();
        let mut request = spec("geography", QuestionType::Descriptive, 2);
        request.topic = "river systems".into();
        let questions = generator.generate(&request).await;

        assert_eq!(questions.len(), 2);
        assert!(questions[0].text.contains("river systems"));
        assert!(questions[0].text.contains("geography"));
        assert_eq!(questions[0].marks, 5);
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_templates() {
        let generator = QuestionGenerator::new(Some(Arc::new(FailingCompletion)));
        let questions = generator
            .generate(&spec("physics", QuestionType::SingleChoice, 3))
            .await;
        assert_eq!(questions.len(), 3);
        assert!(questions.iter().all(|q| q.provenance == Provenance::Template));
    }

    #[tokio::test]
    async fn unparseable_output_falls_back_to_templates() {
        let generator = QuestionGenerator::new(Some(Arc::new(CannedCompletion(
            "I cannot help with that.".into(),
        ))));
        let questions = generator
            .generate(&spec("biology", QuestionType::SingleChoice, 2))
            .await;
        assert_eq!(questions.len(), 2);
        assert!(questions.iter().all(|q| q.provenance == Provenance::Template));
    }

    #[tokio::test]
    async fn well_formed_output_is_used_as_is() {
        let response = "\
Q1: Which planet is known as the Red Planet?
A) Venus
B) Mars
C) Jupiter
D) Saturn
Correct Answer: B
Explanation: Iron oxide gives Mars its color.
";
        let generator =
            QuestionGenerator::new(Some(Arc::new(CannedCompletion(response.into()))));
        let questions = generator
            .generate(&spec("physics", QuestionType::SingleChoice, 1))
            .await;

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].provenance, Provenance::Generated);
        assert_eq!(questions[0].correct_choice.as_deref(), Some("b"));
    }

    #[test]
    fn topic_extraction_matches_vocabulary() {
        assert_eq!(
            extract_topics("Algebra Basics Quiz", "mathematics"),
            vec!["algebra".to_string()]
        );
        // Substring match in either direction.
        assert_eq!(
            extract_topics("quantum mechanics review", "physics"),
            vec!["quantum".to_string(), "mechanics".to_string()]
        );
        // No vocabulary hit: the subject itself is the sole topic.
        assert_eq!(
            extract_topics("Midterm Review", "mathematics"),
            vec!["mathematics".to_string()]
        );
    }

    #[tokio::test]
    async fn title_fallback_cycles_types_and_keys_marks_by_difficulty() {
        let generator = QuestionGenerator::offline();

        for (difficulty, choice_marks, free_marks, correct) in [
            (Difficulty::Easy, 1, 3, "a"),
            (Difficulty::Medium, 2, 5, "b"),
            (Difficulty::Hard, 3, 8, "b"),
        ] {
            let questions = generator
                .generate_from_title(&TitleGenerationSpec {
                    quiz_title: "Algebra Fundamentals".into(),
                    subject: "mathematics".into(),
                    difficulty,
                    count: 4,
                    allowed_types: vec![],
                })
                .await;

            assert_eq!(questions.len(), 4);
            assert_eq!(questions[0].question_type, QuestionType::SingleChoice);
            assert_eq!(questions[1].question_type, QuestionType::ShortAnswer);
            assert_eq!(questions[2].question_type, QuestionType::SingleChoice);
            assert_eq!(questions[0].marks, choice_marks);
            assert_eq!(questions[1].marks, free_marks);
            assert_eq!(questions[0].correct_choice.as_deref(), Some(correct));
            assert_eq!(questions[0].topic, "algebra");
        }
    }

    #[tokio::test]
    async fn title_ai_path_stamps_default_marks() {
        let response = "\
Q1: Pick the data structure with O(1) lookup.
Type: MCQ
A) Linked list
B) Hash map
Correct Answer: b
Explanation: Hash maps have constant-time average lookup.

Q2: Explain what a stack is.
Type: Short Answer
Sample Answer: A last-in-first-out collection.
";
        let generator =
            QuestionGenerator::new(Some(Arc::new(CannedCompletion(response.into()))));
        let questions = generator
            .generate_from_title(&TitleGenerationSpec {
                quiz_title: "Data Structures 101".into(),
                subject: "computer science".into(),
                difficulty: Difficulty::Medium,
                count: 5,
                allowed_types: vec![],
            })
            .await;

        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].marks, 2);
        assert_eq!(questions[1].marks, 5);
        assert_eq!(questions[1].key_points, "Key concepts and explanations");
    }
}
