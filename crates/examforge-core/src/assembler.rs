//! Paper assembly: blends bank questions and generated questions into a
//! finished [`Paper`] according to a [`PaperConfig`].
//!
//! Assembly is best-effort and never fails on a question shortfall; a section
//! that ends up short is still emitted (see [`Section::is_short`]).

use std::sync::Arc;

use chrono::Utc;
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::bank::{BankQuery, ContentBank};
use crate::generator::{GenerationSpec, QuestionGenerator};
use crate::model::{Paper, PaperConfig, Question, Section, SectionConfig};

/// Assembles question papers from a shared bank and generator.
pub struct PaperAssembler {
    bank: Arc<ContentBank>,
    generator: Arc<QuestionGenerator>,
}

impl PaperAssembler {
    pub fn new(bank: Arc<ContentBank>, generator: Arc<QuestionGenerator>) -> Self {
        Self { bank, generator }
    }

    /// Build a paper from the config. Section order follows the config;
    /// question order within a blended section is shuffled.
    pub async fn assemble(&self, config: &PaperConfig) -> Paper {
        let mut sections = Vec::with_capacity(config.sections.len());
        for section_config in &config.sections {
            sections.push(self.assemble_section(section_config, &config.language).await);
        }

        let total_marks = sections.iter().map(|s| s.total_marks).sum();

        Paper {
            id: Uuid::new_v4(),
            title: config.title.clone(),
            subject: config.subject.clone(),
            duration_minutes: config.duration_minutes,
            instructions: config.instructions.clone(),
            language: config.language.clone(),
            sections,
            total_marks,
            created_at: Utc::now(),
        }
    }

    async fn assemble_section(&self, config: &SectionConfig, language: &str) -> Section {
        let mut questions = match &config.questions {
            // Pre-built list bypasses the blend entirely.
            Some(prebuilt) => prebuilt.clone(),
            None => self.blend_questions(config, language).await,
        };

        // The section's per-question value always wins over whatever the
        // source question carried.
        for q in &mut questions {
            q.marks = config.marks_per_question;
        }

        if questions.len() < config.count && config.questions.is_none() {
            tracing::warn!(
                section = %config.title,
                requested = config.count,
                collected = questions.len(),
                "section is short of requested questions"
            );
        }

        let total_marks = questions.len() as u32 * config.marks_per_question;

        Section {
            title: config.title.clone(),
            instructions: config.instructions.clone(),
            questions,
            marks_per_question: config.marks_per_question,
            total_marks,
        }
    }

    /// Source `config.count` questions: a truncated `count * ai_ratio` share
    /// from the generator, the rest from the bank with a topic-relaxed
    /// backfill, then shuffle.
    async fn blend_questions(&self, config: &SectionConfig, language: &str) -> Vec<Question> {
        let ai_count = (config.count as f64 * config.ai_ratio) as usize;
        let bank_count = config.count.saturating_sub(ai_count);

        let mut collected = self.bank.query(&BankQuery {
            subject: Some(config.subject.clone()),
            topic: Some(config.topic.clone()),
            difficulty: Some(config.difficulty),
            question_type: Some(config.question_type),
            limit: Some(bank_count),
            ..Default::default()
        });

        // Topic-relaxed backfill, deduplicated on exact question text.
        if collected.len() < bank_count {
            let relaxed = self.bank.query(&BankQuery {
                subject: Some(config.subject.clone()),
                difficulty: Some(config.difficulty),
                question_type: Some(config.question_type),
                ..Default::default()
            });
            for candidate in relaxed {
                if collected.len() >= bank_count {
                    break;
                }
                if !collected.iter().any(|q| q.text == candidate.text) {
                    collected.push(candidate);
                }
            }
        }

        let remaining = config.count.saturating_sub(collected.len());
        if remaining > 0 {
            let generated = self
                .generator
                .generate(&GenerationSpec {
                    subject: config.subject.clone(),
                    topic: config.topic.clone(),
                    difficulty: config.difficulty,
                    question_type: config.question_type,
                    count: remaining,
                    language: language.to_string(),
                })
                .await;
            collected.extend(generated);
        }

        collected.shuffle(&mut rand::thread_rng());
        collected.truncate(config.count);
        collected
    }
}
