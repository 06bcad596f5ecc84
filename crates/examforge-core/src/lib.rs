//! examforge-core — Paper assembly and response evaluation.
//!
//! This crate holds the data model, the static content bank, the question
//! generator with its deterministic template fallback, the paper assembler,
//! and the response evaluator. Network access lives entirely behind the
//! `TextCompletion` trait so every fallback path is testable offline.

pub mod assembler;
pub mod bank;
pub mod evaluator;
pub mod generator;
pub mod model;
pub mod parser;
pub mod report;
pub mod traits;
