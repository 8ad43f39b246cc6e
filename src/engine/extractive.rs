//! Offline extractive question answering.
//!
//! Picks the context sentence that shares the most content words with the
//! question. No model weights are involved; the identifiers are only checked
//! for presence so that loading behaves like any other backend.

use std::collections::HashSet;

use super::{EngineError, InferenceEngine, Pipeline, require_identifier};

/// Words too common to say anything about relevance.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "did", "do", "does", "for", "from", "has",
    "have", "how", "in", "is", "it", "its", "of", "on", "or", "that", "the", "this", "to", "was",
    "were", "what", "when", "where", "which", "who", "whom", "why", "with",
];

/// Engine producing [`SentencePipeline`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractiveEngine;

impl ExtractiveEngine {
    pub fn new() -> Self {
        Self
    }
}

impl InferenceEngine for ExtractiveEngine {
    fn load(&self, tokenizer: &str, model: &str) -> Result<Box<dyn Pipeline>, EngineError> {
        require_identifier("tokenizer", tokenizer, model)?;
        require_identifier("model", model, model)?;
        Ok(Box::new(SentencePipeline))
    }
}

/// Returns the best-overlapping sentence of the context.
#[derive(Debug)]
struct SentencePipeline;

impl Pipeline for SentencePipeline {
    fn answer(&self, question: &str, context: &str) -> Result<String, EngineError> {
        Ok(best_sentence(question, context).unwrap_or_default().to_string())
    }
}

fn best_sentence<'a>(question: &str, context: &'a str) -> Option<&'a str> {
    let wanted = content_words(question);

    let mut best: Option<(&str, usize)> = None;
    for sentence in split_sentences(context) {
        let score = content_words(sentence).intersection(&wanted).count();
        // strict comparison keeps the earliest sentence on ties
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((sentence, score));
        }
    }

    best.map(|(sentence, _)| sentence)
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(|s| s.trim().trim_end_matches(['.', '!', '?']).trim())
        .filter(|s| !s.is_empty())
}

fn content_words(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
