//! Rule-based financial lexicon classifier.
//!
//! A dependency-free [`Classifier`] backend: word scores from a small crypto
//! and finance lexicon, flipped by a preceding negation and scaled by a
//! preceding intensifier. Positive and negative mass are normalised against
//! a unit neutral mass so the three probabilities sum to one.

use super::{ClassProbabilities, Classifier};
use crate::{Error, Result};
use std::collections::HashMap;

/// Tokens looked back over when searching for a negation
const NEGATION_WINDOW: usize = 3;

pub struct LexiconClassifier {
    words: HashMap<&'static str, f64>,
    negations: Vec<&'static str>,
    intensifiers: HashMap<&'static str, f64>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LexiconClassifier {
    pub fn new() -> Self {
        let words: HashMap<&'static str, f64> = [
            // positive
            ("bullish", 0.8),
            ("surge", 0.7),
            ("rally", 0.7),
            ("soar", 0.8),
            ("gain", 0.5),
            ("profit", 0.6),
            ("growth", 0.6),
            ("rise", 0.5),
            ("jump", 0.6),
            ("climb", 0.5),
            ("record", 0.6),
            ("high", 0.4),
            ("upgrade", 0.6),
            ("breakout", 0.6),
            ("recovery", 0.5),
            ("rebound", 0.5),
            ("adoption", 0.5),
            ("partnership", 0.5),
            ("launch", 0.3),
            ("listing", 0.4),
            ("approval", 0.6),
            ("inflow", 0.5),
            ("strong", 0.5),
            ("outperform", 0.7),
            ("milestone", 0.5),
            // negative
            ("bearish", -0.8),
            ("crash", -0.9),
            ("plunge", -0.8),
            ("drop", -0.6),
            ("fall", -0.5),
            ("decline", -0.6),
            ("slump", -0.7),
            ("loss", -0.6),
            ("weak", -0.5),
            ("fear", -0.6),
            ("risk", -0.4),
            ("volatile", -0.3),
            ("uncertainty", -0.5),
            ("downgrade", -0.6),
            ("sell-off", -0.7),
            ("selloff", -0.7),
            ("dump", -0.7),
            ("outflow", -0.5),
            ("hack", -0.9),
            ("exploit", -0.9),
            ("outage", -0.7),
            ("lawsuit", -0.6),
            ("scam", -0.9),
            ("fraud", -0.9),
            ("depeg", -0.9),
            ("liquidation", -0.6),
            ("warning", -0.5),
        ]
        .into_iter()
        .collect();

        let negations = vec![
            "not", "no", "never", "without", "cannot", "cant", "don't", "dont", "doesn't", "doesnt",
            "didn't", "didnt", "won't", "wont", "isn't", "isnt", "aren't", "arent", "wasn't", "wasnt",
            "hardly", "barely",
        ];

        let intensifiers: HashMap<&'static str, f64> = [
            ("very", 1.5),
            ("extremely", 2.0),
            ("highly", 1.5),
            ("significantly", 1.5),
            ("sharply", 1.6),
            ("massive", 1.7),
            ("massively", 1.8),
            ("huge", 1.6),
            ("slightly", 0.5),
            ("somewhat", 0.7),
            ("marginally", 0.5),
        ]
        .into_iter()
        .collect();

        Self { words, negations, intensifiers }
    }

    /// Lexicon score of a single token, trying common inflections.
    fn word_score(&self, token: &str) -> Option<f64> {
        if let Some(score) = self.words.get(token) {
            return Some(*score);
        }
        if let Some(stem) = token.strip_suffix("ies") {
            if let Some(score) = self.words.get(format!("{stem}y").as_str()) {
                return Some(*score);
            }
        }
        for suffix in ["s", "es", "ed", "d", "ing"] {
            if let Some(stem) = token.strip_suffix(suffix) {
                if let Some(score) = self.words.get(stem) {
                    return Some(*score);
                }
                // "surging" -> "surg" + "e"
                if suffix == "ing" || suffix == "ed" {
                    if let Some(score) = self.words.get(format!("{stem}e").as_str()) {
                        return Some(*score);
                    }
                }
            }
        }
        None
    }

    fn tokenize(text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .map(|t| t.trim_matches(|c: char| c == '\'' || c == '-').to_lowercase())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

impl Classifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<ClassProbabilities> {
        let tokens = Self::tokenize(text);
        if tokens.is_empty() {
            return Err(Error::InvalidArgument("headline has no words".into()));
        }

        let mut positive = 0.0;
        let mut negative = 0.0;

        for (i, token) in tokens.iter().enumerate() {
            let Some(mut score) = self.word_score(token) else { continue };

            if i > 0 {
                if let Some(factor) = self.intensifiers.get(tokens[i - 1].as_str()) {
                    score *= factor;
                }
            }
            let window_start = i.saturating_sub(NEGATION_WINDOW);
            if tokens[window_start..i].iter().any(|t| self.negations.iter().any(|n| *n == t.as_str())) {
                score = -score * 0.5;
            }

            if score > 0.0 {
                positive += score;
            } else {
                negative += -score;
            }
        }

        let total = positive + negative + 1.0;
        Ok(ClassProbabilities::new(positive / total, negative / total, 1.0 / total))
    }
}
