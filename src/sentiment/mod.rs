//! # Sentiment Aggregation
//!
//! Turns an ordered list of headlines into a net sentiment summary using an
//! external text classifier. Each headline is scored as
//! `p_positive - p_negative`; headlines the classifier cannot handle are
//! skipped. With nothing scored, the summary is the exact neutral value.

mod lexicon;

pub use lexicon::LexiconClassifier;

use crate::utils::stats::{mean, population_std_dev, round_to};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// At most this many headlines are classified per call
pub const MAX_HEADLINES: usize = 10;
/// Confidence reported when only one headline could be scored
pub const SINGLE_SCORE_CONFIDENCE: f64 = 0.8;

const LABEL_THRESHOLD: f64 = 0.1;
const TREND_THRESHOLD: f64 = 0.15;

/// Class probabilities for one text. Expected to sum to about 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

impl ClassProbabilities {
    pub fn new(positive: f64, negative: f64, neutral: f64) -> Self {
        Self { positive, negative, neutral }
    }

    fn is_finite(&self) -> bool {
        self.positive.is_finite() && self.negative.is_finite() && self.neutral.is_finite()
    }

    /// Net score in [-1, 1]
    pub fn score(&self) -> f64 {
        (self.positive - self.negative).clamp(-1.0, 1.0)
    }
}

/// A financial-text sentiment classifier.
///
/// Implementations must be safe to call from several requests at once.
#[cfg_attr(test, mockall::automock)]
pub trait Classifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<ClassProbabilities>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    pub fn from_score(score: f64) -> Self {
        if score > LABEL_THRESHOLD {
            SentimentLabel::Positive
        } else if score < -LABEL_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl Trend {
    pub fn from_net(net_sentiment: f64) -> Self {
        if net_sentiment > TREND_THRESHOLD {
            Trend::Bullish
        } else if net_sentiment < -TREND_THRESHOLD {
            Trend::Bearish
        } else {
            Trend::Neutral
        }
    }
}

/// Per-headline classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineSentiment {
    pub headline: String,
    pub sentiment: SentimentLabel,
    /// Net score rounded to 4 decimals
    pub score: f64,
}

/// Net sentiment over a batch of headlines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub net_sentiment: f64,
    pub confidence: f64,
    pub trend: Trend,
    pub headlines: Vec<HeadlineSentiment>,
}

impl SentimentSummary {
    /// The summary for "no usable headlines"
    pub fn neutral() -> Self {
        Self { net_sentiment: 0.0, confidence: 0.0, trend: Trend::Neutral, headlines: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }
}

/// Aggregates classifier output over a headline batch.
#[derive(Clone)]
pub struct SentimentAggregator {
    classifier: Arc<dyn Classifier>,
}

impl SentimentAggregator {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Classify the first [`MAX_HEADLINES`] headlines and summarise them.
    pub fn aggregate<S: AsRef<str>>(&self, headlines: &[S]) -> SentimentSummary {
        let mut scored = Vec::with_capacity(headlines.len().min(MAX_HEADLINES));
        let mut scores = Vec::with_capacity(headlines.len().min(MAX_HEADLINES));

        for headline in headlines.iter().take(MAX_HEADLINES) {
            let text = headline.as_ref();
            match self.classifier.classify(text) {
                | Ok(probs) if probs.is_finite() => {
                    let score = probs.score();
                    scores.push(score);
                    scored.push(HeadlineSentiment {
                        headline: text.to_string(),
                        sentiment: SentimentLabel::from_score(score),
                        score: round_to(score, 4),
                    });
                }
                | Ok(probs) => {
                    log::warn!("classifier returned non-finite probabilities {:?}, skipping headline", probs);
                    crate::metrics::record_fallback("classifier", "invalid_output");
                }
                | Err(e) => {
                    log::warn!("sentiment error for headline '{}': {}", text, e);
                    crate::metrics::record_fallback("classifier", "error");
                }
            }
        }

        let Some(net_sentiment) = mean(&scores) else {
            return SentimentSummary::neutral();
        };

        let confidence = if scores.len() > 1 {
            (1.0 - population_std_dev(&scores).unwrap_or(0.0)).clamp(0.0, 1.0)
        } else {
            SINGLE_SCORE_CONFIDENCE
        };

        SentimentSummary {
            net_sentiment: net_sentiment.clamp(-1.0, 1.0),
            confidence,
            trend: Trend::from_net(net_sentiment),
            headlines: scored,
        }
    }
}

impl Default for SentimentAggregator {
    fn default() -> Self {
        Self::new(Arc::new(LexiconClassifier::default()))
    }
}

impl std::fmt::Debug for SentimentAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAggregator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use assert_matches::assert_matches;

    fn aggregator_with(f: impl Fn(&str) -> Result<ClassProbabilities> + Send + Sync + 'static) -> SentimentAggregator {
        let mut mock = MockClassifier::new();
        mock.expect_classify().returning(move |text| f(text));
        SentimentAggregator::new(Arc::new(mock))
    }

    #[test]
    fn test_empty_input_is_exact_neutral() {
        let mut mock = MockClassifier::new();
        mock.expect_classify().never();
        let agg = SentimentAggregator::new(Arc::new(mock));
        let summary = agg.aggregate::<&str>(&[]);
        assert_eq!(summary, SentimentSummary::neutral());
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            serde_json::json!({"net_sentiment": 0.0, "confidence": 0.0, "trend": "neutral", "headlines": []})
        );
    }

    #[test]
    fn test_all_failures_is_exact_neutral() {
        let agg = aggregator_with(|_| Err(Error::ModelError("tokenizer missing".into())));
        assert_eq!(agg.aggregate(&["a", "b", "c"]), SentimentSummary::neutral());
    }

    #[test]
    fn test_failed_headline_is_skipped() {
        let agg = aggregator_with(|text| {
            if text == "bad" {
                Err(Error::ModelError("boom".into()))
            } else {
                Ok(ClassProbabilities::new(0.7, 0.1, 0.2))
            }
        });
        let summary = agg.aggregate(&["good", "bad", "good again"]);
        assert_eq!(summary.headlines.len(), 2);
        assert_eq!(summary.headlines[0].headline, "good");
        assert_eq!(summary.headlines[1].headline, "good again");
        assert!((summary.net_sentiment - 0.6).abs() < 1e-12);
        // identical scores agree perfectly
        assert!((summary.confidence - 1.0).abs() < 1e-12);
        assert_eq!(summary.trend, Trend::Bullish);
    }

    #[test]
    fn test_single_score_uses_default_confidence() {
        let agg = aggregator_with(|_| Ok(ClassProbabilities::new(0.1, 0.6, 0.3)));
        let summary = agg.aggregate(&["SOL validator outage"]);
        assert_eq!(summary.confidence, SINGLE_SCORE_CONFIDENCE);
        assert!((summary.net_sentiment + 0.5).abs() < 1e-12);
        assert_eq!(summary.trend, Trend::Bearish);
        assert_matches!(summary.headlines[0].sentiment, SentimentLabel::Negative);
    }

    #[test]
    fn test_confidence_is_one_minus_population_std() {
        let agg = aggregator_with(|text| {
            Ok(if text.starts_with('+') {
                ClassProbabilities::new(0.9, 0.1, 0.0)
            } else {
                ClassProbabilities::new(0.1, 0.5, 0.4)
            })
        });
        let summary = agg.aggregate(&["+up", "-down"]);
        // scores 0.8 and -0.4: mean 0.2, population std 0.6
        assert!((summary.net_sentiment - 0.2).abs() < 1e-12);
        assert!((summary.confidence - 0.4).abs() < 1e-12);
        assert_eq!(summary.trend, Trend::Bullish);
    }

    #[test]
    fn test_only_first_ten_headlines_are_classified() {
        let mut mock = MockClassifier::new();
        mock.expect_classify().times(MAX_HEADLINES).returning(|_| Ok(ClassProbabilities::new(0.2, 0.2, 0.6)));
        let agg = SentimentAggregator::new(Arc::new(mock));
        let headlines: Vec<String> = (0..15).map(|i| format!("headline {i}")).collect();
        let summary = agg.aggregate(&headlines);
        assert_eq!(summary.headlines.len(), MAX_HEADLINES);
        assert_eq!(summary.headlines.last().unwrap().headline, "headline 9");
    }

    #[test]
    fn test_labels_and_trend_thresholds() {
        assert_eq!(SentimentLabel::from_score(0.1), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_score(0.1001), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_score(-0.1001), SentimentLabel::Negative);
        assert_eq!(Trend::from_net(0.15), Trend::Neutral);
        assert_eq!(Trend::from_net(0.16), Trend::Bullish);
        assert_eq!(Trend::from_net(-0.16), Trend::Bearish);
    }

    #[test]
    fn test_non_finite_probabilities_skipped() {
        let agg = aggregator_with(|text| {
            Ok(if text == "nan" {
                ClassProbabilities::new(f64::NAN, 0.0, 0.0)
            } else {
                ClassProbabilities::new(0.3, 0.3, 0.4)
            })
        });
        let summary = agg.aggregate(&["nan", "flat"]);
        assert_eq!(summary.headlines.len(), 1);
        assert_eq!(summary.headlines[0].sentiment, SentimentLabel::Neutral);
    }
}
