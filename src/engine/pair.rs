//! Farming verdict for a two-token liquidity pair.

use super::BoundsResult;
use crate::utils::stats::round_to;
use serde::{Deserialize, Serialize};

const SAFE_THRESHOLD: f64 = 75.0;
const MODERATE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    SafeToFarm,
    ModerateFarm,
    HighRiskFarm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Hold,
    Avoid,
}

impl Recommendation {
    /// Verdict for an averaged safety score
    pub fn from_safety(score: f64) -> Self {
        if score >= SAFE_THRESHOLD {
            Recommendation::SafeToFarm
        } else if score >= MODERATE_THRESHOLD {
            Recommendation::ModerateFarm
        } else {
            Recommendation::HighRiskFarm
        }
    }

    pub fn signal(self) -> Signal {
        match self {
            | Recommendation::SafeToFarm => Signal::Buy,
            | Recommendation::ModerateFarm => Signal::Hold,
            | Recommendation::HighRiskFarm => Signal::Avoid,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            | Recommendation::SafeToFarm => "Safe to farm. Low volatility expected.",
            | Recommendation::ModerateFarm => "Moderate risk. Consider a smaller position.",
            | Recommendation::HighRiskFarm => "High volatility. Not recommended.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairAnalysis {
    /// "A/B" in upper case
    pub pair: String,
    pub token_a: BoundsResult,
    pub token_b: BoundsResult,
    /// Mean of both safety scores, 1 decimal
    pub safety_score: f64,
    pub recommendation: Recommendation,
    pub signal: Signal,
    pub message: String,
}

impl PairAnalysis {
    pub fn from_bounds(token_a: BoundsResult, token_b: BoundsResult) -> Self {
        let average = (token_a.safety_score + token_b.safety_score) / 2.0;
        let recommendation = Recommendation::from_safety(average);
        Self {
            pair: format!("{}/{}", token_a.token, token_b.token),
            safety_score: round_to(average, 1),
            recommendation,
            signal: recommendation.signal(),
            message: recommendation.message().to_string(),
            token_a,
            token_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BoundsEngine, BoundsRequest};
    use rstest::rstest;

    #[rstest]
    #[case(75.0, Recommendation::SafeToFarm, Signal::Buy)]
    #[case(74.9, Recommendation::ModerateFarm, Signal::Hold)]
    #[case(50.0, Recommendation::ModerateFarm, Signal::Hold)]
    #[case(49.9, Recommendation::HighRiskFarm, Signal::Avoid)]
    fn test_thresholds(#[case] score: f64, #[case] recommendation: Recommendation, #[case] signal: Signal) {
        assert_eq!(Recommendation::from_safety(score), recommendation);
        assert_eq!(recommendation.signal(), signal);
    }

    #[test]
    fn test_pair_from_engine_results() {
        let engine = BoundsEngine::default();
        let sol = engine.compute_bounds(&BoundsRequest::new("sol").with_price(150.0));
        let usdc = engine.compute_bounds(&BoundsRequest::new("usdc").with_price(1.0));

        let analysis = PairAnalysis::from_bounds(sol.clone(), usdc.clone());
        assert_eq!(analysis.pair, "SOL/USDC");
        assert_eq!(analysis.safety_score, round_to((sol.safety_score + usdc.safety_score) / 2.0, 1));
        assert_eq!(analysis.signal, analysis.recommendation.signal());

        let json = serde_json::to_value(&analysis).unwrap();
        assert!(matches!(json["signal"].as_str(), Some("BUY" | "HOLD" | "AVOID")));
    }
}
