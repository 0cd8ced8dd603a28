//! Counters and histograms emitted through the `metrics` facade.
//!
//! Nothing here installs a recorder; embedding applications choose their own
//! exporter. Without one every call is a no-op.

/// Count a collaborator call that was replaced by its fallback value.
///
/// `collaborator` names the capability (forecaster, classifier, price, history,
/// news) and `reason` why the fallback was taken (error, timeout, no_model, ...).
pub fn record_fallback(collaborator: &'static str, reason: &'static str) {
    ::metrics::increment_counter!(
        "yieldsense_collaborator_fallbacks_total",
        "collaborator" => collaborator,
        "reason" => reason
    );
}

/// Record the safety score produced for a symbol.
pub fn record_safety_score(symbol: &str, safety_score: f64) {
    ::metrics::histogram!("yieldsense_safety_score", safety_score, "symbol" => symbol.to_string());
}
