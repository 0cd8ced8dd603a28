//! Safety scores reach the metrics recorder from the service, never from the
//! engine itself. Kept in its own test binary because it installs a global
//! recorder.

use async_trait::async_trait;
use metrics::{Counter, Gauge, Histogram, HistogramFn, Key, KeyName, Recorder, SharedString, Unit};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use yieldsense::sources::{NoHistory, NoNews, PriceSource};
use yieldsense::{BoundsEngine, BoundsRequest, BoundsService, ConfidenceLevel, PriceQuote};

static SAFETY_RECORDS: AtomicUsize = AtomicUsize::new(0);

struct SafetyHits;

impl HistogramFn for SafetyHits {
    fn record(&self, _value: f64) {
        SAFETY_RECORDS.fetch_add(1, Ordering::SeqCst);
    }
}

struct SafetyRecorder;

impl Recorder for SafetyRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}
    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn register_counter(&self, _key: &Key) -> Counter {
        Counter::noop()
    }

    fn register_gauge(&self, _key: &Key) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key) -> Histogram {
        match key.name() {
            | "yieldsense_safety_score" => Histogram::from_arc(Arc::new(SafetyHits)),
            | _ => Histogram::noop(),
        }
    }
}

struct SolPrice;

#[async_trait]
impl PriceSource for SolPrice {
    async fn fetch_current_price(&self, _symbol: &str) -> yieldsense::Result<PriceQuote> {
        Ok(PriceQuote::new(150.0, 1.5))
    }
}

#[tokio::test]
async fn safety_score_is_recorded_per_service_call() {
    metrics::set_boxed_recorder(Box::new(SafetyRecorder)).unwrap();

    let engine = BoundsEngine::default();
    engine.compute_bounds(&BoundsRequest::new("sol").with_price(150.0));
    engine.compute_bounds(&BoundsRequest::new("usdc").with_price(1.0));
    assert_eq!(SAFETY_RECORDS.load(Ordering::SeqCst), 0);

    let svc = BoundsService::new(engine, Arc::new(SolPrice), Arc::new(NoHistory), Arc::new(NoNews));
    let result = svc.bounds("sol", None, ConfidenceLevel::P80).await;
    assert_eq!(result.current_price, 150.0);
    assert_eq!(SAFETY_RECORDS.load(Ordering::SeqCst), 1);
}
