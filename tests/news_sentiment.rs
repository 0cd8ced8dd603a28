//! News recency selection feeding sentiment aggregation.

use chrono::{DateTime, Duration, TimeZone, Utc};
use yieldsense::sentiment::{SentimentLabel, Trend};
use yieldsense::{BoundsEngine, Headline, NewsRecencySelector, RecencyTier, SentimentSummary};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 6, 18, 0, 0).unwrap()
}

fn hours_ago(text: &str, hours: i64) -> Headline {
    Headline::at(text, now() - Duration::hours(hours))
}

#[test]
fn empty_headlines_give_exact_neutral_summary() {
    let summary = BoundsEngine::default().aggregate_sentiment::<&str>(&[]);
    assert_eq!(summary, SentimentSummary::neutral());
    assert_eq!(summary.net_sentiment, 0.0);
    assert_eq!(summary.confidence, 0.0);
    assert_eq!(summary.trend, Trend::Neutral);
    assert!(summary.headlines.is_empty());
}

#[test]
fn only_the_fresh_headline_is_selected() {
    let headlines = vec![hours_ago("now", 0), hours_ago("thirty hours ago", 30), hours_ago("eighty hours ago", 80)];
    let selection = NewsRecencySelector::new().select(&headlines, now());
    assert_eq!(selection.tier, RecencyTier::Fresh);
    assert_eq!(selection.texts(), vec!["now"]);
}

#[test]
fn cryptopanic_style_timestamps_are_understood() {
    let headlines = vec![
        Headline::new("Solana DEX volume hits record high", Some("2026-01-06T16:40:00Z".into())),
        Headline::new("Validator outage slows network", Some("2026-01-05T09:00:00+00:00".into())),
    ];
    let selection = NewsRecencySelector::new().select(&headlines, now());
    assert_eq!(selection.tier, RecencyTier::Fresh);
    assert_eq!(selection.headlines.len(), 1);
}

#[test]
fn selected_news_drives_sentiment() {
    let headlines = vec![
        hours_ago("Jupiter surges as volume jumps to record", 3),
        hours_ago("Strong inflows lift JUP", 5),
        hours_ago("Exploit drains lending pool", 60),
    ];
    let selection = NewsRecencySelector::new().select(&headlines, now());
    let summary = BoundsEngine::default().aggregate_sentiment(&selection.texts());

    assert_eq!(summary.headlines.len(), 2);
    assert!(summary.headlines.iter().all(|h| h.sentiment == SentimentLabel::Positive));
    assert!(summary.net_sentiment > 0.15);
    assert_eq!(summary.trend, Trend::Bullish);
    assert!(summary.confidence > 0.0 && summary.confidence <= 1.0);
}

#[test]
fn stale_feed_falls_back_to_raw_headlines() {
    let headlines: Vec<Headline> = (0..8).map(|i| hours_ago(&format!("week-old story {i}"), 24 * 7 + i)).collect();
    let selection = NewsRecencySelector::new().select(&headlines, now());
    assert_eq!(selection.tier, RecencyTier::Raw);
    assert_eq!(selection.headlines.len(), 5);
    assert_eq!(selection.headlines[0].text, "week-old story 0");
}
