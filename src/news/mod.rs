//! # News Recency Selection
//!
//! Picks which headlines feed sentiment. Fresh news (last 24h) beats older
//! news (24h to 72h); when neither tier has anything, the first few raw
//! headlines are used so a stale feed still yields a signal.

use crate::utils::types::Headline;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Upper age bound of the fresh tier, in hours (inclusive)
pub const FRESH_MAX_AGE_HOURS: i64 = 24;
/// Upper age bound of the older tier, in hours (inclusive)
pub const OLDER_MAX_AGE_HOURS: i64 = 72;
/// Headlines kept by the raw fallback
pub const RAW_FALLBACK_LIMIT: usize = 5;

/// The tier a selection was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyTier {
    Fresh,
    Older,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecencySelection {
    pub tier: RecencyTier,
    pub headlines: Vec<Headline>,
}

impl RecencySelection {
    pub fn is_empty(&self) -> bool {
        self.headlines.is_empty()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.headlines.iter().map(|h| h.text.as_str()).collect()
    }
}

/// Stateless recency filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsRecencySelector;

impl NewsRecencySelector {
    pub fn new() -> Self {
        Self
    }

    /// Select headlines relative to `now`.
    ///
    /// Headlines dated in the future count as fresh. A headline with empty
    /// text or without an RFC 3339 timestamp never enters a tier, though it
    /// may still be picked by the raw fallback when it has text.
    pub fn select(&self, headlines: &[Headline], now: DateTime<Utc>) -> RecencySelection {
        let fresh_cutoff = Duration::hours(FRESH_MAX_AGE_HOURS);
        let older_cutoff = Duration::hours(OLDER_MAX_AGE_HOURS);

        let mut fresh = Vec::new();
        let mut older = Vec::new();

        for headline in headlines.iter().filter(|h| has_text(h)) {
            let Some(published) = headline.published_at_utc() else {
                log::debug!("dropping headline with unusable timestamp {:?}", headline.published_at);
                continue;
            };
            let age = now - published;
            if age <= fresh_cutoff {
                fresh.push(headline.clone());
            } else if age <= older_cutoff {
                older.push(headline.clone());
            }
        }

        if !fresh.is_empty() {
            log::debug!("selected {} fresh headlines", fresh.len());
            return RecencySelection { tier: RecencyTier::Fresh, headlines: fresh };
        }
        if !older.is_empty() {
            log::debug!("no fresh news, selected {} older headlines", older.len());
            return RecencySelection { tier: RecencyTier::Older, headlines: older };
        }

        let raw: Vec<Headline> = headlines.iter().filter(|h| has_text(h)).take(RAW_FALLBACK_LIMIT).cloned().collect();
        log::debug!("no recent news, falling back to {} raw headlines", raw.len());
        RecencySelection { tier: RecencyTier::Raw, headlines: raw }
    }
}

fn has_text(headline: &Headline) -> bool {
    !headline.text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 6, 12, 0, 0).unwrap()
    }

    fn aged(text: &str, hours: i64) -> Headline {
        Headline::at(text, now() - Duration::hours(hours))
    }

    #[test]
    fn test_fresh_wins_over_older() {
        let headlines = vec![aged("now", 0), aged("thirty hours", 30), aged("eighty hours", 80)];
        let selection = NewsRecencySelector::new().select(&headlines, now());
        assert_eq!(selection.tier, RecencyTier::Fresh);
        assert_eq!(selection.texts(), vec!["now"]);
    }

    #[test]
    fn test_older_when_nothing_fresh() {
        let headlines = vec![aged("a", 30), aged("b", 80), aged("c", 72)];
        let selection = NewsRecencySelector::new().select(&headlines, now());
        assert_eq!(selection.tier, RecencyTier::Older);
        assert_eq!(selection.texts(), vec!["a", "c"]);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let selection = NewsRecencySelector::new().select(&[aged("edge", 24)], now());
        assert_eq!(selection.tier, RecencyTier::Fresh);
    }

    #[test]
    fn test_future_dated_is_fresh() {
        let selection = NewsRecencySelector::new().select(&[aged("tomorrow", -5)], now());
        assert_eq!(selection.tier, RecencyTier::Fresh);
    }

    #[test]
    fn test_raw_fallback_keeps_first_five_in_order() {
        let mut headlines: Vec<Headline> = (0..7).map(|i| aged(&format!("stale {i}"), 200)).collect();
        headlines.insert(1, Headline::new("   ", None));
        headlines.insert(3, Headline::new("undated", None));

        let selection = NewsRecencySelector::new().select(&headlines, now());
        assert_eq!(selection.tier, RecencyTier::Raw);
        assert_eq!(selection.texts(), vec!["stale 0", "stale 1", "undated", "stale 2", "stale 3"]);
    }

    #[test]
    fn test_unparseable_timestamps_never_enter_a_tier() {
        let headlines = vec![
            Headline::new("naive", Some("2026-01-06T11:00:00".into())),
            Headline::new("garbage", Some("an hour ago".into())),
            aged("older", 40),
        ];
        let selection = NewsRecencySelector::new().select(&headlines, now());
        assert_eq!(selection.tier, RecencyTier::Older);
        assert_eq!(selection.texts(), vec!["older"]);
    }

    #[test]
    fn test_empty_text_is_dropped_from_fresh() {
        let headlines = vec![aged("", 1), aged("stale", 100)];
        let selection = NewsRecencySelector::new().select(&headlines, now());
        assert_eq!(selection.tier, RecencyTier::Raw);
        assert_eq!(selection.texts(), vec!["stale"]);
    }

    #[test]
    fn test_empty_input() {
        let selection = NewsRecencySelector::new().select(&[], now());
        assert_eq!(selection.tier, RecencyTier::Raw);
        assert!(selection.is_empty());
    }
}
