//! Surge detection over two trend windows.

use trendwatch_core::{Alert, AlertSettings};

use crate::aggregator::TrendWindows;

/// Percent change from `previous` to `recent`, rounded half up.
///
/// A zero `previous` is treated as 1.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn percentage_change(recent: u64, previous: u64) -> i64 {
    let (recent, previous) = (recent as f64, previous.max(1) as f64);
    let change = (recent - previous) * 100.0 / previous;
    (change + 0.5).floor() as i64
}

/// Keywords in the recent window whose change meets the threshold.
///
/// Returns nothing when alerts are disabled. Alerts are ordered by keyword.
#[must_use]
pub fn detect_surges(windows: &TrendWindows, settings: &AlertSettings) -> Vec<Alert> {
    if !settings.enabled {
        return Vec::new();
    }

    windows
        .recent
        .iter()
        .filter_map(|(keyword, recent)| {
            let previous = windows
                .previous
                .get(keyword)
                .map_or(0, |w| w.count)
                .max(1);
            let change = percentage_change(recent.count, previous);
            (change >= i64::from(settings.threshold)).then(|| Alert {
                keyword: keyword.clone(),
                recent_count: recent.count,
                previous_count: previous,
                percentage_change: change,
                sources: recent.sources.clone(),
            })
        })
        .collect()
}
