//! Analytics store: append-only usage rows and period-based aggregation.
//!
//! Rows are never merged; repeated `record_usage` calls for the same
//! (service, period) pair accumulate as separate rows and aggregation sums
//! across exact period matches.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::keys;
use crate::models::{Period, PeriodTotals, UsageStats};
use crate::seed;
use crate::storage::Storage;

/// Persisted app settings blob (the `settings` key).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    selected_period: Option<Period>,
}

struct Inner {
    stats: Vec<UsageStats>,
    selected_period: Period,
}

#[derive(Clone)]
pub struct AnalyticsStore {
    storage: Storage,
    inner: Arc<RwLock<Inner>>,
}

impl AnalyticsStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            storage,
            inner: Arc::new(RwLock::new(Inner {
                stats: Vec::new(),
                selected_period: Period::Monthly,
            })),
        }
    }

    /// Read persisted rows (seeding mock data on first run) and the
    /// selected period from settings.
    pub fn load(&self) {
        match self.storage.get::<Vec<UsageStats>>(keys::USAGE_STATS) {
            Ok(Some(stats)) => self.inner.write().stats = stats,
            Ok(None) => {
                let stats = seed::demo_usage_stats();
                let mut inner = self.inner.write();
                if let Err(e) = self.storage.set(keys::USAGE_STATS, &stats) {
                    warn!("failed to persist seeded usage stats: {e}");
                }
                inner.stats = stats;
            }
            Err(e) => warn!("failed to load usage stats: {e}"),
        }

        match self.storage.get::<Settings>(keys::SETTINGS) {
            Ok(Some(settings)) => {
                if let Some(period) = settings.selected_period {
                    self.inner.write().selected_period = period;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("failed to load settings: {e}"),
        }
    }

    // ===== Query Methods =====

    pub fn stats(&self) -> Vec<UsageStats> {
        self.inner.read().stats.clone()
    }

    pub fn stats_for(&self, period: Period) -> Vec<UsageStats> {
        self.inner
            .read()
            .stats
            .iter()
            .filter(|s| s.period == period)
            .cloned()
            .collect()
    }

    /// Sum cost, message count and token count over rows matching `period`.
    pub fn aggregate(&self, period: Period) -> PeriodTotals {
        let inner = self.inner.read();
        let mut totals = PeriodTotals::default();
        for stat in inner.stats.iter().filter(|s| s.period == period) {
            totals.messages_count += stat.messages_count;
            totals.tokens_used += stat.tokens_used;
            totals.cost += stat.cost;
        }
        totals
    }

    pub fn selected_period(&self) -> Period {
        self.inner.read().selected_period
    }

    pub fn current_totals(&self) -> PeriodTotals {
        self.aggregate(self.selected_period())
    }

    // ===== Mutation Methods =====

    /// Append one row. No merge/upsert.
    pub fn record_usage(&self, stat: UsageStats) -> bool {
        let mut inner = self.inner.write();
        inner.stats.push(stat);
        // Persisting under the write lock serializes writers on the blob.
        if let Err(e) = self.storage.set(keys::USAGE_STATS, &inner.stats) {
            warn!("failed to persist usage stats: {e}");
        }
        true
    }

    pub fn set_period(&self, period: Period) {
        let mut inner = self.inner.write();
        inner.selected_period = period;
        let settings = Settings {
            selected_period: Some(period),
        };
        if let Err(e) = self.storage.set(keys::SETTINGS, &settings) {
            warn!("failed to persist settings: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store(dir: &std::path::Path) -> AnalyticsStore {
        let store = AnalyticsStore::new(Storage::new(dir).unwrap());
        store.load();
        store
    }

    fn row(service: &str, cost: f64, period: Period) -> UsageStats {
        UsageStats {
            ai_service: service.to_string(),
            messages_count: 10,
            tokens_used: 2_000,
            cost,
            period,
        }
    }

    #[test]
    fn test_seeded_daily_aggregate() {
        let dir = tempdir().unwrap();
        let analytics = store(dir.path());

        // Seed carries 0.03 (ai-1) and 0.02 (ai-3) daily rows.
        let totals = analytics.aggregate(Period::Daily);
        assert!((totals.cost - 0.05).abs() < 1e-9);
        assert_eq!(totals.messages_count, 13);
        assert_eq!(totals.tokens_used, 2_400);
    }

    #[test]
    fn test_record_usage_accumulates_rows() {
        let dir = tempdir().unwrap();
        let analytics = store(dir.path());
        let before = analytics.stats_for(Period::Daily).len();

        assert!(analytics.record_usage(row("ai-1", 0.10, Period::Daily)));
        assert!(analytics.record_usage(row("ai-1", 0.10, Period::Daily)));

        // Separate rows, no upsert.
        assert_eq!(analytics.stats_for(Period::Daily).len(), before + 2);
    }

    #[test]
    fn test_aggregate_matches_period_exactly() {
        let dir = tempdir().unwrap();
        let analytics = store(dir.path());

        let weekly = analytics.aggregate(Period::Weekly);
        assert!((weekly.cost - 0.26).abs() < 1e-9);

        analytics.record_usage(row("ai-2", 1.0, Period::Monthly));
        let weekly_after = analytics.aggregate(Period::Weekly);
        assert!((weekly_after.cost - weekly.cost).abs() < 1e-9);
    }

    #[test]
    fn test_selected_period_persists() {
        let dir = tempdir().unwrap();
        let analytics = store(dir.path());
        assert_eq!(analytics.selected_period(), Period::Monthly);

        analytics.set_period(Period::Daily);
        assert_eq!(analytics.selected_period(), Period::Daily);
        assert!((analytics.current_totals().cost - 0.05).abs() < 1e-9);

        let restarted = store(dir.path());
        assert_eq!(restarted.selected_period(), Period::Daily);
    }

    #[test]
    fn test_rows_survive_restart() {
        let dir = tempdir().unwrap();
        let analytics = store(dir.path());
        analytics.record_usage(row("ai-4", 0.42, Period::Monthly));

        let restarted = store(dir.path());
        assert_eq!(restarted.stats(), analytics.stats());
    }
}
