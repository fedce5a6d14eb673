//! Windowed login aggregation over a borrowed [`LoginSource`]

use super::classification::UnclassifiedPolicy;
use super::source::{AggregateError, ClassificationLookup, LoginSource};
use super::types::{rank_order, CategoryTotal, ClassificationTotal, DailyCount, WindowDays};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

pub struct Aggregator<S> {
    source: S,
}

impl<S: LoginSource> Aggregator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Daily (day, species, count) rows for events in `[now - window, now]`.
    ///
    /// No events in the window is `Ok` with an empty vector.
    pub fn daily_counts(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<DailyCount>, AggregateError> {
        let rows = self.source.daily_counts(window, now).map_err(|e| {
            log::error!("❌ Daily aggregation failed for window {}: {}", window, e);
            e
        })?;

        if rows.is_empty() {
            log::info!("No logins in the last {}", window);
        }
        Ok(rows)
    }

    /// (species, total) rows straight from the source, leaderboard ordered.
    pub fn category_totals(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<Vec<CategoryTotal>, AggregateError> {
        self.source.category_totals(window, now).map_err(|e| {
            log::error!("❌ Totals aggregation failed for window {}: {}", window, e);
            e
        })
    }
}

/// Sum daily counts per classification label.
///
/// Species missing from `lookup` follow `policy`; they never fail the call.
pub fn classification_totals(
    rows: &[DailyCount],
    lookup: &ClassificationLookup,
    policy: &UnclassifiedPolicy,
) -> Vec<ClassificationTotal> {
    let mut sums: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        if let Some(label) = policy.resolve(lookup, &row.category) {
            *sums.entry(label).or_default() += row.count;
        }
    }

    let mut totals: Vec<ClassificationTotal> = sums
        .into_iter()
        .map(|(label, total)| ClassificationTotal {
            classification: label.to_string(),
            total,
        })
        .collect();
    totals.sort_by(|a, b| rank_order(&a.classification, a.total, &b.classification, b.total));
    totals
}
