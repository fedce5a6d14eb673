//! One dashboard render cycle
//!
//! ```text
//! Dashboard::render(window, now)
//!     → WindowCache::get_or_fetch → Aggregator::daily_counts
//!     → reshape (leaderboard, pivot, Top-K per diet) + diet split
//!     → DashboardView::{Ready, NoData}
//!     → ReportSink (console tables or JSONL)
//! ```

pub mod console_writer;
pub mod jsonl_writer;
pub mod sink;
pub mod writer;

use crate::aggregator_core::{
    classification_totals, reshape, AggregateError, Aggregator, CategoryTotal,
    ClassificationLookup, ClassificationSource, ClassificationTotal, ColumnOrder, DailyCount,
    LoginSource, PivotTable, ReshapeOptions, WindowCache, WindowDays,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

pub use console_writer::ConsoleReportWriter;
pub use jsonl_writer::JsonlReportWriter;
pub use sink::{ReportError, ReportSink};
pub use writer::{OutputBackend, ReportWriter};

/// Chart-ready tables for one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardReport {
    pub window: WindowDays,
    pub generated_at: DateTime<Utc>,
    pub column_order: ColumnOrder,
    /// Raw (day, species, count) rows
    pub daily: Vec<DailyCount>,
    /// Leaderboard
    pub totals: Vec<CategoryTotal>,
    pub pivot: PivotTable,
    pub top_k: BTreeMap<String, Vec<CategoryTotal>>,
    /// Logins per diet, for the pie chart
    pub classification_totals: Vec<ClassificationTotal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardView {
    /// No logins in the window yet
    NoData {
        window: WindowDays,
        generated_at: DateTime<Utc>,
    },
    Ready(DashboardReport),
}

impl DashboardView {
    pub fn window(&self) -> WindowDays {
        match self {
            DashboardView::NoData { window, .. } => *window,
            DashboardView::Ready(report) => report.window,
        }
    }

    pub fn report(&self) -> Option<&DashboardReport> {
        match self {
            DashboardView::Ready(report) => Some(report),
            DashboardView::NoData { .. } => None,
        }
    }
}

pub struct Dashboard<S> {
    aggregator: Aggregator<S>,
    cache: WindowCache,
    classifications: Option<Box<dyn ClassificationSource>>,
    options: ReshapeOptions,
}

impl<S: LoginSource> Dashboard<S> {
    pub fn new(source: S, cache: WindowCache, options: ReshapeOptions) -> Self {
        Self {
            aggregator: Aggregator::new(source),
            cache,
            classifications: None,
            options,
        }
    }

    /// Enable the per-diet Top-K and diet split views
    pub fn with_classifications(mut self, source: impl ClassificationSource + 'static) -> Self {
        self.classifications = Some(Box::new(source));
        self
    }

    pub fn options(&self) -> &ReshapeOptions {
        &self.options
    }

    pub fn cache(&self) -> &WindowCache {
        &self.cache
    }

    /// Drop the cached rows for `window` so the next render re-queries
    pub fn refresh(&self, window: WindowDays) {
        self.cache.invalidate(window);
    }

    /// Aggregate and reshape the last `window` days ending at `now`.
    ///
    /// An empty window yields [`DashboardView::NoData`]; only an unreachable or
    /// failing event source is an error.
    pub fn render(
        &self,
        window: WindowDays,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, AggregateError> {
        let rows = self
            .cache
            .get_or_fetch(window, || self.aggregator.daily_counts(window, now))?;

        if rows.is_empty() {
            log::warn!("No data available yet for the last {}. Waiting for bot inserts...", window);
            return Ok(DashboardView::NoData {
                window,
                generated_at: now,
            });
        }

        let lookup = self.load_classifications();
        let reshaped = reshape(&rows, lookup.as_ref(), &self.options);
        let classification_totals = lookup
            .as_ref()
            .map(|lookup| classification_totals(&rows, lookup, &self.options.unclassified))
            .unwrap_or_default();

        log::info!(
            "📊 Rendered {}: {} species over {} days",
            window,
            reshaped.totals.len(),
            reshaped.pivot.days.len()
        );

        Ok(DashboardView::Ready(DashboardReport {
            window,
            generated_at: now,
            column_order: self.options.column_order,
            daily: rows.to_vec(),
            totals: reshaped.totals,
            pivot: reshaped.pivot,
            top_k: reshaped.top_k,
            classification_totals,
        }))
    }

    /// A broken lookup only disables the classified views
    fn load_classifications(&self) -> Option<ClassificationLookup> {
        let source = self.classifications.as_ref()?;
        match source.load() {
            Ok(lookup) => Some(lookup),
            Err(e) => {
                log::warn!("Classification lookup unavailable, skipping diet views: {}", e);
                None
            }
        }
    }
}
