//! Plain-text tables on stdout: leaderboard, daily pivot, Top-K and diet split

use super::sink::{ReportError, ReportSink};
use super::{DashboardReport, DashboardView};
use async_trait::async_trait;
use std::fmt::Write as _;
use std::io::Write;

pub struct ConsoleReportWriter {
    out: Box<dyn Write + Send>,
}

impl ConsoleReportWriter {
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self { out }
    }
}

/// Render a view as aligned text tables
pub fn format_view(view: &DashboardView) -> String {
    match view {
        DashboardView::NoData {
            window,
            generated_at,
        } => format!(
            "🦖 Species Logins (last {}, {})\nNo data available yet. Waiting for bot inserts...\n",
            window,
            generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        DashboardView::Ready(report) => format_report(report),
    }
}

fn format_report(report: &DashboardReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "🦖 Species Logins (last {}, {})",
        report.window,
        report.generated_at.format("%Y-%m-%d %H:%M UTC")
    );

    let name_width = report
        .totals
        .iter()
        .map(|t| t.category.chars().count())
        .max()
        .unwrap_or(0)
        .max("species".len());

    let _ = writeln!(out, "\nLeaderboard");
    let _ = writeln!(
        out,
        "{:>4}  {:<width$}  {:>8}",
        "#",
        "species",
        "logins",
        width = name_width
    );
    for (rank, total) in report.totals.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>4}. {:<width$}  {:>8}",
            rank + 1,
            total.category,
            total.total,
            width = name_width
        );
    }

    let _ = writeln!(out, "\nDaily logins");
    let col_widths: Vec<usize> = report
        .pivot
        .categories
        .iter()
        .map(|c| c.chars().count().max(6))
        .collect();
    let mut header = format!("{:<10}", "day");
    for (category, width) in report.pivot.categories.iter().zip(&col_widths) {
        let _ = write!(header, "  {:>width$}", category, width = *width);
    }
    let _ = writeln!(out, "{}", header.trim_end());
    for (day, cells) in report.pivot.rows() {
        let mut line = day.format("%Y-%m-%d").to_string();
        for (count, width) in cells.iter().zip(&col_widths) {
            let _ = write!(line, "  {:>width$}", count, width = *width);
        }
        let _ = writeln!(out, "{}", line);
    }

    if !report.top_k.is_empty() {
        let _ = writeln!(out, "\nTop species by diet");
        for (label, members) in &report.top_k {
            let listed: Vec<String> = members
                .iter()
                .map(|m| format!("{} ({})", m.category, m.total))
                .collect();
            let _ = writeln!(out, "  {}: {}", label, listed.join(", "));
        }
    }

    if !report.classification_totals.is_empty() {
        let _ = writeln!(out, "\nLogins by diet");
        for split in &report.classification_totals {
            let _ = writeln!(out, "  {:<12} {:>8}", split.classification, split.total);
        }
    }

    out
}

#[async_trait]
impl ReportSink for ConsoleReportWriter {
    async fn write_view(&mut self, view: &DashboardView) -> Result<(), ReportError> {
        self.out.write_all(format_view(view).as_bytes())?;
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Console"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator_core::{
        CategoryTotal, ClassificationTotal, ColumnOrder, DailyCount, PivotTable, WindowDays,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn report() -> DashboardReport {
        let d1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut top_k = BTreeMap::new();
        top_k.insert(
            "carnivore".to_string(),
            vec![CategoryTotal::new("Raptor", 5)],
        );

        DashboardReport {
            window: WindowDays::new(7).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            column_order: ColumnOrder::Alphabetical,
            daily: vec![
                DailyCount::new(d1, "Raptor", 3),
                DailyCount::new(d1, "Trex", 1),
                DailyCount::new(d2, "Raptor", 2),
            ],
            totals: vec![CategoryTotal::new("Raptor", 5), CategoryTotal::new("Trex", 1)],
            pivot: PivotTable {
                days: vec![d1, d2],
                categories: vec!["Raptor".to_string(), "Trex".to_string()],
                cells: vec![vec![3, 1], vec![2, 0]],
            },
            top_k,
            classification_totals: vec![ClassificationTotal {
                classification: "carnivore".to_string(),
                total: 6,
            }],
        }
    }

    #[test]
    fn test_format_report_tables() {
        let text = format_view(&DashboardView::Ready(report()));

        assert!(text.contains("last 7d"));
        assert!(text.contains("   #  species    logins"));
        assert!(text.contains("   1. Raptor          5"));
        assert!(text.contains("   2. Trex            1"));
        assert!(text.contains("day         Raptor    Trex"));
        assert!(text.contains("2024-01-01       3       1"));
        assert!(text.contains("2024-01-02       2       0"));
        assert!(text.contains("  carnivore: Raptor (5)"));
        assert!(text.contains("  carnivore           6"));
    }

    #[test]
    fn test_format_no_data() {
        let view = DashboardView::NoData {
            window: WindowDays::new(3).unwrap(),
            generated_at: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
        };
        let text = format_view(&view);
        assert!(text.contains("No data available yet"));
        assert!(text.contains("last 3d"));
    }
}
