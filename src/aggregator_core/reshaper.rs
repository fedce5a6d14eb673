//! Flat daily rows -> leaderboard, day x species pivot and per-class Top-K
//!
//! Pure functions over in-memory rows. An empty input produces empty outputs,
//! never an error; callers use that to show a "no data yet" notice.

use super::classification::UnclassifiedPolicy;
use super::source::ClassificationLookup;
use super::types::{rank_order, CategoryTotal, DailyCount, PivotTable};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const DEFAULT_TOP_K: usize = 5;

/// Column order of the pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnOrder {
    /// Same order as the leaderboard
    Ranked,
    #[default]
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshapeOptions {
    pub column_order: ColumnOrder,
    pub top_k: usize,
    pub unclassified: UnclassifiedPolicy,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            column_order: ColumnOrder::default(),
            top_k: DEFAULT_TOP_K,
            unclassified: UnclassifiedPolicy::default(),
        }
    }
}

/// Everything the rendering side needs from one batch of rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reshaped {
    pub totals: Vec<CategoryTotal>,
    pub pivot: PivotTable,
    pub top_k: BTreeMap<String, Vec<CategoryTotal>>,
}

impl Reshaped {
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Sum of counts per category, total descending, name ascending on ties.
pub fn totals(rows: &[DailyCount]) -> Vec<CategoryTotal> {
    let mut sums: HashMap<&str, u64> = HashMap::new();
    for row in rows {
        *sums.entry(row.category.as_str()).or_default() += row.count;
    }

    let mut totals: Vec<CategoryTotal> = sums
        .into_iter()
        .map(|(category, total)| CategoryTotal::new(category, total))
        .collect();
    totals.sort_by(|a, b| rank_order(&a.category, a.total, &b.category, b.total));
    totals
}

/// Day x category matrix. Rows are the distinct days ascending; missing
/// (day, category) pairs are 0.
pub fn pivot(rows: &[DailyCount], order: ColumnOrder) -> PivotTable {
    if rows.is_empty() {
        return PivotTable::default();
    }

    let days: Vec<_> = rows
        .iter()
        .map(|r| r.day)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let categories: Vec<String> = match order {
        ColumnOrder::Ranked => totals(rows).into_iter().map(|t| t.category).collect(),
        ColumnOrder::Alphabetical => rows
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let day_index: HashMap<_, _> = days.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let col_index: HashMap<&str, usize> = categories
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut cells = vec![vec![0u64; categories.len()]; days.len()];
    for row in rows {
        let i = day_index[&row.day];
        let j = col_index[row.category.as_str()];
        // Duplicate (day, category) rows should not happen; sum rather than overwrite.
        cells[i][j] += row.count;
    }

    PivotTable {
        days,
        categories,
        cells,
    }
}

/// The `k` highest totals within each classification label.
///
/// `totals` may arrive in any order; each list comes back total descending,
/// name ascending.
pub fn top_k_by_classification(
    totals: &[CategoryTotal],
    lookup: &ClassificationLookup,
    k: usize,
    policy: &UnclassifiedPolicy,
) -> BTreeMap<String, Vec<CategoryTotal>> {
    let mut groups: BTreeMap<String, Vec<CategoryTotal>> = BTreeMap::new();
    let mut dropped = 0usize;

    for total in totals {
        match policy.resolve(lookup, &total.category) {
            Some(label) => groups.entry(label.to_string()).or_default().push(total.clone()),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::debug!("{} categories without a classification were dropped", dropped);
    }

    for members in groups.values_mut() {
        members.sort_by(|a, b| rank_order(&a.category, a.total, &b.category, b.total));
        members.truncate(k);
    }
    // k == 0 leaves empty lists behind
    groups.retain(|_, members| !members.is_empty());
    groups
}

/// Totals, pivot and (when a lookup is supplied) Top-K in one pass.
pub fn reshape(
    rows: &[DailyCount],
    lookup: Option<&ClassificationLookup>,
    options: &ReshapeOptions,
) -> Reshaped {
    let totals = totals(rows);
    let pivot = pivot(rows, options.column_order);
    let top_k = lookup
        .map(|lookup| top_k_by_classification(&totals, lookup, options.top_k, &options.unclassified))
        .unwrap_or_default();

    Reshaped {
        totals,
        pivot,
        top_k,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_rows() -> Vec<DailyCount> {
        vec![
            DailyCount::new(day(1), "Raptor", 3),
            DailyCount::new(day(1), "Trex", 1),
            DailyCount::new(day(2), "Raptor", 2),
        ]
    }

    fn lookup(pairs: &[(&str, &str)]) -> ClassificationLookup {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_totals_example() {
        assert_eq!(
            totals(&sample_rows()),
            vec![CategoryTotal::new("Raptor", 5), CategoryTotal::new("Trex", 1)]
        );
    }

    #[test]
    fn test_totals_ties_break_by_name() {
        let rows = vec![
            DailyCount::new(day(1), "Trex", 2),
            DailyCount::new(day(1), "Ankylo", 2),
            DailyCount::new(day(2), "Raptor", 2),
        ];
        let names: Vec<_> = totals(&rows).into_iter().map(|t| t.category).collect();
        assert_eq!(names, vec!["Ankylo", "Raptor", "Trex"]);
    }

    #[test]
    fn test_pivot_example() {
        let pivot = pivot(&sample_rows(), ColumnOrder::Alphabetical);
        assert_eq!(pivot.days, vec![day(1), day(2)]);
        assert_eq!(pivot.categories, vec!["Raptor", "Trex"]);
        assert_eq!(pivot.cells, vec![vec![3, 1], vec![2, 0]]);
    }

    #[test]
    fn test_pivot_ranked_columns_follow_totals() {
        let rows = vec![
            DailyCount::new(day(1), "Ankylo", 1),
            DailyCount::new(day(1), "Trex", 4),
            DailyCount::new(day(3), "Ankylo", 1),
            DailyCount::new(day(3), "Stego", 3),
        ];

        let ranked = pivot(&rows, ColumnOrder::Ranked);
        let ranked_names: Vec<_> = totals(&rows).into_iter().map(|t| t.category).collect();
        assert_eq!(ranked.categories, ranked_names);
        assert_eq!(ranked.categories, vec!["Trex", "Stego", "Ankylo"]);
        assert_eq!(ranked.cells, vec![vec![4, 0, 1], vec![0, 3, 1]]);

        let alpha = pivot(&rows, ColumnOrder::Alphabetical);
        assert_eq!(alpha.categories, vec!["Ankylo", "Stego", "Trex"]);
    }

    #[test]
    fn test_pivot_is_rectangular_and_sums_match_totals() {
        let rows = vec![
            DailyCount::new(day(1), "A", 1),
            DailyCount::new(day(2), "B", 2),
            DailyCount::new(day(4), "C", 3),
            DailyCount::new(day(4), "A", 5),
        ];
        let pivot = pivot(&rows, ColumnOrder::Alphabetical);

        assert_eq!(pivot.shape(), (3, 3));
        assert!(pivot.cells.iter().all(|r| r.len() == 3));
        for total in totals(&rows) {
            let column_sum: u64 = pivot.column(&total.category).unwrap().iter().sum();
            assert_eq!(column_sum, total.total);
        }
    }

    #[test]
    fn test_top_k_example() {
        let lookup = lookup(&[("Raptor", "carnivore"), ("Trex", "carnivore")]);
        let top = top_k_by_classification(
            &totals(&sample_rows()),
            &lookup,
            1,
            &UnclassifiedPolicy::Drop,
        );
        assert_eq!(top.len(), 1);
        assert_eq!(top["carnivore"], vec![CategoryTotal::new("Raptor", 5)]);
    }

    #[test]
    fn test_top_k_partitions_and_limits() {
        let totals = vec![
            CategoryTotal::new("Stego", 9),
            CategoryTotal::new("Raptor", 7),
            CategoryTotal::new("Bronto", 7),
            CategoryTotal::new("Trex", 2),
            CategoryTotal::new("Dodo", 1),
            CategoryTotal::new("Ankylo", 7),
        ];
        let lookup = lookup(&[
            ("Stego", "herbivore"),
            ("Bronto", "herbivore"),
            ("Ankylo", "herbivore"),
            ("Raptor", "carnivore"),
            ("Trex", "carnivore"),
        ]);

        let top = top_k_by_classification(&totals, &lookup, 2, &UnclassifiedPolicy::Drop);
        assert_eq!(
            top["herbivore"],
            vec![CategoryTotal::new("Stego", 9), CategoryTotal::new("Ankylo", 7)]
        );
        assert_eq!(
            top["carnivore"],
            vec![CategoryTotal::new("Raptor", 7), CategoryTotal::new("Trex", 2)]
        );
        assert!(!top.contains_key("unknown"));

        for (label, members) in &top {
            assert!(members.len() <= 2);
            assert!(members.iter().all(|m| &lookup[&m.category] == label));
            assert!(members.windows(2).all(|w| w[0].total >= w[1].total));
        }
    }

    #[test]
    fn test_top_k_bucket_policy() {
        let totals = vec![CategoryTotal::new("Dodo", 4), CategoryTotal::new("Trex", 1)];
        let lookup = lookup(&[("Trex", "carnivore")]);
        let policy = UnclassifiedPolicy::Bucket("unknown".to_string());

        let top = top_k_by_classification(&totals, &lookup, 5, &policy);
        assert_eq!(top["unknown"], vec![CategoryTotal::new("Dodo", 4)]);
        assert_eq!(top["carnivore"], vec![CategoryTotal::new("Trex", 1)]);
    }

    #[test]
    fn test_empty_input() {
        let lookup = lookup(&[("Raptor", "carnivore")]);
        let reshaped = reshape(&[], Some(&lookup), &ReshapeOptions::default());

        assert!(reshaped.is_empty());
        assert!(reshaped.totals.is_empty());
        assert_eq!(reshaped.pivot.shape(), (0, 0));
        assert!(reshaped.pivot.cells.is_empty());
        assert!(reshaped.top_k.is_empty());
    }

    #[test]
    fn test_reshape_without_lookup_has_no_top_k() {
        let reshaped = reshape(&sample_rows(), None, &ReshapeOptions::default());
        assert_eq!(reshaped.totals.len(), 2);
        assert!(reshaped.top_k.is_empty());
    }
}
