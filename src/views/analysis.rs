use ndarray::Array1;
use serde::Serialize;

use super::{
    GroupMean, HistogramBin, PlayerRow, group_means, histogram, rows, top_by_value,
    unique_in_order,
};
use crate::age::AgeBucket;
use crate::dataset::{AGE_CATEGORY_COLUMN, AGE_COLUMN, Dataset, MonetaryColumn, NormalizedRecord};

pub const DEFAULT_TOP_PLAYERS: usize = 50;
pub const DEFAULT_TOP_PER_POSITION: usize = 10;
pub const DEFAULT_VALUE_BINS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    pub top_players: usize,
    pub top_per_position: usize,
    pub value_bins: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_players: DEFAULT_TOP_PLAYERS,
            top_per_position: DEFAULT_TOP_PER_POSITION,
            value_bins: DEFAULT_VALUE_BINS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionLeaders<'a> {
    pub position: &'a str,
    pub players: Vec<PlayerRow<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCategoryMean {
    pub category: u8,
    pub label: &'static str,
    pub players: usize,
    pub mean_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FootShare {
    pub foot: String,
    pub players: usize,
    /// Fraction of all players.
    pub share: f64,
}

/// Pearson coefficient of one numeric column against `Value_numeric`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub column: String,
    pub coefficient: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisPage<'a> {
    pub top_players: Vec<PlayerRow<'a>>,
    pub position_leaders: Vec<PositionLeaders<'a>>,
    pub value_by_age: Vec<AgeCategoryMean>,
    pub value_histogram: Vec<HistogramBin>,
    pub value_by_position: Vec<GroupMean>,
    pub foot_distribution: Vec<FootShare>,
    pub value_by_foot: Vec<GroupMean>,
    pub correlations: Vec<Correlation>,
}

pub fn analysis(dataset: &Dataset, options: AnalysisOptions) -> AnalysisPage<'_> {
    let records = dataset.records();
    let values: Vec<f64> = records.iter().map(|record| record.value_numeric).collect();

    AnalysisPage {
        top_players: rows(top_by_value(records, options.top_players)),
        position_leaders: position_leaders(records, options.top_per_position),
        value_by_age: value_by_age(records),
        value_histogram: histogram(&values, options.value_bins),
        value_by_position: group_means(
            records,
            |record| record.player.best_position.as_str(),
            |record| record.value_numeric,
        ),
        foot_distribution: foot_distribution(records),
        value_by_foot: value_by_foot(records),
        correlations: value_correlations(dataset),
    }
}

/// Top players of every position, positions in order of first appearance.
pub fn position_leaders(records: &[NormalizedRecord], limit: usize) -> Vec<PositionLeaders<'_>> {
    unique_in_order(records, |record| record.player.best_position.as_str())
        .into_iter()
        .map(|position| PositionLeaders {
            position,
            players: rows(top_by_value(
                records
                    .iter()
                    .filter(|record| record.player.best_position == position),
                limit,
            )),
        })
        .collect()
}

/// One entry per bucket, including buckets nobody falls into.
pub fn value_by_age(records: &[NormalizedRecord]) -> Vec<AgeCategoryMean> {
    AgeBucket::all()
        .map(|bucket| {
            let (sum, players) = records
                .iter()
                .filter(|record| record.age_bucket == Some(bucket))
                .fold((0.0, 0), |(sum, count), record| {
                    (sum + record.value_numeric, count + 1)
                });
            AgeCategoryMean {
                category: bucket.category(),
                label: bucket.label(),
                players,
                mean_value: (players > 0).then(|| sum / players as f64),
            }
        })
        .collect()
}

/// Player counts per foot, most common first.
pub fn foot_distribution(records: &[NormalizedRecord]) -> Vec<FootShare> {
    let total = records.len();
    let mut shares: Vec<FootShare> = unique_in_order(records, |record| record.player.foot.as_str())
        .into_iter()
        .map(|foot| {
            let players = records
                .iter()
                .filter(|record| record.player.foot == foot)
                .count();
            FootShare {
                foot: foot.to_string(),
                players,
                share: players as f64 / total as f64,
            }
        })
        .collect();
    shares.sort_by(|a, b| b.players.cmp(&a.players));
    shares
}

pub fn value_by_foot(records: &[NormalizedRecord]) -> Vec<GroupMean> {
    let mut means = group_means(
        records,
        |record| record.player.foot.as_str(),
        |record| record.value_numeric,
    );
    means.sort_by(|a, b| a.key.cmp(&b.key));
    means
}

/// Correlations of every numeric column with the player value, strongest
/// positive first. Columns without enough paired data sort last.
pub fn value_correlations(dataset: &Dataset) -> Vec<Correlation> {
    let records = dataset.records();
    let value: Vec<f64> = records.iter().map(|record| record.value_numeric).collect();

    let mut columns: Vec<(String, Vec<Option<f64>>)> = vec![
        (
            AGE_COLUMN.to_string(),
            records.iter().map(|record| record.player.age).collect(),
        ),
        (
            MonetaryColumn::Wage.numeric_header().to_string(),
            records.iter().map(|record| Some(record.wage_numeric)).collect(),
        ),
        (
            MonetaryColumn::ReleaseClause.numeric_header().to_string(),
            records
                .iter()
                .map(|record| Some(record.release_clause_numeric))
                .collect(),
        ),
        (
            AGE_CATEGORY_COLUMN.to_string(),
            records
                .iter()
                .map(|record| record.age_category().map(f64::from))
                .collect(),
        ),
    ];
    for (idx, name) in dataset.extra_columns().iter().enumerate() {
        if let Some(cells) = numeric_extra_column(dataset, idx) {
            columns.push((name.clone(), cells));
        }
    }

    let mut correlations: Vec<Correlation> = columns
        .into_iter()
        .map(|(column, cells)| Correlation {
            coefficient: pearson(&cells, &value),
            column,
        })
        .collect();
    correlations.sort_by(|a, b| match (a.coefficient, b.coefficient) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    correlations
}

/// A pass-through column counts as numeric when every non-blank cell parses.
fn numeric_extra_column(dataset: &Dataset, index: usize) -> Option<Vec<Option<f64>>> {
    let mut cells = Vec::with_capacity(dataset.len());
    let mut any = false;
    for record in dataset.records() {
        match dataset.extra_value(record, index) {
            Some(cell) => {
                let value: f64 = cell.trim().parse().ok()?;
                any = true;
                cells.push(Some(value));
            }
            None => cells.push(None),
        }
    }
    any.then_some(cells)
}

/// Pearson correlation over the rows where `xs` is present.
pub fn pearson(xs: &[Option<f64>], ys: &[f64]) -> Option<f64> {
    let (x, y): (Vec<f64>, Vec<f64>) = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| x.map(|x| (x, *y)))
        .unzip();
    if x.len() < 2 {
        return None;
    }

    let x = Array1::from_vec(x);
    let y = Array1::from_vec(y);
    let dx = &x - x.mean()?;
    let dy = &y - y.mean()?;
    let denominator = (dx.dot(&dx) * dy.dot(&dy)).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((dx.dot(&dy) / denominator).clamp(-1.0, 1.0))
}
