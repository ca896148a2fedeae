pub mod analysis;
pub mod comparison;
pub mod overview;
pub mod search;
pub mod team;
pub mod transfers;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::dataset::NormalizedRecord;

/// The per-player columns every page table is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerRow<'a> {
    pub name: &'a str,
    pub team: &'a str,
    #[serde(rename = "Best position")]
    pub best_position: &'a str,
    pub foot: &'a str,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Value_numeric")]
    pub value_numeric: f64,
    #[serde(rename = "Wage_numeric")]
    pub wage_numeric: f64,
    #[serde(rename = "Release_clause_numeric")]
    pub release_clause_numeric: f64,
    #[serde(rename = "Value_formatted")]
    pub value_formatted: &'a str,
    #[serde(rename = "Wage_formatted")]
    pub wage_formatted: &'a str,
    #[serde(rename = "Release_clause_formatted")]
    pub release_clause_formatted: &'a str,
    #[serde(rename = "Age_category")]
    pub age_category: Option<u8>,
    #[serde(rename = "Age_label")]
    pub age_label: Option<&'static str>,
}

impl<'a> From<&'a NormalizedRecord> for PlayerRow<'a> {
    fn from(record: &'a NormalizedRecord) -> Self {
        let player = &record.player;
        Self {
            name: &player.name,
            team: &player.team,
            best_position: &player.best_position,
            foot: &player.foot,
            age: player.age,
            value_numeric: record.value_numeric,
            wage_numeric: record.wage_numeric,
            release_clause_numeric: record.release_clause_numeric,
            value_formatted: &record.value_formatted,
            wage_formatted: &record.wage_formatted,
            release_clause_formatted: &record.release_clause_formatted,
            age_category: record.age_category(),
            age_label: record.age_label(),
        }
    }
}

pub fn rows<'a, I>(records: I) -> Vec<PlayerRow<'a>>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    records.into_iter().map(PlayerRow::from).collect()
}

/// The three headline metrics shown above a player table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineStats {
    pub total_players: usize,
    pub average_value: Option<f64>,
    pub average_wage: Option<f64>,
}

impl HeadlineStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a NormalizedRecord>,
    {
        let mut total_players = 0;
        let mut value_sum = 0.0;
        let mut wage_sum = 0.0;
        for record in records {
            total_players += 1;
            value_sum += record.value_numeric;
            wage_sum += record.wage_numeric;
        }
        let average = |sum: f64| (total_players > 0).then(|| sum / total_players as f64);
        Self {
            total_players,
            average_value: average(value_sum),
            average_wage: average(wage_sum),
        }
    }
}

/// Highest values first; equal values keep their source order.
pub fn top_by_value<'a, I>(records: I, limit: usize) -> Vec<&'a NormalizedRecord>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut sorted: Vec<&NormalizedRecord> = records.into_iter().collect();
    sorted.sort_by(|a, b| b.value_numeric.total_cmp(&a.value_numeric));
    sorted.truncate(limit);
    sorted
}

/// Distinct keys in order of first appearance.
pub fn unique_in_order<'a, I, F>(records: I, key: F) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    F: Fn(&'a NormalizedRecord) -> &'a str,
{
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let mut keys = Vec::new();
    for record in records {
        let value = key(record);
        if seen.insert(value) {
            keys.push(value);
        }
    }
    keys
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: String,
    pub players: usize,
    pub mean: f64,
}

/// Member count and summed `value` of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal<'a> {
    pub key: &'a str,
    pub players: usize,
    pub total: f64,
}

/// Sum of `value` per `key`, groups in order of first appearance.
pub fn group_totals<'a, I, K, V>(records: I, key: K, value: V) -> Vec<GroupTotal<'a>>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    K: Fn(&'a NormalizedRecord) -> &'a str,
    V: Fn(&'a NormalizedRecord) -> f64,
{
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut totals: Vec<GroupTotal<'a>> = Vec::new();
    for record in records {
        let group = key(record);
        let slot = *index.entry(group).or_insert_with(|| {
            totals.push(GroupTotal {
                key: group,
                players: 0,
                total: 0.0,
            });
            totals.len() - 1
        });
        let entry = &mut totals[slot];
        entry.players += 1;
        entry.total += value(record);
    }
    totals
}

/// Mean of `value` per `key`, groups in order of first appearance.
pub fn group_means<'a, I, K, V>(records: I, key: K, value: V) -> Vec<GroupMean>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    K: Fn(&'a NormalizedRecord) -> &'a str,
    V: Fn(&'a NormalizedRecord) -> f64,
{
    group_totals(records, key, value)
        .into_iter()
        .map(|group| GroupMean {
            key: group.key.to_string(),
            players: group.players,
            mean: group.total / group.players as f64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning `[min, max]`; the last bin is closed.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max <= min {
        return vec![HistogramBin {
            start: min,
            end: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for value in finite {
        let slot = ((value - min) / width).floor() as usize;
        counts[slot.min(bins - 1)] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(idx, count)| HistogramBin {
            start: min + width * idx as f64,
            end: if idx + 1 == bins {
                max
            } else {
                min + width * (idx + 1) as f64
            },
            count,
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_by_value_sorts_descending() {
        let dataset = fixtures::dataset();
        let names: Vec<&str> = top_by_value(dataset.records(), 3)
            .into_iter()
            .map(|r| r.player.name.as_str())
            .collect();
        assert_eq!(names, ["Alpha", "Echo", "Bravo"]);
    }

    #[test]
    fn unique_keeps_first_appearance_order() {
        let dataset = fixtures::dataset();
        let positions = unique_in_order(dataset.records(), |r| r.player.best_position.as_str());
        assert_eq!(positions, ["ST", "CB", "GK"]);
    }

    #[test]
    fn group_means_per_key() {
        let dataset = fixtures::dataset();
        let means = group_means(
            dataset.records(),
            |r| r.player.foot.as_str(),
            |r| r.value_numeric,
        );
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].key, "Right");
        assert_eq!(means[0].players, 4);
        assert_eq!(means[1].key, "Left");
        assert_eq!(means[1].mean, 12_500_000.0);
    }

    #[test]
    fn headline_stats_average_value_and_wage() {
        let dataset = fixtures::dataset();
        let stats = HeadlineStats::from_records(dataset.records());
        assert_eq!(stats.total_players, 6);
        let average_wage = stats.average_wage.unwrap();
        assert!((average_wage - 391_000.0 / 6.0).abs() < 1e-6);
        assert_eq!(HeadlineStats::from_records(std::iter::empty()).average_value, None);
    }

    #[test]
    fn histogram_uses_equal_width_bins() {
        let bins = histogram(&[0.0, 1.0, 2.0, 9.0, 10.0], 5);
        let counts: Vec<usize> = bins.iter().map(|bin| bin.count).collect();
        assert_eq!(counts, [2, 1, 0, 0, 2]);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[4].end, 10.0);
    }

    #[test]
    fn histogram_of_constant_values_is_one_bin() {
        let bins = histogram(&[3.0, 3.0], 10);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn player_row_serializes_with_column_names() {
        let dataset = fixtures::dataset();
        let json = serde_json::to_value(PlayerRow::from(&dataset.records()[0])).unwrap();
        assert_eq!(json["Best position"], "ST");
        assert_eq!(json["Value_formatted"], "€100.0M");
        assert_eq!(json["Age_category"], 2);
        assert_eq!(json["Age_label"], "21,22,23,24,25");
    }
}
