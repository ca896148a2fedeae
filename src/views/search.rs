use serde::Serialize;

use super::{PlayerRow, rows, unique_in_order};
use crate::age::AgeBucket;
use crate::dataset::{Dataset, NormalizedRecord};

/// Inclusive bounds on `Value_numeric`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// The full span of values in `dataset`, `None` when it is empty.
    pub fn of(dataset: &Dataset) -> Option<Self> {
        let mut values = dataset.records().iter().map(|record| record.value_numeric);
        let first = values.next()?;
        Some(values.fold(Self { min: first, max: first }, |range, value| Self {
            min: range.min.min(value),
            max: range.max.max(value),
        }))
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The four predicates of a player search; all must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerQuery {
    pub age_group: AgeBucket,
    pub position: String,
    pub foot: String,
    pub value_range: ValueRange,
}

impl PlayerQuery {
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        record.age_bucket == Some(self.age_group)
            && record.player.best_position == self.position
            && record.player.foot == self.foot
            && self.value_range.contains(record.value_numeric)
    }
}

/// Result of the search page. An empty match set is not the same as a
/// search that has not been run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", content = "players", rename_all = "snake_case")]
pub enum SearchOutcome<'a> {
    #[default]
    NotSearched,
    NoMatches,
    Matches(Vec<PlayerRow<'a>>),
}

impl SearchOutcome<'_> {
    pub fn len(&self) -> usize {
        match self {
            Self::Matches(players) => players.len(),
            Self::NotSearched | Self::NoMatches => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn run<'a>(dataset: &'a Dataset, query: Option<&PlayerQuery>) -> SearchOutcome<'a> {
    let Some(query) = query else {
        return SearchOutcome::NotSearched;
    };
    let matches = rows(dataset.records().iter().filter(|record| query.matches(record)));
    tracing::debug!(matches = matches.len(), position = %query.position, "search finished");
    if matches.is_empty() {
        SearchOutcome::NoMatches
    } else {
        SearchOutcome::Matches(matches)
    }
}

/// Choices offered by the search form, each in order of first appearance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOptions<'a> {
    pub age_groups: Vec<&'static str>,
    pub positions: Vec<&'a str>,
    pub feet: Vec<&'a str>,
    pub value_range: Option<ValueRange>,
}

pub fn search_options(dataset: &Dataset) -> SearchOptions<'_> {
    let records = dataset.records();
    let mut age_groups = Vec::new();
    for label in records.iter().filter_map(NormalizedRecord::age_label) {
        if !age_groups.contains(&label) {
            age_groups.push(label);
        }
    }
    SearchOptions {
        age_groups,
        positions: unique_in_order(records, |record| record.player.best_position.as_str()),
        feet: unique_in_order(records, |record| record.player.foot.as_str()),
        value_range: ValueRange::of(dataset),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    fn query(dataset: &Dataset, age_group: u8, position: &str, foot: &str) -> PlayerQuery {
        PlayerQuery {
            age_group: AgeBucket::from_category(age_group).unwrap(),
            position: position.to_string(),
            foot: foot.to_string(),
            value_range: ValueRange::of(dataset).unwrap(),
        }
    }

    fn names(outcome: &SearchOutcome<'_>) -> Vec<String> {
        match outcome {
            SearchOutcome::Matches(players) => players.iter().map(|row| row.name.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn all_four_predicates_must_hold() {
        let dataset = fixtures::dataset();
        let outcome = run(&dataset, Some(&query(&dataset, 2, "ST", "Right")));
        assert_eq!(names(&outcome), ["Alpha", "Echo"]);

        let mut capped = query(&dataset, 2, "ST", "Right");
        capped.value_range.max = 80_000_000.0;
        assert_eq!(names(&run(&dataset, Some(&capped))), ["Echo"]);
    }

    #[test]
    fn value_bounds_are_inclusive() {
        let dataset = fixtures::dataset();
        let mut exact = query(&dataset, 2, "CB", "Right");
        exact.value_range = ValueRange {
            min: 850_000.0,
            max: 850_000.0,
        };
        assert_eq!(names(&run(&dataset, Some(&exact))), ["Foxtrot"]);
    }

    #[test]
    fn empty_result_differs_from_not_searched() {
        let dataset = fixtures::dataset();
        let outcome = run(&dataset, Some(&query(&dataset, 2, "ST", "Left")));
        assert_eq!(outcome, SearchOutcome::NoMatches);
        assert!(outcome.is_empty());

        let untouched = run(&dataset, None);
        assert_eq!(untouched, SearchOutcome::NotSearched);
        assert_ne!(untouched, outcome);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(SearchOutcome::NoMatches).unwrap();
        assert_eq!(json["status"], "no_matches");
    }

    #[test]
    fn options_follow_first_appearance() {
        let dataset = fixtures::dataset();
        let options = search_options(&dataset);
        assert_eq!(
            options.age_groups,
            ["21,22,23,24,25", "31,32,33,34,35", "16,17,18,19,20"]
        );
        assert_eq!(options.feet, ["Right", "Left"]);
        let range = options.value_range.unwrap();
        assert_eq!(range.min, 850_000.0);
        assert_eq!(range.max, 100_000_000.0);
    }
}
