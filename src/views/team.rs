use serde::Serialize;

use super::{HeadlineStats, HistogramBin, PlayerRow, histogram, rows, unique_in_order};
use crate::dataset::Dataset;

pub const TEAM_HISTOGRAM_BINS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionCount<'a> {
    pub position: &'a str,
    pub players: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOverview<'a> {
    pub team: String,
    pub stats: HeadlineStats,
    pub roster: Vec<PlayerRow<'a>>,
    pub value_histogram: Vec<HistogramBin>,
    pub age_histogram: Vec<HistogramBin>,
    pub positions: Vec<PositionCount<'a>>,
}

/// Team names, sorted alphabetically.
pub fn teams(dataset: &Dataset) -> Vec<&str> {
    let mut teams = unique_in_order(dataset.records(), |record| record.player.team.as_str());
    teams.sort_unstable();
    teams
}

/// `None` when no player belongs to `team`.
pub fn team_overview<'a>(dataset: &'a Dataset, team: &str, bins: usize) -> Option<TeamOverview<'a>> {
    let members: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| record.player.team == team)
        .collect();
    if members.is_empty() {
        return None;
    }

    let values: Vec<f64> = members.iter().map(|record| record.value_numeric).collect();
    let ages: Vec<f64> = members.iter().filter_map(|record| record.player.age).collect();

    let mut positions: Vec<PositionCount<'a>> =
        unique_in_order(members.iter().copied(), |record| record.player.best_position.as_str())
            .into_iter()
            .map(|position| PositionCount {
                position,
                players: members
                    .iter()
                    .filter(|record| record.player.best_position == position)
                    .count(),
            })
            .collect();
    positions.sort_by(|a, b| b.players.cmp(&a.players));

    Some(TeamOverview {
        team: team.to_string(),
        stats: HeadlineStats::from_records(members.iter().copied()),
        roster: rows(members.iter().copied()),
        value_histogram: histogram(&values, bins),
        age_histogram: histogram(&ages, bins),
        positions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    #[test]
    fn teams_are_sorted() {
        let dataset = fixtures::dataset();
        assert_eq!(teams(&dataset), ["Blues", "Greens", "Reds"]);
    }

    #[test]
    fn overview_of_one_team() {
        let dataset = fixtures::dataset();
        let overview = team_overview(&dataset, "Greens", TEAM_HISTOGRAM_BINS).unwrap();
        assert_eq!(overview.stats.total_players, 2);
        assert_eq!(overview.stats.average_wage, Some(61_500.0));
        let roster: Vec<&str> = overview.roster.iter().map(|row| row.name).collect();
        assert_eq!(roster, ["Echo", "Foxtrot"]);
        assert_eq!(
            overview.value_histogram.iter().map(|bin| bin.count).sum::<usize>(),
            2
        );
        assert_eq!(overview.age_histogram.len(), TEAM_HISTOGRAM_BINS);
    }

    #[test]
    fn position_counts_most_common_first() {
        let dataset = fixtures::dataset();
        let overview = team_overview(&dataset, "Blues", TEAM_HISTOGRAM_BINS).unwrap();
        assert_eq!(overview.positions.len(), 2);
        assert!(overview.positions.iter().all(|count| count.players == 1));
        assert_eq!(overview.positions[0].position, "ST");
    }

    #[test]
    fn unknown_team_has_no_overview() {
        let dataset = fixtures::dataset();
        assert!(team_overview(&dataset, "Purples", TEAM_HISTOGRAM_BINS).is_none());
    }
}
