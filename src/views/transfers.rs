use serde::Serialize;

use super::{GroupTotal, PlayerRow, group_totals, rows, top_by_value};
use crate::dataset::Dataset;

pub const PREVIOUS_TEAM_COLUMN: &str = "Previous_team";
pub const TOP_TRANSFERS: usize = 10;

/// Total incoming value per position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionValue {
    pub position: String,
    pub players: usize,
    pub total_value: f64,
}

impl From<GroupTotal<'_>> for PositionValue {
    fn from(group: GroupTotal<'_>) -> Self {
        Self {
            position: group.key.to_string(),
            players: group.players,
            total_value: group.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamTransfers<'a> {
    pub team: String,
    /// Players currently at `team`.
    pub incoming: Vec<PlayerRow<'a>>,
    pub incoming_by_position: Vec<PositionValue>,
    /// Players whose previous team was `team`; `None` when the source has
    /// no previous-team column.
    pub outgoing: Option<Vec<PlayerRow<'a>>>,
}

pub fn top_transfers(dataset: &Dataset, limit: usize) -> Vec<PlayerRow<'_>> {
    rows(top_by_value(dataset.records(), limit))
}

pub fn team_transfers<'a>(dataset: &'a Dataset, team: &str) -> TeamTransfers<'a> {
    let incoming: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| record.player.team == team)
        .collect();
    let incoming_by_position = group_totals(
        incoming.iter().copied(),
        |record| record.player.best_position.as_str(),
        |record| record.value_numeric,
    )
    .into_iter()
    .map(PositionValue::from)
    .collect();

    let outgoing = dataset.extra_index(PREVIOUS_TEAM_COLUMN).map(|index| {
        rows(
            dataset
                .records()
                .iter()
                .filter(|record| dataset.extra_value(record, index) == Some(team)),
        )
    });

    TeamTransfers {
        team: team.to_string(),
        incoming: rows(incoming),
        incoming_by_position,
        outgoing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ParsePolicy, prepare, read_players_from_reader};
    use crate::views::fixtures;

    #[test]
    fn top_transfers_by_value() {
        let dataset = fixtures::dataset();
        let top = top_transfers(&dataset, TOP_TRANSFERS);
        assert_eq!(top.len(), 6);
        assert_eq!(top[0].name, "Alpha");
        assert_eq!(top[5].name, "Foxtrot");
    }

    #[test]
    fn incoming_and_outgoing_for_team() {
        let dataset = fixtures::dataset();
        let transfers = team_transfers(&dataset, "Reds");
        let incoming: Vec<&str> = transfers.incoming.iter().map(|row| row.name).collect();
        assert_eq!(incoming, ["Alpha", "Bravo"]);

        let outgoing: Vec<&str> = transfers
            .outgoing
            .as_deref()
            .unwrap()
            .iter()
            .map(|row| row.name)
            .collect();
        assert_eq!(outgoing, ["Charlie", "Echo"]);

        assert_eq!(transfers.incoming_by_position[0].position, "ST");
        assert_eq!(transfers.incoming_by_position[0].total_value, 100_000_000.0);
    }

    #[test]
    fn position_totals_are_plain_sums() {
        let dataset = fixtures::dataset();
        for team in crate::views::team::teams(&dataset) {
            let transfers = team_transfers(&dataset, team);
            for entry in &transfers.incoming_by_position {
                let expected: f64 = transfers
                    .incoming
                    .iter()
                    .filter(|row| row.best_position == entry.position)
                    .map(|row| row.value_numeric)
                    .sum();
                assert_eq!(entry.total_value, expected, "{team} {}", entry.position);
            }
        }
    }

    #[test]
    fn outgoing_needs_previous_team_column() {
        let table = read_players_from_reader(
            "name,team,Best position,foot,Age,Value,Wage,Release clause\n\
             Ana,Lyon,CB,Left,30,€20M,€40K,€38M\n"
                .as_bytes(),
        )
        .unwrap();
        let dataset = prepare(table, ParsePolicy::Impute).unwrap();
        let transfers = team_transfers(&dataset, "Lyon");
        assert_eq!(transfers.incoming.len(), 1);
        assert!(transfers.outgoing.is_none());
    }
}
