use serde::Serialize;
use thiserror::Error;

use super::{PlayerRow, rows, unique_in_order};
use crate::dataset::Dataset;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error("select at least two players to compare ({selected} selected)")]
    NotEnoughPlayers { selected: usize },

    #[error("no player named '{name}' plays {position}")]
    UnknownPlayer { name: String, position: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonPage<'a> {
    pub position: String,
    pub players: Vec<PlayerRow<'a>>,
}

/// Names selectable for `position`.
pub fn available_players<'a>(dataset: &'a Dataset, position: &str) -> Vec<&'a str> {
    unique_in_order(
        dataset
            .records()
            .iter()
            .filter(|record| record.player.best_position == position),
        |record| record.player.name.as_str(),
    )
}

/// Side-by-side rows of the selected players, in table order.
pub fn compare<'a, S: AsRef<str>>(
    dataset: &'a Dataset,
    position: &str,
    names: &[S],
) -> Result<ComparisonPage<'a>, ComparisonError> {
    let available = available_players(dataset, position);
    let mut selected: Vec<&str> = Vec::with_capacity(names.len());
    for name in names.iter().map(AsRef::as_ref) {
        if !available.contains(&name) {
            return Err(ComparisonError::UnknownPlayer {
                name: name.to_string(),
                position: position.to_string(),
            });
        }
        if !selected.contains(&name) {
            selected.push(name);
        }
    }
    if selected.len() < 2 {
        return Err(ComparisonError::NotEnoughPlayers {
            selected: selected.len(),
        });
    }

    let players = rows(dataset.records().iter().filter(|record| {
        record.player.best_position == position && selected.contains(&record.player.name.as_str())
    }));
    Ok(ComparisonPage {
        position: position.to_string(),
        players,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fixtures;

    #[test]
    fn lists_players_of_one_position() {
        let dataset = fixtures::dataset();
        assert_eq!(available_players(&dataset, "ST"), ["Alpha", "Charlie", "Echo"]);
        assert!(available_players(&dataset, "LW").is_empty());
    }

    #[test]
    fn compares_in_table_order() {
        let dataset = fixtures::dataset();
        let page = compare(&dataset, "ST", &["Echo", "Alpha"]).unwrap();
        let names: Vec<&str> = page.players.iter().map(|row| row.name).collect();
        assert_eq!(names, ["Alpha", "Echo"]);
        assert_eq!(page.players[1].wage_formatted, "€120.0K");
    }

    #[test]
    fn needs_two_distinct_players() {
        let dataset = fixtures::dataset();
        assert_eq!(
            compare(&dataset, "ST", &["Alpha", "Alpha"]).unwrap_err(),
            ComparisonError::NotEnoughPlayers { selected: 1 }
        );
        let none: [&str; 0] = [];
        assert_eq!(
            compare(&dataset, "ST", &none).unwrap_err(),
            ComparisonError::NotEnoughPlayers { selected: 0 }
        );
    }

    #[test]
    fn rejects_players_from_other_positions() {
        let dataset = fixtures::dataset();
        let err = compare(&dataset, "ST", &["Alpha", "Bravo"]).unwrap_err();
        assert!(matches!(err, ComparisonError::UnknownPlayer { ref name, .. } if name == "Bravo"));
    }
}
