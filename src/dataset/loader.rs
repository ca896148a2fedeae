use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;

use super::{DERIVED_COLUMNS, MonetaryColumn, PlayerRecord, RawTable, SourceColumn};
use crate::error::LoadError;

/// Cells pandas-style exports use for missing values.
const NA_MARKERS: [&str; 8] = ["", "NA", "N/A", "n/a", "NaN", "nan", "null", "None"];

pub fn read_players(path: &Path) -> Result<RawTable, LoadError> {
    let file = File::open(path).map_err(|err| LoadError::io(path, err))?;
    let table = read_players_from_reader(BufReader::new(file))?;
    tracing::info!(
        path = %path.display(),
        records = table.len(),
        extra_columns = table.extra_columns().len(),
        "player table loaded"
    );
    Ok(table)
}

pub fn read_players_from_reader<R: Read>(reader: R) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let header_row = reader.headers()?.clone();
    let columns = ColumnMap::resolve(&header_row)?;

    let mut records = Vec::new();
    let mut lines = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row?;
        let line = row
            .position()
            .and_then(|pos| usize::try_from(pos.line()).ok())
            .unwrap_or(idx + 2);
        records.push(columns.parse_row(&row, line)?);
        lines.push(line);
    }

    Ok(RawTable {
        headers: columns.headers,
        layout: columns.layout,
        extra_columns: columns.extra_columns,
        records,
        lines,
    })
}

struct ColumnMap {
    /// One slot per CSV field; `None` marks a derived column that is dropped.
    slots: Vec<Option<SourceColumn>>,
    headers: Vec<String>,
    layout: Vec<SourceColumn>,
    extra_columns: Vec<String>,
}

impl ColumnMap {
    fn resolve(header_row: &StringRecord) -> Result<Self, LoadError> {
        let mut map = Self {
            slots: Vec::with_capacity(header_row.len()),
            headers: Vec::new(),
            layout: Vec::new(),
            extra_columns: Vec::new(),
        };

        for header in header_row {
            if DERIVED_COLUMNS.contains(&header) {
                map.slots.push(None);
                continue;
            }
            let required = SourceColumn::REQUIRED
                .iter()
                .find(|(column, name)| *name == header && !map.layout.contains(column))
                .map(|(column, _)| *column);
            let column = required.unwrap_or_else(|| {
                map.extra_columns.push(header.to_string());
                SourceColumn::Extra(map.extra_columns.len() - 1)
            });
            map.slots.push(Some(column));
            map.headers.push(header.to_string());
            map.layout.push(column);
        }

        for (column, name) in SourceColumn::REQUIRED {
            if !map.layout.contains(&column) {
                return Err(LoadError::MissingColumn {
                    column: name.to_string(),
                });
            }
        }

        Ok(map)
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<PlayerRecord, LoadError> {
        let mut record = PlayerRecord {
            extra: vec![String::new(); self.extra_columns.len()],
            ..PlayerRecord::default()
        };

        for (cell, slot) in row.iter().zip(&self.slots) {
            let Some(column) = slot else {
                continue;
            };
            match column {
                SourceColumn::Name => record.name = cell.to_string(),
                SourceColumn::Team => record.team = cell.to_string(),
                SourceColumn::BestPosition => record.best_position = cell.to_string(),
                SourceColumn::Foot => record.foot = cell.to_string(),
                SourceColumn::Age => record.age = parse_age(cell, line)?,
                SourceColumn::Money(money) => {
                    let value = present(cell).map(str::to_string);
                    match money {
                        MonetaryColumn::Value => record.value = value,
                        MonetaryColumn::Wage => record.wage = value,
                        MonetaryColumn::ReleaseClause => record.release_clause = value,
                    }
                }
                SourceColumn::Extra(idx) => record.extra[*idx] = cell.to_string(),
            }
        }

        Ok(record)
    }
}

fn present(cell: &str) -> Option<&str> {
    let trimmed = cell.trim();
    (!NA_MARKERS.contains(&trimmed)).then_some(cell)
}

/// Any non-negative number; fractional ages are kept and bucketed as they are.
fn parse_age(cell: &str, line: usize) -> Result<Option<f64>, LoadError> {
    let Some(raw) = present(cell) else {
        return Ok(None);
    };
    match raw.trim().parse::<f64>() {
        Ok(age) if age.is_finite() && age >= 0.0 => Ok(Some(age)),
        _ => Err(LoadError::InvalidAge {
            line,
            raw: raw.to_string(),
        }),
    }
}
