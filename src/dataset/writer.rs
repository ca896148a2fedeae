use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::Writer;
use flate2::Compression;
use flate2::write::GzEncoder;

use super::{DERIVED_COLUMNS, Dataset, MonetaryColumn, NormalizedRecord, SourceColumn};

/// Writes `dataset` as CSV to `path`, or to `path.gz` gzip-compressed when
/// `archive` is set. Returns the path actually written.
pub fn save_dataset(dataset: &Dataset, path: &Path, archive: bool) -> Result<PathBuf> {
    let serialized = serialize_dataset(dataset)?;
    let (target, bytes) = if archive {
        (archive_path(path), gzip_bytes(&serialized)?)
    } else {
        (path.to_path_buf(), serialized)
    };
    write_output_file(&target, &bytes)?;
    tracing::info!(
        path = %target.display(),
        records = dataset.len(),
        archive,
        "dataset saved"
    );
    Ok(target)
}

/// Source columns in their original order followed by the derived columns.
pub fn serialize_dataset(dataset: &Dataset) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(
            dataset
                .headers()
                .iter()
                .map(String::as_str)
                .chain(DERIVED_COLUMNS),
        )
        .context("failed to write dataset header")?;

    let mut row: Vec<String> = Vec::with_capacity(dataset.headers().len() + DERIVED_COLUMNS.len());
    for record in dataset.records() {
        row.clear();
        row.extend(dataset.layout().iter().map(|column| source_cell(record, *column)));
        row.extend(derived_cells(record));
        writer
            .write_record(&row)
            .with_context(|| format!("failed to write record for '{}'", record.player.name))?;
    }

    writer.into_inner().context("failed to finish dataset CSV")
}

fn source_cell(record: &NormalizedRecord, column: SourceColumn) -> String {
    let player = &record.player;
    match column {
        SourceColumn::Name => player.name.clone(),
        SourceColumn::Team => player.team.clone(),
        SourceColumn::BestPosition => player.best_position.clone(),
        SourceColumn::Foot => player.foot.clone(),
        SourceColumn::Age => player.age.map(|age| age.to_string()).unwrap_or_default(),
        SourceColumn::Money(money) => player.money(money).unwrap_or_default().to_string(),
        SourceColumn::Extra(idx) => player.extra.get(idx).cloned().unwrap_or_default(),
    }
}

fn derived_cells(record: &NormalizedRecord) -> impl Iterator<Item = String> + '_ {
    let numeric = MonetaryColumn::ALL
        .into_iter()
        .map(move |column| record.numeric(column).to_string());
    let formatted = MonetaryColumn::ALL
        .into_iter()
        .map(move |column| record.formatted(column).to_string());
    let age = [
        record
            .age_category()
            .map(|category| category.to_string())
            .unwrap_or_default(),
        record.age_label().unwrap_or_default().to_string(),
    ];
    numeric.chain(formatted).chain(age)
}

fn archive_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".gz");
    PathBuf::from(name)
}

fn gzip_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(bytes)
        .context("failed to compress dataset")?;
    encoder.finish().context("failed to finish gzip stream")
}

fn write_output_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().filter(|dir| !dir.as_os_str().is_empty());
    if let Some(dir) = parent {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ParsePolicy, prepare, read_players_from_reader};
    use flate2::read::GzDecoder;
    use std::io::Read;

    const SOURCE: &str = "name,team,Best position,foot,Age,Value,Wage,Release clause,Overall\n\
                          Ana,Lyon,CB,Left,30,€20M,€40K,,84\n\
                          Bo,Oslo,GK,Right,46,€500K,,€1M,70\n";

    fn dataset() -> Dataset {
        let table = read_players_from_reader(SOURCE.as_bytes()).unwrap();
        prepare(table, ParsePolicy::Impute).unwrap()
    }

    #[test]
    fn appends_derived_columns_after_source_columns() {
        let text = String::from_utf8(serialize_dataset(&dataset()).unwrap()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,team,Best position,foot,Age,Value,Wage,Release clause,Overall,\
             Value_numeric,Wage_numeric,Release_clause_numeric,\
             Value_formatted,Wage_formatted,Release_clause_formatted,Age_category,Age_label"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Ana,Lyon,CB,Left,30,€20M,€40K,,84,20000000,40000,1000000,€20.0M,€40.0K,€1.0M,4,\"31,32,33,34,35\""
        );
        assert_eq!(
            lines.next().unwrap(),
            "Bo,Oslo,GK,Right,46,€500K,,€1M,70,500000,40000,1000000,€500.0K,€40.0K,€1.0M,,"
        );
    }

    #[test]
    fn archive_is_gzip_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("players.csv");
        let written = save_dataset(&dataset(), &path, true).unwrap();
        assert_eq!(written, dir.path().join("players.csv.gz"));

        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&written).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.starts_with("name,team,"));
    }
}
