pub mod loader;
pub mod writer;

pub use loader::{read_players, read_players_from_reader};
pub use writer::{save_dataset, serialize_dataset};

use serde::Serialize;

use crate::age::AgeBucket;
use crate::currency::normalize_currency;
use crate::error::{FieldParseError, LoadError};
use crate::formatting::format_euro_amount;

pub const NAME_COLUMN: &str = "name";
pub const TEAM_COLUMN: &str = "team";
pub const POSITION_COLUMN: &str = "Best position";
pub const FOOT_COLUMN: &str = "foot";
pub const AGE_COLUMN: &str = "Age";
pub const AGE_CATEGORY_COLUMN: &str = "Age_category";
pub const AGE_LABEL_COLUMN: &str = "Age_label";

/// Derived columns appended on save, in output order. Source files that
/// already carry them (a previous save) have them dropped and recomputed.
pub const DERIVED_COLUMNS: [&str; 8] = [
    MonetaryColumn::Value.numeric_header(),
    MonetaryColumn::Wage.numeric_header(),
    MonetaryColumn::ReleaseClause.numeric_header(),
    MonetaryColumn::Value.formatted_header(),
    MonetaryColumn::Wage.formatted_header(),
    MonetaryColumn::ReleaseClause.formatted_header(),
    AGE_CATEGORY_COLUMN,
    AGE_LABEL_COLUMN,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MonetaryColumn {
    Value,
    Wage,
    ReleaseClause,
}

impl MonetaryColumn {
    pub const ALL: [Self; 3] = [Self::Value, Self::Wage, Self::ReleaseClause];

    pub const fn source_header(self) -> &'static str {
        match self {
            Self::Value => "Value",
            Self::Wage => "Wage",
            Self::ReleaseClause => "Release clause",
        }
    }

    pub const fn numeric_header(self) -> &'static str {
        match self {
            Self::Value => "Value_numeric",
            Self::Wage => "Wage_numeric",
            Self::ReleaseClause => "Release_clause_numeric",
        }
    }

    pub const fn formatted_header(self) -> &'static str {
        match self {
            Self::Value => "Value_formatted",
            Self::Wage => "Wage_formatted",
            Self::ReleaseClause => "Release_clause_formatted",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Value => 0,
            Self::Wage => 1,
            Self::ReleaseClause => 2,
        }
    }
}

/// One source row before any derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub name: String,
    pub team: String,
    pub best_position: String,
    pub foot: String,
    pub age: Option<f64>,
    pub value: Option<String>,
    pub wage: Option<String>,
    pub release_clause: Option<String>,
    /// Cells of the pass-through columns, aligned with `RawTable::extra_columns`.
    pub extra: Vec<String>,
}

impl PlayerRecord {
    pub fn money(&self, column: MonetaryColumn) -> Option<&str> {
        match column {
            MonetaryColumn::Value => self.value.as_deref(),
            MonetaryColumn::Wage => self.wage.as_deref(),
            MonetaryColumn::ReleaseClause => self.release_clause.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SourceColumn {
    Name,
    Team,
    BestPosition,
    Foot,
    Age,
    Money(MonetaryColumn),
    Extra(usize),
}

impl SourceColumn {
    pub(crate) const REQUIRED: [(Self, &'static str); 8] = [
        (Self::Name, NAME_COLUMN),
        (Self::Team, TEAM_COLUMN),
        (Self::BestPosition, POSITION_COLUMN),
        (Self::Foot, FOOT_COLUMN),
        (Self::Age, AGE_COLUMN),
        (
            Self::Money(MonetaryColumn::Value),
            MonetaryColumn::Value.source_header(),
        ),
        (
            Self::Money(MonetaryColumn::Wage),
            MonetaryColumn::Wage.source_header(),
        ),
        (
            Self::Money(MonetaryColumn::ReleaseClause),
            MonetaryColumn::ReleaseClause.source_header(),
        ),
    ];
}

/// Loaded rows plus the column layout needed to write them back.
#[derive(Debug, Clone)]
pub struct RawTable {
    headers: Vec<String>,
    layout: Vec<SourceColumn>,
    extra_columns: Vec<String>,
    records: Vec<PlayerRecord>,
    lines: Vec<usize>,
}

impl RawTable {
    /// Table with just the required columns; pass-through cells are ignored.
    pub fn new(records: Vec<PlayerRecord>) -> Self {
        let (layout, headers): (Vec<SourceColumn>, Vec<String>) = SourceColumn::REQUIRED
            .iter()
            .map(|(column, header)| (*column, (*header).to_string()))
            .unzip();
        let lines = (0..records.len()).map(|idx| idx + 2).collect();
        Self {
            headers,
            layout,
            extra_columns: Vec::new(),
            records,
            lines,
        }
    }

    pub fn records(&self) -> &[PlayerRecord] {
        &self.records
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParsePolicy {
    /// Unparseable amounts are logged, treated as absent and imputed.
    #[default]
    Impute,
    /// The first unparseable amount aborts the load.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnImputation {
    pub column: MonetaryColumn,
    pub present: usize,
    pub imputed: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PrepareReport {
    pub parse_failures: Vec<FieldParseError>,
    pub imputations: Vec<ColumnImputation>,
}

impl PrepareReport {
    pub fn imputed_total(&self) -> usize {
        self.imputations.iter().map(|entry| entry.imputed).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub player: PlayerRecord,
    pub value_numeric: f64,
    pub wage_numeric: f64,
    pub release_clause_numeric: f64,
    pub value_formatted: String,
    pub wage_formatted: String,
    pub release_clause_formatted: String,
    pub age_bucket: Option<AgeBucket>,
}

impl NormalizedRecord {
    fn new(player: PlayerRecord, value: f64, wage: f64, release_clause: f64) -> Self {
        let age_bucket = player.age.and_then(AgeBucket::classify);
        Self {
            player,
            value_numeric: value,
            wage_numeric: wage,
            release_clause_numeric: release_clause,
            value_formatted: format_euro_amount(value),
            wage_formatted: format_euro_amount(wage),
            release_clause_formatted: format_euro_amount(release_clause),
            age_bucket,
        }
    }

    pub fn numeric(&self, column: MonetaryColumn) -> f64 {
        match column {
            MonetaryColumn::Value => self.value_numeric,
            MonetaryColumn::Wage => self.wage_numeric,
            MonetaryColumn::ReleaseClause => self.release_clause_numeric,
        }
    }

    pub fn formatted(&self, column: MonetaryColumn) -> &str {
        match column {
            MonetaryColumn::Value => &self.value_formatted,
            MonetaryColumn::Wage => &self.wage_formatted,
            MonetaryColumn::ReleaseClause => &self.release_clause_formatted,
        }
    }

    pub fn age_category(&self) -> Option<u8> {
        self.age_bucket.map(AgeBucket::category)
    }

    pub fn age_label(&self) -> Option<&'static str> {
        self.age_bucket.map(AgeBucket::label)
    }
}

/// A prepared, read-only snapshot of the player table.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: Vec<String>,
    layout: Vec<SourceColumn>,
    extra_columns: Vec<String>,
    records: Vec<NormalizedRecord>,
    report: PrepareReport,
}

impl Dataset {
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Source columns in file order, derived columns excluded.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    pub fn report(&self) -> &PrepareReport {
        &self.report
    }

    pub fn extra_index(&self, column: &str) -> Option<usize> {
        self.extra_columns.iter().position(|name| name == column)
    }

    pub fn extra_value<'a>(&self, record: &'a NormalizedRecord, index: usize) -> Option<&'a str> {
        record
            .player
            .extra
            .get(index)
            .map(String::as_str)
            .filter(|cell| !cell.trim().is_empty())
    }

    pub(crate) fn layout(&self) -> &[SourceColumn] {
        &self.layout
    }
}

/// Normalizes, imputes, formats and buckets every record of `table`.
pub fn prepare(table: RawTable, policy: ParsePolicy) -> Result<Dataset, LoadError> {
    let RawTable {
        headers,
        layout,
        extra_columns,
        records,
        lines,
    } = table;

    let mut report = PrepareReport::default();
    let mut filled: [Vec<f64>; 3] = Default::default();

    for column in MonetaryColumn::ALL {
        let parsed = normalize_column(&records, &lines, column, policy, &mut report)?;
        let present = parsed.iter().flatten().count();
        let values = match column_mean(&parsed) {
            Some(mean) => {
                report.imputations.push(ColumnImputation {
                    column,
                    present,
                    imputed: parsed.len() - present,
                    mean,
                });
                impute(&parsed, mean)
            }
            None if parsed.is_empty() => Vec::new(),
            None => return Err(LoadError::NoParseableValues { column }),
        };
        filled[column.index()] = values;
    }

    let [values, wages, clauses] = filled;
    let records: Vec<NormalizedRecord> = records
        .into_iter()
        .zip(values)
        .zip(wages)
        .zip(clauses)
        .map(|(((player, value), wage), clause)| NormalizedRecord::new(player, value, wage, clause))
        .collect();

    tracing::info!(
        records = records.len(),
        parse_failures = report.parse_failures.len(),
        imputed = report.imputed_total(),
        "dataset prepared"
    );

    Ok(Dataset {
        headers,
        layout,
        extra_columns,
        records,
        report,
    })
}

fn normalize_column(
    records: &[PlayerRecord],
    lines: &[usize],
    column: MonetaryColumn,
    policy: ParsePolicy,
    report: &mut PrepareReport,
) -> Result<Vec<Option<f64>>, LoadError> {
    let mut parsed = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let line = lines.get(idx).copied().unwrap_or(idx + 2);
        match normalize_currency(record.money(column)) {
            Ok(value) => parsed.push(value),
            Err(source) => {
                let failure = FieldParseError {
                    line,
                    column,
                    source,
                };
                if policy == ParsePolicy::Strict {
                    return Err(failure.into());
                }
                tracing::warn!(
                    line,
                    column = column.source_header(),
                    raw = %failure.source.raw,
                    reason = failure.source.reason,
                    "unparseable amount, imputing column mean"
                );
                report.parse_failures.push(failure);
                parsed.push(None);
            }
        }
    }
    Ok(parsed)
}

/// Mean of the present values, `None` when nothing is present.
pub fn column_mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0_usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Returns a fully populated copy of `values` with gaps set to `fill`.
pub fn impute(values: &[Option<f64>], fill: f64) -> Vec<f64> {
    values.iter().map(|value| value.unwrap_or(fill)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, age: Option<f64>, value: Option<&str>) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            team: "Test FC".to_string(),
            best_position: "ST".to_string(),
            foot: "Right".to_string(),
            age,
            value: value.map(str::to_string),
            wage: Some("€10K".to_string()),
            release_clause: Some("€1M".to_string()),
            extra: Vec::new(),
        }
    }

    #[test]
    fn mean_ignores_absent_values() {
        assert_eq!(column_mean(&[Some(2.0), None, Some(4.0)]), Some(3.0));
        assert_eq!(column_mean(&[None, None]), None);
        assert_eq!(column_mean(&[]), None);
    }

    #[test]
    fn imputation_is_idempotent() {
        let column = [Some(1.0), None, Some(5.0)];
        let mean = column_mean(&column).unwrap();
        let once = impute(&column, mean);
        assert_eq!(once, vec![1.0, 3.0, 5.0]);

        let as_options: Vec<Option<f64>> = once.iter().copied().map(Some).collect();
        assert_eq!(column_mean(&as_options), Some(mean));
        assert_eq!(impute(&as_options, 0.0), once);
    }

    #[test]
    fn prepare_derives_every_column() {
        let table = RawTable::new(vec![player("A", Some(22.0), Some("€105.5M"))]);
        let dataset = prepare(table, ParsePolicy::Impute).unwrap();
        let record = &dataset.records()[0];
        assert_eq!(record.value_numeric, 105_500_000.0);
        assert_eq!(record.value_formatted, "€105.5M");
        assert_eq!(record.wage_formatted, "€10.0K");
        assert_eq!(record.release_clause_formatted, "€1.0M");
        assert_eq!(record.age_category(), Some(2));
        assert_eq!(record.age_label(), Some("21,22,23,24,25"));
    }

    #[test]
    fn absent_and_unparseable_values_get_the_column_mean() {
        let table = RawTable::new(vec![
            player("A", Some(20.0), Some("€2M")),
            player("B", Some(21.0), None),
            player("C", Some(22.0), Some("€4M")),
            player("D", Some(23.0), Some("broken")),
        ]);
        let dataset = prepare(table, ParsePolicy::Impute).unwrap();
        let values: Vec<f64> = dataset.records().iter().map(|r| r.value_numeric).collect();
        assert_eq!(values, vec![2_000_000.0, 3_000_000.0, 4_000_000.0, 3_000_000.0]);

        let report = dataset.report();
        assert_eq!(report.parse_failures.len(), 1);
        assert_eq!(report.parse_failures[0].line, 5);
        assert_eq!(report.parse_failures[0].column, MonetaryColumn::Value);
        let value_column = &report.imputations[0];
        assert_eq!(value_column.present, 2);
        assert_eq!(value_column.imputed, 2);
        assert_eq!(value_column.mean, 3_000_000.0);
    }

    #[test]
    fn overflowing_amount_is_imputed_not_propagated() {
        let huge = format!("€{}M", "9".repeat(400));
        let table = RawTable::new(vec![
            player("A", Some(20.0), Some(&huge)),
            player("B", Some(21.0), None),
            player("C", Some(22.0), Some("€4M")),
        ]);
        let dataset = prepare(table, ParsePolicy::Impute).unwrap();
        let values: Vec<f64> = dataset.records().iter().map(|r| r.value_numeric).collect();
        assert_eq!(values, vec![4_000_000.0; 3]);
        assert_eq!(dataset.report().parse_failures.len(), 1);
    }

    #[test]
    fn strict_policy_aborts_on_first_failure() {
        let table = RawTable::new(vec![
            player("A", Some(20.0), Some("€2M")),
            player("B", Some(21.0), Some("oops")),
        ]);
        let err = prepare(table, ParsePolicy::Strict).unwrap_err();
        match err {
            LoadError::Field(failure) => {
                assert_eq!(failure.line, 3);
                assert_eq!(failure.source.raw, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn column_without_values_is_rejected() {
        let table = RawTable::new(vec![player("A", Some(20.0), None)]);
        let err = prepare(table, ParsePolicy::Impute).unwrap_err();
        assert!(matches!(
            err,
            LoadError::NoParseableValues {
                column: MonetaryColumn::Value
            }
        ));
    }

    #[test]
    fn empty_table_prepares_to_empty_dataset() {
        let dataset = prepare(RawTable::new(Vec::new()), ParsePolicy::Impute).unwrap();
        assert!(dataset.is_empty());
        assert!(dataset.report().imputations.is_empty());
    }

    #[test]
    fn ages_outside_buckets_have_no_label() {
        let table = RawTable::new(vec![
            player("Young", Some(14.0), Some("€1K")),
            player("Old", Some(45.0), Some("€1K")),
            player("Unknown", None, Some("€1K")),
        ]);
        let dataset = prepare(table, ParsePolicy::Impute).unwrap();
        assert!(dataset.records().iter().all(|r| r.age_label().is_none()));
    }
}
