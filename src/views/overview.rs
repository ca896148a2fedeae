use serde::Serialize;

use super::{HeadlineStats, PlayerRow, rows};
use crate::dataset::Dataset;

pub const PREVIEW_ROWS: usize = 10;

/// Headline metrics and the first rows of the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewPage<'a> {
    pub stats: HeadlineStats,
    pub preview: Vec<PlayerRow<'a>>,
}

pub fn overview(dataset: &Dataset, preview_rows: usize) -> OverviewPage<'_> {
    OverviewPage {
        stats: HeadlineStats::from_records(dataset.records()),
        preview: rows(dataset.records().iter().take(preview_rows)),
    }
}
