use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;

use scoutboard::Dataset;
use scoutboard::formatting::{
    format_correlation, format_euro_amount, format_euro_grouped, format_optional_age, format_share,
};
use scoutboard::views::analysis::AnalysisPage;
use scoutboard::views::comparison::{ComparisonError, ComparisonPage};
use scoutboard::views::overview::OverviewPage;
use scoutboard::views::search::{SearchOptions, SearchOutcome};
use scoutboard::views::team::TeamOverview;
use scoutboard::views::transfers::{PREVIOUS_TEAM_COLUMN, TeamTransfers};
use scoutboard::views::{GroupMean, HeadlineStats, HistogramBin, PlayerRow};

const COMPACT_ROWS: usize = 10;
const HISTOGRAM_BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub json: bool,
    pub full_output: bool,
}

impl RenderOptions {
    const fn limit(self) -> Option<usize> {
        if self.full_output {
            None
        } else {
            Some(COMPACT_ROWS)
        }
    }
}

pub struct BannerContext<'a> {
    pub(crate) page: &'a str,
    pub(crate) source: &'a Path,
    pub(crate) dataset: &'a Dataset,
    pub(crate) run_started_at: &'a DateTime<Local>,
}

/// Prints the page header. JSON output has no banner.
pub fn print_banner(context: &BannerContext<'_>, options: RenderOptions) {
    if options.json {
        return;
    }
    let title = format!(" Scout Board: {} ", context.page);
    println!();
    println!("{}", format!("{title:=^61}").bold().bright_cyan());
    println!(
        "{} {}",
        "Run started".bright_yellow().bold(),
        context
            .run_started_at
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string()
            .bright_white()
    );
    let report = context.dataset.report();
    println!(
        "{} {} | {} | {} | {}",
        "Source".bright_yellow().bold(),
        context.source.display().to_string().bright_white(),
        format!("Players: {}", context.dataset.len()).bright_white(),
        format!("Unparsed: {}", report.parse_failures.len()).bright_white(),
        format!("Imputed: {}", report.imputed_total()).bright_white()
    );
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize page as JSON")?;
    println!("{json}");
    Ok(())
}

pub fn overview(page: &OverviewPage<'_>, options: RenderOptions) -> Result<()> {
    if options.json {
        return print_json(page);
    }
    print_section("Quick Stats");
    print_stats(&page.stats);
    print_section("Data Overview");
    let width = print_player_table(&page.preview, None);
    print_divider(width);
    Ok(())
}

pub fn analysis(page: &AnalysisPage<'_>, options: RenderOptions) -> Result<()> {
    if options.json {
        return print_json(page);
    }
    let limit = options.limit();

    print_section("Top Players Overall by Value");
    let mut width = print_player_table(&page.top_players, limit);

    print_section("Top Players by Position");
    for group in &page.position_leaders {
        println!("{}", group.position.bold().bright_yellow());
        width = width.max(print_player_table(&group.players, limit));
    }

    print_section("Average Value by Age Category");
    let mut table = Table::new(&[
        ("Cat", Align::Right),
        ("Ages", Align::Left),
        ("Players", Align::Right),
        ("Avg Value", Align::Right),
    ]);
    for entry in &page.value_by_age {
        table.push(vec![
            entry.category.to_string(),
            entry.label.to_string(),
            entry.players.to_string(),
            entry
                .mean_value
                .map_or_else(|| "-".to_string(), format_euro_amount),
        ]);
    }
    width = width.max(table.print(None));

    print_section("Distribution of Player Values");
    width = width.max(print_histogram(&page.value_histogram, format_euro_amount));

    print_section("Average Value by Position");
    width = width.max(print_group_means("Position", &page.value_by_position, limit));

    print_section("Dominant Foot Distribution");
    let mut table = Table::new(&[
        ("Foot", Align::Left),
        ("Players", Align::Right),
        ("Share", Align::Right),
    ]);
    for share in &page.foot_distribution {
        table.push(vec![
            share.foot.clone(),
            share.players.to_string(),
            format_share(share.share),
        ]);
    }
    width = width.max(table.print(None));

    print_section("Average Value by Dominant Foot");
    width = width.max(print_group_means("Foot", &page.value_by_foot, None));

    print_section("Correlation with Value");
    let mut table = Table::new(&[("Column", Align::Left), ("r", Align::Right)]);
    for correlation in &page.correlations {
        table.push(vec![
            correlation.column.clone(),
            format_correlation(correlation.coefficient),
        ]);
    }
    width = width.max(table.print(None));

    print_divider(width);
    Ok(())
}

pub fn data(dataset: &Dataset, saved_to: Option<&Path>, options: RenderOptions) -> Result<()> {
    let players = scoutboard::views::rows(dataset.records());
    if options.json {
        return print_json(&players);
    }
    print_section("Prepared Dataset");
    let width = print_player_table(&players, options.limit());
    match saved_to {
        Some(path) => println!(
            "{} {}",
            "Saved CSV".bright_yellow().bold(),
            path.display().to_string().bright_white()
        ),
        None => println!(
            "{} {}",
            "Saved CSV".bright_yellow().bold(),
            "not saved (use --save)".bright_black()
        ),
    }
    print_divider(width);
    Ok(())
}

#[derive(Serialize)]
struct SearchPage<'a, 'b> {
    choices: &'b SearchOptions<'a>,
    outcome: &'b SearchOutcome<'a>,
}

pub fn search(
    outcome: &SearchOutcome<'_>,
    choices: &SearchOptions<'_>,
    options: RenderOptions,
) -> Result<()> {
    if options.json {
        return print_json(&SearchPage { choices, outcome });
    }
    print_section("Find Your Desired Players");
    let width = match outcome {
        SearchOutcome::NotSearched => print_search_choices(choices),
        SearchOutcome::NoMatches => print_notice("No players found with the selected criteria."),
        SearchOutcome::Matches(players) => print_player_table(players, options.limit()),
    };
    print_divider(width);
    Ok(())
}

fn print_search_choices(choices: &SearchOptions<'_>) -> usize {
    let mut width = print_notice("Pass --age-group, --position and --foot to run the search.");
    let range = choices.value_range.map_or_else(
        || "-".to_string(),
        |range| {
            format!(
                "{} .. {}",
                format_euro_grouped(range.min),
                format_euro_grouped(range.max)
            )
        },
    );
    let mut table = Table::new(&[("Criterion", Align::Left), ("Choices", Align::Left)]);
    table.push(vec!["Age group".to_string(), choices.age_groups.join(" | ")]);
    table.push(vec!["Position".to_string(), choices.positions.join(", ")]);
    table.push(vec!["Foot".to_string(), choices.feet.join(", ")]);
    table.push(vec!["Value".to_string(), range]);
    width = width.max(table.print(None));
    width
}

pub fn comparison(
    result: &std::result::Result<ComparisonPage<'_>, ComparisonError>,
    options: RenderOptions,
) -> Result<()> {
    let page = match result {
        Ok(page) => page,
        Err(err) if options.json => {
            return print_json(&serde_json::json!({ "error": err.to_string() }));
        }
        Err(err) => {
            print_section("Compare Football Players");
            let width = print_notice(&format!("Nothing to compare: {err}."));
            print_divider(width);
            return Ok(());
        }
    };
    if options.json {
        return print_json(page);
    }
    let names: Vec<&str> = page.players.iter().map(|row| row.name).collect();
    print_section(&format!("Comparing Players: {}", names.join(", ")));
    let mut table = Table::new(&[
        ("Name", Align::Left),
        ("Team", Align::Left),
        ("Value", Align::Right),
        ("Wage", Align::Right),
        ("Release", Align::Right),
        ("Pos", Align::Left),
        ("Age", Align::Right),
        ("Foot", Align::Left),
    ]);
    for row in &page.players {
        table.push(vec![
            row.name.to_string(),
            row.team.to_string(),
            row.value_formatted.to_string(),
            row.wage_formatted.to_string(),
            row.release_clause_formatted.to_string(),
            row.best_position.to_string(),
            format_optional_age(row.age),
            row.foot.to_string(),
        ]);
    }
    let width = table.print(None);
    print_divider(width);
    Ok(())
}

pub fn team_list(teams: &[&str], options: RenderOptions) -> Result<()> {
    if options.json {
        return print_json(teams);
    }
    print_section("Teams");
    let mut table = Table::new(&[("Team", Align::Left)]);
    for team in teams {
        table.push(vec![(*team).to_string()]);
    }
    let width = table.print(None);
    print_divider(width);
    Ok(())
}

pub fn team(overview: &TeamOverview<'_>, options: RenderOptions) -> Result<()> {
    if options.json {
        return print_json(overview);
    }
    print_section(&format!("Overview for {}", overview.team));
    print_stats(&overview.stats);

    print_section(&format!("Players in {}", overview.team));
    let mut width = print_player_table(&overview.roster, options.limit());

    print_section(&format!("Distribution of Player Values in {}", overview.team));
    width = width.max(print_histogram(&overview.value_histogram, format_euro_amount));

    print_section(&format!("Age Distribution of Players in {}", overview.team));
    width = width.max(print_histogram(&overview.age_histogram, |age| {
        format!("{age:.1}")
    }));

    print_section(&format!("Players by Best Position in {}", overview.team));
    let mut table = Table::new(&[("Position", Align::Left), ("Count", Align::Right)]);
    for count in &overview.positions {
        table.push(vec![count.position.to_string(), count.players.to_string()]);
    }
    width = width.max(table.print(None));

    print_divider(width);
    Ok(())
}

#[derive(Serialize)]
struct TransfersPage<'a, 'b> {
    top_transfers: &'b [PlayerRow<'a>],
    team: Option<&'b TeamTransfers<'a>>,
}

pub fn transfers(
    top: &[PlayerRow<'_>],
    team: Option<&TeamTransfers<'_>>,
    options: RenderOptions,
) -> Result<()> {
    if options.json {
        return print_json(&TransfersPage {
            top_transfers: top,
            team,
        });
    }
    print_section("Top Transfers");
    let mut width = print_value_table(top);

    if let Some(transfers) = team {
        print_section(&format!("Incoming Transfers to {}", transfers.team));
        if transfers.incoming.is_empty() {
            width = width.max(print_notice("No incoming transfers found."));
        } else {
            width = width.max(print_value_table(&transfers.incoming));
            let mut table = Table::new(&[
                ("Position", Align::Left),
                ("Players", Align::Right),
                ("Total Value", Align::Right),
            ]);
            for entry in &transfers.incoming_by_position {
                table.push(vec![
                    entry.position.clone(),
                    entry.players.to_string(),
                    format_euro_amount(entry.total_value),
                ]);
            }
            width = width.max(table.print(None));
        }

        print_section(&format!("Outgoing Transfers from {}", transfers.team));
        width = width.max(match transfers.outgoing.as_deref() {
            None => print_notice(&format!(
                "No outgoing transfers found (no {PREVIOUS_TEAM_COLUMN} column)."
            )),
            Some([]) => print_notice("No outgoing transfers found."),
            Some(players) => print_value_table(players),
        });
    }

    print_divider(width);
    Ok(())
}

fn print_section(title: &str) {
    println!();
    println!("{}", title.bold().bright_magenta());
}

fn print_notice(message: &str) -> usize {
    println!("{}", message.bright_yellow());
    message.chars().count()
}

fn print_divider(width: usize) {
    if width > 0 {
        println!("{}", "=".repeat(width).bright_cyan());
    }
}

fn print_stats(stats: &HeadlineStats) {
    let average = |value: Option<f64>| value.map_or_else(|| "-".to_string(), format_euro_grouped);
    println!(
        "{} {} | {} {} | {} {}",
        "Total Players".bright_yellow().bold(),
        stats.total_players.to_string().bright_white(),
        "Average Value".bright_yellow().bold(),
        average(stats.average_value).bright_white(),
        "Average Wage".bright_yellow().bold(),
        average(stats.average_wage).bright_white()
    );
}

fn print_player_table(players: &[PlayerRow<'_>], limit: Option<usize>) -> usize {
    if players.is_empty() {
        return print_notice("No players to show.");
    }
    let mut table = Table::new(&[
        ("#", Align::Right),
        ("Name", Align::Left),
        ("Team", Align::Left),
        ("Pos", Align::Left),
        ("Foot", Align::Left),
        ("Age", Align::Right),
        ("Value", Align::Right),
        ("Wage", Align::Right),
        ("Release", Align::Right),
        ("Age Group", Align::Left),
    ]);
    for (idx, row) in players.iter().enumerate() {
        table.push(vec![
            (idx + 1).to_string(),
            row.name.to_string(),
            row.team.to_string(),
            row.best_position.to_string(),
            row.foot.to_string(),
            format_optional_age(row.age),
            row.value_formatted.to_string(),
            row.wage_formatted.to_string(),
            row.release_clause_formatted.to_string(),
            row.age_label.unwrap_or("-").to_string(),
        ]);
    }
    table.print(limit)
}

fn print_value_table(players: &[PlayerRow<'_>]) -> usize {
    let mut table = Table::new(&[
        ("Name", Align::Left),
        ("Value", Align::Right),
        ("Pos", Align::Left),
        ("Age", Align::Right),
    ]);
    for row in players {
        table.push(vec![
            row.name.to_string(),
            row.value_formatted.to_string(),
            row.best_position.to_string(),
            format_optional_age(row.age),
        ]);
    }
    table.print(None)
}

fn print_group_means(key: &str, groups: &[GroupMean], limit: Option<usize>) -> usize {
    let mut table = Table::new(&[
        (key, Align::Left),
        ("Players", Align::Right),
        ("Avg Value", Align::Right),
    ]);
    for group in groups {
        table.push(vec![
            group.key.clone(),
            group.players.to_string(),
            format_euro_amount(group.mean),
        ]);
    }
    table.print(limit)
}

fn print_histogram(bins: &[HistogramBin], edge: impl Fn(f64) -> String) -> usize {
    if bins.is_empty() {
        return print_notice("No values to plot.");
    }
    let peak = bins.iter().map(|bin| bin.count).max().unwrap_or(0).max(1);
    let mut table = Table::new(&[
        ("From", Align::Right),
        ("To", Align::Right),
        ("Count", Align::Right),
        ("", Align::Left),
    ]);
    for bin in bins {
        let bar_len = bin.count * HISTOGRAM_BAR_WIDTH / peak;
        table.push(vec![
            edge(bin.start),
            edge(bin.end),
            bin.count.to_string(),
            "#".repeat(bar_len),
        ]);
    }
    table.print(None)
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Column-aligned text table sized to its widest cell.
struct Table<'a> {
    columns: Vec<(&'a str, Align)>,
    rows: Vec<Vec<String>>,
}

impl<'a> Table<'a> {
    fn new(columns: &[(&'a str, Align)]) -> Self {
        Self {
            columns: columns.to_vec(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, (title, _))| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(title.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn format_line<S: AsRef<str>>(&self, cells: &[S], widths: &[usize]) -> String {
        cells
            .iter()
            .zip(&self.columns)
            .zip(widths)
            .map(|((cell, (_, align)), &width)| match align {
                Align::Left => format!("{:<width$}", cell.as_ref()),
                Align::Right => format!("{:>width$}", cell.as_ref()),
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    }

    /// Prints at most `limit` rows and returns the widest printed line.
    fn print(&self, limit: Option<usize>) -> usize {
        let widths = self.widths();
        let titles: Vec<&str> = self.columns.iter().map(|(title, _)| *title).collect();
        let header = self.format_line(titles.as_slice(), &widths);
        let separator = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>()
            .join("-+-");

        let mut max_width = header.chars().count().max(separator.len());
        println!("{}", header.bold().bright_white());
        println!("{}", separator.bright_black());

        let shown = limit.unwrap_or(self.rows.len()).min(self.rows.len());
        for row in &self.rows[..shown] {
            let line = self.format_line(row.as_slice(), &widths);
            max_width = max_width.max(line.chars().count());
            println!("{}", line.bright_green());
        }
        if shown < self.rows.len() {
            let message = format!(
                "... {} more entries (use --full-output to display all).",
                self.rows.len() - shown
            );
            max_width = max_width.max(message.len());
            println!("{}", message.bright_black());
        }

        max_width
    }
}
