use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate, generate_to};
use scoutboard::AgeBucket;
use scoutboard::currency::normalize_currency;
use scoutboard::views::analysis::{
    DEFAULT_TOP_PER_POSITION, DEFAULT_TOP_PLAYERS, DEFAULT_VALUE_BINS,
};
use scoutboard::views::team::TEAM_HISTOGRAM_BINS;

pub const DEFAULT_DATA_PATH: &str = "data_cleaned.csv";
const BIN_NAME: &str = "scout_board";

pub const DATA_HELP: &str =
    "Player CSV to load (defaults to data_cleaned.csv in the working directory).";
pub const STRICT_HELP: &str = "Abort the load on the first unparseable amount instead of imputing the column mean.";
pub const SAVE_HELP: &str = "Save the prepared dataset with its derived columns to the given CSV file (overwrites the --data file when no path is provided). Use --archive to store a .gz instead.";
pub const ARCHIVE_HELP: &str = "Archive the saved CSV into a .gz file.";

#[derive(Debug, Parser)]
#[command(
    name = BIN_NAME,
    about = "Explore a football player CSV: derived currency columns, age groups, search, comparison, team and transfer pages.",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "FILE",
        default_value = DEFAULT_DATA_PATH,
        help = DATA_HELP
    )]
    pub data: PathBuf,
    #[arg(long, global = true, help = STRICT_HELP)]
    pub strict: bool,
    #[arg(
        long,
        global = true,
        help = "Print page results as JSON instead of terminal tables."
    )]
    pub json: bool,
    #[arg(
        long,
        global = true,
        help = "Print every row of each table instead of the abbreviated view."
    )]
    pub full_output: bool,
    #[arg(long, global = true, help = "Disable progress spinner output.")]
    pub no_progress: bool,
    #[arg(
        short,
        long,
        global = true,
        help = "Log debug events to stderr (overrides RUST_LOG)."
    )]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Headline metrics and the first rows of the table.
    Overview,
    /// Top players, age/position/foot breakdowns and value correlations.
    Analysis {
        #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_PLAYERS)]
        top: usize,
        #[arg(long, value_name = "N", default_value_t = DEFAULT_TOP_PER_POSITION)]
        per_position: usize,
        #[arg(long, value_name = "N", default_value_t = DEFAULT_VALUE_BINS)]
        bins: usize,
    },
    /// The full prepared table, optionally saved back to CSV.
    Data {
        #[arg(long, value_name = "FILE", num_args = 0..=1, help = SAVE_HELP)]
        save: Option<Option<PathBuf>>,
        #[arg(long, help = ARCHIVE_HELP)]
        archive: bool,
    },
    /// Players matching an age group, position, foot and value range; lists
    /// the available choices until all three criteria are given.
    Search {
        #[arg(
            long,
            value_name = "GROUP",
            help = "Age group as a category number (1-6) or its label, e.g. \"21,22,23,24,25\"."
        )]
        age_group: Option<AgeBucket>,
        #[arg(long)]
        position: Option<String>,
        #[arg(long)]
        foot: Option<String>,
        #[arg(
            long,
            value_name = "AMOUNT",
            value_parser = parse_amount,
            help = "Lower value bound, e.g. 5000000 or €5M (defaults to the lowest value)."
        )]
        min_value: Option<f64>,
        #[arg(
            long,
            value_name = "AMOUNT",
            value_parser = parse_amount,
            help = "Upper value bound (defaults to the highest value)."
        )]
        max_value: Option<f64>,
    },
    /// Side-by-side value, wage and age of players of one position.
    Compare {
        #[arg(long)]
        position: String,
        #[arg(value_name = "NAME")]
        names: Vec<String>,
    },
    /// Metrics, roster and distributions of one team; lists teams when none is given.
    Team {
        team: Option<String>,
        #[arg(long, value_name = "N", default_value_t = TEAM_HISTOGRAM_BINS)]
        bins: usize,
    },
    /// Most valuable players plus incoming and outgoing players of a team.
    Transfers {
        #[arg(long)]
        team: Option<String>,
    },
    /// Read page commands from stdin, one per line, reusing the loaded dataset.
    Shell,
    /// Generate shell completion scripts, optionally installing them for the current user.
    Completions {
        #[arg(value_enum, help = "Shell to generate completions for.")]
        shell: Shell,
        #[arg(
            long,
            value_name = "DIR",
            help = "Directory to write the completion script to."
        )]
        output_dir: Option<PathBuf>,
        #[arg(
            long,
            help = "Install the completion script into the default location for the selected shell."
        )]
        install: bool,
    },
}

/// One line of `shell` input: a page command without the binary name.
#[derive(Debug, Parser)]
#[command(name = BIN_NAME, no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Commands,
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    normalize_currency(Some(raw))
        .map_err(|err| err.to_string())?
        .ok_or_else(|| format!("'{raw}' is not an amount"))
}

/// Splits a shell line on whitespace, keeping double-quoted runs together.
pub fn split_line(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quoted = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            ch if ch.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            ch => {
                current.push(ch);
                in_word = true;
            }
        }
    }
    if quoted {
        return Err(anyhow!("unterminated quote in '{line}'"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Prints the completion script, or writes it into `output_dir` (or the
/// per-user completion directory with `install`).
pub fn generate_completions(shell: Shell, output_dir: Option<PathBuf>, install: bool) -> Result<()> {
    let mut command = Cli::command();
    let dir = match (output_dir, install) {
        (Some(dir), _) => dir,
        (None, true) => user_completion_dir(shell)?,
        (None, false) => {
            let mut stdout = io::stdout().lock();
            generate(shell, &mut command, BIN_NAME, &mut stdout);
            return stdout.flush().context("failed to print completions");
        }
    };

    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    let script = generate_to(shell, &mut command, BIN_NAME, &dir)
        .with_context(|| format!("failed to write {shell} completions"))?;
    println!("Wrote {shell} completions to {}", script.display());
    Ok(())
}

fn user_completion_dir(shell: Shell) -> Result<PathBuf> {
    let relative = match shell {
        Shell::Bash => ".local/share/bash-completion/completions",
        Shell::Fish => ".config/fish/completions",
        Shell::Zsh => ".local/share/zsh/site-functions",
        other => bail!("no per-user completion directory is known for {other}; pass --output-dir"),
    };
    let home = std::env::var_os("HOME").context("HOME is not set; pass --output-dir")?;
    Ok(PathBuf::from(home).join(relative))
}
