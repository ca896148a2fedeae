use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Local};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scoutboard::dataset::{prepare, read_players, save_dataset};
use scoutboard::views::analysis::{AnalysisOptions, analysis};
use scoutboard::views::comparison::compare;
use scoutboard::views::overview::{PREVIEW_ROWS, overview};
use scoutboard::views::search::{self, PlayerQuery, ValueRange, search_options};
use scoutboard::views::team::{team_overview, teams};
use scoutboard::views::transfers::{TOP_TRANSFERS, team_transfers, top_transfers};
use scoutboard::{Dataset, ParsePolicy};

use crate::cli::{Cli, Commands, generate_completions};
use crate::progress::{ProgressState, Stage, run_with_spinner};
use crate::render::{BannerContext, RenderOptions, print_banner};

mod cli;
mod progress;
mod render;
mod shell;

/// Settings shared by every page rendered during one run.
struct Session {
    data: PathBuf,
    policy: ParsePolicy,
    render: RenderOptions,
    run_started_at: DateTime<Local>,
}

fn main() -> Result<()> {
    colored::control::set_override(true);

    let mut cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.take().unwrap_or(Commands::Overview);
    let session = Session {
        policy: if cli.strict {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Impute
        },
        render: RenderOptions {
            json: cli.json,
            full_output: cli.full_output,
        },
        run_started_at: Local::now(),
        data: cli.data,
    };

    match command {
        Commands::Completions {
            shell,
            output_dir,
            install,
        } => generate_completions(shell, output_dir, install),
        Commands::Shell => shell::run(&session),
        page => {
            let progress = ProgressState::new(!cli.no_progress, true);
            let dataset = load_dataset(&session, &progress)?;
            run_page(page, &dataset, &session)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_dataset(session: &Session, progress: &ProgressState) -> Result<Dataset> {
    let path = session.data.as_path();
    let label = path.display().to_string();
    let table = run_with_spinner(progress, Stage::Load, &label, || read_players(path))
        .with_context(|| format!("failed to load player data from {label}"))?;
    run_with_spinner(progress, Stage::Prepare, "derived columns", || {
        prepare(table, session.policy)
    })
    .with_context(|| format!("failed to prepare player data from {label}"))
}

fn run_page(command: Commands, dataset: &Dataset, session: &Session) -> Result<()> {
    let options = session.render;
    let banner = |page: &str| {
        print_banner(
            &BannerContext {
                page,
                source: &session.data,
                dataset,
                run_started_at: &session.run_started_at,
            },
            options,
        );
    };

    match command {
        Commands::Overview => {
            banner("Overview");
            render::overview(&overview(dataset, PREVIEW_ROWS), options)
        }
        Commands::Analysis {
            top,
            per_position,
            bins,
        } => {
            let page = analysis(
                dataset,
                AnalysisOptions {
                    top_players: top,
                    top_per_position: per_position,
                    value_bins: bins,
                },
            );
            banner("Analysis");
            render::analysis(&page, options)
        }
        Commands::Data { save, archive } => {
            let saved_to = save
                .map(|target| {
                    let target = target.unwrap_or_else(|| session.data.clone());
                    save_dataset(dataset, &target, archive)
                        .with_context(|| format!("failed to save dataset to {}", target.display()))
                })
                .transpose()?;
            banner("Data");
            render::data(dataset, saved_to.as_deref(), options)
        }
        Commands::Search {
            age_group,
            position,
            foot,
            min_value,
            max_value,
        } => {
            let full = ValueRange::of(dataset).unwrap_or(ValueRange { min: 0.0, max: 0.0 });
            let value_range = ValueRange {
                min: min_value.unwrap_or(full.min),
                max: max_value.unwrap_or(full.max),
            };
            if value_range.min > value_range.max {
                bail!("--min-value must not exceed --max-value");
            }
            let query = match (age_group, position, foot) {
                (Some(age_group), Some(position), Some(foot)) => Some(PlayerQuery {
                    age_group,
                    position,
                    foot,
                    value_range,
                }),
                _ => None,
            };
            let outcome = search::run(dataset, query.as_ref());
            banner("Player Search");
            render::search(&outcome, &search_options(dataset), options)
        }
        Commands::Compare { position, names } => {
            let result = compare(dataset, &position, names.as_slice());
            banner("Comparison");
            render::comparison(&result, options)
        }
        Commands::Team { team: None, .. } => {
            banner("Teams");
            render::team_list(&teams(dataset), options)
        }
        Commands::Team {
            team: Some(team),
            bins,
        } => {
            let overview = team_overview(dataset, &team, bins)
                .ok_or_else(|| anyhow!("no players found for team '{team}'"))?;
            banner("Team Overview");
            render::team(&overview, options)
        }
        Commands::Transfers { team } => {
            let top = top_transfers(dataset, TOP_TRANSFERS);
            let activity = team.as_deref().map(|team| team_transfers(dataset, team));
            banner("Transfer Market");
            render::transfers(&top, activity.as_ref(), options)
        }
        Commands::Shell | Commands::Completions { .. } => {
            bail!("this command is not available inside the shell")
        }
    }
}
