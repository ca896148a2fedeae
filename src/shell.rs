use std::io::{self, BufRead, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};

use scoutboard::{CacheStatus, DatasetCache};

use crate::cli::{ShellLine, split_line};
use crate::{Session, run_page};

const HISTORY_FILE: &str = ".scout_board_history";
const HISTORY_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Exit,
}

/// Runs page commands against one cached dataset. A terminal gets a line
/// editor with history; piped input is read line by line.
pub fn run(session: &Session) -> Result<()> {
    let mut cache = DatasetCache::new(session.policy);
    if io::stdin().is_terminal() {
        run_tty(&mut cache, session)
    } else {
        run_piped(&mut cache, session)
    }
}

fn run_tty(cache: &mut DatasetCache, session: &Session) -> Result<()> {
    let mut editor = Reedline::create();
    if let Some(path) = history_path() {
        match FileBackedHistory::with_file(HISTORY_SIZE, path.clone()) {
            Ok(history) => editor = editor.with_history(Box::new(history)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "shell history disabled");
            }
        }
    }
    let prompt = DefaultPrompt::new(
        DefaultPromptSegment::Basic("scout_board".to_string()),
        DefaultPromptSegment::Empty,
    );

    println!(
        "{} {}",
        format!("Scout Board v{}", env!("CARGO_PKG_VERSION")).bold().bright_cyan(),
        "(type .help for help)".bright_black()
    );

    loop {
        match editor.read_line(&prompt).context("failed to read shell input")? {
            Signal::Success(buffer) => {
                if handle_line(&buffer, cache, session) == Control::Exit {
                    break;
                }
            }
            Signal::CtrlD => break,
            _ => {}
        }
    }
    Ok(())
}

fn run_piped(cache: &mut DatasetCache, session: &Session) -> Result<()> {
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read shell input")?;
        if handle_line(&line, cache, session) == Control::Exit {
            break;
        }
    }
    Ok(())
}

fn history_path() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(HISTORY_FILE))
}

fn handle_line(line: &str, cache: &mut DatasetCache, session: &Session) -> Control {
    match line.trim() {
        "" => {}
        ".exit" | "q" => return Control::Exit,
        ".help" | "?" => print_help(),
        ".reload" => {
            cache.invalidate();
            println!("{}", "dataset will be reloaded".bright_black());
        }
        input => {
            if let Err(err) = run_line(input, cache, session) {
                eprintln!("{} {err:#}", "error:".bright_red().bold());
            }
        }
    }
    Control::Continue
}

/// The dataset is resolved through the cache for every line so edits to the
/// source file are picked up.
fn run_line(input: &str, cache: &mut DatasetCache, session: &Session) -> Result<()> {
    let ShellLine { command } = ShellLine::try_parse_from(split_line(input)?)?;
    let path = session.data.as_path();
    let (dataset, status) = cache
        .load(path)
        .with_context(|| format!("failed to load player data from {}", path.display()))?;
    if status == CacheStatus::Miss {
        tracing::info!(path = %path.display(), records = dataset.len(), "dataset loaded for shell");
    }
    run_page(command, &dataset, session)
}

fn print_help() {
    println!("{}", "Shell commands".bold().bright_magenta());
    for (command, description) in [
        (
            "overview | analysis | data | search | compare | team | transfers",
            "render a page; flags as on the command line",
        ),
        (".reload", "drop the cached dataset"),
        (".help", "show this help"),
        (".exit", "leave the shell"),
    ] {
        println!(
            "  {} {}",
            command.bright_white().bold(),
            description.bright_black()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Local;

    use scoutboard::ParsePolicy;

    use crate::render::RenderOptions;

    fn session() -> Session {
        Session {
            data: PathBuf::from("missing-players.csv"),
            policy: ParsePolicy::Impute,
            render: RenderOptions {
                json: true,
                full_output: false,
            },
            run_started_at: Local::now(),
        }
    }

    #[test]
    fn dot_commands_control_the_loop() {
        let session = session();
        let mut cache = DatasetCache::new(session.policy);
        assert_eq!(handle_line("  .exit ", &mut cache, &session), Control::Exit);
        assert_eq!(handle_line("q", &mut cache, &session), Control::Exit);
        assert_eq!(handle_line("", &mut cache, &session), Control::Continue);
        assert_eq!(handle_line(".reload", &mut cache, &session), Control::Continue);
    }

    #[test]
    fn failing_page_keeps_the_shell_running() {
        let session = session();
        let mut cache = DatasetCache::new(session.policy);
        assert!(run_line("overview", &mut cache, &session).is_err());
        assert!(run_line("nonsense --flag", &mut cache, &session).is_err());
        assert_eq!(handle_line("overview", &mut cache, &session), Control::Continue);
    }
}
