use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TICKS_BRAILLE_COLORED: [&str; 8] = [
    "\x1b[1;96m⠁\x1b[0m",
    "\x1b[1;96m⠂\x1b[0m",
    "\x1b[1;96m⠄\x1b[0m",
    "\x1b[1;96m⡀\x1b[0m",
    "\x1b[1;96m⢀\x1b[0m",
    "\x1b[1;96m⠠\x1b[0m",
    "\x1b[1;96m⠐\x1b[0m",
    "\x1b[1;96m⠈\x1b[0m",
];

const SPINNER_TICKS_BRAILLE_PLAIN: [&str; 8] = ["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"];
const SPINNER_TICKS_ASCII: &str = "|/-\\";

const STAGE_TOTAL: u8 = 2;

#[derive(Clone, Copy)]
pub enum Stage {
    Load,
    Prepare,
}

impl Stage {
    const fn index(self) -> u8 {
        match self {
            Self::Load => 1,
            Self::Prepare => 2,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Load => "Loading",
            Self::Prepare => "Preparing",
        }
    }
}

/// Spinner factory; hidden spinners when progress output is disabled.
pub struct ProgressState {
    enabled: bool,
    style: ProgressStyle,
}

impl ProgressState {
    pub(crate) fn new(enabled: bool, use_color: bool) -> Self {
        let style = ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let style = if is_dumb_term() {
            style.tick_chars(SPINNER_TICKS_ASCII)
        } else if use_color {
            style.tick_strings(&SPINNER_TICKS_BRAILLE_COLORED)
        } else {
            style.tick_strings(&SPINNER_TICKS_BRAILLE_PLAIN)
        };
        Self { enabled, style }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(15));
        bar.set_style(self.style.clone());
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    }
}

fn is_dumb_term() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.eq_ignore_ascii_case("dumb"))
}

fn format_stage_message(stage: Stage, label: &str) -> String {
    let prefix = format!("[{}/{}]", stage.index(), STAGE_TOTAL);
    format!(
        "{} {}: {}",
        prefix.bright_yellow().bold(),
        stage.label().bright_cyan().bold(),
        label.bright_white().bold()
    )
}

pub fn run_with_spinner<T, E>(
    progress: &ProgressState,
    stage: Stage,
    label: &str,
    task: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    let bar = progress.spinner(format_stage_message(stage, label));
    let result = task();
    let status = match &result {
        Ok(_) => "done".bright_green().bold(),
        Err(_) => "failed".bright_red().bold(),
    };
    bar.finish_with_message(format!("{} {status}", format_stage_message(stage, label)));
    result
}
