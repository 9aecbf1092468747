use std::io::Write as _;
use std::time::Duration;

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use intake::core::console::{Console, Line};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt, BufReader, Stdin};

const BAR_CHAR: &str = "▎";

/// A console on the process's standard streams.
pub struct TerminalConsole {
    stdin: BufReader<Stdin>,
    progress_style: ProgressStyle,
    progress_bar: Option<ProgressBar>,
}

impl TerminalConsole {
    pub fn new() -> Self {
        let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
        Self {
            stdin: BufReader::new(io::stdin()),
            progress_style,
            progress_bar: None,
        }
    }
}

#[async_trait]
impl Console for TerminalConsole {
    async fn read_line(&mut self) -> Option<String> {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        match self.stdin.read_line(&mut line).await {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
            Err(err) => {
                error!("error reading input: {}", err);
                None
            }
        }
    }

    fn show(&mut self, line: Line<'_>) {
        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = &self.progress_bar {
            progress_bar.finish_and_clear();
        }
        self.progress_bar = None;

        match line {
            Line::Heading(text) => {
                println!("\n{}", format!("=== {text} ===").bright_white().bold());
            }
            Line::Assistant(text) => {
                println!("{}🤖 {}", BAR_CHAR.bright_cyan(), text.bright_white());
            }
            Line::Prompt(text) => {
                println!("{}❓ {}", BAR_CHAR.bright_yellow(), text.bold());
            }
            Line::Notice(text) => println!("{}", text.dimmed()),
            Line::Error(text) => {
                eprintln!("{}⚠️  {}", BAR_CHAR.bright_red(), text.bright_red());
            }
        }
    }

    fn set_waiting(&mut self, waiting: bool) {
        if let Some(progress_bar) = self.progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        if waiting {
            let progress_bar = ProgressBar::new_spinner();
            progress_bar.set_style(self.progress_style.clone());
            progress_bar.set_message("🤔 Thinking...");
            progress_bar.enable_steady_tick(Duration::from_millis(100));
            self.progress_bar = Some(progress_bar);
        }
    }
}
