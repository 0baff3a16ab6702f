//! Confirmations and single-choice picks.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};

pub trait Prompter: Send + Sync {
    /// Asks a yes/no question. Empty or unreadable input answers `default`.
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;

    /// Offers `items` and returns the chosen index, or `None` when cancelled.
    /// `preselected` is returned when the user just presses enter.
    fn select(&self, title: &str, items: &[String], preselected: usize) -> Result<Option<usize>>;
}

/// Interactive prompts on stderr, answers read from stdin.
///
/// When stdin is not a terminal, selections take the preselected item.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_answer() -> Result<Option<String>> {
        let mut answer = String::new();
        let read = io::stdin()
            .lock()
            .read_line(&mut answer)
            .context("failed to read answer from stdin")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(answer.trim().to_string()))
    }
}

impl Prompter for TerminalPrompter {
    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let suffix = if default { "(Y/n)" } else { "(y/N)" };
        eprint!("{question} {suffix} ");
        io::stderr().flush().ok();
        let Some(answer) = Self::read_answer()? else {
            eprintln!();
            return Ok(false);
        };
        Ok(parse_confirmation(&answer, default))
    }

    fn select(&self, title: &str, items: &[String], preselected: usize) -> Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        let preselected = preselected.min(items.len() - 1);
        if !io::stdin().is_terminal() {
            return Ok(Some(preselected));
        }
        eprintln!("{title}");
        for (idx, item) in items.iter().enumerate() {
            let marker = if idx == preselected { ">" } else { " " };
            eprintln!(" {marker} {:>3}) {item}", idx + 1);
        }
        eprint!("Choose 1-{} (enter for {}, q to cancel): ", items.len(), preselected + 1);
        io::stderr().flush().ok();
        let Some(answer) = Self::read_answer()? else {
            return Ok(None);
        };
        Ok(parse_selection(&answer, items.len(), preselected))
    }
}

/// Non-interactive prompter for `--yes`: confirms everything and takes the
/// preselected choice.
#[derive(Debug, Default)]
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    fn confirm(&self, question: &str, _default: bool) -> Result<bool> {
        tracing::debug!(question, "auto-confirmed");
        Ok(true)
    }

    fn select(&self, title: &str, items: &[String], preselected: usize) -> Result<Option<usize>> {
        if items.is_empty() {
            return Ok(None);
        }
        tracing::debug!(title, choice = %items[preselected.min(items.len() - 1)], "auto-selected");
        Ok(Some(preselected.min(items.len() - 1)))
    }
}

fn parse_confirmation(answer: &str, default: bool) -> bool {
    if answer.is_empty() {
        return default;
    }
    matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
}

fn parse_selection(answer: &str, len: usize, preselected: usize) -> Option<usize> {
    if answer.is_empty() {
        return Some(preselected);
    }
    if answer.eq_ignore_ascii_case("q") {
        return None;
    }
    answer
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=len).contains(choice))
        .map(|choice| choice - 1)
}
