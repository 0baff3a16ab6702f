use std::env;
use std::io::{self, IsTerminal, Write};

pub(crate) fn progress_enabled() -> bool {
    match env::var("VENVX_PROGRESS") {
        Ok(value) => value != "0",
        Err(_) => io::stderr().is_terminal(),
    }
}

fn clear_progress_line() {
    let mut stderr = io::stderr().lock();
    let _ = stderr.write_all(b"\r\x1b[2K");
    let _ = stderr.flush();
}

/// Single-line progress on stderr.
///
/// Rendering happens inline on every update; nothing runs in the background.
pub struct ProgressReporter {
    label: String,
    total: Option<usize>,
    current: usize,
    enabled: bool,
}

impl ProgressReporter {
    pub fn spinner(label: impl Into<String>) -> Self {
        Self::start(label, None)
    }

    pub fn bar(label: impl Into<String>, total: usize) -> Self {
        if total == 0 {
            return Self::spinner(label);
        }
        Self::start(label, Some(total))
    }

    fn start(label: impl Into<String>, total: Option<usize>) -> Self {
        let reporter = Self {
            label: label.into(),
            total,
            current: 0,
            enabled: progress_enabled(),
        };
        reporter.render();
        reporter
    }

    /// Replaces the label, e.g. with the item about to be processed.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.render();
    }

    pub fn increment(&mut self) {
        self.current = self.current.saturating_add(1);
        self.render();
    }

    pub fn position(&self) -> usize {
        self.current
    }

    fn render(&self) {
        if !self.enabled {
            return;
        }
        let line = match self.total {
            Some(total) => format!(
                "\r\x1b[2Kvenvx ▸ {} [{}/{total}]",
                self.label,
                self.current.min(total)
            ),
            None => format!("\r\x1b[2Kvenvx ▸ {}", self.label),
        };
        let mut stderr = io::stderr().lock();
        let _ = stderr.write_all(line.as_bytes());
        let _ = stderr.flush();
    }

    pub fn finish(mut self, message: impl Into<String>) {
        let was_enabled = self.enabled;
        self.stop();
        if was_enabled {
            eprintln!("venvx ▸ {}", message.into());
        }
    }

    fn stop(&mut self) {
        if self.enabled {
            clear_progress_line();
            self.enabled = false;
        }
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        self.stop();
    }
}
