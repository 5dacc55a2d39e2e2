//! [`Reporter`] that writes styled progress to stderr.
//!
//! Stdout is reserved for command results so they stay pipeable.

use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use boostup_core::Reporter;
use boostup_core::io::process::Invocation;
use boostup_schema::Version;
use crossterm::style::Stylize;

use super::theme::{format_progress, percent};

/// Sentinel meaning no progress line has been drawn for the current download.
const NO_PROGRESS: u64 = u64::MAX;

/// Terminal reporter.
#[derive(Debug)]
pub struct ConsoleReporter {
    interactive: bool,
    last_percent: AtomicU64,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stderr().is_terminal(),
            last_percent: AtomicU64::new(NO_PROGRESS),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        eprintln!("{}", title.cyan().bold());
    }

    fn downloading(&self, version: &Version, current: u64, total: Option<u64>) {
        let Some(total) = total.filter(|&t| t > 0) else {
            // Unknown size: only the final count is worth printing.
            return;
        };
        let pct = percent(current, total);
        if self.last_percent.swap(pct, Ordering::Relaxed) == pct {
            return;
        }

        let line = format!(
            "  {} boost {version}  {}",
            "fetching".blue(),
            format_progress(current, Some(total))
        );
        if self.interactive {
            eprint!("\r{line}");
            if current >= total {
                eprintln!();
            }
            let _ = std::io::stderr().flush();
        } else if current >= total {
            eprintln!("{line}");
        }
    }

    fn extracting(&self, version: &Version, archive: &Path) {
        self.last_percent.store(NO_PROGRESS, Ordering::Relaxed);
        eprintln!(
            "  {} boost {version}  {}",
            "extracting".blue(),
            archive.display().to_string().dark_grey()
        );
    }

    fn running(&self, invocation: &Invocation) {
        eprintln!(
            "  {} {}",
            "running".blue(),
            invocation.to_string().dark_grey()
        );
    }

    fn done(&self, version: &Version, detail: &str) {
        eprintln!("  {} boost {version}  {detail}", "done".green());
    }

    fn cached(&self, version: &Version, prefix: &Path) {
        eprintln!(
            "  {} boost {version}  {}",
            "cached".green(),
            prefix.display().to_string().dark_grey()
        );
    }

    fn info(&self, msg: &str) {
        eprintln!("  {msg}");
    }

    fn warning(&self, msg: &str) {
        eprintln!("{} {msg}", "warning:".yellow().bold());
    }

    fn error(&self, msg: &str) {
        eprintln!("{} {msg}", "error:".red().bold());
    }
}
