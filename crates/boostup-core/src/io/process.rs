//! External command execution.
//!
//! Bootstrap and b2 runs go through [`CommandRunner`] so the pipeline can be
//! exercised without a compiler toolchain.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A fully described child process: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<OsString>,
    /// Working directory.
    pub cwd: PathBuf,
    /// File receiving stdout and stderr when output is captured.
    pub log: Option<PathBuf>,
}

impl Invocation {
    /// Run `program` inside `cwd` with no arguments.
    pub fn new(program: impl Into<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            log: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Capture output into `log`.
    pub fn with_log(mut self, log: impl Into<PathBuf>) -> Self {
        self.log = Some(log.into());
        self
    }

    /// Arguments as lossy strings, for display and assertions.
    pub fn arg_strings(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Runs an [`Invocation`] to completion.
pub trait CommandRunner: Send + Sync {
    /// Run the command, blocking until it exits.
    ///
    /// Returns the exit code, or `None` when the process was killed by a
    /// signal. An `Err` means the process could not be started.
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>>;
}

/// [`CommandRunner`] that spawns real processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner {
    /// Stream output to the terminal instead of the invocation's log file.
    pub verbose: bool,
}

impl SystemRunner {
    /// Runner that captures output unless `verbose`.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Option<i32>> {
        tracing::debug!(command = %invocation, cwd = %invocation.cwd.display(), "spawning");

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args).current_dir(&invocation.cwd);

        let status = match (&invocation.log, self.verbose) {
            (Some(log), false) => {
                if let Some(parent) = log.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let log_file = File::create(log)?;
                cmd.stdout(Stdio::from(log_file.try_clone()?))
                    .stderr(Stdio::from(log_file))
                    .status()?
            }
            _ => cmd.status()?,
        };

        Ok(status.code())
    }
}

/// Read the last N lines from a file efficiently.
///
/// Seeks to near the end and reads a fixed-size tail buffer, so a
/// multi-megabyte b2 log never gets loaded whole.
pub fn read_last_lines(path: &Path, n: usize) -> io::Result<String> {
    // Read at most 16KB from the end (enough for ~400 lines at 40 chars each)
    const TAIL_SIZE: u64 = 16 * 1024;

    let mut file = File::open(path)?;
    let file_len = file.metadata()?.len();

    let seek_pos = file_len.saturating_sub(TAIL_SIZE);
    file.seek(SeekFrom::Start(seek_pos))?;

    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let buffer = String::from_utf8_lossy(&bytes);

    // If we seeked mid-file, skip the first (partial) line
    let content = if seek_pos > 0 {
        buffer.find('\n').map_or(&*buffer, |idx| &buffer[idx + 1..])
    } else {
        &*buffer
    };

    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].join("\n"))
}
