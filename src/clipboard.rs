//! Clipboard access for the copy action.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::{Error, Result};

/// Destination for copied transcript text.
pub trait Clipboard: Send {
    /// Place `text` on the clipboard.
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Copies by piping text into the platform's clipboard command.
///
/// Tries `pbcopy`, then `wl-copy`, then `xclip -selection clipboard`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

const COPY_COMMANDS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
];

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        pipe_to_first_command(COPY_COMMANDS, text)
    }
}

/// Runs each command in turn until one accepts `text` and exits cleanly.
///
/// The error returned describes the last command attempted.
fn pipe_to_first_command(commands: &[(&str, &[&str])], text: &str) -> Result<()> {
    let mut last_err = Error::io(
        "no clipboard command available",
        std::io::Error::from(std::io::ErrorKind::NotFound),
    );
    for (program, args) in commands {
        match pipe_to_command(program, args, text) {
            Ok(()) => return Ok(()),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

fn pipe_to_command(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| Error::io(format!("failed to start {program}"), err))?;
    // stdin must close before wait() or the child never sees EOF
    let written = child
        .stdin
        .take()
        .map(|mut stdin| stdin.write_all(text.as_bytes()))
        .unwrap_or(Ok(()));
    let status = child
        .wait()
        .map_err(|err| Error::io(format!("failed to wait for {program}"), err))?;
    if !status.success() {
        return Err(Error::io(
            format!("{program} exited with {status}"),
            std::io::Error::other("non-zero exit status"),
        ));
    }
    written.map_err(|err| Error::io(format!("failed to write to {program}"), err))
}

/// In-memory clipboard, useful for tests and headless sessions.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the most recently copied text.
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.contents = Some(text.to_string());
        Ok(())
    }
}
