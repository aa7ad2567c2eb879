//! Tab opener abstraction for handing built URLs to a browser.

use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::{DorkError, Result};

/// Launcher commands tried in order when looking for a system opener.
#[cfg(target_os = "macos")]
const KNOWN_COMMANDS: &[&str] = &["open"];
#[cfg(target_os = "windows")]
const KNOWN_COMMANDS: &[&str] = &["explorer"];
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const KNOWN_COMMANDS: &[&str] = &["xdg-open", "gio", "sensible-browser"];

/// Trait for opening a URL in a new browser tab.
///
/// Openers are fire-and-forget: success means the URL was handed off, not
/// that a page loaded.
pub trait TabOpener: Send + Sync {
    /// Opens `url`.
    fn open(&self, url: &str) -> Result<()>;
}

/// Opens URLs with the platform launcher found on `PATH`.
#[derive(Debug, Clone)]
pub struct SystemOpener {
    command: PathBuf,
}

impl SystemOpener {
    /// Locates a launcher. Returns `None` when none is installed.
    pub fn detect() -> Option<Self> {
        for cmd in KNOWN_COMMANDS {
            if let Ok(path) = which::which(cmd) {
                debug!("Tab opener found in PATH: {}", path.display());
                return Some(Self { command: path });
            }
        }
        None
    }

    /// Uses an explicit launcher binary.
    pub fn with_command(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// The launcher binary in use.
    pub fn command(&self) -> &PathBuf {
        &self.command
    }
}

impl TabOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        check_url(url)?;
        let mut cmd = Command::new(&self.command);
        // gio needs its subcommand before the target
        if self.command.file_name().is_some_and(|name| name == "gio") {
            cmd.arg("open");
        }
        cmd.arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| DorkError::Opener(format!("{}: {}", self.command.display(), e)))?;
        Ok(())
    }
}

/// Writes each URL to stdout, one per line. Used when no launcher exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOpener;

impl TabOpener for PrintOpener {
    fn open(&self, url: &str) -> Result<()> {
        check_url(url)?;
        println!("{}", url);
        Ok(())
    }
}

/// Rejects anything that is not an absolute http(s) URL.
fn check_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(DorkError::Opener(format!(
            "refusing to open '{}' URL",
            scheme
        ))),
    }
}
