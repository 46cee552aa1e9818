//! Hand a session URL to the platform's browser launcher.

use anyhow::{Context, Result, bail};
use std::process::Command;

/// Open `url` in the default browser.
pub fn open_url(url: &str) -> Result<()> {
    let mut command = launcher(url);
    let status = command
        .status()
        .with_context(|| format!("could not launch a browser for {url}"))?;

    if !status.success() {
        bail!("browser launcher exited with {status} for {url}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn launcher(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

#[cfg(target_os = "windows")]
fn launcher(url: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", "", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn launcher(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}
