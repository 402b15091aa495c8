//! Launches the platform's process viewer from the tray menu

use anyhow::{bail, Context, Result};
use log::info;
use std::process::{Command, Stdio};

/// Program and arguments that open the process viewer on `os`
/// (a value of `std::env::consts::OS`)
pub fn viewer_command(os: &str) -> Result<(&'static str, Vec<&'static str>)> {
    match os {
        "windows" => Ok(("cmd", vec!["/c", "start", "taskmgr.exe"])),
        "macos" => Ok(("open", vec!["-a", "Activity Monitor"])),
        other => bail!("Unsupported OS for the process viewer: {}", other),
    }
}

/// Start the process viewer detached. Failures are for the caller to log.
pub fn open() -> Result<()> {
    let (program, args) = viewer_command(std::env::consts::OS)?;

    Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {}", program))?;

    info!("Process viewer launched");
    Ok(())
}
