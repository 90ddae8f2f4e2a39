use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};
use crate::aggregator::ReportSummary;

/// Write the rendered document to disk, creating the parent directory if
/// absent. All-or-nothing: any I/O failure aborts before success is
/// reported.
pub fn publish(path: &Path, document: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create output directory: {}", parent.display()))?;
        }
    }

    fs::write(path, document)
        .context(format!("Failed to write report file: {}", path.display()))?;

    Ok(())
}

/// Human-readable run summary on the log stream.
pub fn print_summary(summary: &ReportSummary) {
    info!("");
    info!("=== LAPS Status Summary ===");
    info!("Total computers: {}", summary.total_computers);
    info!(
        "Rotation enabled: {} ({:.2}%)",
        summary.enabled_count, summary.enabled_percentage
    );
    info!("Not enabled: {}", summary.not_enabled_count);
    info!(
        "By mechanism: {} Windows LAPS, {} Legacy LAPS",
        summary.modern_count, summary.legacy_count
    );
    info!(
        "Servers: {} ({} enabled, {:.2}%)",
        summary.server_count, summary.server_enabled_count, summary.server_enabled_percentage
    );
    info!(
        "Clients: {} ({} enabled, {:.2}%)",
        summary.client_count, summary.client_enabled_count, summary.client_enabled_percentage
    );
}

/// Open the report in the platform's default viewer. Best-effort: failure
/// is logged and never escalated.
pub fn open_in_viewer(path: &Path) {
    let result = launch_viewer(path);
    if let Err(e) = result {
        warn!("Could not open report in default viewer: {}", e);
    }
}

#[cfg(windows)]
fn launch_viewer(path: &Path) -> std::io::Result<()> {
    Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn()
        .map(|_| ())
}

#[cfg(target_os = "macos")]
fn launch_viewer(path: &Path) -> std::io::Result<()> {
    Command::new("open").arg(path).spawn().map(|_| ())
}

#[cfg(not(any(windows, target_os = "macos")))]
fn launch_viewer(path: &Path) -> std::io::Result<()> {
    Command::new("xdg-open").arg(path).spawn().map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn publish_creates_missing_parent_directories() {
        let dir = env::temp_dir().join(format!("laps-report-test-{}", std::process::id()));
        let path = dir.join("nested").join("report.html");

        publish(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn publish_overwrites_existing_file() {
        let dir = env::temp_dir().join(format!("laps-report-overwrite-{}", std::process::id()));
        let path = dir.join("report.html");

        publish(&path, "first").unwrap();
        publish(&path, "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");

        fs::remove_dir_all(&dir).unwrap();
    }
}
