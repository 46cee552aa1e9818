use colored::Colorize;

use crate::engine::SyncReport;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Render the per-record outcomes of a reconciliation run.
pub fn display_report(report: &SyncReport) {
    if report.total() == 0 {
        println!();
        println!("  {} Nothing to reconcile", "✓".green());
        return;
    }

    println!();
    for role in &report.created {
        println!(
            "  {} {:<30} {}",
            "+".green(),
            role.name,
            format!("created (role_id={})", role.role_id).dimmed()
        );
    }
    for role in &report.updated {
        println!(
            "  {} {:<30} {}",
            "~".yellow(),
            role.name,
            format!("updated (role_id={})", role.role_id).dimmed()
        );
    }
    for name in &report.unchanged {
        println!("  {} {:<30} {}", "○".dimmed(), name, "unchanged".dimmed());
    }
    for failure in &report.errors {
        println!(
            "  {} {:<30} {}",
            "✗".red(),
            failure.name,
            failure.error.red()
        );
    }

    println!();
    if report.has_errors() {
        println!(
            "  {} {} created, {} updated, {} unchanged, {} {}",
            "⚠".yellow().bold(),
            report.created.len(),
            report.updated.len(),
            report.unchanged.len(),
            report.errors.len(),
            "failed".red()
        );
    } else {
        println!(
            "  {} {} created, {} updated, {} unchanged",
            "✓".green().bold(),
            report.created.len(),
            report.updated.len(),
            report.unchanged.len()
        );
    }
}
