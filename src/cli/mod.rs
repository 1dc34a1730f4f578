//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `trimsave fix <paths..>`: trim files in place, or `--check` only
//! - `trimsave stdin`: trim standard input to standard output
//! - `trimsave stats`: summary of the event log
//! - `trimsave config show|init|set|reset`: configuration management

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::{self, TrimsaveConfig};
use crate::events::reporter::{self, Stats};
use crate::events::{self, EventSink, JsonlSink, NullSink};
use crate::host::{self, Document, FilePersist};
use crate::session::{BufferId, SessionRegistry};

/// Output format for `trimsave stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

/// Event sink selected by the `[logging]` section.
fn event_sink(config: &TrimsaveConfig) -> Arc<dyn EventSink> {
    if config.logging.enabled {
        Arc::new(JsonlSink::new(events::expand_home(&config.logging.path)))
    } else {
        Arc::new(NullSink)
    }
}

// ---------------------------------------------------------------------------
// trimsave fix
// ---------------------------------------------------------------------------

/// Outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Unchanged,
    Trimmed { removed_chars: usize },
    /// `--check` found something to trim.
    NeedsTrim { removed_chars: usize },
}

/// Trim files in place. With `check`, nothing is written and the command
/// fails if any file would change.
pub fn run_fix(paths: &[PathBuf], language: Option<&str>, check: bool) -> Result<()> {
    let config = config::load();
    if !config.general.enabled {
        println!("{}", "trimsave is disabled (general.enabled = false).".yellow());
        return Ok(());
    }

    let mut registry = SessionRegistry::with_sink(config.trim.options(), event_sink(&config));
    let mut pending = 0;

    for (index, path) in paths.iter().enumerate() {
        let outcome = fix_file(&mut registry, BufferId(index as u64), path, language, check)?;
        match outcome {
            FileOutcome::Unchanged => {
                println!("  {} {}", "·".dimmed(), path.display().to_string().dimmed());
            }
            FileOutcome::Trimmed { removed_chars } => {
                println!(
                    "  {} {} ({} chars removed)",
                    "✓".green().bold(),
                    path.display(),
                    removed_chars
                );
            }
            FileOutcome::NeedsTrim { removed_chars } => {
                pending += 1;
                println!(
                    "  {} {} ({} chars to remove)",
                    "✗".red().bold(),
                    path.display(),
                    removed_chars
                );
            }
        }
    }

    if pending > 0 {
        anyhow::bail!("{pending} file(s) have trailing whitespace or blank lines to trim");
    }
    Ok(())
}

/// Trim a single file through the registry's save cycle. Each file is
/// trimmed once; `check` runs the trim without writing.
pub fn fix_file(
    registry: &mut SessionRegistry,
    id: BufferId,
    path: &Path,
    language: Option<&str>,
    check: bool,
) -> Result<FileOutcome> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed reading {}", path.display()))?;

    let mut doc = Document::new(id, text);
    if let Some(language) = language.or_else(|| host::detect_language(path)) {
        doc = doc.with_language(language);
    }

    let handle = registry.subscribe(id);
    let outcome = if check {
        host::check_document(registry, &doc)
            .map_err(anyhow::Error::from)
            .map(|trim| match trim.removed_chars() {
                0 => FileOutcome::Unchanged,
                removed_chars => FileOutcome::NeedsTrim { removed_chars },
            })
    } else {
        host::save_document(registry, &mut doc, &mut FilePersist::new(path)).map(|report| {
            match report.removed_chars {
                0 => FileOutcome::Unchanged,
                removed_chars => FileOutcome::Trimmed { removed_chars },
            }
        })
    };
    registry.unsubscribe(handle)?;
    outcome
}

// ---------------------------------------------------------------------------
// trimsave stdin
// ---------------------------------------------------------------------------

/// Trim standard input and write the result to standard output.
pub fn run_stdin(cursor: Option<usize>, language: Option<&str>) -> Result<()> {
    let config = config::load();

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed reading stdin")?;

    let output = if config.general.enabled {
        host::trim_text(&input, cursor, language, &config.trim.options())?
    } else {
        input
    };

    std::io::stdout()
        .write_all(output.as_bytes())
        .context("failed writing to stdout")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// trimsave stats
// ---------------------------------------------------------------------------

/// Show a summary of the event log.
pub fn run_stats(format: OutputFormat, days: Option<u32>) -> Result<()> {
    let config = config::load();
    let path = events::expand_home(&config.logging.path);
    let stats = reporter::compute_stats(&path, days);

    if stats.trims == 0 && format == OutputFormat::Table {
        println!(
            "{}",
            "No data yet. Set logging.enabled = true (or TRIMSAVE_LOG=1) to record saves."
                .yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_stats_json(&stats)?,
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }

    Ok(())
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "trimsave Report".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("  {} {}", "Trims:          ".bold(), stats.trims);
    println!("  {} {}", "Buffers:        ".bold(), stats.buffers);
    println!(
        "  {} {} ({:.1} per trim)",
        "Chars removed:  ".bold(),
        format_number(stats.removed_chars),
        stats.avg_removed_chars()
    );
    println!("  {} {}", "Language skips: ".bold(), stats.language_skips);
    println!();
    println!("{}", "Cursor Whitespace".bold().cyan());
    println!(
        "  Captured: {}  Restored: {} ({:.0}%)  Skipped: {}  Discarded: {}",
        stats.captures,
        stats.restores,
        stats.restore_pct(),
        stats.skipped_restores.to_string().yellow(),
        stats.discarded_captures,
    );
}

fn print_stats_json(stats: &Stats) -> Result<()> {
    let value = serde_json::json!({
        "trims": stats.trims,
        "buffers": stats.buffers,
        "deletions": stats.deletions,
        "removed_chars": stats.removed_chars,
        "language_skips": stats.language_skips,
        "captures": stats.captures,
        "discarded_captures": stats.discarded_captures,
        "restores": stats.restores,
        "skipped_restores": stats.skipped_restores,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_stats_csv(stats: &Stats) {
    println!(
        "trims,buffers,deletions,removed_chars,language_skips,captures,discarded_captures,restores,skipped_restores"
    );
    println!(
        "{},{},{},{},{},{},{},{},{}",
        stats.trims,
        stats.buffers,
        stats.deletions,
        stats.removed_chars,
        stats.language_skips,
        stats.captures,
        stats.discarded_captures,
        stats.restores,
        stats.skipped_restores,
    );
}

// ---------------------------------------------------------------------------
// trimsave config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective trimsave Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file().is_some_and(|p| p.exists());
    let project_exists = config::project_config_file().is_some_and(|p| p.exists());
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source(global_exists, "~/.trimsave/config.toml");
    print_source(project_exists, ".trimsave.toml");
    println!(
        "  {} {}",
        "·".dimmed(),
        "TRIMSAVE_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(exists: bool, name: &str) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.trimsave/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a number with comma separators for readability.
fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
