use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{LevelFilter, Log, Metadata, Record};

use mite_validate::{
    sanitized_entry, DefaultEngine, Entry, EntryVerdict, ForbiddenPolicy, ValidationManager,
    ValidatorConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "mite-validate",
    about = "Checks the reaction SMARTS of MITE entries against their worked examples.",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Entry files, or directories searched for `.json` entries.
    #[arg(value_name = "PATH", required = true)]
    inputs: Vec<PathBuf>,
    /// Validator settings as JSON. Flags below override it.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Check forbidden products only on outcomes that reproduce the
    /// expected products.
    #[arg(long)]
    lenient: bool,
    /// Accept unmapped patterns, explicit `[H]` and CXSMARTS suffixes.
    #[arg(long)]
    no_undesired_check: bool,
    /// Do not expand `[a,b:n]` alternatives into separate patterns.
    #[arg(long)]
    no_expand: bool,
    /// Write sanitized copies of the entries into this directory.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// Write the verdicts as JSON to this file.
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
    /// Repeat for more detail (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let _ = writeln!(
                std::io::stderr(),
                "[{:<5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn load_config(cli: &Cli) -> Result<ValidatorConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            ValidatorConfig::from_json(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ValidatorConfig::default(),
    };
    if cli.lenient {
        config.forbidden_policy = ForbiddenPolicy::Lenient;
    }
    if cli.no_undesired_check {
        config.check_undesired_patterns = false;
    }
    if cli.no_expand {
        config.expand_alternatives = false;
    }
    Ok(config)
}

/// Expands directories into their `.json` files, sorted by name.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("failed to list {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            found.sort();
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("input not found: {}", input.display());
        }
    }
    Ok(files)
}

fn load_entry(path: &Path) -> Result<Entry> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Entry::from_json(&text).with_context(|| format!("{} is not a MITE entry", path.display()))
}

fn print_verdict(path: &Path, verdict: &EntryVerdict) {
    let (pass, fail) = verdict.example_counts();
    let label = verdict.accession.as_deref().unwrap_or("-");
    let status = if verdict.passed() { "PASS" } else { "FAIL" };
    println!("{status} {label} ({}): {pass} passed, {fail} failed", path.display());
    if let Some(e) = &verdict.error {
        println!("  {e}");
    }
    for (i, reaction) in verdict.reactions.iter().enumerate() {
        if let Some(e) = &reaction.error {
            println!("  reaction {i}: {e}");
        }
        for example in reaction.failures() {
            println!(
                "  reaction {i}, example {} ({}):",
                example.index, example.substrate
            );
            if let Some(text) = example.verdict.diagnostic() {
                for line in text.lines() {
                    println!("    {line}");
                }
            }
        }
    }
}

/// Writes the sanitized entry into `dir` under the source file name.
/// Entries that failed validation are not written; returns whether a
/// file was produced.
fn write_sanitized(
    dir: &Path,
    source: &Path,
    entry: &Entry,
    verdict: &EntryVerdict,
) -> Result<bool> {
    if !verdict.passed() {
        log::warn!("{}: failed validation, no sanitized copy written", source.display());
        return Ok(false);
    }
    let name = source
        .file_name()
        .with_context(|| format!("{} has no file name", source.display()))?;
    let target = dir.join(name);
    let text = serde_json::to_string_pretty(&sanitized_entry(entry))?;
    fs::write(&target, text + "\n")
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(true)
}

fn run(cli: &Cli) -> Result<bool> {
    let config = load_config(cli)?;
    log::debug!("validator settings: {config:?}");
    let files = collect_inputs(&cli.inputs)?;
    if files.is_empty() {
        bail!("no .json entries found");
    }
    if let Some(dir) = &cli.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
    }

    let engine = DefaultEngine;
    let manager = ValidationManager::new(&engine, config);
    let mut verdicts = Vec::with_capacity(files.len());
    let mut all_passed = true;
    for path in &files {
        let entry = match load_entry(path) {
            Ok(entry) => entry,
            Err(e) => {
                log::error!("{e:#}");
                all_passed = false;
                continue;
            }
        };
        let verdict = manager.validate_entry(&entry);
        print_verdict(path, &verdict);
        all_passed &= verdict.passed();
        if let Some(dir) = &cli.output {
            write_sanitized(dir, path, &entry, &verdict)?;
        }
        verdicts.push(verdict);
    }

    if let Some(report) = &cli.report {
        let text = serde_json::to_string_pretty(&verdicts)?;
        fs::write(report, text + "\n")
            .with_context(|| format!("failed to write {}", report.display()))?;
    }
    let failed = verdicts.iter().filter(|v| !v.passed()).count();
    log::info!("{} entries checked, {failed} failed", verdicts.len());
    Ok(all_passed)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(products: &str) -> Entry {
        Entry::from_json(&format!(
            r#"{{
                "accession": "MITE0000099",
                "reactions": [{{
                    "reactionSMARTS": "[C:1][OH:2]>>[C:1]=[O:2]",
                    "reactions": [{{"substrate": "CCO |c:1|", "products": ["{products}"]}}]
                }}]
            }}"#
        ))
        .unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mite-validate-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn passing_entry_is_written_sanitized() {
        let dir = scratch_dir("pass");
        let entry = entry("CC=O");
        let verdict = ValidationManager::new(&DefaultEngine, ValidatorConfig::default())
            .validate_entry(&entry);
        assert!(write_sanitized(&dir, Path::new("in/MITE0000099.json"), &entry, &verdict).unwrap());

        let written = fs::read_to_string(dir.join("MITE0000099.json")).unwrap();
        let back = Entry::from_json(&written).unwrap();
        assert_eq!(back.reactions[0].examples[0].substrate, "CCO");
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn failing_entry_is_not_written() {
        let dir = scratch_dir("fail");
        let entry = entry("CCO");
        let verdict = ValidationManager::new(&DefaultEngine, ValidatorConfig::default())
            .validate_entry(&entry);
        assert!(!verdict.passed());
        assert!(!write_sanitized(&dir, Path::new("in/MITE0000099.json"), &entry, &verdict).unwrap());
        assert!(!dir.join("MITE0000099.json").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
