//! scriptlint CLI - scope-aware linter for JavaScript sources.
//!
//! Features:
//! - Single-file and directory scanning (node_modules etc. pruned)
//! - Rayon-powered parallel analysis
//! - Plain and JSON reporting
//! - Auto-fix with optional in-place rewrite
//! - Bounded on-disk lint history per file

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use scriptlint_core::{
    gather_js_files_with_excludes, init_structured_logging, line_col, load_config, render_plain,
    Diagnostic, LintHistory, Linter, RuleConfig, ScriptlintConfig, Severity,
    DEFAULT_HISTORY_LIMIT,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scope-aware linter for JavaScript sources")]
pub struct Cli {
    /// A .js file or a directory to scan recursively
    #[arg(default_value = ".")]
    path: String,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Apply auto-fixes and print the fixed source to stdout
    #[arg(long)]
    fix: bool,

    /// With --fix, rewrite the analyzed files in place
    #[arg(long)]
    write: bool,

    /// Disable the missing-semicolon rule
    #[arg(long)]
    no_missing_semicolon: bool,

    /// Disable the undeclared-variable rule
    #[arg(long)]
    no_undeclared: bool,

    /// Disable the unused-variable rule
    #[arg(long)]
    no_unused: bool,

    /// Directory names to skip while scanning
    #[arg(long, num_args = 1..)]
    exclude: Vec<String>,

    /// Show recorded lint history for a single file and exit
    #[arg(long)]
    show_history: bool,
}

/// Findings for one analyzed file.
struct FileReport {
    path: PathBuf,
    source: String,
    diagnostics: Vec<Diagnostic>,
    fixed_source: Option<String>,
}

/// Merge the on-disk config with CLI disable flags; flags always win.
fn effective_rules(cli: &Cli, config: Option<&ScriptlintConfig>) -> RuleConfig {
    let mut rules = config.map(|c| c.rules.clone()).unwrap_or_default();
    if cli.no_missing_semicolon {
        rules.missing_semicolon = false;
    }
    if cli.no_undeclared {
        rules.undeclared_variables = false;
    }
    if cli.no_unused {
        rules.unused_variables = false;
    }
    rules
}

fn analyze_file(path: &Path, linter: &Linter, apply_fix: bool) -> Result<FileReport> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if apply_fix {
        match linter.fix(&source) {
            Ok(outcome) => Ok(FileReport {
                path: path.to_path_buf(),
                source,
                diagnostics: outcome.diagnostics,
                fixed_source: Some(outcome.fixed_source),
            }),
            // Unparseable input cannot be fixed; fall back to reporting.
            Err(e) => Ok(FileReport {
                path: path.to_path_buf(),
                source,
                diagnostics: vec![Diagnostic::syntax_error(e.to_string())],
                fixed_source: None,
            }),
        }
    } else {
        let result = linter.analyze_lenient(&source);
        Ok(FileReport {
            path: path.to_path_buf(),
            source,
            diagnostics: result.diagnostics,
            fixed_source: None,
        })
    }
}

fn history_path(config: Option<&ScriptlintConfig>, target: &Path) -> PathBuf {
    config
        .and_then(|c| c.history.as_ref())
        .and_then(|h| h.path.clone())
        .unwrap_or_else(|| target.with_extension("lint-history.json"))
}

fn history_limit(config: Option<&ScriptlintConfig>) -> usize {
    config
        .and_then(|c| c.history.as_ref())
        .and_then(|h| h.limit)
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
}

fn history_enabled(config: Option<&ScriptlintConfig>) -> bool {
    config
        .and_then(|c| c.history.as_ref())
        .and_then(|h| h.enabled)
        .unwrap_or(false)
}

fn print_file_reports(reports: &[FileReport], json: bool) {
    if json {
        let entries: Vec<_> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "file": r.path.display().to_string(),
                    "diagnostics": r.diagnostics,
                })
            })
            .collect();
        match serde_json::to_string_pretty(&entries) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("[ERROR] JSON serialization failed: {}", e),
        }
    } else {
        for report in reports {
            if reports.len() > 1 && !report.diagnostics.is_empty() {
                println!("=== {} ===", report.path.display());
            }
            print!("{}", render_plain(&report.source, &report.diagnostics));
        }
    }
}

fn error_count(reports: &[FileReport]) -> usize {
    reports
        .iter()
        .flat_map(|r| r.diagnostics.iter())
        .filter(|d| d.severity == Severity::Error)
        .count()
}

fn main() -> Result<()> {
    // Global panic guard
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] scriptlint internal error: {}", info);
        eprintln!("[PANIC] The process will exit safely with code 2.");
    }));

    // Initialize structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    let target = Path::new(&cli.path);

    if !target.exists() {
        return Err(anyhow!("Path does not exist: {}", cli.path));
    }

    // Config is looked up next to the target (safe - don't fail on config errors)
    let config_root = if target.is_dir() {
        target.to_path_buf()
    } else {
        target.parent().unwrap_or(Path::new(".")).to_path_buf()
    };
    let config = match load_config(&config_root) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("[WARN] config load failed: {}", e);
            None
        }
    };

    // History inspection mode (single file only)
    if cli.show_history {
        if target.is_dir() {
            return Err(anyhow!("--show-history requires a single file, not a directory"));
        }
        let store = LintHistory::load(
            history_path(config.as_ref(), target),
            history_limit(config.as_ref()),
        )?;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(store.entries())?);
        } else if store.entries().is_empty() {
            println!("No history recorded.");
        } else {
            for entry in store.entries() {
                println!(
                    "#{} {} - {} finding(s)",
                    entry.id,
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
                    entry.diagnostics.len()
                );
                for d in &entry.diagnostics {
                    let (line, col) = line_col(&entry.source, d.start);
                    println!("    {}:{}: {}: {}", line, col, d.severity, d.message);
                }
            }
        }
        return Ok(());
    }

    let linter = Linter::new().with_rules(effective_rules(&cli, config.as_ref()));
    let apply_fix = cli.fix || cli.write;

    // Gather targets: a single file, or a recursive directory scan
    let files: Vec<PathBuf> = if target.is_dir() {
        let extra: Vec<&str> = cli.exclude.iter().map(String::as_str).collect();
        gather_js_files_with_excludes(target, &extra)
            .with_context(|| format!("Failed to gather script files from: {}", cli.path))?
    } else {
        vec![target.to_path_buf()]
    };

    if files.is_empty() {
        eprintln!("No script files found under {}", cli.path);
        return Ok(());
    }

    // Parallel analysis; per-file failures surface as reports, IO failures abort
    let mut reports: Vec<FileReport> = files
        .par_iter()
        .map(|path| analyze_file(path, &linter, apply_fix))
        .collect::<Result<Vec<_>>>()?;
    reports.sort_by(|a, b| a.path.cmp(&b.path));

    // Apply fixes
    if apply_fix {
        if cli.write {
            for report in &reports {
                if let Some(ref fixed) = report.fixed_source {
                    if *fixed != report.source {
                        fs::write(&report.path, fixed).with_context(|| {
                            format!("Failed to write fixed source to {}", report.path.display())
                        })?;
                        eprintln!("[scriptlint] fixed {}", report.path.display());
                    }
                }
            }
        } else if let [single] = reports.as_slice() {
            // Without --write, fixing a single file prints the result
            if let Some(ref fixed) = single.fixed_source {
                print!("{}", fixed);
                if !fixed.ends_with('\n') {
                    println!();
                }
            } else {
                // Unfixable input still reports its findings
                print_file_reports(&reports, cli.json);
            }
            std::process::exit(if error_count(&reports) > 0 { 1 } else { 0 });
        } else {
            return Err(anyhow!("--fix over a directory requires --write"));
        }
    }

    // Record history for single-file runs when enabled
    if history_enabled(config.as_ref()) {
        if let [single] = reports.as_slice() {
            let mut store = LintHistory::load(
                history_path(config.as_ref(), &single.path),
                history_limit(config.as_ref()),
            )?;
            store.record(&single.source, &single.diagnostics)?;
        }
    }

    // Report results
    print_file_reports(&reports, cli.json);

    // Exit code (CI-friendly): error-severity findings fail the run
    std::process::exit(if error_count(&reports) > 0 { 1 } else { 0 });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_temp_dir(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir()
            .join("scriptlint_cli_test")
            .join(format!("{}_{}", name, id));
        if temp_dir.exists() {
            fs::remove_dir_all(&temp_dir).ok();
        }
        fs::create_dir_all(&temp_dir).unwrap();
        temp_dir
    }

    fn cli_with_flags(no_semi: bool, no_undeclared: bool, no_unused: bool) -> Cli {
        Cli {
            path: ".".to_string(),
            json: false,
            fix: false,
            write: false,
            no_missing_semicolon: no_semi,
            no_undeclared,
            no_unused,
            exclude: vec![],
            show_history: false,
        }
    }

    #[test]
    fn test_effective_rules_defaults() {
        let rules = effective_rules(&cli_with_flags(false, false, false), None);
        assert!(rules.missing_semicolon);
        assert!(rules.undeclared_variables);
        assert!(rules.unused_variables);
    }

    #[test]
    fn test_effective_rules_flags_win() {
        let config = ScriptlintConfig::default();
        let rules = effective_rules(&cli_with_flags(true, false, true), Some(&config));
        assert!(!rules.missing_semicolon);
        assert!(rules.undeclared_variables);
        assert!(!rules.unused_variables);
    }

    #[test]
    fn test_analyze_file_reports_findings() {
        let dir = create_temp_dir("analyze");
        let file = dir.join("app.js");
        fs::write(&file, "console.log(ghost);").unwrap();

        let report = analyze_file(&file, &Linter::new(), false).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].severity, Severity::Error);
        assert!(report.fixed_source.is_none());
    }

    #[test]
    fn test_analyze_file_syntax_error_is_a_report() {
        let dir = create_temp_dir("broken");
        let file = dir.join("broken.js");
        fs::write(&file, "let = 1;").unwrap();

        let report = analyze_file(&file, &Linter::new(), true).unwrap();
        assert!(report.fixed_source.is_none());
        assert!(report.diagnostics[0].message.starts_with("Syntax error:"));
    }

    #[test]
    fn test_analyze_file_fix_mode() {
        let dir = create_temp_dir("fixable");
        let file = dir.join("fixable.js");
        fs::write(&file, "console.log(1)").unwrap();

        let report = analyze_file(&file, &Linter::new(), true).unwrap();
        assert_eq!(report.fixed_source.as_deref(), Some("console.log(1);"));
    }

    #[test]
    fn test_history_path_defaults_next_to_file() {
        let path = history_path(None, Path::new("src/app.js"));
        assert_eq!(path, PathBuf::from("src/app.lint-history.json"));
    }

    #[test]
    fn test_directory_scan_end_to_end() {
        let dir = create_temp_dir("scan");
        fs::write(dir.join("a.js"), "let x = 1;\nconsole.log(x);").unwrap();
        fs::create_dir_all(dir.join("node_modules")).unwrap();
        fs::write(dir.join("node_modules/skipped.js"), "ghost()").unwrap();

        let files = gather_js_files_with_excludes(&dir, &[]).unwrap();
        assert_eq!(files.len(), 1);

        let report = analyze_file(&files[0], &Linter::new(), false).unwrap();
        assert!(report.diagnostics.is_empty());
    }
}
