use std::path::Path;

use {
    anyhow::Result,
    clap::Subcommand,
    weft_config::{Diagnostic, Severity, ValidationResult, validate_config, validate_file},
};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings.
    Check {
        /// Show informational diagnostics in addition to errors and warnings.
        #[arg(long)]
        verbose: bool,
    },
    /// Print the path of the config file that would be loaded.
    Path,
}

pub fn handle_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Check { verbose } => check(explicit, verbose),
        ConfigAction::Path => {
            match explicit
                .map(Path::to_path_buf)
                .or_else(weft_config::find_config_file)
            {
                Some(path) => println!("{}", path.display()),
                None => eprintln!("No config file found."),
            }
            Ok(())
        },
    }
}

/// ANSI color codes.
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn check(explicit: Option<&Path>, verbose: bool) -> Result<()> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(weft_config::find_config_file);
    let result = match &path {
        Some(path) => validate_file(path)?,
        None => ValidationResult {
            diagnostics: validate_config(&weft_config::apply_env_overrides(Default::default())),
            config_path: None,
        },
    };

    if let Some(ref path) = result.config_path {
        eprintln!("Checking {}\n", path.display());
    } else {
        eprintln!("No config file found; checking defaults.\n");
    }

    let shown = result
        .diagnostics
        .iter()
        .filter(|d| verbose || d.severity != Severity::Info)
        .inspect(|d| eprintln!("  {}", render(d)))
        .count();

    let errors = result.count(Severity::Error);
    let warnings = result.count(Severity::Warning);

    if shown > 0 {
        eprintln!();
    }

    if errors == 0 && warnings == 0 {
        eprintln!("No issues found.");
    } else {
        eprintln!("{errors} error(s), {warnings} warning(s)");
    }

    if errors > 0 {
        anyhow::bail!("configuration has {errors} error(s)");
    }
    Ok(())
}

fn render(d: &Diagnostic) -> String {
    let (color, label) = match d.severity {
        Severity::Error => (RED, "error"),
        Severity::Warning => (YELLOW, "warning"),
        Severity::Info => (CYAN, "info"),
    };
    if d.path.is_empty() {
        format!("{BOLD}{color}{label}{RESET} {}", d.message)
    } else {
        format!("{BOLD}{color}{label}{RESET} {}: {}", d.path, d.message)
    }
}
