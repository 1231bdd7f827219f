//! Configuration validation.
//!
//! Checks value ranges the component form would otherwise clamp silently and
//! flags unknown keys in raw TOML.

use std::path::{Path, PathBuf};

use crate::schema::WeftConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "syntax", "unknown-field", "range", "url"
    pub category: &'static str,
    /// Dotted path, e.g. "anthropic.temperature"
    pub path: String,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        category: &'static str,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result of validating a configuration file.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
    pub config_path: Option<PathBuf>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

const KNOWN_SECTIONS: &[(&str, &[&str])] = &[
    ("anthropic", &[
        "api_key",
        "base_url",
        "model",
        "max_tokens",
        "temperature",
        "stream",
        "tool_model_enabled",
    ]),
    ("discovery", &["enabled", "limit", "timeout_secs"]),
];

/// Validate value ranges of an already-parsed config.
#[must_use]
pub fn validate_config(config: &WeftConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let anthropic = &config.anthropic;

    if !(0.0..=1.0).contains(&anthropic.temperature) {
        diagnostics.push(Diagnostic::new(
            Severity::Error,
            "range",
            "anthropic.temperature",
            format!(
                "temperature {} is outside the closed interval [0.0, 1.0]",
                anthropic.temperature
            ),
        ));
    }

    if let Some(base_url) = anthropic.base_url.as_deref().map(str::trim)
        && !base_url.is_empty()
    {
        match url::Url::parse(base_url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {},
            Ok(parsed) => diagnostics.push(Diagnostic::new(
                Severity::Error,
                "url",
                "anthropic.base_url",
                format!("unsupported scheme '{}'", parsed.scheme()),
            )),
            Err(e) => diagnostics.push(Diagnostic::new(
                Severity::Error,
                "url",
                "anthropic.base_url",
                format!("invalid URL '{base_url}': {e}"),
            )),
        }
    }

    if anthropic.max_tokens == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Info,
            "range",
            "anthropic.max_tokens",
            "max_tokens = 0 leaves output length unlimited",
        ));
    }

    if config.discovery.enabled && config.discovery.limit == 0 {
        diagnostics.push(Diagnostic::new(
            Severity::Warning,
            "range",
            "discovery.limit",
            "limit = 0 disables live discovery results; set enabled = false instead",
        ));
    }

    diagnostics
}

/// Validate raw TOML text: syntax, unknown keys, then value ranges.
#[must_use]
pub fn validate_toml_str(raw: &str) -> ValidationResult {
    let mut diagnostics = Vec::new();

    let table: toml::Table = match toml::from_str(raw) {
        Ok(table) => table,
        Err(e) => {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                "syntax",
                "",
                e.to_string(),
            ));
            return ValidationResult {
                diagnostics,
                config_path: None,
            };
        },
    };

    for (section, value) in &table {
        let Some((_, fields)) = KNOWN_SECTIONS.iter().find(|(name, _)| name == section) else {
            diagnostics.push(Diagnostic::new(
                Severity::Warning,
                "unknown-field",
                section.clone(),
                format!("unknown section '{section}'"),
            ));
            continue;
        };
        let Some(inner) = value.as_table() else {
            continue;
        };
        for key in inner.keys() {
            if !fields.contains(&key.as_str()) {
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    "unknown-field",
                    format!("{section}.{key}"),
                    format!("unknown field '{key}' in [{section}]"),
                ));
            }
        }
    }

    match toml::from_str::<WeftConfig>(raw) {
        Ok(config) => diagnostics.extend(validate_config(&config)),
        Err(e) => diagnostics.push(Diagnostic::new(
            Severity::Error,
            "syntax",
            "",
            e.to_string(),
        )),
    }

    ValidationResult {
        diagnostics,
        config_path: None,
    }
}

/// Validate a config file on disk. Only TOML gets unknown-key detection.
pub fn validate_file(path: &Path) -> anyhow::Result<ValidationResult> {
    let is_toml = path.extension().and_then(|e| e.to_str()) == Some("toml");
    let mut result = if is_toml {
        let raw = std::fs::read_to_string(path)?;
        validate_toml_str(&crate::env_subst::substitute_env(&raw))
    } else {
        let config = crate::loader::load_config(path)?;
        ValidationResult {
            diagnostics: validate_config(&config),
            config_path: None,
        }
    };
    result.config_path = Some(path.to_path_buf());
    Ok(result)
}
