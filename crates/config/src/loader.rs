use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::WeftConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["weft.toml", "weft.yaml", "weft.yml", "weft.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<WeftConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./weft.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/weft/weft.{toml,yaml,yml,json}` (user-global)
///
/// Returns `WeftConfig::default()` if no config file is found. Environment
/// overrides are applied on top either way.
pub fn discover_and_load() -> WeftConfig {
    let config = if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                WeftConfig::default()
            },
        }
    } else {
        debug!("no config file found, using defaults");
        WeftConfig::default()
    };
    apply_env_overrides(config)
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/weft/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "weft").map(|d| d.config_dir().to_path_buf())
}

/// Overlay `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL` and `WEFT_DISCOVERY_LIMIT`
/// from the process environment.
pub fn apply_env_overrides(config: WeftConfig) -> WeftConfig {
    apply_env_overrides_with(config, |name| std::env::var(name).ok())
}

fn apply_env_overrides_with(
    mut config: WeftConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> WeftConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = non_empty("ANTHROPIC_API_KEY") {
        config.anthropic.api_key = Some(Secret::new(key));
    }
    if let Some(url) = non_empty("ANTHROPIC_BASE_URL") {
        config.anthropic.base_url = Some(url);
    }
    if let Some(raw) = non_empty("WEFT_DISCOVERY_LIMIT") {
        match raw.trim().parse::<u32>() {
            Ok(limit) => config.discovery.limit = limit,
            Err(e) => warn!(value = %raw, error = %e, "ignoring invalid WEFT_DISCOVERY_LIMIT"),
        }
    }
    config
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<WeftConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn loads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.toml");
        std::fs::write(
            &path,
            "[anthropic]\nbase_url = \"https://proxy.example\"\nmax_tokens = 1024\n",
        )
        .unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(
            cfg.anthropic.base_url.as_deref(),
            Some("https://proxy.example")
        );
        assert_eq!(cfg.anthropic.max_tokens, 1024);
    }

    #[test]
    fn loads_yaml_and_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("weft.yaml");
        std::fs::write(&yaml, "discovery:\n  limit: 7\n").unwrap();
        assert_eq!(load_config(&yaml).unwrap().discovery.limit, 7);

        let json = dir.path().join("weft.json");
        std::fs::write(&json, r#"{"anthropic": {"stream": true}}"#).unwrap();
        assert!(load_config(&json).unwrap().anthropic.stream);
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.ini");
        std::fs::write(&path, "x=1").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported config format"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/weft.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/weft.toml"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let mut cfg = WeftConfig::default();
        cfg.anthropic.base_url = Some("https://from-file".into());
        let cfg = apply_env_overrides_with(cfg, |name| match name {
            "ANTHROPIC_API_KEY" => Some("sk-ant-env".into()),
            "ANTHROPIC_BASE_URL" => Some("https://from-env".into()),
            "WEFT_DISCOVERY_LIMIT" => Some("3".into()),
            _ => None,
        });
        assert_eq!(
            cfg.anthropic
                .api_key
                .as_ref()
                .map(|k| k.expose_secret().as_str()),
            Some("sk-ant-env")
        );
        assert_eq!(cfg.anthropic.base_url.as_deref(), Some("https://from-env"));
        assert_eq!(cfg.discovery.limit, 3);
    }

    #[test]
    fn blank_or_invalid_env_values_are_ignored() {
        let cfg = apply_env_overrides_with(WeftConfig::default(), |name| match name {
            "ANTHROPIC_API_KEY" => Some("  ".into()),
            "WEFT_DISCOVERY_LIMIT" => Some("many".into()),
            _ => None,
        });
        assert!(cfg.anthropic.api_key.is_none());
        assert_eq!(cfg.discovery.limit, 20);
    }
}
