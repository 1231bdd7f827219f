mod config_commands;
mod model_commands;

use std::path::{Path, PathBuf};

use {
    clap::{Parser, Subcommand},
    tracing::{debug, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
    weft_config::WeftConfig,
};

#[derive(Parser)]
#[command(name = "weft", about = "Weft: Anthropic model component tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of the standard locations.
    #[arg(long, global = true, env = "WEFT_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the models the configured API key can use.
    Models {
        /// Only list models that can call tools.
        #[arg(long)]
        tools: bool,
    },
    /// Print the component form as JSON.
    Form,
    /// Apply one field edit to the form and print the resulting updates.
    Refresh {
        /// Name of the edited field (e.g. api_key, base_url).
        #[arg(long)]
        field: String,
        /// New field value as JSON. Bare text is taken as a string.
        #[arg(long, default_value = "null")]
        value: String,
    },
    /// Build a client from the configuration and report the outcome.
    Check,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Config from `--config` when given, otherwise from the standard locations.
/// Environment overrides apply in both cases.
fn load_settings(config: Option<&Path>) -> anyhow::Result<WeftConfig> {
    match config {
        Some(path) => {
            debug!(path = %path.display(), "loading config from --config");
            Ok(weft_config::apply_env_overrides(weft_config::load_config(
                path,
            )?))
        },
        None => Ok(weft_config::discover_and_load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "weft starting");

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Models { tools } => {
            model_commands::list_models(&load_settings(config_path)?, tools).await
        },
        Commands::Form => model_commands::print_form(&load_settings(config_path)?),
        Commands::Refresh { field, value } => {
            model_commands::refresh(&load_settings(config_path)?, &field, &value).await
        },
        Commands::Check => model_commands::check(&load_settings(config_path)?),
        Commands::Config { action } => config_commands::handle_config(action, config_path),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn parses_refresh_command() {
        let cli = Cli::try_parse_from([
            "weft",
            "--log-level",
            "debug",
            "refresh",
            "--field",
            "api_key",
            "--value",
            "\"\"",
        ])
        .unwrap();
        assert_eq!(cli.log_level, "debug");
        match cli.command {
            Commands::Refresh { field, value } => {
                assert_eq!(field, "api_key");
                assert_eq!(value, "\"\"");
            },
            _ => panic!("expected refresh"),
        }
    }

    #[test]
    fn parses_models_with_tools_flag() {
        let cli = Cli::try_parse_from(["weft", "models", "--tools", "--json-logs"]).unwrap();
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Commands::Models { tools: true }));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["weft"]).is_err());
    }

    #[test]
    fn explicit_config_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.toml");
        std::fs::write(
            &path,
            "[anthropic]\napi_key = \"sk-ant-file\"\nmodel = \"claude-3-opus-latest\"\n",
        )
        .unwrap();
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.anthropic.model.as_deref(), Some("claude-3-opus-latest"));
        // ANTHROPIC_API_KEY from the environment may override the file.
        assert!(settings.anthropic.api_key.is_some_and(|k| !k.expose_secret().is_empty()));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
