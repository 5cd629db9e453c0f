//! Configuration loading with layered precedence.
//!
//! Layers, lowest to highest: application defaults, configuration file,
//! `TUTORSEQ_*` environment variables, command-line arguments. Layers are
//! composed with `MergeComposer` directly so the clap `Cli` keeps ownership
//! of subcommand parsing and `--config` is honoured before discovery.
//!
//! Typed environment variables fail fast: `TUTORSEQ_TIMER_TICK_INTERVAL_MS=soon`
//! is an error, not a silent fallback to the default. Tutorial lists are
//! comma-separated snake-case names, e.g.
//! `TUTORSEQ_OVERLAY_TAP_TO_DISMISS=buy_hint,upgrade_powerup`.

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use mockable::{DefaultEnv, Env};
use ortho_config::discovery::ConfigDiscovery;
use ortho_config::serde_json::{self, Map, Value};
use ortho_config::{MergeComposer, toml};
use tracing::debug;

use crate::config::{AppConfig, Cli};
use crate::error::{ConfigError, Result};
use crate::tutorial::TutorialType;

/// The type of value expected from an environment variable.
#[derive(Clone, Copy)]
enum EnvVarType {
    /// Always accepted.
    String,
    /// `true` or `false`.
    Bool,
    /// Unsigned 64-bit integer.
    U64,
    /// Comma-separated tutorial names.
    TutorialList,
}

/// One environment variable and where its value lands in the config tree.
struct EnvVarSpec {
    env_var: &'static str,
    path: &'static [&'static str],
    var_type: EnvVarType,
}

const ENV_VAR_SPECS: &[EnvVarSpec] = &[
    EnvVarSpec {
        env_var: "TUTORSEQ_PROGRESS_PATH",
        path: &["progress_path"],
        var_type: EnvVarType::String,
    },
    EnvVarSpec {
        env_var: "TUTORSEQ_TIMER_TICK_INTERVAL_MS",
        path: &["timer", "tick_interval_ms"],
        var_type: EnvVarType::U64,
    },
    EnvVarSpec {
        env_var: "TUTORSEQ_SESSION_RESET_CURSOR_ON_START",
        path: &["session", "reset_cursor_on_start"],
        var_type: EnvVarType::Bool,
    },
    EnvVarSpec {
        env_var: "TUTORSEQ_OVERLAY_PARTIAL_BLOCK",
        path: &["overlay", "partial_block"],
        var_type: EnvVarType::TutorialList,
    },
    EnvVarSpec {
        env_var: "TUTORSEQ_OVERLAY_TAP_TO_DISMISS",
        path: &["overlay", "tap_to_dismiss"],
        var_type: EnvVarType::TutorialList,
    },
    EnvVarSpec {
        env_var: "TUTORSEQ_OVERLAY_REVEAL_ALL_ON_BEGIN",
        path: &["overlay", "reveal_all_on_begin"],
        var_type: EnvVarType::TutorialList,
    },
];

/// Returns the environment variable names recognised by the config loader.
///
/// Tests use this to clear every `TUTORSEQ_*` variable without keeping a
/// second list in sync.
#[must_use]
pub fn env_var_names() -> Vec<&'static str> {
    ENV_VAR_SPECS.iter().map(|spec| spec.env_var).collect()
}

fn load_config_file(path: &Utf8PathBuf, composer: &mut MergeComposer) -> Result<()> {
    let current_dir = Utf8PathBuf::from(".");
    let parent = path
        .parent()
        .filter(|p| !p.as_str().is_empty())
        .unwrap_or_else(|| current_dir.as_ref());
    let file_name = path.file_name().unwrap_or(path.as_str());

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|e| {
        ConfigError::ParseError {
            message: format!("failed to open directory {parent}: {e}"),
        }
    })?;
    let content = dir
        .read_to_string(file_name)
        .map_err(|e| ConfigError::ParseError {
            message: format!("failed to read {path}: {e}"),
        })?;
    let value = toml::from_str::<Value>(&content).map_err(|e| ConfigError::ParseError {
        message: format!("failed to parse {path}: {e}"),
    })?;

    debug!(%path, "loaded configuration file");
    composer.push_file(value, Some(path.clone()));
    Ok(())
}

fn discover_config_file(cli: &Cli) -> Option<Utf8PathBuf> {
    cli.config.clone().filter(|p| p.exists()).or_else(|| {
        ConfigDiscovery::builder("tutorseq")
            .env_var("TUTORSEQ_CONFIG_PATH")
            .config_file_name("config.toml")
            .dotfile_name(".tutorseq.toml")
            .build()
            .candidates()
            .into_iter()
            .filter(|p| p.exists())
            .find_map(|p| Utf8PathBuf::try_from(p).ok())
    })
}

/// Loads configuration from every layer and validates the result.
///
/// # Errors
///
/// Returns `ConfigError` when a configuration file is malformed, a typed
/// `TUTORSEQ_*` variable cannot be parsed, the merge fails, or a merged value
/// is unusable (see [`AppConfig::validate`]).
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    load_config_with_env(cli, &DefaultEnv::new())
}

/// [`load_config`] with an explicit environment source.
///
/// # Errors
///
/// As for [`load_config`].
pub fn load_config_with_env<E: Env>(cli: &Cli, env: &E) -> Result<AppConfig> {
    let mut composer = MergeComposer::new();

    let defaults =
        serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::ParseError {
            message: format!("failed to serialise defaults: {e}"),
        })?;
    composer.push_defaults(defaults);

    if let Some(ref path) = discover_config_file(cli) {
        load_config_file(path, &mut composer)?;
    }

    let env_values = collect_env_vars(env)?;
    if !env_values.is_null() {
        composer.push_environment(env_values);
    }

    let cli_overrides = build_cli_overrides(cli);
    if !cli_overrides.is_null() {
        composer.push_cli(cli_overrides);
    }

    let config =
        AppConfig::merge_from_layers(composer.layers()).map_err(ConfigError::OrthoConfig)?;
    config.validate()?;
    Ok(config)
}

fn invalid(spec: &EnvVarSpec, reason: String) -> crate::error::TutorialError {
    ConfigError::InvalidValue {
        field: spec.env_var.to_owned(),
        reason,
    }
    .into()
}

fn parse_tutorial_list(spec: &EnvVarSpec, raw: &str) -> Result<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            let value = Value::String(name.to_owned());
            serde_json::from_value::<TutorialType>(value.clone())
                .map(|_| value)
                .map_err(|_| invalid(spec, format!("unknown tutorial '{name}'")))
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn collect_env_vars<E: Env>(env: &E) -> Result<Value> {
    let mut root = Map::new();

    for spec in ENV_VAR_SPECS {
        let Some(raw) = env.string(spec.env_var) else {
            continue;
        };

        let json_value = match spec.var_type {
            EnvVarType::String => Value::String(raw),
            EnvVarType::Bool => raw.parse::<bool>().map(Value::Bool).map_err(|_| {
                invalid(spec, format!("expected bool (true/false), got '{raw}'"))
            })?,
            EnvVarType::U64 => raw
                .parse::<u64>()
                .map(|n| Value::Number(n.into()))
                .map_err(|_| invalid(spec, format!("expected unsigned integer, got '{raw}'")))?,
            EnvVarType::TutorialList => parse_tutorial_list(spec, &raw)?,
        };

        insert_at_path(&mut root, spec.path, json_value);
    }

    if root.is_empty() {
        Ok(Value::Null)
    } else {
        Ok(Value::Object(root))
    }
}

fn insert_at_path(root: &mut Map<String, Value>, path: &[&str], value: Value) {
    let Some((&field, parents)) = path.split_last() else {
        return;
    };

    let mut current = root;
    for &segment in parents {
        let entry = current
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        let Some(obj) = entry.as_object_mut() else {
            return;
        };
        current = obj;
    }
    current.insert(field.to_owned(), value);
}

fn build_cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();
    if let Some(ref path) = cli.progress_path {
        overrides.insert("progress_path".to_owned(), Value::String(path.clone()));
    }
    if overrides.is_empty() {
        Value::Null
    } else {
        Value::Object(overrides)
    }
}
