use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "HANDLEDGER_CONFIG";
pub const DB_ENV: &str = "HANDLEDGER_DB";
pub const LOG_ENV: &str = "HANDLEDGER_LOG";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// SQLite file holding stored hands
    pub database: PathBuf,
    /// `tracing` filter used when `--verbose` is not given
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("handledger.db"),
            log_filter: "warn".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigSources {
    pub database: ValueSource,
    pub log_filter: ValueSource,
}

impl Default for ConfigSources {
    fn default() -> Self {
        Self {
            database: ValueSource::Default,
            log_filter: ValueSource::Default,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConfigResolved {
    pub config: Config,
    pub sources: ConfigSources,
}

impl ConfigResolved {
    /// Applies a `--db` flag, which wins over every other source.
    pub fn with_database_flag(mut self, database: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.config.database = path;
            self.sources.database = ValueSource::Cli;
        }
        self
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "cannot read {}: {}", path, source),
            ConfigError::Parse(e) => write!(f, "malformed config file: {}", e),
            ConfigError::Invalid(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolves the configuration from the process environment.
pub fn load_with_sources() -> Result<ConfigResolved, ConfigError> {
    resolve(|key| std::env::var(key).ok())
}

/// Defaults, then the TOML file named by `HANDLEDGER_CONFIG`, then
/// `HANDLEDGER_DB` / `HANDLEDGER_LOG`. Empty variables are ignored.
pub fn resolve<F>(var: F) -> Result<ConfigResolved, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| var(key).filter(|v| !v.is_empty());
    let mut cfg = Config::default();
    let mut sources = ConfigSources::default();

    if let Some(path) = var(CONFIG_ENV) {
        let s = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;
        let f: FileConfig = toml::from_str(&s)?;
        if let Some(v) = f.database {
            cfg.database = v;
            sources.database = ValueSource::File;
        }
        if let Some(v) = f.log_filter {
            cfg.log_filter = v;
            sources.log_filter = ValueSource::File;
        }
    }

    if let Some(db) = var(DB_ENV) {
        cfg.database = PathBuf::from(db);
        sources.database = ValueSource::Env;
    }
    if let Some(filter) = var(LOG_ENV) {
        cfg.log_filter = filter;
        sources.log_filter = ValueSource::Env;
    }

    validate(&cfg)?;
    Ok(ConfigResolved {
        config: cfg,
        sources,
    })
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    database: Option<PathBuf>,
    #[serde(default)]
    log_filter: Option<String>,
}

fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.database.as_os_str().is_empty() {
        return Err(ConfigError::Invalid(
            "Invalid configuration: database path must not be empty".into(),
        ));
    }
    if tracing_subscriber::EnvFilter::try_new(&cfg.log_filter).is_err() {
        return Err(ConfigError::Invalid(format!(
            "Invalid configuration: bad log filter `{}`",
            cfg.log_filter
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let resolved = resolve(env(&[])).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert_eq!(resolved.sources, ConfigSources::default());
    }

    #[test]
    fn env_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database = \"from-file.db\"\nlog_filter = \"info\"").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let resolved = resolve(env(&[(CONFIG_ENV, &path), (DB_ENV, "from-env.db")])).unwrap();
        assert_eq!(resolved.config.database, PathBuf::from("from-env.db"));
        assert_eq!(resolved.sources.database, ValueSource::Env);
        assert_eq!(resolved.config.log_filter, "info");
        assert_eq!(resolved.sources.log_filter, ValueSource::File);
    }

    #[test]
    fn flag_wins_over_env() {
        let resolved = resolve(env(&[(DB_ENV, "from-env.db")]))
            .unwrap()
            .with_database_flag(Some(PathBuf::from("flag.db")));
        assert_eq!(resolved.config.database, PathBuf::from("flag.db"));
        assert_eq!(resolved.sources.database, ValueSource::Cli);
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let resolved = resolve(env(&[(DB_ENV, "")])).unwrap();
        assert_eq!(resolved.sources.database, ValueSource::Default);
    }

    #[test]
    fn missing_or_malformed_file_is_an_error() {
        let err = resolve(env(&[(CONFIG_ENV, "/definitely/not/here.toml")])).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "seed = 42").unwrap();
        let path = file.path().to_str().unwrap().to_string();
        let err = resolve(env(&[(CONFIG_ENV, &path)])).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bad_log_filter_is_rejected() {
        let err = resolve(env(&[(LOG_ENV, "handledger=loud")])).unwrap_err();
        assert!(err.to_string().contains("bad log filter"));
    }
}
