use crate::{ConfigError, LogLevel, ShastConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names an explicit config file, replacing the search paths.
pub const CONFIG_ENV: &str = "SHAST_CONFIG";

pub struct ConfigLoader {
    explicit_file: Option<PathBuf>,
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        let mut search_paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            search_paths.push(home.join(".config/shast/shast.yaml"));
        }
        search_paths.push(PathBuf::from("./shast.yaml"));

        #[cfg(unix)]
        search_paths.insert(0, PathBuf::from("/etc/shast/shast.yaml"));

        Self {
            explicit_file: None,
            search_paths,
        }
    }

    pub fn with_file(mut self, path: &str) -> Self {
        self.explicit_file = Some(expand_path(path));
        self
    }

    /// Replace the default search paths.
    pub fn with_search_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.search_paths = paths;
        self
    }

    pub fn load(&self) -> Result<ShastConfig, ConfigError> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Load with `env` standing in for the process environment.
    pub fn load_with_env<F>(&self, env: F) -> Result<ShastConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = ShastConfig::default();

        if let Some(env_path) = env(CONFIG_ENV) {
            config = self.parse_file(&expand_path(&env_path), &env)?;
        } else if let Some(ref explicit) = self.explicit_file {
            config = self.parse_file(explicit, &env)?;
        } else {
            for path in &self.search_paths {
                if path.exists() {
                    if let Ok(content) = std::fs::read_to_string(path) {
                        debug!(path = %path.display(), "merging config file");
                        let overlay = self.parse_content(path, &content, &env)?;
                        config = self.merge_configs(&config, &overlay);
                    }
                }
            }
        }

        self.apply_env_overrides(&mut config, &env);
        config.validate()?;
        Ok(config)
    }

    fn parse_file<F>(&self, path: &Path, env: &F) -> Result<ShastConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        debug!(path = %path.display(), "loading config file");
        self.parse_content(path, &content, env)
    }

    fn parse_content<F>(
        &self,
        path: &Path,
        content: &str,
        env: &F,
    ) -> Result<ShastConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = self.expand_env_vars(content, env)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Ok(serde_json::from_str(&expanded)?)
        } else {
            Ok(serde_yaml::from_str(&expanded)?)
        }
    }

    fn merge_configs(&self, base: &ShastConfig, overlay: &ShastConfig) -> ShastConfig {
        let mut result = base.clone();
        let defaults = ShastConfig::default();

        if overlay.parser.max_nesting_depth != defaults.parser.max_nesting_depth {
            result.parser.max_nesting_depth = overlay.parser.max_nesting_depth;
        }
        if overlay.parser.max_input_bytes != defaults.parser.max_input_bytes {
            result.parser.max_input_bytes = overlay.parser.max_input_bytes;
        }
        if overlay.logging.level != defaults.logging.level {
            result.logging.level = overlay.logging.level;
        }
        if !overlay.logging.filter.is_empty() {
            result.logging.filter = overlay.logging.filter.clone();
        }

        result
    }

    fn expand_env_vars<F>(&self, content: &str, env: &F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))?;
        Ok(re
            .replace_all(content, |caps: &regex::Captures| {
                env(&caps[1]).unwrap_or_default()
            })
            .to_string())
    }

    fn apply_env_overrides<F>(&self, config: &mut ShastConfig, env: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(depth) = env("SHAST_MAX_NESTING_DEPTH") {
            if let Ok(d) = depth.parse() {
                config.parser.max_nesting_depth = d;
            }
        }
        if let Some(bytes) = env("SHAST_MAX_INPUT_BYTES") {
            if let Ok(b) = bytes.parse() {
                config.parser.max_input_bytes = b;
            }
        }
        if let Some(level) = env("SHAST_LOG_LEVEL") {
            if let Ok(l) = serde_yaml::from_str::<LogLevel>(&level) {
                config.logging.level = l;
            }
        }
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
