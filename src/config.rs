use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DiaristConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// Path of the JSON file holding all diary entries.
    pub entries_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: String,
    pub model: String,
    pub cache_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    /// Upper bound on a single generation request. `0` disables the timeout.
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 8731,
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let entries_path = default_diarist_dir()
            .join("diary.json")
            .to_string_lossy()
            .into_owned();
        Self { entries_path }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        let cache_dir = default_diarist_dir()
            .join("models")
            .to_string_lossy()
            .into_owned();
        Self {
            provider: "local".into(),
            model: "paraphrase-multilingual-MiniLM-L12-v2".into(),
            cache_dir,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".into(),
            base_url: "http://localhost:11434".into(),
            model: "llama3.2".into(),
            timeout_secs: 300,
        }
    }
}

/// Returns `~/.diarist/`, or `./.diarist/` when no home directory is known.
pub fn default_diarist_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".diarist")
}

/// Returns the default config file path: `~/.diarist/config.toml`
pub fn default_config_path() -> PathBuf {
    default_diarist_dir().join("config.toml")
}

impl DiaristConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DiaristConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (DIARIST_ENTRIES, DIARIST_LOG_LEVEL, DIARIST_OLLAMA_URL, DIARIST_LLM_MODEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DIARIST_ENTRIES") {
            self.storage.entries_path = val;
        }
        if let Ok(val) = std::env::var("DIARIST_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("DIARIST_OLLAMA_URL") {
            self.generation.base_url = val;
        }
        if let Ok(val) = std::env::var("DIARIST_LLM_MODEL") {
            self.generation.model = val;
        }
    }

    /// Resolve the entry store path, expanding `~` if needed.
    pub fn resolved_entries_path(&self) -> PathBuf {
        expand_tilde(&self.storage.entries_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DiaristConfig::default();
        assert_eq!(config.server.transport, "stdio");
        assert_eq!(config.server.log_level, "info");
        assert_eq!(config.embedding.provider, "local");
        assert_eq!(config.generation.provider, "ollama");
        assert_eq!(config.generation.model, "llama3.2");
        assert!(config.storage.entries_path.ends_with("diary.json"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
entries_path = "/tmp/diary.json"

[generation]
model = "qwen2.5"
timeout_secs = 30
"#;
        let config: DiaristConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.entries_path, "/tmp/diary.json");
        assert_eq!(config.generation.model, "qwen2.5");
        assert_eq!(config.generation.timeout_secs, 30);
        // defaults still apply for unset fields
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.embedding.model, "paraphrase-multilingual-MiniLM-L12-v2");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = DiaristConfig::load_from(tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.server.port, 8731);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DiaristConfig::default();
        std::env::set_var("DIARIST_ENTRIES", "/tmp/override.json");
        std::env::set_var("DIARIST_LOG_LEVEL", "trace");
        std::env::set_var("DIARIST_OLLAMA_URL", "http://ollama:11434");
        std::env::set_var("DIARIST_LLM_MODEL", "mistral");

        config.apply_env_overrides();

        assert_eq!(config.storage.entries_path, "/tmp/override.json");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.generation.base_url, "http://ollama:11434");
        assert_eq!(config.generation.model, "mistral");

        // Clean up
        std::env::remove_var("DIARIST_ENTRIES");
        std::env::remove_var("DIARIST_LOG_LEVEL");
        std::env::remove_var("DIARIST_OLLAMA_URL");
        std::env::remove_var("DIARIST_LLM_MODEL");
    }

    #[test]
    fn expand_tilde_leaves_absolute_paths() {
        assert_eq!(expand_tilde("/var/diary.json"), PathBuf::from("/var/diary.json"));
    }
}
