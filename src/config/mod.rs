//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SHIELD_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::classifier::ClassifierConfig;
use crate::constants::DEFAULT_LOOKUP_CACHE_CAPACITY;
use crate::embedding::SentenceConfig;

/// Default reference dataset location.
pub const DEFAULT_CORPUS_PATH: &str = "./data/generated_dataset_multilingual.json";

/// Default reference embeddings snapshot location.
pub const DEFAULT_EMBEDDINGS_CACHE_PATH: &str = "./models/reference_embeddings.rkyv";

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SHIELD_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Sequence classifier directory (`config.json` + `model.safetensors`).
    pub classifier_path: Option<PathBuf>,

    /// Classifier vocabulary file. Default: `vocab.json` in the classifier directory.
    pub vocab_path: Option<PathBuf>,

    /// Sentence embedder directory (BERT weights + `tokenizer.json`).
    pub embedder_path: Option<PathBuf>,

    /// Reference dataset (JSON array of `{text, label}`).
    pub corpus_path: PathBuf,

    /// Reference embeddings snapshot, rebuilt when stale.
    pub embeddings_cache_path: PathBuf,

    /// Max entries in the similarity lookup cache; `0` disables it. Default: `10_000`.
    pub lookup_cache_capacity: u64,

    /// Per-request scoring deadline. Default: 30 s.
    pub request_timeout: Duration,

    /// Longest accepted document, in characters. Default: `50_000`.
    pub max_document_chars: usize,

    /// Use the statistical language detector. Default: `true`.
    pub lang_detect: bool,

    /// Fall back to deterministic stub models when a model path is unset.
    pub allow_stub_models: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            classifier_path: None,
            vocab_path: None,
            embedder_path: None,
            corpus_path: PathBuf::from(DEFAULT_CORPUS_PATH),
            embeddings_cache_path: PathBuf::from(DEFAULT_EMBEDDINGS_CACHE_PATH),
            lookup_cache_capacity: DEFAULT_LOOKUP_CACHE_CAPACITY,
            request_timeout: Duration::from_secs(30),
            max_document_chars: 50_000,
            lang_detect: true,
            allow_stub_models: false,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "SHIELD_PORT";
    const ENV_BIND_ADDR: &'static str = "SHIELD_BIND_ADDR";
    const ENV_CLASSIFIER_PATH: &'static str = "SHIELD_CLASSIFIER_PATH";
    const ENV_VOCAB_PATH: &'static str = "SHIELD_VOCAB_PATH";
    const ENV_EMBEDDER_PATH: &'static str = "SHIELD_EMBEDDER_PATH";
    const ENV_CORPUS_PATH: &'static str = "SHIELD_CORPUS_PATH";
    const ENV_EMBEDDINGS_CACHE_PATH: &'static str = "SHIELD_EMBEDDINGS_CACHE_PATH";
    const ENV_LOOKUP_CACHE_CAPACITY: &'static str = "SHIELD_LOOKUP_CACHE_CAPACITY";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "SHIELD_REQUEST_TIMEOUT_SECS";
    const ENV_MAX_DOCUMENT_CHARS: &'static str = "SHIELD_MAX_DOCUMENT_CHARS";
    const ENV_LANG_DETECT: &'static str = "SHIELD_LANG_DETECT";
    const ENV_ALLOW_STUB_MODELS: &'static str = "SHIELD_ALLOW_STUB_MODELS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let classifier_path = Self::parse_optional_path_from_env(Self::ENV_CLASSIFIER_PATH);
        let vocab_path = Self::parse_optional_path_from_env(Self::ENV_VOCAB_PATH);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let corpus_path = Self::parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path);
        let embeddings_cache_path = Self::parse_path_from_env(
            Self::ENV_EMBEDDINGS_CACHE_PATH,
            defaults.embeddings_cache_path,
        );
        let lookup_cache_capacity = Self::parse_u64_from_env(
            Self::ENV_LOOKUP_CACHE_CAPACITY,
            defaults.lookup_cache_capacity,
        );
        let request_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        ));
        let max_document_chars = Self::parse_u64_from_env(
            Self::ENV_MAX_DOCUMENT_CHARS,
            defaults.max_document_chars as u64,
        ) as usize;
        let lang_detect = Self::parse_bool_from_env(Self::ENV_LANG_DETECT, defaults.lang_detect)?;
        let allow_stub_models =
            Self::parse_bool_from_env(Self::ENV_ALLOW_STUB_MODELS, defaults.allow_stub_models)?;

        Ok(Self {
            port,
            bind_addr,
            classifier_path,
            vocab_path,
            embedder_path,
            corpus_path,
            embeddings_cache_path,
            lookup_cache_capacity,
            request_timeout,
            max_document_chars,
            lang_detect,
            allow_stub_models,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_REQUEST_TIMEOUT_SECS,
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        if self.max_document_chars == 0 {
            return Err(ConfigError::InvalidValue {
                name: Self::ENV_MAX_DOCUMENT_CHARS,
                value: "0".to_string(),
                reason: "must be greater than zero",
            });
        }

        match &self.classifier_path {
            Some(path) => {
                Self::require_dir(path)?;
                if let Some(vocab) = self.vocab_path() {
                    Self::require_file(&vocab)?;
                }
            }
            None if !self.allow_stub_models => {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_CLASSIFIER_PATH,
                });
            }
            None => {}
        }

        match &self.embedder_path {
            Some(path) => Self::require_dir(path)?,
            None if !self.allow_stub_models => {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_EMBEDDER_PATH,
                });
            }
            None => {}
        }

        Self::require_file(&self.corpus_path)?;

        if self.embeddings_cache_path.is_dir() {
            return Err(ConfigError::NotAFile {
                path: self.embeddings_cache_path.clone(),
            });
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    /// Explicit vocabulary path, else `vocab.json` next to the classifier weights.
    pub fn vocab_path(&self) -> Option<PathBuf> {
        self.vocab_path.clone().or_else(|| {
            self.classifier_path
                .as_ref()
                .map(|dir| dir.join("vocab.json"))
        })
    }

    /// Classifier settings; stub mode when no classifier path is configured.
    pub fn classifier_config(&self) -> ClassifierConfig {
        match &self.classifier_path {
            Some(dir) => {
                let config = ClassifierConfig::new(dir);
                match self.vocab_path() {
                    Some(vocab) => config.with_vocab_path(vocab),
                    None => config,
                }
            }
            None => ClassifierConfig::stub(),
        }
    }

    /// Embedder settings; stub mode when no embedder path is configured.
    pub fn sentence_config(&self) -> SentenceConfig {
        match &self.embedder_path {
            Some(dir) => SentenceConfig::new(dir),
            None => SentenceConfig::stub(),
        }
    }

    fn require_dir(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        Self::parse_optional_path_from_env(var_name).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_bool_from_env(var_name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match env::var(var_name) {
            Ok(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                "" => Ok(default),
                _ => Err(ConfigError::InvalidValue {
                    name: var_name,
                    value,
                    reason: "expected true or false",
                }),
            },
            Err(_) => Ok(default),
        }
    }
}
