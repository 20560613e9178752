use anyhow::{Context, Result};
use directories::UserDirs;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
#[cfg(unix)]
use tokio::fs::File;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

// ── Top-level config ──────────────────────────────────────────────

/// Top-level policygen configuration, loaded from `config.toml`.
///
/// Resolution order: `POLICYGEN_CONFIG_DIR` env → `~/.policygen/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Model endpoint settings (`[model]`).
    #[serde(default)]
    pub model: ModelConfig,

    /// Gateway server configuration: host and port (`[gateway]`).
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Memory storage configuration (`[memory]`).
    #[serde(default)]
    pub memory: MemoryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            model: ModelConfig::default(),
            gateway: GatewayConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

// ── Model ─────────────────────────────────────────────────────────

/// Model endpoint configuration (`[model]` section).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModelConfig {
    /// Model identifier sent with each completion request. The name also
    /// selects the request parameter family (gpt, claude, qwen, deepseek).
    #[serde(default = "default_model_name")]
    pub name: String,
    /// Base URL of the OpenAI-compatible endpoint. `/chat/completions` is
    /// appended unless the URL already ends with it.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key for the endpoint. Overridden by `POLICYGEN_API_KEY` or `API_KEY`.
    pub api_key: Option<String>,
    /// Override for the family's max_tokens default.
    pub max_tokens: Option<u32>,
}

fn default_model_name() -> String {
    "qwen-turbo".into()
}

fn default_api_url() -> String {
    "https://dashscope.aliyuncs.com/compatible-mode/v1".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            api_url: default_api_url(),
            api_key: None,
            max_tokens: None,
        }
    }
}

// ── Gateway ───────────────────────────────────────────────────────

/// Gateway server configuration (`[gateway]` section).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GatewayConfig {
    /// Gateway host (default: 127.0.0.1)
    #[serde(default = "default_gateway_host")]
    pub host: String,
    /// Gateway port (default: 8000)
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

fn default_gateway_host() -> String {
    "127.0.0.1".into()
}

fn default_gateway_port() -> u16 {
    8000
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { host: default_gateway_host(), port: default_gateway_port() }
    }
}

// ── Memory ────────────────────────────────────────────────────────

/// Memory storage configuration (`[memory]` section).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MemoryConfig {
    /// Directory holding one JSON file per memory collection. `~` expands to
    /// the home directory.
    #[serde(default = "default_memory_dir")]
    pub dir: String,
}

fn default_memory_dir() -> String {
    "~/.policygen/memory".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { dir: default_memory_dir() }
    }
}

impl MemoryConfig {
    /// Expanded filesystem path of the memory directory.
    pub fn resolved_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.dir).into_owned())
    }
}

// ── Loading and persistence ───────────────────────────────────────

fn default_config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("POLICYGEN_CONFIG_DIR") {
        let dir = dir.trim();
        if !dir.is_empty() {
            return Ok(PathBuf::from(shellexpand::tilde(dir).into_owned()));
        }
    }
    let home = UserDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .context("Could not find home directory")?;
    Ok(home.join(".policygen"))
}

impl Config {
    pub async fn load_or_init() -> Result<Self> {
        let config_dir = default_config_dir()?;
        let config_path = config_dir.join("config.toml");

        fs::create_dir_all(&config_dir)
            .await
            .with_context(|| format!("Failed to create config directory: {}", config_dir.display()))?;

        if config_path.exists() {
            // Warn if config file is world-readable (may contain API keys)
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(meta) = fs::metadata(&config_path).await {
                    if meta.permissions().mode() & 0o004 != 0 {
                        tracing::warn!(
                            "Config file {:?} is world-readable (mode {:o}). \
                             Consider restricting with: chmod 600 {:?}",
                            config_path,
                            meta.permissions().mode() & 0o777,
                            config_path,
                        );
                    }
                }
            }

            let contents = fs::read_to_string(&config_path)
                .await
                .context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            // Set the computed path that is skipped during serialization
            config.config_path = config_path;
            config.apply_env_overrides();
            config.validate()?;
            tracing::info!(
                path = %config.config_path.display(),
                initialized = false,
                "Config loaded"
            );
            Ok(config)
        } else {
            let mut config = Config::default();
            config.config_path = config_path.clone();
            config.save().await?;

            // Restrict permissions on newly created config file (may contain API keys)
            #[cfg(unix)]
            {
                use std::{fs::Permissions, os::unix::fs::PermissionsExt};
                let _ = fs::set_permissions(&config_path, Permissions::from_mode(0o600)).await;
            }

            config.apply_env_overrides();
            config.validate()?;
            tracing::info!(
                path = %config.config_path.display(),
                initialized = true,
                "Config loaded"
            );
            Ok(config)
        }
    }

    /// Validate configuration values that would cause runtime failures.
    ///
    /// Called after TOML deserialization and env-override application to
    /// catch obviously invalid values early.
    pub fn validate(&self) -> Result<()> {
        if self.gateway.host.trim().is_empty() {
            anyhow::bail!("gateway.host must not be empty");
        }
        if self.model.name.trim().is_empty() {
            anyhow::bail!("model.name must not be empty");
        }
        if self.model.api_url.trim().is_empty() {
            anyhow::bail!("model.api_url must not be empty");
        }
        if let Some(max_tokens) = self.model.max_tokens {
            if max_tokens == 0 {
                anyhow::bail!("model.max_tokens must be greater than 0");
            }
        }
        if self.memory.dir.trim().is_empty() {
            anyhow::bail!("memory.dir must not be empty");
        }
        Ok(())
    }

    /// Apply environment variable overrides to config
    pub fn apply_env_overrides(&mut self) {
        // API key: POLICYGEN_API_KEY or API_KEY (generic)
        if let Ok(key) = std::env::var("POLICYGEN_API_KEY").or_else(|_| std::env::var("API_KEY")) {
            if !key.is_empty() {
                self.model.api_key = Some(key);
            }
        }

        // Model: POLICYGEN_MODEL or MODEL
        if let Ok(model) = std::env::var("POLICYGEN_MODEL").or_else(|_| std::env::var("MODEL")) {
            if !model.is_empty() {
                self.model.name = model;
            }
        }

        // Endpoint: POLICYGEN_API_URL
        if let Ok(url) = std::env::var("POLICYGEN_API_URL") {
            if !url.is_empty() {
                self.model.api_url = url;
            }
        }

        // Gateway port: POLICYGEN_GATEWAY_PORT or PORT
        if let Ok(port_str) =
            std::env::var("POLICYGEN_GATEWAY_PORT").or_else(|_| std::env::var("PORT"))
        {
            if let Ok(port) = port_str.parse::<u16>() {
                self.gateway.port = port;
            }
        }

        // Gateway host: POLICYGEN_GATEWAY_HOST or HOST
        if let Ok(host) =
            std::env::var("POLICYGEN_GATEWAY_HOST").or_else(|_| std::env::var("HOST"))
        {
            if !host.is_empty() {
                self.gateway.host = host;
            }
        }

        // Memory directory: POLICYGEN_MEMORY_DIR
        if let Ok(dir) = std::env::var("POLICYGEN_MEMORY_DIR") {
            if !dir.is_empty() {
                self.memory.dir = dir;
            }
        }
    }

    /// Persist the config atomically: write a temp file, fsync it, back up
    /// the existing file, rename, fsync the directory.
    pub async fn save(&self) -> Result<()> {
        let toml_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        let parent_dir = self
            .config_path
            .parent()
            .context("Config path must have a parent directory")?;

        fs::create_dir_all(parent_dir).await.with_context(|| {
            format!("Failed to create config directory: {}", parent_dir.display())
        })?;

        let file_name = self
            .config_path
            .file_name()
            .and_then(|v| v.to_str())
            .unwrap_or("config.toml");
        let temp_path = parent_dir.join(format!(".{file_name}.tmp-{}", uuid::Uuid::new_v4()));
        let backup_path = parent_dir.join(format!("{file_name}.bak"));

        let mut temp_file = OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(&temp_path)
            .await
            .with_context(|| {
                format!("Failed to create temporary config file: {}", temp_path.display())
            })?;
        temp_file
            .write_all(toml_str.as_bytes())
            .await
            .context("Failed to write temporary config contents")?;
        temp_file
            .sync_all()
            .await
            .context("Failed to fsync temporary config file")?;
        drop(temp_file);

        let had_existing_config = self.config_path.exists();
        if had_existing_config {
            fs::copy(&self.config_path, &backup_path).await.with_context(|| {
                format!(
                    "Failed to create config backup before atomic replace: {}",
                    backup_path.display()
                )
            })?;
        }

        if let Err(e) = fs::rename(&temp_path, &self.config_path).await {
            let _ = fs::remove_file(&temp_path).await;
            if had_existing_config && backup_path.exists() {
                fs::copy(&backup_path, &self.config_path)
                    .await
                    .context("Failed to restore config backup")?;
            }
            anyhow::bail!("Failed to atomically replace config file: {e}");
        }

        sync_directory(parent_dir).await?;

        if had_existing_config {
            let _ = fs::remove_file(&backup_path).await;
        }

        Ok(())
    }
}

async fn sync_directory(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let dir = File::open(path)
            .await
            .with_context(|| format!("Failed to open directory for fsync: {}", path.display()))?;
        dir.sync_all()
            .await
            .with_context(|| format!("Failed to fsync directory metadata: {}", path.display()))?;
        Ok(())
    }

    #[cfg(not(unix))]
    {
        let _ = path;
        Ok(())
    }
}
