use std::fmt;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use admin_assistant_changeset::REDACTED_TOKEN;
use admin_assistant_changeset::unredactable_secrets;
use dirs::home_dir;
use serde::Deserialize;

use crate::error::AdminErr;
use crate::error::Result;
use crate::flags::ADMIN_ASSISTANT_BASE_URL;
use crate::flags::ADMIN_ASSISTANT_CONNECT_TIMEOUT_MS;
use crate::flags::ADMIN_ASSISTANT_SECRETS;
use crate::flags::ADMIN_ASSISTANT_TIMEOUT_MS;
use crate::flags::ADMIN_ASSISTANT_TOKEN;

/// Shape of `~/.admin-assistant/config.toml`. Every field is optional.
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigToml {
    pub base_url: Option<String>,
    pub bearer_token: Option<String>,
    /// Raw `Cookie` header value for session-based deployments.
    pub session_cookie: Option<String>,
    pub request_timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    /// Known secret values that must never be displayed.
    #[serde(default)]
    pub secrets: Vec<String>,
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Default, Debug, Clone)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub base_url: Option<String>,
    pub bearer_token: Option<String>,
    pub secrets: Vec<String>,
}

/// Resolved configuration: file values, then env-flag defaults, with
/// overrides taking precedence.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub bearer_token: Option<String>,
    pub session_cookie: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub secrets: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "<set>"))
            .field("session_cookie", &self.session_cookie.as_ref().map(|_| "<set>"))
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("secrets", &self.secrets.len())
            .finish()
    }
}

impl Config {
    /// Load `config.toml` (from `overrides.config_path` or the default
    /// location) and merge `overrides` on top.
    pub fn load_with_overrides(overrides: ConfigOverrides) -> Result<Self> {
        let path = match &overrides.config_path {
            Some(path) => path.clone(),
            None => admin_assistant_dir()?.join("config.toml"),
        };
        let cfg = load_config_toml(&path)?;
        Ok(Self::load_from_base_config_with_overrides(cfg, overrides))
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
    ) -> Self {
        // Destructure ConfigOverrides fully to ensure all overrides are applied.
        let ConfigOverrides {
            config_path: _,
            base_url,
            bearer_token,
            secrets,
        } = overrides;

        let mut all_secrets = cfg.secrets;
        if let Some(env_secrets) = *ADMIN_ASSISTANT_SECRETS {
            all_secrets.extend(
                env_secrets
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            );
        }
        all_secrets.extend(secrets);

        let bearer_token = bearer_token
            .or(cfg.bearer_token)
            .or_else(|| (*ADMIN_ASSISTANT_TOKEN).map(str::to_string))
            .filter(|t| !t.trim().is_empty());
        // Credentials are secrets too, whether or not the caller listed them.
        if let Some(token) = &bearer_token {
            all_secrets.push(token.clone());
        }
        let session_cookie = cfg.session_cookie.filter(|c| !c.trim().is_empty());
        if let Some(cookie) = &session_cookie {
            all_secrets.push(cookie.clone());
        }
        for secret in unredactable_secrets(&all_secrets) {
            tracing::warn!(
                "a configured secret of {} chars occurs inside {REDACTED_TOKEN} and cannot be redacted",
                secret.chars().count()
            );
        }

        Self {
            base_url: base_url
                .or(cfg.base_url)
                .unwrap_or_else(|| ADMIN_ASSISTANT_BASE_URL.to_string()),
            bearer_token,
            session_cookie,
            connect_timeout: cfg
                .connect_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(*ADMIN_ASSISTANT_CONNECT_TIMEOUT_MS),
            request_timeout: cfg
                .request_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(*ADMIN_ASSISTANT_TIMEOUT_MS),
            secrets: all_secrets,
        }
    }
}

fn load_config_toml(path: &Path) -> Result<ConfigToml> {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<ConfigToml>(&contents).map_err(|source| {
            tracing::error!("Failed to parse {}: {source}", path.display());
            AdminErr::ConfigParse {
                path: path.display().to_string(),
                source,
            }
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("{} not found, using defaults", path.display());
            Ok(ConfigToml::default())
        }
        Err(e) => {
            tracing::error!("Failed to read {}: {e}", path.display());
            Err(e.into())
        }
    }
}

/// Returns `~/.admin-assistant`. Does not verify that the directory exists.
pub fn admin_assistant_dir() -> std::io::Result<PathBuf> {
    let mut p = home_dir().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not find home directory",
        )
    })?;
    p.push(".admin-assistant");
    Ok(p)
}
