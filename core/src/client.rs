use reqwest::StatusCode;
use reqwest::Url;
use reqwest::header::AUTHORIZATION;
use reqwest::header::COOKIE;
use serde_json::Value;
use tracing::debug;

use crate::backend::AdminBackend;
use crate::backend::BackendError;
use crate::backend::BackendResponse;
use crate::backend::HttpMethod;
use crate::config::Config;
use crate::error::AdminErr;
use crate::error::Result;

/// [`AdminBackend`] over HTTP(S) with `reqwest`.
#[derive(Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
    bearer_token: Option<String>,
    session_cookie: Option<String>,
}

impl ReqwestBackend {
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = normalize_base_url(&config.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            bearer_token: config.bearer_token.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    /// Client without credentials, e.g. for a mock server in tests.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: normalize_base_url(base_url)?,
            bearer_token: None,
            session_cookie: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw).map_err(|e| AdminErr::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AdminErr::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

impl AdminBackend for ReqwestBackend {
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> std::result::Result<BackendResponse, BackendError> {
        let mut req = self.client.request(method.into(), self.url_for(path));
        if let Some(token) = &self.bearer_token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(cookie) = &self.session_cookie {
            req = req.header(COOKIE, cookie);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|e| {
            debug!(%method, path, "request failed before a response: {e}");
            BackendError::Transport(e.without_url().to_string())
        })?;
        let status = resp.status();
        debug!(%method, path, status = status.as_u16(), "admin API responded");
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthenticated);
        }
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.without_url().to_string()))?;
        Ok(BackendResponse::from_text(status.as_u16(), text))
    }
}
