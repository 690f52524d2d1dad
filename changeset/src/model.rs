//! Data model for an assistant-proposed change set.
//!
//! The JSON shape the assistant is asked to emit is:
//!
//! ```text
//! { "version": 1,
//!   "summary": "optional prose",
//!   "requests": [ { "method": "PUT" | "POST" | "DELETE", "path": "/...", "body": { ... } } ] }
//! ```
//!
//! Coercion from an untrusted `serde_json::Value` is done field by field in
//! [`ChangeSet::from_value`] rather than through a derived `Deserialize`, so
//! that every rejection names the field that was wrong.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// The only change-set schema version understood by this crate.
pub const CHANGE_SET_VERSION: u32 = 1;

/// Hard cap on the number of requests in one change set.
pub const MAX_REQUESTS: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Put,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown method {0:?}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PUT" => Ok(Method::Put),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            other => Err(UnknownMethod(other.to_string())),
        }
    }
}

/// One proposed mutation against the admin API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub method: Method,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeSet {
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub requests: Vec<Request>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("change set must be a JSON object")]
    NotAnObject,
    #[error("unsupported change set version: {0}")]
    UnsupportedVersion(String),
    #[error("`summary` must be a string")]
    InvalidSummary,
    #[error("`requests` must be an array")]
    RequestsNotArray,
    #[error("request {index} must be a JSON object")]
    RequestNotAnObject { index: usize },
    #[error("request {index}: `method` must be one of PUT, POST, DELETE (got {got})")]
    InvalidMethod { index: usize, got: String },
    #[error("request {index}: `path` must be a string")]
    InvalidPath { index: usize },
}

impl ChangeSet {
    /// Coerce an arbitrary JSON value into a change set, checking every field.
    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let obj = value.as_object().ok_or(SchemaError::NotAnObject)?;

        let version = match obj.get("version") {
            // `1.0` is the same number as `1` to the JSON producers we accept.
            Some(Value::Number(n)) if n.as_f64() == Some(f64::from(CHANGE_SET_VERSION)) => {
                CHANGE_SET_VERSION
            }
            Some(other) => return Err(SchemaError::UnsupportedVersion(other.to_string())),
            None => return Err(SchemaError::UnsupportedVersion("missing".to_string())),
        };

        let summary = match obj.get("summary") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(SchemaError::InvalidSummary),
        };

        let raw_requests = obj
            .get("requests")
            .and_then(Value::as_array)
            .ok_or(SchemaError::RequestsNotArray)?;

        let requests = raw_requests
            .iter()
            .enumerate()
            .map(|(index, raw)| request_from_value(index, raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version,
            summary,
            requests,
        })
    }

    /// Text shown to the admin before they confirm an apply.
    pub fn render_preview(&self) -> String {
        let mut out = String::new();
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push_str(summary.trim());
            out.push_str("\n\n");
        }
        for (i, request) in self.requests.iter().enumerate() {
            out.push_str(&format!("{}. {} {}\n", i + 1, request.method, request.path));
            if let Some(body) = &request.body {
                let pretty = serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string());
                for line in pretty.lines() {
                    out.push_str("   ");
                    out.push_str(line);
                    out.push('\n');
                }
            }
        }
        out
    }
}

fn request_from_value(index: usize, raw: &Value) -> Result<Request, SchemaError> {
    let obj = raw
        .as_object()
        .ok_or(SchemaError::RequestNotAnObject { index })?;

    let method = match obj.get("method") {
        Some(Value::String(s)) => s.parse::<Method>().map_err(|_| SchemaError::InvalidMethod {
            index,
            got: s.clone(),
        })?,
        other => {
            return Err(SchemaError::InvalidMethod {
                index,
                got: other.map_or_else(|| "nothing".to_string(), Value::to_string),
            });
        }
    };

    let path = obj
        .get("path")
        .and_then(Value::as_str)
        .ok_or(SchemaError::InvalidPath { index })?
        .to_string();

    let body = match obj.get("body") {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    };

    Ok(Request { method, path, body })
}
