//! Allow-list policy for assistant-authored admin requests.
//!
//! A request passes only if its method is one of the three mutation verbs,
//! its path is a plain absolute path, it does not touch a deny-listed
//! endpoint, and the `(method, path)` pair matches an entry of
//! [`ALLOW_LIST`]. Validation never rewrites a request: any violation rejects
//! the whole change set.
use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use thiserror::Error;

use crate::model::CHANGE_SET_VERSION;
use crate::model::ChangeSet;
use crate::model::MAX_REQUESTS;
use crate::model::Method;
use crate::static_regex;

/// Substrings that are rejected anywhere in a path, regardless of method.
const DENIED_SUBSTRINGS: &[&str] = &["/reveal", "/export", "/prompts/preview"];

/// Prefixes that are rejected regardless of method.
const DENIED_PREFIXES: &[&str] = &["/admin/tools/execute"];

// Building blocks for the table below. `{ID}` may be a `@type:` placeholder
// because the resolver rewrites it before the request is sent.
macro_rules! num {
    () => {
        "[0-9]+"
    };
}
macro_rules! user_type_id {
    () => {
        "(?:[0-9]+|@type:[a-z0-9_]+)"
    };
}
macro_rules! config_key {
    () => {
        "[A-Z][A-Z0-9_]*"
    };
}
macro_rules! ai_key {
    () => {
        "[A-Za-z0-9_.-]+"
    };
}

/// Every endpoint an assistant may target, per method. Patterns are anchored
/// when compiled, so they must describe the whole path.
#[rustfmt::skip]
pub const ALLOW_LIST: &[(Method, &[&str])] = &[
    (Method::Put, &[
        "/admin/instance-settings",
        concat!("/admin/deployment/config/", config_key!()),
        concat!("/admin/ai-config/", ai_key!()),
        concat!("/admin/ai-config/user-type/", user_type_id!(), "/", ai_key!()),
        concat!("/admin/user-types/", num!()),
        concat!("/admin/user-fields/", num!()),
        concat!("/admin/user-fields/", num!(), "/encryption"),
        concat!("/ingest/documents/", num!(), "/defaults"),
        "/ingest/documents/defaults/batch",
        concat!("/ingest/documents/", num!(), "/defaults/user-type/", user_type_id!()),
    ]),
    (Method::Post, &[
        "/admin/user-types",
        "/admin/user-fields",
    ]),
    (Method::Delete, &[
        concat!("/admin/deployment/config/", config_key!()),
        concat!("/admin/ai-config/user-type/", user_type_id!(), "/", ai_key!()),
        concat!("/admin/user-types/", num!()),
        concat!("/admin/user-fields/", num!()),
        concat!("/ingest/documents/", num!(), "/defaults/user-type/", user_type_id!()),
    ]),
];

static COMPILED_ALLOW_LIST: LazyLock<Vec<(Method, Vec<Regex>)>> = LazyLock::new(|| {
    ALLOW_LIST
        .iter()
        .map(|(method, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| static_regex(&format!("^(?:{p})$")))
                .collect();
            (*method, compiled)
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestViolation {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(String),
    #[error("path must start with '/'")]
    InvalidPath,
    #[error("path must not contain '..' or dot segments")]
    PathTraversal,
    #[error("endpoint is never reachable from a change set")]
    Denied,
    #[error("endpoint is not on the allow-list")]
    NotAllowListed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported change set version {0}")]
    UnsupportedVersion(u32),
    #[error("change set has no requests")]
    Empty,
    #[error("change set has {count} requests; at most {max} are allowed")]
    TooManyRequests { count: usize, max: usize },
    #[error("request {} ({method} {path}): {violation}", .index + 1)]
    Request {
        index: usize,
        method: String,
        path: String,
        violation: RequestViolation,
    },
}

/// Check a change set against the structural limits and the endpoint policy.
pub fn validate(change_set: &ChangeSet) -> Result<(), ValidationError> {
    if change_set.version != CHANGE_SET_VERSION {
        return Err(ValidationError::UnsupportedVersion(change_set.version));
    }
    if change_set.requests.is_empty() {
        return Err(ValidationError::Empty);
    }
    if change_set.requests.len() > MAX_REQUESTS {
        return Err(ValidationError::TooManyRequests {
            count: change_set.requests.len(),
            max: MAX_REQUESTS,
        });
    }
    for (index, request) in change_set.requests.iter().enumerate() {
        check_request(request.method.as_str(), &request.path).map_err(|violation| {
            ValidationError::Request {
                index,
                method: request.method.to_string(),
                path: request.path.clone(),
                violation,
            }
        })?;
    }
    Ok(())
}

/// Policy check for one `(method, path)` pair, on raw strings so that verbs
/// outside the change-set vocabulary are rejected here too.
pub fn check_request(method: &str, path: &str) -> Result<(), RequestViolation> {
    let method: Method = method
        .parse()
        .map_err(|_| RequestViolation::MethodNotAllowed(method.to_string()))?;
    if !path.starts_with('/') {
        return Err(RequestViolation::InvalidPath);
    }
    if path.contains("..") || path.split('/').any(is_dot_segment) {
        return Err(RequestViolation::PathTraversal);
    }
    if is_denied(path) {
        return Err(RequestViolation::Denied);
    }
    if is_allow_listed(method, path) {
        Ok(())
    } else {
        Err(RequestViolation::NotAllowListed)
    }
}

fn is_denied(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    DENIED_SUBSTRINGS.iter().any(|s| lower.contains(s))
        || DENIED_PREFIXES.iter().any(|p| lower.starts_with(p))
}

fn is_allow_listed(method: Method, path: &str) -> bool {
    COMPILED_ALLOW_LIST
        .iter()
        .filter(|(m, _)| *m == method)
        .flat_map(|(_, patterns)| patterns.iter())
        .any(|re| re.is_match(path))
}

/// A change set that has passed [`validate`]. Only this type can be applied,
/// and applying consumes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedChangeSet(ChangeSet);

impl ValidatedChangeSet {
    pub fn new(change_set: ChangeSet) -> Result<Self, ValidationError> {
        validate(&change_set)?;
        Ok(Self(change_set))
    }

    pub fn change_set(&self) -> &ChangeSet {
        &self.0
    }

    pub fn into_inner(self) -> ChangeSet {
        self.0
    }
}

impl fmt::Display for ValidatedChangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.render_preview())
    }
}

/// Segments a URL parser collapses, percent-encoded forms included.
fn is_dot_segment(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().replace("%2e", ".").as_str(),
        "." | ".."
    )
}
