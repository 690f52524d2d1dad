//! `@type:<slug>` placeholders for user types created earlier in the same
//! change set.
//!
//! The assistant cannot know the numeric id of a user type it is about to
//! create, so it writes `@type:<slug>` wherever a `user_type_id` goes. Before
//! each request is sent the placeholders are rewritten from a [`SlugMap`]
//! that was seeded from the existing user types and that learns new entries
//! as creation requests succeed.
use std::collections::HashMap;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::model::Method;
use crate::model::Request;
use crate::static_regex;

pub const PLACEHOLDER_PREFIX: &str = "@type:";

/// Endpoint whose successful `POST` response teaches the map a new slug.
pub const USER_TYPE_COLLECTION_PATH: &str = "/admin/user-types";

static PATH_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"user-type/@type:([^/?#]+)"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown user type placeholder @type:{slug}")]
    UnknownPlaceholder { slug: String },
}

/// Lowercase, collapse every run of non-alphanumerics to `_`, trim `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;
    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }
    slug
}

/// A request after placeholder rewriting, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Slug → user type id, private to one apply run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugMap {
    ids: HashMap<String, i64>,
}

impl SlugMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<i64> {
        self.ids.get(slug).copied()
    }

    /// Record `name` under its slug. Names that slugify to nothing are
    /// ignored. Returns the slug when one was recorded.
    pub fn insert_name(&mut self, name: &str, id: i64) -> Option<String> {
        let slug = slugify(name);
        if slug.is_empty() {
            return None;
        }
        self.ids.insert(slug.clone(), id);
        Some(slug)
    }

    /// Populate from a user type listing. Accepts a bare array of
    /// `{id, name}` objects or an object wrapping one under `user_types` or
    /// `items`. Malformed entries are skipped. Returns how many were added.
    pub fn seed_from_listing(&mut self, listing: &Value) -> usize {
        let entries = match listing {
            Value::Array(entries) => entries,
            Value::Object(obj) => match obj
                .get("user_types")
                .or_else(|| obj.get("items"))
                .and_then(Value::as_array)
            {
                Some(entries) => entries,
                None => return 0,
            },
            _ => return 0,
        };
        entries
            .iter()
            .filter_map(id_and_name)
            .filter_map(|(id, name)| self.insert_name(name, id))
            .count()
    }

    /// Learn from the response to a successful user type creation. Accepts
    /// `{id, name}` or `{user_type: {id, name}}`.
    pub fn learn_from_creation(&mut self, response: &Value) -> Option<String> {
        let entity = response.get("user_type").unwrap_or(response);
        let (id, name) = id_and_name(entity)?;
        self.insert_name(name, id)
    }

    fn lookup(&self, raw_slug: &str) -> Result<i64, ResolveError> {
        let slug = slugify(raw_slug);
        self.get(&slug)
            .ok_or(ResolveError::UnknownPlaceholder { slug })
    }

    /// Rewrite every `user-type/@type:<slug>` segment in `path`.
    pub fn resolve_path(&self, path: &str) -> Result<String, ResolveError> {
        let mut out = String::with_capacity(path.len());
        let mut last = 0;
        for caps in PATH_PLACEHOLDER.captures_iter(path) {
            let (Some(whole), Some(slug)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let id = self.lookup(slug.as_str())?;
            out.push_str(&path[last..whole.start()]);
            out.push_str(&format!("user-type/{id}"));
            last = whole.end();
        }
        out.push_str(&path[last..]);
        Ok(out)
    }

    /// Rewrite a top-level `user_type_id` placeholder in a JSON object body.
    pub fn resolve_body(&self, body: Option<&Value>) -> Result<Option<Value>, ResolveError> {
        let Some(body) = body else {
            return Ok(None);
        };
        let mut body = body.clone();
        if let Some(obj) = body.as_object_mut()
            && let Some(slug) = obj
                .get("user_type_id")
                .and_then(Value::as_str)
                .and_then(|s| s.strip_prefix(PLACEHOLDER_PREFIX))
        {
            let id = self.lookup(slug)?;
            obj.insert("user_type_id".to_string(), Value::from(id));
        }
        Ok(Some(body))
    }

    pub fn resolve_request(&self, request: &Request) -> Result<ResolvedRequest, ResolveError> {
        Ok(ResolvedRequest {
            method: request.method,
            path: self.resolve_path(&request.path)?,
            body: self.resolve_body(request.body.as_ref())?,
        })
    }
}

/// True for the request whose response introduces a new user type.
pub fn is_user_type_creation(method: Method, path: &str) -> bool {
    method == Method::Post && path.trim_end_matches('/') == USER_TYPE_COLLECTION_PATH
}

fn id_and_name(entity: &Value) -> Option<(i64, &str)> {
    let id = match entity.get("id")? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    let name = entity.get("name")?.as_str()?;
    Some((id, name))
}
