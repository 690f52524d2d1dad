//! Parsing, policy and placeholder handling for assistant-proposed admin
//! change sets. Nothing in this crate performs I/O.
mod extract;
mod model;
mod placeholder;
mod policy;
mod redact;

use regex_lite::Regex;

pub use extract::CandidateRejection;
pub use extract::ExtractionError;
pub use extract::RejectionReason;
pub use extract::extract_change_set;
pub use extract::looks_like_change_set_attempt;
pub use model::CHANGE_SET_VERSION;
pub use model::ChangeSet;
pub use model::MAX_REQUESTS;
pub use model::Method;
pub use model::Request;
pub use model::SchemaError;
pub use model::UnknownMethod;
pub use placeholder::PLACEHOLDER_PREFIX;
pub use placeholder::ResolveError;
pub use placeholder::ResolvedRequest;
pub use placeholder::SlugMap;
pub use placeholder::USER_TYPE_COLLECTION_PATH;
pub use placeholder::is_user_type_creation;
pub use placeholder::slugify;
pub use policy::ALLOW_LIST;
pub use policy::RequestViolation;
pub use policy::ValidatedChangeSet;
pub use policy::ValidationError;
pub use policy::check_request;
pub use policy::validate;
pub use redact::MIN_SECRET_LEN;
pub use redact::REDACTED_TOKEN;
pub use redact::redact;
pub use redact::unredactable_secrets;

/// Compile a pattern that is a literal in this crate.
#[allow(clippy::expect_used)]
fn static_regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}
