//! Locates the single change set embedded in an assistant message.
//!
//! Every fenced code block is a candidate. Candidates that are not JSON, or
//! are JSON but not a change set, are dropped. Exactly one survivor is
//! required: two well-formed proposals in one message are treated as
//! ambiguous and rejected rather than resolved by position.
use std::sync::LazyLock;

use regex_lite::Regex;
use serde_json::Value;
use thiserror::Error;

use crate::model::ChangeSet;
use crate::model::SchemaError;
use crate::static_regex;

/// Non-greedy across lines, with an optional `json` info string.
static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| static_regex(r"(?s)```(?:json)?[ \t]*\r?\n?(.*?)```"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidJson(String),
    Schema(SchemaError),
}

/// Why a fenced block did not count as a change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRejection {
    /// Zero-based index of the fenced block within the message.
    pub block_index: usize,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no valid change set found")]
    NoneFound { rejected: Vec<CandidateRejection> },
    #[error("multiple change sets found ({count}); ask for exactly one")]
    Multiple { count: usize },
}

pub fn extract_change_set(text: &str) -> Result<ChangeSet, ExtractionError> {
    let mut candidates = Vec::new();
    let mut rejected = Vec::new();

    for (block_index, caps) in FENCED_BLOCK.captures_iter(text).enumerate() {
        let raw = caps.get(1).map_or("", |m| m.as_str());
        let value = match serde_json::from_str::<Value>(raw) {
            Ok(value) => value,
            Err(e) => {
                rejected.push(CandidateRejection {
                    block_index,
                    reason: RejectionReason::InvalidJson(e.to_string()),
                });
                continue;
            }
        };
        match ChangeSet::from_value(&value) {
            Ok(change_set) => candidates.push(change_set),
            Err(e) => rejected.push(CandidateRejection {
                block_index,
                reason: RejectionReason::Schema(e),
            }),
        }
    }

    match candidates.len() {
        0 => Err(ExtractionError::NoneFound { rejected }),
        1 => Ok(candidates.remove(0)),
        count => Err(ExtractionError::Multiple { count }),
    }
}

/// Loose check used only to decide whether a failed extraction deserves an
/// error banner. Never overrides [`extract_change_set`].
pub fn looks_like_change_set_attempt(text: &str) -> bool {
    text.contains("```json") && text.contains("\"requests\"")
}
