//! Turns one assistant message into what the admin is shown.
use admin_assistant_changeset::ValidatedChangeSet;
use admin_assistant_changeset::extract_change_set;
use admin_assistant_changeset::looks_like_change_set_attempt;
use admin_assistant_changeset::redact;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Proposal {
    /// Nothing to review and nothing worth a banner.
    None,
    /// The message tried to propose changes but they cannot be offered.
    Rejected { banner: String },
    Ready(ValidatedChangeSet),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewedTurn {
    /// The assistant's text with known secrets removed. Always shown.
    pub display_text: String,
    pub proposal: Proposal,
}

/// Extract and validate the change set in `text`. Extraction runs on the raw
/// text so that values the admin asked for reach the API intact; everything
/// meant for display is redacted.
pub fn review_turn<S: AsRef<str>>(text: &str, secrets: &[S]) -> ReviewedTurn {
    let proposal = match extract_change_set(text) {
        Ok(change_set) => match ValidatedChangeSet::new(change_set) {
            Ok(validated) => Proposal::Ready(validated),
            Err(e) => {
                debug!("change set rejected by policy: {e}");
                Proposal::Rejected {
                    banner: redact(
                        &format!("The proposed change set was rejected: {e}"),
                        secrets,
                    ),
                }
            }
        },
        Err(e) if looks_like_change_set_attempt(text) => {
            debug!("change set could not be extracted: {e}");
            Proposal::Rejected {
                banner: redact(
                    &format!("The proposed change set could not be read: {e}"),
                    secrets,
                ),
            }
        }
        Err(_) => Proposal::None,
    };
    ReviewedTurn {
        display_text: redact(text, secrets),
        proposal,
    }
}
