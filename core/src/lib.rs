//! Root of the `admin-assistant-core` library: everything in the change-set
//! flow that talks to the admin API.

// Prevent accidental direct writes to stdout/stderr in library code. All
// user-visible output goes back to the caller or through tracing.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod apply;
mod assistant;
pub mod backend;
pub mod checks;
mod client;
pub mod config;
pub mod error;
pub mod flags;
pub mod turn;

pub use apply::ApplyReport;
pub use apply::RequestOutcome;
pub use apply::apply_change_set;
pub use apply::seed_slug_map;
pub use assistant::AdminAssistant;
pub use assistant::ApplySummary;
pub use backend::AdminBackend;
pub use backend::BackendError;
pub use backend::BackendResponse;
pub use backend::HttpMethod;
pub use checks::run_post_apply_checks;
pub use client::ReqwestBackend;
pub use turn::Proposal;
pub use turn::ReviewedTurn;
pub use turn::review_turn;

pub use admin_assistant_changeset as changeset;
