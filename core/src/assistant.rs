use admin_assistant_changeset::ValidatedChangeSet;
use admin_assistant_changeset::redact;
use serde::Serialize;
use tracing::info;

use crate::apply::RequestOutcome;
use crate::apply::apply_change_set;
use crate::apply::seed_slug_map;
use crate::backend::AdminBackend;
use crate::checks::run_post_apply_checks;
use crate::turn::ReviewedTurn;
use crate::turn::review_turn;

/// What the admin sees after an apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplySummary {
    pub outcomes: Vec<RequestOutcome>,
    /// Status line, failure details and post-apply notes, one per line.
    pub message: String,
    pub unauthenticated: bool,
}

impl ApplySummary {
    pub fn ok_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.ok).count()
    }

    pub fn fail_count(&self) -> usize {
        self.outcomes.len() - self.ok_count()
    }
}

/// Ties review and apply together for one admin conversation.
pub struct AdminAssistant<B> {
    backend: B,
    secrets: Vec<String>,
}

impl<B: AdminBackend> AdminAssistant<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            secrets: Vec::new(),
        }
    }

    pub fn with_secrets(mut self, secrets: Vec<String>) -> Self {
        self.secrets = secrets;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn redact(&self, text: &str) -> String {
        redact(text, &self.secrets)
    }

    pub fn review(&self, assistant_text: &str) -> ReviewedTurn {
        review_turn(assistant_text, &self.secrets)
    }

    /// Seed placeholders, apply every request in order, then run the
    /// post-apply checks. Never fails: every problem ends up in the message.
    ///
    /// Takes `&mut self` so one assistant cannot run two applies at once.
    pub async fn apply(&mut self, change_set: ValidatedChangeSet) -> ApplySummary {
        let mut slug_map = seed_slug_map(&self.backend).await;
        let report = apply_change_set(&self.backend, change_set, &mut slug_map).await;
        let notes = run_post_apply_checks(&self.backend).await;

        let mut lines = vec![report.summary_line()];
        let failures = report.failure_details();
        if !failures.is_empty() {
            lines.push(format!("{} failed:", failures.len()));
            lines.extend(failures.into_iter().map(|f| format!("- {f}")));
        }
        if report.unauthenticated {
            lines.push("Your session has expired; sign in again and retry.".to_string());
        }
        lines.extend(notes);
        let message = self.redact(&lines.join("\n"));
        info!("{}", report.summary_line());

        let outcomes = report
            .outcomes
            .into_iter()
            .map(|mut outcome| {
                outcome.error = outcome.error.map(|e| self.redact(&e));
                outcome
            })
            .collect();

        ApplySummary {
            outcomes,
            message,
            unauthenticated: report.unauthenticated,
        }
    }

    /// The post-apply checks on their own.
    pub async fn health_notes(&self) -> Vec<String> {
        run_post_apply_checks(&self.backend)
            .await
            .into_iter()
            .map(|note| self.redact(&note))
            .collect()
    }
}
