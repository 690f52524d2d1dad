/// Replacement for every redacted occurrence.
pub const REDACTED_TOKEN: &str = "[REDACTED]";

/// Secrets shorter than this (in characters) are left alone.
pub const MIN_SECRET_LEN: usize = 6;

/// Replace every literal occurrence of a known secret with [`REDACTED_TOKEN`].
///
/// Longer secrets are replaced first so a shorter secret that is a substring
/// of a longer one cannot leave fragments of the longer value behind.
pub fn redact<S: AsRef<str>>(text: &str, secrets: &[S]) -> String {
    if text.is_empty() || secrets.is_empty() {
        return text.to_string();
    }

    let mut ordered: Vec<&str> = secrets
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| s.chars().count() >= MIN_SECRET_LEN)
        .filter(|s| !clashes_with_token(s))
        .collect();
    ordered.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    ordered.dedup();

    let mut out = text.to_string();
    for secret in ordered {
        if out.contains(secret) {
            out = out.replace(secret, REDACTED_TOKEN);
        }
    }
    out
}

/// Secrets long enough to redact that [`redact`] still has to skip, because
/// each one occurs inside [`REDACTED_TOKEN`] and replacing it would never
/// converge.
pub fn unredactable_secrets<S: AsRef<str>>(secrets: &[S]) -> Vec<&str> {
    secrets
        .iter()
        .map(AsRef::as_ref)
        .filter(|s| s.chars().count() >= MIN_SECRET_LEN && clashes_with_token(s))
        .collect()
}

fn clashes_with_token(secret: &str) -> bool {
    REDACTED_TOKEN.contains(secret)
}
