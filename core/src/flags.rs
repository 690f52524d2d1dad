use std::time::Duration;

use env_flags::env_flags;

env_flags! {
    pub ADMIN_ASSISTANT_BASE_URL: &str = "http://localhost:8000";

    /// Bearer token for the admin API, when not supplied by config or flags.
    pub ADMIN_ASSISTANT_TOKEN: Option<&str> = None;

    pub ADMIN_ASSISTANT_TIMEOUT_MS: Duration = Duration::from_millis(30_000), |value| {
        value.parse().map(Duration::from_millis)
    };
    pub ADMIN_ASSISTANT_CONNECT_TIMEOUT_MS: Duration = Duration::from_millis(5_000), |value| {
        value.parse().map(Duration::from_millis)
    };

    /// Comma-separated secret values to scrub from displayed text.
    pub ADMIN_ASSISTANT_SECRETS: Option<&str> = None;
}
