use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub manager_url: String,
    pub manager_username: String,
    pub manager_password: String,
    pub request_timeout_secs: u64,
    pub rollback_on_failure: bool,
    /// Where the push report is written as JSON, if anywhere
    pub report_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            manager_url: get_env("MANAGER_URL", "https://127.0.0.1:8443"),
            manager_username: get_env("MANAGER_USERNAME", ""),
            manager_password: get_env("MANAGER_PASSWORD", ""),
            request_timeout_secs: get_env("REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .unwrap_or(30),
            rollback_on_failure: parse_bool(&get_env("ROLLBACK_ON_FAILURE", "false")),
            report_path: Some(get_env("REPORT_PATH", "")).filter(|p| !p.is_empty()),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.manager_username.is_empty() && !self.manager_password.is_empty()
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
