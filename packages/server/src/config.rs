use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub status_template: String,
    pub user_agent: String,

    pub analyzer_url: String,
    pub blocked_entity_types: Option<Vec<String>>,

    pub draft_dir: String,
    pub screenshot_dir: String,
    pub audit_log_path: String,

    pub bluesky_service: String,
    pub bluesky_identifier: String,
    pub bluesky_password: String,
    pub mastodon_base_url: String,
    pub mastodon_access_token: String,

    /// DM recipients alerted when an edit is blocked.
    pub alert_handles: Vec<String>,
    /// DM recipient for admin login codes.
    pub admin_handle: String,

    pub screenshot_service_url: String,
    pub geoip_table_path: Option<String>,

    pub dispatch_max_concurrency: usize,
    pub repeat_suppression: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            status_template: env::var("STATUS_TEMPLATE")
                .unwrap_or_else(|_| "{{page}} edited by {{name}} {{&url}}".to_string()),
            user_agent: env::var("USER_AGENT").unwrap_or_else(|_| {
                "editherald/0.1 (+https://github.com/editherald/editherald)".to_string()
            }),
            analyzer_url: env::var("ANALYZER_URL")
                .context("ANALYZER_URL must be set")?,
            blocked_entity_types: env::var("BLOCKED_ENTITY_TYPES")
                .ok()
                .map(|raw| split_list(&raw)),
            draft_dir: env::var("DRAFT_DIR").unwrap_or_else(|_| "data/drafts".to_string()),
            screenshot_dir: env::var("SCREENSHOT_DIR")
                .unwrap_or_else(|_| "data/screenshots".to_string()),
            audit_log_path: env::var("AUDIT_LOG_PATH")
                .unwrap_or_else(|_| "data/blocked.jsonl".to_string()),
            bluesky_service: env::var("BLUESKY_SERVICE")
                .unwrap_or_else(|_| "https://bsky.social".to_string()),
            bluesky_identifier: env::var("BLUESKY_IDENTIFIER")
                .context("BLUESKY_IDENTIFIER must be set")?,
            bluesky_password: env::var("BLUESKY_PASSWORD")
                .context("BLUESKY_PASSWORD must be set")?,
            mastodon_base_url: env::var("MASTODON_BASE_URL")
                .context("MASTODON_BASE_URL must be set")?,
            mastodon_access_token: env::var("MASTODON_ACCESS_TOKEN")
                .context("MASTODON_ACCESS_TOKEN must be set")?,
            alert_handles: env::var("ALERT_HANDLES")
                .ok()
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            admin_handle: env::var("ADMIN_HANDLE").context("ADMIN_HANDLE must be set")?,
            screenshot_service_url: env::var("SCREENSHOT_SERVICE_URL")
                .context("SCREENSHOT_SERVICE_URL must be set")?,
            geoip_table_path: env::var("GEOIP_TABLE_PATH").ok(),
            dispatch_max_concurrency: env::var("DISPATCH_MAX_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .context("DISPATCH_MAX_CONCURRENCY must be a valid number")?,
            repeat_suppression: env::var("REPEAT_SUPPRESSION")
                .map(|v| v != "0" && v.to_lowercase() != "false")
                .unwrap_or(true),
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        assert_eq!(
            split_list("PERSON, PHONE_NUMBER,,EMAIL_ADDRESS "),
            vec!["PERSON", "PHONE_NUMBER", "EMAIL_ADDRESS"]
        );
        assert!(split_list("").is_empty());
    }
}
