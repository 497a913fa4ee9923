//! Configuration inspection.

use otechestvo_site::config::SiteConfig;

/// Effective non-secret settings as `(variable, value)` pairs.
///
/// Secrets are reported only as set or unset.
#[must_use]
pub fn describe(config: &SiteConfig) -> Vec<(&'static str, String)> {
    let set_or_unset = |set: bool| if set { "set" } else { "unset" }.to_string();

    vec![
        ("HOST", config.host.to_string()),
        ("PORT", config.port.to_string()),
        ("BASE_URL", config.base_url.clone()),
        ("DATA_DIR", config.data_dir.display().to_string()),
        ("STATIC_DIR", config.static_dir.display().to_string()),
        ("VK_GROUP_ID", config.vk.group_id.to_string()),
        ("VK_API_BASE", config.vk.api_base.clone()),
        ("VK_ACCESS_TOKEN", set_or_unset(config.vk.access_token.is_some())),
        ("SENTRY_DSN", set_or_unset(config.sentry_dsn.is_some())),
        (
            "SENTRY_ENVIRONMENT",
            config
                .sentry_environment
                .clone()
                .unwrap_or_else(|| "-".to_string()),
        ),
    ]
}
