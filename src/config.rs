use crate::error::{PaymentError, Result};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://secure.mollie.nl/xml/ideal";
pub const DEFAULT_MAX_ATTEMPTS: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_PARTNER_ID: &str = "MOLLIE_PARTNER_ID";
pub const ENV_PROFILE_KEY: &str = "MOLLIE_PROFILE_KEY";
pub const ENV_REPORT_URL: &str = "MOLLIE_REPORT_URL";
pub const ENV_RETURN_URL: &str = "MOLLIE_RETURN_URL";
pub const ENV_REVERSE_URLS: &str = "MOLLIE_REVERSE_URLS";
pub const ENV_SITE_URL: &str = "MOLLIE_IMPLEMENTING_SITE_URL";
pub const ENV_ENDPOINT: &str = "MOLLIE_ENDPOINT";
pub const ENV_TIMEOUT_SECS: &str = "MOLLIE_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "MOLLIE_MAX_ATTEMPTS";

/// Everything needed to talk to the gateway on behalf of one merchant.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewaySettings {
    pub partner_id: String,
    pub profile_key: Option<String>,
    /// Report (server-to-server) callback, literal or a route on `site_url`.
    pub report_url: Option<String>,
    /// Where the consumer lands after paying, literal or a route on `site_url`.
    pub return_url: Option<String>,
    /// When set, callback URLs are routes resolved against `site_url`.
    pub reverse_urls: bool,
    pub site_url: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
    pub max_attempts: usize,
}

impl GatewaySettings {
    pub fn new(partner_id: impl Into<String>) -> Self {
        Self {
            partner_id: partner_id.into(),
            profile_key: None,
            report_url: None,
            return_url: None,
            reverse_urls: false,
            site_url: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Loads the settings from `MOLLIE_*` environment variables. A value
    /// returned by `overrides` for a key wins over the environment.
    pub fn from_env_with<F>(overrides: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::from_lookup(|key| overrides(key).or_else(|| std::env::var(key).ok()))
    }

    /// Loads the settings through an arbitrary key lookup.
    ///
    /// Only `MOLLIE_PARTNER_ID` is required; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let partner_id = get(ENV_PARTNER_ID).ok_or_else(|| {
            PaymentError::ConfigError(
                "Missing partner id (--partner-id or MOLLIE_PARTNER_ID)".to_string(),
            )
        })?;

        let mut settings = Self::new(partner_id);
        settings.profile_key = get(ENV_PROFILE_KEY);
        settings.report_url = get(ENV_REPORT_URL);
        settings.return_url = get(ENV_RETURN_URL);
        settings.reverse_urls = get(ENV_REVERSE_URLS)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        settings.site_url = get(ENV_SITE_URL);
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            settings.endpoint = endpoint;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs = secs
                .parse::<u64>()
                .map_err(|_| PaymentError::ConfigError("Invalid MOLLIE_TIMEOUT_SECS".to_string()))?;
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = get(ENV_MAX_ATTEMPTS) {
            settings.max_attempts = attempts
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    PaymentError::ConfigError("Invalid MOLLIE_MAX_ATTEMPTS".to_string())
                })?;
        }

        Ok(settings)
    }

    /// Resolves the `(report_url, return_url)` pair sent with a fetch request.
    pub fn callback_urls(&self) -> Result<(String, String)> {
        let report = self
            .report_url
            .as_deref()
            .ok_or_else(|| PaymentError::ConfigError("Missing report URL".to_string()))?;
        let ret = self
            .return_url
            .as_deref()
            .ok_or_else(|| PaymentError::ConfigError("Missing return URL".to_string()))?;

        if !self.reverse_urls {
            return Ok((report.to_string(), ret.to_string()));
        }

        let site = self.site_url.as_deref().ok_or_else(|| {
            PaymentError::ConfigError(
                "Reversed callback URLs need the implementing site URL".to_string(),
            )
        })?;
        Ok((join_route(site, report), join_route(site, ret)))
    }
}

fn join_route(site: &str, route: &str) -> String {
    format!(
        "{}/{}",
        site.trim_end_matches('/'),
        route.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_partner_id_required() {
        let result = GatewaySettings::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(PaymentError::ConfigError(_))));
    }

    #[test]
    fn test_defaults() {
        let settings = GatewaySettings::from_lookup(lookup(&[
            ("MOLLIE_PARTNER_ID", "123456"),
            ("MOLLIE_PROFILE_KEY", ""),
        ]))
        .unwrap();
        assert_eq!(settings.partner_id, "123456");
        assert_eq!(settings.profile_key, None);
        assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(settings.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert!(!settings.reverse_urls);
    }

    #[test]
    fn test_invalid_numbers_rejected() {
        let result = GatewaySettings::from_lookup(lookup(&[
            ("MOLLIE_PARTNER_ID", "1"),
            ("MOLLIE_MAX_ATTEMPTS", "0"),
        ]));
        assert!(matches!(result, Err(PaymentError::ConfigError(_))));

        let result = GatewaySettings::from_lookup(lookup(&[
            ("MOLLIE_PARTNER_ID", "1"),
            ("MOLLIE_TIMEOUT_SECS", "soon"),
        ]));
        assert!(matches!(result, Err(PaymentError::ConfigError(_))));
    }

    #[test]
    fn test_overrides_win_over_environment() {
        let settings = GatewaySettings::from_env_with(|key| match key {
            ENV_PARTNER_ID => Some("override-partner".to_string()),
            ENV_MAX_ATTEMPTS => Some("3".to_string()),
            ENV_REVERSE_URLS => Some("true".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.partner_id, "override-partner");
        assert_eq!(settings.max_attempts, 3);
        assert!(settings.reverse_urls);
    }

    #[test]
    fn test_literal_callback_urls() {
        let settings = GatewaySettings::from_lookup(lookup(&[
            ("MOLLIE_PARTNER_ID", "1"),
            ("MOLLIE_REPORT_URL", "https://shop.example/ideal/report"),
            ("MOLLIE_RETURN_URL", "https://shop.example/ideal/return"),
        ]))
        .unwrap();
        assert_eq!(
            settings.callback_urls().unwrap(),
            (
                "https://shop.example/ideal/report".to_string(),
                "https://shop.example/ideal/return".to_string()
            )
        );
    }

    #[test]
    fn test_reversed_callback_urls() {
        let settings = GatewaySettings::from_lookup(lookup(&[
            ("MOLLIE_PARTNER_ID", "1"),
            ("MOLLIE_REPORT_URL", "/ideal/report/"),
            ("MOLLIE_RETURN_URL", "ideal/return/"),
            ("MOLLIE_REVERSE_URLS", "True"),
            ("MOLLIE_IMPLEMENTING_SITE_URL", "https://shop.example/"),
        ]))
        .unwrap();
        assert_eq!(
            settings.callback_urls().unwrap(),
            (
                "https://shop.example/ideal/report/".to_string(),
                "https://shop.example/ideal/return/".to_string()
            )
        );
    }

    #[test]
    fn test_reversed_callback_urls_need_site() {
        let mut settings = GatewaySettings::new("1");
        settings.report_url = Some("/report/".to_string());
        settings.return_url = Some("/return/".to_string());
        settings.reverse_urls = true;
        assert!(matches!(
            settings.callback_urls(),
            Err(PaymentError::ConfigError(_))
        ));
    }
}
