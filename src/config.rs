use std::{env, net::SocketAddr, time::Duration};

use thiserror::Error;

pub const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    pub public_base_url: Option<String>,
    pub webhook_url: Option<String>,
    pub webhook_token: Option<String>,
    pub webhook_timeout: Duration,
}

/// Where rendered documents are pushed; only exists when both URL and token are set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookDestination {
    pub url: String,
    pub token: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("BIND_PORT must be a valid u16")]
    InvalidPort,
    #[error("DOC_WEBHOOK_TIMEOUT_SECS must be a positive integer")]
    InvalidWebhookTimeout,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr = non_blank("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let bind_port = non_blank("BIND_PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(8080);
        let webhook_timeout_secs = non_blank("DOC_WEBHOOK_TIMEOUT_SECS")
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or(ConfigError::InvalidWebhookTimeout)
            })
            .transpose()?
            .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS);

        let config = Self {
            bind_addr,
            bind_port,
            public_base_url: non_blank("PUBLIC_BASE_URL"),
            webhook_url: non_blank("DOC_WEBHOOK_URL"),
            webhook_token: non_blank("DOC_WEBHOOK_TOKEN"),
            webhook_timeout: Duration::from_secs(webhook_timeout_secs),
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }

    pub fn webhook_destination(&self) -> Option<WebhookDestination> {
        match (&self.webhook_url, &self.webhook_token) {
            (Some(url), Some(token)) => Some(WebhookDestination {
                url: url.clone(),
                token: token.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn parse_defaults() {
        let config = config_from(&[]).expect("config should parse");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.public_base_url, None);
        assert_eq!(config.webhook_timeout, Duration::from_secs(15));
        assert_eq!(config.webhook_destination(), None);
    }

    #[test]
    fn webhook_destination_requires_url_and_token() {
        let url_only = config_from(&[("DOC_WEBHOOK_URL", "https://sink.example/exec")])
            .expect("config should parse");
        assert_eq!(url_only.webhook_destination(), None);

        let blank_token = config_from(&[
            ("DOC_WEBHOOK_URL", "https://sink.example/exec"),
            ("DOC_WEBHOOK_TOKEN", "   "),
        ])
        .expect("config should parse");
        assert_eq!(blank_token.webhook_destination(), None);

        let both = config_from(&[
            ("DOC_WEBHOOK_URL", " https://sink.example/exec "),
            ("DOC_WEBHOOK_TOKEN", "s3cret"),
        ])
        .expect("config should parse");
        assert_eq!(
            both.webhook_destination(),
            Some(WebhookDestination {
                url: "https://sink.example/exec".to_string(),
                token: "s3cret".to_string(),
            })
        );
    }

    #[test]
    fn invalid_port_fails() {
        let err = config_from(&[("BIND_PORT", "99999")]).expect_err("expected invalid port");
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn webhook_timeout_must_be_positive() {
        let err = config_from(&[("DOC_WEBHOOK_TIMEOUT_SECS", "0")])
            .expect_err("expected invalid timeout");
        assert!(matches!(err, ConfigError::InvalidWebhookTimeout));

        let config =
            config_from(&[("DOC_WEBHOOK_TIMEOUT_SECS", "3")]).expect("config should parse");
        assert_eq!(config.webhook_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_bind_address_fails() {
        let err = config_from(&[("BIND_ADDR", "not an address")])
            .expect_err("expected invalid socket");
        assert!(matches!(err, ConfigError::InvalidSocket));
    }
}
