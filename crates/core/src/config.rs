use crate::loyalty::{Tier, TierThreshold};
use serde::Deserialize;

/// Root application configuration. Loaded from environment variables
/// with the prefix `STUDIO_LOYALTY__` and per-field defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub loyalty: LoyaltyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Loyalty program configuration. The tier threshold table lives here
/// and nowhere else; both the resolver and the reporting read path are
/// handed this one copy, so a threshold change takes effect for every
/// client on the next read without rewriting history.
#[derive(Debug, Clone, Deserialize)]
pub struct LoyaltyConfig {
    #[serde(default = "default_tier_thresholds")]
    pub tier_thresholds: Vec<TierThreshold>,
}

impl LoyaltyConfig {
    /// Threshold table sorted ascending by floor, ready for the resolver.
    pub fn thresholds(&self) -> Vec<TierThreshold> {
        let mut table = self.tier_thresholds.clone();
        table.sort_by_key(|t| t.min_points);
        table
    }
}

// Default functions
fn default_node_id() -> String {
    "loyalty-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_metrics_port() -> u16 {
    9100
}
fn default_tier_thresholds() -> Vec<TierThreshold> {
    vec![
        TierThreshold {
            tier: Tier::Bronze,
            min_points: 0,
        },
        TierThreshold {
            tier: Tier::Silver,
            min_points: 300,
        },
        TierThreshold {
            tier: Tier::Gold,
            min_points: 700,
        },
        TierThreshold {
            tier: Tier::Platinum,
            min_points: 1500,
        },
    ]
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            tier_thresholds: default_tier_thresholds(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            loyalty: LoyaltyConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("STUDIO_LOYALTY")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
