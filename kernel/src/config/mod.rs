// Leaderboard Configuration
//
// Static settings a leaderboard is built from: who it belongs to,
// which environment it runs in, and how it paginates.

pub mod naming;

use serde::{Deserialize, Serialize};

use crate::ranking::page::PageSize;
use crate::ranking::RankStrategy;

pub use naming::{Environment, LeaderboardName};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown environment `{0}`")]
    UnknownEnvironment(String),

    #[error("invalid leaderboard name: {0}")]
    InvalidName(String),

    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration loaded from JSON.
///
/// `page_size` is kept raw here; out-of-set values fall back to the
/// default when the leaderboard is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardConfig {
    pub app_id: String,
    pub event_id: String,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default)]
    pub rank_strategy: RankStrategy,
}

fn default_page_size() -> u64 {
    PageSize::default().get()
}

impl LeaderboardConfig {
    /// Built-in configuration (used if no config is provided).
    pub fn default_config() -> Self {
        Self {
            app_id: "local".into(),
            event_id: "default".into(),
            environment: Environment::Development,
            page_size: default_page_size(),
            rank_strategy: RankStrategy::Positional,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn name(&self) -> Result<LeaderboardName, ConfigError> {
        LeaderboardName::new(self.app_id.clone(), self.event_id.clone(), self.environment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_config_uses_defaults() {
        let config =
            LeaderboardConfig::from_json_str(r#"{ "app_id": "arcade", "event_id": "weekly" }"#)
                .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.page_size, 25);
        assert_eq!(config.rank_strategy, RankStrategy::Positional);
        assert_eq!(config.name().unwrap().key(), "arcade-weekly-development");
    }

    #[test]
    fn parse_full_config() {
        let json = r#"
        {
          "app_id": "arcade",
          "event_id": "season-3",
          "environment": "production",
          "page_size": 10,
          "rank_strategy": "revalidate"
        }
        "#;

        let config = LeaderboardConfig::from_json_str(json).unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.rank_strategy, RankStrategy::Revalidate);
    }

    #[test]
    fn unknown_environment_is_a_parse_error() {
        let err = LeaderboardConfig::from_json_str(
            r#"{ "app_id": "a", "event_id": "b", "environment": "qa" }"#,
        )
        .unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn default_config_names_a_development_board() {
        let name = LeaderboardConfig::default_config().name().unwrap();
        assert_eq!(name.environment(), Environment::Development);
        assert_eq!(name.key(), "local-default-development");
    }
}
