// Leaderboard Naming
//
// Builds store keys from an app id, an event id and the environment
// mode, so boards from different deployments never share a key.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Deployment mode. Only affects naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ConfigError::UnknownEnvironment(s.to_string()))
    }
}

/// Identity of one leaderboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardName {
    app_id: String,
    event_id: String,
    environment: Environment,
}

impl LeaderboardName {
    pub fn new(
        app_id: impl Into<String>,
        event_id: impl Into<String>,
        environment: Environment,
    ) -> Result<Self, ConfigError> {
        let app_id = app_id.into();
        let event_id = event_id.into();
        validate_part("app_id", &app_id)?;
        validate_part("event_id", &event_id)?;

        Ok(Self {
            app_id,
            event_id,
            environment,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Key of the score set, e.g. `arcade-weekly-production`.
    pub fn key(&self) -> String {
        format!("{}-{}-{}", self.app_id, self.event_id, self.environment)
    }

    /// Namespace for member metadata, kept apart from the score key.
    pub fn metadata_namespace(&self) -> String {
        format!("{}-info", self.key())
    }
}

fn validate_part(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::InvalidName(format!("{field} must not be empty")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidName(format!(
            "{field} `{value}` must not contain whitespace"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::parse("Production"), Some(Environment::Production));
        assert_eq!(Environment::parse(" staging "), Some(Environment::Staging));
        assert_eq!(Environment::parse("prod"), None);

        let err = "qa".parse::<Environment>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEnvironment(_)));
    }

    #[test]
    fn key_and_namespace_include_environment() {
        let name = LeaderboardName::new("arcade", "weekly", Environment::Staging).unwrap();

        assert_eq!(name.key(), "arcade-weekly-staging");
        assert_eq!(name.metadata_namespace(), "arcade-weekly-staging-info");
    }

    #[test]
    fn blank_parts_are_rejected() {
        assert!(LeaderboardName::new("", "weekly", Environment::Development).is_err());
        assert!(LeaderboardName::new("arcade", "week 1", Environment::Development).is_err());
    }
}
