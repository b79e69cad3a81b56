//! Provider selection and deployment scale.

use fairway_core::FairwayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Known golf-data providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum ProviderKind {
    /// Previously ingested records in the application database.
    #[default]
    Database,
    /// Third-party rankings/schedule/leaderboard HTTP API.
    ExternalApi,
}

impl ProviderKind {
    /// All known provider kinds.
    pub const ALL: [Self; 2] = [Self::Database, Self::ExternalApi];

    /// Returns the canonical selector string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::ExternalApi => "external_api",
        }
    }

    /// Returns true if this provider needs an API key.
    #[must_use]
    pub const fn requires_api_key(&self) -> bool {
        matches!(self, Self::ExternalApi)
    }

    /// Returns true if this provider can serve live scores.
    #[must_use]
    pub const fn supports_live_scores(&self) -> bool {
        matches!(self, Self::ExternalApi)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FairwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "database" | "db" => Ok(Self::Database),
            "external_api" | "external" | "api" | "datagolf" => Ok(Self::ExternalApi),
            _ => Err(FairwayError::UnknownProvider(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = FairwayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ProviderKind> for String {
    fn from(kind: ProviderKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Deployment scale used by the provider recommendation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentScale {
    /// Few users, minimal budget.
    #[default]
    Startup,
    /// Steady traffic, some budget for data.
    Growing,
    /// High traffic, contractual data feeds.
    Enterprise,
}

impl DeploymentScale {
    /// All deployment scales, smallest first.
    pub const ALL: [Self; 3] = [Self::Startup, Self::Growing, Self::Enterprise];
}

impl fmt::Display for DeploymentScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Startup => write!(f, "startup"),
            Self::Growing => write!(f, "growing"),
            Self::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl FromStr for DeploymentScale {
    type Err = FairwayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "startup" => Ok(Self::Startup),
            "growing" => Ok(Self::Growing),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(FairwayError::validation(format!("Unknown deployment scale: '{}'", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("database".parse::<ProviderKind>().unwrap(), ProviderKind::Database);
        assert_eq!("External-API".parse::<ProviderKind>().unwrap(), ProviderKind::ExternalApi);
        assert_eq!("datagolf".parse::<ProviderKind>().unwrap(), ProviderKind::ExternalApi);
    }

    #[test]
    fn test_provider_kind_unknown() {
        let err = "sportsradar".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, FairwayError::UnknownProvider(ref name) if name == "sportsradar"));
    }

    #[test]
    fn test_provider_kind_serde_round_trip() {
        let json = serde_json::to_string(&ProviderKind::ExternalApi).unwrap();
        assert_eq!(json, "\"external_api\"");
        assert!(serde_json::from_str::<ProviderKind>("\"espn\"").is_err());
    }

    #[test]
    fn test_capabilities() {
        assert!(ProviderKind::ExternalApi.requires_api_key());
        assert!(!ProviderKind::Database.requires_api_key());
        assert!(!ProviderKind::Database.supports_live_scores());
    }

    #[test]
    fn test_deployment_scale_parse() {
        assert_eq!("Enterprise".parse::<DeploymentScale>().unwrap(), DeploymentScale::Enterprise);
        assert!("huge".parse::<DeploymentScale>().is_err());
    }
}
