// ABOUTME: The closed set of business domains requests are routed between.
// ABOUTME: Shared by the registry (subagent grouping) and the classifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Business domain of a request or a subagent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Hospitality,
    Healthcare,
    Manufacturing,
    Retail,
    Education,
    General,
    #[serde(alias = "multi-domain", alias = "multi_industry")]
    MultiDomain,
}

impl Domain {
    /// Specialized domains, in the order the pattern classifier scores them.
    /// This order is the tie-break: the earlier domain wins equal scores.
    pub const SPECIALIZED: [Domain; 5] = [
        Domain::Hospitality,
        Domain::Healthcare,
        Domain::Manufacturing,
        Domain::Retail,
        Domain::Education,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Hospitality => "hospitality",
            Domain::Healthcare => "healthcare",
            Domain::Manufacturing => "manufacturing",
            Domain::Retail => "retail",
            Domain::Education => "education",
            Domain::General => "general",
            Domain::MultiDomain => "multi_domain",
        }
    }

    pub fn is_specialized(&self) -> bool {
        !matches!(self, Domain::General | Domain::MultiDomain)
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hospitality" => Ok(Domain::Hospitality),
            "healthcare" => Ok(Domain::Healthcare),
            "manufacturing" => Ok(Domain::Manufacturing),
            "retail" => Ok(Domain::Retail),
            "education" => Ok(Domain::Education),
            "general" => Ok(Domain::General),
            "multi_domain" | "multi_industry" => Ok(Domain::MultiDomain),
            other => Err(other.to_string()),
        }
    }
}
