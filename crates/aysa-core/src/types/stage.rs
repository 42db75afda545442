use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Deployment stage with its own remote host section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Development,
    Quality,
}

impl Stage {
    /// All stages, in deployment order
    pub const ALL: [Stage; 2] = [Stage::Development, Stage::Quality];

    /// Section name in the configuration file
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Development => "development",
            Stage::Quality => "quality",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Stage::Development),
            "quality" | "qa" => Ok(Stage::Quality),
            _ => Err(Error::invalid_stage(s)),
        }
    }
}
