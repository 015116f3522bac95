//! Shared types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mobile platforms Nimbus can build for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Android")]
    Android,
    #[serde(rename = "iOS")]
    Ios,
}

impl Platform {
    /// Every supported platform, in the order they are listed to users
    pub const ALL: [Platform; 2] = [Platform::Android, Platform::Ios];

    /// Lowercase identifier (e.g. "android", "ios")
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }

    /// Canonical display name (e.g. "Android", "iOS")
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Android => "Android",
            Self::Ios => "iOS",
        }
    }

    /// Parse a platform name, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "android" => Some(Self::Android),
            "ios" => Some(Self::Ios),
            _ => None,
        }
    }

    /// Space-separated list of supported display names
    pub fn supported_names() -> String {
        Self::ALL
            .iter()
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_android(&self) -> bool {
        matches!(self, Self::Android)
    }

    pub fn is_ios(&self) -> bool {
        matches!(self, Self::Ios)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}
