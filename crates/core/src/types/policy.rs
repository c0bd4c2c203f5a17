//! Run-level policies: conflict handling and sync direction

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a key that changed on both sides is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// The tabular store wins
    #[serde(alias = "sheets_wins")]
    AWins,
    /// The database store wins
    #[default]
    #[serde(alias = "notion_wins")]
    BWins,
    /// Report the key and write nothing
    Fail,
}

impl ConflictPolicy {
    /// Parses a policy name including the store-specific aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "a_wins" | "sheets_wins" => Some(Self::AWins),
            "b_wins" | "notion_wins" => Some(Self::BWins),
            "fail" => Some(Self::Fail),
            _ => None,
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AWins => write!(f, "a_wins"),
            Self::BWins => write!(f, "b_wins"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Which stores a run may write to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Both,
    /// Only the tabular store is written
    #[serde(alias = "to_sheets", alias = "to-sheets")]
    ToA,
    /// Only the database store is written
    #[serde(alias = "to_notion", alias = "to-notion")]
    ToB,
}

impl Direction {
    /// Parses a direction name including the store-specific aliases
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "both" => Some(Self::Both),
            "to_a" | "to_sheets" => Some(Self::ToA),
            "to_b" | "to_notion" => Some(Self::ToB),
            _ => None,
        }
    }

    /// Returns true if store A may be written
    pub fn writes_a(&self) -> bool {
        matches!(self, Self::Both | Self::ToA)
    }

    /// Returns true if store B may be written
    pub fn writes_b(&self) -> bool {
        matches!(self, Self::Both | Self::ToB)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Both => write!(f, "both"),
            Self::ToA => write!(f, "to_a"),
            Self::ToB => write!(f, "to_b"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_aliases() {
        assert_eq!(ConflictPolicy::parse("notion_wins"), Some(ConflictPolicy::BWins));
        assert_eq!(ConflictPolicy::parse("sheets-wins"), Some(ConflictPolicy::AWins));
        assert_eq!(ConflictPolicy::parse("FAIL"), Some(ConflictPolicy::Fail));
        assert_eq!(ConflictPolicy::parse("newest"), None);
    }

    #[test]
    fn test_policy_serde_aliases() {
        let policy: ConflictPolicy = serde_json::from_str("\"sheets_wins\"").unwrap();
        assert_eq!(policy, ConflictPolicy::AWins);
    }

    #[test]
    fn test_direction_gates() {
        assert!(Direction::Both.writes_a() && Direction::Both.writes_b());
        assert!(Direction::ToA.writes_a() && !Direction::ToA.writes_b());
        assert!(!Direction::ToB.writes_a() && Direction::ToB.writes_b());
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!(Direction::parse("to-notion"), Some(Direction::ToB));
        assert_eq!(Direction::parse("to_sheets"), Some(Direction::ToA));
        assert_eq!(Direction::parse("sideways"), None);
    }
}
