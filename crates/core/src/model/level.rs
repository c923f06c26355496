use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown proficiency level: {raw:?}")]
pub struct ParseLevelError {
    raw: String,
}

//
// ─── PROFICIENCY LEVEL ─────────────────────────────────────────────────────────
//

/// CEFR proficiency tier, ordered from easiest to hardest.
///
/// Ordering is defined by an explicit ordinal (`rank`) rather than by the
/// position of a variant in some collection, so "highest first" scans and
/// "next level up" work the same no matter where a list of levels came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProficiencyLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
}

impl ProficiencyLevel {
    /// Every level, ascending.
    pub const ALL: [ProficiencyLevel; 5] = [Self::A1, Self::A2, Self::B1, Self::B2, Self::C1];

    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::A1 => 0,
            Self::A2 => 1,
            Self::B1 => 2,
            Self::B2 => 3,
            Self::C1 => 4,
        }
    }

    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        Self::ALL.get(usize::from(rank)).copied()
    }

    #[must_use]
    pub fn lowest() -> Self {
        Self::A1
    }

    #[must_use]
    pub fn highest() -> Self {
        Self::C1
    }

    /// The next harder level, or `None` at the top.
    #[must_use]
    pub fn next_up(self) -> Option<Self> {
        Self::from_rank(self.rank() + 1)
    }

    /// Short CEFR code, e.g. `"B1"`.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
        }
    }

    /// Full label used in prompts and on screen, e.g. `"B1 (Intermediate)"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::A1 => "A1 (Beginner)",
            Self::A2 => "A2 (Elementary)",
            Self::B1 => "B1 (Intermediate)",
            Self::B2 => "B2 (Upper Intermediate)",
            Self::C1 => "C1 (Advanced)",
        }
    }
}

impl fmt::Display for ProficiencyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ProficiencyLevel {
    type Err = ParseLevelError;

    /// Accepts either the bare code (`"b1"`, `"B1"`) or the full label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| {
                trimmed.eq_ignore_ascii_case(level.code()) || trimmed == level.label()
            })
            .ok_or_else(|| ParseLevelError {
                raw: s.to_string(),
            })
    }
}

impl Serialize for ProficiencyLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ProficiencyLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
