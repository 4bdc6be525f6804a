//! Existential flags - tri-state lifecycle values

use std::fmt;

use serde::{Deserialize, Serialize};

/// A lifecycle flag whose value may be unknown
///
/// Flags are stored and serialized as small integers:
/// - `-1`: unknown
/// - `0`: false
/// - `1`: true
///
/// Any other stored integer decodes as `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ExistentialFlag {
    #[default]
    Unknown,
    False,
    True,
}

impl ExistentialFlag {
    /// Decode a flag from its stored integer form
    pub fn from_i64(value: i64) -> Self {
        match value {
            0 => ExistentialFlag::False,
            1 => ExistentialFlag::True,
            _ => ExistentialFlag::Unknown,
        }
    }

    /// Encode the flag as its stored integer form
    pub fn as_i64(self) -> i64 {
        match self {
            ExistentialFlag::Unknown => -1,
            ExistentialFlag::False => 0,
            ExistentialFlag::True => 1,
        }
    }

    /// Whether the value is known at all
    pub fn is_known(self) -> bool {
        !matches!(self, ExistentialFlag::Unknown)
    }

    /// True only when the flag is known to be true
    pub fn is_true(self) -> bool {
        matches!(self, ExistentialFlag::True)
    }

    /// True only when the flag is known to be false
    pub fn is_false(self) -> bool {
        matches!(self, ExistentialFlag::False)
    }
}

impl From<bool> for ExistentialFlag {
    fn from(value: bool) -> Self {
        if value {
            ExistentialFlag::True
        } else {
            ExistentialFlag::False
        }
    }
}

impl From<i64> for ExistentialFlag {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl From<ExistentialFlag> for i64 {
    fn from(flag: ExistentialFlag) -> Self {
        flag.as_i64()
    }
}

impl fmt::Display for ExistentialFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExistentialFlag::Unknown => "unknown",
            ExistentialFlag::False => "false",
            ExistentialFlag::True => "true",
        };
        f.write_str(s)
    }
}
