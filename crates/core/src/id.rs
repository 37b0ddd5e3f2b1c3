//! Process identifiers.

use serde::{Deserialize, Serialize};

/// Unique identifier for a simulated process.
///
/// Pids are handed out by a [`TaskRegistry`](crate::TaskRegistry) and are
/// never mutated afterwards. Ordering is numeric, which is what every
/// deterministic scan in the workspace relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(u32);

impl Pid {
    /// Wrap a raw pid value.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for Pid {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for Pid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl std::str::FromStr for Pid {
    type Err = std::num::ParseIntError;

    /// Accepts both `3` and `P3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s.strip_prefix(['P', 'p']).unwrap_or(s);
        Ok(Self(digits.parse()?))
    }
}
