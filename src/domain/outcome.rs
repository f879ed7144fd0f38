//! Binary market outcome with a single boundary parser.
//!
//! All free-text outcome labels collapse to [`Outcome`] at the edge of
//! the system; nothing downstream branches on strings. Ambiguous input
//! is rejected rather than defaulted.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// One of the two sides of a binary market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Yes,
    No,
}

impl Outcome {
    /// Parse a user-supplied outcome label.
    ///
    /// Accepts the historical label spellings ("yes"/"y"/"true",
    /// "no"/"n"/"false"), case-insensitive and trimmed. Anything else
    /// is `InvalidOutcome`.
    pub fn parse(input: &str) -> Result<Self, LedgerError> {
        match input.trim().to_ascii_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Self::Yes),
            "no" | "n" | "false" => Ok(Self::No),
            _ => Err(LedgerError::InvalidOutcome {
                input: input.to_string(),
            }),
        }
    }

    /// The other side of the market.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    /// Canonical lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
