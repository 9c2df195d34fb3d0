//! Sort direction.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::constraint::Comparison;

/// Sort order direction of a cursor field.
///
/// Parsing is case-insensitive; [`Direction::parse_lenient`] falls back to
/// [`Direction::Asc`] for anything unrecognized.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    /// Ascending order (A-Z, oldest first, smallest first).
    #[default]
    Asc,
    /// Descending order (Z-A, newest first, largest first).
    Desc,
}

impl Direction {
    /// Parses a direction, defaulting to ascending for unknown input.
    pub fn parse_lenient(input: &str) -> Self {
        input.trim().parse().unwrap_or_default()
    }

    /// Returns the opposite direction.
    #[inline]
    pub fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns the effective direction for a traversal.
    ///
    /// Backward traversal reverses the direction, forward keeps it.
    #[inline]
    pub fn backward(self, backward: bool) -> Self {
        if backward { self.reverse() } else { self }
    }

    /// Returns the boundary comparison implied by this direction.
    #[inline]
    pub fn comparison(self) -> Comparison {
        match self {
            Self::Asc => Comparison::Gt,
            Self::Desc => Comparison::Lt,
        }
    }

    /// Returns whether this is ascending order.
    #[inline]
    pub fn is_asc(self) -> bool {
        matches!(self, Self::Asc)
    }

    /// Returns whether this is descending order.
    #[inline]
    pub fn is_desc(self) -> bool {
        matches!(self, Self::Desc)
    }

    /// Returns the SQL keyword for this direction.
    #[inline]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}
