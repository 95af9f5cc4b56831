// SPDX-License-Identifier: MPL-2.0

//! Version constraints attached to dependency records.
//!
//! A constraint is what a package index writes next to a dependency,
//! an operator and a version like `(>= 2.36)`, or nothing at all.
//! Evaluation goes through [Ranges] so that every operator
//! reduces to a set of allowed versions.

use std::fmt::{self, Display};

use version_ranges::Ranges;

use crate::version::Version;

/// Operator + version pair, possibly absent.
///
/// Operators follow the Debian spelling: `<<` and `>>` are strict.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint<V> {
    /// No version restriction.
    Any,
    /// `<< v`
    StrictlyLower(V),
    /// `<= v`
    LowerOrEqual(V),
    /// `= v`
    Exactly(V),
    /// `>= v`
    HigherOrEqual(V),
    /// `>> v`
    StrictlyHigher(V),
}

impl<V> Default for Constraint<V> {
    fn default() -> Self {
        Self::Any
    }
}

impl<V: Version> Constraint<V> {
    /// Set of versions allowed by this constraint.
    pub fn to_ranges(&self) -> Ranges<V> {
        match self {
            Self::Any => Ranges::full(),
            Self::StrictlyLower(v) => Ranges::strictly_lower_than(v.clone()),
            Self::LowerOrEqual(v) => Ranges::lower_than(v.clone()),
            Self::Exactly(v) => Ranges::singleton(v.clone()),
            Self::HigherOrEqual(v) => Ranges::higher_than(v.clone()),
            Self::StrictlyHigher(v) => Ranges::strictly_higher_than(v.clone()),
        }
    }

    /// Whether `version` is allowed.
    pub fn contains(&self, version: &V) -> bool {
        match self {
            Self::Any => true,
            _ => self.to_ranges().contains(version),
        }
    }

    /// Operator in Debian spelling, `None` for [Constraint::Any].
    pub fn operator(&self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::StrictlyLower(_) => Some("<<"),
            Self::LowerOrEqual(_) => Some("<="),
            Self::Exactly(_) => Some("="),
            Self::HigherOrEqual(_) => Some(">="),
            Self::StrictlyHigher(_) => Some(">>"),
        }
    }

    /// Version operand, `None` for [Constraint::Any].
    pub fn version(&self) -> Option<&V> {
        match self {
            Self::Any => None,
            Self::StrictlyLower(v)
            | Self::LowerOrEqual(v)
            | Self::Exactly(v)
            | Self::HigherOrEqual(v)
            | Self::StrictlyHigher(v) => Some(v),
        }
    }
}

impl<V: Version> Display for Constraint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operator(), self.version()) {
            (Some(op), Some(v)) => write!(f, "({} {})", op, v),
            _ => Ok(()),
        }
    }
}
