// SPDX-License-Identifier: MPL-2.0

//! Trait for identifying packages.
//! Automatically implemented for types implementing Clone + Eq + Hash + Debug + Display.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait for identifying packages.
///
/// Identity of a package is its name: the metadata database guarantees
/// that two packages never share one.
/// `Display` is needed because every resolution decision is logged by name.
pub trait Package: Clone + Eq + Hash + Debug + Display {}

/// Automatically implement the Package trait for any type
/// that already implement Clone + Eq + Hash + Debug + Display.
impl<T: Clone + Eq + Hash + Debug + Display> Package for T {}
