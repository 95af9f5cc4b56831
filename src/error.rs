// SPDX-License-Identifier: MPL-2.0

//! Handling resolution errors.
//!
//! Two families live here.
//! [ClosureError] aborts a run: it only arises when the metadata database
//! itself fails.
//! [LookupError] is the expected, local outcome of looking up a name,
//! it is branched on by the resolver and never escapes a run.

use thiserror::Error;

use crate::package::Package;
use crate::version::Version;

/// Errors that may abort a resolution run.
#[derive(Error, Debug)]
pub enum ClosureError<P: Package, V: Version> {
    /// Error arising when the implementer of `MetadataProvider`
    /// returned an error in the method `list_packages`.
    #[error("Listing packages failed")]
    ErrorRetrievingPackages {
        /// Error raised by the implementer of `MetadataProvider`.
        source: Box<dyn std::error::Error>,
    },

    /// Error arising when the implementer of `MetadataProvider`
    /// returned an error in the method `list_available_versions`.
    #[error("Retrieving available versions of package {package} failed")]
    ErrorRetrievingVersions {
        /// Package for which we want the list of versions.
        package: P,
        /// Error raised by the implementer of `MetadataProvider`.
        source: Box<dyn std::error::Error>,
    },

    /// Error arising when the implementer of `MetadataProvider`
    /// returned an error in the method `get_dependencies`.
    #[error("Retrieving dependencies of {package} {version} failed")]
    ErrorRetrievingDependencies {
        /// Package whose dependencies we want.
        package: P,
        /// Version of the package for which we want the dependencies.
        version: V,
        /// Error raised by the implementer of `MetadataProvider`.
        source: Box<dyn std::error::Error>,
    },

    /// Error arising when the implementer of `MetadataProvider`
    /// returned an error in the method `get_provides`.
    #[error("Retrieving provides of {package} {version} failed")]
    ErrorRetrievingProvides {
        /// Package whose provides we want.
        package: P,
        /// Version of the package for which we want the provides.
        version: V,
        /// Error raised by the implementer of `MetadataProvider`.
        source: Box<dyn std::error::Error>,
    },

    /// Error arising when the implementer of `MetadataProvider`
    /// returned an error in the method `get_priority`.
    #[error("Retrieving priority of {package} {version} failed")]
    ErrorRetrievingPriority {
        /// Package whose priority we want.
        package: P,
        /// Version of the package for which we want the priority.
        version: V,
        /// Error raised by the implementer of `MetadataProvider`.
        source: Box<dyn std::error::Error>,
    },

    /// The database contradicted itself.
    #[error("{0}")]
    Failure(String),
}

/// Why a name could not be turned into a concrete package.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError<P: Package> {
    /// The name does not exist in the metadata at all.
    #[error("package {0} does not exist")]
    NotFound(P),
    /// The name is virtual and nothing provides it.
    #[error("could not find a provide for {0}")]
    UnresolvedVirtual(P),
}
