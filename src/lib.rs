// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Dependency closure of a set of packages.
//!
//! Bootstrapping a root filesystem needs the list of every package
//! required to install a few targets: the targets themselves,
//! what they depend on, what those depend on, and so on.
//! Unlike a version solver, this crate does not look for a consistent
//! installation plan. It makes one greedy, deterministic choice wherever
//! the metadata leaves a choice open, and reports what it could not
//! resolve instead of failing.
//!
//! Choices are left open in two places:
//!
//!  - virtual names, only provided by other packages
//!    (`mail-transport-agent` provided by `exim4` or `postfix`);
//!  - OR-groups of dependencies (`Depends: default-mta | mail-transport-agent`).
//!
//! # Package and Version traits
//!
//! Package identifiers need to implement our `Package` trait,
//! which is automatic if the type already implements
//! `Clone + Eq + Hash + Debug + Display`.
//! So things like `String` or `&str` work out of the box.
//!
//! Likewise, versions implement `Version` as soon as they are
//! `Clone + Ord + Debug + Display`. The crate ships a `SemanticVersion`
//! type for dotted numeric versions, used by the command line tool.
//!
//! # Basic example
//!
//! Let's imagine a mail client depending on a transport agent.
//! Several packages provide the `mta` virtual name,
//! and the client accepts either a default one or any provider:
//!
//! - `mutt` depends on `libc` and on `default-mta | mta`
//! - `exim4` and `postfix` both provide `mta`
//! - `libc` is required, it is part of any installation
//!
//! ```
//! use apt_closure::metadata::{Dependency, OfflineMetadataProvider, PackageVersion, Priority};
//! use apt_closure::solver::{resolve, Request};
//!
//! let mut db = OfflineMetadataProvider::<&str, u32>::new();
//! db.add_version(
//!     "mutt",
//!     PackageVersion::new(2u32).depends([
//!         Dependency::depends("libc"),
//!         Dependency::depends("default-mta").or(),
//!         Dependency::depends("mta"),
//!     ]),
//! );
//! db.add_version("libc", PackageVersion::new(1u32).priority(Priority::Required));
//! db.add_version("exim4", PackageVersion::new(4u32).provides(["mta"]));
//! db.add_version("postfix", PackageVersion::new(3u32).provides(["mta"]));
//!
//! let closure = resolve(&db, &Request::new(["mutt"])).unwrap();
//! // libc is in the baseline, default-mta has no provider.
//! assert_eq!(closure.names().copied().collect::<Vec<_>>(), ["mutt", "exim4"]);
//! assert!(closure.banned().contains("default-mta"));
//! ```
//!
//! # MetadataProvider trait
//!
//! In the previous example we used the `OfflineMetadataProvider`,
//! a basic in-memory implementation of the `MetadataProvider` trait.
//! A real tool would implement the trait on top of its package cache:
//! listing packages, their versions best first, and for one version
//! its dependency records, provided names and priority.
//! Those methods may read files and fail; such failures abort the run
//! and come back as a `ClosureError`.
//!
//! # Reporting
//!
//! Names that cannot be resolved are not errors.
//! The returned `Closure` keeps track of bad targets and of OR-groups
//! left undecided, and `Closure::is_complete()` tells whether there
//! were any.
//! The `Reporter` trait turns a closure into a human-readable summary,
//! and `DefaultStringReporter` renders it as a String:
//! ```
//! # use apt_closure::metadata::OfflineMetadataProvider;
//! # use apt_closure::report::{DefaultStringReporter, Reporter};
//! # use apt_closure::solver::{resolve, Request};
//! let db = OfflineMetadataProvider::<&str, u32>::new();
//! let closure = resolve(&db, &Request::new(["vim"])).unwrap();
//! assert!(!closure.is_complete());
//! eprintln!("{}", DefaultStringReporter::report(&closure));
//! ```

#![warn(missing_docs)]

pub mod constraint;
pub mod error;
pub mod metadata;
pub mod package;
pub mod provides;
pub mod report;
pub mod solver;
pub mod type_aliases;
pub mod version;

mod internal;
