// SPDX-License-Identifier: MPL-2.0

use std::error::Error;

use apt_closure::constraint::Constraint;
use apt_closure::error::ClosureError;
use apt_closure::metadata::{
    Dependency, MetadataProvider, OfflineMetadataProvider, PackageVersion, Priority,
};
use apt_closure::solver::{resolve, Closure, Request};

type Db = OfflineMetadataProvider<&'static str, u32>;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn names(closure: &Closure<&'static str, u32>) -> Vec<&'static str> {
    closure.names().copied().collect()
}

#[test]
fn request_keeps_its_arguments() {
    let request = Request::<&str>::new(["a", "b"]).ban(["x"]).ban(["y"]);
    assert_eq!(request.targets(), ["a", "b"]);
    assert_eq!(request.banned(), ["x", "y"]);
}

#[test]
fn single_dependency() {
    init_log();
    let mut db = Db::new();
    db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("b")]));
    db.add_version("b", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "b"]);
    assert!(closure.is_complete());
}

#[test]
fn virtual_dependency_uses_first_provider() {
    init_log();
    let mut db = Db::new();
    db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("v")]));
    db.add_version("b", PackageVersion::new(1u32).provides(["v"]));
    db.add_version("c", PackageVersion::new(1u32).provides(["v"]));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "b"]);
}

#[test]
fn banned_alternative_is_skipped() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([Dependency::depends("x").or(), Dependency::depends("y")]),
    );
    db.add_version("x", PackageVersion::new(1u32));
    db.add_version("y", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"]).ban(["x"])).unwrap();
    assert_eq!(names(&closure), ["a", "y"]);

    // Without the ban the first alternative wins.
    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "x"]);
}

#[test]
fn unknown_target_is_reported() {
    init_log();
    let mut db = Db::new();
    db.add_version("a", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["z", "a", "z"])).unwrap();
    assert_eq!(closure.bad_targets(), ["z"]);
    assert_eq!(names(&closure), ["a"]);
    assert!(!closure.is_complete());
}

#[test]
fn baseline_dependency_is_not_added() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32)
            .depends([Dependency::depends("d").with_constraint(Constraint::HigherOrEqual(1))]),
    );
    db.add_version(
        "d",
        PackageVersion::new(2u32)
            .priority(Priority::Required)
            .depends([Dependency::depends("e")]),
    );
    db.add_version("e", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a"]);
    assert_eq!(closure.baseline().get("d"), Some(&2));
}

#[test]
fn shared_alternative_staged_once() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([Dependency::depends("p").or(), Dependency::depends("q")]),
    );
    db.add_version(
        "b",
        PackageVersion::new(1u32).depends([Dependency::depends("x").or(), Dependency::depends("p")]),
    );
    for name in ["p", "q", "x"] {
        db.add_version(name, PackageVersion::new(1u32));
    }

    let closure = resolve(&db, &Request::new(["a", "b"]).ban(["x"])).unwrap();
    assert_eq!(names(&closure), ["a", "b", "p"]);
    assert!(closure.is_complete());
}

#[test]
fn later_group_satisfied_by_earlier_choice() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([Dependency::depends("p").or(), Dependency::depends("q")]),
    );
    db.add_version("p", PackageVersion::new(1u32).depends([Dependency::depends("d")]));
    db.add_version(
        "d",
        PackageVersion::new(1u32).depends([Dependency::depends("w").or(), Dependency::depends("p")]),
    );
    for name in ["q", "w"] {
        db.add_version(name, PackageVersion::new(1u32));
    }

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "p", "d"]);
}

#[test]
fn group_satisfied_by_single_dependency() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([
            Dependency::depends("x").or(),
            Dependency::depends("y"),
            Dependency::depends("y"),
        ]),
    );
    db.add_version("x", PackageVersion::new(1u32));
    db.add_version("y", PackageVersion::new(1u32));

    // y is pulled in before the OR-groups are decided, so x is never staged.
    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "y"]);
    assert!(!closure.packages().contains_key("x"));
    assert!(closure.is_complete());
}

#[test]
fn group_satisfied_by_baseline() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([Dependency::depends("x").or(), Dependency::depends("y")]),
    );
    db.add_version("x", PackageVersion::new(1u32));
    db.add_version("y", PackageVersion::new(1u32).priority(Priority::Important));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a"]);
}

#[test]
fn failed_virtual_requeues_every_group() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([Dependency::depends("vx").or(), Dependency::depends("y")]),
    );
    db.add_version(
        "b",
        PackageVersion::new(1u32).depends([Dependency::depends("vx").or(), Dependency::depends("z")]),
    );
    db.add_version("y", PackageVersion::new(1u32));
    db.add_version("z", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a", "b"])).unwrap();
    assert_eq!(names(&closure), ["a", "b", "y", "z"]);
    assert!(closure.banned().contains("vx"));
    assert!(closure.is_complete());
}

#[test]
fn fully_banned_group_is_unresolved() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([
            Dependency::depends("vx").or(),
            Dependency::depends("y"),
            Dependency::depends("b"),
        ]),
    );
    db.add_version("y", PackageVersion::new(1u32));
    db.add_version("b", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"]).ban(["y"])).unwrap();
    assert_eq!(names(&closure), ["a", "b"]);
    assert_eq!(closure.unresolved_groups().len(), 1);
    let group = &closure.unresolved_groups()[0];
    assert_eq!(group.owner, "a");
    assert_eq!(group.to_string(), "(vx | y)");
    assert!(!closure.is_complete());
}

#[test]
fn virtual_target_is_substituted() {
    init_log();
    let mut db = Db::new();
    db.add_version("exim4", PackageVersion::new(4u32).provides(["mta"]));
    db.add_version("postfix", PackageVersion::new(3u32).provides(["mta"]));
    db.add_virtual("nothing");

    let closure = resolve(&db, &Request::new(["mta", "nothing", "exim4"])).unwrap();
    assert_eq!(names(&closure), ["exim4"]);
    assert_eq!(closure.bad_targets(), ["nothing"]);
}

#[test]
fn include_baseline_appends_missing_names() {
    init_log();
    let mut db = Db::new();
    db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("libc")]));
    db.add_version("libc", PackageVersion::new(1u32).priority(Priority::Required));
    db.add_version("bash", PackageVersion::new(5u32).priority(Priority::Required));

    let closure = resolve(&db, &Request::new(["a"]).include_baseline(true)).unwrap();
    assert_eq!(names(&closure), ["a", "libc", "bash"]);
    assert_eq!(closure.total(), 3);

    // A baseline package asked for explicitly is listed once.
    let closure = resolve(&db, &Request::new(["bash", "a"]).include_baseline(true)).unwrap();
    assert_eq!(names(&closure), ["bash", "a", "libc"]);
    assert_eq!(closure.packages().len() + closure.baseline().len(), 4);
    assert_eq!(closure.total(), 3);
}

#[test]
fn compute_baseline_replaces_targets() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "libc",
        PackageVersion::new(2u32)
            .priority(Priority::Required)
            .depends([Dependency::depends("libgcc"), Dependency::depends("base-files")]),
    );
    db.add_version("libgcc", PackageVersion::new(1u32));
    db.add_version("base-files", PackageVersion::new(1u32).priority(Priority::Important));
    db.add_version("vim", PackageVersion::new(9u32));

    let request = Request::new(["vim"]).include_baseline(true).compute_baseline(true);
    let closure = resolve(&db, &request).unwrap();
    assert_eq!(names(&closure), ["libc", "libgcc", "base-files"]);
    assert!(!closure.includes_baseline());
}

#[test]
fn constrained_dependency_records_version() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32)
            .depends([Dependency::depends("b").with_constraint(Constraint::StrictlyLower(2))]),
    );
    db.add_version("b", PackageVersion::new(3u32));
    db.add_version("b", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(closure.packages().get("a"), Some(&None));
    assert_eq!(closure.packages().get("b"), Some(&Some(1)));
}

#[test]
fn unsatisfiable_single_dependency_is_skipped() {
    init_log();
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([
            Dependency::depends("b").with_constraint(Constraint::Exactly(7)),
            Dependency::depends("c"),
        ]),
    );
    db.add_version("b", PackageVersion::new(1u32));
    db.add_version("c", PackageVersion::new(1u32));

    let closure = resolve(&db, &Request::new(["a"])).unwrap();
    assert_eq!(names(&closure), ["a", "c"]);
}

#[test]
fn same_result_on_repeated_runs() {
    let mut db = Db::new();
    db.add_version(
        "a",
        PackageVersion::new(1u32).depends([
            Dependency::depends("v").or(),
            Dependency::depends("w"),
            Dependency::depends("c"),
        ]),
    );
    db.add_version("c", PackageVersion::new(1u32).depends([Dependency::depends("v")]));
    db.add_version("p1", PackageVersion::new(1u32).provides(["v", "w"]));
    db.add_version("p2", PackageVersion::new(1u32).provides(["v"]));

    let request = Request::new(["a", "ghost"]);
    let one = resolve(&db, &request).unwrap();
    for _ in 0..10 {
        let other = resolve(&db, &request).unwrap();
        assert_eq!(one.packages(), other.packages());
        assert_eq!(one.bad_targets(), other.bad_targets());
        assert_eq!(one.banned(), other.banned());
    }
}

/// Delegates to an offline database, failing on one package.
struct FailingProvider {
    db: Db,
    broken: &'static str,
}

impl MetadataProvider<&'static str, u32> for FailingProvider {
    fn list_packages(&self) -> Result<Vec<&'static str>, Box<dyn Error>> {
        self.db.list_packages()
    }

    fn list_available_versions(
        &self,
        package: &&'static str,
    ) -> Result<Option<Vec<u32>>, Box<dyn Error>> {
        self.db.list_available_versions(package)
    }

    fn get_dependencies(
        &self,
        package: &&'static str,
        version: &u32,
    ) -> Result<Vec<Dependency<&'static str, u32>>, Box<dyn Error>> {
        if *package == self.broken {
            return Err("corrupt index".into());
        }
        self.db.get_dependencies(package, version)
    }

    fn get_provides(
        &self,
        package: &&'static str,
        version: &u32,
    ) -> Result<Vec<&'static str>, Box<dyn Error>> {
        self.db.get_provides(package, version)
    }

    fn get_priority(&self, package: &&'static str, version: &u32) -> Result<Priority, Box<dyn Error>> {
        self.db.get_priority(package, version)
    }
}

#[test]
fn provider_failure_aborts_the_run() {
    init_log();
    let mut db = Db::new();
    db.add_version("a", PackageVersion::new(1u32).depends([Dependency::depends("b")]));
    db.add_version("b", PackageVersion::new(1u32));
    let provider = FailingProvider { db, broken: "b" };

    match resolve(&provider, &Request::new(["a"])) {
        Err(ClosureError::ErrorRetrievingDependencies {
            package, version, ..
        }) => {
            assert_eq!(package, "b");
            assert_eq!(version, 1);
        }
        other => panic!("unexpected outcome: {:?}", other.map(|c| c.total())),
    }
}
