// SPDX-License-Identifier: MPL-2.0

//! Build a human-readable summary of a resolution run.
//!
//! A run never fails on a single bad name, so the summary is where
//! partial outcomes become visible: OR-groups that could not be decided,
//! requested names that could not be resolved, and the final count.

use crate::package::Package;
use crate::solver::Closure;
use crate::version::Version;

/// Reporter trait.
pub trait Reporter<P: Package, V: Version> {
    /// Output type of the report.
    type Output;

    /// Summarize the outcome of a run:
    /// unresolved OR-groups, bad targets and result size.
    fn report(closure: &Closure<P, V>) -> Self::Output;

    /// Dump the provide index used during the run.
    fn report_provides(closure: &Closure<P, V>) -> Self::Output;
}

/// Default reporter able to generate a summary as a [String].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStringReporter;

impl<P: Package, V: Version> Reporter<P, V> for DefaultStringReporter {
    type Output = String;

    fn report(closure: &Closure<P, V>) -> String {
        let mut lines = Vec::new();

        let groups = closure.unresolved_groups();
        lines.push(format!("Missing multiples: {}", groups.len()));
        lines.extend(groups.iter().map(|group| format!("* {}", group)));

        let bad = closure.bad_targets();
        if !bad.is_empty() {
            lines.push("Bad inputs:".to_string());
            lines.extend(bad.iter().map(|name| format!("* {}", name)));
        }

        lines.push(format!("Total: {}", closure.total()));
        lines.join("\n")
    }

    fn report_provides(closure: &Closure<P, V>) -> String {
        let provides = closure.provides();
        if provides.is_empty() {
            return String::new();
        }

        let mut lines = vec!["Provide : Provided from".to_string()];
        for (name, providers) in provides.iter() {
            let providers: Vec<String> = providers.iter().map(|p| p.to_string()).collect();
            lines.push(format!("* {} : {}", name, providers.join(" ")));
        }
        lines.push(format!("Total provides: {}", provides.len()));
        lines.join("\n")
    }
}
