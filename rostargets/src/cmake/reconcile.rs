// SPDX-License-Identifier: GPL-3.0-or-later

//! Post-processing of the targets once every listfile is evaluated.
//!
//! Link declarations may precede the target they refer to, so they are kept
//! aside during evaluation and attached here. Plugin descriptions name the
//! classes a library exports; the libraries they match are completed with
//! the class entrypoint and made reachable under the class name too.

use super::model::{ReconciliationIssue, Target};
use crate::package::plugins::PluginLibrary;
use std::collections::BTreeMap;

/// Appends the declared link libraries to the binary targets.
pub fn attach_libraries(
    targets: BTreeMap<String, Target>,
    mut links: BTreeMap<String, Vec<String>>,
) -> BTreeMap<String, Target> {
    targets
        .into_iter()
        .map(|(name, target)| match links.remove(&name) {
            Some(libraries) => {
                let target = target.with_libraries(libraries);
                (name, target)
            }
            None => (name, target),
        })
        .collect()
}

/// Completes the library targets named by the plugin entries.
///
/// Entries are matched by short name first. Failing that, a target whose
/// name appears in the library path or the class name of the entry is taken.
/// This fallback is approximate; when several targets qualify, the one with
/// the lexicographically smallest name wins.
pub fn reconcile_plugins(
    package: &str,
    mut targets: BTreeMap<String, Target>,
    entries: &BTreeMap<String, PluginLibrary>,
) -> (BTreeMap<String, Target>, Vec<ReconciliationIssue>) {
    let mut issues = Vec::new();

    for (short_name, entry) in entries {
        let Some(key) = matching_target(&targets, short_name, entry) else {
            log::warn!("Package {package}: plugin entry {short_name} does not match any target");
            issues.push(ReconciliationIssue::UnmatchedEntry {
                package: package.to_string(),
                name: short_name.clone(),
            });
            continue;
        };

        let Some(target) = targets.get(&key).cloned() else {
            continue;
        };
        let target = match target.complete(entry.entrypoint()) {
            Some(completed) => {
                log::debug!("Target {key} has entrypoint {}", entry.entrypoint());
                targets.insert(key.clone(), completed.clone());
                completed
            }
            None => {
                log::warn!(
                    "Package {package}: plugin entry {short_name} matches {key}, which is a {} target",
                    target.kind_name()
                );
                issues.push(ReconciliationIssue::NotCompletable {
                    package: package.to_string(),
                    name: short_name.clone(),
                    target: key.clone(),
                });
                target
            }
        };
        if entry.type_.is_empty() || entry.type_ == key {
            continue;
        }
        match targets.get(&entry.type_) {
            Some(taken) if taken.name != target.name => {
                log::warn!(
                    "Package {package}: plugin entry {short_name} cannot alias {key} as {}, which is the target {}",
                    entry.type_,
                    taken.name
                );
                issues.push(ReconciliationIssue::AliasConflict {
                    package: package.to_string(),
                    name: short_name.clone(),
                    alias: entry.type_.clone(),
                    target: key.clone(),
                });
            }
            _ => {
                targets.insert(entry.type_.clone(), target);
            }
        }
    }

    for (key, target) in &targets {
        if target.is_incomplete() {
            log::warn!("Package {package}: library {key} is not completed by any plugin entry");
            issues.push(ReconciliationIssue::IncompleteTarget { package: package.to_string(), target: key.clone() });
        }
    }

    (targets, issues)
}

fn matching_target(targets: &BTreeMap<String, Target>, short_name: &str, entry: &PluginLibrary) -> Option<String> {
    if targets.contains_key(short_name) {
        return Some(short_name.to_string());
    }
    targets
        .keys()
        .find(|key| entry.path.contains(key.as_str()) || entry.name.contains(key.as_str()))
        .inspect(|key| log::debug!("Plugin entry {short_name} approximately matched target {key}"))
        .cloned()
}
