// SPDX-License-Identifier: GPL-3.0-or-later

//! Maps source references of directives to files of the package.
//!
//! A reference is interpreted relative to the directory of the listfile that
//! contains it. When no file exists under that exact name, the reference may
//! still be a name whose suffix is only decided at build time (generator
//! expressions, configuration dependent extensions). In that case the sibling
//! files sharing the stem of the reference are considered, and accepted only
//! when the choice is unambiguous.
//!
//! Resolved paths are relative to the package root.

use super::model::{Diagnostics, FileInformation};
use super::variables::Variables;
use std::path::{Path, PathBuf};

/// Resolves a source reference to a package relative path.
///
/// Files produced by `configure_file` are never resolved, and are not
/// reported either. Other failures are recorded in the diagnostics.
pub fn resolve(
    reference: &str,
    package_root: &Path,
    variables: &Variables,
    diagnostics: &mut Diagnostics,
) -> Option<PathBuf> {
    let reference = unquote(reference.trim());
    if diagnostics.generated.contains(reference) {
        log::debug!("Skipping generated source: {reference}");
        return None;
    }

    let candidate = candidate_path(reference, package_root, variables);
    if package_root.join(&candidate).is_file() {
        return Some(candidate);
    }

    match unique_sibling(package_root, &candidate) {
        Some(found) => {
            log::debug!("Resolved '{}' to {}", reference, found.display());
            Some(found)
        }
        None => {
            diagnostics.unresolved.push(FileInformation {
                path: reference.to_string(),
                cmake_file: PathBuf::from(variables.current_list_file()),
                cmake_line: variables.current_line(),
            });
            None
        }
    }
}

/// Removes one layer of matching single or double quotes.
pub fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}

/// The reference as a path relative to the package root.
///
/// Absolute references into the package are made relative; absolute
/// references elsewhere are kept as they are.
pub fn candidate_path(reference: &str, package_root: &Path, variables: &Variables) -> PathBuf {
    let path = Path::new(reference);
    if path.is_absolute() {
        return path
            .strip_prefix(package_root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf());
    }
    match variables.current_directory() {
        Some(directory) => Path::new(directory).join(path),
        None => path.to_path_buf(),
    }
}

fn unique_sibling(package_root: &Path, candidate: &Path) -> Option<PathBuf> {
    let stem = candidate.file_stem()?.to_string_lossy().into_owned();
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));

    let entries = match std::fs::read_dir(package_root.join(parent)) {
        Ok(entries) => entries,
        Err(error) => {
            log::debug!("Cannot list {}: {}", package_root.join(parent).display(), error);
            return None;
        }
    };
    let matches: Vec<_> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(&stem))
        .collect();

    match matches.as_slice() {
        [single] => Some(parent.join(single)),
        _ => {
            log::debug!(
                "Exactly one file should match '{}', found {}: {:?}",
                candidate.display(),
                matches.len(),
                matches
            );
            None
        }
    }
}
