// SPDX-License-Identifier: GPL-3.0-or-later

//! The targets and diagnostics the interpreter produces.
//!
//! A [`Target`] is a value: once constructed it is not mutated in place.
//! Renaming or completing a target produces a new value, which replaces the
//! old one in the target map.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// The language the target sources are written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SourceLanguage {
    #[serde(rename = "cxx")]
    Cxx,
    #[serde(rename = "python")]
    Python,
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLanguage::Cxx => write!(f, "cxx"),
            SourceLanguage::Python => write!(f, "python"),
        }
    }
}

/// The variant specific part of a target.
///
/// A library starts as [`TargetKind::IncompleteLibrary`] and becomes a
/// [`TargetKind::Library`] when the plugin description names its entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKind {
    Binary { libraries: Vec<String> },
    IncompleteLibrary,
    Library { entrypoint: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub name: String,
    pub language: SourceLanguage,
    /// Source files relative to the package root.
    pub sources: BTreeSet<PathBuf>,
    pub includes: Vec<String>,
    /// Directories the sources of the target must belong to.
    pub restrict_to_paths: BTreeSet<PathBuf>,
    pub cmakelists_file: PathBuf,
    pub cmakelists_line: usize,
    pub kind: TargetKind,
}

impl Target {
    /// The entry symbol of the target, if known.
    ///
    /// Native binaries always start at `main`. Interpreted binaries and
    /// incomplete libraries have none.
    pub fn entrypoint(&self) -> Option<&str> {
        match &self.kind {
            TargetKind::Binary { .. } if self.language == SourceLanguage::Cxx => Some("main"),
            TargetKind::Binary { .. } | TargetKind::IncompleteLibrary => None,
            TargetKind::Library { entrypoint } => Some(entrypoint),
        }
    }

    /// The linked library names; only binaries carry them.
    pub fn libraries(&self) -> Option<&[String]> {
        match &self.kind {
            TargetKind::Binary { libraries } => Some(libraries),
            _ => None,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.kind == TargetKind::IncompleteLibrary
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            TargetKind::Binary { .. } => "binary",
            TargetKind::IncompleteLibrary => "incomplete_library",
            TargetKind::Library { .. } => "library",
        }
    }

    /// Binds the entrypoint of an incomplete library.
    ///
    /// Returns `None` for every other variant, the transition exists only
    /// from incomplete to complete.
    pub fn complete(&self, entrypoint: impl Into<String>) -> Option<Target> {
        if !self.is_incomplete() {
            return None;
        }
        Some(Target { kind: TargetKind::Library { entrypoint: entrypoint.into() }, ..self.clone() })
    }

    pub fn renamed(self, name: impl Into<String>) -> Target {
        Target { name: name.into(), ..self }
    }

    /// Appends link libraries to a binary. Other variants are returned unchanged.
    pub fn with_libraries<I>(self, extra: I) -> Target
    where
        I: IntoIterator<Item = String>,
    {
        match self.kind {
            TargetKind::Binary { mut libraries } => {
                libraries.extend(extra);
                Target { kind: TargetKind::Binary { libraries }, ..self }
            }
            _ => self,
        }
    }
}

/// A source reference that did not resolve to exactly one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInformation {
    pub path: String,
    pub cmake_file: PathBuf,
    pub cmake_line: usize,
}

/// A directive that had no handler, or whose handler failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandInformation {
    pub command: String,
    pub arguments: Vec<String>,
    pub cmake_file: PathBuf,
    pub cmake_line: usize,
}

/// A `pluginlib_export_plugin_description_file` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginReference {
    pub base_class_package: String,
    pub plugin_xml: String,
    pub cmake_file: PathBuf,
    pub cmake_line: usize,
}

/// Inconsistencies found while merging the plugin description into the targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ReconciliationIssue {
    /// A plugin entry that matches no target.
    UnmatchedEntry { package: String, name: String },
    /// A plugin entry matching a target that is not an incomplete library.
    NotCompletable { package: String, name: String, target: String },
    /// A library that no plugin entry completed.
    IncompleteTarget { package: String, target: String },
    /// The class type of a plugin entry is already the name of another target.
    AliasConflict { package: String, name: String, alias: String, target: String },
}

impl fmt::Display for ReconciliationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconciliationIssue::UnmatchedEntry { package, name } => {
                write!(f, "{package}: plugin entry '{name}' matches no target")
            }
            ReconciliationIssue::NotCompletable { package, name, target } => {
                write!(f, "{package}: plugin entry '{name}' matches '{target}', which is not an incomplete library")
            }
            ReconciliationIssue::IncompleteTarget { package, target } => {
                write!(f, "{package}: library '{target}' has no entrypoint")
            }
            ReconciliationIssue::AliasConflict { package, name, alias, target } => {
                write!(f, "{package}: plugin entry '{name}' cannot alias '{target}' as '{alias}', the name is taken")
            }
        }
    }
}

/// State shared by every listfile of one analysis run.
///
/// Nested listfiles borrow the same instance, and the records only grow.
/// A new run starts from a new instance.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    pub generated: BTreeSet<String>,
    pub unresolved: Vec<FileInformation>,
    pub unprocessed: Vec<CommandInformation>,
    pub plugin_references: Vec<PluginReference>,
}

/// The outcome of analysing one package.
#[derive(Debug, Clone, PartialEq)]
pub struct CMakeInfo {
    pub cmake_file: PathBuf,
    pub targets: BTreeMap<String, Target>,
    pub generated_sources: BTreeSet<String>,
    pub unresolved_files: Vec<FileInformation>,
    pub unprocessed_commands: Vec<CommandInformation>,
    pub plugin_references: Vec<PluginReference>,
    pub reconciliation: Vec<ReconciliationIssue>,
}
