// SPDX-License-Identifier: GPL-3.0-or-later

//! Evaluates the directives of a listfile.
//!
//! Every directive is looked up in the flavor's registry and handed to its
//! handler together with the active variable environment. The interpreter owns
//! the targets and link declarations of the listfile it evaluates. Nested
//! listfiles (`add_subdirectory`) are evaluated by a fresh interpreter over a
//! copy of the environment; their targets are merged back afterwards. Only the
//! run-wide [`Diagnostics`] are shared, by mutable borrow.
//!
//! A failing handler never stops the evaluation: the directive is recorded as
//! unprocessed and the next one follows. The exception is
//! [`DirectiveError::Fatal`], which aborts the whole analysis.

use super::arguments::{OptionSchema, ParsedOptions};
use super::model::{CommandInformation, Diagnostics, SourceLanguage, Target, TargetKind};
use super::parser::{Directive, ParseError, parse};
use super::variables::{
    KEY_CURRENT_BINARY_DIR, KEY_CURRENT_DIRECTORY, KEY_CURRENT_LIST_FILE, KEY_CURRENT_LIST_LINE,
    KEY_CURRENT_SOURCE_DIR, Variables,
};
use super::{Flavor, read_listfile, resolver};
use crate::extractor::AnalysisError;
use crate::package::Package;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure of a single directive.
#[derive(Debug, Error)]
pub enum DirectiveError {
    #[error("missing {0} argument")]
    MissingArgument(&'static str),
    #[error("missing required option {0}")]
    MissingOption(&'static str),
    #[error("undefined variable '{0}'")]
    UndefinedVariable(String),
    #[error("properties are not key/value pairs: {0:?}")]
    UnpairedProperties(Vec<String>),
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Aborts the analysis of the package.
    #[error(transparent)]
    Fatal(#[from] AnalysisError),
}

pub struct Interpreter<'a> {
    flavor: &'a dyn Flavor,
    package: &'a Package,
    restrictions: &'a BTreeSet<PathBuf>,
    diagnostics: &'a mut Diagnostics,
    targets: BTreeMap<String, Target>,
    links: BTreeMap<String, Vec<String>>,
    renames: BTreeMap<String, String>,
}

impl<'a> Interpreter<'a> {
    pub fn new(
        flavor: &'a dyn Flavor,
        package: &'a Package,
        restrictions: &'a BTreeSet<PathBuf>,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            flavor,
            package,
            restrictions,
            diagnostics,
            targets: BTreeMap::new(),
            links: BTreeMap::new(),
            renames: BTreeMap::new(),
        }
    }

    /// Evaluates the directives in order.
    pub fn run(&mut self, directives: &[Directive], variables: &mut Variables) -> Result<(), AnalysisError> {
        let registry = self.flavor.registry();
        for directive in directives {
            variables.set(KEY_CURRENT_LIST_LINE, directive.line.to_string());
            let command = directive.command.to_lowercase();

            let Some(handler) = registry.lookup(&command) else {
                log::debug!("No handler for {directive}");
                self.unprocessed(directive);
                continue;
            };

            let arguments = directive.expand_arguments(variables);
            log::debug!("Processing {}({})", command, arguments.join(" "));
            match handler(self, variables, &arguments) {
                Ok(()) => {}
                Err(DirectiveError::Fatal(error)) => return Err(error),
                Err(error) => {
                    log::error!("Error processing {directive}: {error}");
                    self.unprocessed(directive);
                }
            }
        }
        Ok(())
    }

    /// The targets and link declarations collected by this interpreter.
    pub fn into_parts(self) -> (BTreeMap<String, Target>, BTreeMap<String, Vec<String>>) {
        (self.targets, self.links)
    }

    pub fn package(&self) -> &Package {
        self.package
    }

    pub fn split(&self, arguments: &[String], schema: &OptionSchema) -> (ParsedOptions, Vec<String>) {
        self.flavor.splitter().split(arguments, schema)
    }

    /// The directory of the current listfile, relative to the package root.
    pub fn current_directory(&self, variables: &Variables) -> PathBuf {
        variables.current_directory().map(PathBuf::from).unwrap_or_default()
    }

    /// A directory argument as a path relative to the package root.
    pub fn package_relative(&self, variables: &Variables, directory: &str) -> PathBuf {
        let path = Path::new(directory);
        if path.is_absolute() {
            return path
                .strip_prefix(&self.package.root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| path.to_path_buf());
        }
        self.current_directory(variables).join(path)
    }

    pub fn resolve(&mut self, variables: &Variables, reference: &str) -> Option<PathBuf> {
        resolver::resolve(reference, &self.package.root, variables, self.diagnostics)
    }

    /// Resolves the source arguments of a target declaration.
    ///
    /// An argument naming a known target stands for the sources of that target.
    pub fn collect_sources(&mut self, variables: &Variables, references: &[String]) -> BTreeSet<PathBuf> {
        let mut sources = BTreeSet::new();
        for reference in references {
            if let Some(target) = self.targets.get(reference) {
                sources.extend(target.sources.iter().cloned());
                continue;
            }
            match self.resolve(variables, reference) {
                Some(path) => {
                    sources.insert(path);
                }
                None => log::warn!("'{reference}' did not resolve to a real file."),
            }
        }
        sources
    }

    /// A target declared at the current location.
    pub fn new_target(
        &self,
        variables: &Variables,
        name: &str,
        language: SourceLanguage,
        sources: BTreeSet<PathBuf>,
        kind: TargetKind,
    ) -> Target {
        Target {
            name: name.to_string(),
            language,
            sources,
            includes: variables.include_directories(),
            restrict_to_paths: self.restrictions.clone(),
            cmakelists_file: PathBuf::from(variables.current_list_file()),
            cmakelists_line: variables.current_line(),
            kind,
        }
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Registers the target. A previous declaration with the same name is replaced.
    ///
    /// The name refers to this target from now on, even if an earlier target
    /// was renamed away from it.
    pub fn insert_target(&mut self, target: Target) {
        log::debug!("Adding {} target {}", target.kind_name(), target.name);
        if let Some(moved) = self.renames.remove(&target.name) {
            log::debug!("Target {} declared again, links no longer follow it to {}", target.name, moved);
        }
        if let Some(previous) = self.targets.insert(target.name.clone(), target) {
            log::debug!("Target {} declared again, the previous declaration is dropped", previous.name);
        }
    }

    /// Moves the target to a new name. Returns false for unknown targets.
    pub fn rename_target(&mut self, old: &str, new: &str) -> bool {
        let Some(target) = self.targets.remove(old) else {
            return false;
        };
        self.insert_target(target.renamed(new));
        if let Some(libraries) = self.links.remove(old) {
            self.links.entry(new.to_string()).or_default().extend(libraries);
        }
        self.renames.insert(old.to_string(), new.to_string());
        true
    }

    /// Records libraries linked to the target, after any earlier declaration.
    pub fn link(&mut self, target: &str, libraries: impl IntoIterator<Item = String>) {
        let name = self.renames.get(target).map(String::as_str).unwrap_or(target).to_string();
        self.links.entry(name).or_default().extend(libraries);
    }

    pub fn diagnostics(&mut self) -> &mut Diagnostics {
        &mut *self.diagnostics
    }

    /// Evaluates the listfile of a sub-directory and merges its targets.
    ///
    /// Variables set by the nested listfile stay in its own copy of the
    /// environment. Targets declared there replace targets of the same name.
    pub fn include_subdirectory(&mut self, variables: &Variables, directory: &str) -> Result<(), DirectiveError> {
        let relative = self.package_relative(variables, directory);
        let source_dir = self.package.root.join(&relative);
        let listfile = source_dir.join("CMakeLists.txt");
        log::info!("Processing {}", listfile.display());

        let content =
            read_listfile(&listfile).map_err(|source| DirectiveError::Io { path: listfile.clone(), source })?;
        let directives = parse(&content, &listfile)?;

        let mut child_variables = variables.derive([
            (KEY_CURRENT_DIRECTORY, relative.to_string_lossy().into_owned()),
            (KEY_CURRENT_SOURCE_DIR, source_dir.to_string_lossy().into_owned()),
            (KEY_CURRENT_LIST_FILE, listfile.to_string_lossy().into_owned()),
        ]);
        if let Some(binary_dir) = variables.get(KEY_CURRENT_BINARY_DIR).filter(|dir| !dir.is_empty()) {
            let nested = Path::new(binary_dir).join(directory);
            child_variables.set(KEY_CURRENT_BINARY_DIR, nested.to_string_lossy());
        }

        let (targets, links) = {
            let mut child = Interpreter::new(self.flavor, self.package, self.restrictions, self.diagnostics);
            child.run(&directives, &mut child_variables)?;
            child.into_parts()
        };
        for (_, target) in targets {
            self.insert_target(target);
        }
        for (name, libraries) in links {
            self.link(&name, libraries);
        }
        Ok(())
    }

    fn unprocessed(&mut self, directive: &Directive) {
        self.diagnostics.unprocessed.push(CommandInformation {
            command: directive.command.clone(),
            arguments: directive.arguments.iter().map(|argument| argument.value.clone()).collect(),
            cmake_file: directive.file.clone(),
            cmake_line: directive.line,
        });
    }
}
