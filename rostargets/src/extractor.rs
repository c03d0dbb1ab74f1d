// SPDX-License-Identifier: GPL-3.0-or-later

//! Drives the analysis of one package.
//!
//! The extractor reads the root listfile, evaluates it with the flavor's
//! interpreter, attaches the link declarations and reconciles the plugin
//! descriptions. Each call of [`Extractor::analyze`] starts from fresh
//! diagnostics, so consecutive runs never see each other's records.

use crate::cmake::interpreter::Interpreter;
use crate::cmake::model::{CMakeInfo, Diagnostics};
use crate::cmake::parser::{ParseError, parse};
use crate::cmake::reconcile::{attach_libraries, reconcile_plugins};
use crate::cmake::variables::{KEY_CURRENT_DIRECTORY, KEY_CURRENT_LIST_FILE};
use crate::cmake::{Flavor, read_listfile};
use crate::package::workspace::Workspace;
use crate::package::{ManifestError, Package, plugins};
use std::path::PathBuf;
use thiserror::Error;

/// The conventional plugin description file name of nodelet packages.
pub const DEFAULT_PLUGIN_FILE: &str = "nodelet_plugins.xml";

/// Failures that abort the analysis of a package.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("No `CMakeLists.txt' in {package}: {path}")]
    MissingBuildFile { package: String, path: PathBuf },
    #[error("Failed to read {path} of package {package}: {source}")]
    Io {
        package: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse build file of package {package}: {source}")]
    Parse {
        package: String,
        #[source]
        source: ParseError,
    },
    #[error("Python package directory {path} of package {package} does not exist")]
    MissingPythonPackage { package: String, path: PathBuf },
    #[error("Python package marker {path} of package {package} does not exist")]
    MissingPackageMarker { package: String, path: PathBuf },
    #[error("Failed to read the manifest of package {path}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
}

pub struct Extractor {
    flavor: &'static dyn Flavor,
    package: Package,
    workspace: Workspace,
    plugin_files: Vec<String>,
}

impl Extractor {
    /// Creates an extractor for the package in the given directory.
    ///
    /// The workspace is located from the package root; without workspace
    /// markers the parent directory of the package stands in for it.
    pub fn new(flavor: &'static dyn Flavor, package_root: impl Into<PathBuf>) -> Result<Self, AnalysisError> {
        let root = package_root.into();
        let package = Package::load(&root).map_err(|source| AnalysisError::Manifest { path: root.clone(), source })?;
        let workspace = Workspace::locate(&package.root).unwrap_or_else(|| {
            let fallback = package.root.parent().map(PathBuf::from).unwrap_or_else(|| package.root.clone());
            log::debug!("No workspace markers above {}, using {}", package.root.display(), fallback.display());
            Workspace::new(fallback)
        });
        Ok(Self::from_parts(flavor, package, workspace))
    }

    pub fn from_parts(flavor: &'static dyn Flavor, package: Package, workspace: Workspace) -> Self {
        Self { flavor, package, workspace, plugin_files: vec![DEFAULT_PLUGIN_FILE.to_string()] }
    }

    pub fn with_workspace(mut self, workspace: Workspace) -> Self {
        self.workspace = workspace;
        self
    }

    /// Conventional plugin description file names, looked up in the package root.
    pub fn with_plugin_files(mut self, plugin_files: Vec<String>) -> Self {
        self.plugin_files = plugin_files;
        self
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn analyze(&self) -> Result<CMakeInfo, AnalysisError> {
        let package = &self.package;
        let build_file = package.build_file();
        if !build_file.is_file() {
            return Err(AnalysisError::MissingBuildFile { package: package.name.clone(), path: build_file });
        }
        log::info!("Analyzing package {} ({})", package.name, self.flavor.version());

        let content = read_listfile(&build_file).map_err(|source| AnalysisError::Io {
            package: package.name.clone(),
            path: build_file.clone(),
            source,
        })?;
        let directives = parse(&content, &build_file)
            .map_err(|source| AnalysisError::Parse { package: package.name.clone(), source })?;

        let mut variables = self.flavor.global_variables(package, &self.workspace);
        variables.set(KEY_CURRENT_LIST_FILE, build_file.to_string_lossy());
        variables.set(KEY_CURRENT_DIRECTORY, "");
        log::debug!("Initial variables:\n{variables}");

        let restrictions = self.flavor.path_restrictions(package, &self.workspace);
        let mut diagnostics = Diagnostics::default();
        let (targets, links) = {
            let mut interpreter = Interpreter::new(self.flavor, package, &restrictions, &mut diagnostics);
            interpreter.run(&directives, &mut variables)?;
            interpreter.into_parts()
        };

        let targets = attach_libraries(targets, links);
        let entries = plugins::entrypoints(package, &self.plugin_files);
        let (targets, reconciliation) = reconcile_plugins(&package.name, targets, &entries);

        Ok(CMakeInfo {
            cmake_file: build_file,
            targets,
            generated_sources: diagnostics.generated,
            unresolved_files: diagnostics.unresolved,
            unprocessed_commands: diagnostics.unprocessed,
            plugin_references: diagnostics.plugin_references,
            reconciliation,
        })
    }
}
