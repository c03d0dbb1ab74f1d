// SPDX-License-Identifier: GPL-3.0-or-later

//! Settings of the analysis and the report, read from `rostargets.yml`.
//!
//! Every setting has a built-in default, so the file is optional. Values
//! given on the command line override the ones read here.
//!
//! Unless `--config` names a file, the first `rostargets.yml` found is used,
//! looking in the invocation directory, then in the user's (local) config
//! directory, then in the application's (local) config directory.
//!
//! ```yaml
//! schema: 1.0
//!
//! analysis:
//!   ros: ros1
//!   plugin_files:
//!     - nodelet_plugins.xml
//!
//! workspace: /opt/ws
//!
//! output:
//!   pretty: true
//!   diagnostics: true
//! ```

pub use loader::{ConfigError, Loader};
pub use types::*;
pub use validation::Validator;

mod types {
    use crate::cmake::RosVersion;
    use crate::extractor::DEFAULT_PLUGIN_FILE;
    use serde::Deserialize;
    use std::fmt;
    use std::path::PathBuf;

    /// The whole configuration file.
    #[derive(Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Main {
        #[serde(deserialize_with = "validate_schema_version")]
        pub schema: String,
        #[serde(default)]
        pub analysis: Analysis,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub workspace: Option<PathBuf>,
        #[serde(default)]
        pub output: Output,
    }

    impl Default for Main {
        fn default() -> Self {
            Self {
                schema: String::from(SUPPORTED_SCHEMA_VERSION),
                analysis: Analysis::default(),
                workspace: None,
                output: Output::default(),
            }
        }
    }

    impl fmt::Display for Main {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let rendered = serde_yml::to_string(self).map_err(|_| fmt::Error)?;
            writeln!(f, "Effective configuration:")?;
            rendered.lines().try_for_each(|line| writeln!(f, "  {line}"))
        }
    }

    /// How the packages are evaluated.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Analysis {
        /// The ROS generation; detected from the environment when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ros: Option<RosVersion>,
        /// Plugin description file names looked up in the package root.
        #[serde(default = "default_plugin_files")]
        pub plugin_files: Vec<String>,
    }

    impl Default for Analysis {
        fn default() -> Self {
            Self { ros: None, plugin_files: default_plugin_files() }
        }
    }

    /// How the report is written.
    #[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
    pub struct Output {
        #[serde(default = "default_true")]
        pub pretty: bool,
        /// Include the unresolved, unprocessed and reconciliation records.
        #[serde(default = "default_true")]
        pub diagnostics: bool,
    }

    impl Default for Output {
        fn default() -> Self {
            Self { pretty: true, diagnostics: true }
        }
    }

    pub(super) const SUPPORTED_SCHEMA_VERSION: &str = "1.0";

    fn default_plugin_files() -> Vec<String> {
        vec![DEFAULT_PLUGIN_FILE.to_string()]
    }

    fn default_true() -> bool {
        true
    }

    fn validate_schema_version<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let version = String::deserialize(deserializer)?;
        if version == SUPPORTED_SCHEMA_VERSION {
            return Ok(version);
        }
        Err(serde::de::Error::custom(format!(
            "Unsupported schema version: {version} (this build reads {SUPPORTED_SCHEMA_VERSION})"
        )))
    }
}

pub mod validation {

    use super::types::*;
    use thiserror::Error;

    /// Semantic checks the deserializer cannot express.
    pub trait Validator<T> {
        type Error: std::error::Error;

        fn validate(config: &T) -> Result<(), Self::Error>;
    }

    #[derive(Debug, Error)]
    pub enum ValidationError {
        #[error("{field} must not be blank")]
        EmptyString { field: String },
        #[error("Workspace directory not found: '{path}'")]
        PathNotFound { path: String },
        #[error("{field} lists the same file again at position {idx}")]
        DuplicateEntry { field: &'static str, idx: usize },
        #[error("{} problems: {errors:?}", errors.len())]
        Multiple { errors: Vec<ValidationError> },
    }

    /// Gathers every problem of a section, so they are reported at once.
    #[derive(Default)]
    struct Problems(Vec<ValidationError>);

    impl Problems {
        fn push(&mut self, error: ValidationError) {
            self.0.push(error);
        }

        fn merge(&mut self, result: Result<(), ValidationError>) {
            match result {
                Ok(()) => {}
                Err(ValidationError::Multiple { errors }) => self.0.extend(errors),
                Err(error) => self.0.push(error),
            }
        }

        fn into_result(mut self) -> Result<(), ValidationError> {
            if self.0.len() > 1 {
                return Err(ValidationError::Multiple { errors: self.0 });
            }
            self.0.pop().map_or(Ok(()), Err)
        }
    }

    impl Validator<Main> for Main {
        type Error = ValidationError;

        fn validate(config: &Main) -> Result<(), Self::Error> {
            let mut problems = Problems::default();
            problems.merge(Analysis::validate(&config.analysis));
            if let Some(workspace) = config.workspace.as_ref().filter(|path| !path.is_dir()) {
                problems.push(ValidationError::PathNotFound { path: workspace.display().to_string() });
            }
            problems.into_result()
        }
    }

    impl Validator<Analysis> for Analysis {
        type Error = ValidationError;

        fn validate(config: &Analysis) -> Result<(), Self::Error> {
            let mut problems = Problems::default();
            let mut names = std::collections::HashSet::new();
            for (idx, name) in config.plugin_files.iter().enumerate() {
                if name.trim().is_empty() {
                    problems.push(ValidationError::EmptyString { field: format!("analysis.plugin_files[{idx}]") });
                } else if !names.insert(name.as_str()) {
                    problems.push(ValidationError::DuplicateEntry { field: "analysis.plugin_files", idx });
                }
            }
            problems.into_result()
        }
    }

}

pub mod loader {
    use super::{Main, Validator};
    use directories::{BaseDirs, ProjectDirs};
    use log::{debug, info};
    use std::fs::File;
    use std::path::{Path, PathBuf};
    use thiserror::Error;

    const CONFIG_FILE_NAME: &str = "rostargets.yml";

    pub struct Loader;

    impl Loader {
        /// The explicitly named file, or the first one found in the search path.
        ///
        /// No file at all is not an error: the built-in defaults are used.
        pub fn load(context: &crate::context::Context, filename: &Option<String>) -> Result<Main, ConfigError> {
            if let Some(explicit) = filename {
                return Self::from_file(Path::new(explicit));
            }
            match Self::file_locations(context).into_iter().find(|candidate| candidate.is_file()) {
                Some(found) => Self::from_file(&found),
                None => {
                    debug!("No {CONFIG_FILE_NAME} in the search path, using defaults");
                    Ok(Main::default())
                }
            }
        }

        fn file_locations(context: &crate::context::Context) -> Vec<PathBuf> {
            let mut directories = vec![context.current_directory.clone()];
            if let Some(base) = BaseDirs::new() {
                directories.extend([base.config_local_dir().to_path_buf(), base.config_dir().to_path_buf()]);
            }
            if let Some(project) = ProjectDirs::from("io.github", "rostargets", "rostargets") {
                directories.extend([project.config_local_dir().to_path_buf(), project.config_dir().to_path_buf()]);
            }
            directories.dedup();
            directories.into_iter().map(|directory| directory.join(CONFIG_FILE_NAME)).collect()
        }

        /// Reads and validates one configuration file.
        pub fn from_file(path: &Path) -> Result<Main, ConfigError> {
            info!("Reading configuration from {}", path.display());
            let owned = || path.to_path_buf();

            let file = File::open(path).map_err(|source| ConfigError::FileAccess { path: owned(), source })?;
            let config: Main =
                Self::from_reader(file).map_err(|source| ConfigError::ParseError { path: owned(), source })?;
            Main::validate(&config).map_err(|source| ConfigError::ValidationError { path: owned(), source })?;
            Ok(config)
        }

        fn from_reader<R: std::io::Read, T: serde::de::DeserializeOwned>(reader: R) -> serde_yml::Result<T> {
            serde_yml::from_reader(reader)
        }
    }

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("Cannot open configuration file '{path}': {source}")]
        FileAccess {
            path: PathBuf,
            #[source]
            source: std::io::Error,
        },
        #[error("Malformed configuration file '{path}': {source}")]
        ParseError {
            path: PathBuf,
            #[source]
            source: serde_yml::Error,
        },
        #[error("Invalid configuration in '{path}': {source}")]
        ValidationError {
            path: PathBuf,
            #[source]
            source: crate::config::validation::ValidationError,
        },
    }

}
