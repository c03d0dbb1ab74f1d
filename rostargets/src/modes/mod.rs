// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cmake::{self, CMakeInfo, RosVersion};
use crate::context::Context;
use crate::extractor::{AnalysisError, Extractor};
use crate::output::{AnalysisStatistics, ReportWriter, WriterCreationError, WriterError};
use crate::package::workspace::Workspace;
use crate::{args, config};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// What one invocation does with the analyzed package.
///
/// `Analyze` writes the JSON report, `List` prints a summary table.
pub enum Mode {
    Analyze(Extractor, ReportWriter),
    List(Extractor),
}

impl Mode {
    /// Turns the arguments and the configuration into a runnable mode.
    ///
    /// Everything that can be checked before reading the listfiles is
    /// checked here: the package directory and the output location.
    pub fn configure(
        context: Context,
        args: args::Arguments,
        config: config::Main,
    ) -> Result<Self, ConfigurationError> {
        let version = select_version(&context, &args, &config);
        log::debug!("ROS version: {version}");

        let workspace = args
            .workspace
            .as_deref()
            .map(|path| context.absolute(path))
            .or_else(|| config.workspace.clone())
            .map(Workspace::new);

        let create_extractor = |package: &PathBuf| -> Result<Extractor, ConfigurationError> {
            let root = context
                .absolute(package)
                .canonicalize()
                .map_err(|source| ConfigurationError::PackageNotFound { path: package.clone(), source })?;
            if !root.is_dir() {
                return Err(ConfigurationError::InvalidConfiguration(format!(
                    "Package path is not a directory: {}",
                    root.display()
                )));
            }
            let extractor = Extractor::new(cmake::flavor(version), root)
                .map_err(ConfigurationError::ExtractorCreation)?
                .with_plugin_files(config.analysis.plugin_files.clone());
            let extractor = match &workspace {
                Some(workspace) => extractor.with_workspace(workspace.clone()),
                None => extractor,
            };
            log::info!(
                "Package {} in workspace {}",
                extractor.package().name,
                extractor.workspace().root.display()
            );
            Ok(extractor)
        };

        match &args.mode {
            args::Mode::Analyze { package, output } => {
                log::debug!("Analyzing {} into {}", package.display(), output.file_name);
                let extractor = create_extractor(package)?;
                let writer = ReportWriter::try_from((output, &config.output))
                    .map_err(ConfigurationError::ConsumerCreation)?;

                Ok(Self::Analyze(extractor, writer))
            }
            args::Mode::List { package } => {
                log::debug!("Listing the targets of {}", package.display());
                Ok(Self::List(create_extractor(package)?))
            }
        }
    }

    /// Failures from here on are logged and turned into a failing exit code.
    pub fn run(self) -> ExitCode {
        let status = match self {
            Self::Analyze(extractor, writer) => analyze(&extractor, writer),
            Self::List(extractor) => list(&extractor),
        };
        match status {
            Ok(code) => code,
            Err(error) => {
                log::error!("rostargets: {error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// The ROS generation from the first source that names one.
///
/// The command line wins over the configuration file, which wins over the
/// environment of a sourced workspace.
fn select_version(context: &Context, args: &args::Arguments, config: &config::Main) -> RosVersion {
    args.ros.or(config.analysis.ros).or_else(|| context.ros_version()).unwrap_or_default()
}

fn analyze(extractor: &Extractor, writer: ReportWriter) -> Result<ExitCode, RunError> {
    let info = extractor.analyze()?;
    writer.write(&info)?;
    Ok(ExitCode::SUCCESS)
}

fn list(extractor: &Extractor) -> Result<ExitCode, RunError> {
    let info = extractor.analyze()?;
    write_listing(io::stdout().lock(), &info)?;
    Ok(ExitCode::SUCCESS)
}

/// One line per target, aliases pointing at the target they stand for.
fn write_listing(mut writer: impl Write, info: &CMakeInfo) -> io::Result<()> {
    for (key, target) in &info.targets {
        if key != &target.name {
            writeln!(writer, "{:<18} {} -> {}", "alias", key, target.name)?;
            continue;
        }
        writeln!(
            writer,
            "{:<18} {} ({}, {} sources)",
            target.kind_name(),
            key,
            target.language,
            target.sources.len()
        )?;
    }
    writeln!(writer, "{}", AnalysisStatistics::from(info))?;
    writer.flush()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Package directory {path} is not accessible: {source}")]
    PackageNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot read the package: {0}")]
    ExtractorCreation(AnalysisError),
    #[error("Cannot set up the report: {0}")]
    ConsumerCreation(WriterCreationError),
    #[error("{0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error("Failed to print the listing: {0}")]
    Io(#[from] io::Error),
}
