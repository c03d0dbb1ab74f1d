// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line of `rostargets`, built with `clap`.
//!
//! [`Arguments`] is one invocation: the global options plus the selected mode.

use crate::cmake::RosVersion;
use anyhow::anyhow;
use clap::{ArgAction, ArgMatches, Command, arg, command, value_parser};
use std::fmt;
use std::path::PathBuf;

const MODE_ANALYZE_SUBCOMMAND: &str = "analyze";
const MODE_LIST_SUBCOMMAND: &str = "list";
const DEFAULT_OUTPUT_FILE: &str = "targets.json";
/// The output file name that stands for the standard output.
pub const STDOUT_FILE_NAME: &str = "-";

#[derive(Debug, PartialEq)]
pub struct Arguments {
    /// `-c`, bypasses the configuration search.
    pub config: Option<String>,
    pub ros: Option<RosVersion>,
    pub workspace: Option<PathBuf>,
    pub verbose: u8,
    pub mode: Mode,
}

#[derive(Debug, PartialEq)]
pub enum Mode {
    Analyze { package: PathBuf, output: Report },
    List { package: PathBuf },
}

/// Where the analysis report goes.
#[derive(Debug, PartialEq)]
pub struct Report {
    pub file_name: String,
}

impl Report {
    pub fn is_stdout(&self) -> bool {
        self.file_name == STDOUT_FILE_NAME
    }
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let config = matches.get_one::<String>("config").cloned();
        let ros = matches
            .get_one::<String>("ros")
            .map(|value| value.parse::<RosVersion>().map_err(|message| anyhow!(message)))
            .transpose()?;
        let workspace = matches.get_one::<PathBuf>("workspace").cloned();
        let verbose = matches.get_count("verbose");

        let mode = match matches.subcommand() {
            Some((MODE_ANALYZE_SUBCOMMAND, analyze_matches)) => Mode::try_from(analyze_matches)?,
            Some((MODE_LIST_SUBCOMMAND, list_matches)) => {
                let package = package_argument(list_matches)?;
                Mode::List { package }
            }
            None => Mode::try_from(&matches)?,
            _ => return Err(anyhow!("unrecognized subcommand")),
        };
        Ok(Arguments { config, ros, workspace, verbose, mode })
    }
}

impl TryFrom<&ArgMatches> for Mode {
    type Error = anyhow::Error;

    fn try_from(matches: &ArgMatches) -> Result<Self, Self::Error> {
        let package = package_argument(matches)?;
        let file_name = matches
            .get_one::<String>("output")
            .map(String::to_string)
            .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
        Ok(Mode::Analyze { package, output: Report { file_name } })
    }
}

fn package_argument(matches: &ArgMatches) -> anyhow::Result<PathBuf> {
    matches.get_one::<PathBuf>("PACKAGE").cloned().ok_or_else(|| anyhow!("missing package directory"))
}

impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments:")?;
        if let Some(config) = &self.config {
            writeln!(f, "  config: {config}")?;
        }
        if let Some(ros) = &self.ros {
            writeln!(f, "  ros: {ros}")?;
        }
        if let Some(workspace) = &self.workspace {
            writeln!(f, "  workspace: {}", workspace.display())?;
        }
        match &self.mode {
            Mode::Analyze { package, output } => {
                write!(f, "  mode: analyze {} -> {}", package.display(), output.file_name)
            }
            Mode::List { package } => write!(f, "  mode: list {}", package.display()),
        }
    }
}

/// The `clap` command.
///
/// Without a subcommand the package is analyzed and the report is written,
/// the same as the `analyze` subcommand does.
pub fn cli() -> Command {
    command!()
        .subcommand_required(false)
        .subcommand_negates_reqs(true)
        .subcommand_precedence_over_arg(true)
        .arg_required_else_help(true)
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count).global(true),
            arg!(-c --config <FILE> "Path of the config file").global(true),
            arg!(--ros <VERSION> "ROS generation of the package (ros1 or ros2)").global(true),
            arg!(--workspace <DIR> "Root of the enclosing workspace")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        ])
        .subcommand(
            Command::new(MODE_ANALYZE_SUBCOMMAND)
                .about("writes the targets of a package as a JSON report")
                .args(&[
                    arg!(<PACKAGE> "Package directory").value_parser(value_parser!(PathBuf)),
                    arg!(-o --output <FILE> "Path of the report file, `-' for the standard output")
                        .default_value(DEFAULT_OUTPUT_FILE)
                        .hide_default_value(false),
                ])
                .arg_required_else_help(true),
        )
        .subcommand(
            Command::new(MODE_LIST_SUBCOMMAND)
                .about("prints a summary of the targets of a package")
                .arg(arg!(<PACKAGE> "Package directory").value_parser(value_parser!(PathBuf)))
                .arg_required_else_help(true),
        )
        .args(&[
            arg!(<PACKAGE> "Package directory").value_parser(value_parser!(PathBuf)),
            arg!(-o --output <FILE> "Path of the report file, `-' for the standard output")
                .default_value(DEFAULT_OUTPUT_FILE)
                .hide_default_value(false),
        ])
}
