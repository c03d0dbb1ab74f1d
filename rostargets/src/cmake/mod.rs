// SPDX-License-Identifier: GPL-3.0-or-later

//! Static evaluation of CMake listfiles.
//!
//! The module recovers the build targets of a package from its listfiles
//! without running CMake. Only the directives that declare targets, sources
//! and the variables feeding them are evaluated; everything else is recorded
//! as unprocessed.
//!
//! The main abstractions are:
//! - [`parser`]: turns listfile text into directives.
//! - [`Interpreter`]: evaluates directives with a variable environment.
//! - [`CommandRegistry`]: maps directive names to handlers, layered per flavor.
//! - [`Flavor`]: the ROS generation specific parts (globals, extra directives).
//! - [`reconcile`]: merges plugin descriptions into the targets.

pub mod arguments;
pub mod directives;
pub mod interpreter;
pub mod model;
pub mod parser;
pub mod reconcile;
pub mod registry;
pub mod resolver;
pub mod ros1;
pub mod ros2;
pub mod variables;

pub use interpreter::{DirectiveError, Interpreter};
pub use model::{CMakeInfo, SourceLanguage, Target, TargetKind};
pub use parser::{Directive, ParseError};
pub use registry::CommandRegistry;
pub use variables::Variables;

use crate::package::Package;
use crate::package::workspace::Workspace;
use arguments::{ArgumentSplitter, KeywordSplitter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// The ROS generation the package is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum RosVersion {
    #[default]
    #[serde(rename = "ros1")]
    Ros1,
    #[serde(rename = "ros2")]
    Ros2,
}

impl FromStr for RosVersion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "ros1" | "1" | "catkin" => Ok(RosVersion::Ros1),
            "ros2" | "2" | "ament" => Ok(RosVersion::Ros2),
            other => Err(format!("unknown ROS version: {other}")),
        }
    }
}

impl std::fmt::Display for RosVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosVersion::Ros1 => write!(f, "ros1"),
            RosVersion::Ros2 => write!(f, "ros2"),
        }
    }
}

/// The parts of the evaluation that differ between ROS generations.
pub trait Flavor {
    fn version(&self) -> RosVersion;

    /// The directive handlers, including the inherited common ones.
    fn registry(&self) -> &'static CommandRegistry;

    /// The environment a package's root listfile starts with.
    fn global_variables(&self, package: &Package, workspace: &Workspace) -> Variables;

    /// Directories the sources of every target must belong to.
    fn path_restrictions(&self, package: &Package, workspace: &Workspace) -> BTreeSet<PathBuf>;

    fn splitter(&self) -> &dyn ArgumentSplitter {
        &KeywordSplitter
    }
}

pub fn flavor(version: RosVersion) -> &'static dyn Flavor {
    match version {
        RosVersion::Ros1 => &ros1::Ros1,
        RosVersion::Ros2 => &ros2::Ros2,
    }
}

/// Reads a listfile. Content that is not UTF-8 is decoded as Windows-1252.
///
/// A leading byte order mark is dropped.
pub fn read_listfile(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(error) => {
            log::debug!("{} is not UTF-8 encoded, decoding it as Windows-1252", path.display());
            let (content, _, _) = encoding_rs::WINDOWS_1252.decode(error.as_bytes());
            content.into_owned()
        }
    };
    match content.strip_prefix('\u{feff}') {
        Some(stripped) => Ok(stripped.to_string()),
        None => Ok(content),
    }
}
