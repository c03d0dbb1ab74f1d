// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cmake::RosVersion;
use crate::environment;
use crate::environment::KEY_ROS__VERSION;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

/// The invocation directory and environment, captured once at startup.
///
/// Mode selection reads from here instead of the process state.
#[derive(Debug, Clone)]
pub struct Context {
    pub current_directory: PathBuf,
    pub environment: HashMap<String, String>,
}

impl Context {
    pub fn capture() -> Result<Self> {
        let current_directory = env::current_dir().context("Cannot determine the invocation directory")?;
        Ok(Context { current_directory, environment: env::vars().collect() })
    }

    /// The ROS generation the sourced workspace setup announces.
    ///
    /// Only ROS 2 setups export `ROS_VERSION`; an unknown value is ignored.
    pub fn ros_version(&self) -> Option<RosVersion> {
        let value = self.environment.get(KEY_ROS__VERSION)?;
        match value.trim().parse() {
            Ok(version) => Some(version),
            Err(message) => {
                log::debug!("Ignoring {KEY_ROS__VERSION}: {message}");
                None
            }
        }
    }

    /// Makes a command line path absolute against the invocation directory.
    pub fn absolute(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() { path.to_path_buf() } else { self.current_directory.join(path) }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Invoked from {}", self.current_directory.display())?;
        let mut ros: Vec<_> = self.environment.iter().filter(|(key, _)| environment::relevant_env(key)).collect();
        ros.sort();
        writeln!(f, "ROS environment ({} of {} variables):", ros.len(), self.environment.len())?;
        ros.into_iter().try_for_each(|(key, value)| writeln!(f, "  {key}={value}"))
    }
}
