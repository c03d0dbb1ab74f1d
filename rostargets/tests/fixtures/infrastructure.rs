// SPDX-License-Identifier: GPL-3.0-or-later

//! Test infrastructure for the integration tests.
//!
//! Every test works in its own temporary workspace. Packages are created
//! under `src/`, the way catkin and colcon workspaces lay them out.

use anyhow::{Context, Result};
use assert_cmd::Command;
use rostargets::cmake::{self, CMakeInfo, RosVersion, Target};
use rostargets::extractor::{AnalysisError, Extractor};
use std::fs;
use std::path::{Path, PathBuf};

/// Test environment: a temporary workspace with packages in it.
#[derive(Debug)]
pub struct TestEnvironment {
    temp_dir: tempfile::TempDir,
}

impl TestEnvironment {
    /// Create a new catkin workspace
    pub fn new() -> Result<Self> {
        let temp_dir = tempfile::TempDir::new().with_context(|| "Failed to create temp dir")?;
        fs::write(temp_dir.path().join(".catkin_workspace"), "")?;
        Ok(Self { temp_dir })
    }

    /// Create a new colcon workspace
    pub fn new_colcon() -> Result<Self> {
        let temp_dir = tempfile::TempDir::new().with_context(|| "Failed to create temp dir")?;
        for directory in ["build", "install", "log"] {
            fs::create_dir_all(temp_dir.path().join(directory))?;
            fs::write(temp_dir.path().join(directory).join("COLCON_IGNORE"), "")?;
        }
        Ok(Self { temp_dir })
    }

    /// The workspace root
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The root of a package in the workspace
    pub fn package_root(&self, name: &str) -> PathBuf {
        self.root().join("src").join(name)
    }

    /// Create a package with a manifest and the given files
    pub fn create_package(&self, name: &str, files: &[(&str, &str)]) -> Result<PathBuf> {
        let root = self.package_root(name);
        fs::create_dir_all(&root).with_context(|| format!("Failed to create package: {name}"))?;
        fs::write(root.join("package.xml"), manifest(name, ""))?;
        self.create_files(name, files)?;
        Ok(root)
    }

    /// Create files in a package, directories included
    pub fn create_files(&self, package: &str, files: &[(&str, &str)]) -> Result<()> {
        let root = self.package_root(package);
        for (path, content) in files {
            let file_path = root.join(path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent).with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            fs::write(&file_path, content).with_context(|| format!("Failed to write file: {}", path))?;
        }
        Ok(())
    }

    /// Run the analysis of a package through the library
    pub fn analyze(&self, package: &str, version: RosVersion) -> Result<CMakeInfo, AnalysisError> {
        Extractor::new(cmake::flavor(version), self.package_root(package))?.analyze()
    }

    /// The binary, started from the workspace root with a clean ROS environment
    pub fn command(&self) -> Result<Command> {
        let mut command = Command::cargo_bin("rostargets")?;
        command
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .env_remove("ROS_VERSION")
            .env_remove("ROS_DISTRO")
            .env("XDG_CONFIG_HOME", self.root().join(".config"));
        Ok(command)
    }
}

/// A package manifest in format 2
pub fn manifest(name: &str, exports: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<package format="2">
  <name>{name}</name>
  <version>0.1.0</version>
  <description>The {name} package</description>
  <maintainer email="dev@example.com">dev</maintainer>
  <license>BSD</license>
  <buildtool_depend>catkin</buildtool_depend>
  <export>{exports}</export>
</package>
"#
    )
}

/// A nodelet plugin description with one class per library
pub fn nodelet_plugins(entries: &[(&str, &str, &str)]) -> String {
    let libraries: String = entries
        .iter()
        .map(|(path, name, type_)| {
            format!(
                "  <library path=\"{path}\">\n    <class name=\"{name}\" type=\"{type_}\" base_class_type=\"nodelet::Nodelet\"/>\n  </library>\n"
            )
        })
        .collect();
    format!("<class_libraries>\n{libraries}</class_libraries>\n")
}

/// The sources of a target, as sorted strings
pub fn sources(target: &Target) -> Vec<String> {
    target.sources.iter().map(|path| path.to_string_lossy().into_owned()).collect()
}
