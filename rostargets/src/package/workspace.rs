// SPDX-License-Identifier: GPL-3.0-or-later

//! Locates the workspace a package belongs to.
//!
//! catkin workspaces are marked by a `.catkin_workspace` file or a
//! `.catkin_tools` directory at their root. colcon leaves `COLCON_IGNORE`
//! files in the build, install and log directories it creates.

use std::path::{Path, PathBuf};

const CATKIN_MARKERS: [&str; 2] = [".catkin_workspace", ".catkin_tools"];
const COLCON_MARKERS: [&str; 3] = ["build/COLCON_IGNORE", "install/COLCON_IGNORE", "log/COLCON_IGNORE"];
const DEVEL_DIRECTORIES: [&str; 3] = ["devel", "devel_isolated", "install"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Walks upward from the package root to the first directory with a workspace marker.
    pub fn locate(package_root: &Path) -> Option<Self> {
        package_root
            .ancestors()
            .find(|candidate| is_workspace_root(candidate))
            .map(Self::new)
    }

    /// The first existing devel or install space of the workspace.
    pub fn devel_space(&self) -> Option<PathBuf> {
        DEVEL_DIRECTORIES
            .iter()
            .map(|name| self.root.join(name))
            .find(|candidate| candidate.is_dir())
    }

    /// The exported header directories of the package in the devel and install spaces.
    pub fn include_directories(&self, package: &str) -> Vec<PathBuf> {
        DEVEL_DIRECTORIES
            .iter()
            .map(|name| self.root.join(name).join("include").join(package))
            .filter(|candidate| candidate.is_dir())
            .collect()
    }

    pub fn build_space(&self) -> PathBuf {
        self.root.join("build")
    }

    pub fn install_space(&self) -> PathBuf {
        self.root.join("install")
    }
}

fn is_workspace_root(candidate: &Path) -> bool {
    CATKIN_MARKERS.iter().chain(COLCON_MARKERS.iter()).any(|marker| candidate.join(marker).exists())
}
