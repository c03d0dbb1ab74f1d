// SPDX-License-Identifier: GPL-3.0-or-later

use std::collections::HashSet;
use std::sync::LazyLock;

// exported by the setup scripts of every distribution
pub const KEY_ROS__VERSION: &str = "ROS_VERSION";
pub const KEY_ROS__DISTRO: &str = "ROS_DISTRO";
pub const KEY_ROS__PACKAGE_PATH: &str = "ROS_PACKAGE_PATH";

// colcon and ament setup scripts
pub const KEY_AMENT__PREFIX_PATH: &str = "AMENT_PREFIX_PATH";
// catkin setup scripts
pub const KEY_CMAKE__PREFIX_PATH: &str = "CMAKE_PREFIX_PATH";

static ROS_KEYS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [KEY_ROS__VERSION, KEY_ROS__DISTRO, KEY_ROS__PACKAGE_PATH].iter().cloned().collect()
});

static PREFIX_KEYS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| [KEY_AMENT__PREFIX_PATH, KEY_CMAKE__PREFIX_PATH].iter().cloned().collect());

/// Environment variables that the setup scripts of a ROS workspace export.
pub fn relevant_env(key: &str) -> bool {
    ROS_KEYS.contains(key) || PREFIX_KEYS.contains(key)
}
