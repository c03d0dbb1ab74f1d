// SPDX-License-Identifier: GPL-3.0-or-later

//! catkin based packages.

use super::arguments::{OptionRule, OptionSchema};
use super::directives::COMMON;
use super::interpreter::{DirectiveError, Interpreter};
use super::model::{SourceLanguage, TargetKind};
use super::registry::CommandRegistry;
use super::variables::{
    DUMMY_VALUE, KEY_BINARY_DIR, KEY_CATKIN_DEVEL_PREFIX, KEY_CURRENT_BINARY_DIR, KEY_CURRENT_SOURCE_DIR,
    KEY_PROJECT_NAME, KEY_PROJECT_SOURCE_DIR, KEY_PROJECT_VERSION, KEY_SOURCE_DIR, Variables,
};
use super::{Flavor, RosVersion};
use crate::package::Package;
use crate::package::workspace::Workspace;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// The directory catkin scripts must be installed from to count as nodes.
const NODES_DIRECTORY: &str = "nodes";

static REGISTRY: LazyLock<CommandRegistry> = LazyLock::new(|| {
    let mut registry = CommandRegistry::with_parent(&COMMON);
    registry.register(&["catkin_install_python"], catkin_install_python);
    registry
});

#[derive(Debug, Default, Clone, Copy)]
pub struct Ros1;

impl Flavor for Ros1 {
    fn version(&self) -> RosVersion {
        RosVersion::Ros1
    }

    fn registry(&self) -> &'static CommandRegistry {
        &REGISTRY
    }

    fn global_variables(&self, package: &Package, workspace: &Workspace) -> Variables {
        let root = package.root.to_string_lossy().into_owned();
        let devel_space = workspace.devel_space().unwrap_or_else(|| {
            log::warn!("No devel space in workspace {}", workspace.root.display());
            workspace.root.join("devel")
        });
        let binary_dir = workspace.build_space();

        [
            (KEY_SOURCE_DIR, root.clone()),
            (KEY_PROJECT_SOURCE_DIR, root.clone()),
            (KEY_CURRENT_SOURCE_DIR, root),
            (KEY_PROJECT_VERSION, DUMMY_VALUE.to_string()),
            ("CATKIN_GLOBAL_INCLUDE_DESTINATION", "/include".to_string()),
            ("PYTHON_EXT_SUFFIX", String::new()),
            (KEY_CATKIN_DEVEL_PREFIX, path_value(&devel_space.join(&package.name))),
            (KEY_BINARY_DIR, path_value(&binary_dir)),
            (KEY_CURRENT_BINARY_DIR, path_value(&binary_dir.join(&package.name))),
            // project() rebinds it
            (KEY_PROJECT_NAME, package.name.clone()),
        ]
        .into_iter()
        .collect()
    }

    fn path_restrictions(&self, package: &Package, workspace: &Workspace) -> BTreeSet<PathBuf> {
        let mut paths = BTreeSet::from([package.root.clone()]);
        paths.extend(workspace.include_directories(&package.name));
        paths
    }
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

const CATKIN_INSTALL_PYTHON: OptionSchema = OptionSchema::new(&[
    OptionRule::multi("PROGRAMS"),
    OptionRule::single("DESTINATION"),
    OptionRule::flag("OPTIONAL"),
]);

/// Installed python scripts from the `nodes` directory are nodes; other scripts are helpers.
fn catkin_install_python(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, _) = interpreter.split(arguments, &CATKIN_INSTALL_PYTHON);
    let programs = options.multi("PROGRAMS").ok_or(DirectiveError::MissingOption("PROGRAMS"))?;

    for program in programs {
        let path = Path::new(program);
        let is_node = path.components().any(|component| component == Component::Normal(OsStr::new(NODES_DIRECTORY)));
        let Some(name) = path.file_name().map(|name| name.to_string_lossy().into_owned()) else {
            continue;
        };
        if !is_node {
            log::debug!("Skipping python script {program}, it is not installed from a nodes directory");
            continue;
        }

        let sources = interpreter.resolve(variables, program).into_iter().collect();
        let target = interpreter.new_target(
            variables,
            &name,
            SourceLanguage::Python,
            sources,
            TargetKind::Binary { libraries: vec![] },
        );
        interpreter.insert_target(target);
    }
    Ok(())
}
