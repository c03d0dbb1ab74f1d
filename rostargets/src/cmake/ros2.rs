// SPDX-License-Identifier: GPL-3.0-or-later

//! ament based packages.

use super::arguments::{OptionRule, OptionSchema};
use super::directives::COMMON;
use super::interpreter::{DirectiveError, Interpreter};
use super::model::{SourceLanguage, Target, TargetKind};
use super::registry::CommandRegistry;
use super::variables::{
    DUMMY_VALUE, KEY_BINARY_DIR, KEY_CURRENT_BINARY_DIR, KEY_CURRENT_SOURCE_DIR, KEY_INSTALL_PREFIX,
    KEY_PROJECT_NAME, KEY_PROJECT_SOURCE_DIR, KEY_PROJECT_VERSION, KEY_SOURCE_DIR, Variables,
};
use super::{Flavor, RosVersion};
use crate::extractor::AnalysisError;
use crate::package::Package;
use crate::package::workspace::Workspace;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::LazyLock;

/// The file that makes a directory a python package.
const PACKAGE_MARKER: &str = "__init__.py";

static REGISTRY: LazyLock<CommandRegistry> = LazyLock::new(|| {
    let mut registry = CommandRegistry::with_parent(&COMMON);
    registry
        .register(&["ament_python_install_package"], ament_python_install_package)
        .register(&["rclcpp_components_register_node"], rclcpp_components_register_node)
        .register(&["rclcpp_components_register_nodes"], rclcpp_components_register_nodes);
    registry
});

#[derive(Debug, Default, Clone, Copy)]
pub struct Ros2;

impl Flavor for Ros2 {
    fn version(&self) -> RosVersion {
        RosVersion::Ros2
    }

    fn registry(&self) -> &'static CommandRegistry {
        &REGISTRY
    }

    fn global_variables(&self, package: &Package, workspace: &Workspace) -> Variables {
        let root = package.root.to_string_lossy().into_owned();
        let binary_dir = workspace.build_space().join(&package.name).to_string_lossy().into_owned();
        let install_prefix = workspace.install_space().join(&package.name).to_string_lossy().into_owned();

        [
            (KEY_SOURCE_DIR, root.clone()),
            (KEY_PROJECT_SOURCE_DIR, root.clone()),
            (KEY_CURRENT_SOURCE_DIR, root),
            (KEY_PROJECT_VERSION, DUMMY_VALUE.to_string()),
            (KEY_PROJECT_NAME, package.name.clone()),
            (KEY_BINARY_DIR, binary_dir.clone()),
            (KEY_CURRENT_BINARY_DIR, binary_dir),
            (KEY_INSTALL_PREFIX, install_prefix),
        ]
        .into_iter()
        .collect()
    }

    fn path_restrictions(&self, package: &Package, _: &Workspace) -> BTreeSet<PathBuf> {
        BTreeSet::from([package.root.clone()])
    }
}

const AMENT_PYTHON_INSTALL_PACKAGE: OptionSchema = OptionSchema::new(&[
    OptionRule::single("PACKAGE_DIR"),
    OptionRule::single("VERSION"),
    OptionRule::single("SETUP_CFG"),
    OptionRule::single("SCRIPTS_DESTINATION"),
    OptionRule::flag("SKIP_COMPILE"),
]);

/// Installs a directory as a python module; its top-level files are the library sources.
fn ament_python_install_package(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &AMENT_PYTHON_INSTALL_PACKAGE);
    let name = positional.first().ok_or(DirectiveError::MissingArgument("package name"))?;
    let directory = options.single("PACKAGE_DIR").unwrap_or(name);

    let relative = interpreter.package_relative(variables, directory);
    let absolute = interpreter.package().root.join(&relative);
    let package = interpreter.package().name.clone();
    if !absolute.is_dir() {
        return Err(AnalysisError::MissingPythonPackage { package, path: absolute }.into());
    }
    if !absolute.join(PACKAGE_MARKER).is_file() {
        return Err(AnalysisError::MissingPackageMarker { package, path: absolute.join(PACKAGE_MARKER) }.into());
    }

    let entries =
        std::fs::read_dir(&absolute).map_err(|source| DirectiveError::Io { path: absolute.clone(), source })?;
    let sources = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "py"))
        .filter(|path| path.file_name().is_some_and(|file| file != PACKAGE_MARKER))
        .filter_map(|path| path.file_name().map(|file| relative.join(file)))
        .collect();

    let target = interpreter.new_target(variables, name, SourceLanguage::Python, sources, TargetKind::IncompleteLibrary);
    interpreter.insert_target(Target { includes: vec![], ..target });
    Ok(())
}

const RCLCPP_COMPONENTS_REGISTER_NODE: OptionSchema = OptionSchema::new(&[
    OptionRule::single("PLUGIN"),
    OptionRule::single("EXECUTABLE"),
    OptionRule::single("RESOURCE_INDEX"),
    OptionRule::single("EXECUTOR"),
]);

/// Registers a component and the executable that runs it.
fn rclcpp_components_register_node(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, _) = interpreter.split(arguments, &RCLCPP_COMPONENTS_REGISTER_NODE);
    let (Some(plugin), Some(executable)) = (options.single("PLUGIN"), options.single("EXECUTABLE")) else {
        return Err(DirectiveError::MissingOption("PLUGIN and EXECUTABLE"));
    };

    let sources = BTreeSet::from([PathBuf::from(plugin)]);
    let target = interpreter.new_target(
        variables,
        executable,
        SourceLanguage::Cxx,
        sources,
        TargetKind::Binary { libraries: vec![] },
    );
    interpreter.insert_target(target);
    Ok(())
}

const RCLCPP_COMPONENTS_REGISTER_NODES: OptionSchema = OptionSchema::new(&[OptionRule::single("RESOURCE_INDEX")]);

fn rclcpp_components_register_nodes(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &RCLCPP_COMPONENTS_REGISTER_NODES);
    let name = positional.first().ok_or(DirectiveError::MissingArgument("target name"))?;

    let sources = positional[1..].iter().map(PathBuf::from).collect();
    let target = interpreter.new_target(
        variables,
        name,
        SourceLanguage::Cxx,
        sources,
        TargetKind::Binary { libraries: vec![] },
    );
    interpreter.insert_target(target);
    Ok(())
}
