// SPDX-License-Identifier: GPL-3.0-or-later

//! ament specific directives.

use crate::fixtures::*;
use anyhow::Result;
use rostargets::cmake::{RosVersion, SourceLanguage, TargetKind};
use rostargets::cmake::model::ReconciliationIssue;
use rostargets::extractor::AnalysisError;

#[test]
fn missing_python_package_is_fatal() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    env.create_package("demo", &[("CMakeLists.txt", "ament_python_install_package(${PROJECT_NAME})\n")])?;

    let result = env.analyze("demo", RosVersion::Ros2);

    match result {
        Err(AnalysisError::MissingPythonPackage { package, path }) => {
            assert_eq!(package, "demo");
            assert_eq!(path, env.package_root("demo").join("demo"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_package_marker_is_fatal() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    env.create_package(
        "demo",
        &[("CMakeLists.txt", "ament_python_install_package(demo)\n"), ("demo/module.py", "")],
    )?;

    let result = env.analyze("demo", RosVersion::Ros2);

    assert!(matches!(result, Err(AnalysisError::MissingPackageMarker { .. })));
    Ok(())
}

#[test]
fn python_package_becomes_a_library() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    env.create_package(
        "demo",
        &[
            ("CMakeLists.txt", "ament_python_install_package(demo)\n"),
            ("demo/__init__.py", ""),
            ("demo/talker.py", ""),
            ("demo/listener.py", ""),
            ("demo/data.yaml", ""),
        ],
    )?;

    let info = env.analyze("demo", RosVersion::Ros2)?;

    let library = &info.targets["demo"];
    assert_eq!(library.language, SourceLanguage::Python);
    assert!(library.is_incomplete());
    assert_eq!(sources(library), vec!["demo/listener.py", "demo/talker.py"]);
    assert_eq!(
        info.reconciliation,
        vec![ReconciliationIssue::IncompleteTarget { package: "demo".into(), target: "demo".into() }]
    );
    Ok(())
}

#[test]
fn registered_component_node() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    let content = r#"
add_library(talker_component SHARED src/talker.cpp)
rclcpp_components_register_node(talker_component PLUGIN "demo::Talker" EXECUTABLE talker)
rclcpp_components_register_node(talker_component PLUGIN "demo::Incomplete")
"#;
    env.create_package("demo", &[("CMakeLists.txt", content), ("src/talker.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros2)?;

    let talker = &info.targets["talker"];
    assert_eq!(talker.kind, TargetKind::Binary { libraries: vec![] });
    assert_eq!(talker.cmakelists_line, 3);
    assert!(info.targets["talker_component"].is_incomplete());
    assert_eq!(info.unprocessed_commands.len(), 1);
    assert_eq!(info.unprocessed_commands[0].cmake_line, 4);
    Ok(())
}

#[test]
fn install_prefix_is_set() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    let content = "add_executable(foo foo.cpp ${CMAKE_INSTALL_PREFIX}/share/foo.cpp)\n";
    env.create_package("demo", &[("CMakeLists.txt", content), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros2)?;

    let expected = env.root().join("install").join("demo").join("share").join("foo.cpp");
    assert_eq!(info.unresolved_files[0].path, expected.to_string_lossy());
    Ok(())
}
