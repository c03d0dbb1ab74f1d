// SPDX-License-Identifier: GPL-3.0-or-later

//! catkin specific directives and variables.

use crate::fixtures::*;
use anyhow::Result;
use rostargets::cmake::{RosVersion, SourceLanguage, TargetKind};
use std::fs;

#[test]
fn python_nodes_become_binaries() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = r#"
catkin_install_python(PROGRAMS nodes/talker scripts/helper.py
  DESTINATION ${CATKIN_PACKAGE_BIN_DESTINATION})
"#;
    env.create_package("demo", &[("CMakeLists.txt", content), ("nodes/talker", ""), ("scripts/helper.py", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(info.targets.keys().collect::<Vec<_>>(), vec!["talker"]);
    let talker = &info.targets["talker"];
    assert_eq!(talker.language, SourceLanguage::Python);
    assert_eq!(talker.kind, TargetKind::Binary { libraries: vec![] });
    assert_eq!(talker.entrypoint(), None);
    assert_eq!(sources(talker), vec!["nodes/talker"]);
    Ok(())
}

#[test]
fn devel_prefix_points_into_the_workspace() -> Result<()> {
    let env = TestEnvironment::new()?;
    fs::create_dir_all(env.root().join("devel"))?;
    let content = "add_executable(foo ${CATKIN_DEVEL_PREFIX}/generated.cpp foo.cpp)\n";
    env.create_package("demo", &[("CMakeLists.txt", content), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(sources(&info.targets["foo"]), vec!["foo.cpp"]);
    let expected = env.root().join("devel").join("demo").join("generated.cpp");
    assert_eq!(info.unresolved_files.len(), 1);
    assert_eq!(info.unresolved_files[0].path, expected.to_string_lossy());
    Ok(())
}

#[test]
fn exported_headers_restrict_the_sources() -> Result<()> {
    let env = TestEnvironment::new()?;
    fs::create_dir_all(env.root().join("devel/include/demo"))?;
    env.create_package("demo", &[("CMakeLists.txt", "add_executable(foo foo.cpp)\n"), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    let restrictions: Vec<_> = info.targets["foo"].restrict_to_paths.iter().cloned().collect();
    assert_eq!(restrictions, vec![env.root().join("devel/include/demo"), env.package_root("demo")]);
    Ok(())
}

#[test]
fn python_install_is_unknown_to_catkin() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("demo", &[("CMakeLists.txt", "ament_python_install_package(demo)\n")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert!(info.targets.is_empty());
    assert_eq!(info.unprocessed_commands[0].command, "ament_python_install_package");
    Ok(())
}
