// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end analysis of small packages through the library.

use crate::fixtures::*;
use anyhow::Result;
use rostargets::cmake::model::ReconciliationIssue;
use rostargets::cmake::{RosVersion, SourceLanguage, TargetKind};
use rostargets::extractor::AnalysisError;
use std::fs;

#[test]
fn executable_with_existing_source() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("demo", &[("CMakeLists.txt", "add_executable(foo foo.cpp)\n"), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(info.targets.len(), 1);
    let foo = &info.targets["foo"];
    assert_eq!(foo.kind, TargetKind::Binary { libraries: vec![] });
    assert_eq!(foo.language, SourceLanguage::Cxx);
    assert_eq!(sources(foo), vec!["foo.cpp"]);
    assert_eq!(foo.entrypoint(), Some("main"));
    assert_eq!(info.cmake_file, env.package_root("demo").join("CMakeLists.txt"));
    Ok(())
}

#[test]
fn library_completed_by_plugin_description() -> Result<()> {
    let env = TestEnvironment::new()?;
    let plugins = nodelet_plugins(&[("lib/libbar", "demo/bar", "ns::Bar")]);
    env.create_package(
        "demo",
        &[("CMakeLists.txt", "add_library(bar bar.cpp)\n"), ("bar.cpp", ""), ("nodelet_plugins.xml", &plugins)],
    )?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    let bar = &info.targets["bar"];
    assert_eq!(bar.kind, TargetKind::Library { entrypoint: "ns::Bar::onInit".into() });
    assert_eq!(info.targets["ns::Bar"], *bar);
    assert!(info.reconciliation.is_empty());
    Ok(())
}

#[test]
fn plugin_description_from_manifest_export() -> Result<()> {
    let env = TestEnvironment::new()?;
    let plugins = nodelet_plugins(&[("lib/libdemo_nodelets", "demo/Talker", "demo::Talker")]);
    env.create_package(
        "demo",
        &[("CMakeLists.txt", "add_library(Talker src/talker.cpp)\n"), ("src/talker.cpp", ""), ("config/plugins.xml", &plugins)],
    )?;
    fs::write(
        env.package_root("demo").join("package.xml"),
        manifest("demo", r#"<nodelet plugin="${prefix}/config/plugins.xml"/>"#),
    )?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(info.targets["Talker"].entrypoint(), Some("demo::Talker::onInit"));
    assert!(info.targets.contains_key("demo::Talker"));
    Ok(())
}

#[test]
fn executable_from_sub_directory() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package(
        "demo",
        &[
            ("CMakeLists.txt", "add_subdirectory(sub)\n"),
            ("sub/CMakeLists.txt", "add_executable(baz baz.cpp)\n"),
            ("sub/baz.cpp", ""),
        ],
    )?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    let baz = &info.targets["baz"];
    assert_eq!(sources(baz), vec!["sub/baz.cpp"]);
    assert_eq!(baz.cmakelists_file, env.package_root("demo").join("sub/CMakeLists.txt"));
    Ok(())
}

#[test]
fn link_libraries_declared_before_the_target() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = "target_link_libraries(foo mylib)\nadd_executable(foo foo.cpp)\ntarget_link_libraries(foo PRIVATE other)\n";
    env.create_package("demo", &[("CMakeLists.txt", content), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(info.targets["foo"].libraries(), Some(["mylib".to_string(), "other".to_string()].as_slice()));
    Ok(())
}

#[test]
fn configured_file_is_not_a_source() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = "configure_file(tmpl.in out.txt)\nadd_executable(gen out.txt)\n";
    env.create_package("demo", &[("CMakeLists.txt", content), ("tmpl.in", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert!(info.generated_sources.contains("out.txt"));
    assert!(info.targets["gen"].sources.is_empty());
    assert!(info.unresolved_files.is_empty());
    Ok(())
}

#[test]
fn missing_build_file_is_fatal() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("empty", &[])?;

    let result = env.analyze("empty", RosVersion::Ros1);

    match result {
        Err(error @ AnalysisError::MissingBuildFile { .. }) => assert!(error.to_string().contains("empty")),
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn unknown_commands_are_reported_verbatim() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = "cmake_minimum_required(VERSION 3.0.2)\nfind_package(catkin REQUIRED COMPONENTS roscpp)\n";
    env.create_package("demo", &[("CMakeLists.txt", content)])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    let commands: Vec<(&str, usize)> =
        info.unprocessed_commands.iter().map(|command| (command.command.as_str(), command.cmake_line)).collect();
    assert_eq!(commands, vec![("cmake_minimum_required", 1), ("find_package", 2)]);
    assert_eq!(info.unprocessed_commands[1].arguments, vec!["catkin", "REQUIRED", "COMPONENTS", "roscpp"]);
    assert!(info.targets.is_empty());
    Ok(())
}

#[test]
fn redeclared_target_keeps_the_last_declaration() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = "add_library(bar one.cpp)\nadd_library(bar two.cpp)\n";
    env.create_package("demo", &[("CMakeLists.txt", content), ("one.cpp", ""), ("two.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(sources(&info.targets["bar"]), vec!["two.cpp"]);
    assert_eq!(info.targets["bar"].cmakelists_line, 2);
    Ok(())
}

#[test]
fn sub_directory_variables_do_not_leak() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = "set(SRC outer.cpp)\nadd_subdirectory(sub)\nadd_executable(outer ${SRC})\n";
    env.create_package(
        "demo",
        &[
            ("CMakeLists.txt", content),
            ("sub/CMakeLists.txt", "set(SRC inner.cpp)\nadd_executable(inner ${SRC})\n"),
            ("sub/inner.cpp", ""),
            ("inner.cpp", ""),
            ("outer.cpp", ""),
        ],
    )?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(sources(&info.targets["outer"]), vec!["outer.cpp"]);
    assert_eq!(sources(&info.targets["inner"]), vec!["sub/inner.cpp"]);
    Ok(())
}

#[test]
fn unresolved_sources_are_reported() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("demo", &[("CMakeLists.txt", "\nadd_executable(foo foo.cpp missing.cpp)\n"), ("foo.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(sources(&info.targets["foo"]), vec!["foo.cpp"]);
    assert_eq!(info.unresolved_files.len(), 1);
    assert_eq!(info.unresolved_files[0].path, "missing.cpp");
    assert_eq!(info.unresolved_files[0].cmake_line, 2);
    Ok(())
}

#[test]
fn library_without_plugin_entry_is_reported() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("demo", &[("CMakeLists.txt", "add_library(lonely lonely.cpp)\n"), ("lonely.cpp", "")])?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert!(info.targets["lonely"].is_incomplete());
    assert_eq!(
        info.reconciliation,
        vec![ReconciliationIssue::IncompleteTarget { package: "demo".into(), target: "lonely".into() }]
    );
    Ok(())
}

#[test]
fn variables_and_globs_feed_the_sources() -> Result<()> {
    let env = TestEnvironment::new()?;
    let content = r#"
project(demo)
file(GLOB NODE_SOURCES RELATIVE ${PROJECT_SOURCE_DIR} src/*.cpp)
list(APPEND NODE_SOURCES extra/helper.cpp)
add_executable(${PROJECT_NAME}_node ${NODE_SOURCES})
"#;
    env.create_package(
        "demo",
        &[("CMakeLists.txt", content), ("src/a.cpp", ""), ("src/b.cpp", ""), ("extra/helper.cpp", "")],
    )?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert_eq!(sources(&info.targets["demo_node"]), vec!["extra/helper.cpp", "src/a.cpp", "src/b.cpp"]);
    Ok(())
}

#[test]
fn legacy_encoded_build_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("demo", &[("foo.cpp", "")])?;
    let (content, _, _) = encoding_rs::WINDOWS_1252.encode("# Caf\u{e9} demo\nadd_executable(foo foo.cpp)\n");
    fs::write(env.package_root("demo").join("CMakeLists.txt"), &*content)?;

    let info = env.analyze("demo", RosVersion::Ros1)?;

    assert!(info.targets.contains_key("foo"));
    Ok(())
}
