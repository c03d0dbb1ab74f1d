// SPDX-License-Identifier: GPL-3.0-or-later

//! The binary: modes, configuration and exit codes.

use crate::fixtures::*;
use anyhow::Result;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;

fn demo_package(env: &TestEnvironment) -> Result<()> {
    let plugins = nodelet_plugins(&[("lib/libdemo_nodelets", "demo/Listener", "demo::Listener")]);
    env.create_package(
        "demo",
        &[
            ("CMakeLists.txt", "add_executable(talker src/talker.cpp)\nadd_library(Listener src/listener.cpp)\ninstall(TARGETS talker)\n"),
            ("src/talker.cpp", ""),
            ("src/listener.cpp", ""),
            ("nodelet_plugins.xml", &plugins),
        ],
    )?;
    Ok(())
}

#[test]
fn analyze_writes_the_report() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;

    env.command()?.args(["analyze", "src/demo", "-o", "report.json"]).assert().success();

    let report: Value = serde_json::from_str(&fs::read_to_string(env.root().join("report.json"))?)?;
    assert_eq!(report["targets"]["talker"]["kind"], "binary");
    assert_eq!(report["targets"]["talker"]["sources"], serde_json::json!(["src/talker.cpp"]));
    assert_eq!(report["targets"]["Listener"]["entrypoint"], "demo::Listener::onInit");
    assert_eq!(report["targets"]["demo::Listener"]["name"], "Listener");
    assert_eq!(report["unprocessed_commands"][0]["command"], "install");
    assert!(!env.root().join("report.tmp").exists());
    Ok(())
}

#[test]
fn default_mode_writes_the_default_file() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;

    env.command()?.arg("src/demo").assert().success();

    assert!(env.root().join("targets.json").is_file());
    Ok(())
}

#[test]
fn report_to_standard_output() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;

    env.command()?
        .args(["analyze", "src/demo", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"talker\"").and(predicate::str::contains("\"cmake_file\"")));

    assert!(!env.root().join("targets.json").exists());
    Ok(())
}

#[test]
fn list_prints_the_targets() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;

    env.command()?
        .args(["list", "src/demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("talker (cxx, 1 sources)"))
        .stdout(predicate::str::contains("demo::Listener -> Listener"))
        .stdout(predicate::str::contains("unprocessed commands: 1"));
    Ok(())
}

#[test]
fn missing_build_file_fails() -> Result<()> {
    let env = TestEnvironment::new()?;
    env.create_package("hollow", &[])?;

    env.command()?
        .args(["analyze", "src/hollow", "-o", "-"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("hollow"));
    Ok(())
}

#[test]
fn missing_package_directory_fails() -> Result<()> {
    let env = TestEnvironment::new()?;

    env.command()?
        .args(["analyze", "src/nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere"));
    Ok(())
}

#[test]
fn ros_version_from_the_environment() -> Result<()> {
    let env = TestEnvironment::new_colcon()?;
    env.create_package("demo", &[("CMakeLists.txt", "ament_python_install_package(demo)\n")])?;

    env.command()?
        .env("ROS_VERSION", "2")
        .args(["analyze", "src/demo", "-o", "-"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    // the command line wins over the environment
    env.command()?.env("ROS_VERSION", "2").args(["--ros", "ros1", "analyze", "src/demo", "-o", "-"]).assert().success();
    Ok(())
}

#[test]
fn configuration_file_shapes_the_report() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;
    let config = assert_fs::TempDir::new()?;
    let config_file = config.child("custom.yml");
    config_file.write_str("schema: 1.0\noutput:\n  pretty: false\n  diagnostics: false\n")?;
    let config_path = config_file.path().to_string_lossy().into_owned();

    let output = env
        .command()?
        .args(["-c", config_path.as_str(), "analyze", "src/demo", "-o", "-"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let text = String::from_utf8(output)?;
    assert_eq!(text.lines().count(), 1);
    let report: Value = serde_json::from_str(&text)?;
    assert!(report.get("unprocessed_commands").is_none());
    assert!(report["targets"].get("talker").is_some());
    Ok(())
}

#[test]
fn configuration_in_current_directory() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;
    fs::write(env.root().join("rostargets.yml"), "schema: 1.0\nanalysis:\n  plugin_files: [missing.xml]\n")?;

    let output = env.command()?.args(["analyze", "src/demo", "-o", "-"]).assert().success().get_output().stdout.clone();

    // the conventional plugin file is not looked up any more
    let report: Value = serde_json::from_slice(&output)?;
    assert_eq!(report["targets"]["Listener"]["kind"], "incomplete_library");
    assert_eq!(report["reconciliation"][0]["issue"], "incomplete_target");
    Ok(())
}

#[test]
fn invalid_configuration_fails() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;
    let config = assert_fs::TempDir::new()?;
    let config_file = config.child("rostargets.yml");
    config_file.write_str("schema: 4.0\n")?;
    config_file.assert(predicate::path::exists());
    let config_path = config_file.path().to_string_lossy().into_owned();

    env.command()?
        .args(["-c", config_path.as_str(), "src/demo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported schema version"));
    Ok(())
}

#[test]
fn missing_output_directory_fails() -> Result<()> {
    let env = TestEnvironment::new()?;
    demo_package(&env)?;

    env.command()?
        .args(["analyze", "src/demo", "-o", "missing/report.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Output directory does not exist"));
    Ok(())
}

#[test]
fn help_without_arguments() -> Result<()> {
    let env = TestEnvironment::new()?;

    env.command()?.assert().failure().stderr(predicate::str::contains("Usage"));
    Ok(())
}
