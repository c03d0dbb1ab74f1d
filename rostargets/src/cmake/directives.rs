// SPDX-License-Identifier: GPL-3.0-or-later

//! Handlers of the directives every ROS generation shares.
//!
//! Each handler declares the keywords it understands as an [`OptionSchema`]
//! and splits its arguments through the interpreter. A handler returns an
//! error when the call is malformed; the interpreter then records the
//! directive as unprocessed.

use super::arguments::{OptionRule, OptionSchema};
use super::interpreter::{DirectiveError, Interpreter};
use super::model::{PluginReference, SourceLanguage, TargetKind};
use super::registry::CommandRegistry;
use super::variables::{
    KEY_CURRENT_SOURCE_DIR, KEY_INCLUDE_DIRECTORIES, KEY_PROJECT_NAME, KEY_PROJECT_SOURCE_DIR,
    KEY_PROJECT_VERSION, LIST_SEPARATOR, Variables,
};
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// The handlers of the common directives.
pub static COMMON: LazyLock<CommandRegistry> = LazyLock::new(|| {
    let mut registry = CommandRegistry::new();
    registry
        .register(&["project"], project)
        .register(&["set"], set)
        .register(&["unset"], unset)
        .register(&["set_target_properties"], set_target_properties)
        .register(&["aux_source_directory"], aux_source_directory)
        .register(&["list"], list)
        .register(&["file"], file)
        .register(&["get_filename_component"], get_filename_component)
        .register(&["add_subdirectory"], add_subdirectory)
        .register(&["add_executable", "cuda_add_executable"], add_executable)
        .register(&["add_library", "cuda_add_library"], add_library)
        .register(&["target_link_libraries"], target_link_libraries)
        .register(&["include_directories"], include_directories)
        .register(&["configure_file"], configure_file)
        .register(&["pluginlib_export_plugin_description_file"], pluginlib_export_plugin_description_file);
    registry
});

/// `${NAME}` reference left in a target name after substitution.
static VARIABLE_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^$]*)\$\{([^}]*)\}(.*)").expect("Invalid variable reference pattern"));

fn required<'a>(positional: &'a [String], index: usize, what: &'static str) -> Result<&'a str, DirectiveError> {
    positional.get(index).map(String::as_str).ok_or(DirectiveError::MissingArgument(what))
}

const PROJECT: OptionSchema = OptionSchema::new(&[
    OptionRule::single("VERSION"),
    OptionRule::single("DESCRIPTION"),
    OptionRule::single("HOMEPAGE_URL"),
    OptionRule::multi("LANGUAGES"),
]);

fn project(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &PROJECT);
    let name = required(&positional, 0, "project name")?;

    log::info!("Setting {KEY_PROJECT_NAME}={name}");
    variables.set(KEY_PROJECT_NAME, name);
    if let Some(source_dir) = variables.get(KEY_CURRENT_SOURCE_DIR).map(str::to_string) {
        variables.set(KEY_PROJECT_SOURCE_DIR, source_dir);
    }
    if let Some(version) = options.single("VERSION") {
        variables.set(KEY_PROJECT_VERSION, version);
    }
    Ok(())
}

const SET: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("PARENT_SCOPE"),
    OptionRule::flag("FORCE"),
    OptionRule::multi("CACHE"),
]);

fn set(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &SET);
    let name = required(&positional, 0, "variable name")?;

    variables.set(name, positional[1..].join(LIST_SEPARATOR));
    Ok(())
}

const UNSET: OptionSchema = OptionSchema::new(&[OptionRule::flag("CACHE"), OptionRule::flag("PARENT_SCOPE")]);

fn unset(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &UNSET);
    let name = required(&positional, 0, "variable name")?;

    variables.unset(name);
    Ok(())
}

const SET_TARGET_PROPERTIES: OptionSchema = OptionSchema::new(&[OptionRule::multi("PROPERTIES")]);

fn set_target_properties(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &SET_TARGET_PROPERTIES);
    let properties = options.multi("PROPERTIES").ok_or(DirectiveError::MissingOption("PROPERTIES"))?;
    if properties.len() % 2 != 0 {
        return Err(DirectiveError::UnpairedProperties(properties.to_vec()));
    }
    required(&positional, 0, "target name")?;

    let output_name = properties
        .chunks(2)
        .filter(|pair| pair[0] == "OUTPUT_NAME")
        .map(|pair| pair[1].clone())
        .last();
    let Some(output_name) = output_name else {
        return Ok(());
    };

    for target in &positional {
        let target = match VARIABLE_REFERENCE.captures(target) {
            Some(captures) => {
                let variable = &captures[2];
                let value = variables
                    .get(variable)
                    .ok_or_else(|| DirectiveError::UndefinedVariable(variable.to_string()))?;
                format!("{}{}{}", &captures[1], value, &captures[3])
            }
            None => target.clone(),
        };
        if interpreter.rename_target(&target, &output_name) {
            log::info!("Changed the name of target {target} to {output_name}");
        } else {
            log::error!("{target} is not in the list of targets");
        }
    }
    Ok(())
}

fn aux_source_directory(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &OptionSchema::EMPTY);
    let directory = required(&positional, 0, "directory")?;
    let name = required(&positional, 1, "variable name")?;

    let path = interpreter.package().root.join(interpreter.package_relative(variables, directory));
    let entries = std::fs::read_dir(&path).map_err(|source| DirectiveError::Io { path: path.clone(), source })?;
    let mut files: Vec<String> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .map(|entry| Path::new(directory).join(entry.file_name()).to_string_lossy().into_owned())
        .collect();
    files.sort();

    variables.set_list(name, files);
    Ok(())
}

const LIST: OptionSchema = OptionSchema::new(&[OptionRule::flag("APPEND")]);

fn list(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &LIST);
    if !options.flag("APPEND") {
        log::warn!("Cannot process list({})", arguments.join(" "));
        return Ok(());
    }
    let name = required(&positional, 0, "list name")?;

    variables.append(name, &positional[1..]);
    Ok(())
}

const FILE: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("GLOB"),
    OptionRule::flag("GLOB_RECURSE"),
    OptionRule::flag("FOLLOW_SYMLINKS"),
    OptionRule::flag("CONFIGURE_DEPENDS"),
    OptionRule::single("LIST_DIRECTORIES"),
    OptionRule::single("RELATIVE"),
]);

fn file(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &FILE);
    let recursive = options.flag("GLOB_RECURSE");
    if !recursive && !options.flag("GLOB") {
        log::warn!("Cannot process file({})", arguments.join(" "));
        return Ok(());
    }
    let name = required(&positional, 0, "variable name")?;
    let list_directories = options
        .single("LIST_DIRECTORIES")
        .map(|value| matches!(value.to_uppercase().as_str(), "ON" | "TRUE" | "YES" | "Y" | "1"))
        .unwrap_or(!recursive);

    let package_root = interpreter.package().root.clone();
    let current = match variables.current_directory() {
        Some(directory) => package_root.join(directory),
        None => package_root.clone(),
    };
    let mut matches = Vec::new();
    for pattern in &positional[1..] {
        let mut found = glob_files(&current, pattern, recursive, list_directories)?;
        if found.is_empty() {
            found = glob_files(&package_root, pattern, recursive, list_directories)?;
        }
        log::debug!("Found the following matches to {pattern} in {}: {:?}", current.display(), found);
        matches.extend(found);
    }

    if let Some(relative) = options.single("RELATIVE") {
        let base = package_root.join(relative);
        matches = matches
            .into_iter()
            .map(|path| path.strip_prefix(&base).map(Path::to_path_buf).unwrap_or(path))
            .collect();
    }

    let values: Vec<String> = matches.iter().map(|path| path.to_string_lossy().into_owned()).collect();
    variables.set_list(name, &values);
    log::debug!("Set {name} to {}", values.join(LIST_SEPARATOR));
    Ok(())
}

fn glob_files(base: &Path, pattern: &str, recursive: bool, list_directories: bool) -> Result<Vec<PathBuf>, DirectiveError> {
    let full = if Path::new(pattern).is_absolute() {
        pattern.to_string()
    } else {
        let base = glob::Pattern::escape(&base.to_string_lossy());
        if recursive { format!("{base}/**/{pattern}") } else { format!("{base}/{pattern}") }
    };
    let paths = glob::glob(&full).map_err(|source| DirectiveError::Pattern { pattern: full.clone(), source })?;
    let mut found: Vec<PathBuf> = paths
        .filter_map(Result::ok)
        .filter(|path| list_directories || !path.is_dir())
        .collect();
    found.sort();
    Ok(found)
}

const GET_FILENAME_COMPONENT: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("DIRECTORY"),
    OptionRule::flag("PATH"),
    OptionRule::flag("NAME"),
    OptionRule::flag("EXT"),
    OptionRule::flag("NAME_WE"),
    OptionRule::flag("LAST_EXT"),
    OptionRule::flag("NAME_WLE"),
    OptionRule::flag("CACHE"),
    OptionRule::single("BASE_DIR"),
]);

fn get_filename_component(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &GET_FILENAME_COMPONENT);
    let name = required(&positional, 0, "variable name")?;
    let file = required(&positional, 1, "file name")?;

    let path = Path::new(file);
    let file_name = path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default();
    let value = if options.flag("DIRECTORY") || options.flag("PATH") {
        path.parent().map(|parent| parent.to_string_lossy().into_owned()).unwrap_or_default()
    } else if options.flag("NAME") {
        file_name
    } else if options.flag("EXT") {
        file_name.find('.').map(|index| file_name[index..].to_string()).unwrap_or_default()
    } else if options.flag("NAME_WE") {
        file_name.split('.').next().unwrap_or_default().to_string()
    } else if options.flag("LAST_EXT") {
        path.extension().map(|ext| format!(".{}", ext.to_string_lossy())).unwrap_or_default()
    } else if options.flag("NAME_WLE") {
        path.file_stem().map(|stem| stem.to_string_lossy().into_owned()).unwrap_or_default()
    } else {
        file.to_string()
    };

    variables.set(name, value);
    Ok(())
}

const ADD_SUBDIRECTORY: OptionSchema =
    OptionSchema::new(&[OptionRule::flag("EXCLUDE_FROM_ALL"), OptionRule::flag("SYSTEM")]);

fn add_subdirectory(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &ADD_SUBDIRECTORY);
    if options.flag("EXCLUDE_FROM_ALL") {
        log::debug!("Skipping excluded sub-directory {:?}", positional.first());
        return Ok(());
    }
    match positional.first().filter(|directory| !directory.is_empty()) {
        Some(directory) => interpreter.include_subdirectory(variables, directory),
        None => Ok(()),
    }
}

const ADD_EXECUTABLE: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("WIN32"),
    OptionRule::flag("MACOSX_BUNDLE"),
    OptionRule::flag("EXCLUDE_FROM_ALL"),
    OptionRule::flag("IMPORTED"),
    OptionRule::flag("GLOBAL"),
    OptionRule::single("ALIAS"),
    OptionRule::multi("OPTIONS"),
]);

fn add_executable(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &ADD_EXECUTABLE);
    let name = required(&positional, 0, "executable name")?;
    if options.flag("EXCLUDE_FROM_ALL") || options.flag("IMPORTED") || options.flag("ALIAS") {
        log::debug!("Skipping executable {name}, it is not built from the package sources");
        return Ok(());
    }

    let sources = interpreter.collect_sources(variables, &positional[1..]);
    log::debug!("Adding C++ sources for {name}");
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

const ADD_LIBRARY: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("SHARED"),
    OptionRule::flag("STATIC"),
    OptionRule::flag("MODULE"),
    OptionRule::flag("OBJECT"),
    OptionRule::flag("INTERFACE"),
    OptionRule::flag("UNKNOWN"),
    OptionRule::flag("EXCLUDE_FROM_ALL"),
    OptionRule::flag("IMPORTED"),
    OptionRule::flag("GLOBAL"),
    OptionRule::single("ALIAS"),
    OptionRule::multi("OPTIONS"),
]);

fn add_library(interpreter: &mut Interpreter<'_>, variables: &mut Variables, arguments: &[String]) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &ADD_LIBRARY);
    let name = required(&positional, 0, "library name")?;
    if options.flag("EXCLUDE_FROM_ALL") || options.flag("IMPORTED") || options.flag("ALIAS") {
        log::debug!("Skipping library {name}, it is not built from the package sources");
        return Ok(());
    }

    let sources = interpreter.collect_sources(variables, &positional[1..]);
    log::debug!("Adding C++ library {name}");
    let target = interpreter.new_target(variables, name, SourceLanguage::Cxx, sources, TargetKind::IncompleteLibrary);
    interpreter.insert_target(target);
    Ok(())
}

const TARGET_LINK_LIBRARIES: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("PUBLIC"),
    OptionRule::flag("PRIVATE"),
    OptionRule::flag("INTERFACE"),
    OptionRule::flag("LINK_PUBLIC"),
    OptionRule::flag("LINK_PRIVATE"),
    OptionRule::flag("LINK_INTERFACE_LIBRARIES"),
]);

fn target_link_libraries(
    interpreter: &mut Interpreter<'_>,
    _: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &TARGET_LINK_LIBRARIES);
    let target = required(&positional, 0, "target name")?;

    interpreter.link(target, positional[1..].iter().cloned());
    Ok(())
}

const INCLUDE_DIRECTORIES: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("AFTER"),
    OptionRule::flag("BEFORE"),
    OptionRule::flag("SYSTEM"),
]);

fn include_directories(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (options, positional) = interpreter.split(arguments, &INCLUDE_DIRECTORIES);
    let paths: Vec<&String> = positional.iter().filter(|path| !Path::new(path).is_absolute()).collect();
    if paths.is_empty() {
        return Ok(());
    }
    if options.flag("AFTER") || options.flag("BEFORE") || options.flag("SYSTEM") {
        log::warn!("include_directories AFTER, BEFORE, SYSTEM not supported");
    }

    let mut includes = variables.include_directories();
    includes.extend(paths.into_iter().cloned());
    variables.set(KEY_INCLUDE_DIRECTORIES, includes.join(" "));
    Ok(())
}

const CONFIGURE_FILE: OptionSchema = OptionSchema::new(&[
    OptionRule::flag("NO_SOURCE_PERMISSIONS"),
    OptionRule::flag("USE_SOURCE_PERMISSIONS"),
    OptionRule::flag("COPY_ONLY"),
    OptionRule::flag("ESCAPE_QUOTES"),
    OptionRule::flag("@ONLY"),
    OptionRule::single("NEWLINE_STYLE"),
    OptionRule::multi("FILE_PERMISSIONS"),
]);

fn configure_file(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &CONFIGURE_FILE);
    let outputs = positional.get(1..).unwrap_or_default();
    if outputs.is_empty() {
        log::warn!(
            "'{}' has no output for configure_file({})",
            variables.current_list_file(),
            arguments.join(" ")
        );
        return Ok(());
    }

    let generated = &mut interpreter.diagnostics().generated;
    generated.extend(outputs.iter().cloned());
    Ok(())
}

fn pluginlib_export_plugin_description_file(
    interpreter: &mut Interpreter<'_>,
    variables: &mut Variables,
    arguments: &[String],
) -> Result<(), DirectiveError> {
    let (_, positional) = interpreter.split(arguments, &OptionSchema::EMPTY);
    let base_class_package = required(&positional, 0, "base class package")?;
    let plugin_xml = required(&positional, 1, "plugin description")?;

    let reference = PluginReference {
        base_class_package: base_class_package.to_string(),
        plugin_xml: plugin_xml.to_string(),
        cmake_file: PathBuf::from(variables.current_list_file()),
        cmake_line: variables.current_line(),
    };
    interpreter.diagnostics().plugin_references.push(reference);
    Ok(())
}
