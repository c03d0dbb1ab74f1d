// SPDX-License-Identifier: GPL-3.0-or-later

//! The JSON shape of an analysis report.
//!
//! The report is a plain structure derived from the analysis result. Targets
//! are tagged records keyed by the name they are reachable under, so a
//! completed plugin library appears both under its own name and under the
//! class type of its plugin entry.

use crate::cmake::model::{CMakeInfo, CommandInformation, FileInformation, PluginReference, ReconciliationIssue};
use crate::cmake::{SourceLanguage, Target};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("Generic IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Format syntax error: {0}")]
    Syntax(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    pub kind: &'static str,
    pub name: String,
    pub language: SourceLanguage,
    pub sources: Vec<PathBuf>,
    pub includes: Vec<String>,
    pub path_restrictions: Vec<PathBuf>,
    pub cmakelists_file: PathBuf,
    pub cmakelists_line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub libraries: Option<Vec<String>>,
}

impl From<&Target> for TargetRecord {
    fn from(target: &Target) -> Self {
        Self {
            kind: target.kind_name(),
            name: target.name.clone(),
            language: target.language,
            sources: target.sources.iter().cloned().collect(),
            includes: target.includes.clone(),
            path_restrictions: target.restrict_to_paths.iter().cloned().collect(),
            cmakelists_file: target.cmakelists_file.clone(),
            cmakelists_line: target.cmakelists_line,
            entrypoint: target.entrypoint().map(str::to_string),
            libraries: target.libraries().map(<[String]>::to_vec),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub cmake_file: PathBuf,
    pub targets: BTreeMap<String, TargetRecord>,
    pub generated_sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved_files: Option<Vec<FileInformation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unprocessed_commands: Option<Vec<CommandInformation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_references: Option<Vec<PluginReference>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Vec<ReconciliationIssue>>,
}

impl Report {
    /// Builds the report; the diagnostic lists are left out unless asked for.
    pub fn new(info: &CMakeInfo, diagnostics: bool) -> Self {
        Self {
            cmake_file: info.cmake_file.clone(),
            targets: info.targets.iter().map(|(key, target)| (key.clone(), TargetRecord::from(target))).collect(),
            generated_sources: info.generated_sources.iter().cloned().collect(),
            unresolved_files: optional_list(diagnostics, &info.unresolved_files),
            unprocessed_commands: optional_list(diagnostics, &info.unprocessed_commands),
            plugin_references: optional_list(diagnostics, &info.plugin_references),
            reconciliation: optional_list(diagnostics, &info.reconciliation),
        }
    }
}

fn optional_list<T: Clone>(enabled: bool, values: &[T]) -> Option<Vec<T>> {
    enabled.then(|| values.to_vec())
}

/// Serialize the report as a single JSON object.
pub fn serialize<W: io::Write>(mut writer: W, report: &Report, pretty: bool) -> Result<(), SerializationError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, report)?;
    } else {
        serde_json::to_writer(&mut writer, report)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
