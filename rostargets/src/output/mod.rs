// SPDX-License-Identifier: GPL-3.0-or-later

//! This module is responsible for writing the analysis report.
//!
//! The report is a JSON object written either to a file or to the standard
//! output. Files are written atomically.

mod json;
mod statistics;
mod writers;

use crate::cmake::CMakeInfo;
use crate::{args, config};
use thiserror::Error;
use writers::{AtomicFileWriter, JsonFileWriter, ReportSink, StdoutWriter};

pub use json::{Report, SerializationError, TargetRecord};
pub use statistics::AnalysisStatistics;

enum Destination {
    File(AtomicFileWriter<JsonFileWriter>),
    Stdout(StdoutWriter),
}

/// Represents the output writer of the analysis report.
pub struct ReportWriter {
    destination: Destination,
    diagnostics: bool,
}

impl TryFrom<(&args::Report, &config::Output)> for ReportWriter {
    type Error = WriterCreationError;

    fn try_from(value: (&args::Report, &config::Output)) -> Result<Self, Self::Error> {
        let (target, settings) = value;

        let destination = if target.is_stdout() {
            Destination::Stdout(StdoutWriter::new(settings.pretty))
        } else {
            let final_path = std::path::PathBuf::from(&target.file_name);
            if let Some(parent) = final_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                if !parent.is_dir() {
                    return Err(WriterCreationError::Configuration(format!(
                        "Output directory does not exist: {}",
                        parent.display()
                    )));
                }
            }
            let temp_path = final_path.with_extension("tmp");
            let base_writer = JsonFileWriter::new(&temp_path, settings.pretty);
            Destination::File(AtomicFileWriter::new(base_writer, &temp_path, &final_path))
        };

        Ok(Self { destination, diagnostics: settings.diagnostics })
    }
}

impl ReportWriter {
    /// Writes the report of the analysis result.
    pub fn write(self, info: &CMakeInfo) -> Result<(), WriterError> {
        log::info!("{}", AnalysisStatistics::from(info));

        let report = Report::new(info, self.diagnostics);
        match self.destination {
            Destination::File(writer) => writer.write(&report),
            Destination::Stdout(writer) => writer.write(&report),
        }
    }
}

#[derive(Error, Debug)]
pub enum WriterCreationError {
    #[error("{0}")]
    Configuration(String),
}

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Cannot write the report to {}: {}", .0.display(), .1)]
    Io(std::path::PathBuf, SerializationError),
}
