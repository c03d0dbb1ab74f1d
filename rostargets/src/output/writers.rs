// SPDX-License-Identifier: GPL-3.0-or-later

use super::json::{self, Report, SerializationError};
use super::WriterError;
use std::{fs, io, path};

/// A trait representing a destination of the analysis report.
pub(super) trait ReportSink {
    /// Consumes the sink and writes the report into it.
    fn write(self, report: &Report) -> Result<(), WriterError>;
}

/// Writes the report into a file.
pub(super) struct JsonFileWriter {
    path: path::PathBuf,
    pretty: bool,
}

impl JsonFileWriter {
    pub(super) fn new(path: &path::Path, pretty: bool) -> Self {
        Self { path: path.to_path_buf(), pretty }
    }
}

impl ReportSink for JsonFileWriter {
    fn write(self, report: &Report) -> Result<(), WriterError> {
        let output = fs::File::create(&self.path)
            .map(io::BufWriter::new)
            .map_err(|err| WriterError::Io(self.path.clone(), SerializationError::Io(err)))?;

        json::serialize(output, report, self.pretty).map_err(|err| WriterError::Io(self.path, err))
    }
}

/// Writes the report atomically.
///
/// The report is first written to a temporary file and then renamed to the
/// final file name, so a failed run never leaves a truncated report behind.
pub(super) struct AtomicFileWriter<T: ReportSink> {
    writer: T,
    temp_path: path::PathBuf,
    final_path: path::PathBuf,
}

impl<T: ReportSink> AtomicFileWriter<T> {
    pub(super) fn new(writer: T, temp_path: &path::Path, final_path: &path::Path) -> Self {
        Self { writer, temp_path: temp_path.to_path_buf(), final_path: final_path.to_path_buf() }
    }
}

impl<T: ReportSink> ReportSink for AtomicFileWriter<T> {
    fn write(self, report: &Report) -> Result<(), WriterError> {
        if let Err(error) = self.writer.write(report) {
            if let Err(cleanup) = fs::remove_file(&self.temp_path) {
                log::debug!("Failed to remove {}: {cleanup}", self.temp_path.display());
            }
            return Err(error);
        }

        fs::rename(&self.temp_path, &self.final_path)
            .map_err(|err| WriterError::Io(self.final_path, SerializationError::Io(err)))?;

        Ok(())
    }
}

/// Writes the report to the standard output.
pub(super) struct StdoutWriter {
    pretty: bool,
}

impl StdoutWriter {
    pub(super) fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl ReportSink for StdoutWriter {
    fn write(self, report: &Report) -> Result<(), WriterError> {
        let stdout = io::stdout();
        json::serialize(stdout.lock(), report, self.pretty)
            .map_err(|err| WriterError::Io(path::PathBuf::from(crate::args::STDOUT_FILE_NAME), err))
    }
}
