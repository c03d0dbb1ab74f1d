// SPDX-License-Identifier: GPL-3.0-or-later

//! Summary counts of an analysis result.
//!
//! The counts are logged after every run, and printed by the `list` mode
//! below the target table.

use crate::cmake::model::CMakeInfo;
use crate::cmake::TargetKind;
use std::fmt;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AnalysisStatistics {
    pub binaries: usize,
    pub libraries: usize,
    pub incomplete_libraries: usize,
    /// Targets reachable under a plugin class name besides their own.
    pub aliases: usize,
    pub generated_sources: usize,
    pub unresolved_files: usize,
    pub unprocessed_commands: usize,
    pub reconciliation_issues: usize,
}

impl From<&CMakeInfo> for AnalysisStatistics {
    fn from(info: &CMakeInfo) -> Self {
        let mut statistics = AnalysisStatistics {
            generated_sources: info.generated_sources.len(),
            unresolved_files: info.unresolved_files.len(),
            unprocessed_commands: info.unprocessed_commands.len(),
            reconciliation_issues: info.reconciliation.len(),
            ..Default::default()
        };
        for (key, target) in &info.targets {
            if key != &target.name {
                statistics.aliases += 1;
                continue;
            }
            match target.kind {
                TargetKind::Binary { .. } => statistics.binaries += 1,
                TargetKind::Library { .. } => statistics.libraries += 1,
                TargetKind::IncompleteLibrary => statistics.incomplete_libraries += 1,
            }
        }
        statistics
    }
}

impl fmt::Display for AnalysisStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Analysis result:")?;
        writeln!(f, "  binaries: {}", self.binaries)?;
        writeln!(f, "  libraries: {}", self.libraries)?;
        writeln!(f, "  incomplete libraries: {}", self.incomplete_libraries)?;
        writeln!(f, "  plugin aliases: {}", self.aliases)?;
        writeln!(f, "  generated sources: {}", self.generated_sources)?;
        writeln!(f, "  unresolved files: {}", self.unresolved_files)?;
        writeln!(f, "  unprocessed commands: {}", self.unprocessed_commands)?;
        write!(f, "  reconciliation warnings: {}", self.reconciliation_issues)
    }
}
