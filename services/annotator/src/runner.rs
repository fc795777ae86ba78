//! Drives a session with a front end and persists the outcome.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use scan_reader::ScanStore;
use tracing::{info, warn};

use crate::prompt::{CandidateView, Command, Frontend};
use crate::session::{AnnotationSession, SessionOutcome, Step};

/// Candidate scans that are not in the store.
pub fn missing_scans(session: &AnnotationSession, store: &ScanStore) -> Vec<String> {
    session
        .candidates()
        .iter()
        .filter_map(|&row| session.table().get(row))
        .filter(|r| !store.path_of(&r.file_name).exists())
        .map(|r| r.file_name.clone())
        .collect()
}

/// Show candidates until the session finishes or the reviewer quits.
///
/// Returns `None` when the reviewer quit early.
pub fn run_session<F: Frontend>(
    session: &mut AnnotationSession,
    store: &ScanStore,
    frontend: &mut F,
) -> Result<Option<SessionOutcome>> {
    loop {
        let (row, position) = match session.step() {
            Step::Review { row, position } => (row, position),
            Step::Finished => return Ok(session.outcome()),
        };

        let record = session
            .table()
            .get(row)
            .with_context(|| format!("Candidate row {} is not in the table", row))?;
        let grid = store
            .load(&record.file_name)
            .with_context(|| format!("Failed to load scan {}", record.file_name))?;

        frontend.present(&CandidateView {
            position,
            total: session.len(),
            record,
            grid: &grid,
        })?;

        match frontend.read_command()? {
            Command::Quit => {
                info!(
                    decided = session.cursor(),
                    remaining = session.len() - session.cursor(),
                    "Quit before the last candidate, nothing written"
                );
                return Ok(None);
            }
            Command::Apply(action) => {
                session.apply(action);
            }
        }
    }
}

/// Write the relabeled table and, if requested, the excluded file names.
pub fn write_outcome(
    outcome: &SessionOutcome,
    output: &Path,
    excluded_output: Option<&Path>,
) -> Result<()> {
    outcome
        .table
        .write(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        path = %output.display(),
        positives = outcome.positives,
        negatives = outcome.negatives,
        excluded = outcome.excluded.len(),
        "Wrote annotated table"
    );

    if outcome.excluded.is_empty() {
        return Ok(());
    }
    match excluded_output {
        Some(path) => {
            let mut content = outcome.excluded.join("\n");
            content.push('\n');
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(
                path = %path.display(),
                count = outcome.excluded.len(),
                "Wrote excluded file names"
            );
        }
        None => {
            warn!(
                files = ?outcome.excluded,
                "Excluded files are not persisted; pass --excluded-output to keep them"
            );
        }
    }
    Ok(())
}
