//! The annotation pass: which events to show and what the reviewer decided.
//!
//! The session is a plain state machine. Each `ConfirmPositive`,
//! `ConfirmNegative` or `Exclude` decides the current candidate and moves to
//! the next one; `Undo` steps back and forgets the last decision. Nothing is
//! written until the last candidate is decided.

use ring_common::{Catalog, EventRecord, EventTable, Label};
use tracing::debug;

/// A reviewer decision or navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The scan shows a closed wind ring.
    ConfirmPositive,
    /// The scan does not show a closed wind ring.
    ConfirmNegative,
    /// Leave the scan out of the dataset.
    Exclude,
    /// Go back one candidate and forget its decision.
    Undo,
}

/// Where the session stands after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Show the candidate at this table row.
    Review { row: usize, position: usize },
    /// Every candidate has been decided.
    Finished,
}

/// One entry of the undo history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Labeled(Label),
    Excluded,
}

/// Why a row is or is not shown to the reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Known medicane; its label is trusted.
    Medicane,
    /// Over land or on the exclusion list.
    Blocked,
    /// No storm centre to plot.
    MissingCoordinates,
    /// Label unknown or disputed; shown to the reviewer.
    Review,
    /// Label agreed by both sources.
    Settled,
}

/// Classify a row. The checks run in order; the first match wins.
pub fn disposition(record: &EventRecord, catalog: &Catalog) -> Disposition {
    if catalog.is_medicane(record.cyclone_id) {
        Disposition::Medicane
    } else if catalog.is_blocked(record.cyclone_id) {
        Disposition::Blocked
    } else if !record.has_coordinates() {
        Disposition::MissingCoordinates
    } else if record.needs_review() {
        Disposition::Review
    } else {
        Disposition::Settled
    }
}

/// Table rows to show, in table order.
pub fn select_candidates(table: &EventTable, catalog: &Catalog) -> Vec<usize> {
    table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| disposition(r, catalog) == Disposition::Review)
        .map(|(i, _)| i)
        .collect()
}

/// Result of a completed session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    /// Source table with every labeled candidate's label replaced
    pub table: EventTable,
    /// File names the reviewer chose to leave out, in decision order
    pub excluded: Vec<String>,
    pub positives: usize,
    pub negatives: usize,
}

/// State of an annotation pass over one event table.
#[derive(Debug, Clone)]
pub struct AnnotationSession {
    table: EventTable,
    candidates: Vec<usize>,
    history: Vec<Decision>,
}

impl AnnotationSession {
    /// Start a session over the rows of `table` that need review.
    pub fn new(table: EventTable, catalog: &Catalog) -> Self {
        let candidates = select_candidates(&table, catalog);
        debug!(rows = table.len(), candidates = candidates.len(), "Selected candidates");
        Self::with_candidates(table, candidates)
    }

    /// Start a session over explicit row indices.
    pub fn with_candidates(table: EventTable, candidates: Vec<usize>) -> Self {
        Self {
            table,
            candidates,
            history: Vec::new(),
        }
    }

    pub fn table(&self) -> &EventTable {
        &self.table
    }

    pub fn candidates(&self) -> &[usize] {
        &self.candidates
    }

    /// Number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Index of the candidate being shown.
    pub fn cursor(&self) -> usize {
        self.history.len()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor() >= self.candidates.len()
    }

    pub fn step(&self) -> Step {
        match self.candidates.get(self.cursor()) {
            Some(&row) => Step::Review {
                row,
                position: self.cursor(),
            },
            None => Step::Finished,
        }
    }

    /// The record under review, if any.
    pub fn current(&self) -> Option<&EventRecord> {
        match self.step() {
            Step::Review { row, .. } => self.table.get(row),
            Step::Finished => None,
        }
    }

    /// Apply an action and return the new step.
    ///
    /// Decisions after the end are ignored. `Undo` at the first candidate is
    /// a no-op.
    pub fn apply(&mut self, action: Action) -> Step {
        let decision = match action {
            Action::Undo => {
                if let Some(undone) = self.history.pop() {
                    debug!(cursor = self.cursor(), ?undone, "Undo");
                }
                return self.step();
            }
            Action::ConfirmPositive => Decision::Labeled(Label::ClosedRing),
            Action::ConfirmNegative => Decision::Labeled(Label::NotClosedRing),
            Action::Exclude => Decision::Excluded,
        };

        if !self.is_finished() {
            self.history.push(decision);
        }
        self.step()
    }

    /// File names excluded so far.
    pub fn excluded(&self) -> Vec<String> {
        self.decided()
            .filter(|(_, d)| *d == Decision::Excluded)
            .filter_map(|(row, _)| self.table.get(row))
            .map(|r| r.file_name.clone())
            .collect()
    }

    /// Labels decided so far, as (table row, label).
    pub fn labels(&self) -> Vec<(usize, Label)> {
        self.decided()
            .filter_map(|(row, d)| match d {
                Decision::Labeled(label) => Some((row, label)),
                Decision::Excluded => None,
            })
            .collect()
    }

    /// The output of a finished session; `None` while candidates remain.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        if !self.is_finished() {
            return None;
        }

        let labels = self.labels();
        let mut table = self.table.clone();
        for &(row, label) in &labels {
            if let Some(record) = table.records_mut().get_mut(row) {
                record.label = label;
            }
        }

        Some(SessionOutcome {
            table,
            excluded: self.excluded(),
            positives: labels.iter().filter(|(_, l)| *l == Label::ClosedRing).count(),
            negatives: labels.iter().filter(|(_, l)| *l == Label::NotClosedRing).count(),
        })
    }

    fn decided(&self) -> impl Iterator<Item = (usize, Decision)> + '_ {
        self.candidates.iter().copied().zip(self.history.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: u32, label: Label) -> EventRecord {
        EventRecord::new(id, format!("scan_{}.json", id), 15.0, 35.0, label)
    }

    fn table() -> EventTable {
        EventTable::new(vec![
            rec(1, Label::Unknown),
            rec(2, Label::ClosedRing),
            rec(3, Label::ClosedRing).with_secondary_label(Label::NotClosedRing),
            rec(4, Label::Unknown),
        ])
    }

    #[test]
    fn test_disposition_order() {
        let mut catalog = Catalog::empty();
        catalog.medicanes.insert(10);
        catalog.excluded.insert(10);
        catalog.over_land.insert(11);

        assert_eq!(disposition(&rec(10, Label::Unknown), &catalog), Disposition::Medicane);
        assert_eq!(disposition(&rec(11, Label::Unknown), &catalog), Disposition::Blocked);

        let mut no_centre = rec(12, Label::Unknown);
        no_centre.lat = f64::NAN;
        assert_eq!(disposition(&no_centre, &catalog), Disposition::MissingCoordinates);

        assert_eq!(disposition(&rec(13, Label::Unknown), &catalog), Disposition::Review);
        assert_eq!(disposition(&rec(14, Label::NotClosedRing), &catalog), Disposition::Settled);
    }

    #[test]
    fn test_select_candidates_in_table_order() {
        assert_eq!(select_candidates(&table(), &Catalog::empty()), vec![0, 2, 3]);
    }

    #[test]
    fn test_walk_to_finish() {
        let mut s = AnnotationSession::new(table(), &Catalog::empty());
        assert_eq!(s.step(), Step::Review { row: 0, position: 0 });
        assert_eq!(s.apply(Action::ConfirmPositive), Step::Review { row: 2, position: 1 });
        assert_eq!(s.apply(Action::Exclude), Step::Review { row: 3, position: 2 });
        assert!(s.outcome().is_none());
        assert_eq!(s.apply(Action::ConfirmNegative), Step::Finished);

        let out = s.outcome().unwrap();
        let labels: Vec<Label> = out.table.records().iter().map(|r| r.label).collect();
        assert_eq!(
            labels,
            vec![Label::ClosedRing, Label::ClosedRing, Label::ClosedRing, Label::NotClosedRing]
        );
        assert_eq!(out.excluded, vec!["scan_3.json".to_string()]);
        assert_eq!((out.positives, out.negatives), (1, 1));
    }

    #[test]
    fn test_undo_at_start_is_noop() {
        let mut s = AnnotationSession::new(table(), &Catalog::empty());
        assert_eq!(s.apply(Action::Undo), Step::Review { row: 0, position: 0 });
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_undo_pops_matching_list() {
        let mut s = AnnotationSession::new(table(), &Catalog::empty());
        s.apply(Action::ConfirmPositive);
        s.apply(Action::Exclude);
        assert_eq!(s.excluded(), vec!["scan_3.json".to_string()]);

        s.apply(Action::Undo);
        assert!(s.excluded().is_empty());
        assert_eq!(s.labels(), vec![(0, Label::ClosedRing)]);

        s.apply(Action::Undo);
        assert!(s.labels().is_empty());
        assert_eq!(s.cursor(), 0);
    }

    #[test]
    fn test_actions_after_finish_ignored() {
        let mut s = AnnotationSession::with_candidates(table(), vec![1]);
        assert_eq!(s.apply(Action::ConfirmNegative), Step::Finished);
        assert_eq!(s.apply(Action::ConfirmPositive), Step::Finished);
        assert_eq!(s.labels(), vec![(1, Label::NotClosedRing)]);

        // Undo from the end reopens the last candidate.
        assert_eq!(s.apply(Action::Undo), Step::Review { row: 1, position: 0 });
    }

    #[test]
    fn test_empty_session_is_finished() {
        let s = AnnotationSession::with_candidates(table(), vec![]);
        assert!(s.is_finished());
        assert_eq!(s.outcome().unwrap().table, table());
    }
}
