//! End-to-end annotation runs over synthetic scans with scripted input.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use annotator::{
    missing_scans, run_session, write_outcome, AnnotationSession, AnnotatorConfig, TerminalFrontend,
};
use ring_common::{Catalog, EventRecord, EventTable, Label};
use scan_reader::{save_json, ScanStore};
use test_utils::{
    create_vortex_scan, record, scan_file_name, scratch_dir, write_event_table, SwathSpec,
};

// ============================================================================
// Helper functions
// ============================================================================

fn vortex_record(dir: &Path, id: u32, label: Label) -> EventRecord {
    let spec = SwathSpec::mediterranean();
    save_json(&create_vortex_scan(spec, 80, 40), dir.join(scan_file_name(id))).unwrap();
    record(id, spec.lon_of(40), spec.lat_of(80), label)
}

/// Table: two unknowns, one agreed label, one disputed label, one medicane.
fn setup(dir: &Path, catalog: &mut Catalog) -> EventTable {
    catalog.medicanes.insert(5);
    let records = vec![
        vortex_record(dir, 1, Label::Unknown),
        vortex_record(dir, 2, Label::NotClosedRing),
        vortex_record(dir, 3, Label::ClosedRing).with_secondary_label(Label::NotClosedRing),
        vortex_record(dir, 4, Label::Unknown),
        vortex_record(dir, 5, Label::Unknown),
    ];
    let path = write_event_table(dir, records);
    EventTable::read(path).unwrap()
}

fn frontend(dir: &Path, script: &str) -> TerminalFrontend<Cursor<String>, Vec<u8>> {
    frontend_with_window(dir, script, 3.0)
}

fn frontend_with_window(
    dir: &Path,
    script: &str,
    window_size: f64,
) -> TerminalFrontend<Cursor<String>, Vec<u8>> {
    TerminalFrontend::new(
        Cursor::new(script.to_string()),
        Vec::new(),
        dir.join("preview.png"),
        window_size,
    )
}

// ============================================================================
// Sessions
// ============================================================================

#[test]
fn test_full_session_relabels_candidates() {
    let dir = scratch_dir();
    let mut catalog = Catalog::empty();
    let table = setup(dir.path(), &mut catalog);
    let store = ScanStore::new(dir.path());

    let mut session = AnnotationSession::new(table, &catalog);
    assert_eq!(session.candidates(), &[0, 2, 3]);

    // Label, exclude, go back, relabel, label.
    let mut ui = frontend(dir.path(), "t\nx\nb\nf\nf\n");
    let outcome = run_session(&mut session, &store, &mut ui).unwrap().unwrap();

    let labels: Vec<Label> = outcome.table.records().iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![
            Label::ClosedRing,
            Label::NotClosedRing,
            Label::NotClosedRing,
            Label::NotClosedRing,
            Label::Unknown,
        ]
    );
    assert!(outcome.excluded.is_empty());
    assert!(dir.path().join("preview.png").exists());

    let transcript = String::from_utf8(ui.into_output()).unwrap();
    assert!(transcript.contains("[1/3] scan_1.json"));
    assert!(transcript.contains("[3/3] scan_4.json"));
}

#[test]
fn test_quit_writes_nothing() {
    let dir = scratch_dir();
    let mut catalog = Catalog::empty();
    let table = setup(dir.path(), &mut catalog);
    let store = ScanStore::new(dir.path());

    let mut session = AnnotationSession::new(table, &catalog);
    let mut ui = frontend(dir.path(), "t\nq\n");
    assert!(run_session(&mut session, &store, &mut ui).unwrap().is_none());
    assert_eq!(session.cursor(), 1);
}

#[test]
fn test_outcome_files() {
    let dir = scratch_dir();
    let mut catalog = Catalog::empty();
    let table = setup(dir.path(), &mut catalog);
    let store = ScanStore::new(dir.path());

    let mut session = AnnotationSession::new(table, &catalog);
    let mut ui = frontend(dir.path(), "x\nt\nx\n");
    let outcome = run_session(&mut session, &store, &mut ui).unwrap().unwrap();
    assert_eq!(outcome.excluded, vec!["scan_1.json", "scan_4.json"]);

    let config = AnnotatorConfig {
        table: dir.path().join("annotations_SS.txt"),
        dataset_dir: dir.path().to_path_buf(),
        ..AnnotatorConfig::default()
    };
    let output = config.output_path();
    let excluded = dir.path().join("excluded.txt");
    write_outcome(&outcome, &output, Some(&excluded)).unwrap();

    assert_eq!(output.file_name().unwrap(), "new_annotations_SS.txt");
    let written = EventTable::read(&output).unwrap();
    assert_eq!(written.len(), 5);
    assert_eq!(written.records()[0].label, Label::Unknown);
    assert_eq!(written.records()[2].label, Label::ClosedRing);
    assert_eq!(fs::read_to_string(&excluded).unwrap(), "scan_1.json\nscan_4.json\n");
}

#[test]
fn test_blocked_cyclones_never_shown() {
    let dir = scratch_dir();
    let mut catalog = Catalog::empty();
    catalog.over_land.insert(2);
    catalog.excluded.insert(3);
    let records = (1..=4).map(|id| vortex_record(dir.path(), id, Label::Unknown)).collect();
    let table = EventTable::read(write_event_table(dir.path(), records)).unwrap();
    let store = ScanStore::new(dir.path());

    let mut session = AnnotationSession::new(table, &catalog);
    assert_eq!(session.candidates(), &[0, 3]);

    let mut ui = frontend(dir.path(), "t
f
");
    let outcome = run_session(&mut session, &store, &mut ui).unwrap().unwrap();

    let transcript = String::from_utf8(ui.into_output()).unwrap();
    assert!(transcript.contains("[1/2] scan_1.json"));
    assert!(transcript.contains("[2/2] scan_4.json"));
    assert!(!transcript.contains("scan_2.json"));
    assert!(!transcript.contains("scan_3.json"));

    let output = dir.path().join("new_annotations_SS.txt");
    write_outcome(&outcome, &output, None).unwrap();
    let labels: Vec<Label> = EventTable::read(&output)
        .unwrap()
        .records()
        .iter()
        .map(|r| r.label)
        .collect();
    assert_eq!(
        labels,
        vec![
            Label::ClosedRing,
            Label::Unknown,
            Label::Unknown,
            Label::NotClosedRing,
        ]
    );
}

#[test]
fn test_small_window_still_previews() {
    // Scan centre sits on a whole degree, so a 0.4 window rounds to zero width.
    let dir = scratch_dir();
    let table = EventTable::new(vec![vortex_record(dir.path(), 1, Label::Unknown)]);
    let center = table.records()[0].center();
    assert_eq!((center.lon, center.lat), (15.0, 32.0));
    let store = ScanStore::new(dir.path());

    let mut session = AnnotationSession::new(table, &Catalog::empty());
    let mut ui = frontend_with_window(dir.path(), "t
", 0.4);
    let outcome = run_session(&mut session, &store, &mut ui).unwrap().unwrap();

    assert_eq!(outcome.table.records()[0].label, Label::ClosedRing);
    assert!(dir.path().join("preview.png").exists());
}

#[test]
fn test_missing_scans_reported() {
    let dir = scratch_dir();
    let mut catalog = Catalog::empty();
    let table = setup(dir.path(), &mut catalog);
    fs::remove_file(dir.path().join(scan_file_name(4))).unwrap();

    let session = AnnotationSession::new(table, &catalog);
    let missing = missing_scans(&session, &ScanStore::new(dir.path()));
    assert_eq!(missing, vec!["scan_4.json".to_string()]);
}
