//! Tests for reading, relabeling and writing event tables.

use ring_common::{EventRecord, EventTable, Label};

// ============================================================================
// Helpers
// ============================================================================

fn table_with_extra_columns() -> &'static str {
    "cyclone_id\tdate\tfile_name\tlon\tlat\tlabel\tslabel\tpressure\n\
     1328\t2014-11-07\tascat_1328.nc\t15.5\t36.25\t1\t1\t990.5\n\
     1001\t2015-01-02\tascat_1001.nc\t3.0\t41.0\tidk\t0\t1002\n\
     1700\t2019-12-20\tascat_1700.nc\t\t\t0\t1\t1010\n"
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_unknown_columns_survive_relabeling() {
    let mut table = EventTable::parse(table_with_extra_columns()).unwrap();
    table.records_mut()[1].label = Label::ClosedRing;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new_annotations.txt");
    table.write(&path).unwrap();

    let reread = EventTable::read(&path).unwrap();
    assert_eq!(reread.header(), table.header());
    assert_eq!(reread.records()[1].label, Label::ClosedRing);
    assert_eq!(reread.records()[1].extra.get("date").unwrap(), "2015-01-02");
    assert_eq!(reread.records()[0].extra.get("pressure").unwrap(), "990.5");
}

#[test]
fn test_missing_coordinates_written_as_empty_cells() {
    let table = EventTable::parse(table_with_extra_columns()).unwrap();
    let text = table.to_tsv_string();
    let last = text.lines().last().unwrap();
    let cells: Vec<&str> = last.split('\t').collect();
    assert_eq!(cells[3], "");
    assert_eq!(cells[4], "");
}

#[test]
fn test_standard_header_for_new_tables() {
    let table = EventTable::new(vec![EventRecord::new(
        7,
        "scan.json",
        12.0,
        35.0,
        Label::Unknown,
    )]);
    let text = table.to_tsv_string();
    assert_eq!(
        text.lines().next().unwrap(),
        "cyclone_id\tfile_name\tlon\tlat\tlabel\tslabel"
    );
    assert_eq!(text.lines().nth(1).unwrap(), "7\tscan.json\t12\t35\tidk\t");
}

#[test]
fn test_review_flags_from_table() {
    let table = EventTable::parse(table_with_extra_columns()).unwrap();
    let flags: Vec<bool> = table.records().iter().map(|r| r.needs_review()).collect();
    assert_eq!(flags, vec![false, true, true]);
}

#[test]
fn test_blank_lines_are_ignored() {
    let text = "cyclone_id\tfile_name\tlon\tlat\tlabel\n\n1\ta.nc\t1\t2\t0\n\n";
    let table = EventTable::parse(text).unwrap();
    assert_eq!(table.len(), 1);
}
