use agentscope::config::MapLocation;
use agentscope::domain::{DumpError, TableError};
use agentscope::dump;
use agentscope::table::{ExecveTable, NestedTableLayout, PinnedTable, PolicyFilterTable, TableLayout};

#[test]
fn test_missing_execve_table_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let location = MapLocation::new(dir.path(), "agent");
    let path = location.table_path(ExecveTable::NAME);

    let mut out = Vec::new();
    let err = dump::execve_map(&path, &mut out).unwrap_err();

    match err {
        DumpError::Table(TableError::NotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected NotFound, got {other}"),
    }
    assert!(out.is_empty(), "no partial output on failure");
}

#[test]
fn test_missing_policyfilter_table_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(PolicyFilterTable::NAME);

    let mut out = Vec::new();
    let err = dump::policyfilter_state(&path, &mut out).unwrap_err();

    assert!(matches!(err, DumpError::Table(TableError::NotFound { .. })));
    assert!(out.is_empty());
}

#[test]
fn test_open_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nothing-pinned-here");
    let err = PinnedTable::open(&path).err().expect("open should fail");
    assert!(err.to_string().contains("nothing-pinned-here"));
}
