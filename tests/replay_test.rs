// ABOUTME: Integration tests for statement replay using a recording sink
// ABOUTME: Covers schema/data replay, the error taxonomy, and cancellation

use anyhow::{bail, Result};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sqldump_importer::index::{index_dump, DumpIndex};
use sqldump_importer::replay::{replay_data, replay_schema, ReplayError};
use sqldump_importer::source::DumpSource;
use sqldump_importer::target::StatementSink;

/// Records every statement's raw bytes; optionally rejects chosen calls
#[derive(Default)]
struct RecordingSink {
    statements: Vec<Vec<u8>>,
    fail_calls: Vec<usize>,
    calls: usize,
}

impl RecordingSink {
    fn statement_text(&self, idx: usize) -> String {
        String::from_utf8(self.statements[idx].clone()).unwrap()
    }
}

impl StatementSink for RecordingSink {
    async fn execute(&mut self, statement: &[u8]) -> Result<()> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_calls.contains(&call) {
            bail!("simulated rejection of call {}", call);
        }
        self.statements.push(statement.to_vec());
        Ok(())
    }
}

/// Requests cancellation as soon as the first statement lands
struct CancelAfterFirstSink {
    statements: Vec<Vec<u8>>,
    cancel: Arc<AtomicBool>,
}

impl StatementSink for CancelAfterFirstSink {
    async fn execute(&mut self, statement: &[u8]) -> Result<()> {
        self.statements.push(statement.to_vec());
        self.cancel.store(true, Ordering::Relaxed);
        Ok(())
    }
}

fn fixture(content: &str) -> (tempfile::TempDir, DumpSource, DumpIndex) {
    let dir = tempfile::tempdir().unwrap();
    let path: PathBuf = dir.path().join("dump.sql");
    std::fs::write(&path, content).unwrap();
    let source = DumpSource::open(&path).unwrap();
    let index = index_dump(&source, None).unwrap();
    (dir, source, index)
}

const USERS_DUMP: &str = "-- dump header\n\
    CREATE TABLE `users` (\n  \
      `id` int(11) NOT NULL,\n  \
      `name` varchar(255)\n\
    ) ENGINE=InnoDB;\n\
    INSERT INTO `users` VALUES (1,'Alice');\n\
    INSERT INTO `users` VALUES (2,'Bob');\n\
    INSERT INTO `users` VALUES (3,'Carol');\n";

#[tokio::test]
async fn replay_schema_submits_full_create_statement() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink::default();

    replay_schema(&index, &source, "users", &mut sink)
        .await
        .unwrap();

    assert_eq!(sink.statements.len(), 1);
    let statement = sink.statement_text(0);
    assert!(statement.starts_with("CREATE TABLE `users`"));
    assert!(statement.contains("`name` varchar(255)"));
    assert!(statement.trim_end().ends_with("ENGINE=InnoDB;"));
}

#[tokio::test]
async fn replay_schema_unknown_table() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink::default();

    let err = replay_schema(&index, &source, "missing", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReplayError>(),
        Some(ReplayError::UnknownTable(t)) if t == "missing"
    ));
    assert!(sink.statements.is_empty());
}

#[tokio::test]
async fn replay_schema_missing_schema_for_orphan_table() {
    let (_dir, source, index) = fixture("INSERT INTO `orphan` VALUES (1);\n");
    let mut sink = RecordingSink::default();

    let err = replay_schema(&index, &source, "orphan", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReplayError>(),
        Some(ReplayError::MissingSchema(t)) if t == "orphan"
    ));
}

#[tokio::test]
async fn replay_schema_truncated_create_is_missing_schema() {
    let (_dir, source, index) = fixture("CREATE TABLE `cut` (\n  `id` int,\n");
    let mut sink = RecordingSink::default();

    let err = replay_schema(&index, &source, "cut", &mut sink)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReplayError>(),
        Some(ReplayError::MissingSchema(_))
    ));
}

#[tokio::test]
async fn replay_schema_surfaces_target_rejection() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink {
        fail_calls: vec![0],
        ..Default::default()
    };

    let err = replay_schema(&index, &source, "users", &mut sink)
        .await
        .unwrap_err();
    match err.downcast_ref::<ReplayError>() {
        Some(ReplayError::SchemaApplyFailed { table, message }) => {
            assert_eq!(table, "users");
            assert!(message.contains("simulated rejection"));
        }
        other => panic!("expected SchemaApplyFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn replay_data_preserves_file_order() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink::default();
    let cancel = AtomicBool::new(false);

    let report = replay_data(&index, &source, "users", &mut sink, &cancel, None)
        .await
        .unwrap();

    assert_eq!(report.applied, 3);
    assert_eq!(report.failed, 0);
    assert!(!report.cancelled);

    assert!(sink.statement_text(0).contains("'Alice'"));
    assert!(sink.statement_text(1).contains("'Bob'"));
    assert!(sink.statement_text(2).contains("'Carol'"));
    for statement in &sink.statements {
        assert!(statement.starts_with(b"INSERT INTO `users`"));
    }
}

#[tokio::test]
async fn replay_data_counts_failures_and_continues() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink {
        fail_calls: vec![1],
        ..Default::default()
    };
    let cancel = AtomicBool::new(false);

    let report = replay_data(&index, &source, "users", &mut sink, &cancel, None)
        .await
        .unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(report.failed, 1);
    // Bob was rejected, Alice and Carol still went through
    assert!(sink.statement_text(0).contains("'Alice'"));
    assert!(sink.statement_text(1).contains("'Carol'"));
}

#[tokio::test]
async fn replay_data_for_orphan_table_succeeds() {
    // Scenario C: data replays fine even when the schema never closed
    let (_dir, source, index) = fixture("INSERT INTO `orphan` VALUES (1);\n");
    let mut sink = RecordingSink::default();
    let cancel = AtomicBool::new(false);

    let report = replay_data(&index, &source, "orphan", &mut sink, &cancel, None)
        .await
        .unwrap();
    assert_eq!(report.applied, 1);
    assert!(sink.statements[0].starts_with(b"INSERT INTO `orphan`"));
}

#[tokio::test]
async fn replay_data_passes_non_utf8_bytes_through() {
    // latin-1 'café': the 0xE9 byte must reach the sink untouched, not as a
    // replacement character
    let dump: &[u8] = b"INSERT INTO `menu` VALUES (1,'caf\xe9');\n";
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dump.sql");
    std::fs::write(&path, dump).unwrap();
    let source = DumpSource::open(&path).unwrap();
    let index = index_dump(&source, None).unwrap();

    let mut sink = RecordingSink::default();
    let cancel = AtomicBool::new(false);
    let report = replay_data(&index, &source, "menu", &mut sink, &cancel, None)
        .await
        .unwrap();

    assert_eq!(report.applied, 1);
    assert_eq!(sink.statements[0], dump);
}

#[tokio::test]
async fn replay_data_unknown_table() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink::default();
    let cancel = AtomicBool::new(false);

    let err = replay_data(&index, &source, "missing", &mut sink, &cancel, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ReplayError>(),
        Some(ReplayError::UnknownTable(_))
    ));
}

#[tokio::test]
async fn replay_data_stops_when_cancelled() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let mut sink = RecordingSink::default();
    // Pre-set flag: the check happens before every statement
    let cancel = AtomicBool::new(true);

    let report = replay_data(&index, &source, "users", &mut sink, &cancel, None)
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.applied, 0);
    assert!(sink.statements.is_empty());
}

#[tokio::test]
async fn replay_data_checks_cancellation_between_statements() {
    let (_dir, source, index) = fixture(USERS_DUMP);
    let cancel = Arc::new(AtomicBool::new(false));
    let mut sink = CancelAfterFirstSink {
        statements: Vec::new(),
        cancel: Arc::clone(&cancel),
    };

    let report = replay_data(&index, &source, "users", &mut sink, &cancel, None)
        .await
        .unwrap();

    // The first statement completes, the check before the second one stops
    // the replay, and the remaining ranges are never attempted
    assert!(report.cancelled);
    assert_eq!(report.applied, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(sink.statements.len(), 1);
    assert!(sink.statements[0].starts_with(b"INSERT INTO `users`"));
}
