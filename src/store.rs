use crate::error::{GraphLogError, Result};
use crate::record::LogRecord;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use tracing::info;

pub const DEVICE_MARKER: &str = "Device:";

const DEVICE_QUERY: &str = "SELECT Log_DateTime, Log_Entry FROM Log WHERE Log_Entry LIKE 'Device:%'";

/// Read-only handle on the HomeSeer SQLite log.
pub struct LogStore {
    conn: Connection,
}

impl LogStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|source| GraphLogError::StoreOpen {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened log store");
        Ok(Self { conn })
    }

    /// All device state rows, in the order the store returns them.
    ///
    /// No ORDER BY: series ordering relies on the store's insertion order.
    pub fn device_records(&self) -> Result<Vec<LogRecord>> {
        let mut stmt = self.conn.prepare(DEVICE_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(LogRecord {
                timestamp: column_text(row.get_ref(0)?),
                entry: column_text(row.get_ref(1)?),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            let record = row?;
            // LIKE is case-insensitive in SQLite; the marker is not.
            if record.entry.starts_with(DEVICE_MARKER) {
                out.push(record);
            }
        }
        info!(records = out.len(), "read device records");
        Ok(out)
    }
}

fn column_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    fn seed(path: &Path, rows: &[(&str, &str)]) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Log (Log_DateTime TEXT, Log_Type TEXT, Log_Entry TEXT);",
        )
        .unwrap();
        for (ts, entry) in rows {
            conn.execute(
                "INSERT INTO Log (Log_DateTime, Log_Type, Log_Entry) VALUES (?1, 'Device Control', ?2)",
                params![ts, entry],
            )
            .unwrap();
        }
    }

    #[test]
    fn reads_only_device_rows_in_store_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HomeSeerLog.hsd");
        seed(
            &path,
            &[
                ("2014-12-15 10:00:02", "Device: Porch Light Set to On"),
                ("2014-12-15 09:00:00", "Event: Sunset triggered"),
                ("2014-12-15 08:00:00", "Device: Thermostat to Heat 72(F)"),
                ("2014-12-15 07:00:00", "device: lowercase to 1"),
            ],
        );

        let store = LogStore::open(&path).unwrap();
        let records = store.device_records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, "2014-12-15 10:00:02");
        assert_eq!(records[0].entry, "Device: Porch Light Set to On");
        assert_eq!(records[1].entry, "Device: Thermostat to Heat 72(F)");
    }

    #[test]
    fn non_text_timestamps_are_stringified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.hsd");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE Log (Log_DateTime, Log_Entry TEXT);
             INSERT INTO Log VALUES (1418637600, 'Device: Fan to Off');",
        )
        .unwrap();
        drop(conn);

        let records = LogStore::open(&path).unwrap().device_records().unwrap();
        assert_eq!(records[0].timestamp, "1418637600");
    }

    #[test]
    fn missing_store_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = LogStore::open(&dir.path().join("missing.hsd")).err().unwrap();
        assert!(matches!(err, GraphLogError::StoreOpen { .. }));
    }

    #[test]
    fn store_without_log_table_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.hsd");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE Other (x INTEGER);")
            .unwrap();

        let store = LogStore::open(&path).unwrap();
        assert!(matches!(
            store.device_records(),
            Err(GraphLogError::StoreQuery(_))
        ));
    }
}
