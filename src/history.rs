use chrono::{DateTime, Local, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::io;

use crate::error::{Result, StoreError};
use crate::store::{KeyValueStore, MemoryStore};

/// Key under which the serialized session list is stored
pub const HISTORY_KEY: &str = "history";
/// Key holding the last stored value that failed to parse
pub const CORRUPT_KEY: &str = "history.corrupt";

/// A finalized workout session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(with = "iso_millis")]
    pub date: DateTime<Utc>,
    pub pullups: u32,
    pub time: String,
}

impl SessionRecord {
    /// The date is truncated to milliseconds, the precision it is stored at.
    pub fn new(date: DateTime<Utc>, pullups: u32, time: impl Into<String>) -> Self {
        Self {
            date: date.trunc_subsecs(3),
            pullups,
            time: time.into(),
        }
    }

    /// Session date in the local timezone, for display
    pub fn local_date_label(&self) -> String {
        self.date
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
    }
}

// ISO-8601 in UTC with millisecond precision, e.g. 2024-05-01T09:30:00.000Z
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Aggregate figures shown above the history list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub sessions: usize,
    pub total_pullups: u64,
    pub best: Option<SessionRecord>,
}

impl HistorySummary {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        // On ties the earliest session is the best one
        let best = records
            .iter()
            .max_by(|a, b| a.pullups.cmp(&b.pullups).then(b.date.cmp(&a.date)))
            .cloned();

        Self {
            sessions: records.len(),
            total_pullups: records.iter().map(|r| r.pullups as u64).sum(),
            best,
        }
    }
}

/// Append-only list of sessions persisted under [`HISTORY_KEY`]
pub struct HistoryStore {
    kv: Box<dyn KeyValueStore>,
}

impl HistoryStore {
    pub fn new(kv: Box<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()))
    }

    /// Read-modify-write the stored list with `record` appended.
    ///
    /// An unparseable stored value is copied to [`CORRUPT_KEY`] and replaced
    /// by a fresh list rather than failing every future submit.
    pub fn append(&mut self, record: SessionRecord) -> std::result::Result<(), StoreError> {
        let mut records = match self.kv.get(HISTORY_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<SessionRecord>>(&raw) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(error = %e, backup = CORRUPT_KEY, "stored history is unreadable, preserving it");
                    self.kv.set(CORRUPT_KEY, &raw)?;
                    Vec::new()
                }
            },
        };

        records.push(record);
        let encoded = serde_json::to_string(&records)?;
        self.kv.set(HISTORY_KEY, &encoded)?;
        tracing::debug!(sessions = records.len(), "history written");
        Ok(())
    }

    /// All stored sessions in insertion order. Absent or unreadable data is an empty history.
    pub fn load_all(&self) -> Vec<SessionRecord> {
        let raw = match self.kv.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read history");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored history is unreadable, showing it as empty");
            Vec::new()
        })
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_records(&self.load_all())
    }
}

/// Write `records` as CSV with a `date,pullups,time` header
pub fn export_csv<W: io::Write>(records: &[SessionRecord], writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    wtr.write_record(["date", "pullups", "time"])?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, 0).unwrap()
    }

    /// Store whose reads work but whose writes always fail
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> std::result::Result<(), StoreError> {
            Err(StoreError::Unavailable("read-only".into()))
        }
    }

    #[test]
    fn record_date_matches_stored_precision() {
        let date = at(9, 0) + chrono::Duration::nanoseconds(720_100_179);
        let record = SessionRecord::new(date, 4, "00:01:00");
        assert_eq!(record.date, at(9, 0) + chrono::Duration::milliseconds(720));

        let mut store = HistoryStore::in_memory();
        store.append(record.clone()).unwrap();
        assert_eq!(store.load_all(), vec![record]);
    }

    #[test]
    fn load_all_without_data_is_empty() {
        let store = HistoryStore::in_memory();
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let mut store = HistoryStore::in_memory();
        store.append(SessionRecord::new(at(9, 0), 10, "00:05:30")).unwrap();
        store.append(SessionRecord::new(at(18, 0), 12, "00:07:02")).unwrap();

        let records = store.load_all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pullups, 10);
        assert_eq!(records[1].pullups, 12);
        assert_eq!(records[1].time, "00:07:02");
    }

    #[test]
    fn wire_format_matches_stored_layout() {
        let record = SessionRecord::new(at(9, 30), 10, "00:05:30");
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-05-01T09:30:00.000Z","pullups":10,"time":"00:05:30"}"#
        );
    }

    #[test]
    fn reads_records_written_elsewhere() {
        let mut kv = MemoryStore::new();
        kv.set(
            HISTORY_KEY,
            r#"[{"date":"2023-11-02T07:15:42.123Z","pullups":25,"time":"00:31:10"}]"#,
        )
        .unwrap();
        let store = HistoryStore::new(Box::new(kv));

        let records = store.load_all();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pullups, 25);
        assert_eq!(records[0].date.timestamp_subsec_millis(), 123);
    }

    #[test]
    fn unparseable_data_loads_as_empty() {
        let mut kv = MemoryStore::new();
        kv.set(HISTORY_KEY, "{not json").unwrap();
        let store = HistoryStore::new(Box::new(kv));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn append_over_corrupt_data_preserves_raw_value() {
        let mut kv = MemoryStore::new();
        kv.set(HISTORY_KEY, "garbage").unwrap();
        let mut store = HistoryStore::new(Box::new(kv));

        store.append(SessionRecord::new(at(9, 0), 3, "00:01:00")).unwrap();

        assert_eq!(store.load_all().len(), 1);
        assert_eq!(store.kv.get(CORRUPT_KEY).unwrap().as_deref(), Some("garbage"));
    }

    #[test]
    fn append_surfaces_write_failure() {
        let mut store = HistoryStore::new(Box::new(ReadOnlyStore(MemoryStore::new())));
        let err = store
            .append(SessionRecord::new(at(9, 0), 3, "00:01:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn summary_totals_and_best() {
        let records = vec![
            SessionRecord::new(at(8, 0), 12, "00:10:00"),
            SessionRecord::new(at(9, 0), 20, "00:12:00"),
            SessionRecord::new(at(10, 0), 20, "00:09:00"),
        ];
        let summary = HistorySummary::from_records(&records);
        assert_eq!(summary.sessions, 3);
        assert_eq!(summary.total_pullups, 52);
        assert_eq!(summary.best.map(|r| r.date), Some(at(9, 0)));
    }

    #[test]
    fn summary_of_nothing() {
        assert_eq!(HistorySummary::from_records(&[]), HistorySummary::default());
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let records = vec![SessionRecord::new(at(9, 30), 10, "00:05:30")];
        let mut out = Vec::new();
        export_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "date,pullups,time\n2024-05-01T09:30:00.000Z,10,00:05:30\n"
        );
    }

    #[test]
    fn csv_export_of_empty_history_is_header_only() {
        let mut out = Vec::new();
        export_csv(&[], &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "date,pullups,time\n");
    }
}
