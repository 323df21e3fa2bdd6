// SQLite-backed evaluation store

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row};

use evalgrid_core::evaluation::ReceivedFilter;
use evalgrid_core::{
    Category, CorrectionStats, EvaluationRecord, EvaluationSettings, EvaluationStore, NameMapping,
    NameValidity, NewEvaluation, Overview, Participant, StoreError, StoreErrorKind,
};

const TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS evaluations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    respondent_email TEXT NOT NULL,
    respondent_name TEXT NOT NULL,
    evaluation_week TEXT NOT NULL,
    evaluatee_name TEXT NOT NULL,
    evaluation_category TEXT NOT NULL,
    evaluation_content TEXT NOT NULL,
    is_anonymous INTEGER NOT NULL DEFAULT 1,
    is_hidden INTEGER NOT NULL DEFAULT 0,
    is_name_valid INTEGER DEFAULT NULL,       -- NULL=unknown, 1=valid, 0=invalid
    needs_name_correction INTEGER NOT NULL DEFAULT 0,
    original_evaluatee_name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS participants (
    official_name TEXT PRIMARY KEY,
    email TEXT,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS name_mappings (
    variant_name TEXT PRIMARY KEY,
    official_name TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

// Created after migrations so older databases gain the indexed columns first.
const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_evaluations_respondent ON evaluations(respondent_email);
CREATE INDEX IF NOT EXISTS idx_evaluations_evaluatee ON evaluations(evaluatee_name);
CREATE INDEX IF NOT EXISTS idx_evaluations_name_valid ON evaluations(is_name_valid);
"#;

/// Columns added after the first schema release: (name, declaration).
const MIGRATIONS: &[(&str, &str)] = &[
    ("is_name_valid", "INTEGER DEFAULT NULL"),
    ("needs_name_correction", "INTEGER NOT NULL DEFAULT 0"),
    ("original_evaluatee_name", "TEXT"),
];

const RECORD_COLUMNS: &str = "id, respondent_email, respondent_name, evaluatee_name, \
    original_evaluatee_name, evaluation_category, evaluation_week, evaluation_content, \
    is_anonymous, is_hidden, is_name_valid, needs_name_correction, created_at, updated_at";

/// `EvaluationStore` over a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| {
            StoreError::unavailable(format!("cannot open {}: {e}", path.display()))
        })?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(store_err)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        for (pragma, value) in [("journal_mode", "WAL"), ("synchronous", "NORMAL")] {
            if let Err(e) = conn.pragma_update(None, pragma, value) {
                log::warn!("PRAGMA {pragma} = {value} failed: {e}");
            }
        }

        conn.execute_batch(TABLES).map_err(store_err)?;
        migrate(&conn)?;
        conn.execute_batch(INDEXES).map_err(store_err)?;
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
            params![crate::SCHEMA_VERSION.to_string()],
        )
        .map_err(store_err)?;

        Ok(Self { conn: Mutex::new(conn) })
    }

    fn query_records(
        &self,
        where_clause: &str,
        order: &str,
        args: &[&str],
    ) -> Result<Vec<EvaluationRecord>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!("SELECT {RECORD_COLUMNS} FROM evaluations WHERE {where_clause} ORDER BY {order}");
        let mut stmt = conn.prepare(&sql).map_err(store_err)?;
        let rows = stmt
            .query_map(params_from_iter(args.iter()), record_from_row)
            .map_err(store_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(store_err)
    }

    fn count(&self, sql: &str) -> Result<usize, StoreError> {
        let conn = self.conn.lock();
        let n: i64 = conn.query_row(sql, [], |row| row.get(0)).map_err(store_err)?;
        Ok(n as usize)
    }
}

/// Add any columns an older database is missing.
fn migrate(conn: &Connection) -> Result<(), StoreError> {
    let mut stmt = conn
        .prepare("SELECT name FROM pragma_table_info('evaluations')")
        .map_err(store_err)?;
    let existing: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .map_err(store_err)?
        .collect::<Result<_, _>>()
        .map_err(store_err)?;

    for (column, decl) in MIGRATIONS {
        if existing.iter().any(|c| c == column) {
            continue;
        }
        conn.execute_batch(&format!("ALTER TABLE evaluations ADD COLUMN {column} {decl}"))
            .map_err(store_err)?;
        log::info!("migrated evaluations: added column {column}");
    }
    Ok(())
}

impl EvaluationStore for SqliteStore {
    fn insert_evaluation(&self, new: &NewEvaluation) -> Result<i64, StoreError> {
        let conn = self.conn.lock();
        let now = timestamp(Utc::now());
        conn.execute(
            "INSERT INTO evaluations
             (respondent_email, respondent_name, evaluation_week, evaluatee_name,
              evaluation_category, evaluation_content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![
                new.respondent_email,
                new.respondent_name,
                new.week,
                new.evaluatee_name,
                new.category.key(),
                new.content,
                now,
            ],
        )
        .map_err(store_err)?;
        Ok(conn.last_insert_rowid())
    }

    fn evaluation(&self, id: i64) -> Result<Option<EvaluationRecord>, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {RECORD_COLUMNS} FROM evaluations WHERE id = ?1"),
            params![id],
            record_from_row,
        )
        .optional()
        .map_err(store_err)
    }

    fn unvalidated_evaluations(&self) -> Result<Vec<EvaluationRecord>, StoreError> {
        self.query_records("is_name_valid IS NULL", "id", &[])
    }

    fn record_name_validity(
        &self,
        id: i64,
        validity: NameValidity,
        rewritten_name: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let flag = validity
            .as_flag()
            .ok_or_else(|| StoreError::query("cannot record an unknown name validity"))?;
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE evaluations
                 SET is_name_valid = ?1,
                     needs_name_correction = ?2,
                     evaluatee_name = COALESCE(?3, evaluatee_name),
                     updated_at = ?4
                 WHERE id = ?5 AND is_name_valid IS NULL",
                params![flag, !flag, rewritten_name, timestamp(at), id],
            )
            .map_err(store_err)?;
        Ok(changed == 1)
    }

    fn apply_name_correction(
        &self,
        id: i64,
        respondent_email: &str,
        corrected_name: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<EvaluationRecord>, StoreError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(store_err)?;

        let changed = tx
            .execute(
                "UPDATE evaluations
                 SET original_evaluatee_name = COALESCE(original_evaluatee_name, evaluatee_name),
                     evaluatee_name = ?1,
                     is_name_valid = 1,
                     needs_name_correction = 0,
                     updated_at = ?2
                 WHERE id = ?3 AND respondent_email = ?4",
                params![corrected_name, timestamp(at), id, respondent_email],
            )
            .map_err(store_err)?;
        if changed == 0 {
            return Ok(None);
        }

        let record = tx
            .query_row(
                &format!("SELECT {RECORD_COLUMNS} FROM evaluations WHERE id = ?1"),
                params![id],
                record_from_row,
            )
            .map_err(store_err)?;
        tx.commit().map_err(store_err)?;
        Ok(Some(record))
    }

    fn update_settings(
        &self,
        id: i64,
        respondent_email: &str,
        settings: &EvaluationSettings,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE evaluations
                 SET evaluation_content = COALESCE(?1, evaluation_content),
                     is_anonymous = COALESCE(?2, is_anonymous),
                     is_hidden = COALESCE(?3, is_hidden),
                     updated_at = ?4
                 WHERE id = ?5 AND respondent_email = ?6",
                params![
                    settings.content,
                    settings.is_anonymous,
                    settings.is_hidden,
                    timestamp(at),
                    id,
                    respondent_email,
                ],
            )
            .map_err(store_err)?;
        Ok(changed == 1)
    }

    fn evaluations_by_respondent(&self, respondent_email: &str) -> Result<Vec<EvaluationRecord>, StoreError> {
        self.query_records(
            "respondent_email = ?1",
            "evaluation_week DESC, created_at DESC, id DESC",
            &[respondent_email],
        )
    }

    fn evaluations_needing_correction(&self, respondent_email: &str) -> Result<Vec<EvaluationRecord>, StoreError> {
        self.query_records(
            "respondent_email = ?1 AND needs_name_correction = 1",
            "evaluation_week DESC, created_at DESC, id DESC",
            &[respondent_email],
        )
    }

    fn received_evaluations(
        &self,
        evaluatee_name: &str,
        filter: &ReceivedFilter,
    ) -> Result<Vec<EvaluationRecord>, StoreError> {
        let mut clause = String::from("evaluatee_name = ?1 AND is_hidden = 0");
        let mut args: Vec<&str> = vec![evaluatee_name];

        if let Some(category) = filter.category {
            args.push(category.key());
            clause.push_str(&format!(" AND evaluation_category = ?{}", args.len()));
        }
        if let Some(week) = filter.week.as_deref() {
            args.push(week);
            clause.push_str(&format!(" AND evaluation_week = ?{}", args.len()));
        }

        self.query_records(&clause, "evaluation_week DESC, created_at DESC, id DESC", &args)
    }

    fn correction_stats(&self, respondent_email: &str) -> Result<CorrectionStats, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(needs_name_correction = 1), 0),
                    COALESCE(SUM(is_name_valid = 0), 0),
                    COALESCE(SUM(is_name_valid = 1), 0)
             FROM evaluations WHERE respondent_email = ?1",
            params![respondent_email],
            |row| {
                Ok(CorrectionStats {
                    total: row.get::<_, i64>(0)? as usize,
                    needs_correction: row.get::<_, i64>(1)? as usize,
                    invalid_names: row.get::<_, i64>(2)? as usize,
                    valid_names: row.get::<_, i64>(3)? as usize,
                })
            },
        )
        .map_err(store_err)
    }

    fn weeks(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT DISTINCT evaluation_week FROM evaluations ORDER BY evaluation_week DESC")
            .map_err(store_err)?;
        let rows = stmt.query_map([], |row| row.get(0)).map_err(store_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(store_err)
    }

    fn overview(&self) -> Result<Overview, StoreError> {
        Ok(Overview {
            evaluations: self.count("SELECT COUNT(*) FROM evaluations")?,
            weeks: self.count("SELECT COUNT(DISTINCT evaluation_week) FROM evaluations")?,
            participants: self.count("SELECT COUNT(*) FROM participants")?,
            mappings: self.count("SELECT COUNT(*) FROM name_mappings")?,
            pending_reconciliation: self
                .count("SELECT COUNT(*) FROM evaluations WHERE is_name_valid IS NULL")?,
            needing_correction: self
                .count("SELECT COUNT(*) FROM evaluations WHERE needs_name_correction = 1")?,
        })
    }

    fn upsert_participant(&self, participant: &Participant) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO participants (official_name, email, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(official_name) DO UPDATE SET
                email = excluded.email,
                updated_at = excluded.updated_at",
            params![participant.official_name, participant.email, timestamp(Utc::now())],
        )
        .map_err(store_err)?;
        Ok(())
    }

    fn participant_exists(&self, official_name: &str) -> Result<bool, StoreError> {
        let conn = self.conn.lock();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM participants WHERE official_name = ?1)",
            params![official_name],
            |row| row.get(0),
        )
        .map_err(store_err)
    }

    fn participants(&self) -> Result<Vec<Participant>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT official_name, email FROM participants ORDER BY official_name")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Participant {
                    official_name: row.get(0)?,
                    email: row.get(1)?,
                })
            })
            .map_err(store_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(store_err)
    }

    fn put_name_mapping(&self, mapping: &NameMapping) -> Result<(), StoreError> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO name_mappings (variant_name, official_name, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(variant_name) DO UPDATE SET
                official_name = excluded.official_name,
                updated_at = excluded.updated_at",
            params![mapping.variant_name, mapping.official_name, timestamp(Utc::now())],
        )
        .map_err(store_err)?;
        Ok(())
    }

    fn name_mappings(&self) -> Result<Vec<NameMapping>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT variant_name, official_name FROM name_mappings ORDER BY variant_name")
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(NameMapping {
                    variant_name: row.get(0)?,
                    official_name: row.get(1)?,
                })
            })
            .map_err(store_err)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(store_err)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<EvaluationRecord> {
    let category_key: String = row.get(5)?;
    let category = Category::from_key(&category_key).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            Type::Text,
            format!("unknown category: {category_key}").into(),
        )
    })?;

    Ok(EvaluationRecord {
        id: row.get(0)?,
        respondent_email: row.get(1)?,
        respondent_name: row.get(2)?,
        evaluatee_name: row.get(3)?,
        original_evaluatee_name: row.get(4)?,
        category,
        week: row.get(6)?,
        content: row.get(7)?,
        is_anonymous: row.get(8)?,
        is_hidden: row.get(9)?,
        name_validity: NameValidity::from_flag(row.get(10)?),
        needs_name_correction: row.get(11)?,
        created_at: parse_timestamp(row, 12)?,
        updated_at: parse_timestamp(row, 13)?,
    })
}

/// Fixed-width UTC text so lexical order matches time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn store_err(e: rusqlite::Error) -> StoreError {
    let kind = match e.sqlite_error_code() {
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::ReadOnly
            | ErrorCode::DiskFull
            | ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt,
        ) => StoreErrorKind::Unavailable,
        Some(ErrorCode::ConstraintViolation) => StoreErrorKind::Constraint,
        _ => StoreErrorKind::Query,
    };
    StoreError::new(kind, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_eval(email: &str, evaluatee: &str, week: &str) -> NewEvaluation {
        NewEvaluation {
            respondent_email: email.into(),
            respondent_name: "Aoki".into(),
            evaluatee_name: evaluatee.into(),
            category: Category::ValuePractice,
            week: week.into(),
            content: "good job".into(),
        }
    }

    #[test]
    fn inserted_records_start_unknown() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Suzuky", "W1")).unwrap();

        let rec = store.evaluation(id).unwrap().unwrap();
        assert_eq!(rec.name_validity, NameValidity::Unknown);
        assert!(!rec.needs_name_correction);
        assert!(rec.is_anonymous);
        assert!(!rec.is_hidden);
        assert_eq!(rec.original_evaluatee_name, None);
        assert_eq!(store.unvalidated_evaluations().unwrap().len(), 1);
    }

    #[test]
    fn validity_is_written_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Suzuky", "W1")).unwrap();

        assert!(store
            .record_name_validity(id, NameValidity::Valid, Some("Suzuki"), Utc::now())
            .unwrap());
        assert!(!store
            .record_name_validity(id, NameValidity::Invalid, None, Utc::now())
            .unwrap());

        let rec = store.evaluation(id).unwrap().unwrap();
        assert_eq!(rec.name_validity, NameValidity::Valid);
        assert_eq!(rec.evaluatee_name, "Suzuki");
        assert!(store.unvalidated_evaluations().unwrap().is_empty());
    }

    #[test]
    fn invalid_raises_correction_flag() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Nobody", "W1")).unwrap();
        store.record_name_validity(id, NameValidity::Invalid, None, Utc::now()).unwrap();

        let rec = store.evaluation(id).unwrap().unwrap();
        assert!(rec.needs_name_correction);
        assert!(rec.is_consistent());
        assert_eq!(store.evaluations_needing_correction("a@co.com").unwrap().len(), 1);
    }

    #[test]
    fn unknown_validity_cannot_be_recorded() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "X", "W1")).unwrap();
        assert!(store.record_name_validity(id, NameValidity::Unknown, None, Utc::now()).is_err());
    }

    #[test]
    fn correction_snapshots_first_name_only() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Suzuky", "W1")).unwrap();

        let rec = store.apply_name_correction(id, "a@co.com", "Suzuki", Utc::now()).unwrap().unwrap();
        assert_eq!(rec.original_evaluatee_name.as_deref(), Some("Suzuky"));
        assert_eq!(rec.evaluatee_name, "Suzuki");
        assert_eq!(rec.name_validity, NameValidity::Valid);

        let rec = store.apply_name_correction(id, "a@co.com", "Sato", Utc::now()).unwrap().unwrap();
        assert_eq!(rec.original_evaluatee_name.as_deref(), Some("Suzuky"));
        assert_eq!(rec.evaluatee_name, "Sato");
    }

    #[test]
    fn correction_requires_ownership() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Suzuky", "W1")).unwrap();
        assert!(store.apply_name_correction(id, "b@co.com", "Suzuki", Utc::now()).unwrap().is_none());
        assert!(store.apply_name_correction(id + 1, "a@co.com", "Suzuki", Utc::now()).unwrap().is_none());
        assert_eq!(store.evaluation(id).unwrap().unwrap().evaluatee_name, "Suzuky");
    }

    #[test]
    fn settings_leave_name_state_alone() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = store.insert_evaluation(&new_eval("a@co.com", "Nobody", "W1")).unwrap();
        store.record_name_validity(id, NameValidity::Invalid, None, Utc::now()).unwrap();

        let settings = EvaluationSettings {
            content: Some("great".into()),
            is_anonymous: Some(false),
            is_hidden: None,
        };
        assert!(store.update_settings(id, "a@co.com", &settings, Utc::now()).unwrap());
        assert!(!store.update_settings(id, "b@co.com", &settings, Utc::now()).unwrap());

        let rec = store.evaluation(id).unwrap().unwrap();
        assert_eq!(rec.content, "great");
        assert!(!rec.is_anonymous);
        assert!(!rec.is_hidden);
        assert_eq!(rec.name_validity, NameValidity::Invalid);
        assert!(rec.needs_name_correction);
    }

    #[test]
    fn received_filters_and_hides() {
        let store = SqliteStore::open_in_memory().unwrap();
        let w1 = store.insert_evaluation(&new_eval("a@co.com", "Suzuki", "W1")).unwrap();
        let w2 = store.insert_evaluation(&new_eval("b@co.com", "Suzuki", "W2")).unwrap();
        let hidden = store.insert_evaluation(&new_eval("c@co.com", "Suzuki", "W2")).unwrap();
        store.insert_evaluation(&new_eval("a@co.com", "Sato", "W2")).unwrap();

        let hide = EvaluationSettings { is_hidden: Some(true), ..Default::default() };
        store.update_settings(hidden, "c@co.com", &hide, Utc::now()).unwrap();

        let all = store.received_evaluations("Suzuki", &ReceivedFilter::default()).unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![w2, w1]);

        let filter = ReceivedFilter { category: None, week: Some("W1".into()) };
        let only_w1 = store.received_evaluations("Suzuki", &filter).unwrap();
        assert_eq!(only_w1.len(), 1);
        assert_eq!(only_w1[0].id, w1);

        let filter = ReceivedFilter { category: Some(Category::Contribution), week: None };
        assert!(store.received_evaluations("Suzuki", &filter).unwrap().is_empty());
    }

    #[test]
    fn participants_upsert_by_name() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .upsert_participant(&Participant { official_name: "Suzuki".into(), email: None })
            .unwrap();
        store
            .upsert_participant(&Participant {
                official_name: "Suzuki".into(),
                email: Some("suzuki@co.com".into()),
            })
            .unwrap();

        let all = store.participants().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].email.as_deref(), Some("suzuki@co.com"));
        assert!(store.participant_exists("Suzuki").unwrap());
        assert!(!store.participant_exists("suzuki").unwrap());
    }

    #[test]
    fn stats_and_overview_count_current_state() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.insert_evaluation(&new_eval("a@co.com", "Suzuki", "W1")).unwrap();
        let b = store.insert_evaluation(&new_eval("a@co.com", "Nobody", "W2")).unwrap();
        store.insert_evaluation(&new_eval("a@co.com", "Later", "W2")).unwrap();
        store.record_name_validity(a, NameValidity::Valid, None, Utc::now()).unwrap();
        store.record_name_validity(b, NameValidity::Invalid, None, Utc::now()).unwrap();

        let stats = store.correction_stats("a@co.com").unwrap();
        assert_eq!(stats, CorrectionStats { total: 3, needs_correction: 1, invalid_names: 1, valid_names: 1 });
        assert_eq!(store.correction_stats("z@co.com").unwrap(), CorrectionStats::default());

        store
            .put_name_mapping(&NameMapping { variant_name: "Suzuky".into(), official_name: "Suzuki".into() })
            .unwrap();
        let o = store.overview().unwrap();
        assert_eq!(o.evaluations, 3);
        assert_eq!(o.weeks, 2);
        assert_eq!(o.mappings, 1);
        assert_eq!(o.pending_reconciliation, 1);
        assert_eq!(o.needing_correction, 1);
        assert_eq!(store.weeks().unwrap(), vec!["W2".to_string(), "W1".to_string()]);
    }

    #[test]
    fn older_database_is_migrated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE evaluations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    respondent_email TEXT NOT NULL,
                    respondent_name TEXT NOT NULL,
                    evaluation_week TEXT NOT NULL,
                    evaluatee_name TEXT NOT NULL,
                    evaluation_category TEXT NOT NULL,
                    evaluation_content TEXT NOT NULL,
                    is_anonymous INTEGER NOT NULL DEFAULT 1,
                    is_hidden INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );
                INSERT INTO evaluations
                    (respondent_email, respondent_name, evaluation_week, evaluatee_name,
                     evaluation_category, evaluation_content, created_at, updated_at)
                VALUES ('a@co.com', 'Aoki', 'W1', 'Suzuky', 'contribution', 'x',
                        '2024-05-01T00:00:00.000000Z', '2024-05-01T00:00:00.000000Z');",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        let pending = store.unvalidated_evaluations().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].category, Category::Contribution);
        assert!(!pending[0].needs_name_correction);

        // Reopening is a no-op.
        drop(store);
        assert!(SqliteStore::open(&path).is_ok());
    }
}
