//! Persistence target for committed chunks.
//!
//! [`SqliteSink`] stores transactions in a `bank_transaction` table and runs
//! every [`TransactionSink::save_all`] call inside one SQLite transaction.

use crate::amount::Amount;
use crate::error::SinkError;
use crate::record::TransactionRecord;
use chrono::NaiveDateTime;
use log::debug;
use rusqlite::{params, Connection, ErrorCode};
use std::path::Path;

/// Capability to persist a batch of records atomically.
///
/// Implementations must either make every record of the batch durable or
/// leave the store unchanged. Identifiers are caller-supplied; an id that
/// already exists fails the batch with [`SinkError::DuplicateKey`].
pub trait TransactionSink {
    fn save_all(&mut self, records: &[TransactionRecord]) -> Result<(), SinkError>;
}

impl<S: TransactionSink + ?Sized> TransactionSink for &mut S {
    fn save_all(&mut self, records: &[TransactionRecord]) -> Result<(), SinkError> {
        (**self).save_all(records)
    }
}

/// SQLite-backed [`TransactionSink`].
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, SinkError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, SinkError> {
        init_schema(&conn)?;
        Ok(SqliteSink { conn })
    }

    /// Number of persisted transactions.
    pub fn count(&self) -> Result<u64, SinkError> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM bank_transaction", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// All persisted transactions ordered by id.
    ///
    /// The raw date column is not stored, so `raw_transaction_date` is `None`
    /// and `line` is 0 on returned records.
    pub fn find_all(&self) -> Result<Vec<TransactionRecord>, SinkError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, account_id, transaction_date, transaction_type, amount
             FROM bank_transaction ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(TransactionRecord {
                id: row.get(0)?,
                account_id: row.get(1)?,
                raw_transaction_date: None,
                transaction_date: row.get::<_, Option<NaiveDateTime>>(2)?,
                transaction_type: row.get(3)?,
                amount: row.get::<_, Amount>(4)?,
                line: 0,
            })
        })?;

        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

impl TransactionSink for SqliteSink {
    fn save_all(&mut self, records: &[TransactionRecord]) -> Result<(), SinkError> {
        // Dropping `tx` without commit rolls the whole batch back.
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO bank_transaction
                     (id, account_id, transaction_date, transaction_type, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for record in records {
                stmt.execute(params![
                    record.id,
                    record.account_id,
                    record.transaction_date,
                    record.transaction_type,
                    record.amount,
                ])
                .map_err(|e| classify(e, record.id))?;
            }
        }
        tx.commit()?;

        debug!("Committed {} transactions", records.len());
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<(), SinkError> {
    conn.execute(
        r#"
        CREATE TABLE IF NOT EXISTS bank_transaction (
            id INTEGER PRIMARY KEY,
            account_id INTEGER NOT NULL,
            transaction_date TEXT,
            transaction_type TEXT,
            amount TEXT NOT NULL
        )
        "#,
        [],
    )?;
    Ok(())
}

/// Maps a key violation on `id` to [`SinkError::DuplicateKey`].
fn classify(err: rusqlite::Error, id: i64) -> SinkError {
    if let rusqlite::Error::SqliteFailure(e, _) = &err {
        if e.code == ErrorCode::ConstraintViolation
            && (e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
        {
            return SinkError::DuplicateKey { id };
        }
    }
    SinkError::Database(err)
}
