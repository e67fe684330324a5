//! Job run metadata stored alongside the transactions.
//!
//! Every finished run is recorded in `batch_job_execution`, which is also
//! where the next run id comes from. This makes run ids keep increasing
//! across process restarts as long as the same database is used.

use crate::error::Result;
use crate::job::{JobReport, JobStatus, RunId};
use chrono::NaiveDateTime;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// A run as recorded by [`JobRepository::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct JobExecution {
    pub run_id: RunId,
    pub job_name: String,
    pub status: JobStatus,
    pub read_count: u64,
    pub write_count: u64,
    pub commit_count: u64,
    pub exit_message: String,
    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

/// SQLite store of job executions.
pub struct JobRepository {
    conn: Connection,
}

impl JobRepository {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS batch_job_execution (
                job_name TEXT NOT NULL,
                run_id INTEGER NOT NULL,
                status TEXT NOT NULL,
                read_count INTEGER NOT NULL,
                write_count INTEGER NOT NULL,
                commit_count INTEGER NOT NULL,
                exit_message TEXT NOT NULL,
                started_at TEXT NOT NULL,
                finished_at TEXT NOT NULL,
                PRIMARY KEY (job_name, run_id)
            )
            "#,
            [],
        )?;
        Ok(JobRepository { conn })
    }

    /// One past the highest run id recorded for `job_name`, starting at 1.
    pub fn next_run_id(&self, job_name: &str) -> Result<RunId> {
        let last: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(run_id), 0) FROM batch_job_execution WHERE job_name = ?1",
            params![job_name],
            |row| row.get(0),
        )?;
        Ok(RunId::new(last as u64 + 1))
    }

    /// Records a finished run.
    pub fn save(&self, report: &JobReport) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO batch_job_execution (
                job_name, run_id, status, read_count, write_count,
                commit_count, exit_message, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                report.job_name,
                report.run_id.value() as i64,
                report.status.as_str(),
                report.read_count as i64,
                report.write_count as i64,
                report.commit_count as i64,
                report.exit_message(),
                report.started_at,
                report.finished_at,
            ],
        )?;
        debug!(
            "Recorded run {} of [{}] as {}",
            report.run_id, report.job_name, report.status
        );
        Ok(())
    }

    /// Most recent recorded run of `job_name`.
    pub fn last_execution(&self, job_name: &str) -> Result<Option<JobExecution>> {
        let execution = self
            .conn
            .query_row(
                r#"
                SELECT run_id, job_name, status, read_count, write_count,
                       commit_count, exit_message, started_at, finished_at
                FROM batch_job_execution
                WHERE job_name = ?1
                ORDER BY run_id DESC
                LIMIT 1
                "#,
                params![job_name],
                |row| {
                    let status: String = row.get(2)?;
                    let status = status.parse::<JobStatus>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            e.into(),
                        )
                    })?;

                    Ok(JobExecution {
                        run_id: RunId::new(row.get::<_, i64>(0)? as u64),
                        job_name: row.get(1)?,
                        status,
                        read_count: row.get::<_, i64>(3)? as u64,
                        write_count: row.get::<_, i64>(4)? as u64,
                        commit_count: row.get::<_, i64>(5)? as u64,
                        exit_message: row.get(6)?,
                        started_at: row.get(7)?,
                        finished_at: row.get(8)?,
                    })
                },
            )
            .optional()?;
        Ok(execution)
    }
}
