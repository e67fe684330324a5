//! Chunk-oriented job orchestration.
//!
//! A [`ChunkJob`] drives one step: read a record, transform it, accumulate it
//! into the current chunk, and hand the chunk to the writer once it is full
//! or the input runs out. A successful write commits the chunk; the first
//! error from any stage fails the job and no further input is pulled.
//!
//! ```text
//! Idle --run--> Running --input exhausted, last chunk written--> Completed
//!                  \------any read/transform/write error-------> Failed
//! ```

use crate::error::{BatchError, Result};
use crate::processor::ItemProcessor;
use crate::reader::ItemReader;
use crate::record::TransactionRecord;
use crate::writer::ItemWriter;
use chrono::{Local, NaiveDateTime};
use log::{error, info};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Records per chunk, and therefore per sink transaction.
pub const CHUNK_SIZE: usize = 100;

pub const DEFAULT_JOB_NAME: &str = "bank-data-loader-job";
pub const DEFAULT_STEP_NAME: &str = "step-load-data";

static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Tag distinguishing repeated runs of the same job.
///
/// [`RunId::next`] is a process-wide counter and starts over when the process
/// restarts. Use [`JobRepository::next_run_id`](crate::repository::JobRepository::next_run_id)
/// for ids that keep increasing across restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RunId(u64);

impl RunId {
    pub fn new(value: u64) -> Self {
        RunId(value)
    }

    /// Next id from the in-process counter.
    pub fn next() -> Self {
        RunId(NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a job run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobStatus {
    Idle,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Idle => "IDLE",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "IDLE" => Ok(JobStatus::Idle),
            "RUNNING" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed),
            other => Err(format!("unknown job status {:?}", other)),
        }
    }
}

/// Outcome of one [`ChunkJob::run`].
#[derive(Debug)]
pub struct JobReport {
    pub run_id: RunId,
    pub job_name: String,
    pub step_name: String,
    pub status: JobStatus,

    /// Records successfully read, including one that later failed to transform.
    pub read_count: u64,

    /// Records in committed chunks.
    pub write_count: u64,

    /// Chunks committed.
    pub commit_count: u64,

    /// The error that failed the run, if any.
    pub error: Option<BatchError>,

    pub started_at: NaiveDateTime,
    pub finished_at: NaiveDateTime,
}

impl JobReport {
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// Exit message in the form recorded by the job repository.
    pub fn exit_message(&self) -> String {
        match &self.error {
            Some(e) => e.to_string(),
            None => String::new(),
        }
    }

    /// Flat, serializable view of the report.
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            run_id: self.run_id.value(),
            job: self.job_name.clone(),
            step: self.step_name.clone(),
            status: self.status.as_str(),
            read: self.read_count,
            written: self.write_count,
            commits: self.commit_count,
            exit_message: self.exit_message(),
        }
    }
}

/// One-line summary of a run, written as CSV by the CLI.
#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub run_id: u64,
    pub job: String,
    pub step: String,
    pub status: &'static str,
    pub read: u64,
    pub written: u64,
    pub commits: u64,
    pub exit_message: String,
}

#[derive(Debug, Default)]
struct StepCounts {
    read: u64,
    written: u64,
    commits: u64,
}

/// Single-step chunk orchestrator over a reader, processor and writer.
///
/// Processing is strictly sequential: a chunk is read and transformed in
/// full, written, and only then is the next chunk started. Chunks written
/// before a failure stay committed; nothing is retried or skipped.
pub struct ChunkJob<R, P, W> {
    job_name: String,
    step_name: String,
    run_id: RunId,
    chunk_size: usize,
    status: JobStatus,
    reader: R,
    processor: P,
    writer: W,
}

impl<R, P, W> ChunkJob<R, P, W>
where
    R: ItemReader,
    P: ItemProcessor,
    W: ItemWriter,
{
    pub fn new(reader: R, processor: P, writer: W) -> Self {
        ChunkJob {
            job_name: DEFAULT_JOB_NAME.to_string(),
            step_name: DEFAULT_STEP_NAME.to_string(),
            run_id: RunId::next(),
            chunk_size: CHUNK_SIZE,
            status: JobStatus::Idle,
            reader,
            processor,
            writer,
        }
    }

    pub fn job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = name.into();
        self
    }

    pub fn step_name(mut self, name: impl Into<String>) -> Self {
        self.step_name = name.into();
        self
    }

    pub fn run_id(mut self, run_id: RunId) -> Self {
        self.run_id = run_id;
        self
    }

    /// Commit interval. Values below 1 are treated as 1.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size.max(1);
        self
    }

    /// `Idle` before [`run`](Self::run), `Completed` or `Failed` after it.
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Runs the step to completion or first failure.
    ///
    /// The reader is forward-only, so running a finished job again reads
    /// nothing more.
    pub fn run(&mut self) -> JobReport {
        let started_at = Local::now().naive_local();
        info!(
            "Job [{}] run {} started, step [{}] with chunk size {}",
            self.job_name, self.run_id, self.step_name, self.chunk_size
        );

        let mut counts = StepCounts::default();
        let outcome = self.execute(&mut counts);

        self.status = match &outcome {
            Ok(()) => JobStatus::Completed,
            Err(e) => {
                error!(
                    "Job [{}] run {} failed after {} committed chunk(s): {}",
                    self.job_name, self.run_id, counts.commits, e
                );
                JobStatus::Failed
            }
        };

        info!(
            "Job [{}] run {} {}: read={} written={} commits={}",
            self.job_name, self.run_id, self.status, counts.read, counts.written, counts.commits
        );

        JobReport {
            run_id: self.run_id,
            job_name: self.job_name.clone(),
            step_name: self.step_name.clone(),
            status: self.status,
            read_count: counts.read,
            write_count: counts.written,
            commit_count: counts.commits,
            error: outcome.err(),
            started_at,
            finished_at: Local::now().naive_local(),
        }
    }

    fn execute(&mut self, counts: &mut StepCounts) -> Result<()> {
        self.reader.open()?;
        self.status = JobStatus::Running;

        loop {
            let (chunk, exhausted) = self.read_chunk(counts)?;

            if !chunk.is_empty() {
                let size = chunk.len() as u64;
                self.writer.write(chunk)?;
                counts.written += size;
                counts.commits += 1;
                info!(
                    "[{}] committed chunk {} ({} records, {} total)",
                    self.step_name, counts.commits, size, counts.written
                );
            }

            if exhausted {
                return Ok(());
            }
        }
    }

    /// Pulls up to `chunk_size` transformed records. The flag is `true` once
    /// the reader reported end of input.
    fn read_chunk(&mut self, counts: &mut StepCounts) -> Result<(Vec<TransactionRecord>, bool)> {
        let mut chunk = Vec::with_capacity(self.chunk_size);

        while chunk.len() < self.chunk_size {
            let Some(record) = self.reader.read()? else {
                return Ok((chunk, true));
            };
            counts.read += 1;
            chunk.push(self.processor.process(record)?);
        }

        Ok((chunk, false))
    }
}
