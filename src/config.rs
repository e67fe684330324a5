//! Job configuration and explicit pipeline wiring.

use crate::error::{BatchError, Result};
use crate::job::{ChunkJob, RunId, CHUNK_SIZE, DEFAULT_JOB_NAME, DEFAULT_STEP_NAME};
use crate::processor::{DateTransformer, TRANSACTION_DATE_FORMAT};
use crate::reader::{FlatFileReader, DEFAULT_READER_NAME};
use crate::sink::TransactionSink;
use crate::tokenizer::{LineTokenizer, TRANSACTION_FIELDS};
use crate::writer::ChunkWriter;
use std::env;
use std::path::PathBuf;

/// Environment variable consulted when no input path is given.
pub const INPUT_FILE_ENV: &str = "INPUT_FILE";

/// Environment variable consulted when no database path is given.
pub const DATABASE_ENV: &str = "BANK_BATCH_DATABASE";

pub const DEFAULT_DATABASE: &str = "bank-transactions.db";

/// The bank loading job as wired by [`JobConfig::build_job`].
pub type BankJob<S> = ChunkJob<FlatFileReader, DateTransformer, ChunkWriter<S>>;

/// Everything needed to assemble and run the bank loading job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    pub input: PathBuf,
    pub database: PathBuf,
    pub job_name: String,
    pub step_name: String,
    pub reader_name: String,
    pub chunk_size: usize,
    pub lines_to_skip: usize,
    pub delimiter: u8,
    pub date_format: String,
}

impl JobConfig {
    /// Configuration with the fixed job defaults for the given input.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        JobConfig {
            input: input.into(),
            database: PathBuf::from(DEFAULT_DATABASE),
            job_name: DEFAULT_JOB_NAME.to_string(),
            step_name: DEFAULT_STEP_NAME.to_string(),
            reader_name: DEFAULT_READER_NAME.to_string(),
            chunk_size: CHUNK_SIZE,
            lines_to_skip: 1,
            delimiter: b',',
            date_format: TRANSACTION_DATE_FORMAT.to_string(),
        }
    }

    /// Reads `<input.csv> [database.db]` from the command line arguments
    /// (program name excluded), falling back to [`INPUT_FILE_ENV`] and
    /// [`DATABASE_ENV`].
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        Self::resolve(args, |key| env::var(key).ok())
    }

    fn resolve<I, F>(args: I, lookup: F) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut args = args.into_iter();

        let input = args
            .next()
            .or_else(|| lookup(INPUT_FILE_ENV))
            .filter(|s| !s.is_empty())
            .ok_or(BatchError::MissingArgument)?;

        let mut config = JobConfig::new(input);
        if let Some(database) = args
            .next()
            .or_else(|| lookup(DATABASE_ENV))
            .filter(|s| !s.is_empty())
        {
            config.database = PathBuf::from(database);
        }
        Ok(config)
    }

    pub fn tokenizer(&self) -> LineTokenizer {
        LineTokenizer::new(self.delimiter, TRANSACTION_FIELDS)
    }

    /// Unopened reader over the configured input.
    pub fn reader(&self) -> FlatFileReader {
        FlatFileReader::from_path(&self.input)
            .name(self.reader_name.clone())
            .lines_to_skip(self.lines_to_skip)
            .tokenizer(self.tokenizer())
    }

    pub fn processor(&self) -> DateTransformer {
        DateTransformer::new(self.date_format.clone())
    }

    /// Assembles reader, transform stage and chunk writer into a job.
    pub fn build_job<S: TransactionSink>(&self, sink: S, run_id: RunId) -> BankJob<S> {
        ChunkJob::new(self.reader(), self.processor(), ChunkWriter::new(sink))
            .job_name(self.job_name.clone())
            .step_name(self.step_name.clone())
            .chunk_size(self.chunk_size)
            .run_id(run_id)
    }
}
