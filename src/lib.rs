//! # Bank Batch Loader
//!
//! A chunk-oriented batch job that reads bank transactions from a delimited
//! file, parses their dates, and persists them to SQLite in fixed-size
//! chunks.
//!
//! ## Design Principles
//!
//! - **Chunk commits**: every chunk of 100 records is written in one sink transaction
//! - **Fail fast**: any read, transform or write error fails the job; committed chunks stay
//! - **Explicit wiring**: reader, processor and writer are plain values passed to [`ChunkJob`]
//! - **Exact amounts**: monetary values use `rust_decimal`, never binary floating point
//!
//! ## Example
//!
//! ```no_run
//! use bank_batch_loader::{JobConfig, JobRepository, SqliteSink};
//!
//! let config = JobConfig::new("transactions.csv");
//! let repository = JobRepository::open(&config.database).unwrap();
//! let run_id = repository.next_run_id(&config.job_name).unwrap();
//! let sink = SqliteSink::open(&config.database).unwrap();
//!
//! let report = config.build_job(sink, run_id).run();
//! repository.save(&report).unwrap();
//! assert!(report.is_completed());
//! ```

pub mod amount;
pub mod config;
pub mod error;
pub mod job;
pub mod mapper;
pub mod processor;
pub mod reader;
pub mod record;
pub mod repository;
pub mod sink;
pub mod tokenizer;
pub mod writer;

pub use amount::Amount;
pub use config::{BankJob, JobConfig};
pub use error::{BatchError, Result, SinkError};
pub use job::{ChunkJob, JobReport, JobStatus, JobSummary, RunId, CHUNK_SIZE};
pub use mapper::RecordMapper;
pub use processor::{DateTransformer, ItemProcessor};
pub use reader::{FlatFileReader, ItemReader};
pub use record::TransactionRecord;
pub use repository::{JobExecution, JobRepository};
pub use sink::{SqliteSink, TransactionSink};
pub use tokenizer::{FieldSet, LineTokenizer};
pub use writer::{ChunkWriter, ItemWriter};
