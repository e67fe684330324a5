//! Bank Batch Loader CLI
//!
//! Loads a bank transaction CSV into a SQLite database in chunks of 100
//! records and prints a one-line run summary.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- transactions.csv bank.db
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `info` or `debug` to control logging verbosity
//! - `INPUT_FILE`: Input file used when no argument is given
//! - `BANK_BATCH_DATABASE`: Database used when no second argument is given

use bank_batch_loader::{JobConfig, JobRepository, Result, SqliteSink};
use log::info;
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = JobConfig::from_args(env::args().skip(1))?;
    info!(
        "Loading {} into {}",
        config.input.display(),
        config.database.display()
    );

    let repository = JobRepository::open(&config.database)?;
    let run_id = repository.next_run_id(&config.job_name)?;
    let sink = SqliteSink::open(&config.database)?;

    let mut report = config.build_job(sink, run_id).run();
    repository.save(&report)?;

    let stdout = io::stdout();
    let mut writer = csv::Writer::from_writer(stdout.lock());
    writer.serialize(report.summary())?;
    writer.flush()?;

    match report.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
