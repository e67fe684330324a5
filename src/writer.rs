//! Chunk writer: hands a full chunk to the sink as one unit.

use crate::error::Result;
use crate::record::TransactionRecord;
use crate::sink::TransactionSink;
use log::debug;

/// Writes one chunk, taking ownership of its records. Either the whole
/// chunk is persisted or the call fails.
///
/// Closures of type `FnMut(Vec<TransactionRecord>) -> Result<()>` are writers too.
pub trait ItemWriter {
    fn write(&mut self, chunk: Vec<TransactionRecord>) -> Result<()>;
}

impl<F> ItemWriter for F
where
    F: FnMut(Vec<TransactionRecord>) -> Result<()>,
{
    fn write(&mut self, chunk: Vec<TransactionRecord>) -> Result<()> {
        self(chunk)
    }
}

/// [`ItemWriter`] that forwards each chunk to a [`TransactionSink`].
pub struct ChunkWriter<S> {
    sink: S,
}

impl<S: TransactionSink> ChunkWriter<S> {
    pub fn new(sink: S) -> Self {
        ChunkWriter { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_inner(self) -> S {
        self.sink
    }
}

impl<S: TransactionSink> ItemWriter for ChunkWriter<S> {
    fn write(&mut self, chunk: Vec<TransactionRecord>) -> Result<()> {
        debug!("Writing chunk of {} transactions", chunk.len());
        self.sink.save_all(&chunk)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BatchError, SinkError};
    use crate::sink::SqliteSink;

    fn record(id: i64) -> TransactionRecord {
        TransactionRecord {
            id,
            account_id: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_through_to_sink() {
        let mut writer = ChunkWriter::new(SqliteSink::open_in_memory().unwrap());
        writer.write(vec![record(1), record(2), record(3)]).unwrap();
        assert_eq!(writer.sink().count().unwrap(), 3);
    }

    #[test]
    fn test_duplicate_key_surfaces_as_sink_error() {
        let mut writer = ChunkWriter::new(SqliteSink::open_in_memory().unwrap());
        let err = writer.write(vec![record(4), record(4)]).unwrap_err();

        assert!(matches!(
            err,
            BatchError::Sink(SinkError::DuplicateKey { id: 4 })
        ));
        assert_eq!(writer.sink().count().unwrap(), 0);
    }

    #[test]
    fn test_borrowed_sink() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        ChunkWriter::new(&mut sink).write(vec![record(9)]).unwrap();
        assert_eq!(sink.count().unwrap(), 1);
    }

    #[test]
    fn test_closure_writer() {
        let mut sizes = Vec::new();
        {
            let mut writer = |chunk: Vec<TransactionRecord>| -> Result<()> {
                sizes.push(chunk.len());
                Ok(())
            };
            writer.write(vec![record(1), record(2)]).unwrap();
        }
        assert_eq!(sizes, vec![2]);
    }
}
