//! Flat file reader producing [`TransactionRecord`]s lazily.

use crate::error::{BatchError, Result};
use crate::mapper::RecordMapper;
use crate::record::TransactionRecord;
use crate::tokenizer::LineTokenizer;
use csv::{ReaderBuilder, StringRecord};
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

/// Default reader name used in log lines.
pub const DEFAULT_READER_NAME: &str = "CSV-READER";

/// Source of records for a chunk step.
///
/// `read` returns `Ok(None)` at end of input. Readers are forward-only: once
/// exhausted, a new reader has to be opened to start over.
pub trait ItemReader {
    /// Acquires the underlying resource. Called once before the first read.
    fn open(&mut self) -> Result<()>;

    fn read(&mut self) -> Result<Option<TransactionRecord>>;
}

enum Source {
    Path(PathBuf),
    Stream(Box<dyn Read>),
}

/// Reads delimited lines, skips the header, and maps each remaining line
/// through a [`LineTokenizer`] and a [`RecordMapper`].
///
/// Blank lines and lines starting with `#` are ignored. Every record must
/// end on the line it starts on; a quoted field left open fails the read
/// with [`BatchError::UnterminatedRecord`].
pub struct FlatFileReader {
    name: String,
    source: Option<Source>,
    lines_to_skip: usize,
    tokenizer: LineTokenizer,
    mapper: RecordMapper,
    reader: Option<csv::Reader<Box<dyn Read>>>,
    record: StringRecord,
    done: bool,
}

impl FlatFileReader {
    fn with_source(source: Source) -> Self {
        FlatFileReader {
            name: DEFAULT_READER_NAME.to_string(),
            source: Some(source),
            lines_to_skip: 1,
            tokenizer: LineTokenizer::bank_transactions(),
            mapper: RecordMapper::new(),
            reader: None,
            record: StringRecord::new(),
            done: false,
        }
    }

    /// Reader over a file. The file is not touched until [`ItemReader::open`].
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Path(path.into()))
    }

    /// Reader over an already open stream.
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Self::with_source(Source::Stream(Box::new(reader)))
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Number of leading lines discarded before the first record (default 1).
    pub fn lines_to_skip(mut self, lines: usize) -> Self {
        self.lines_to_skip = lines;
        self
    }

    pub fn tokenizer(mut self, tokenizer: LineTokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    fn read_next(&mut self) -> Result<Option<TransactionRecord>> {
        if self.reader.is_none() {
            self.open()?;
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };

        if !reader.read_record(&mut self.record)? {
            debug!("{}: end of input", self.name);
            return Ok(None);
        }

        let line = self.record.position().map(|p| p.line()).unwrap_or(0);
        // Only an unclosed quote can carry a line break into a field.
        if self
            .record
            .iter()
            .any(|field| field.contains(['\n', '\r']))
        {
            return Err(BatchError::UnterminatedRecord { row: line });
        }

        let fields = self.tokenizer.tokenize_record(&self.record, line);
        let record = self.mapper.map(&fields)?;
        debug!("{}: line {} -> id {}", self.name, line, record.id);
        Ok(Some(record))
    }
}

impl ItemReader for FlatFileReader {
    fn open(&mut self) -> Result<()> {
        if self.reader.is_some() {
            return Ok(());
        }

        let input: Box<dyn Read> = match self.source.take() {
            Some(Source::Path(path)) => match File::open(&path) {
                Ok(file) => {
                    debug!("{}: opened {}", self.name, path.display());
                    Box::new(file)
                }
                Err(source) => return Err(BatchError::ResourceUnavailable { path, source }),
            },
            Some(Source::Stream(stream)) => stream,
            None => return Ok(()),
        };

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .delimiter(self.tokenizer.delimiter())
            .from_reader(input);

        let mut skipped = StringRecord::new();
        for _ in 0..self.lines_to_skip {
            if !reader.read_record(&mut skipped)? {
                break;
            }
            debug!("{}: skipped line {:?}", self.name, skipped);
        }

        self.reader = Some(reader);
        Ok(())
    }

    fn read(&mut self) -> Result<Option<TransactionRecord>> {
        if self.done {
            return Ok(None);
        }
        let next = self.read_next();
        if !matches!(next, Ok(Some(_))) {
            self.done = true;
        }
        next
    }
}

/// Lazy, fused sequence of records. Yields at most one error.
impl Iterator for FlatFileReader {
    type Item = Result<TransactionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(input: &str) -> FlatFileReader {
        FlatFileReader::from_reader(Cursor::new(input.to_string()))
    }

    #[test]
    fn test_skips_header_and_reads_records() {
        let input = "id,accountID,strTransactionDate,transactionType,amount
1,100,25/12/2023-14:30,DEPOSIT,250.75
2,100,26/12/2023-09:00,WITHDRAWAL,20.00";

        let records: Vec<_> = reader(input).collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, 1);
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].id, 2);
        assert_eq!(records[1].transaction_type.as_deref(), Some("WITHDRAWAL"));
    }

    #[test]
    fn test_header_only_is_empty() {
        let mut r = reader("id,accountID,strTransactionDate,transactionType,amount\n");
        r.open().unwrap();
        assert!(r.read().unwrap().is_none());
        assert!(r.read().unwrap().is_none());
    }

    #[test]
    fn test_empty_input_is_empty() {
        assert_eq!(reader("").count(), 0);
    }

    #[test]
    fn test_ignores_comments_and_blank_lines() {
        let input = "header
# exported 2024-01-01

1,10,01/01/2024-10:00,DEPOSIT,1.00
";
        let records: Vec<_> = reader(input).collect::<Result<_>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, 1);
    }

    #[test]
    fn test_lines_to_skip_zero() {
        let records: Vec<_> = reader("1,10,01/01/2024-10:00,DEPOSIT,1.00")
            .lines_to_skip(0)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_missing_file_is_resource_unavailable() {
        let mut r = FlatFileReader::from_path("/definitely/not/here.csv");
        match r.open() {
            Err(BatchError::ResourceUnavailable { path, .. }) => {
                assert_eq!(path, PathBuf::from("/definitely/not/here.csv"));
            }
            other => panic!("Expected ResourceUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_stops_after_conversion_error() {
        let input = "header
1,10,01/01/2024-10:00,DEPOSIT,1.00
x,10,01/01/2024-10:00,DEPOSIT,1.00
3,10,01/01/2024-10:00,DEPOSIT,1.00";

        let results: Vec<_> = reader(input).collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(BatchError::FieldConversion { row: 3, .. })
        ));
    }

    #[test]
    fn test_unclosed_quote_fails_instead_of_swallowing_lines() {
        let input = "header
1,100,25/12/2023-14:30,DEPOSIT,10.00
2,100,25/12/2023-14:30,\"DEPOSIT,20.00
3,100,25/12/2023-14:30,DEPOSIT,30.00
";
        let results: Vec<_> = reader(input).collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap().id, 1);
        assert!(matches!(
            results[1],
            Err(BatchError::UnterminatedRecord { row: 3 })
        ));
    }

    #[test]
    fn test_closed_quote_on_one_line_is_fine() {
        let input = "header
1,100,25/12/2023-14:30,\"WIRE, INTL\",10.00
";
        let records: Vec<_> = reader(input).collect::<Result<_>>().unwrap();
        assert_eq!(records[0].transaction_type.as_deref(), Some("WIRE, INTL"));
    }
}
