//! NDJSON feed reading

use std::path::Path;

use melodex_common::{Error, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::model::RawTrackRecord;

/// Streams a feed file as fixed-size batches of parsed records
pub struct BatchReader {
    lines: Lines<BufReader<File>>,
    line_no: u64,
    batch_size: usize,
}

impl BatchReader {
    pub async fn open(path: &Path, batch_size: usize) -> Result<Self> {
        let file = File::open(path).await?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
            batch_size,
        })
    }

    /// Next batch of records, or None once the feed is exhausted
    ///
    /// Blank lines are skipped. A line that fails to deserialize aborts
    /// the whole run, carrying its 1-based line number.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<RawTrackRecord>>> {
        let mut batch = Vec::with_capacity(self.batch_size);

        while batch.len() < self.batch_size {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| Error::MalformedRecord {
                line: self.line_no,
                source,
            })?;
            batch.push(record);
        }

        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn feed_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn batches_records_and_skips_blank_lines() {
        let file = feed_file(
            "{\"song\": \"S1\"}\n\
             \n\
             {\"song\": \"S2\"}\n\
             {\"song\": \"S3\"}\n",
        );

        let mut reader = BatchReader::open(file.path(), 2).await.unwrap();

        let first = reader.next_batch().await.unwrap().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].song.as_deref(), Some("S1"));
        assert_eq!(first[1].song.as_deref(), Some("S2"));

        let second = reader.next_batch().await.unwrap().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].song.as_deref(), Some("S3"));

        assert!(reader.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn malformed_line_reports_its_number() {
        let file = feed_file("{\"song\": \"S1\"}\n\nnot json\n");

        let mut reader = BatchReader::open(file.path(), 10).await.unwrap();
        let error = reader.next_batch().await.unwrap_err();
        match error {
            Error::MalformedRecord { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let result = BatchReader::open(Path::new("/nonexistent/feed.ndjson"), 10).await;
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
