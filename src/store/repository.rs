use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::models::{LineEnding, TopicRecord, TopicTable};

const DELIMITER: u8 = b';';

/// Semicolon-separated topic table on disk.
pub struct TopicStore {
    path: PathBuf,
}

impl TopicStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole table. An empty or header-only file yields an empty table.
    pub fn load(&self) -> Result<TopicTable> {
        let bytes = fs::read(&self.path)?;
        let line_ending = if bytes.windows(2).any(|w| w == b"\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .flexible(true)
            .from_reader(bytes.as_slice());

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let records = reader
            .records()
            .map(|row| row.map(|r| record_from_row(&r)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} topics from {:?}", records.len(), self.path);

        Ok(TopicTable::new(headers, records)?.with_line_ending(line_ending))
    }

    /// Stamp one record as consumed and persist the whole table.
    pub fn mark_used(
        &self,
        table: &mut TopicTable,
        index: usize,
        marker: &str,
        timestamp: &str,
    ) -> Result<()> {
        table.mark_used(index, marker, timestamp)?;
        self.save(table)
    }

    /// Write the table to a sibling temp file, then rename it over the original.
    /// The temp file takes the original's permissions and is removed if any
    /// step fails.
    pub fn save(&self, table: &TopicTable) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let permissions = fs::metadata(&self.path)?.permissions();
        let mut tmp = NamedTempFile::new_in(dir)?;

        let terminator = match table.line_ending() {
            LineEnding::Lf => Terminator::Any(b'\n'),
            LineEnding::CrLf => Terminator::CRLF,
        };

        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .terminator(terminator)
            .flexible(true)
            .from_writer(tmp.as_file_mut());
        writer.write_record(table.headers())?;
        for row in table.padded_rows() {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        drop(writer);

        tmp.as_file().sync_all()?;
        fs::set_permissions(tmp.path(), permissions)?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        tracing::debug!("Saved {} topics to {:?}", table.len(), self.path);
        Ok(())
    }
}

fn record_from_row(row: &StringRecord) -> TopicRecord {
    TopicRecord::new(row.iter())
}
