use crate::config::Language;
use crate::error::{AppError, Result};

/// Status values that mean a topic is still waiting to be published.
pub const PENDING_MARKERS: &[&str] = &["new", "новая"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Subject,
    Category,
    Status,
    PublicationDate,
}

impl Column {
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::Subject => &["subject", "тема"],
            Column::Category => &["category", "категория"],
            Column::Status => &["status", "статус"],
            Column::PublicationDate => &["publication date", "pubdate", "дата публикации"],
        }
    }

    fn header_name(self, language: Language) -> &'static str {
        match (self, language) {
            (Column::Subject, Language::Ru) => "Тема",
            (Column::Subject, Language::En) => "Subject",
            (Column::Category, Language::Ru) => "Категория",
            (Column::Category, Language::En) => "Category",
            (Column::Status, Language::Ru) => "Статус",
            (Column::Status, Language::En) => "Status",
            (Column::PublicationDate, Language::Ru) => "Дата публикации",
            (Column::PublicationDate, Language::En) => "Publication date",
        }
    }

    fn matches(self, header: &str) -> bool {
        let normalized = header.trim_start_matches('\u{feff}').trim().to_lowercase();
        self.aliases().iter().any(|alias| *alias == normalized)
    }
}

/// Line terminator of the source file, reused when the table is written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

/// One row of the topic table, with every column kept in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TopicRecord {
    pub fields: Vec<String>,
}

impl TopicRecord {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    fn get(&self, index: Option<usize>) -> &str {
        index
            .and_then(|i| self.fields.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    fn set(&mut self, index: usize, value: String) {
        if self.fields.len() <= index {
            self.fields.resize(index + 1, String::new());
        }
        self.fields[index] = value;
    }
}

/// The topic selected for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTopic {
    pub index: usize,
    pub subject: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct TopicTable {
    headers: Vec<String>,
    records: Vec<TopicRecord>,
    line_ending: LineEnding,
}

impl TopicTable {
    pub fn new(headers: Vec<String>, records: Vec<TopicRecord>) -> Result<Self> {
        let table = Self {
            headers,
            records,
            line_ending: LineEnding::default(),
        };
        if !table.records.is_empty() && table.column(Column::Subject).is_none() {
            return Err(AppError::Table(format!(
                "no subject column in header: {}",
                table.headers.join(";")
            )));
        }
        Ok(table)
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[TopicRecord] {
        &self.records
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column(&self, column: Column) -> Option<usize> {
        self.headers.iter().position(|h| column.matches(h))
    }

    pub fn field(&self, index: usize, column: Column) -> Option<&str> {
        let record = self.records.get(index)?;
        Some(record.get(self.column(column)))
    }

    pub fn is_pending(&self, index: usize) -> bool {
        self.field(index, Column::Status)
            .map(is_pending_status)
            .unwrap_or(false)
    }

    /// First record in file order whose status is blank or a pending marker.
    pub fn next_pending(&self) -> Option<PendingTopic> {
        let index = (0..self.records.len()).find(|&i| self.is_pending(i))?;
        Some(PendingTopic {
            index,
            subject: self.field(index, Column::Subject)?.to_string(),
            category: self.field(index, Column::Category)?.to_string(),
        })
    }

    /// Stamp the record at `index` as consumed. Missing status or date
    /// columns are appended to the header.
    pub fn mark_used(&mut self, index: usize, marker: &str, timestamp: &str) -> Result<()> {
        if index >= self.records.len() {
            return Err(AppError::Table(format!(
                "row {} out of range ({} rows)",
                index,
                self.records.len()
            )));
        }

        let status = self.ensure_column(Column::Status);
        let published = self.ensure_column(Column::PublicationDate);

        let record = &mut self.records[index];
        record.set(status, marker.to_string());
        record.set(published, timestamp.to_string());
        Ok(())
    }

    fn ensure_column(&mut self, column: Column) -> usize {
        if let Some(index) = self.column(column) {
            return index;
        }
        let cyrillic = self
            .headers
            .iter()
            .any(|h| h.chars().any(|c| matches!(c, 'А'..='я' | 'ё' | 'Ё')));
        let language = if cyrillic { Language::Ru } else { Language::En };
        self.headers.push(column.header_name(language).to_string());
        self.headers.len() - 1
    }

    /// Rows as they should be written: short rows padded to the header width.
    pub fn padded_rows(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        let width = self.headers.len();
        self.records.iter().map(move |record| {
            let mut row: Vec<&str> = record.fields.iter().map(String::as_str).collect();
            if row.len() < width {
                row.resize(width, "");
            }
            row
        })
    }
}

pub fn is_pending_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    status.is_empty() || PENDING_MARKERS.contains(&status.as_str())
}

/// Status written to a record once it has been published.
pub fn consumed_marker(language: Language) -> &'static str {
    match language {
        Language::Ru => "использована",
        Language::En => "used",
    }
}
