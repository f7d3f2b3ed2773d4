use std::{fmt, sync::Arc};

/// One job listing: cell values in header order.
///
/// The header is shared by every row of a [`Dataset`], so a row only owns its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Caller guarantees `values.len() == headers.len()`; the loader rejects
    /// records that break this before a row is built.
    pub(crate) fn new(headers: Arc<[String]>, values: Vec<String>) -> Self {
        debug_assert_eq!(headers.len(), values.len());
        Self { headers, values }
    }

    /// Value of `column`, or `None` if the column is not in the header.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|idx| self.values[idx].as_str())
    }

    pub(crate) fn value_at(&self, idx: usize) -> &str {
        &self.values[idx]
    }

    /// `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*****")?;
        for (column, value) in self.iter() {
            writeln!(f, "{}: {}", column, value)?;
        }
        write!(f, "*****")
    }
}

/// Every row of the source, in file order, plus the header they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Arc<[String]>,
    rows: Vec<Row>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers: headers.into(),
            rows: Vec::new(),
        }
    }

    /// Append a record. Returns the rejected values back if the field count
    /// does not match the header.
    pub fn push(&mut self, values: Vec<String>) -> Result<(), Vec<String>> {
        if values.len() != self.headers.len() {
            return Err(values);
        }
        self.rows.push(Row::new(Arc::clone(&self.headers), values));
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
