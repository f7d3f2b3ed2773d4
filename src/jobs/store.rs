use once_cell::sync::OnceCell;
use std::{
    collections::HashSet,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};
use tracing::{debug, error, info};

use super::{
    error::{JobError, JobResult},
    row::{Dataset, Row},
    search::Needle,
    source::{CsvFileSource, JobSource},
};
use crate::config::StoreConfig;

/// Where the store is in its one-time load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
    /// Last attempt failed; the next query tries again.
    Failed(JobError),
}

/// In-memory job listings, loaded from a [`JobSource`] on first query.
///
/// The dataset is parsed at most once per successful load, even when the first
/// queries race from several threads. After that it is immutable and every
/// query borrows from it without locking.
pub struct JobStore {
    source: Box<dyn JobSource>,
    state: Mutex<LoadState>,
    dataset: OnceCell<Dataset>,
}

impl JobStore {
    pub fn new<S: JobSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            state: Mutex::new(LoadState::Unloaded),
            dataset: OnceCell::new(),
        }
    }

    /// Store backed by a CSV file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(CsvFileSource::new(path))
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::from_path(config.data_file.clone())
    }

    pub fn state(&self) -> LoadState {
        if self.dataset.get().is_some() {
            return LoadState::Loaded;
        }
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Load the dataset unless it is already in memory.
    pub fn ensure_loaded(&self) -> JobResult<&Dataset> {
        // Fast path: already published
        if let Some(ds) = self.dataset.get() {
            return Ok(ds);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        // Double-check after acquiring the lock
        if let Some(ds) = self.dataset.get() {
            return Ok(ds);
        }

        *state = LoadState::Loading;
        let source_name = self.source.name();
        debug!(source = %source_name, "loading job data");

        match self.source.load() {
            Ok(loaded) => {
                let ds = self.dataset.get_or_init(|| loaded);
                *state = LoadState::Loaded;
                info!(
                    source = %source_name,
                    rows = ds.len(),
                    columns = ds.headers().len(),
                    "job data loaded"
                );
                Ok(ds)
            }
            Err(e) => {
                error!(source = %source_name, error = %e, "Failed to load job data");
                *state = LoadState::Failed(e.clone());
                Err(e)
            }
        }
    }

    /// Column names in file order.
    pub fn headers(&self) -> JobResult<&[String]> {
        Ok(self.ensure_loaded()?.headers())
    }

    /// Distinct values of `field`, in order of first appearance.
    pub fn find_all_column_values(&self, field: &str) -> JobResult<Vec<String>> {
        let ds = self.ensure_loaded()?;
        let idx = column_index(ds, field)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut values = Vec::new();
        for row in ds.rows() {
            let value = row.value_at(idx);
            if seen.insert(value) {
                values.push(value.to_string());
            }
        }
        Ok(values)
    }

    /// Every row, in file order.
    pub fn find_all(&self) -> JobResult<&[Row]> {
        Ok(self.ensure_loaded()?.rows())
    }

    /// Rows whose `column` contains `value`, ignoring case.
    pub fn find_by_column_and_value(&self, column: &str, value: &str) -> JobResult<Vec<&Row>> {
        let ds = self.ensure_loaded()?;
        let idx = column_index(ds, column)?;
        let needle = Needle::new(value);

        let jobs: Vec<&Row> = ds
            .rows()
            .iter()
            .filter(|row| needle.matches(row.value_at(idx)))
            .collect();

        if jobs.is_empty() {
            info!(
                "Sorry, there are no matches for \"{}\" in the \"{}\" data field.",
                needle.as_str(),
                column.to_uppercase()
            );
        }
        Ok(jobs)
    }

    /// Rows where any column contains `value`, ignoring case. Each row at most once.
    pub fn find_all_columns(&self, value: &str) -> JobResult<Vec<&Row>> {
        let ds = self.ensure_loaded()?;
        let needle = Needle::new(value);

        let jobs: Vec<&Row> = ds
            .rows()
            .iter()
            .filter(|row| row.values().any(|cell| needle.matches(cell)))
            .collect();

        if jobs.is_empty() {
            info!(
                "Sorry, there are no matches for \"{}\" in any of the data fields.",
                needle.as_str()
            );
        }
        Ok(jobs)
    }
}

fn column_index(ds: &Dataset, column: &str) -> JobResult<usize> {
    ds.column_index(column)
        .ok_or_else(|| JobError::invalid_column(column))
}
