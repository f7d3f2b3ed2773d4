pub mod error;
pub mod row;
pub mod search;
pub mod source;
pub mod store;

pub use error::{JobError, JobResult};
pub use row::{Dataset, Row};
pub use source::{CsvFileSource, CsvTextSource, JobSource};
pub use store::{JobStore, LoadState};
