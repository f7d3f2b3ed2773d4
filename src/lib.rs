pub mod config;
pub mod jobs;

pub use config::StoreConfig;
pub use jobs::{JobError, JobStore, Row};
