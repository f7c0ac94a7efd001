pub mod config;
pub mod errors;
pub mod listings;
pub mod models;
pub mod orderset;
pub mod report;
pub mod stats;
