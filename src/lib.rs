pub mod cli;
pub mod error;
pub mod filter;
pub mod group;
pub mod ingest;
pub mod model;
pub mod snapshot;
pub mod stats;
pub mod writers;
