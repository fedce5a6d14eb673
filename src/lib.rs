pub mod aggregator_core;
pub mod config;
pub mod dashboard;
pub mod sqlite_pragma;
