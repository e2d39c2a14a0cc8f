//! Domain data types for the attribution library.

pub mod citation;
pub mod config;
pub mod report;
pub mod segment;
