//! Core trait abstractions for the attribution library.
//!
//! These traits define the boundaries applications implement to provide
//! retrieval and segment storage.

pub mod retrieval;
pub mod store;
