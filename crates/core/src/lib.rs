//! Domain types, error taxonomy, and input validation for the manual catalog.
//!
//! This crate does no I/O. Persistence lives in `manuals-db`, file storage in
//! `manuals-assets`, and orchestration of both in `manuals-catalog`.

pub mod error;
pub mod manual;
pub mod types;
