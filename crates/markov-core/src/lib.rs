//! Core types and trait definitions for the persistent Markov chain.
//!
//! This crate is free of database dependencies. Storage backends implement
//! [`store::ChainStore`]; the ingestion pipeline and generation engine are
//! written against that trait only.

pub mod chain;
pub mod error;
pub mod generate;
pub mod ingest;
pub mod store;
pub mod tuple;

pub use error::{Error, Result};
