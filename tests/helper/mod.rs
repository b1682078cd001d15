//! Shared test utilities

#![allow(dead_code)]

pub mod transfer;

pub use transfer::{MemoryFileSystem, RecordingFetcher, create_test_catalog};
