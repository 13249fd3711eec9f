//! Storage module for letter attachments
//!
//! Provides a disk-backed store for uploaded PDFs, keyed by
//! slash-separated paths under a configured root directory.

mod disk;

pub use disk::DiskStorage;
