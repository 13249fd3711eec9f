//! Modules layer - Infrastructure components for external integrations
//!
//! Contains adapters for external resources like file storage.

pub mod storage;
