// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the storage engine.
//!
//! This module contains the concrete implementation of the `SettingsStorage`
//! trait and the writer that renders a group's file in declaration order.

pub mod ordered_writer;
pub mod storage_engine;

// Re-export commonly used types
pub use ordered_writer::OrderedWriter;
pub use storage_engine::{StorageEngine, StorageEngineBuilder};
