//! Core types and traits for hivescope.
//!
//! This crate provides the fundamental data structures shared by the
//! hivescope crates: discovered key nodes, enumeration results and options,
//! typed values, and the [`KeyStore`] access contract.

mod config;
mod error;
mod node;
mod result;
mod store;
mod value;

pub use config::{EnumerateConfig, EnumerateConfigBuilder, EnumerationOptions, EnumerationOptionsBuilder};
pub use error::{EnumerateError, StoreError};
pub use node::KeyNode;
pub use result::EnumerationResult;
pub use store::{DEFAULT_SEPARATOR, Hive, KeyStore, StoreLocator, View, join_path, split_path};
pub use value::{KeyValue, ValueGroup, ValueGroupOutcome, ValueQuery};
