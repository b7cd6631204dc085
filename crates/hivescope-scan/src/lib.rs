//! Key enumeration engine for hivescope.
//!
//! This crate walks any [`KeyStore`] and produces flat, pre-ordered
//! [`EnumerationResult`]s.
//!
//! # Overview
//!
//! `hivescope-scan` is responsible for traversing key hierarchies. Key
//! features:
//!
//! - **Filtered walks**: any [`NameMatch`] decides which children are kept
//!   (and descended into)
//! - **Progress updates** via broadcast channels
//! - **Failure as data**: a missing root yields a failed result, never a panic
//! - **Two stores**: [`MemoryStore`] (JSON snapshots) and [`DirectoryStore`]
//!   (directory trees)
//! - **Identity discovery** under the users hive
//!
//! # Example
//!
//! ```rust
//! use hivescope_scan::{EnumerationOptions, Hive, KeyEnumerator, MemoryKey, MemoryStore, StoreLocator};
//!
//! let store = MemoryStore::new().with_hive(
//!     Hive::LocalMachine,
//!     MemoryKey::new().with_key("SOFTWARE", MemoryKey::new().with_empty("Vendor")),
//! );
//!
//! let enumerator = KeyEnumerator::new();
//! let result = enumerator.enumerate(
//!     &store,
//!     "SOFTWARE",
//!     &StoreLocator::default(),
//!     None,
//!     &EnumerationOptions::recursive(None),
//! );
//!
//! assert!(result.success);
//! assert_eq!(result.nodes[0].full_path, r"SOFTWARE\Vendor");
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use hivescope_scan::{KeyEnumerator, forward_progress};
//!
//! let enumerator = KeyEnumerator::new();
//! let progress_rx = enumerator.subscribe();
//!
//! std::thread::spawn(move || {
//!     forward_progress(progress_rx, |progress| {
//!         println!("Inspected {} keys", progress.keys_inspected);
//!     });
//! });
//! ```

mod directory;
mod enumerator;
pub mod identity;
mod memory;
mod progress;
mod values;

pub use directory::{DirectoryKey, DirectoryStore};
pub use enumerator::{KeyEnumerator, PROGRESS_INTERVAL};
pub use memory::{MemoryHandle, MemoryKey, MemoryStore};
pub use progress::{EnumerationProgress, forward_progress};
pub use values::{read_value_group, read_value_groups};

// Re-export core types for convenience
pub use hivescope_core::{
    EnumerateConfig, EnumerateError, EnumerationOptions, EnumerationResult, Hive, KeyNode, KeyStore, KeyValue,
    StoreError, StoreLocator, ValueGroup, ValueGroupOutcome, ValueQuery,
};
pub use hivescope_filter::NameMatch;
