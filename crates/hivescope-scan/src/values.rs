//! Reading named value groups.

use indexmap::IndexMap;
use tracing::{debug, warn};

use hivescope_core::{KeyStore, StoreError, ValueGroup, ValueGroupOutcome, ValueQuery};

/// Read the values named by `query`.
///
/// Missing values come back as `None`. A key that cannot be opened yields
/// [`ValueGroupOutcome::Failed`]; any other store failure yields
/// [`ValueGroupOutcome::Error`].
pub fn read_value_group<S: KeyStore>(store: &S, query: &ValueQuery) -> ValueGroup {
    let outcome = match store.open_root(&query.locator, &query.path) {
        Ok(key) => {
            let entries: IndexMap<_, _> = query
                .value_names
                .iter()
                .map(|name| (name.clone(), store.value(&key, name)))
                .collect();
            debug!(path = %query.path, read = entries.values().filter(|v| v.is_some()).count(), "read value group");
            ValueGroupOutcome::Read { entries }
        }
        Err(StoreError::NotFound { .. }) => ValueGroupOutcome::Failed {
            reason: format!("Key not found - {}", query.path),
        },
        Err(StoreError::AccessDenied { .. }) => ValueGroupOutcome::Failed {
            reason: format!("Access denied - {}", query.path),
        },
        Err(err) => {
            warn!(path = %query.path, error = %err, "value group read failed");
            ValueGroupOutcome::Error {
                reason: err.to_string(),
            }
        }
    };

    ValueGroup {
        title: query.display_title().to_string(),
        path: query.path.clone(),
        outcome,
    }
}

/// Read several groups in order.
pub fn read_value_groups<S: KeyStore>(store: &S, queries: &[ValueQuery]) -> Vec<ValueGroup> {
    queries.iter().map(|q| read_value_group(store, q)).collect()
}
