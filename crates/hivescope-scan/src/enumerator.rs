//! Depth-first key enumerator.

use std::time::Instant;

use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use hivescope_core::{
    EnumerateConfig, EnumerateError, EnumerationOptions, EnumerationResult, KeyNode, KeyStore,
    StoreError, StoreLocator, join_path,
};
use hivescope_filter::NameMatch;

use crate::progress::EnumerationProgress;

/// Number of inspected child names between progress updates.
pub const PROGRESS_INTERVAL: usize = 256;

/// Walks a [`KeyStore`] and collects the keys accepted by a filter.
///
/// Keys are emitted in pre-order: a key appears before its descendants and
/// siblings keep the order the store lists them in.
pub struct KeyEnumerator {
    progress_tx: broadcast::Sender<EnumerationProgress>,
}

/// Mutable state threaded through one walk.
struct Walk<'f> {
    filter: Option<&'f dyn NameMatch>,
    options: EnumerationOptions,
    separator: char,
    nodes: Vec<KeyNode>,
    total_count: usize,
    last_report: usize,
    start: Instant,
}

impl KeyEnumerator {
    /// Create a new enumerator.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self { progress_tx }
    }

    /// Subscribe to enumeration progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<EnumerationProgress> {
        self.progress_tx.subscribe()
    }

    /// Enumerate the keys below `root_path`.
    ///
    /// Failures never escape: an unopenable root or a store error that
    /// cannot be skipped yields a failed [`EnumerationResult`] with no nodes.
    pub fn enumerate<S: KeyStore>(
        &self,
        store: &S,
        root_path: &str,
        locator: &StoreLocator,
        filter: Option<&dyn NameMatch>,
        options: &EnumerationOptions,
    ) -> EnumerationResult {
        let start = Instant::now();
        let _span = tracing::info_span!("enumerate", root = root_path, store = %locator).entered();
        debug!(?options, filtered = filter.is_some(), "starting enumeration");

        let mut state = Walk {
            filter,
            options: *options,
            separator: store.separator(),
            nodes: Vec::new(),
            total_count: 0,
            last_report: 0,
            start,
        };

        match self.walk_root(store, root_path, locator, &mut state) {
            Ok(()) => {
                self.send_progress(&state, root_path, true);
                let result = EnumerationResult::succeeded(root_path, state.nodes, state.total_count, start.elapsed());
                info!(
                    total = result.total_count,
                    retained = result.filtered_count,
                    elapsed_ms = result.elapsed.as_millis() as u64,
                    "enumeration complete"
                );
                result
            }
            Err(err) => {
                warn!(error = %err, "enumeration failed");
                EnumerationResult::failed(root_path, err.to_string())
            }
        }
    }

    /// Enumerate using a complete request.
    pub fn enumerate_config<S: KeyStore>(
        &self,
        store: &S,
        config: &EnumerateConfig,
        filter: Option<&dyn NameMatch>,
    ) -> EnumerationResult {
        self.enumerate(store, &config.root_path, &config.locator, filter, &config.options)
    }

    fn walk_root<S: KeyStore>(
        &self,
        store: &S,
        root_path: &str,
        locator: &StoreLocator,
        state: &mut Walk<'_>,
    ) -> Result<(), EnumerateError> {
        let root = store
            .open_root(locator, root_path)
            .map_err(|source| EnumerateError::RootUnavailable {
                path: root_path.to_string(),
                source,
            })?;

        let base = root_path.trim_end_matches(['\\', '/']);
        let names = list_children(store, &root, base)?;
        self.walk(store, &root, names, base, 0, state)?;
        Ok(())
    }

    /// Visit the children `names` of `parent`, which sit at `depth`.
    fn walk<'a, S: KeyStore>(
        &self,
        store: &'a S,
        parent: &S::Key<'a>,
        names: Vec<String>,
        parent_path: &str,
        depth: u32,
        state: &mut Walk<'_>,
    ) -> Result<(), StoreError> {
        state.total_count += names.len();
        if state.total_count - state.last_report >= PROGRESS_INTERVAL {
            state.last_report = state.total_count;
            self.send_progress(state, parent_path, false);
        }

        for name in names {
            if state.filter.is_some_and(|f| !f.is_match(&name)) {
                continue;
            }

            let full_path = join_path(parent_path, &name, state.separator);
            let Some(child) = store.open_child(parent, &name) else {
                debug!(path = %full_path, "skipping unopenable key");
                continue;
            };

            let grandchildren = match store.child_names(&child) {
                Ok(names) => names,
                Err(err) if err.is_skippable() => {
                    debug!(path = %full_path, error = %err, "skipping unlistable key");
                    continue;
                }
                Err(err) => return Err(err),
            };
            if !state.options.include_empty && grandchildren.is_empty() {
                continue;
            }

            state.nodes
                .push(KeyNode::new(name.as_str(), full_path.as_str(), depth, grandchildren.len()));

            if state.options.descends_from(depth) {
                self.walk(store, &child, grandchildren, &full_path, depth + 1, state)?;
            }
        }

        Ok(())
    }

    fn send_progress(&self, state: &Walk<'_>, current_path: &str, finished: bool) {
        // No subscribers is fine.
        let _ = self.progress_tx.send(EnumerationProgress {
            keys_inspected: state.total_count,
            keys_retained: state.nodes.len(),
            current_path: current_path.to_string(),
            elapsed: state.start.elapsed(),
            finished,
        });
    }
}

impl Default for KeyEnumerator {
    fn default() -> Self {
        Self::new()
    }
}

/// List the root's children, treating missing or denied listings as empty.
fn list_children<'a, S: KeyStore>(
    store: &'a S,
    key: &S::Key<'a>,
    path: &str,
) -> Result<Vec<String>, StoreError> {
    match store.child_names(key) {
        Ok(names) => Ok(names),
        Err(err) if err.is_skippable() => {
            debug!(path, error = %err, "treating unreadable key as empty");
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}
