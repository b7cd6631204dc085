//! Per-user identity discovery under the users hive.

use std::sync::LazyLock;

use indexmap::IndexMap;
use tracing::{debug, info};

use hivescope_core::{EnumerationOptions, EnumerationResult, Hive, KeyStore, StoreLocator, join_path, split_path};
use hivescope_filter::{FilterSpec, NameFilter, NameMatch, patterns};

use crate::enumerator::KeyEnumerator;

/// Label returned when an identity cannot be resolved to an account.
pub const UNKNOWN_ACCOUNT: &str = "Unknown";

/// Machine key holding one subkey per local profile.
pub const PROFILE_LIST_PATH: &str = r"SOFTWARE\Microsoft\Windows NT\CurrentVersion\ProfileList";

/// Default depth for per-user software enumeration.
pub const DEFAULT_SOFTWARE_DEPTH: u32 = 2;

static IDENTITY_FILTER: LazyLock<NameFilter> =
    LazyLock::new(|| identity_spec().compile().expect("user SID pattern is valid"));

/// Filter accepting per-user account identifiers.
pub fn identity_spec() -> FilterSpec {
    FilterSpec::regex(patterns::USER_SID)
}

/// [`identity_spec`] that also rejects `_Classes` and `.DEFAULT` entries.
pub fn non_system_identity_spec() -> FilterSpec {
    identity_spec()
        .excluding(patterns::CLASSES_SUFFIX)
        .excluding(patterns::DEFAULT_SUFFIX)
}

/// Whether `name` looks like a per-user account identifier.
pub fn is_user_sid(name: &str) -> bool {
    IDENTITY_FILTER.is_match(name)
}

/// Identities directly below the users root, in store order.
///
/// Only the root is opened and listed; the identity keys themselves are
/// never opened. A root that cannot be opened or listed yields an empty list.
pub fn list_identities<S: KeyStore>(store: &S, users: &StoreLocator) -> Vec<String> {
    let names = store
        .open_root(users, "")
        .and_then(|root| store.child_names(&root));

    match names {
        Ok(names) => names.into_iter().filter(|name| is_user_sid(name)).collect(),
        Err(err) => {
            debug!(error = %err, "identity listing failed");
            Vec::new()
        }
    }
}

/// Maps an identity to a human-readable account label.
pub trait AccountResolver {
    /// Resolve `sid`, or `None` when unknown.
    fn resolve(&self, sid: &str) -> Option<String>;
}

impl<F> AccountResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve(&self, sid: &str) -> Option<String> {
        self(sid)
    }
}

/// Best-effort label for `sid`, [`UNKNOWN_ACCOUNT`] when unresolved.
pub fn account_label(resolver: &dyn AccountResolver, sid: &str) -> String {
    resolver
        .resolve(sid)
        .filter(|label| !label.is_empty())
        .unwrap_or_else(|| UNKNOWN_ACCOUNT.to_string())
}

/// Resolves account labels from the machine profile list.
///
/// The label is the last segment of the profile's `ProfileImagePath`.
pub struct ProfileListResolver<'s, S> {
    store: &'s S,
    locator: StoreLocator,
}

impl<'s, S: KeyStore> ProfileListResolver<'s, S> {
    /// Resolver reading the local machine hive of `store`.
    pub fn new(store: &'s S) -> Self {
        Self::with_locator(store, StoreLocator::hive(Hive::LocalMachine))
    }

    /// Resolver reading the profile list through `locator`.
    pub fn with_locator(store: &'s S, locator: StoreLocator) -> Self {
        Self { store, locator }
    }
}

impl<S: KeyStore> AccountResolver for ProfileListResolver<'_, S> {
    fn resolve(&self, sid: &str) -> Option<String> {
        let path = join_path(PROFILE_LIST_PATH, sid, self.store.separator());
        let key = self.store.open_root(&self.locator, &path).ok()?;
        let image = self.store.value(&key, "ProfileImagePath")?;
        split_path(image.as_str()?).last().map(str::to_string)
    }
}

/// Identities paired with their account labels, in store order.
pub fn identities_with_labels<S: KeyStore>(
    store: &S,
    users: &StoreLocator,
    resolver: &dyn AccountResolver,
) -> IndexMap<String, String> {
    list_identities(store, users)
        .into_iter()
        .map(|sid| {
            let label = account_label(resolver, &sid);
            (sid, label)
        })
        .collect()
}

/// `{sid}\SOFTWARE` paths that can be opened.
pub fn user_software_paths<S: KeyStore>(store: &S, users: &StoreLocator) -> Vec<String> {
    list_identities(store, users)
        .into_iter()
        .map(|sid| join_path(&sid, "SOFTWARE", store.separator()))
        .filter(|path| store.open_root(users, path).is_ok())
        .collect()
}

/// Enumerate each user's `SOFTWARE` key.
///
/// Only successful, non-empty results are kept, keyed by identity.
pub fn enumerate_user_software<S: KeyStore>(
    enumerator: &KeyEnumerator,
    store: &S,
    users: &StoreLocator,
    options: &EnumerationOptions,
) -> IndexMap<String, EnumerationResult> {
    let mut results = IndexMap::new();
    for sid in list_identities(store, users) {
        let path = join_path(&sid, "SOFTWARE", store.separator());
        let result = enumerator.enumerate(store, &path, users, None, options);
        if result.success && !result.is_empty() {
            info!(sid = %sid, keys = result.filtered_count, "enumerated user software");
            results.insert(sid, result);
        } else {
            debug!(sid = %sid, error = ?result.error(), "no user software");
        }
    }
    results
}

/// Options used by [`enumerate_user_software`] callers by default.
pub fn default_software_options() -> EnumerationOptions {
    EnumerationOptions::recursive(Some(DEFAULT_SOFTWARE_DEPTH))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryKey, MemoryStore};
    use hivescope_core::KeyValue;

    const SID: &str = "S-1-5-21-3623811015-3361044348-30300820-1013";

    #[test]
    fn test_is_user_sid() {
        assert!(is_user_sid(SID));
        assert!(!is_user_sid("S-1-5-18"));
        assert!(!is_user_sid(".DEFAULT"));
        assert!(!is_user_sid(&format!("{SID}_Classes")));
        assert!(!is_user_sid(""));
    }

    #[test]
    fn test_non_system_spec() {
        let filter = non_system_identity_spec().compile().unwrap();
        assert!(filter.is_match(SID));
        assert!(!filter.is_match(&format!("{SID}_Classes")));
    }

    #[test]
    fn test_account_label_fallback() {
        let none = |_: &str| -> Option<String> { None };
        let empty = |_: &str| -> Option<String> { Some(String::new()) };
        let named = |sid: &str| -> Option<String> { Some(format!("user-{}", &sid[sid.len() - 4..])) };
        assert_eq!(account_label(&none, SID), UNKNOWN_ACCOUNT);
        assert_eq!(account_label(&empty, SID), UNKNOWN_ACCOUNT);
        assert_eq!(account_label(&named, SID), "user-1013");
    }

    #[test]
    fn test_profile_list_resolver() {
        let mut store = MemoryStore::new();
        store
            .hive_mut(Hive::LocalMachine)
            .ensure_path(&format!(r"{PROFILE_LIST_PATH}\{SID}"))
            .values
            .insert("ProfileImagePath".into(), KeyValue::ExpandString(r"C:\Users\alice".into()));

        let resolver = ProfileListResolver::new(&store);
        assert_eq!(resolver.resolve(SID).as_deref(), Some("alice"));
        assert_eq!(account_label(&resolver, "S-1-5-21-1-2-3-4"), UNKNOWN_ACCOUNT);
    }

    #[test]
    fn test_list_identities_missing_hive() {
        let store = MemoryStore::new().with_hive(Hive::LocalMachine, MemoryKey::new());
        assert!(list_identities(&store, &StoreLocator::hive(Hive::Users)).is_empty());
    }

    #[test]
    fn test_list_identities_does_not_open_identity_keys() {
        let other = "S-1-5-21-3623811015-3361044348-30300820-1014";
        let store = MemoryStore::new().with_hive(
            Hive::Users,
            MemoryKey::new()
                .with_empty(".DEFAULT")
                .with_key(SID, MemoryKey::new().denied())
                .with_empty("S-1-5-18")
                .with_key(other, MemoryKey::new().corrupt()),
        );
        assert_eq!(list_identities(&store, &StoreLocator::hive(Hive::Users)), vec![SID, other]);
    }

    #[test]
    fn test_list_identities_unlistable_root() {
        let store = MemoryStore::new().with_hive(Hive::Users, MemoryKey::new().with_empty(SID).corrupt());
        assert!(list_identities(&store, &StoreLocator::hive(Hive::Users)).is_empty());
    }
}
