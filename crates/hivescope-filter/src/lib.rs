//! Key-name filtering for hivescope.
//!
//! Two surfaces are provided:
//!
//! - [`FilterSpec`] is a declarative, serializable description (mode,
//!   pattern, alternates, exclusions, inversion, case sensitivity) that
//!   compiles into a [`NameFilter`]. Malformed patterns fail at compile time.
//! - [`NamePredicate`] is a small set of combinators (`and`, `or`, `not`,
//!   prefix/suffix/substring, include/exclude sets, GUID detection) for
//!   filters built in code.
//!
//! Both implement [`NameMatch`], which is what the enumerator consumes, and a
//! compiled spec can be lifted into a predicate with
//! [`NamePredicate::from_filter`].
//!
//! ```rust
//! use hivescope_filter::{FilterSpec, NameMatch, NamePredicate, patterns};
//!
//! let sid = FilterSpec::regex(patterns::USER_SID).compile().unwrap();
//! let users = NamePredicate::from_filter(sid) & !NamePredicate::ends_with("_Classes");
//!
//! assert!(users.is_match("S-1-5-21-100-200-300-1001"));
//! assert!(!users.is_match("S-1-5-18"));
//! ```

mod error;
mod matcher;
pub mod patterns;
mod predicate;
mod spec;

pub use error::FilterError;
pub use matcher::{NameFilter, NameMatch, wildcard_to_regex};
pub use predicate::NamePredicate;
pub use spec::{CustomMatch, FilterMode, FilterSpec};
