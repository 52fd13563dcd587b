//! Query key policy

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Literal, case-sensitive prefix that marks a statement as cacheable
pub const CACHEABLE_PREFIX: &str = "SELECT";

/// Whether `sql` may be served from the cache
///
/// This is a literal prefix check on the raw text. `select ...`, ` SELECT ...`
/// or a leading comment all bypass the cache.
#[must_use]
pub fn is_cacheable(sql: &str) -> bool {
    sql.starts_with(CACHEABLE_PREFIX)
}

/// Short, stable identifier for `sql` used in log output.
///
/// Format is `{hash:016x}:{len}`.
#[must_use]
pub fn fingerprint(sql: &str) -> String {
    let mut hasher = DefaultHasher::new();
    sql.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{hash:016x}:{}", sql.len())
}

/// Display adapter that prints either the query text or its fingerprint
#[derive(Debug, Clone, Copy)]
pub(crate) struct QueryLabel<'a> {
    sql: &'a str,
    reveal: bool,
}

impl<'a> QueryLabel<'a> {
    pub(crate) const fn new(sql: &'a str, reveal: bool) -> Self {
        Self { sql, reveal }
    }
}

impl fmt::Display for QueryLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reveal {
            f.write_str(self.sql)
        } else {
            f.write_str(&fingerprint(self.sql))
        }
    }
}
