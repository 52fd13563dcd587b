//! Cache metrics through the `metrics` facade
//!
//! No recorder is installed here; the embedding application decides where
//! metrics go.

use std::sync::Once;

use metrics::{counter, describe_counter, describe_gauge, gauge};

const METRIC_QUERIES: &str = "sql_query_cache_queries_total";
const METRIC_EXECUTION_ERRORS: &str = "sql_query_cache_execution_errors_total";
const METRIC_ENTRIES: &str = "sql_query_cache_entries";

static REGISTER: Once = Once::new();

/// Describe the cache metrics to the installed recorder
pub fn register_metrics() {
    REGISTER.call_once(|| {
        describe_counter!(
            METRIC_QUERIES,
            "Queries seen by the cache, labelled hit, miss or bypass"
        );
        describe_counter!(
            METRIC_EXECUTION_ERRORS,
            "Failed executions of cacheable queries"
        );
        describe_gauge!(METRIC_ENTRIES, "Entries in the most recently updated scope");
    });
}

/// Record a query routed through the gate.
pub fn record_query(result: &'static str) {
    counter!(METRIC_QUERIES, "result" => result).increment(1);
}

/// Record a failed execution of a cacheable query.
pub fn record_execution_error() {
    counter!(METRIC_EXECUTION_ERRORS).increment(1);
}

/// Update the entry count gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_entry_count(count: usize) {
    gauge!(METRIC_ENTRIES).set(count as f64);
}
