use crate::{types::Timestamp, value::Value};

// The backing store treats an empty clustering-key component as absent,
// which breaks reads that legitimately stored "". These reserved values
// stand in for empty components on the wire. Both constants are fixed:
// changing either is a wire-breaking change.

/// Reserved marker stored in place of an empty text or blob clustering
/// component.
pub const CLUSTERING_SENTINEL: &str = "<gocassa.ClusteringSentinel>";

/// Reserved instant stored in place of the zero timestamp:
/// 1753-01-01T00:00:00Z.
pub const CLUSTERING_SENTINEL_TIMESTAMP: Timestamp = Timestamp::from_secs(-6_847_804_725);

/// Replace an empty clustering value with its sentinel. Empty means the
/// empty string, the zero-length blob, or the zero timestamp; any other
/// value passes through unchanged.
#[must_use]
pub fn substitute_if_empty(value: &Value) -> Value {
    match value {
        Value::Text(s) if s.is_empty() => Value::Text(CLUSTERING_SENTINEL.to_string()),
        Value::Blob(b) if b.is_empty() => Value::Blob(CLUSTERING_SENTINEL.as_bytes().to_vec()),
        Value::Timestamp(t) if t.is_zero() => Value::Timestamp(CLUSTERING_SENTINEL_TIMESTAMP),
        other => other.clone(),
    }
}

/// True when the value is one of the three sentinel forms.
#[must_use]
pub fn is_clustering_sentinel(value: &Value) -> bool {
    match value {
        Value::Text(s) => s == CLUSTERING_SENTINEL,
        Value::Blob(b) => b == CLUSTERING_SENTINEL.as_bytes(),
        Value::Timestamp(t) => *t == CLUSTERING_SENTINEL_TIMESTAMP,
        _ => false,
    }
}

/// Exact inverse of [`substitute_if_empty`] on the three sentinel kinds:
/// a sentinel value resets to the empty value of its kind, everything
/// else passes through.
#[must_use]
pub fn strip_sentinel(value: &Value) -> Value {
    match value {
        Value::Text(s) if s == CLUSTERING_SENTINEL => Value::Text(String::new()),
        Value::Blob(b) if b == CLUSTERING_SENTINEL.as_bytes() => Value::Blob(Vec::new()),
        Value::Timestamp(t) if *t == CLUSTERING_SENTINEL_TIMESTAMP => {
            Value::Timestamp(Timestamp::ZERO)
        }
        other => other.clone(),
    }
}
