use crate::value::Value;
use std::cmp::Ordering;

///
/// Coerced
///
/// Comparison-primitive form of a cell value used by relation
/// evaluation. Coercion folds proxy representations together so that
/// values which render identically on the wire compare equal in memory:
///
/// - timestamps and durations become their nanosecond counts
/// - blobs compare lexically bytewise, exactly like text bytes
/// - integers and doubles compare numerically across the two kinds
///
/// Mixed kinds beyond those folds are unordered and unequal.
///

#[derive(Clone, Debug)]
pub(crate) enum Coerced {
    Bool(bool),
    Int(i64),
    Double(f64),
    Bytes(Vec<u8>),
    List(Vec<Coerced>),
    Map(Vec<(Coerced, Coerced)>),
    Null,
}

pub(crate) fn coerce(value: &Value) -> Coerced {
    match value {
        Value::Bool(b) => Coerced::Bool(*b),
        Value::Int(i) => Coerced::Int(*i),
        Value::Double(d) => Coerced::Double(*d),
        Value::Text(s) => Coerced::Bytes(s.clone().into_bytes()),
        Value::Blob(b) => Coerced::Bytes(b.clone()),
        Value::Timestamp(t) => Coerced::Int(t.nanos()),
        Value::Duration(d) => Coerced::Int(d.nanos()),
        Value::List(items) => Coerced::List(items.iter().map(coerce).collect()),
        Value::Map(entries) => Coerced::Map(
            entries
                .iter()
                .map(|(k, v)| (coerce(k), coerce(v)))
                .collect(),
        ),
        Value::Null => Coerced::Null,
    }
}

#[expect(clippy::cast_precision_loss)]
pub(crate) fn coerced_eq(left: &Coerced, right: &Coerced) -> bool {
    match (left, right) {
        (Coerced::Bool(a), Coerced::Bool(b)) => a == b,
        (Coerced::Int(a), Coerced::Int(b)) => a == b,
        (Coerced::Double(a), Coerced::Double(b)) => a == b,
        (Coerced::Int(a), Coerced::Double(b)) | (Coerced::Double(b), Coerced::Int(a)) => {
            *a as f64 == *b
        }
        (Coerced::Bytes(a), Coerced::Bytes(b)) => a == b,
        (Coerced::List(a), Coerced::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| coerced_eq(x, y))
        }
        (Coerced::Map(a), Coerced::Map(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ak, av), (bk, bv))| coerced_eq(ak, bk) && coerced_eq(av, bv))
        }
        (Coerced::Null, Coerced::Null) => true,
        _ => false,
    }
}

/// Partial order over coerced primitives. Mismatched kinds (beyond the
/// numeric fold) return `None`, which relation evaluation treats as a
/// non-match rather than an error.
#[expect(clippy::cast_precision_loss)]
pub(crate) fn coerced_cmp(left: &Coerced, right: &Coerced) -> Option<Ordering> {
    match (left, right) {
        (Coerced::Bool(a), Coerced::Bool(b)) => Some(a.cmp(b)),
        (Coerced::Int(a), Coerced::Int(b)) => Some(a.cmp(b)),
        (Coerced::Double(a), Coerced::Double(b)) => a.partial_cmp(b),
        (Coerced::Int(a), Coerced::Double(b)) => (*a as f64).partial_cmp(b),
        (Coerced::Double(a), Coerced::Int(b)) => a.partial_cmp(&(*b as f64)),
        (Coerced::Bytes(a), Coerced::Bytes(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
