mod coerce;
mod column;


use crate::types::{Blob, Duration, Timestamp};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error as ThisError;

// re-exports
pub use column::ColumnValue;
pub(crate) use coerce::{coerce, coerced_cmp, coerced_eq, Coerced};

///
/// MapValueError
///
/// Invariant violations for `Value::Map` construction/normalization.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum MapValueError {
    #[error("map key at index {index} must be non-null")]
    NullKey { index: usize },

    #[error("map key at index {index} is not scalar: {key:?}")]
    NonScalarKey { index: usize, key: Value },

    #[error("map contains duplicate keys at normalized positions {left_index} and {right_index}")]
    DuplicateKey {
        left_index: usize,
        right_index: usize,
    },
}

///
/// Value
///
/// Dynamic cell vocabulary shared by statements, rows, and relations.
///
/// `Map` entries are always kept sorted by canonical key order with
/// unique keys; insertion order is discarded. That makes map-bearing
/// statements render deterministically and map cells comparable with
/// plain `==`.
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),
    Timestamp(Timestamp),
    Duration(Duration),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    #[default]
    Null,
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    ///
    /// This is the canonical constructor for bind-value boundaries.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::List` from a slice literal.
    ///
    /// Intended for tests and inline construction.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Build a canonical `Value::Map` from owned key/value entries.
    ///
    /// Invariants are validated and entries are normalized:
    /// - keys must be scalar and non-null
    /// - entries are sorted by canonical key order
    /// - duplicate keys are rejected
    pub fn from_map(entries: Vec<(Self, Self)>) -> Result<Self, MapValueError> {
        Ok(Self::Map(Self::normalize_map_entries(entries)?))
    }

    /// Validate map entry invariants without changing order.
    pub fn validate_map_entries(entries: &[(Self, Self)]) -> Result<(), MapValueError> {
        for (index, (key, _)) in entries.iter().enumerate() {
            if matches!(key, Self::Null) {
                return Err(MapValueError::NullKey { index });
            }
            if !key.is_scalar() {
                return Err(MapValueError::NonScalarKey {
                    index,
                    key: key.clone(),
                });
            }
        }

        Ok(())
    }

    /// Normalize map entries into canonical deterministic order.
    pub fn normalize_map_entries(
        mut entries: Vec<(Self, Self)>,
    ) -> Result<Vec<(Self, Self)>, MapValueError> {
        Self::validate_map_entries(&entries)?;
        entries.sort_by(|(left_key, _), (right_key, _)| Self::canonical_cmp(left_key, right_key));

        for i in 1..entries.len() {
            let (left_key, _) = &entries[i - 1];
            let (right_key, _) = &entries[i];
            if Self::canonical_cmp(left_key, right_key) == Ordering::Equal {
                return Err(MapValueError::DuplicateKey {
                    left_index: i - 1,
                    right_index: i,
                });
            }
        }

        Ok(entries)
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_) | Self::Null)
    }

    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Map(_))
    }

    /// True for values that count as "empty" in key positions: empty
    /// text, empty blob, the zero timestamp, and `Null`. Numeric zero is
    /// a legitimate key component and is never empty.
    #[must_use]
    pub fn is_empty_key_component(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Blob(b) => b.is_empty(),
            Self::Timestamp(t) => t.is_zero(),
            Self::Null => true,
            _ => false,
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(items) = self {
            Some(items.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Self, Self)]> {
        if let Self::Map(entries) = self {
            Some(entries.as_slice())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_timestamp(&self) -> Option<Timestamp> {
        if let Self::Timestamp(t) = self {
            Some(*t)
        } else {
            None
        }
    }

    ///
    /// COMPARISON
    ///

    /// Total deterministic comparator used for map-key normalization.
    ///
    /// Mixed-variant comparisons order by variant rank only; this is not
    /// the relation evaluator's coerced comparison.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        let rank = left.canonical_rank().cmp(&right.canonical_rank());
        if rank != Ordering::Equal {
            return rank;
        }

        match (left, right) {
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Int(a), Self::Int(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Blob(a), Self::Blob(b)) => a.cmp(b),
            (Self::Timestamp(a), Self::Timestamp(b)) => a.cmp(b),
            (Self::Duration(a), Self::Duration(b)) => a.cmp(b),
            (Self::List(a), Self::List(b)) => Self::canonical_cmp_list(a, b),
            (Self::Map(a), Self::Map(b)) => Self::canonical_cmp_map(a, b),
            _ => Ordering::Equal,
        }
    }

    const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) => 2,
            Self::Double(_) => 3,
            Self::Text(_) => 4,
            Self::Blob(_) => 5,
            Self::Timestamp(_) => 6,
            Self::Duration(_) => 7,
            Self::List(_) => 8,
            Self::Map(_) => 9,
        }
    }

    fn canonical_cmp_list(left: &[Self], right: &[Self]) -> Ordering {
        for (left, right) in left.iter().zip(right.iter()) {
            let cmp = Self::canonical_cmp(left, right);
            if cmp != Ordering::Equal {
                return cmp;
            }
        }

        left.len().cmp(&right.len())
    }

    fn canonical_cmp_map(left: &[(Self, Self)], right: &[(Self, Self)]) -> Ordering {
        for ((left_key, left_value), (right_key, right_value)) in left.iter().zip(right.iter()) {
            let key_cmp = Self::canonical_cmp(left_key, right_key);
            if key_cmp != Ordering::Equal {
                return key_cmp;
            }

            let value_cmp = Self::canonical_cmp(left_value, right_value);
            if value_cmp != Ordering::Equal {
                return value_cmp;
            }
        }

        left.len().cmp(&right.len())
    }

    ///
    /// MAP ACCESS
    ///
    /// Entry helpers that preserve the canonical sorted-unique invariant.
    ///

    #[must_use]
    pub fn map_get(entries: &[(Self, Self)], key: &Self) -> Option<Self> {
        entries
            .binary_search_by(|(k, _)| Self::canonical_cmp(k, key))
            .ok()
            .map(|idx| entries[idx].1.clone())
    }

    pub fn map_put(entries: &mut Vec<(Self, Self)>, key: Self, value: Self) {
        match entries.binary_search_by(|(k, _)| Self::canonical_cmp(k, &key)) {
            Ok(idx) => entries[idx].1 = value,
            Err(idx) => entries.insert(idx, (key, value)),
        }
    }
}

#[macro_export]
macro_rules! impl_value_from {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_value_from! {
    bool      => Bool,
    i8        => Int,
    i16       => Int,
    i32       => Int,
    i64       => Int,
    u8        => Int,
    u16       => Int,
    u32       => Int,
    f32       => Double,
    f64       => Double,
    &str      => Text,
    String    => Text,
    Timestamp => Timestamp,
    Duration  => Duration,
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Self::Blob(blob.into_bytes())
    }
}

impl From<&[u8]> for Value {
    fn from(bytes: &[u8]) -> Self {
        Self::Blob(bytes.to_vec())
    }
}

impl From<Vec<Self>> for Value {
    fn from(items: Vec<Self>) -> Self {
        Self::List(items)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
