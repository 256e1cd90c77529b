use crate::{
    types::{Blob, Duration, Timestamp},
    value::Value,
};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

///
/// ColumnValue
///
/// Two-way conversion between a typed record field and the dynamic cell
/// vocabulary. `from_value` applies the widening policy used when rows
/// come back from a driver or the mock:
///
/// - identity for the field's own kind
/// - numeric widening (`Int` into wider ints / floats); narrowing only
///   when the value fits
/// - text ⇄ blob
/// - element-wise conversion for lists and maps
/// - `Null` lands as the field's default (collections become empty, not
///   absent)
/// - anything else is a conversion failure (`None`)
///

pub trait ColumnValue: Default + Sized {
    fn to_value(&self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl ColumnValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl ColumnValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

macro_rules! impl_column_value_int {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl ColumnValue for $type {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::Int(i) => Self::try_from(*i).ok(),
                        Value::Null => Some(Self::default()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_column_value_int!(i8, i16, i32, u8, u16, u32);

impl ColumnValue for i64 {
    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as Self),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for f32 {
    fn to_value(&self) -> Value {
        Value::Double(f64::from(*self))
    }

    #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d as Self),
            Value::Int(i) => Some(*i as Self),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(s) => Some(s.clone()),
            Value::Blob(b) => Some(Self::from_utf8_lossy(b).into_owned()),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for Blob {
    fn to_value(&self) -> Value {
        Value::Blob(self.as_bytes().to_vec())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(b) => Some(Self::new(b.clone())),
            Value::Text(s) => Some(Self::new(s.clone().into_bytes())),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for Timestamp {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Timestamp(t) => Some(*t),
            Value::Int(nanos) => Some(Self::from_nanos(*nanos)),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl ColumnValue for Duration {
    fn to_value(&self) -> Value {
        Value::Duration(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Duration(d) => Some(*d),
            Value::Int(nanos) => Some(Self::from_nanos(*nanos)),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl<T> ColumnValue for Option<T>
where
    T: ColumnValue,
{
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T> ColumnValue for Vec<T>
where
    T: ColumnValue,
{
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ColumnValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(T::from_value).collect(),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl<K, V> ColumnValue for BTreeMap<K, V>
where
    K: ColumnValue + Ord,
    V: ColumnValue,
{
    fn to_value(&self) -> Value {
        // Canonical order follows from the key type's Ord, which is
        // consistent per key kind; entries stay unique by construction.
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| Some((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}

impl<K, V> ColumnValue for HashMap<K, V>
where
    K: ColumnValue + Eq + Hash + Ord,
    V: ColumnValue,
{
    fn to_value(&self) -> Value {
        // sort a borrowed view so emitted entries stay canonical
        let mut sorted: Vec<(&K, &V)> = self.iter().collect();
        sorted.sort_by(|(a, _), (b, _)| a.cmp(b));
        Value::Map(
            sorted
                .into_iter()
                .map(|(k, v)| (k.to_value(), v.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(k, v)| Some((K::from_value(k)?, V::from_value(v)?)))
                .collect(),
            Value::Null => Some(Self::default()),
            _ => None,
        }
    }
}
