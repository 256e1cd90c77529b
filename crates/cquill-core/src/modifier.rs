use crate::{
    error::Error,
    value::{coerce, coerced_eq, Value},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Modifier
///
/// Non-scalar update directive for list/map/counter columns, used as a
/// SET value in UPDATE statements. Arity is fixed per variant, so a
/// malformed modifier cannot be constructed.
///
/// Note the one-element list wrapping for the list variants' bind
/// values: the driver interprets the bind as a single-element collection
/// argument.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    /// Prepend a value to the front of the list.
    ListPrepend(Value),
    /// Append a value to the end of the list.
    ListAppend(Value),
    /// Set the list element at a given index.
    ListSetAtIndex(i64, Value),
    /// Remove every element equal to the value.
    ListRemove(Value),
    /// Set one key in the map.
    MapSetField(Value, Value),
    /// Merge the given entries into the map; entries are canonical
    /// sorted-unique, so bind order is deterministic.
    MapSetFields(Vec<(Value, Value)>),
    /// Add to a counter column; negative decrements.
    CounterIncrement(i64),
}

impl Modifier {
    pub fn list_prepend(value: impl Into<Value>) -> Self {
        Self::ListPrepend(value.into())
    }

    pub fn list_append(value: impl Into<Value>) -> Self {
        Self::ListAppend(value.into())
    }

    pub fn list_set_at_index(index: i64, value: impl Into<Value>) -> Self {
        Self::ListSetAtIndex(index, value.into())
    }

    pub fn list_remove(value: impl Into<Value>) -> Self {
        Self::ListRemove(value.into())
    }

    pub fn map_set_field(key: impl Into<Value>, value: impl Into<Value>) -> Self {
        Self::MapSetField(key.into(), value.into())
    }

    /// The map argument rules out duplicate keys; iteration order of a
    /// `BTreeMap` keeps the rendered entry order deterministic.
    pub fn map_set_fields<K, V>(fields: BTreeMap<K, V>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::MapSetFields(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub const fn counter_increment(delta: i64) -> Self {
        Self::CounterIncrement(delta)
    }

    ///
    /// RENDERING
    ///

    /// SET fragment and bind values for the named column.
    #[must_use]
    pub(crate) fn cql(&self, column: &str) -> (String, Vec<Value>) {
        match self {
            Self::ListPrepend(value) => (
                format!("{column} = ? + {column}"),
                vec![Value::List(vec![value.clone()])],
            ),
            Self::ListAppend(value) => (
                format!("{column} = {column} + ?"),
                vec![Value::List(vec![value.clone()])],
            ),
            Self::ListSetAtIndex(index, value) => (
                format!("{column}[?] = ?"),
                vec![Value::Int(*index), value.clone()],
            ),
            Self::ListRemove(value) => (
                format!("{column} = {column} - ?"),
                vec![Value::List(vec![value.clone()])],
            ),
            Self::MapSetField(key, value) => (
                format!("{column}[?] = ?"),
                vec![key.clone(), value.clone()],
            ),
            Self::MapSetFields(entries) => {
                let fragment = vec![format!("{column}[?] = ?"); entries.len()].join(", ");
                let values = entries
                    .iter()
                    .flat_map(|(k, v)| [k.clone(), v.clone()])
                    .collect();
                (fragment, values)
            }
            Self::CounterIncrement(delta) => {
                if *delta >= 0 {
                    (format!("{column} = {column} + ?"), vec![Value::Int(*delta)])
                } else {
                    (format!("{column} = {column} - ?"), vec![Value::Int(-delta)])
                }
            }
        }
    }

    ///
    /// APPLICATION
    ///
    /// In-memory semantics used by the mock row store. A `Null` current
    /// cell behaves as the empty collection (or zero counter).
    ///

    pub(crate) fn apply(&self, column: &str, current: &Value) -> Result<Value, Error> {
        match self {
            Self::ListPrepend(value) => {
                let mut items = current_list(current, column)?;
                items.insert(0, value.clone());
                Ok(Value::List(items))
            }
            Self::ListAppend(value) => {
                let mut items = current_list(current, column)?;
                items.push(value.clone());
                Ok(Value::List(items))
            }
            Self::ListSetAtIndex(index, value) => {
                let mut items = current_list(current, column)?;
                let len = items.len();
                let slot = usize::try_from(*index)
                    .ok()
                    .filter(|i| *i < len)
                    .ok_or_else(|| Error::ListIndexOutOfRange {
                        column: column.to_string(),
                        index: *index,
                        len,
                    })?;
                items[slot] = value.clone();
                Ok(Value::List(items))
            }
            Self::ListRemove(value) => {
                let mut items = current_list(current, column)?;
                let needle = coerce(value);
                items.retain(|item| !coerced_eq(&coerce(item), &needle));
                Ok(Value::List(items))
            }
            Self::MapSetField(key, value) => {
                let mut entries = current_map(current, column)?;
                Value::map_put(&mut entries, key.clone(), value.clone());
                Ok(Value::Map(entries))
            }
            Self::MapSetFields(updates) => {
                let mut entries = current_map(current, column)?;
                for (key, value) in updates {
                    Value::map_put(&mut entries, key.clone(), value.clone());
                }
                Ok(Value::Map(entries))
            }
            Self::CounterIncrement(delta) => {
                let current = match current {
                    Value::Int(i) => *i,
                    Value::Null => 0,
                    other => {
                        return Err(Error::scan(format!(
                            "counter column {column} holds non-counter value {other:?}"
                        )))
                    }
                };
                Ok(Value::Int(current + delta))
            }
        }
    }
}

fn current_list(current: &Value, column: &str) -> Result<Vec<Value>, Error> {
    match current {
        Value::List(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::scan(format!(
            "list column {column} holds non-list value {other:?}"
        ))),
    }
}

fn current_map(current: &Value, column: &str) -> Result<Vec<(Value, Value)>, Error> {
    match current {
        Value::Map(entries) => Ok(entries.clone()),
        Value::Null => Ok(Vec::new()),
        other => Err(Error::scan(format!(
            "map column {column} holds non-map value {other:?}"
        ))),
    }
}
